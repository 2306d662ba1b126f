//! Harmonic set data model and ladder generation.
//!
//! A harmonic set is stored as just an anchor time and a spacing. The lines
//! themselves (`spacing * n` for every positive integer `n` that lands inside
//! the frequency axis) are derived on demand.

use serde::{Deserialize, Serialize};

use super::FeatureId;
use crate::constants::{CLICK_HARMONIC_INDEX_OFFSET_AXIS, CLICK_HARMONIC_INDEX_ZERO_AXIS};
use crate::coords::DomainBounds;
use crate::error::{Result, SvatError};

/// Relative slack when deciding whether `spacing * n` sits on an axis limit.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// A family of frequency lines at integer multiples of `spacing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicSet {
    /// Unique identifier
    pub id: FeatureId,
    /// CSS color assigned at creation
    pub color: String,
    /// Time the ladder is centered on (seconds)
    pub anchor_time: f64,
    /// Distance between adjacent harmonics (Hz), always positive
    pub spacing: f64,
}

impl HarmonicSet {
    pub fn new(id: FeatureId, anchor_time: f64, spacing: f64, color: impl Into<String>) -> Self {
        Self {
            id,
            color: color.into(),
            anchor_time,
            spacing,
        }
    }

    /// Initial spacing for a set created by clicking at `click_frequency`.
    ///
    /// The click lands on harmonic 10 when the axis starts above 0 Hz and on
    /// harmonic 5 otherwise. Returns `None` when the result would not be a
    /// usable spacing (click at or below 0 Hz, or finer than `min_spacing`).
    pub fn spacing_for_click(click_frequency: f64, freq_min: f64, min_spacing: f64) -> Option<f64> {
        let spacing = click_frequency / f64::from(click_harmonic_index(freq_min));
        validate_spacing(spacing, min_spacing).ok()
    }

    /// Frequency of harmonic `n`.
    pub fn frequency_of(&self, n: u32) -> f64 {
        self.spacing * f64::from(n)
    }

    /// Harmonic index closest to `frequency` (never below 1).
    pub fn nearest_harmonic(&self, frequency: f64) -> u32 {
        let n = (frequency / self.spacing).round();
        if n.is_finite() && n >= 1.0 {
            n.min(f64::from(u32::MAX)) as u32
        } else {
            1
        }
    }

    /// Closest harmonic index among the lines drawn on `[freq_min, freq_max]`.
    pub fn nearest_visible_harmonic(&self, frequency: f64, freq_min: f64, freq_max: f64) -> Option<u32> {
        let (first, last) = harmonic_index_range(self.spacing, freq_min, freq_max)?;
        Some(self.nearest_harmonic(frequency).clamp(first, last))
    }

    /// Every `(n, frequency)` with `n >= 1` and `freq_min <= spacing * n <= freq_max`.
    pub fn harmonics(
        &self,
        freq_min: f64,
        freq_max: f64,
    ) -> impl Iterator<Item = (u32, f64)> + use<> {
        let spacing = self.spacing;
        let range = harmonic_index_range(spacing, freq_min, freq_max);
        range
            .into_iter()
            .flat_map(|(first, last)| first..=last)
            .map(move |n| (n, spacing * f64::from(n)))
    }

    /// Time interval the ladder is drawn across: `fraction` of the full time
    /// axis, centered on the anchor.
    pub fn band(&self, bounds: &DomainBounds, fraction: f64) -> (f64, f64) {
        let half = bounds.time_span() * fraction / 2.0;
        (self.anchor_time - half, self.anchor_time + half)
    }

    /// Whether `time` falls within the drawn band.
    pub fn band_contains(&self, bounds: &DomainBounds, fraction: f64, time: f64) -> bool {
        let (lo, hi) = self.band(bounds, fraction);
        time >= lo && time <= hi
    }
}

/// Harmonic index a creation click is assumed to land on.
pub fn click_harmonic_index(freq_min: f64) -> u32 {
    if freq_min > 0.0 {
        CLICK_HARMONIC_INDEX_OFFSET_AXIS
    } else {
        CLICK_HARMONIC_INDEX_ZERO_AXIS
    }
}

/// Finest spacing an axis of `freq_span` Hz drawn over `columns` image
/// pixels can show: adjacent lines one image pixel apart.
pub fn min_spacing(freq_span: f64, columns: u32) -> f64 {
    freq_span / f64::from(columns.max(1))
}

/// Accept only finite spacings above 0 Hz and no finer than `min_spacing`.
pub fn validate_spacing(spacing: f64, min_spacing: f64) -> Result<f64> {
    if spacing.is_finite() && spacing > 0.0 && spacing >= min_spacing {
        Ok(spacing)
    } else {
        Err(SvatError::InvalidSpacing(spacing))
    }
}

/// First and last harmonic index inside `[freq_min, freq_max]`, if any.
fn harmonic_index_range(spacing: f64, freq_min: f64, freq_max: f64) -> Option<(u32, u32)> {
    if !(spacing.is_finite() && spacing > 0.0) || freq_max < freq_min {
        return None;
    }
    let slack = BOUNDARY_EPSILON * spacing.max(freq_max.abs()).max(freq_min.abs());
    let inside_low = |n: f64| spacing * n >= freq_min - slack;
    let inside_high = |n: f64| spacing * n <= freq_max + slack;

    let mut first = (freq_min / spacing).ceil().max(1.0);
    if first > 1.0 && inside_low(first - 1.0) {
        first -= 1.0;
    }
    let mut last = (freq_max / spacing).floor();
    if inside_high(last + 1.0) {
        last += 1.0;
    }
    while last >= first && !inside_high(last) {
        last -= 1.0;
    }

    let limit = f64::from(u32::MAX);
    if last < first || first > limit {
        return None;
    }
    Some((first as u32, last.min(limit) as u32))
}
