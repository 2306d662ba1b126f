//! Zoom/pan model for the spectrogram panel.
//!
//! The view is stored in normalized image coordinates: `u` runs 0..1 left to
//! right (frequency) and `v` runs 0..1 top to bottom (decreasing time). The
//! pan offset is the normalized coordinate shown at the viewport's top-left
//! corner, so a viewport point is
//!
//! ```text
//! x = (u - pan_x) * scale_x * width
//! y = (v - pan_y) * scale_y * height
//! ```
//!
//! Keeping pan normalized means a resize changes nothing about which part of
//! the spectrogram is visible. Pan is always clamped to
//! `0..=1 - 1/scale`, so the visible window never leaves the image.

use serde::{Deserialize, Serialize};

use crate::config::SpectrogramConfig;
use crate::constants;
use crate::coords::{DomainBounds, DomainPoint, ViewportPoint};
use crate::error::{Result, SvatError};

/// Scale changes smaller than this are treated as no change.
const SCALE_EPSILON: f64 = 1e-9;

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min >= 1.0 && max >= min && max.is_finite()) {
            return Err(SvatError::InvalidZoomLimits { min, max });
        }
        Ok(Self { min, max })
    }

    fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: constants::DEFAULT_MIN_ZOOM,
            max: constants::DEFAULT_MAX_ZOOM,
        }
    }
}

/// Zoom and pan state of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    bounds: DomainBounds,
    width: f64,
    height: f64,
    scale_x: f64,
    scale_y: f64,
    pan_x: f64,
    pan_y: f64,
    limits: ZoomLimits,
}

impl ViewportState {
    /// Create an unzoomed viewport of the given pixel size.
    ///
    /// Fails if the configuration is invalid or the size is empty, so no
    /// transform ever divides by a zero-length axis.
    pub fn new(
        config: &SpectrogramConfig,
        width: f64,
        height: f64,
        limits: ZoomLimits,
    ) -> Result<Self> {
        config.validate()?;
        validate_size(width, height)?;
        Ok(Self {
            bounds: config.bounds(),
            width,
            height,
            scale_x: limits.min,
            scale_y: limits.min,
            pan_x: 0.0,
            pan_y: 0.0,
            limits,
        }
        .clamped())
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Current (x, y) scale factors.
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// Current normalized pan offset.
    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Full domain extent the viewport is bounded by.
    pub fn bounds(&self) -> &DomainBounds {
        &self.bounds
    }

    /// Whether either axis is magnified beyond 1:1.
    pub fn is_zoomed(&self) -> bool {
        self.scale_x > 1.0 + SCALE_EPSILON || self.scale_y > 1.0 + SCALE_EPSILON
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    pub fn normalized_to_viewport(&self, u: f64, v: f64) -> ViewportPoint {
        ViewportPoint::new(
            (u - self.pan_x) * self.scale_x * self.width,
            (v - self.pan_y) * self.scale_y * self.height,
        )
    }

    pub fn viewport_to_normalized(&self, p: ViewportPoint) -> (f64, f64) {
        (
            p.x / (self.scale_x * self.width) + self.pan_x,
            p.y / (self.scale_y * self.height) + self.pan_y,
        )
    }

    pub fn domain_to_normalized(&self, p: DomainPoint) -> (f64, f64) {
        (
            (p.frequency - self.bounds.freq_min) / self.bounds.freq_span(),
            (self.bounds.time_max - p.time) / self.bounds.time_span(),
        )
    }

    pub fn normalized_to_domain(&self, u: f64, v: f64) -> DomainPoint {
        DomainPoint::new(
            self.bounds.time_max - v * self.bounds.time_span(),
            self.bounds.freq_min + u * self.bounds.freq_span(),
        )
    }

    pub fn domain_to_viewport(&self, p: DomainPoint) -> ViewportPoint {
        let (u, v) = self.domain_to_normalized(p);
        self.normalized_to_viewport(u, v)
    }

    pub fn viewport_to_domain(&self, p: ViewportPoint) -> DomainPoint {
        let (u, v) = self.viewport_to_normalized(p);
        self.normalized_to_domain(u, v)
    }

    /// The domain rectangle currently visible.
    pub fn visible_domain(&self) -> DomainBounds {
        let top_left = self.normalized_to_domain(self.pan_x, self.pan_y);
        let bottom_right = self.normalized_to_domain(
            self.pan_x + 1.0 / self.scale_x,
            self.pan_y + 1.0 / self.scale_y,
        );
        DomainBounds {
            time_min: bottom_right.time,
            time_max: top_left.time,
            freq_min: top_left.frequency,
            freq_max: bottom_right.frequency,
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Zoom both axes by `factor`, keeping `point` under the same pixel.
    ///
    /// Returns true if the view changed. Scale is clamped to the zoom limits
    /// and pan to the image; when a clamp engages (zooming out near an edge)
    /// the point may shift.
    pub fn zoom_around_point(&mut self, point: DomainPoint, factor: f64) -> bool {
        self.zoom_axes_around_point(point, factor, factor)
    }

    /// Zoom each axis by its own factor, keeping `point` under the same pixel.
    pub fn zoom_axes_around_point(
        &mut self,
        point: DomainPoint,
        factor_x: f64,
        factor_y: f64,
    ) -> bool {
        if !(factor_x.is_finite() && factor_y.is_finite() && factor_x > 0.0 && factor_y > 0.0) {
            log::debug!("🔍 Ignoring zoom with invalid factor ({factor_x}, {factor_y})");
            return false;
        }
        let (u, v) = self.domain_to_normalized(point);
        if !(u.is_finite() && v.is_finite()) {
            return false;
        }
        let before = self.clone();
        let pinned = self.normalized_to_viewport(u, v);

        self.scale_x = self.limits.clamp(self.scale_x * factor_x);
        self.scale_y = self.limits.clamp(self.scale_y * factor_y);
        self.pan_x = u - pinned.x / (self.scale_x * self.width);
        self.pan_y = v - pinned.y / (self.scale_y * self.height);
        self.clamp_pan();

        let changed = *self != before;
        if changed {
            log::debug!(
                "🔍 Zoom: {:.2}x/{:.2}x around ({:.3}s, {:.1}Hz), pan: ({:.4}, {:.4})",
                self.scale_x,
                self.scale_y,
                point.time,
                point.frequency,
                self.pan_x,
                self.pan_y
            );
        }
        changed
    }

    /// Move the view by a pointer delta in viewport pixels.
    ///
    /// Content follows the pointer: dragging right reveals lower frequencies.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        let (old_x, old_y) = (self.pan_x, self.pan_y);
        self.pan_x -= dx / (self.scale_x * self.width);
        self.pan_y -= dy / (self.scale_y * self.height);
        self.clamp_pan();
        let changed = old_x != self.pan_x || old_y != self.pan_y;
        if changed {
            log::trace!("🖐️ Pan: ({:.4}, {:.4})", self.pan_x, self.pan_y);
        }
        changed
    }

    /// Show exactly `region` (clipped to the image), scaling each axis independently.
    pub fn zoom_to_region(&mut self, region: DomainBounds) -> Result<()> {
        if !(region.time_span() > 0.0 && region.freq_span() > 0.0) {
            return Err(SvatError::invalid_region("region must have positive extent"));
        }
        let clipped = DomainBounds {
            time_min: region.time_min.max(self.bounds.time_min),
            time_max: region.time_max.min(self.bounds.time_max),
            freq_min: region.freq_min.max(self.bounds.freq_min),
            freq_max: region.freq_max.min(self.bounds.freq_max),
        };
        if !(clipped.time_span() > 0.0 && clipped.freq_span() > 0.0) {
            return Err(SvatError::invalid_region("region lies outside the spectrogram"));
        }

        let (u0, v0) = self.domain_to_normalized(DomainPoint::new(clipped.time_max, clipped.freq_min));
        let (u1, v1) = self.domain_to_normalized(DomainPoint::new(clipped.time_min, clipped.freq_max));
        self.scale_x = self.limits.clamp(1.0 / (u1 - u0));
        self.scale_y = self.limits.clamp(1.0 / (v1 - v0));

        // Center the region when a limit prevents showing it exactly
        self.pan_x = (u0 + u1) / 2.0 - 0.5 / self.scale_x;
        self.pan_y = (v0 + v1) / 2.0 - 0.5 / self.scale_y;
        self.clamp_pan();
        log::debug!(
            "🔍 Zoom to region: {:.2}x/{:.2}x, pan: ({:.4}, {:.4})",
            self.scale_x,
            self.scale_y,
            self.pan_x,
            self.pan_y
        );
        Ok(())
    }

    /// Back to the full image at 1:1.
    pub fn reset(&mut self) {
        self.scale_x = self.limits.min;
        self.scale_y = self.limits.min;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.clamp_pan();
        log::debug!("🔄 View reset");
    }

    /// Change the viewport pixel size. The visible window is unchanged.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        validate_size(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Set the normalized pan offsets directly (clamped to the image).
    pub fn set_pan(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.pan_x = x;
            self.pan_y = y;
            self.clamp_pan();
        }
    }

    fn clamp_pan(&mut self) {
        let max_x = (1.0 - 1.0 / self.scale_x).max(0.0);
        let max_y = (1.0 - 1.0 / self.scale_y).max(0.0);
        self.pan_x = self.pan_x.clamp(0.0, max_x);
        self.pan_y = self.pan_y.clamp(0.0, max_y);
    }

    fn clamped(mut self) -> Self {
        self.clamp_pan();
        self
    }
}

fn validate_size(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(SvatError::InvalidViewportSize { width, height });
    }
    Ok(())
}
