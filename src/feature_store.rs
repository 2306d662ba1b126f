//! In-memory storage for user-created features.
//!
//! Markers and harmonic sets are catalog entries that survive mode switches.
//! The Doppler fit is kept here too so every tool can render it, but the
//! Doppler tool clears it when it is deactivated.

use serde::{Deserialize, Serialize};

use crate::color_utils::palette_color;
use crate::coords::{CoordinateTransformer, DomainPoint, ViewportPoint};
use crate::event::WidgetEvent;
use crate::model::{AnalysisMarker, DopplerFit, FeatureId, HarmonicSet};

/// The feature currently targeted by keyboard nudge and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Marker(FeatureId),
    HarmonicSet(FeatureId),
}

/// Storage for markers, harmonic sets and the current Doppler fit.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureStore {
    /// Analysis markers in creation order.
    markers: Vec<AnalysisMarker>,
    /// Harmonic sets in creation order.
    harmonic_sets: Vec<HarmonicSet>,
    /// The in-progress Doppler measurement, if any.
    doppler: Option<DopplerFit>,
    /// Counter for generating unique feature IDs (shared by all kinds).
    #[serde(skip)]
    next_id: FeatureId,
    /// Colors handed out so far, per kind.
    #[serde(skip)]
    marker_colors: usize,
    #[serde(skip)]
    harmonic_colors: usize,
    #[serde(skip)]
    palette: Vec<String>,
    /// Currently selected feature.
    #[serde(skip)]
    selected: Option<Selection>,
    /// Dirty flag - set whenever anything a renderer draws changes.
    #[serde(skip)]
    dirty: bool,
    /// Pending change notifications.
    #[serde(skip)]
    events: Vec<WidgetEvent>,
}

impl FeatureStore {
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            markers: Vec::new(),
            harmonic_sets: Vec::new(),
            doppler: None,
            next_id: 1,
            marker_colors: 0,
            harmonic_colors: 0,
            palette,
            selected: None,
            dirty: true,
            events: Vec::new(),
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after redrawing.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Queue a change notification.
    pub fn emit(&mut self, event: WidgetEvent) {
        self.events.push(event);
    }

    /// Drain all pending change notifications.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    fn allocate_id(&mut self) -> FeatureId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    pub fn markers(&self) -> &[AnalysisMarker] {
        &self.markers
    }

    pub fn marker(&self, id: FeatureId) -> Option<&AnalysisMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Create a marker with the next palette color and return its ID.
    pub fn add_marker(&mut self, position: DomainPoint) -> FeatureId {
        let id = self.allocate_id();
        let color = palette_color(&self.palette, self.marker_colors);
        self.marker_colors += 1;
        self.markers.push(AnalysisMarker::new(id, position, color));
        log::debug!(
            "📍 Marker {} added at ({:.3}s, {:.1}Hz)",
            id,
            position.time,
            position.frequency
        );
        self.mark_dirty();
        self.emit(WidgetEvent::MarkerAdded { id });
        id
    }

    /// Put a previously removed marker back at `index`, keeping its ID and color.
    pub fn restore_marker(&mut self, marker: AnalysisMarker, index: usize) {
        let id = marker.id;
        self.next_id = self.next_id.max(id + 1);
        let index = index.min(self.markers.len());
        self.markers.insert(index, marker);
        self.mark_dirty();
        self.emit(WidgetEvent::MarkerAdded { id });
    }

    /// Remove a marker, returning its former index and value.
    pub fn remove_marker(&mut self, id: FeatureId) -> Option<(usize, AnalysisMarker)> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        let marker = self.markers.remove(index);
        if self.selected == Some(Selection::Marker(id)) {
            self.selected = None;
        }
        log::debug!("🗑️ Marker {} removed", id);
        self.mark_dirty();
        self.emit(WidgetEvent::MarkerRemoved { id });
        Some((index, marker))
    }

    /// Move a marker. Returns false if it does not exist.
    pub fn move_marker(&mut self, id: FeatureId, position: DomainPoint) -> bool {
        let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if marker.position() == position {
            return true;
        }
        marker.set_position(position);
        self.mark_dirty();
        self.emit(WidgetEvent::MarkerMoved { id });
        true
    }

    /// Remove every marker, returning them in order.
    pub fn clear_markers(&mut self) -> Vec<AnalysisMarker> {
        let removed = std::mem::take(&mut self.markers);
        if matches!(self.selected, Some(Selection::Marker(_))) {
            self.selected = None;
        }
        for marker in &removed {
            self.events.push(WidgetEvent::MarkerRemoved { id: marker.id });
        }
        if !removed.is_empty() {
            log::debug!("🗑️ Cleared {} markers", removed.len());
            self.mark_dirty();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Harmonic sets
    // ------------------------------------------------------------------

    pub fn harmonic_sets(&self) -> &[HarmonicSet] {
        &self.harmonic_sets
    }

    pub fn harmonic_set(&self, id: FeatureId) -> Option<&HarmonicSet> {
        self.harmonic_sets.iter().find(|s| s.id == id)
    }

    /// Create a harmonic set with the next palette color and return its ID.
    ///
    /// `spacing` must already be validated as positive.
    pub fn add_harmonic_set(&mut self, anchor_time: f64, spacing: f64) -> FeatureId {
        let id = self.allocate_id();
        let color = palette_color(&self.palette, self.harmonic_colors);
        self.harmonic_colors += 1;
        self.harmonic_sets
            .push(HarmonicSet::new(id, anchor_time, spacing, color));
        log::debug!(
            "🎼 Harmonic set {} added: anchor {:.3}s, spacing {:.2}Hz",
            id,
            anchor_time,
            spacing
        );
        self.mark_dirty();
        self.emit(WidgetEvent::HarmonicSetAdded { id });
        id
    }

    /// Put a previously removed set back at `index`, keeping its ID and color.
    pub fn restore_harmonic_set(&mut self, set: HarmonicSet, index: usize) {
        let id = set.id;
        self.next_id = self.next_id.max(id + 1);
        let index = index.min(self.harmonic_sets.len());
        self.harmonic_sets.insert(index, set);
        self.mark_dirty();
        self.emit(WidgetEvent::HarmonicSetAdded { id });
    }

    /// Remove a harmonic set, returning its former index and value.
    pub fn remove_harmonic_set(&mut self, id: FeatureId) -> Option<(usize, HarmonicSet)> {
        let index = self.harmonic_sets.iter().position(|s| s.id == id)?;
        let set = self.harmonic_sets.remove(index);
        if self.selected == Some(Selection::HarmonicSet(id)) {
            self.selected = None;
        }
        log::debug!("🗑️ Harmonic set {} removed", id);
        self.mark_dirty();
        self.emit(WidgetEvent::HarmonicSetRemoved { id });
        Some((index, set))
    }

    /// Set a harmonic set's anchor and spacing. Returns false if it does not
    /// exist or `spacing` is not positive.
    pub fn update_harmonic_set(&mut self, id: FeatureId, anchor_time: f64, spacing: f64) -> bool {
        if !(spacing.is_finite() && spacing > 0.0 && anchor_time.is_finite()) {
            return false;
        }
        let Some(set) = self.harmonic_sets.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if set.anchor_time == anchor_time && set.spacing == spacing {
            return true;
        }
        set.anchor_time = anchor_time;
        set.spacing = spacing;
        self.mark_dirty();
        self.emit(WidgetEvent::HarmonicSetChanged { id });
        true
    }

    /// Remove every harmonic set, returning them in order.
    pub fn clear_harmonic_sets(&mut self) -> Vec<HarmonicSet> {
        let removed = std::mem::take(&mut self.harmonic_sets);
        if matches!(self.selected, Some(Selection::HarmonicSet(_))) {
            self.selected = None;
        }
        for set in &removed {
            self.events
                .push(WidgetEvent::HarmonicSetRemoved { id: set.id });
        }
        if !removed.is_empty() {
            log::debug!("🗑️ Cleared {} harmonic sets", removed.len());
            self.mark_dirty();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Doppler
    // ------------------------------------------------------------------

    pub fn doppler(&self) -> Option<&DopplerFit> {
        self.doppler.as_ref()
    }

    /// Replace the Doppler fit.
    pub fn set_doppler(&mut self, fit: DopplerFit) {
        self.doppler = Some(fit);
        self.mark_dirty();
        self.emit(WidgetEvent::DopplerChanged);
    }

    /// Drop the Doppler fit, returning it. Emits nothing if there was none.
    pub fn clear_doppler(&mut self) -> Option<DopplerFit> {
        let fit = self.doppler.take()?;
        log::debug!("🚀 Doppler fit cleared");
        self.mark_dirty();
        self.emit(WidgetEvent::DopplerCleared);
        Some(fit)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> Option<Selection> {
        self.selected
    }

    pub fn select(&mut self, selection: Option<Selection>) {
        if self.selected != selection {
            self.selected = selection;
            self.mark_dirty();
        }
    }

    pub fn is_selected(&self, selection: Selection) -> bool {
        self.selected == Some(selection)
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Topmost marker within `tolerance` viewport pixels of `point`.
    pub fn marker_at(
        &self,
        transformer: &CoordinateTransformer<'_>,
        point: ViewportPoint,
        tolerance: f64,
    ) -> Option<FeatureId> {
        self.markers
            .iter()
            .rev()
            .map(|m| (m.id, transformer.domain_to_viewport(m.position()).distance_to(&point)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Harmonic line under `point`: the set and the grabbed harmonic index.
    ///
    /// A line is hit when the pointer's time is inside the set's drawn band
    /// and its frequency is within `tolerance` pixels of `spacing * n`.
    pub fn harmonic_at(
        &self,
        transformer: &CoordinateTransformer<'_>,
        point: DomainPoint,
        tolerance: f64,
        band_fraction: f64,
    ) -> Option<(FeatureId, u32)> {
        let bounds = transformer.bounds();
        self.harmonic_sets
            .iter()
            .rev()
            .filter(|s| s.band_contains(bounds, band_fraction, point.time))
            .filter_map(|s| {
                let n =
                    s.nearest_visible_harmonic(point.frequency, bounds.freq_min, bounds.freq_max)?;
                let distance = transformer.frequency_to_pixels(s.frequency_of(n) - point.frequency);
                (distance <= tolerance).then_some((s.id, n, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, n, _)| (id, n))
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Owned copy of the catalog, for hosts that render a feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub markers: Vec<AnalysisMarker>,
    pub harmonic_sets: Vec<HarmonicSet>,
    pub doppler: Option<DopplerFit>,
}

impl From<&FeatureStore> for FeatureSnapshot {
    fn from(store: &FeatureStore) -> Self {
        Self {
            markers: store.markers.clone(),
            harmonic_sets: store.harmonic_sets.clone(),
            doppler: store.doppler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageDetails, SpectrogramConfig};
    use crate::coords::PanelRect;
    use crate::viewport::{ViewportState, ZoomLimits};

    fn palette() -> Vec<String> {
        vec!["#111111".to_string(), "#222222".to_string()]
    }

    #[test]
    fn test_add_and_remove_markers() {
        let mut store = FeatureStore::new(palette());
        let id1 = store.add_marker(DomainPoint::new(1.0, 100.0));
        let id2 = store.add_marker(DomainPoint::new(2.0, 200.0));
        let id3 = store.add_marker(DomainPoint::new(3.0, 300.0));

        assert_eq!(store.markers().len(), 3);
        assert_ne!(id1, id2);
        // Colors cycle through the palette by creation order
        assert_eq!(store.marker(id1).map(|m| m.color.as_str()), Some("#111111"));
        assert_eq!(store.marker(id2).map(|m| m.color.as_str()), Some("#222222"));
        assert_eq!(store.marker(id3).map(|m| m.color.as_str()), Some("#111111"));

        let (index, removed) = store.remove_marker(id2).expect("marker exists");
        assert_eq!(index, 1);
        assert_eq!(removed.id, id2);
        assert!(store.marker(id2).is_none());
        assert!(store.remove_marker(id2).is_none());
    }

    #[test]
    fn test_restore_keeps_id_and_position() {
        let mut store = FeatureStore::new(palette());
        let a = store.add_marker(DomainPoint::new(1.0, 100.0));
        let b = store.add_marker(DomainPoint::new(2.0, 200.0));
        let (index, marker) = store.remove_marker(a).expect("marker exists");
        store.restore_marker(marker, index);

        let ids: Vec<FeatureId> = store.markers().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a, b]);
        // New IDs never collide with restored ones
        let c = store.add_marker(DomainPoint::new(3.0, 300.0));
        assert!(c > b);
    }

    #[test]
    fn test_events_and_dirty_flag() {
        let mut store = FeatureStore::new(palette());
        store.clear_dirty();
        let id = store.add_marker(DomainPoint::new(1.0, 100.0));
        assert!(store.is_dirty());
        store.move_marker(id, DomainPoint::new(1.5, 120.0));
        store.remove_marker(id);

        assert_eq!(
            store.take_events(),
            vec![
                WidgetEvent::MarkerAdded { id },
                WidgetEvent::MarkerMoved { id },
                WidgetEvent::MarkerRemoved { id },
            ]
        );
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn test_update_harmonic_set_rejects_bad_spacing() {
        let mut store = FeatureStore::new(palette());
        let id = store.add_harmonic_set(10.0, 50.0);
        assert!(!store.update_harmonic_set(id, 10.0, 0.0));
        assert!(!store.update_harmonic_set(id, 10.0, f64::NAN));
        assert!(store.update_harmonic_set(id, 12.0, 60.0));
        let set = store.harmonic_set(id).expect("set exists");
        assert_eq!((set.anchor_time, set.spacing), (12.0, 60.0));
    }

    #[test]
    fn test_removing_selected_clears_selection() {
        let mut store = FeatureStore::new(palette());
        let id = store.add_harmonic_set(10.0, 50.0);
        store.select(Some(Selection::HarmonicSet(id)));
        store.clear_harmonic_sets();
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_hit_testing() {
        let config = SpectrogramConfig::new(0.0, 100.0, 0.0, 1000.0, "spectrogram.png");
        let image = ImageDetails::new(1000, 1000);
        let panel = PanelRect::new(0.0, 0.0, 1000.0, 1000.0);
        let viewport =
            ViewportState::new(&config, 1000.0, 1000.0, ZoomLimits::default()).expect("valid");
        let transformer = CoordinateTransformer::new(config.bounds(), image, panel, &viewport);

        let mut store = FeatureStore::new(palette());
        // time 50 -> y 500, frequency 300 -> x 300
        let marker = store.add_marker(DomainPoint::new(50.0, 300.0));
        assert_eq!(
            store.marker_at(&transformer, ViewportPoint::new(304.0, 503.0), 8.0),
            Some(marker)
        );
        assert_eq!(store.marker_at(&transformer, ViewportPoint::new(320.0, 500.0), 8.0), None);

        let set = store.add_harmonic_set(50.0, 100.0);
        // Near the 4th harmonic, inside the band (40..60 s)
        assert_eq!(
            store.harmonic_at(&transformer, DomainPoint::new(55.0, 405.0), 8.0, 0.2),
            Some((set, 4))
        );
        // Outside the band
        assert_eq!(store.harmonic_at(&transformer, DomainPoint::new(70.0, 400.0), 8.0, 0.2), None);
        // Between lines
        assert_eq!(store.harmonic_at(&transformer, DomainPoint::new(50.0, 450.0), 8.0, 0.2), None);
    }

    #[test]
    fn test_harmonic_below_axis_not_hit() {
        // Axis starts at 104 Hz, so harmonic 1 (100 Hz) is never drawn
        let config = SpectrogramConfig::new(0.0, 100.0, 104.0, 1104.0, "spectrogram.png");
        let image = ImageDetails::new(1000, 1000);
        let panel = PanelRect::new(0.0, 0.0, 1000.0, 1000.0);
        let viewport =
            ViewportState::new(&config, 1000.0, 1000.0, ZoomLimits::default()).expect("valid");
        let transformer = CoordinateTransformer::new(config.bounds(), image, panel, &viewport);

        let mut store = FeatureStore::new(palette());
        let set = store.add_harmonic_set(50.0, 100.0);
        assert_eq!(store.harmonic_at(&transformer, DomainPoint::new(50.0, 104.0), 8.0, 0.2), None);
        // The lowest drawn line is still reachable
        assert_eq!(
            store.harmonic_at(&transformer, DomainPoint::new(50.0, 203.0), 8.0, 0.2),
            Some((set, 2))
        );
    }
}
