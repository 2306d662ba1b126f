//! The embeddable spectrogram widget.
//!
//! `SpectrogramWidget` owns every piece of state (configuration, viewport,
//! features, undo history and the mode controller) and exposes an Elm-style
//! `update(message)` plus a `render()` that rebuilds the frame from scratch.

use serde::Serialize;

use crate::config::{ImageDetails, SpectrogramConfig, WidgetConfig};
use crate::coords::{CoordinateTransformer, DomainBounds, PanelRect, ViewportPoint};
use crate::error::Result;
use crate::event::WidgetEvent;
use crate::feature_store::{FeatureSnapshot, FeatureStore};
use crate::handlers;
use crate::message::{FeatureMessage, WidgetMessage, ViewMessage};
use crate::mode::{Mode, ModeController};
use crate::model::FeatureId;
use crate::render::{CursorReadout, Frame, Readout, RenderContext, crosshair};
use crate::tools::ToolContext;
use crate::undo::{UndoConfig, UndoStack};
use crate::viewport::{ViewportState, ZoomLimits};

pub struct SpectrogramWidget {
    pub(crate) config: SpectrogramConfig,
    pub(crate) image: ImageDetails,
    pub(crate) settings: WidgetConfig,
    /// Where the panel sits on the host screen
    pub(crate) panel: PanelRect,
    pub(crate) viewport: ViewportState,
    pub(crate) features: FeatureStore,
    pub(crate) undo: UndoStack,
    pub(crate) modes: ModeController,
    /// Last pointer position, `None` once the pointer leaves the panel
    pub(crate) cursor: Option<ViewportPoint>,
}

/// Serializable summary of the widget for hosts and session replays.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub mode: Mode,
    pub viewport: ViewportState,
    pub features: FeatureSnapshot,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl SpectrogramWidget {
    /// Build a widget, refusing any invalid input up front.
    pub fn new(
        config: SpectrogramConfig,
        image: ImageDetails,
        settings: WidgetConfig,
        panel: PanelRect,
    ) -> Result<Self> {
        config.validate()?;
        image.validate()?;
        settings.validate()?;
        panel.validate()?;

        let prefs = &settings.preferences;
        let limits = ZoomLimits::new(prefs.min_zoom, prefs.max_zoom)?;
        let viewport = ViewportState::new(&config, panel.width, panel.height, limits)?;
        let undo = UndoStack::with_config(UndoConfig {
            max_history: prefs.max_history,
        });
        let features = FeatureStore::new(settings.palette.clone());

        log::info!(
            "🎛️ Widget ready: {:.3}-{:.3}s, {:.1}-{:.1}Hz, image {}x{}",
            config.time_min,
            config.time_max,
            config.freq_min,
            config.freq_max,
            image.natural_width,
            image.natural_height
        );

        Ok(Self {
            config,
            image,
            settings,
            panel,
            viewport,
            features,
            undo,
            modes: ModeController::new(),
            cursor: None,
        })
    }

    /// Process one message.
    ///
    /// Emits `ViewportChanged` when the visible window moved and leaves Pan
    /// mode if the view dropped back to 1:1.
    pub fn update(&mut self, msg: WidgetMessage) -> Result<()> {
        let before = self.viewport.clone();
        let result = match msg {
            WidgetMessage::Pointer(pointer) => {
                handlers::handle_pointer(self, pointer);
                Ok(())
            }
            WidgetMessage::View(view) => handlers::handle_view(self, view),
            WidgetMessage::Feature(feature) => handlers::handle_feature(self, feature),
            WidgetMessage::SetMode(mode) => {
                self.set_mode(mode);
                Ok(())
            }
            WidgetMessage::Key { key, modifiers } => handlers::handle_key(self, key, modifiers),
            WidgetMessage::Undo => {
                handlers::handle_history(self, true);
                Ok(())
            }
            WidgetMessage::Redo => {
                handlers::handle_history(self, false);
                Ok(())
            }
        };
        if self.viewport != before {
            self.viewport_changed();
        }
        result
    }

    fn viewport_changed(&mut self) {
        self.features.emit(WidgetEvent::ViewportChanged {
            scale: self.viewport.scale(),
            visible: self.viewport.visible_domain(),
        });
        self.features.mark_dirty();
        let (modes, mut ctx) = self.parts();
        modes.sync_with_viewport(&mut ctx);
    }

    /// Split borrows: the mode controller plus a context over everything else.
    pub(crate) fn parts(&mut self) -> (&mut ModeController, ToolContext<'_>) {
        let ctx = ToolContext {
            bounds: self.config.bounds(),
            image: self.image,
            panel: self.panel,
            settings: &self.settings,
            viewport: &mut self.viewport,
            features: &mut self.features,
            undo: &mut self.undo,
        };
        (&mut self.modes, ctx)
    }

    pub fn transformer(&self) -> CoordinateTransformer<'_> {
        CoordinateTransformer::new(self.config.bounds(), self.image, self.panel, &self.viewport)
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.modes.active()
    }

    /// Select a mode. Returns false if unchanged or unavailable (Pan at 1:1).
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        let (modes, mut ctx) = self.parts();
        modes.set_mode(mode, &mut ctx)
    }

    /// Whether `mode` can currently be selected (toolbar button state).
    pub fn is_mode_available(&self, mode: Mode) -> bool {
        mode != Mode::Pan || self.viewport.is_zoomed()
    }

    /// Abort any drag in progress without committing it.
    pub fn cancel_drag(&mut self) {
        let (modes, mut ctx) = self.parts();
        modes.cancel_drag(&mut ctx);
    }

    pub fn is_dragging(&self) -> bool {
        self.modes.is_dragging()
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn zoom_in(&mut self) -> Result<()> {
        self.update(WidgetMessage::View(ViewMessage::ZoomIn))
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.update(WidgetMessage::View(ViewMessage::ZoomOut))
    }

    pub fn reset_zoom(&mut self) -> Result<()> {
        self.update(WidgetMessage::View(ViewMessage::ResetZoom))
    }

    pub fn zoom_to_region(&mut self, region: DomainBounds) -> Result<()> {
        self.update(WidgetMessage::View(ViewMessage::ZoomToRegion(region)))
    }

    /// The panel moved or changed size; the visible window is kept.
    pub fn resize(&mut self, panel: PanelRect) -> Result<()> {
        self.update(WidgetMessage::View(ViewMessage::Resize(panel)))
    }

    // ------------------------------------------------------------------
    // Feature table
    // ------------------------------------------------------------------

    /// Add a harmonic set with an explicit spacing, anchored in the visible window.
    pub fn add_harmonic_set(&mut self, spacing: f64) -> Result<FeatureId> {
        handlers::add_harmonic_set(self, spacing)
    }

    pub fn delete_marker(&mut self, id: FeatureId) -> Result<()> {
        self.update(WidgetMessage::Feature(FeatureMessage::DeleteMarker(id)))
    }

    pub fn delete_harmonic_set(&mut self, id: FeatureId) -> Result<()> {
        self.update(WidgetMessage::Feature(FeatureMessage::DeleteHarmonicSet(id)))
    }

    pub fn clear_markers(&mut self) {
        handlers::clear_markers(self);
    }

    pub fn clear_harmonic_sets(&mut self) {
        handlers::clear_harmonic_sets(self);
    }

    pub fn undo(&mut self) -> bool {
        handlers::handle_history(self, true)
    }

    pub fn redo(&mut self) -> bool {
        handlers::handle_history(self, false)
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.undo.redo_description()
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Build the draw list and read-out for the current state.
    pub fn render(&self) -> Frame {
        let ctx = RenderContext {
            transformer: self.transformer(),
            features: &self.features,
            settings: &self.settings,
            active_mode: self.modes.active(),
        };
        let mut items = Vec::new();
        self.modes.render(&ctx, &mut items);
        if let Some(cursor) = self.cursor {
            items.extend(crosshair(cursor, ctx.width(), ctx.height()));
        }

        Frame {
            items,
            readout: self.readout(),
        }
    }

    /// Live values for the read-out display.
    pub fn readout(&self) -> Readout {
        let transformer = self.transformer();
        let cursor = self.cursor.map(|p| {
            let domain = transformer.viewport_to_domain(p);
            CursorReadout {
                time: domain.time,
                frequency: domain.frequency,
                inside_image: transformer.is_inside_image(transformer.viewport_to_image(p)),
            }
        });
        Readout {
            cursor,
            doppler_speed: self
                .modes
                .doppler()
                .speed(self.features.doppler(), self.settings.preferences.sound_speed),
            zoom: self.viewport.scale(),
        }
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            mode: self.modes.active(),
            viewport: self.viewport.clone(),
            features: FeatureSnapshot::from(&self.features),
            can_undo: self.undo.can_undo(),
            can_redo: self.undo.can_redo(),
        }
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        self.features.take_events()
    }

    /// Whether anything visible changed since the last `clear_dirty()`.
    pub fn is_dirty(&self) -> bool {
        self.features.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.features.clear_dirty();
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.config
    }

    pub fn image(&self) -> ImageDetails {
        self.image
    }

    pub fn settings(&self) -> &WidgetConfig {
        &self.settings
    }

    pub fn panel(&self) -> PanelRect {
        self.panel
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn features(&self) -> &FeatureStore {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ScreenPoint;
    use crate::message::{PointerButton, PointerMessage};
    use crate::render::Primitive;

    fn widget() -> SpectrogramWidget {
        SpectrogramWidget::new(
            SpectrogramConfig::new(0.0, 100.0, 0.0, 1000.0, "spectrogram.png"),
            ImageDetails::new(2000, 500),
            WidgetConfig::default(),
            PanelRect::new(100.0, 50.0, 1000.0, 1000.0),
        )
        .expect("valid widget")
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = SpectrogramWidget::new(
            SpectrogramConfig::new(10.0, 10.0, 0.0, 1000.0, "spectrogram.png"),
            ImageDetails::new(100, 100),
            WidgetConfig::default(),
            PanelRect::new(0.0, 0.0, 100.0, 100.0),
        );
        assert!(result.is_err());

        let result = SpectrogramWidget::new(
            SpectrogramConfig::new(0.0, 10.0, 0.0, 1000.0, "spectrogram.png"),
            ImageDetails::new(0, 100),
            WidgetConfig::default(),
            PanelRect::new(0.0, 0.0, 100.0, 100.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_readout_tracks_cursor_in_every_mode() {
        let mut w = widget();
        for mode in [Mode::Analysis, Mode::Harmonics, Mode::Doppler] {
            w.set_mode(mode);
            w.update(WidgetMessage::Pointer(PointerMessage::Move {
                position: ScreenPoint::new(600.0, 550.0),
                modifiers: Default::default(),
            }))
            .expect("move handled");
            let cursor = w.readout().cursor.expect("cursor inside panel");
            assert!((cursor.time - 50.0).abs() < 1e-9);
            assert!((cursor.frequency - 500.0).abs() < 1e-9);
            assert!(cursor.inside_image);
        }

        w.update(WidgetMessage::Pointer(PointerMessage::Leave))
            .expect("leave handled");
        assert_eq!(w.readout().cursor, None);
    }

    #[test]
    fn test_viewport_change_emits_event() {
        let mut w = widget();
        w.take_events();
        w.zoom_in().expect("zoom");
        let events = w.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, WidgetEvent::ViewportChanged { .. }))
        );

        // Zooming out past 1:1 is clamped: no change, no event
        w.reset_zoom().expect("reset");
        w.take_events();
        w.zoom_out().expect("zoom out");
        assert!(w.take_events().is_empty());
    }

    #[test]
    fn test_render_includes_crosshair_and_markers() {
        let mut w = widget();
        let at = ScreenPoint::new(400.0, 300.0);
        for msg in [
            PointerMessage::Down {
                position: at,
                button: PointerButton::Primary,
                modifiers: Default::default(),
            },
            PointerMessage::Up {
                position: at,
                button: PointerButton::Primary,
                modifiers: Default::default(),
            },
        ] {
            w.update(WidgetMessage::Pointer(msg)).expect("pointer handled");
        }

        let frame = w.render();
        let circles = frame
            .items
            .iter()
            .filter(|item| matches!(item.primitive, Primitive::Circle { .. }))
            .count();
        let overlay = frame.items.iter().filter(|item| item.owner.is_none()).count();
        assert_eq!(circles, 1);
        assert_eq!(overlay, 2);
        assert_eq!(frame.readout.zoom, (1.0, 1.0));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut w = widget();
        w.add_harmonic_set(120.0).expect("valid spacing");
        let json = serde_json::to_string(&w.snapshot()).expect("serializable");
        assert!(json.contains("\"spacing\":120.0"));
        assert!(json.contains("\"can_undo\":true"));
    }
}
