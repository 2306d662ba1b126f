//! Message handlers for the spectrogram widget.
//!
//! Each handler processes one category of messages, keeping
//! `SpectrogramWidget::update` a flat dispatch.

use crate::coords::{DomainPoint, ScreenPoint};
use crate::error::{Result, SvatError};
use crate::feature_store::Selection;
use crate::keybindings::{KeyAction, KeyCode};
use crate::message::{FeatureMessage, Modifiers, PointerButton, PointerMessage, ViewMessage};
use crate::model::{FeatureId, min_spacing, validate_spacing};
use crate::tools::{HarmonicsTool, PointerInput};
use crate::undo::{Command, redo_command, undo_command};
use crate::widget::SpectrogramWidget;

/// Handle pointer messages (press, drag, release, wheel, leave).
pub fn handle_pointer(widget: &mut SpectrogramWidget, msg: PointerMessage) {
    match msg {
        PointerMessage::Down {
            position,
            button,
            modifiers,
        } => {
            let input = pointer_input(widget, position, button, modifiers);
            widget.cursor = Some(input.viewport);
            let (modes, mut ctx) = widget.parts();
            modes.pointer_down(&mut ctx, &input);
        }
        PointerMessage::Move {
            position,
            modifiers,
        } => {
            let input = pointer_input(widget, position, PointerButton::Primary, modifiers);
            // The read-out follows the pointer in every mode
            widget.cursor = Some(input.viewport);
            widget.features.mark_dirty();
            let (modes, mut ctx) = widget.parts();
            modes.pointer_move(&mut ctx, &input);
        }
        PointerMessage::Up {
            position,
            button,
            modifiers,
        } => {
            let input = pointer_input(widget, position, button, modifiers);
            widget.cursor = Some(input.viewport);
            let (modes, mut ctx) = widget.parts();
            modes.pointer_up(&mut ctx, &input);
        }
        PointerMessage::ContextMenu { position } => {
            let input = pointer_input(widget, position, PointerButton::Secondary, Modifiers::default());
            let (modes, mut ctx) = widget.parts();
            modes.context_menu(&mut ctx, &input);
        }
        PointerMessage::Wheel { position, delta_y } => {
            if delta_y == 0.0 || !delta_y.is_finite() {
                return;
            }
            let step = widget.settings.preferences.zoom_step;
            let factor = if delta_y < 0.0 { step } else { 1.0 / step };
            let point = widget.transformer().screen_to_domain(position);
            widget.viewport.zoom_around_point(point, factor);
        }
        PointerMessage::Leave => {
            widget.cursor = None;
            widget.features.mark_dirty();
        }
        PointerMessage::Cancel => {
            log::debug!("❌ Pointer capture lost");
            widget.cancel_drag();
        }
    }
}

/// Handle view messages (zoom buttons, region zoom, resize).
pub fn handle_view(widget: &mut SpectrogramWidget, msg: ViewMessage) -> Result<()> {
    match msg {
        ViewMessage::ZoomIn => {
            let step = widget.settings.preferences.zoom_step;
            zoom_around_center(widget, step);
        }
        ViewMessage::ZoomOut => {
            let step = widget.settings.preferences.zoom_step;
            zoom_around_center(widget, 1.0 / step);
        }
        ViewMessage::ResetZoom => widget.viewport.reset(),
        ViewMessage::ZoomToRegion(region) => widget.viewport.zoom_to_region(region)?,
        ViewMessage::Resize(panel) => {
            panel.validate()?;
            widget.viewport.resize(panel.width, panel.height)?;
            widget.panel = panel;
            widget.features.mark_dirty();
            log::debug!("📐 Panel resized to {:.0}x{:.0}", panel.width, panel.height);
        }
    }
    Ok(())
}

/// Handle feature table messages.
pub fn handle_feature(widget: &mut SpectrogramWidget, msg: FeatureMessage) -> Result<()> {
    match msg {
        FeatureMessage::AddHarmonicSet { spacing } => {
            add_harmonic_set(widget, spacing)?;
        }
        FeatureMessage::DeleteMarker(id) => delete_marker(widget, id)?,
        FeatureMessage::DeleteHarmonicSet(id) => delete_harmonic_set(widget, id)?,
        FeatureMessage::ClearMarkers => clear_markers(widget),
        FeatureMessage::ClearHarmonicSets => clear_harmonic_sets(widget),
        FeatureMessage::Select(selection) => widget.features.select(selection),
    }
    Ok(())
}

/// Handle a key press through the configured bindings.
pub fn handle_key(widget: &mut SpectrogramWidget, key: KeyCode, modifiers: Modifiers) -> Result<()> {
    let Some(action) = widget.settings.keybindings.action_for_key(key, modifiers) else {
        log::trace!("⌨️ Unbound key {:?}", key);
        return Ok(());
    };
    log::debug!("⌨️ {:?} -> {:?}", key, action);

    match action {
        KeyAction::SetMode(mode) => {
            widget.set_mode(mode);
        }
        KeyAction::ResetZoom => handle_view(widget, ViewMessage::ResetZoom)?,
        KeyAction::ZoomIn => handle_view(widget, ViewMessage::ZoomIn)?,
        KeyAction::ZoomOut => handle_view(widget, ViewMessage::ZoomOut)?,
        KeyAction::DeleteSelected => match widget.features.selection() {
            Some(Selection::Marker(id)) => delete_marker(widget, id)?,
            Some(Selection::HarmonicSet(id)) => delete_harmonic_set(widget, id)?,
            None => {}
        },
        KeyAction::Cancel => {
            if widget.modes.is_dragging() {
                widget.cancel_drag();
            } else {
                widget.features.select(None);
            }
        }
        KeyAction::Undo => {
            handle_history(widget, true);
        }
        KeyAction::Redo => {
            handle_history(widget, false);
        }
        KeyAction::Nudge { dx, dy } => nudge_selection(widget, dx, dy, modifiers.shift),
    }
    Ok(())
}

/// Undo (or redo) one committed edit. Any drag in progress is cancelled first.
pub fn handle_history(widget: &mut SpectrogramWidget, undo: bool) -> bool {
    widget.cancel_drag();
    let applied = if undo {
        undo_command(&mut widget.undo, &mut widget.features)
    } else {
        redo_command(&mut widget.undo, &mut widget.features)
    };
    if applied {
        log::debug!(
            "📚 History: {} to undo, {} to redo",
            widget.undo.undo_count(),
            widget.undo.redo_count()
        );
    }
    applied
}

/// Add a harmonic set with an explicit spacing (manual entry).
pub fn add_harmonic_set(widget: &mut SpectrogramWidget, spacing: f64) -> Result<FeatureId> {
    let (_, mut ctx) = widget.parts();
    HarmonicsTool::add_manual(&mut ctx, spacing)
}

/// Delete a marker by id, recording the deletion for undo.
pub fn delete_marker(widget: &mut SpectrogramWidget, id: FeatureId) -> Result<()> {
    widget.cancel_drag();
    let (index, marker) = widget
        .features
        .remove_marker(id)
        .ok_or_else(|| SvatError::unknown_marker(id))?;
    widget.undo.push(Command::RemoveMarker { marker, index });
    Ok(())
}

/// Delete a harmonic set by id, recording the deletion for undo.
pub fn delete_harmonic_set(widget: &mut SpectrogramWidget, id: FeatureId) -> Result<()> {
    widget.cancel_drag();
    let (index, set) = widget
        .features
        .remove_harmonic_set(id)
        .ok_or_else(|| SvatError::unknown_harmonic_set(id))?;
    widget.undo.push(Command::RemoveHarmonicSet { set, index });
    Ok(())
}

pub fn clear_markers(widget: &mut SpectrogramWidget) {
    widget.cancel_drag();
    let markers = widget.features.clear_markers();
    if !markers.is_empty() {
        widget.undo.push(Command::ClearMarkers { markers });
    }
}

pub fn clear_harmonic_sets(widget: &mut SpectrogramWidget) {
    widget.cancel_drag();
    let sets = widget.features.clear_harmonic_sets();
    if !sets.is_empty() {
        widget.undo.push(Command::ClearHarmonicSets { sets });
    }
}

/// Convert a raw screen position into the tool input for this frame.
fn pointer_input(
    widget: &SpectrogramWidget,
    position: ScreenPoint,
    button: PointerButton,
    modifiers: Modifiers,
) -> PointerInput {
    let transformer = widget.transformer();
    let viewport = transformer.screen_to_viewport(position);
    PointerInput {
        viewport,
        domain: transformer.viewport_to_domain(viewport),
        inside_image: transformer.is_inside_image(transformer.viewport_to_image(viewport)),
        button,
        modifiers,
    }
}

fn zoom_around_center(widget: &mut SpectrogramWidget, factor: f64) {
    let center = widget.viewport.visible_domain().center();
    widget.viewport.zoom_around_point(center, factor);
}

/// Move the selected feature by whole viewport pixels.
///
/// `dx` moves along frequency, `dy` along the screen's vertical axis, so
/// up (negative `dy`) is later in time. Harmonic sets take the horizontal
/// step as a spacing change.
fn nudge_selection(widget: &mut SpectrogramWidget, dx: f64, dy: f64, coarse: bool) {
    if widget.modes.is_dragging() {
        return;
    }
    let prefs = &widget.settings.preferences;
    let step = if coarse { prefs.nudge_step_coarse } else { prefs.nudge_step };
    let (seconds, hertz) = widget.transformer().domain_per_pixel();
    let d_time = -dy * step * seconds;
    let d_freq = dx * step * hertz;
    let bounds = widget.config.bounds();

    match widget.features.selection() {
        Some(Selection::Marker(id)) => {
            let Some(old) = widget.features.marker(id).map(|m| m.position()) else {
                return;
            };
            let new = bounds.clamp(DomainPoint::new(old.time + d_time, old.frequency + d_freq));
            if new != old && widget.features.move_marker(id, new) {
                widget.undo.push(Command::MoveMarker { id, old, new });
                log::debug!("📍 Marker {} nudged to ({:.3}s, {:.1}Hz)", id, new.time, new.frequency);
            }
        }
        Some(Selection::HarmonicSet(id)) => {
            let Some(set) = widget.features.harmonic_set(id) else {
                return;
            };
            let old = (set.anchor_time, set.spacing);
            let anchor = (old.0 + d_time).clamp(bounds.time_min, bounds.time_max);
            let finest = min_spacing(bounds.freq_span(), widget.image.natural_width);
            let Ok(spacing) = validate_spacing(old.1 + d_freq, finest) else {
                log::debug!("🎼 Nudge would make spacing finer than a pixel, ignored");
                return;
            };
            let new = (anchor, spacing);
            if new != old && widget.features.update_harmonic_set(id, anchor, spacing) {
                widget.undo.push(Command::ModifyHarmonicSet { id, old, new });
                log::debug!("🎼 Harmonic set {} nudged: anchor {:.3}s, spacing {:.2}Hz", id, anchor, spacing);
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageDetails, SpectrogramConfig, WidgetConfig};
    use crate::coords::PanelRect;

    fn widget() -> SpectrogramWidget {
        SpectrogramWidget::new(
            SpectrogramConfig::new(0.0, 100.0, 0.0, 1000.0, "spectrogram.png"),
            ImageDetails::new(1000, 1000),
            WidgetConfig::default(),
            PanelRect::new(0.0, 0.0, 1000.0, 1000.0),
        )
        .expect("valid widget")
    }

    #[test]
    fn test_wheel_zooms_around_cursor() {
        let mut w = widget();
        let position = ScreenPoint::new(250.0, 750.0);
        let before = w.transformer().screen_to_domain(position);
        handle_pointer(&mut w, PointerMessage::Wheel { position, delta_y: -120.0 });
        assert!(w.viewport.is_zoomed());
        let after = w.transformer().screen_to_domain(position);
        assert!((before.time - after.time).abs() < 1e-9);
        assert!((before.frequency - after.frequency).abs() < 1e-9);
    }

    #[test]
    fn test_nudge_marker_scales_with_zoom() {
        let mut w = widget();
        let id = w.features.add_marker(DomainPoint::new(50.0, 500.0));
        w.features.select(Some(Selection::Marker(id)));

        handle_key(&mut w, KeyCode::ArrowRight, Modifiers::default()).expect("key handled");
        let moved = w.features.marker(id).map(|m| m.position()).expect("marker");
        assert!((moved.frequency - 501.0).abs() < 1e-9);

        // Shift + up: 5 px later in time
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        handle_key(&mut w, KeyCode::ArrowUp, shift).expect("key handled");
        let moved = w.features.marker(id).map(|m| m.position()).expect("marker");
        assert!((moved.time - 50.5).abs() < 1e-9);
        assert_eq!(w.undo.undo_count(), 2);
    }

    #[test]
    fn test_nudge_harmonic_spacing() {
        let mut w = widget();
        let id = w.features.add_harmonic_set(50.0, 100.0);
        w.features.select(Some(Selection::HarmonicSet(id)));
        handle_key(&mut w, KeyCode::ArrowLeft, Modifiers::default()).expect("key handled");
        let set = w.features.harmonic_set(id).expect("set");
        assert!((set.spacing - 99.0).abs() < 1e-9);

        // One pixel is 1 Hz here; nudging 1.5 Hz down to 0.5 Hz is refused
        let fine = w.features.add_harmonic_set(50.0, 1.5);
        w.features.select(Some(Selection::HarmonicSet(fine)));
        handle_key(&mut w, KeyCode::ArrowLeft, Modifiers::default()).expect("key handled");
        let set = w.features.harmonic_set(fine).expect("set");
        assert!((set.spacing - 1.5).abs() < 1e-9);
        assert_eq!(w.undo.undo_count(), 1);
    }

    #[test]
    fn test_delete_unknown_feature_errors() {
        let mut w = widget();
        assert!(matches!(
            delete_marker(&mut w, 42),
            Err(SvatError::UnknownFeature { .. })
        ));
        assert!(delete_harmonic_set(&mut w, 42).is_err());
        assert_eq!(w.undo.undo_count(), 0);
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let mut w = widget();
        let id = w.features.add_marker(DomainPoint::new(50.0, 500.0));
        w.features.select(Some(Selection::Marker(id)));
        handle_key(&mut w, KeyCode::Delete, Modifiers::default()).expect("key handled");
        assert!(w.features.markers().is_empty());
        assert!(handle_history(&mut w, true));
        assert_eq!(w.features.markers().len(), 1);
    }

    #[test]
    fn test_clear_is_single_undo_step() {
        let mut w = widget();
        w.features.add_marker(DomainPoint::new(10.0, 100.0));
        w.features.add_marker(DomainPoint::new(20.0, 200.0));
        clear_markers(&mut w);
        assert!(w.features.markers().is_empty());
        handle_history(&mut w, true);
        assert_eq!(w.features.markers().len(), 2);

        // Clearing nothing records nothing
        clear_harmonic_sets(&mut w);
        assert_eq!(w.undo.undo_count(), 0);
    }

    #[test]
    fn test_resize_rejects_empty_panel() {
        let mut w = widget();
        let result = handle_view(&mut w, ViewMessage::Resize(PanelRect::new(0.0, 0.0, 0.0, 10.0)));
        assert!(result.is_err());
        assert_eq!(w.panel.width, 1000.0);
    }
}
