//! Analysis mode: place, select, reposition and delete point markers.

use super::{PointerInput, Tool, ToolContext, exceeds_drag_distance};
use crate::constants::MARKER_RADIUS;
use crate::coords::{DomainPoint, ViewportPoint};
use crate::feature_store::Selection;
use crate::message::PointerButton;
use crate::mode::Mode;
use crate::model::FeatureId;
use crate::render::{DrawItem, Primitive, RenderContext};
use crate::undo::Command;

/// Drag state of the analysis tool.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AnalysisDrag {
    Idle,
    /// An existing marker was grabbed
    Moving {
        id: FeatureId,
        original: DomainPoint,
        /// Marker position minus the press position
        grab_offset: (f64, f64),
        press: ViewportPoint,
        moved: bool,
    },
}

#[derive(Debug)]
pub struct AnalysisTool {
    drag: AnalysisDrag,
}

impl AnalysisTool {
    pub fn new() -> Self {
        Self {
            drag: AnalysisDrag::Idle,
        }
    }
}

impl Default for AnalysisTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AnalysisTool {
    fn mode(&self) -> Mode {
        Mode::Analysis
    }

    fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        if let AnalysisDrag::Moving {
            id,
            original,
            moved: true,
            ..
        } = self.drag
        {
            ctx.features.move_marker(id, original);
            log::debug!("📍 Marker {} drag cancelled", id);
        }
        self.drag = AnalysisDrag::Idle;
    }

    fn is_dragging(&self) -> bool {
        matches!(self.drag, AnalysisDrag::Moving { .. })
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if input.button != PointerButton::Primary {
            return;
        }
        let tolerance = ctx.settings.preferences.hit_tolerance;
        let hit = ctx
            .features
            .marker_at(&ctx.transformer(), input.viewport, tolerance);

        if let Some(id) = hit {
            let Some(original) = ctx.features.marker(id).map(|m| m.position()) else {
                return;
            };
            ctx.features.select(Some(Selection::Marker(id)));
            self.drag = AnalysisDrag::Moving {
                id,
                original,
                grab_offset: (
                    original.time - input.domain.time,
                    original.frequency - input.domain.frequency,
                ),
                press: input.viewport,
                moved: false,
            };
            return;
        }

        if !input.inside_image {
            log::debug!("📍 Click outside image ignored");
            return;
        }

        let id = ctx.features.add_marker(input.domain);
        if let Some((index, marker)) = ctx
            .features
            .markers()
            .iter()
            .enumerate()
            .find(|(_, m)| m.id == id)
        {
            ctx.undo.push(Command::AddMarker {
                marker: marker.clone(),
                index,
            });
        }
        ctx.features.select(Some(Selection::Marker(id)));
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        let AnalysisDrag::Moving {
            id,
            grab_offset,
            press,
            ref mut moved,
            ..
        } = self.drag
        else {
            return;
        };
        if !*moved
            && !exceeds_drag_distance(
                press,
                input.viewport,
                ctx.settings.preferences.min_drag_distance,
            )
        {
            return;
        }
        *moved = true;
        let target = ctx.bounds.clamp(DomainPoint::new(
            input.domain.time + grab_offset.0,
            input.domain.frequency + grab_offset.1,
        ));
        ctx.features.move_marker(id, target);
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        self.on_pointer_move(ctx, input);
        if let AnalysisDrag::Moving {
            id,
            original,
            moved: true,
            ..
        } = self.drag
            && let Some(new) = ctx.features.marker(id).map(|m| m.position())
            && new != original
        {
            ctx.undo.push(Command::MoveMarker {
                id,
                old: original,
                new,
            });
            log::debug!(
                "📍 Marker {} moved to ({:.3}s, {:.1}Hz)",
                id,
                new.time,
                new.frequency
            );
        }
        self.drag = AnalysisDrag::Idle;
    }

    fn on_context_menu(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if self.is_dragging() {
            self.cancel_drag(ctx);
        }
        let tolerance = ctx.settings.preferences.hit_tolerance;
        let Some(id) = ctx
            .features
            .marker_at(&ctx.transformer(), input.viewport, tolerance)
        else {
            return;
        };
        if let Some((index, marker)) = ctx.features.remove_marker(id) {
            ctx.undo.push(Command::RemoveMarker { marker, index });
        }
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>) {
        let dragged = match self.drag {
            AnalysisDrag::Moving { id, .. } => Some(id),
            AnalysisDrag::Idle => None,
        };
        for marker in ctx.features.markers() {
            let center = ctx.transformer.domain_to_viewport(marker.position());
            let emphasized = dragged == Some(marker.id)
                || ctx.features.is_selected(Selection::Marker(marker.id));
            out.push(ctx.item(
                Mode::Analysis,
                Primitive::Circle {
                    center,
                    radius: MARKER_RADIUS,
                },
                &marker.color,
                emphasized,
            ));
            if emphasized {
                out.push(ctx.item(
                    Mode::Analysis,
                    Primitive::Text {
                        anchor: ViewportPoint::new(center.x + MARKER_RADIUS * 2.0, center.y),
                        text: marker_label(marker.position()),
                    },
                    &marker.color,
                    true,
                ));
            }
        }
    }
}

fn marker_label(position: DomainPoint) -> String {
    format!("{:.3} s, {:.1} Hz", position.time, position.frequency)
}
