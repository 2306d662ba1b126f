//! Harmonics mode: create harmonic sets and adjust them by dragging a line.
//!
//! Dragging keeps the grabbed harmonic under the pointer: horizontal motion
//! rescales the spacing (`spacing = f / n` for the grabbed index `n`) while
//! vertical motion shifts the anchor time by the same amount the pointer moved.

use super::{PointerInput, Tool, ToolContext, exceeds_drag_distance};
use crate::coords::{DomainPoint, ViewportPoint};
use crate::error::Result;
use crate::feature_store::Selection;
use crate::message::PointerButton;
use crate::mode::Mode;
use crate::model::{FeatureId, HarmonicSet, validate_spacing};
use crate::render::{DrawItem, Primitive, RenderContext, harmonic_label};
use crate::undo::Command;
use crate::viewport::ViewportState;

/// Label offset above the top of a harmonic line, in pixels.
const LABEL_OFFSET: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum HarmonicsDrag {
    Idle,
    Adjusting {
        id: FeatureId,
        /// Harmonic index that stays under the pointer
        harmonic: u32,
        /// (anchor_time, spacing) before the drag
        original: (f64, f64),
        start_time: f64,
        press: ViewportPoint,
        moved: bool,
    },
}

#[derive(Debug)]
pub struct HarmonicsTool {
    drag: HarmonicsDrag,
}

impl HarmonicsTool {
    pub fn new() -> Self {
        Self {
            drag: HarmonicsDrag::Idle,
        }
    }

    /// Add a set with an explicit spacing, anchored in the middle of the
    /// visible time range so it shows up without resetting the zoom.
    pub fn add_manual(ctx: &mut ToolContext<'_>, spacing: f64) -> Result<FeatureId> {
        let spacing = validate_spacing(spacing, ctx.min_harmonic_spacing())?;
        let anchor_time = manual_anchor_time(ctx.viewport);
        let id = ctx.features.add_harmonic_set(anchor_time, spacing);
        record_added(ctx, id);
        Ok(id)
    }

    fn dragged_set(&self) -> Option<(FeatureId, u32)> {
        match self.drag {
            HarmonicsDrag::Adjusting { id, harmonic, .. } => Some((id, harmonic)),
            HarmonicsDrag::Idle => None,
        }
    }
}

impl Default for HarmonicsTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Anchor time for a manually entered set: center of the visible time window.
pub fn manual_anchor_time(viewport: &ViewportState) -> f64 {
    viewport.visible_domain().center().time
}

fn record_added(ctx: &mut ToolContext<'_>, id: FeatureId) {
    if let Some((index, set)) = ctx
        .features
        .harmonic_sets()
        .iter()
        .enumerate()
        .find(|(_, s)| s.id == id)
    {
        ctx.undo.push(Command::AddHarmonicSet {
            set: set.clone(),
            index,
        });
    }
    ctx.features.select(Some(Selection::HarmonicSet(id)));
}

impl Tool for HarmonicsTool {
    fn mode(&self) -> Mode {
        Mode::Harmonics
    }

    fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        if let HarmonicsDrag::Adjusting {
            id,
            original,
            moved: true,
            ..
        } = self.drag
        {
            ctx.features.update_harmonic_set(id, original.0, original.1);
            log::debug!("🎼 Harmonic set {} drag cancelled", id);
        }
        self.drag = HarmonicsDrag::Idle;
    }

    fn is_dragging(&self) -> bool {
        matches!(self.drag, HarmonicsDrag::Adjusting { .. })
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if input.button != PointerButton::Primary {
            return;
        }
        let prefs = &ctx.settings.preferences;
        let hit = ctx.features.harmonic_at(
            &ctx.transformer(),
            input.domain,
            prefs.hit_tolerance,
            prefs.harmonic_band_fraction,
        );

        if let Some((id, harmonic)) = hit {
            let Some(set) = ctx.features.harmonic_set(id) else {
                return;
            };
            self.drag = HarmonicsDrag::Adjusting {
                id,
                harmonic,
                original: (set.anchor_time, set.spacing),
                start_time: input.domain.time,
                press: input.viewport,
                moved: false,
            };
            ctx.features.select(Some(Selection::HarmonicSet(id)));
            log::debug!("🎼 Grabbed harmonic {} of set {}", harmonic, id);
            return;
        }

        if !input.inside_image {
            log::debug!("🎼 Click outside image ignored");
            return;
        }
        let Some(spacing) = HarmonicSet::spacing_for_click(
            input.domain.frequency,
            ctx.bounds.freq_min,
            ctx.min_harmonic_spacing(),
        ) else {
            log::debug!(
                "🎼 No usable spacing for click at {:.1}Hz",
                input.domain.frequency
            );
            return;
        };
        let id = ctx.features.add_harmonic_set(input.domain.time, spacing);
        record_added(ctx, id);
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        let HarmonicsDrag::Adjusting {
            id,
            harmonic,
            original,
            start_time,
            press,
            ref mut moved,
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

        let Some(current) = ctx.features.harmonic_set(id) else {
            return;
        };
        // Near 0 Hz no allowed spacing keeps the line under the pointer; hold the last one
        let spacing = validate_spacing(
            input.domain.frequency / f64::from(harmonic),
            ctx.min_harmonic_spacing(),
        )
        .unwrap_or(current.spacing);
        let anchor_time = (original.0 + (input.domain.time - start_time))
            .clamp(ctx.bounds.time_min, ctx.bounds.time_max);
        ctx.features.update_harmonic_set(id, anchor_time, spacing);
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        self.on_pointer_move(ctx, input);
        if let HarmonicsDrag::Adjusting {
            id,
            original,
            moved: true,
            ..
        } = self.drag
            && let Some(set) = ctx.features.harmonic_set(id)
        {
            let new = (set.anchor_time, set.spacing);
            if new != original {
                log::debug!(
                    "🎼 Harmonic set {} adjusted: anchor {:.3}s, spacing {:.2}Hz",
                    id,
                    new.0,
                    new.1
                );
                ctx.undo.push(Command::ModifyHarmonicSet { id, old: original, new });
            }
        }
        self.drag = HarmonicsDrag::Idle;
    }

    fn on_context_menu(&mut self, ctx: &mut ToolContext<'_>, _input: &PointerInput) {
        // Sets are only deleted from the feature table
        self.cancel_drag(ctx);
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>) {
        let bounds = ctx.transformer.bounds();
        let visible = ctx.transformer.viewport().visible_domain();
        let freq_min = bounds.freq_min.max(visible.freq_min);
        let freq_max = bounds.freq_max.min(visible.freq_max);
        let fraction = ctx.settings.preferences.harmonic_band_fraction;
        let dragged = self.dragged_set();

        for set in ctx.features.harmonic_sets() {
            let (lo, hi) = set.band(bounds, fraction);
            let (lo, hi) = (lo.max(bounds.time_min), hi.min(bounds.time_max));
            let set_emphasized = ctx.features.is_selected(Selection::HarmonicSet(set.id))
                || dragged.is_some_and(|(id, _)| id == set.id);

            for (n, frequency) in set.harmonics(freq_min, freq_max) {
                let top = ctx.transformer.domain_to_viewport(DomainPoint::new(hi, frequency));
                let bottom = ctx.transformer.domain_to_viewport(DomainPoint::new(lo, frequency));
                let grabbed = dragged == Some((set.id, n));
                out.push(ctx.item(
                    Mode::Harmonics,
                    Primitive::Line {
                        from: top,
                        to: bottom,
                    },
                    &set.color,
                    set_emphasized || grabbed,
                ));
                out.push(ctx.item(
                    Mode::Harmonics,
                    Primitive::Text {
                        anchor: ViewportPoint::new(top.x, top.y - LABEL_OFFSET),
                        text: harmonic_label(n, frequency),
                    },
                    &set.color,
                    grabbed,
                ));
            }
        }
    }
}
