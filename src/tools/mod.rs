//! Interaction tools, one per mode.
//!
//! Each tool owns only its transient drag state. Persistent data lives in the
//! [`FeatureStore`] and view state in the [`ViewportState`], both handed in
//! through a [`ToolContext`] on every call.

mod analysis;
mod doppler;
mod harmonics;
mod pan;

pub use analysis::AnalysisTool;
pub use doppler::DopplerTool;
pub use harmonics::{HarmonicsTool, manual_anchor_time};
pub use pan::PanTool;

use crate::config::{ImageDetails, WidgetConfig};
use crate::coords::{CoordinateTransformer, DomainBounds, DomainPoint, PanelRect, ViewportPoint};
use crate::feature_store::FeatureStore;
use crate::message::{Modifiers, PointerButton};
use crate::mode::Mode;
use crate::model::min_spacing;
use crate::render::{DrawItem, RenderContext};
use crate::undo::UndoStack;
use crate::viewport::ViewportState;

/// Mutable access to everything a tool may touch while handling an event.
pub struct ToolContext<'a> {
    pub bounds: DomainBounds,
    pub image: ImageDetails,
    pub panel: PanelRect,
    pub settings: &'a WidgetConfig,
    pub viewport: &'a mut ViewportState,
    pub features: &'a mut FeatureStore,
    pub undo: &'a mut UndoStack,
}

impl ToolContext<'_> {
    /// Transformer for the current view.
    pub fn transformer(&self) -> CoordinateTransformer<'_> {
        CoordinateTransformer::new(self.bounds, self.image, self.panel, self.viewport)
    }

    /// Finest harmonic spacing the image can show.
    pub fn min_harmonic_spacing(&self) -> f64 {
        min_spacing(self.bounds.freq_span(), self.image.natural_width)
    }
}

/// A pointer event already converted to viewport and domain space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub viewport: ViewportPoint,
    pub domain: DomainPoint,
    /// Whether the point falls on the image footprint
    pub inside_image: bool,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

/// Contract every mode's tool implements.
pub trait Tool {
    fn mode(&self) -> Mode;

    /// Called when the mode becomes active
    fn activate(&mut self, ctx: &mut ToolContext<'_>) {
        let _ = ctx;
    }

    /// Called when another mode takes over. Cancels any drag by default.
    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.cancel_drag(ctx);
    }

    /// Abort an in-progress drag, restoring the state from before it began.
    fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>);

    fn is_dragging(&self) -> bool;

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput);

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput);

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput);

    /// Destructive gesture (right-click)
    fn on_context_menu(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        let _ = (ctx, input);
    }

    /// Append this tool's primitives. Called for every tool, active or not,
    /// so features stay visible across modes.
    fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>);
}

/// Whether the pointer travelled far enough from `start` to count as a drag.
pub(crate) fn exceeds_drag_distance(start: ViewportPoint, current: ViewportPoint, min: f64) -> bool {
    start.distance_to(&current) >= min
}
