//! Pan mode: drag to move a zoomed view.

use super::{PointerInput, Tool, ToolContext};
use crate::coords::ViewportPoint;
use crate::message::PointerButton;
use crate::mode::Mode;
use crate::render::{DrawItem, RenderContext};

#[derive(Debug, Clone, Copy, PartialEq)]
enum PanDrag {
    Idle,
    Dragging {
        last: ViewportPoint,
        /// Pan offsets at press time, restored on cancel
        original: (f64, f64),
    },
}

/// Moves the view with the primary button. The middle button pans in every
/// mode and is handled by the mode controller with its own [`PanTool`].
#[derive(Debug)]
pub struct PanTool {
    drag: PanDrag,
    button: PointerButton,
}

impl PanTool {
    pub fn new() -> Self {
        Self::with_button(PointerButton::Primary)
    }

    /// A pan tool driven by `button` instead of the primary button.
    pub fn with_button(button: PointerButton) -> Self {
        Self {
            drag: PanDrag::Idle,
            button,
        }
    }
}

impl Default for PanTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PanTool {
    fn mode(&self) -> Mode {
        Mode::Pan
    }

    fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        if let PanDrag::Dragging { original, .. } = self.drag {
            ctx.viewport.set_pan(original.0, original.1);
        }
        self.drag = PanDrag::Idle;
    }

    fn is_dragging(&self) -> bool {
        matches!(self.drag, PanDrag::Dragging { .. })
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if input.button != self.button {
            return;
        }
        self.drag = PanDrag::Dragging {
            last: input.viewport,
            original: ctx.viewport.pan(),
        };
        log::debug!("🖐️ Pan started");
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if let PanDrag::Dragging { ref mut last, .. } = self.drag {
            let dx = input.viewport.x - last.x;
            let dy = input.viewport.y - last.y;
            *last = input.viewport;
            ctx.viewport.pan_by(dx, dy);
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if self.is_dragging() {
            self.on_pointer_move(ctx, input);
            log::debug!("🖐️ Pan ended");
        }
        self.drag = PanDrag::Idle;
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>) {
        // Panning has no overlay
        let _ = (ctx, out);
    }
}
