//! Interaction modes and the controller that routes events to their tools.

use serde::{Deserialize, Serialize};

use crate::event::WidgetEvent;
use crate::message::PointerButton;
use crate::render::{DrawItem, RenderContext};
use crate::tools::{AnalysisTool, DopplerTool, HarmonicsTool, PanTool, PointerInput, Tool, ToolContext};

/// The mutually exclusive interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Analysis,
    Harmonics,
    Doppler,
    Pan,
}

impl Mode {
    /// Get all modes in toolbar order.
    pub fn all() -> &'static [Mode] {
        &[Mode::Analysis, Mode::Harmonics, Mode::Doppler, Mode::Pan]
    }

    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Analysis => "Analysis",
            Mode::Harmonics => "Harmonics",
            Mode::Doppler => "Doppler",
            Mode::Pan => "Pan",
        }
    }
}

/// Owns one tool per mode and tracks which is active.
///
/// Pointer events go to the active tool, except middle-button drags which pan
/// in every mode.
#[derive(Debug)]
pub struct ModeController {
    active: Mode,
    /// Mode to fall back to when Pan becomes unavailable
    previous: Mode,
    analysis: AnalysisTool,
    harmonics: HarmonicsTool,
    doppler: DopplerTool,
    pan: PanTool,
    middle_pan: PanTool,
    /// Button of the last press handed to the active tool
    pressed: Option<PointerButton>,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            active: Mode::Analysis,
            previous: Mode::Analysis,
            analysis: AnalysisTool::new(),
            harmonics: HarmonicsTool::new(),
            doppler: DopplerTool::new(),
            pan: PanTool::new(),
            middle_pan: PanTool::with_button(PointerButton::Middle),
            pressed: None,
        }
    }

    pub fn active(&self) -> Mode {
        self.active
    }

    pub fn tool(&self, mode: Mode) -> &dyn Tool {
        match mode {
            Mode::Analysis => &self.analysis,
            Mode::Harmonics => &self.harmonics,
            Mode::Doppler => &self.doppler,
            Mode::Pan => &self.pan,
        }
    }

    pub fn tool_mut(&mut self, mode: Mode) -> &mut dyn Tool {
        match mode {
            Mode::Analysis => &mut self.analysis,
            Mode::Harmonics => &mut self.harmonics,
            Mode::Doppler => &mut self.doppler,
            Mode::Pan => &mut self.pan,
        }
    }

    /// Whether `mode` can be selected right now. Pan needs a zoomed view.
    pub fn is_available(&self, mode: Mode, ctx: &ToolContext<'_>) -> bool {
        mode != Mode::Pan || ctx.viewport.is_zoomed()
    }

    /// Switch to `mode`, deactivating the current tool first.
    ///
    /// Returns false if nothing changed: the mode was already active, or Pan
    /// was requested at 1:1 zoom.
    pub fn set_mode(&mut self, mode: Mode, ctx: &mut ToolContext<'_>) -> bool {
        if mode == self.active {
            return false;
        }
        if !self.is_available(mode, ctx) {
            log::debug!("🖐️ Pan unavailable at 1:1 zoom");
            return false;
        }

        self.middle_pan.cancel_drag(ctx);
        self.tool_mut(self.active).deactivate(ctx);
        if mode == Mode::Pan {
            self.previous = self.active;
        }
        self.active = mode;
        self.tool_mut(mode).activate(ctx);

        log::debug!("🔄 Mode: {}", mode.name());
        ctx.features.emit(WidgetEvent::ModeChanged { mode });
        true
    }

    /// Leave Pan mode if the view is no longer zoomed. Call after any zoom change.
    pub fn sync_with_viewport(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        if self.active == Mode::Pan && !ctx.viewport.is_zoomed() {
            log::debug!("🖐️ Zoom reset, returning to {}", self.previous.name());
            return self.set_mode(self.previous, ctx);
        }
        false
    }

    pub fn is_dragging(&self) -> bool {
        self.middle_pan.is_dragging() || self.tool(self.active).is_dragging()
    }

    /// Abort whatever drag is in progress without committing it.
    pub fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        self.middle_pan.cancel_drag(ctx);
        self.tool_mut(self.active).cancel_drag(ctx);
    }

    pub fn pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if input.button == PointerButton::Middle {
            if self.tool(self.active).is_dragging() {
                return;
            }
            self.middle_pan.on_pointer_down(ctx, input);
        } else if !self.middle_pan.is_dragging() {
            if !self.tool(self.active).is_dragging() {
                self.pressed = Some(input.button);
            }
            self.tool_mut(self.active).on_pointer_down(ctx, input);
        }
    }

    pub fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if self.middle_pan.is_dragging() {
            self.middle_pan.on_pointer_move(ctx, input);
        } else {
            self.tool_mut(self.active).on_pointer_move(ctx, input);
        }
    }

    pub fn pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if self.middle_pan.is_dragging() {
            if input.button == PointerButton::Middle {
                self.middle_pan.on_pointer_up(ctx, input);
            }
        } else if self.tool(self.active).is_dragging() && self.pressed != Some(input.button) {
            log::debug!(
                "🖱️ {:?} release ignored during {} drag",
                input.button,
                self.active.name()
            );
        } else {
            self.pressed = None;
            self.tool_mut(self.active).on_pointer_up(ctx, input);
        }
    }

    pub fn context_menu(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        self.tool_mut(self.active).on_context_menu(ctx, input);
    }

    /// Collect primitives from every tool so features stay visible in all modes.
    pub fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>) {
        for mode in Mode::all() {
            self.tool(*mode).render(ctx, out);
        }
    }

    pub fn doppler(&self) -> &DopplerTool {
        &self.doppler
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}
