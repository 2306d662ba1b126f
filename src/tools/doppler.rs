//! Doppler mode: capture a three-point fit and estimate radial speed.
//!
//! A press places the first endpoint, dragging previews the curve and the
//! release places the second endpoint. Once a fit exists its three points can
//! be dragged individually. The fit is a single transient measurement: it is
//! cleared on right-click and whenever the mode is left.

use super::{PointerInput, Tool, ToolContext};
use crate::constants::DOPPLER_HANDLE_RADIUS;
use crate::coords::{DomainPoint, ViewportPoint};
use crate::message::PointerButton;
use crate::mode::Mode;
use crate::model::{DopplerFit, DopplerHandle, s_curve_segments, speed_estimate};
use crate::render::{DrawItem, Primitive, RenderContext};

const CURVE_COLOR: &str = "#ff9f1c";
const HANDLE_COLOR: &str = "#ffffff";
const GUIDE_COLOR: &str = "rgba(255, 159, 28, 0.5)";

#[derive(Debug, Clone, PartialEq)]
enum DopplerState {
    Idle,
    /// A degenerate capture left one endpoint; the next press continues from it
    AwaitingSecond { first: DomainPoint },
    /// Press-drag-release capture in progress
    Capturing {
        anchor: DomainPoint,
        current: DomainPoint,
        /// Fit that existed before this capture, restored on cancel
        previous: Option<DopplerFit>,
    },
    /// One handle of an existing fit is being dragged
    DraggingPoint {
        handle: DopplerHandle,
        original: DopplerFit,
    },
}

#[derive(Debug)]
pub struct DopplerTool {
    state: DopplerState,
}

impl DopplerTool {
    pub fn new() -> Self {
        Self {
            state: DopplerState::Idle,
        }
    }

    /// Speed to display: the live preview while capturing, otherwise the
    /// stored fit's estimate.
    pub fn speed(&self, fit: Option<&DopplerFit>, sound_speed: f64) -> Option<f64> {
        match &self.state {
            DopplerState::Capturing {
                anchor, current, ..
            } => {
                let preview = DopplerFit::from_endpoints(*anchor, *current)?;
                speed_estimate(preview.f_minus, preview.f_plus, preview.f_zero, sound_speed)
            }
            _ => fit.and_then(|fit| fit.speed(sound_speed)),
        }
    }

    /// Endpoint left pending by a degenerate capture.
    pub fn pending_point(&self) -> Option<DomainPoint> {
        match self.state {
            DopplerState::AwaitingSecond { first } => Some(first),
            _ => None,
        }
    }

    fn handle_at(ctx: &ToolContext<'_>, point: ViewportPoint) -> Option<DopplerHandle> {
        let fit = ctx.features.doppler()?;
        let transformer = ctx.transformer();
        let tolerance = ctx.settings.preferences.hit_tolerance.max(DOPPLER_HANDLE_RADIUS);
        DopplerHandle::all()
            .iter()
            .map(|h| {
                let p = transformer.domain_to_viewport(fit.point(*h));
                (*h, p.distance_to(&point))
            })
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }

    /// Finish a capture between `anchor` and `end`.
    fn complete_capture(&mut self, ctx: &mut ToolContext<'_>, anchor: DomainPoint, end: DomainPoint) {
        let transformer = ctx.transformer();
        let separation = transformer
            .domain_to_viewport(anchor)
            .distance_to(&transformer.domain_to_viewport(end));
        let fit = if separation < ctx.settings.preferences.min_drag_distance {
            None
        } else {
            DopplerFit::from_endpoints(anchor, end)
        };

        match fit {
            Some(fit) => {
                log::debug!(
                    "🚀 Doppler fit: f- {:.1}Hz @ {:.3}s, f+ {:.1}Hz @ {:.3}s, f0 {:.1}Hz",
                    fit.f_minus.frequency,
                    fit.f_minus.time,
                    fit.f_plus.frequency,
                    fit.f_plus.time,
                    fit.f_zero.frequency
                );
                ctx.features.set_doppler(fit);
                self.state = DopplerState::Idle;
            }
            None => {
                log::debug!("🚀 Degenerate Doppler capture, waiting for second point");
                self.state = DopplerState::AwaitingSecond { first: anchor };
            }
        }
    }
}

impl Default for DopplerTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for DopplerTool {
    fn mode(&self) -> Mode {
        Mode::Doppler
    }

    fn deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.state = DopplerState::Idle;
        ctx.features.clear_doppler();
    }

    fn cancel_drag(&mut self, ctx: &mut ToolContext<'_>) {
        match std::mem::replace(&mut self.state, DopplerState::Idle) {
            DopplerState::Capturing { previous, .. } => {
                if let Some(fit) = previous {
                    ctx.features.set_doppler(fit);
                }
                log::debug!("🚀 Doppler capture cancelled");
            }
            DopplerState::DraggingPoint { original, .. } => {
                ctx.features.set_doppler(original);
                log::debug!("🚀 Doppler point drag cancelled");
            }
            other => self.state = other,
        }
    }

    fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            DopplerState::Capturing { .. } | DopplerState::DraggingPoint { .. }
        )
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        if input.button != PointerButton::Primary || self.is_dragging() {
            return;
        }

        if let Some(handle) = Self::handle_at(ctx, input.viewport)
            && let Some(original) = ctx.features.doppler().cloned()
        {
            log::debug!("🚀 Grabbed Doppler {}", handle.label());
            self.state = DopplerState::DraggingPoint { handle, original };
            return;
        }

        if !input.inside_image {
            log::debug!("🚀 Click outside image ignored");
            return;
        }

        let anchor = match self.state {
            DopplerState::AwaitingSecond { first } => first,
            _ => input.domain,
        };
        // A new measurement replaces the old one
        let previous = ctx.features.clear_doppler();
        self.state = DopplerState::Capturing {
            anchor,
            current: input.domain,
            previous,
        };
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        let target = ctx.bounds.clamp(input.domain);
        match &mut self.state {
            DopplerState::Capturing { current, .. } => {
                *current = target;
                ctx.features.mark_dirty();
            }
            DopplerState::DraggingPoint { handle, .. } => {
                if let Some(mut fit) = ctx.features.doppler().cloned()
                    && let Some(moved_to) = fit.move_handle(*handle, target)
                {
                    // Crossing the other endpoint in time swaps f- and f+
                    *handle = moved_to;
                    ctx.features.set_doppler(fit);
                }
            }
            _ => {}
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, input: &PointerInput) {
        self.on_pointer_move(ctx, input);
        match std::mem::replace(&mut self.state, DopplerState::Idle) {
            DopplerState::Capturing { anchor, current, .. } => {
                self.complete_capture(ctx, anchor, current);
            }
            DopplerState::DraggingPoint { handle, .. } => {
                if let Some(speed) = ctx
                    .features
                    .doppler()
                    .and_then(|fit| fit.speed(ctx.settings.preferences.sound_speed))
                {
                    log::debug!("🚀 Moved {}: speed {:.2} m/s", handle.label(), speed);
                }
            }
            other => self.state = other,
        }
    }

    fn on_context_menu(&mut self, ctx: &mut ToolContext<'_>, _input: &PointerInput) {
        self.state = DopplerState::Idle;
        ctx.features.clear_doppler();
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut Vec<DrawItem>) {
        let to_viewport = |p: DomainPoint| ctx.transformer.domain_to_viewport(p);
        let handle = |center: ViewportPoint, emphasized: bool| {
            ctx.item(
                Mode::Doppler,
                Primitive::Circle {
                    center,
                    radius: DOPPLER_HANDLE_RADIUS,
                },
                HANDLE_COLOR,
                emphasized,
            )
        };

        match &self.state {
            DopplerState::AwaitingSecond { first } => {
                out.push(handle(to_viewport(*first), true));
            }
            DopplerState::Capturing {
                anchor, current, ..
            } => {
                let start = to_viewport(*anchor);
                let end = to_viewport(*current);
                out.push(handle(start, true));
                out.push(handle(end, true));
                if let Some(preview) = DopplerFit::from_endpoints(*anchor, *current) {
                    let segments = s_curve_segments(
                        to_viewport(preview.f_minus),
                        to_viewport(preview.f_zero),
                        to_viewport(preview.f_plus),
                    );
                    out.push(ctx.item(
                        Mode::Doppler,
                        Primitive::Path {
                            segments: segments.to_vec(),
                        },
                        CURVE_COLOR,
                        true,
                    ));
                }
            }
            DopplerState::Idle | DopplerState::DraggingPoint { .. } => {
                let Some(fit) = ctx.features.doppler() else {
                    return;
                };
                let dragged = match self.state {
                    DopplerState::DraggingPoint { handle, .. } => Some(handle),
                    _ => None,
                };
                let minus = to_viewport(fit.f_minus);
                let zero = to_viewport(fit.f_zero);
                let plus = to_viewport(fit.f_plus);

                // Guides run from each endpoint to the panel edge away from f0
                for endpoint in [minus, plus] {
                    let edge = if endpoint.y >= zero.y { ctx.height() } else { 0.0 };
                    out.push(ctx.item(
                        Mode::Doppler,
                        Primitive::Line {
                            from: endpoint,
                            to: ViewportPoint::new(endpoint.x, edge),
                        },
                        GUIDE_COLOR,
                        false,
                    ));
                }
                out.push(ctx.item(
                    Mode::Doppler,
                    Primitive::Path {
                        segments: s_curve_segments(minus, zero, plus).to_vec(),
                    },
                    CURVE_COLOR,
                    dragged.is_some(),
                ));
                for (h, center) in [
                    (DopplerHandle::Minus, minus),
                    (DopplerHandle::Zero, zero),
                    (DopplerHandle::Plus, plus),
                ] {
                    out.push(handle(center, dragged == Some(h)));
                    out.push(ctx.item(
                        Mode::Doppler,
                        Primitive::Text {
                            anchor: ViewportPoint::new(
                                center.x + DOPPLER_HANDLE_RADIUS * 1.5,
                                center.y,
                            ),
                            text: h.label().to_string(),
                        },
                        HANDLE_COLOR,
                        false,
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixture::{Fixture, assert_near, input};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Press at `from`, drag through the midpoint, release at `to` (viewport pixels).
    fn capture(tool: &mut DopplerTool, fx: &mut Fixture, from: (f64, f64), to: (f64, f64)) {
        let mut ctx = fx.ctx();
        let press = input(&ctx, from.0, from.1, PointerButton::Primary);
        tool.on_pointer_down(&mut ctx, &press);
        let mid = input(
            &ctx,
            (from.0 + to.0) / 2.0,
            (from.1 + to.1) / 2.0,
            PointerButton::Primary,
        );
        tool.on_pointer_move(&mut ctx, &mid);
        let release = input(&ctx, to.0, to.1, PointerButton::Primary);
        tool.on_pointer_up(&mut ctx, &release);
    }

    #[test]
    fn test_capture_orders_endpoints_by_time() {
        // Dragging upward (forward in time) and downward must give the same fit
        for (from, to) in [((760.0, 900.0), (1000.0, 700.0)), ((1000.0, 700.0), (760.0, 900.0))] {
            let mut fx = Fixture::new();
            let mut tool = DopplerTool::new();
            capture(&mut tool, &mut fx, from, to);

            let fit = fx.features.doppler().expect("fit captured");
            assert!(fit.f_minus.time < fit.f_plus.time);
            assert_near(Some(fit.f_minus), DomainPoint::new(10.0, 760.0));
            assert_near(Some(fit.f_plus), DomainPoint::new(30.0, 1000.0));
            assert_near(Some(fit.f_zero), DomainPoint::new(20.0, 880.0));
        }
    }

    #[test]
    fn test_live_speed_matches_scenario() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));
        let speed = tool
            .speed(fx.features.doppler(), 1500.0)
            .expect("finite speed");
        assert!(approx_eq(speed, 1500.0 / 880.0 * 120.0), "speed {speed}");
    }

    #[test]
    fn test_zero_length_drag_waits_for_second_point() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (500.0, 500.0), (501.0, 500.0));
        assert!(fx.features.doppler().is_none());
        assert!(tool.pending_point().is_some());

        // Next click completes the measurement from the pending point
        capture(&mut tool, &mut fx, (700.0, 300.0), (700.0, 300.0));
        let fit = fx.features.doppler().expect("fit completed");
        assert_near(Some(fit.f_minus), DomainPoint::new(50.0, 500.0));
        assert_near(Some(fit.f_plus), DomainPoint::new(70.0, 700.0));
        assert_eq!(tool.pending_point(), None);
    }

    #[test]
    fn test_equal_time_capture_is_degenerate() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        // Horizontal drag: same time, different frequency
        capture(&mut tool, &mut fx, (300.0, 500.0), (700.0, 500.0));
        assert!(fx.features.doppler().is_none());
        assert!(tool.pending_point().is_some());
    }

    #[test]
    fn test_dragging_zero_pins_it() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));

        // f0 sits at (880, 800); drag it to (850, 800)
        capture(&mut tool, &mut fx, (880.0, 800.0), (850.0, 800.0));
        let fit = fx.features.doppler().expect("fit kept");
        assert!(fit.zero_pinned);
        assert_near(Some(fit.f_zero), DomainPoint::new(20.0, 850.0));

        // Moving one endpoint leaves the pinned f0 in place
        capture(&mut tool, &mut fx, (1000.0, 700.0), (990.0, 650.0));
        let fit = fx.features.doppler().expect("fit kept");
        assert_near(Some(fit.f_zero), DomainPoint::new(20.0, 850.0));
    }

    #[test]
    fn test_endpoint_dragged_past_other_keeps_both_points() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));

        // Grab f- and carry it later in time than f+, over several samples
        let mut ctx = fx.ctx();
        let press = input(&ctx, 760.0, 900.0, PointerButton::Primary);
        tool.on_pointer_down(&mut ctx, &press);
        for (x, y) in [(700.0, 400.0), (690.0, 390.0), (680.0, 385.0)] {
            let sample = input(&ctx, x, y, PointerButton::Primary);
            tool.on_pointer_move(&mut ctx, &sample);
        }
        let release = input(&ctx, 690.0, 390.0, PointerButton::Primary);
        tool.on_pointer_up(&mut ctx, &release);

        let fit = fx.features.doppler().expect("fit kept");
        assert_near(Some(fit.f_minus), DomainPoint::new(30.0, 1000.0));
        assert_near(Some(fit.f_plus), DomainPoint::new(61.0, 690.0));
        assert_near(Some(fit.f_zero), DomainPoint::new(45.5, 845.0));
    }

    #[test]
    fn test_right_click_and_deactivate_clear_fit() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));
        assert!(fx.features.doppler().is_some());

        let mut ctx = fx.ctx();
        let click = input(&ctx, 10.0, 10.0, PointerButton::Secondary);
        tool.on_context_menu(&mut ctx, &click);
        assert!(fx.features.doppler().is_none());

        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));
        let mut ctx = fx.ctx();
        tool.deactivate(&mut ctx);
        assert!(fx.features.doppler().is_none());
    }

    #[test]
    fn test_cancelled_capture_restores_previous_fit() {
        let mut fx = Fixture::new();
        let mut tool = DopplerTool::new();
        capture(&mut tool, &mut fx, (760.0, 900.0), (1000.0, 700.0));
        let before = fx.features.doppler().cloned();

        let mut ctx = fx.ctx();
        let press = input(&ctx, 200.0, 200.0, PointerButton::Primary);
        tool.on_pointer_down(&mut ctx, &press);
        let drag = input(&ctx, 300.0, 100.0, PointerButton::Primary);
        tool.on_pointer_move(&mut ctx, &drag);
        tool.cancel_drag(&mut ctx);

        assert_eq!(fx.features.doppler().cloned(), before);
    }
}
