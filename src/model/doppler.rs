//! Doppler fit data model, speed estimate and S-curve geometry.
//!
//! A fit is three points on a passing target's frequency track: `f_minus`
//! (earlier in time), `f_plus` (later in time) and `f_zero`, the inflection
//! point at closest approach. The radial speed is
//!
//! ```text
//! speed = (c / f_zero) * (f_plus - f_minus) / 2
//! ```

use serde::{Deserialize, Serialize};

use crate::coords::{DomainPoint, ViewportPoint};

/// One of the three draggable points of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DopplerHandle {
    Plus,
    Minus,
    Zero,
}

impl DopplerHandle {
    pub fn all() -> &'static [DopplerHandle] {
        &[DopplerHandle::Minus, DopplerHandle::Zero, DopplerHandle::Plus]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DopplerHandle::Plus => "f+",
            DopplerHandle::Minus => "f-",
            DopplerHandle::Zero => "f0",
        }
    }
}

/// A complete three-point Doppler fit.
///
/// Invariant: `f_minus.time < f_plus.time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DopplerFit {
    pub f_plus: DomainPoint,
    pub f_minus: DomainPoint,
    pub f_zero: DomainPoint,
    /// Set once `f_zero` has been dragged on its own; it then stops
    /// following the endpoint midpoint.
    pub zero_pinned: bool,
    /// Which endpoints (plus, minus) have moved since `f_zero` was pinned.
    #[serde(skip)]
    moved_since_pin: (bool, bool),
}

impl DopplerFit {
    /// Build a fit from two captured endpoints in any order.
    ///
    /// The earlier point becomes `f_minus`. Returns `None` when both points
    /// share a time, which would give a zero-width fit.
    pub fn from_endpoints(a: DomainPoint, b: DomainPoint) -> Option<Self> {
        let (f_minus, f_plus) = order_by_time(a, b)?;
        Some(Self {
            f_plus,
            f_minus,
            f_zero: f_minus.midpoint(&f_plus),
            zero_pinned: false,
            moved_since_pin: (false, false),
        })
    }

    pub fn point(&self, handle: DopplerHandle) -> DomainPoint {
        match handle {
            DopplerHandle::Plus => self.f_plus,
            DopplerHandle::Minus => self.f_minus,
            DopplerHandle::Zero => self.f_zero,
        }
    }

    /// Half the frequency difference between the endpoints.
    pub fn delta_f(&self) -> f64 {
        (self.f_plus.frequency - self.f_minus.frequency) / 2.0
    }

    /// Radial speed for a medium with sound speed `c`.
    ///
    /// `None` when `f_zero` sits at 0 Hz or the result is not finite.
    pub fn speed(&self, c: f64) -> Option<f64> {
        speed_estimate(self.f_minus, self.f_plus, self.f_zero, c)
    }

    /// Move one handle to `position`.
    ///
    /// Dragging an endpoint re-derives `f_zero` as the midpoint unless
    /// `f_zero` is pinned. A pinned `f_zero` is released once both endpoints
    /// have moved after the pin. If an endpoint is dragged past the other in
    /// time the two swap roles; a position at exactly the other endpoint's
    /// time is refused.
    ///
    /// Returns the handle the moved point now occupies, or `None` if the
    /// move was refused. Callers dragging a handle must continue with the
    /// returned one.
    pub fn move_handle(
        &mut self,
        handle: DopplerHandle,
        position: DomainPoint,
    ) -> Option<DopplerHandle> {
        match handle {
            DopplerHandle::Zero => {
                self.f_zero = position;
                self.zero_pinned = true;
                self.moved_since_pin = (false, false);
                Some(DopplerHandle::Zero)
            }
            DopplerHandle::Plus | DopplerHandle::Minus => {
                let other = match handle {
                    DopplerHandle::Plus => self.f_minus,
                    _ => self.f_plus,
                };
                let (f_minus, f_plus) = order_by_time(position, other)?;
                let swapped = f_minus == position && handle == DopplerHandle::Plus
                    || f_plus == position && handle == DopplerHandle::Minus;
                self.f_minus = f_minus;
                self.f_plus = f_plus;

                if self.zero_pinned {
                    if swapped {
                        self.moved_since_pin = (self.moved_since_pin.1, self.moved_since_pin.0);
                    }
                    if (handle == DopplerHandle::Plus) != swapped {
                        self.moved_since_pin.0 = true;
                    } else {
                        self.moved_since_pin.1 = true;
                    }
                    if self.moved_since_pin == (true, true) {
                        self.zero_pinned = false;
                        self.moved_since_pin = (false, false);
                    }
                }
                if !self.zero_pinned {
                    self.f_zero = self.f_minus.midpoint(&self.f_plus);
                }
                Some(if f_minus == position {
                    DopplerHandle::Minus
                } else {
                    DopplerHandle::Plus
                })
            }
        }
    }
}

/// Speed estimate from three points, shared by complete fits and the live preview.
pub(crate) fn speed_estimate(
    f_minus: DomainPoint,
    f_plus: DomainPoint,
    f_zero: DomainPoint,
    c: f64,
) -> Option<f64> {
    if f_zero.frequency == 0.0 {
        return None;
    }
    let delta_f = (f_plus.frequency - f_minus.frequency) / 2.0;
    let speed = (c / f_zero.frequency) * delta_f;
    speed.is_finite().then_some(speed)
}

/// Order two points by time, earlier first. `None` if the times are equal.
fn order_by_time(a: DomainPoint, b: DomainPoint) -> Option<(DomainPoint, DomainPoint)> {
    if a.time < b.time {
        Some((a, b))
    } else if b.time < a.time {
        Some((b, a))
    } else {
        None
    }
}

/// A cubic Bézier segment in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicSegment {
    pub from: ViewportPoint,
    pub ctrl1: ViewportPoint,
    pub ctrl2: ViewportPoint,
    pub to: ViewportPoint,
}

impl CubicSegment {
    /// Evaluate the segment at `t` in 0..=1.
    pub fn at(&self, t: f64) -> ViewportPoint {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        ViewportPoint::new(
            a * self.from.x + b * self.ctrl1.x + c * self.ctrl2.x + d * self.to.x,
            a * self.from.y + b * self.ctrl1.y + c * self.ctrl2.y + d * self.to.y,
        )
    }
}

/// S-shaped curve from `start` through `middle` to `end`.
///
/// Both ends leave vertically (along the time axis) and the two segments
/// share a tangent at `middle`, parallel to the chord from `start` to `end`.
pub fn s_curve_segments(
    start: ViewportPoint,
    middle: ViewportPoint,
    end: ViewportPoint,
) -> [CubicSegment; 2] {
    let tangent_x = (end.x - start.x) / 6.0;
    let tangent_y = (end.y - start.y) / 6.0;
    [
        CubicSegment {
            from: start,
            ctrl1: ViewportPoint::new(start.x, (start.y + middle.y) / 2.0),
            ctrl2: ViewportPoint::new(middle.x - tangent_x, middle.y - tangent_y),
            to: middle,
        },
        CubicSegment {
            from: middle,
            ctrl1: ViewportPoint::new(middle.x + tangent_x, middle.y + tangent_y),
            ctrl2: ViewportPoint::new(end.x, (middle.y + end.y) / 2.0),
            to: end,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit() -> DopplerFit {
        DopplerFit::from_endpoints(DomainPoint::new(10.0, 760.0), DomainPoint::new(30.0, 1000.0))
            .expect("distinct times")
    }

    #[test]
    fn test_speed_scenario() {
        let mut fit = fit();
        fit.move_handle(DopplerHandle::Zero, DomainPoint::new(20.0, 880.0));
        assert_eq!(fit.delta_f(), 120.0);
        let speed = fit.speed(1500.0).expect("finite speed");
        assert!((speed - 204.545_454_545).abs() < 1e-6);
    }

    #[test]
    fn test_speed_guard_at_zero_frequency() {
        let mut fit = fit();
        fit.move_handle(DopplerHandle::Zero, DomainPoint::new(20.0, 0.0));
        assert_eq!(fit.speed(1500.0), None);
    }

    #[test]
    fn test_endpoint_order_independent_of_capture_order() {
        let a = DomainPoint::new(30.0, 1000.0);
        let b = DomainPoint::new(10.0, 760.0);
        for (first, second) in [(a, b), (b, a)] {
            let fit = DopplerFit::from_endpoints(first, second).expect("distinct times");
            assert!(fit.f_minus.time < fit.f_plus.time);
            assert_eq!(fit.f_minus, b);
            assert_eq!(fit.f_plus, a);
            assert_eq!(fit.f_zero, DomainPoint::new(20.0, 880.0));
        }
    }

    #[test]
    fn test_equal_times_rejected() {
        let fit =
            DopplerFit::from_endpoints(DomainPoint::new(5.0, 100.0), DomainPoint::new(5.0, 900.0));
        assert!(fit.is_none());
    }

    #[test]
    fn test_zero_follows_midpoint_until_pinned() {
        let mut fit = fit();
        fit.move_handle(DopplerHandle::Plus, DomainPoint::new(40.0, 1100.0));
        assert_eq!(fit.f_zero, DomainPoint::new(25.0, 930.0));

        fit.move_handle(DopplerHandle::Zero, DomainPoint::new(22.0, 900.0));
        assert!(fit.zero_pinned);

        // One endpoint moving does not release the pin
        fit.move_handle(DopplerHandle::Plus, DomainPoint::new(42.0, 1100.0));
        assert_eq!(fit.f_zero, DomainPoint::new(22.0, 900.0));
        fit.move_handle(DopplerHandle::Plus, DomainPoint::new(44.0, 1100.0));
        assert_eq!(fit.f_zero, DomainPoint::new(22.0, 900.0));

        // Once both have moved, f0 tracks the midpoint again
        fit.move_handle(DopplerHandle::Minus, DomainPoint::new(12.0, 760.0));
        assert!(!fit.zero_pinned);
        assert_eq!(fit.f_zero, DomainPoint::new(28.0, 930.0));
    }

    #[test]
    fn test_dragging_endpoint_past_other_swaps_roles() {
        let mut fit = fit();
        assert_eq!(
            fit.move_handle(DopplerHandle::Minus, DomainPoint::new(50.0, 700.0)),
            Some(DopplerHandle::Plus)
        );
        assert!(fit.f_minus.time < fit.f_plus.time);
        assert_eq!(fit.f_minus, DomainPoint::new(30.0, 1000.0));
        assert_eq!(fit.f_plus, DomainPoint::new(50.0, 700.0));

        // Following moves go through the new role and leave the other point alone
        assert_eq!(
            fit.move_handle(DopplerHandle::Plus, DomainPoint::new(55.0, 690.0)),
            Some(DopplerHandle::Plus)
        );
        assert_eq!(fit.f_minus, DomainPoint::new(30.0, 1000.0));
        assert_eq!(fit.f_plus, DomainPoint::new(55.0, 690.0));
    }

    #[test]
    fn test_endpoint_at_same_time_refused() {
        let mut fit = fit();
        let before = fit.clone();
        assert_eq!(
            fit.move_handle(DopplerHandle::Plus, DomainPoint::new(10.0, 500.0)),
            None
        );
        assert_eq!(fit, before);
    }

    #[test]
    fn test_s_curve_passes_through_middle_with_vertical_ends() {
        let start = ViewportPoint::new(100.0, 300.0);
        let middle = ViewportPoint::new(150.0, 200.0);
        let end = ViewportPoint::new(200.0, 100.0);
        let [first, second] = s_curve_segments(start, middle, end);

        assert_eq!(first.at(0.0), start);
        assert_eq!(first.at(1.0), middle);
        assert_eq!(second.at(0.0), middle);
        assert_eq!(second.at(1.0), end);

        // Vertical tangents at both ends
        assert_eq!(first.ctrl1.x, start.x);
        assert_eq!(second.ctrl2.x, end.x);

        // Smooth join: control points on either side of the middle are collinear
        let in_dx = middle.x - first.ctrl2.x;
        let in_dy = middle.y - first.ctrl2.y;
        let out_dx = second.ctrl1.x - middle.x;
        let out_dy = second.ctrl1.y - middle.y;
        assert!((in_dx * out_dy - in_dy * out_dx).abs() < 1e-9);
    }
}
