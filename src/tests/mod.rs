//! Cross-module tests for the widget.
//!
//! These drive the whole engine through messages, the way a host would, and
//! check the properties that span several modules: coordinate consistency
//! under zoom/pan, cross-mode persistence and the measurement scenarios.

mod scenario_tests;

use crate::config::{ImageDetails, SpectrogramConfig, WidgetConfig};
use crate::coords::{PanelRect, ScreenPoint};
use crate::message::{Modifiers, PointerButton, PointerMessage, WidgetMessage};
use crate::widget::SpectrogramWidget;

/// 1000x1000 panel at the screen origin showing 0..100 s by 0..1000 Hz.
///
/// At 1:1 zoom `x` pixels is `x` Hz and `y` pixels is `100 - y / 10` seconds.
fn create_widget() -> SpectrogramWidget {
    SpectrogramWidget::new(
        SpectrogramConfig::new(0.0, 100.0, 0.0, 1000.0, "spectrogram.png"),
        ImageDetails::new(1000, 1000),
        WidgetConfig::default(),
        PanelRect::new(0.0, 0.0, 1000.0, 1000.0),
    )
    .expect("valid widget")
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

fn pointer(widget: &mut SpectrogramWidget, msg: PointerMessage) {
    widget
        .update(WidgetMessage::Pointer(msg))
        .expect("pointer messages never fail");
}

fn click(widget: &mut SpectrogramWidget, x: f64, y: f64) {
    drag(widget, (x, y), (x, y));
}

/// Primary-button press at `from`, two move samples, release at `to`.
fn drag(widget: &mut SpectrogramWidget, from: (f64, f64), to: (f64, f64)) {
    let at = |(x, y): (f64, f64)| ScreenPoint::new(x, y);
    let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
    pointer(
        widget,
        PointerMessage::Down {
            position: at(from),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        },
    );
    for position in [at(mid), at(to)] {
        pointer(
            widget,
            PointerMessage::Move {
                position,
                modifiers: Modifiers::default(),
            },
        );
    }
    pointer(
        widget,
        PointerMessage::Up {
            position: at(to),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        },
    );
}
