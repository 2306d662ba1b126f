//! Draw primitives handed to the host renderer.
//!
//! Everything here is in viewport space and rebuilt from scratch each frame
//! out of the feature store and the current viewport, so it can never drift
//! from the data it depicts.

use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::coords::{CoordinateTransformer, ViewportPoint};
use crate::feature_store::FeatureStore;
use crate::mode::Mode;
use crate::model::CubicSegment;

/// A single shape in viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Line {
        from: ViewportPoint,
        to: ViewportPoint,
    },
    Circle {
        center: ViewportPoint,
        radius: f64,
    },
    /// Connected cubic segments
    Path { segments: Vec<CubicSegment> },
    Text {
        anchor: ViewportPoint,
        text: String,
    },
}

/// A primitive plus the styling information the host needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    /// Mode whose feature this belongs to; `None` for the cursor overlay
    pub owner: Option<Mode>,
    pub primitive: Primitive,
    pub color: String,
    /// Selected or currently dragged
    pub emphasized: bool,
    /// Whether the owning mode is the active one
    pub active: bool,
}

/// Cursor position read-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorReadout {
    pub time: f64,
    pub frequency: f64,
    pub inside_image: bool,
}

/// Live numeric values for the read-out display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Readout {
    /// `None` while the pointer is outside the panel
    pub cursor: Option<CursorReadout>,
    /// `None` without a fit or when the estimate is undefined (f0 at 0 Hz)
    pub doppler_speed: Option<f64>,
    /// Current (x, y) zoom factors
    pub zoom: (f64, f64),
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub items: Vec<DrawItem>,
    pub readout: Readout,
}

/// Everything a tool needs to produce its primitives.
pub struct RenderContext<'a> {
    pub transformer: CoordinateTransformer<'a>,
    pub features: &'a FeatureStore,
    pub settings: &'a WidgetConfig,
    pub active_mode: Mode,
}

impl RenderContext<'_> {
    /// Start a draw item owned by `owner`.
    pub fn item(&self, owner: Mode, primitive: Primitive, color: &str, emphasized: bool) -> DrawItem {
        DrawItem {
            owner: Some(owner),
            primitive,
            color: color.to_string(),
            emphasized,
            active: owner == self.active_mode,
        }
    }

    pub fn width(&self) -> f64 {
        self.transformer.viewport().width()
    }

    pub fn height(&self) -> f64 {
        self.transformer.viewport().height()
    }
}

/// Color of the crosshair overlay.
pub const CROSSHAIR_COLOR: &str = "rgba(255, 255, 255, 0.6)";

/// Full-panel crosshair through `point`.
pub fn crosshair(point: ViewportPoint, width: f64, height: f64) -> [DrawItem; 2] {
    let line = |from, to| DrawItem {
        owner: None,
        primitive: Primitive::Line { from, to },
        color: CROSSHAIR_COLOR.to_string(),
        emphasized: false,
        active: true,
    };
    [
        line(ViewportPoint::new(0.0, point.y), ViewportPoint::new(width, point.y)),
        line(ViewportPoint::new(point.x, 0.0), ViewportPoint::new(point.x, height)),
    ]
}

/// Format a harmonic label: index and absolute frequency.
pub fn harmonic_label(n: u32, frequency: f64) -> String {
    format!("{n}: {frequency:.1} Hz")
}
