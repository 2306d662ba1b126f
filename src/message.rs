//! Widget message types.
//!
//! All host input is represented as messages in the Elm architecture style.
//! Messages are serde-serializable so a recorded session can be replayed.

use serde::{Deserialize, Serialize};

use crate::coords::{DomainBounds, PanelRect, ScreenPoint};
use crate::feature_store::Selection;
use crate::keybindings::KeyCode;
use crate::mode::Mode;
use crate::model::FeatureId;

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Messages that can be sent to update widget state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetMessage {
    Pointer(PointerMessage),
    View(ViewMessage),
    Feature(FeatureMessage),
    /// Explicit mode selection (toolbar button)
    SetMode(Mode),
    Key {
        key: KeyCode,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Undo last feature edit
    Undo,
    /// Redo previously undone edit
    Redo,
}

/// Raw pointer events in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerMessage {
    Down {
        position: ScreenPoint,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: ScreenPoint,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: ScreenPoint,
        #[serde(default)]
        button: PointerButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Right-click / context menu request
    ContextMenu { position: ScreenPoint },
    /// Wheel scroll; negative `delta_y` zooms in
    Wheel { position: ScreenPoint, delta_y: f64 },
    /// Pointer left the panel
    Leave,
    /// Pointer capture lost (window blur etc.); aborts any drag
    Cancel,
}

/// View (zoom/pan/size) requests from toolbar buttons or the host layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewMessage {
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ZoomToRegion(DomainBounds),
    /// The panel moved or changed size on screen
    Resize(PanelRect),
}

/// Feature table actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureMessage {
    /// Manual harmonic entry with an explicit spacing in Hz
    AddHarmonicSet { spacing: f64 },
    DeleteMarker(FeatureId),
    DeleteHarmonicSet(FeatureId),
    ClearMarkers,
    ClearHarmonicSets,
    Select(Option<Selection>),
}
