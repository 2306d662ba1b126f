//! SVAT - Spectrogram Visual Annotation Tool
//!
//! The interaction engine of an embeddable spectrogram widget: coordinate
//! transforms between screen, viewport, image and time/frequency space, a
//! zoom/pan viewport, and the analysis, harmonics and Doppler tools that
//! turn pointer input into measurements. Rendering is left to the host,
//! which receives viewport-space draw primitives each frame.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod coords;
pub mod error;
pub mod event;
pub mod feature_store;
mod handlers;
pub mod keybindings;
pub mod message;
pub mod mode;
pub mod model;
pub mod render;
pub mod tools;
pub mod undo;
pub mod viewport;
pub mod widget;

#[cfg(test)]
mod tests;

pub use config::{ImageDetails, LogLevel, SpectrogramConfig, WidgetConfig};
pub use coords::{
    CoordinateTransformer, DomainBounds, DomainPoint, ImagePoint, PanelRect, ScreenPoint,
    ViewportPoint,
};
pub use error::{Result, SvatError};
pub use event::WidgetEvent;
pub use feature_store::{FeatureSnapshot, FeatureStore, Selection};
pub use message::{FeatureMessage, PointerButton, PointerMessage, ViewMessage, WidgetMessage};
pub use mode::Mode;
pub use render::{DrawItem, Frame, Primitive, Readout};
pub use viewport::{ViewportState, ZoomLimits};
pub use widget::{SpectrogramWidget, WidgetSnapshot};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
