//! Coordinate spaces and the transforms between them.
//!
//! Four spaces are involved when a pointer event becomes a measurement:
//!
//! - **Screen**: raw pointer coordinates reported by the host.
//! - **Viewport**: the panel's local pixel space, affected by zoom and pan.
//! - **Image**: pixels of the natural-resolution spectrogram image.
//! - **Domain**: time (seconds) and frequency (Hz).
//!
//! Frequency grows to the right. Image row 0 is `time_max`, so time decreases
//! down the image. All conversions are plain `f64` math with no rounding.

use serde::{Deserialize, Serialize};

use crate::config::ImageDetails;
use crate::error::{Result, SvatError};
use crate::viewport::ViewportState;

/// A point in host screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in the panel's local pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &ViewportPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A point in natural image pixels (origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A time/frequency position. Every conversion produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    /// Time in seconds
    pub time: f64,
    /// Frequency in Hz
    pub frequency: f64,
}

impl DomainPoint {
    pub fn new(time: f64, frequency: f64) -> Self {
        Self { time, frequency }
    }

    /// Midpoint between two domain points.
    pub fn midpoint(&self, other: &DomainPoint) -> DomainPoint {
        DomainPoint::new(
            (self.time + other.time) / 2.0,
            (self.frequency + other.frequency) / 2.0,
        )
    }
}

/// An axis-aligned time/frequency rectangle.
///
/// Used both for the full extent of the spectrogram and for the window
/// currently visible through the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub time_min: f64,
    pub time_max: f64,
    pub freq_min: f64,
    pub freq_max: f64,
}

impl DomainBounds {
    /// Length of the time axis.
    pub fn time_span(&self) -> f64 {
        self.time_max - self.time_min
    }

    /// Length of the frequency axis.
    pub fn freq_span(&self) -> f64 {
        self.freq_max - self.freq_min
    }

    /// Center of the rectangle.
    pub fn center(&self) -> DomainPoint {
        DomainPoint::new(
            (self.time_min + self.time_max) / 2.0,
            (self.freq_min + self.freq_max) / 2.0,
        )
    }

    /// Check if a point lies inside (edges included).
    pub fn contains(&self, point: &DomainPoint) -> bool {
        point.time >= self.time_min
            && point.time <= self.time_max
            && point.frequency >= self.freq_min
            && point.frequency <= self.freq_max
    }

    /// Check if this rectangle lies inside `outer`, allowing `epsilon` of slack.
    pub fn is_within(&self, outer: &DomainBounds, epsilon: f64) -> bool {
        self.time_min >= outer.time_min - epsilon
            && self.time_max <= outer.time_max + epsilon
            && self.freq_min >= outer.freq_min - epsilon
            && self.freq_max <= outer.freq_max + epsilon
    }

    /// Clamp a point onto the rectangle.
    pub fn clamp(&self, point: DomainPoint) -> DomainPoint {
        DomainPoint::new(
            point.time.clamp(self.time_min, self.time_max),
            point.frequency.clamp(self.freq_min, self.freq_max),
        )
    }
}

/// Where the panel sits on the host screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Reject empty or non-finite panels.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(SvatError::InvalidViewportSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Converts points between screen, viewport, image and domain space.
///
/// Holds no state of its own: it reads the current viewport and is rebuilt
/// whenever one of its inputs changes.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransformer<'a> {
    bounds: DomainBounds,
    image: ImageDetails,
    panel: PanelRect,
    viewport: &'a ViewportState,
}

impl<'a> CoordinateTransformer<'a> {
    pub fn new(
        bounds: DomainBounds,
        image: ImageDetails,
        panel: PanelRect,
        viewport: &'a ViewportState,
    ) -> Self {
        Self {
            bounds,
            image,
            panel,
            viewport,
        }
    }

    /// The full domain extent of the image.
    pub fn bounds(&self) -> &DomainBounds {
        &self.bounds
    }

    /// The viewport this transformer reads.
    pub fn viewport(&self) -> &'a ViewportState {
        self.viewport
    }

    // ------------------------------------------------------------------
    // Screen <-> Viewport
    // ------------------------------------------------------------------

    pub fn screen_to_viewport(&self, p: ScreenPoint) -> ViewportPoint {
        let sx = self.viewport.width() / self.panel.width;
        let sy = self.viewport.height() / self.panel.height;
        ViewportPoint::new((p.x - self.panel.left) * sx, (p.y - self.panel.top) * sy)
    }

    pub fn viewport_to_screen(&self, p: ViewportPoint) -> ScreenPoint {
        let sx = self.panel.width / self.viewport.width();
        let sy = self.panel.height / self.viewport.height();
        ScreenPoint::new(p.x * sx + self.panel.left, p.y * sy + self.panel.top)
    }

    // ------------------------------------------------------------------
    // Viewport <-> Image
    // ------------------------------------------------------------------

    pub fn viewport_to_image(&self, p: ViewportPoint) -> ImagePoint {
        let (u, v) = self.viewport.viewport_to_normalized(p);
        ImagePoint::new(
            u * f64::from(self.image.natural_width),
            v * f64::from(self.image.natural_height),
        )
    }

    pub fn image_to_viewport(&self, p: ImagePoint) -> ViewportPoint {
        let u = p.x / f64::from(self.image.natural_width);
        let v = p.y / f64::from(self.image.natural_height);
        self.viewport.normalized_to_viewport(u, v)
    }

    // ------------------------------------------------------------------
    // Image <-> Domain
    // ------------------------------------------------------------------

    pub fn image_to_domain(&self, p: ImagePoint) -> DomainPoint {
        let b = &self.bounds;
        let frequency = b.freq_min + (p.x / f64::from(self.image.natural_width)) * b.freq_span();
        let time = b.time_max - (p.y / f64::from(self.image.natural_height)) * b.time_span();
        DomainPoint::new(time, frequency)
    }

    pub fn domain_to_image(&self, p: DomainPoint) -> ImagePoint {
        let b = &self.bounds;
        let x = (p.frequency - b.freq_min) / b.freq_span() * f64::from(self.image.natural_width);
        let y = (b.time_max - p.time) / b.time_span() * f64::from(self.image.natural_height);
        ImagePoint::new(x, y)
    }

    // ------------------------------------------------------------------
    // Composites
    // ------------------------------------------------------------------

    pub fn viewport_to_domain(&self, p: ViewportPoint) -> DomainPoint {
        self.image_to_domain(self.viewport_to_image(p))
    }

    pub fn domain_to_viewport(&self, p: DomainPoint) -> ViewportPoint {
        self.image_to_viewport(self.domain_to_image(p))
    }

    pub fn screen_to_domain(&self, p: ScreenPoint) -> DomainPoint {
        self.viewport_to_domain(self.screen_to_viewport(p))
    }

    pub fn domain_to_screen(&self, p: DomainPoint) -> ScreenPoint {
        self.viewport_to_screen(self.domain_to_viewport(p))
    }

    /// Check if an image-space point falls on the image footprint.
    pub fn is_inside_image(&self, p: ImagePoint) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x <= f64::from(self.image.natural_width)
            && p.y <= f64::from(self.image.natural_height)
    }

    /// Domain distance covered by one viewport pixel: (seconds, Hz).
    ///
    /// Time is reported as a positive amount even though it decreases downward.
    pub fn domain_per_pixel(&self) -> (f64, f64) {
        let (sx, sy) = self.viewport.scale();
        let seconds = self.bounds.time_span() / (sy * self.viewport.height());
        let hertz = self.bounds.freq_span() / (sx * self.viewport.width());
        (seconds, hertz)
    }

    /// Horizontal viewport distance between two frequencies.
    pub fn frequency_to_pixels(&self, df: f64) -> f64 {
        df.abs() / self.domain_per_pixel().1
    }
}
