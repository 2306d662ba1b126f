//! Configuration for SVAT.
//!
//! Two kinds of configuration exist:
//! - [`SpectrogramConfig`] and [`ImageDetails`] describe the spectrogram being
//!   annotated. They are produced by the page (table parsing and image loading
//!   happen outside this crate) and validated here before anything is built.
//! - [`WidgetConfig`] holds interaction preferences that can be exported and
//!   imported as JSON.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::coords::DomainBounds;
use crate::error::{Result, SvatError};
use crate::keybindings::KeyBindings;

/// Description of the spectrogram: its time/frequency extent and image source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    /// Time at the bottom edge of the image (seconds)
    pub time_min: f64,
    /// Time at the top edge of the image (seconds)
    pub time_max: f64,
    /// Frequency at the left edge of the image (Hz)
    pub freq_min: f64,
    /// Frequency at the right edge of the image (Hz)
    pub freq_max: f64,
    /// Source URL of the spectrogram image
    #[serde(default)]
    pub image_url: String,
}

impl SpectrogramConfig {
    /// Create a configuration from its bounds.
    pub fn new(
        time_min: f64,
        time_max: f64,
        freq_min: f64,
        freq_max: f64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            time_min,
            time_max,
            freq_min,
            freq_max,
            image_url: image_url.into(),
        }
    }

    /// Check that all bounds are finite and both ranges are non-empty.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("time_min", self.time_min),
            ("time_max", self.time_max),
            ("freq_min", self.freq_min),
            ("freq_max", self.freq_max),
        ] {
            if !value.is_finite() {
                return Err(SvatError::non_finite(field));
            }
        }
        if self.time_max <= self.time_min {
            return Err(SvatError::InvalidTimeRange {
                min: self.time_min,
                max: self.time_max,
            });
        }
        if self.freq_max <= self.freq_min {
            return Err(SvatError::InvalidFrequencyRange {
                min: self.freq_min,
                max: self.freq_max,
            });
        }
        Ok(())
    }

    /// The domain rectangle covered by the image.
    pub fn bounds(&self) -> DomainBounds {
        DomainBounds {
            time_min: self.time_min,
            time_max: self.time_max,
            freq_min: self.freq_min,
            freq_max: self.freq_max,
        }
    }
}

/// Intrinsic pixel size of the loaded spectrogram image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    /// Natural width in pixels
    pub natural_width: u32,
    /// Natural height in pixels
    pub natural_height: u32,
}

impl ImageDetails {
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
        }
    }

    /// Reject zero-sized images.
    pub fn validate(&self) -> Result<()> {
        if self.natural_width == 0 || self.natural_height == 0 {
            return Err(SvatError::InvalidImageDimensions {
                width: self.natural_width,
                height: self.natural_height,
            });
        }
        Ok(())
    }
}

/// Log level setting for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Convert to log crate's Level (used by the browser console logger).
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Widget configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Interaction preferences
    #[serde(default)]
    pub preferences: InteractionPreferences,

    /// Colors assigned to new features, cycled by creation order
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_palette() -> Vec<String> {
    constants::DEFAULT_PALETTE
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Interaction preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionPreferences {
    /// Smallest zoom factor (1.0 = whole image visible)
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Largest zoom factor
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Zoom multiplier per wheel notch / button press
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    /// Sound speed used in the Doppler estimate (m/s)
    #[serde(default = "default_sound_speed")]
    pub sound_speed: f64,

    /// Fraction of the image height a harmonic ladder spans
    #[serde(default = "default_harmonic_band_fraction")]
    pub harmonic_band_fraction: f64,

    /// Arrow key nudge in viewport pixels
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,

    /// Arrow key nudge with Shift held
    #[serde(default = "default_nudge_step_coarse")]
    pub nudge_step_coarse: f64,

    /// Hit radius for grabbing features (viewport pixels)
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,

    /// Pointer travel below which a press-release is a click (viewport pixels)
    #[serde(default = "default_min_drag_distance")]
    pub min_drag_distance: f64,

    /// Number of undo steps to keep
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_min_zoom() -> f64 {
    constants::DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> f64 {
    constants::DEFAULT_MAX_ZOOM
}

fn default_zoom_step() -> f64 {
    constants::DEFAULT_ZOOM_STEP
}

fn default_sound_speed() -> f64 {
    constants::DEFAULT_SOUND_SPEED
}

fn default_harmonic_band_fraction() -> f64 {
    constants::DEFAULT_HARMONIC_BAND_FRACTION
}

fn default_nudge_step() -> f64 {
    constants::DEFAULT_NUDGE_STEP
}

fn default_nudge_step_coarse() -> f64 {
    constants::DEFAULT_NUDGE_STEP_COARSE
}

fn default_hit_tolerance() -> f64 {
    constants::DEFAULT_HIT_TOLERANCE
}

fn default_min_drag_distance() -> f64 {
    constants::DEFAULT_MIN_DRAG_DISTANCE
}

fn default_max_history() -> usize {
    constants::DEFAULT_MAX_HISTORY
}

impl Default for InteractionPreferences {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            sound_speed: default_sound_speed(),
            harmonic_band_fraction: default_harmonic_band_fraction(),
            nudge_step: default_nudge_step(),
            nudge_step_coarse: default_nudge_step_coarse(),
            hit_tolerance: default_hit_tolerance(),
            min_drag_distance: default_min_drag_distance(),
            max_history: default_max_history(),
            log_level: LogLevel::default(),
        }
    }
}

impl WidgetConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: InteractionPreferences::default(),
            palette: default_palette(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Check the preferences for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let prefs = &self.preferences;
        if !(prefs.min_zoom >= 1.0 && prefs.max_zoom >= prefs.min_zoom && prefs.max_zoom.is_finite())
        {
            return Err(SvatError::InvalidZoomLimits {
                min: prefs.min_zoom,
                max: prefs.max_zoom,
            });
        }
        if !(prefs.zoom_step.is_finite() && prefs.zoom_step > 1.0) {
            return Err(SvatError::non_finite("zoom_step"));
        }
        if !(prefs.sound_speed.is_finite() && prefs.sound_speed > 0.0) {
            return Err(SvatError::non_finite("sound_speed"));
        }
        if !(prefs.harmonic_band_fraction > 0.0 && prefs.harmonic_band_fraction <= 1.0) {
            return Err(SvatError::non_finite("harmonic_band_fraction"));
        }
        self.keybindings.validate()
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(SvatError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::new()
    }
}
