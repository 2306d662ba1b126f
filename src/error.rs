//! Error types for widget construction and boundary operations.
//!
//! Pointer handling never returns these; interaction problems are absorbed
//! into no-ops. Only configuration, manual entry and table actions fail.

use thiserror::Error;

/// Errors that can occur when building or driving the widget from outside.
#[derive(Error, Debug)]
pub enum SvatError {
    /// `time_max` is not strictly greater than `time_min`
    #[error("Invalid time range: time_max ({max}) must be greater than time_min ({min})")]
    InvalidTimeRange {
        /// Configured minimum time
        min: f64,
        /// Configured maximum time
        max: f64,
    },

    /// `freq_max` is not strictly greater than `freq_min`
    #[error("Invalid frequency range: freq_max ({max}) must be greater than freq_min ({min})")]
    InvalidFrequencyRange {
        /// Configured minimum frequency
        min: f64,
        /// Configured maximum frequency
        max: f64,
    },

    /// A configured bound is NaN or infinite
    #[error("Non-finite bound for '{field}'")]
    NonFiniteBound {
        /// Name of the offending field
        field: String,
    },

    /// Image has zero width or height
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions {
        /// Natural width in pixels
        width: u32,
        /// Natural height in pixels
        height: u32,
    },

    /// Viewport or panel has a non-positive or non-finite size
    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewportSize {
        /// Width in pixels
        width: f64,
        /// Height in pixels
        height: f64,
    },

    /// Harmonic spacing must be finite and no finer than one image pixel
    #[error("Invalid harmonic spacing: {0} Hz")]
    InvalidSpacing(f64),

    /// Zoom limits are inverted or below 1:1
    #[error("Invalid zoom limits: min {min}, max {max}")]
    InvalidZoomLimits {
        /// Minimum zoom
        min: f64,
        /// Maximum zoom
        max: f64,
    },

    /// Region zoom request with an empty or inverted rectangle
    #[error("Invalid zoom region: {message}")]
    InvalidRegion {
        /// Description of the problem
        message: String,
    },

    /// A table action referenced a feature that does not exist
    #[error("Unknown {kind} id: {id}")]
    UnknownFeature {
        /// Feature kind ("marker" or "harmonic set")
        kind: &'static str,
        /// The missing ID
        id: u32,
    },

    /// Two modes share one hotkey, so one of them could never be selected
    #[error("Key '{key}' for {mode} mode is already used by {used_by}")]
    KeyConflict {
        /// Display name of the key
        key: &'static str,
        /// Mode whose binding collides
        mode: &'static str,
        /// What else the key is bound to
        used_by: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading a session or configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        /// Version found in the document
        file_version: u32,
        /// Newest version this build understands
        supported_version: u32,
    },
}

impl SvatError {
    /// Create a non-finite bound error for a named field.
    pub fn non_finite(field: impl Into<String>) -> Self {
        Self::NonFiniteBound {
            field: field.into(),
        }
    }

    /// Create an invalid region error with a message.
    pub fn invalid_region(message: impl Into<String>) -> Self {
        Self::InvalidRegion {
            message: message.into(),
        }
    }

    /// Create an unknown marker error.
    pub fn unknown_marker(id: u32) -> Self {
        Self::UnknownFeature { kind: "marker", id }
    }

    /// Create an unknown harmonic set error.
    pub fn unknown_harmonic_set(id: u32) -> Self {
        Self::UnknownFeature {
            kind: "harmonic set",
            id,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SvatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SvatError::InvalidTimeRange { min: 5.0, max: 1.0 };
        assert!(err.to_string().contains("time_max (1)"));

        let err = SvatError::unknown_marker(7);
        assert_eq!(err.to_string(), "Unknown marker id: 7");

        let err = SvatError::InvalidSpacing(-3.0);
        assert_eq!(err.to_string(), "Invalid harmonic spacing: -3 Hz");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: SvatError = parse.into();
        assert!(matches!(err, SvatError::Json(_)));
    }
}
