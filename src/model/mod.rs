//! Data models for persistent and in-progress spectrogram features.

mod doppler;
mod harmonic;
mod marker;

pub use doppler::{CubicSegment, DopplerFit, DopplerHandle, s_curve_segments};
pub(crate) use doppler::speed_estimate;
pub use harmonic::{HarmonicSet, click_harmonic_index, min_spacing, validate_spacing};
pub use marker::AnalysisMarker;

/// Unique identifier for a marker or harmonic set.
pub type FeatureId = u32;
