//! Global constants for the SVAT widget

/// Speed of sound in water (m/s), used by the Doppler speed estimate
pub const DEFAULT_SOUND_SPEED: f64 = 1500.0;

/// Smallest allowed zoom factor (1:1, never zoom out past the full image)
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;

/// Largest allowed zoom factor
pub const DEFAULT_MAX_ZOOM: f64 = 16.0;

/// Zoom multiplier per wheel notch or zoom button press
pub const DEFAULT_ZOOM_STEP: f64 = 1.25;

/// Fraction of the image height covered by a harmonic ladder, centered on its anchor
pub const DEFAULT_HARMONIC_BAND_FRACTION: f64 = 0.2;

/// Harmonic index the click lands on when the frequency axis starts above zero
pub const CLICK_HARMONIC_INDEX_OFFSET_AXIS: u32 = 10;

/// Harmonic index the click lands on when the frequency axis starts at zero
pub const CLICK_HARMONIC_INDEX_ZERO_AXIS: u32 = 5;

/// Keyboard nudge distance in viewport pixels
pub const DEFAULT_NUDGE_STEP: f64 = 1.0;

/// Keyboard nudge distance in viewport pixels while Shift is held
pub const DEFAULT_NUDGE_STEP_COARSE: f64 = 5.0;

/// Pointer distance (viewport pixels) within which a feature counts as hit
pub const DEFAULT_HIT_TOLERANCE: f64 = 8.0;

/// Pointer travel (viewport pixels) below which a press-release is a click, not a drag
pub const DEFAULT_MIN_DRAG_DISTANCE: f64 = 3.0;

/// Default undo history length
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Radius of an analysis marker circle in viewport pixels
pub const MARKER_RADIUS: f64 = 5.0;

/// Radius of a Doppler handle circle in viewport pixels
pub const DOPPLER_HANDLE_RADIUS: f64 = 6.0;

/// Default palette for markers and harmonic sets, cycled by creation order
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#ff5252", "#40c4ff", "#69f0ae", "#ffd740", "#e040fb", "#ff6e40", "#b2ff59", "#7c4dff",
];
