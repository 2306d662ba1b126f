//! Analysis marker data model.

use serde::{Deserialize, Serialize};

use super::FeatureId;
use crate::coords::DomainPoint;

/// A persistent point measurement placed in Analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMarker {
    /// Unique identifier
    pub id: FeatureId,
    /// Time in seconds
    pub time: f64,
    /// Frequency in Hz
    pub frequency: f64,
    /// CSS color assigned at creation
    pub color: String,
}

impl AnalysisMarker {
    /// Create a new marker at the given position.
    pub fn new(id: FeatureId, position: DomainPoint, color: impl Into<String>) -> Self {
        Self {
            id,
            time: position.time,
            frequency: position.frequency,
            color: color.into(),
        }
    }

    pub fn position(&self) -> DomainPoint {
        DomainPoint::new(self.time, self.frequency)
    }

    pub fn set_position(&mut self, position: DomainPoint) {
        self.time = position.time;
        self.frequency = position.frequency;
    }
}
