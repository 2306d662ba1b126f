//! Change notifications for observers of the widget (feature table, read-outs).

use serde::{Deserialize, Serialize};

use crate::coords::DomainBounds;
use crate::mode::Mode;
use crate::model::FeatureId;

/// A discrete change to widget state, drained with `take_events()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WidgetEvent {
    MarkerAdded { id: FeatureId },
    MarkerRemoved { id: FeatureId },
    MarkerMoved { id: FeatureId },
    HarmonicSetAdded { id: FeatureId },
    HarmonicSetRemoved { id: FeatureId },
    HarmonicSetChanged { id: FeatureId },
    /// A Doppler fit was created or one of its points moved
    DopplerChanged,
    DopplerCleared,
    ViewportChanged {
        scale: (f64, f64),
        visible: DomainBounds,
    },
    ModeChanged { mode: Mode },
}
