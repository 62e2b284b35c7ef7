// The flattened close-approach record.
//
// One `CloseApproach` is one object's closest pass to Earth at a given
// instant. The raw feed groups approaches by day and by object; flattening
// (see model.rs) collapses that nesting into a single chronologically
// sorted list of these records, which is the only input shape the
// sonification core accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single close-approach event, flattened from the feed document.
///
/// Lists of these are sorted ascending by `when` before they reach the
/// sonification pipeline. Ties in `when` are allowed; their relative order
/// is whatever the stable sort preserved from the feed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    /// Moment of closest approach (UTC).
    pub when: DateTime<Utc>,
    /// Miss distance in kilometers.
    pub miss_distance_km: f64,
    /// Relative velocity in kilometers per second.
    pub relative_speed_kps: f64,
    /// NASA's "potentially hazardous asteroid" flag for the object.
    pub hazardous: bool,
    /// Mean of the object's estimated min/max diameter, in meters.
    pub diameter_m: f64,
}
