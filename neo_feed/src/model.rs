// Serde model of the NeoWs feed document, plus flattening.
//
// The raw feed nests three levels deep: `near_earth_objects` maps a date
// string to a list of objects, and each object carries a list of
// close-approach entries. Numeric fields arrive as decimal strings
// ("4.1837487e5", "19.4850295284") and the approach timestamp is a
// "2015-Sep-08 09:08" style string in UTC.
//
// `flatten_events` collapses one document into sorted `CloseApproach`
// records; `flatten_all` does the same across several documents (one per
// request window) with a single final sort. Both sorts are stable, so
// same-instant approaches keep their document order.

use crate::FeedError;
use crate::event::CloseApproach;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Timestamp format used by `close_approach_date_full`.
const APPROACH_TIME_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Top-level feed document, as returned by the NeoWs feed endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    /// Objects grouped by day ("YYYY-MM-DD" keys). A `BTreeMap` so
    /// iteration over days is date-ordered regardless of JSON key order.
    pub near_earth_objects: BTreeMap<String, Vec<NearEarthObject>>,
}

/// One near-Earth object entry in the feed. Only the fields the
/// sonification consumes are modeled; the designation, orbit data, and
/// alternate units pass through unread.
#[derive(Debug, Clone, Deserialize)]
pub struct NearEarthObject {
    pub estimated_diameter: EstimatedDiameter,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproachEntry>,
}

/// Diameter estimates. The feed repeats these in several units; only the
/// meters block is modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatedDiameter {
    pub meters: DiameterRange,
}

/// Min/max diameter estimate in meters.
#[derive(Debug, Clone, Deserialize)]
pub struct DiameterRange {
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
}

/// One close-approach entry on an object.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseApproachEntry {
    /// Timestamp of closest approach, "2015-Sep-08 09:08" (UTC).
    pub close_approach_date_full: String,
    pub relative_velocity: RelativeVelocity,
    pub miss_distance: MissDistance,
}

/// Relative velocity, decimal strings per unit.
#[derive(Debug, Clone, Deserialize)]
pub struct RelativeVelocity {
    pub kilometers_per_second: String,
}

/// Miss distance, decimal strings per unit.
#[derive(Debug, Clone, Deserialize)]
pub struct MissDistance {
    pub kilometers: String,
}

/// Read and parse a saved feed document from disk.
pub fn load_document(path: &Path) -> Result<FeedDocument, FeedError> {
    let text = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Flatten one feed document into close-approach records, sorted ascending
/// by approach time.
pub fn flatten_events(doc: &FeedDocument) -> Result<Vec<CloseApproach>, FeedError> {
    let mut events = Vec::new();
    for objects in doc.near_earth_objects.values() {
        for object in objects {
            let meters = &object.estimated_diameter.meters;
            let diameter_m =
                (meters.estimated_diameter_min + meters.estimated_diameter_max) / 2.0;
            for approach in &object.close_approach_data {
                events.push(CloseApproach {
                    when: parse_approach_time(&approach.close_approach_date_full)?,
                    miss_distance_km: parse_decimal(
                        "miss_distance.kilometers",
                        &approach.miss_distance.kilometers,
                    )?,
                    relative_speed_kps: parse_decimal(
                        "relative_velocity.kilometers_per_second",
                        &approach.relative_velocity.kilometers_per_second,
                    )?,
                    hazardous: object.is_potentially_hazardous_asteroid,
                    diameter_m,
                });
            }
        }
    }
    events.sort_by(|a, b| a.when.cmp(&b.when));
    Ok(events)
}

/// Flatten several feed documents (one per request window) into a single
/// sorted event list.
pub fn flatten_all(docs: &[FeedDocument]) -> Result<Vec<CloseApproach>, FeedError> {
    let mut events = Vec::new();
    for doc in docs {
        events.extend(flatten_events(doc)?);
    }
    events.sort_by(|a, b| a.when.cmp(&b.when));
    Ok(events)
}

fn parse_decimal(field: &'static str, value: &str) -> Result<f64, FeedError> {
    value.parse().map_err(|_| FeedError::MalformedNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_approach_time(value: &str) -> Result<chrono::DateTime<chrono::Utc>, FeedError> {
    NaiveDateTime::parse_from_str(value, APPROACH_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| FeedError::MalformedTimestamp {
            value: value.to_string(),
        })
}
