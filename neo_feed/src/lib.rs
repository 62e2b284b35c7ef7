// NASA NeoWs close-approach feed support.
//
// The NeoWs "feed" endpoint returns, for a requested date span, every
// near-Earth object with a close approach in that span, grouped by day.
// This crate owns everything on the data-source side of the sonification
// pipeline:
//
// - event.rs: the flattened `CloseApproach` record the sonifier consumes
// - model.rs: serde model of the raw feed document + flattening/sorting
// - window.rs: date-span chunking for the API's 7-day-per-request limit,
//   and request URL construction
//
// The crate deliberately carries no HTTP transport. Feed documents are
// consumed as saved JSON (one file per request window); `window.rs` tells
// callers which windows to fetch. Numeric fields in the raw feed arrive as
// decimal strings and are parsed here, so downstream code only ever sees
// `f64`.

pub mod event;
pub mod model;
pub mod window;

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while acquiring or decoding feed data.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The requested date span ends before it starts.
    #[error("invalid date span: {end} is before {start}")]
    InvalidSpan { start: NaiveDate, end: NaiveDate },

    /// A numeric field in the feed document did not parse as a decimal.
    #[error("malformed numeric field `{field}`: {value:?}")]
    MalformedNumber { field: &'static str, value: String },

    /// A close-approach timestamp did not match the feed's date format.
    #[error("malformed close-approach timestamp {value:?}")]
    MalformedTimestamp { value: String },

    /// Reading a saved feed document from disk failed.
    #[error("failed to read feed document {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A feed document was not valid JSON (or not a feed document at all).
    #[error("failed to parse feed document")]
    Json(#[from] serde_json::Error),
}
