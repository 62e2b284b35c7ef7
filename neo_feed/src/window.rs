// Request windows for the feed endpoint.
//
// The NeoWs feed serves at most 7 days per request (inclusive of both
// endpoint dates). Covering a longer span means issuing several requests;
// that pagination belongs here, on the data-source side — the sonification
// core never sees it and assumes an unrestricted span.

use crate::FeedError;
use chrono::{Duration, NaiveDate};

/// Maximum difference in days between one request's end and start dates.
pub const MAX_WINDOW_DAYS: i64 = 7;

/// Feed endpoint base URL.
const FEED_ENDPOINT: &str = "https://api.nasa.gov/neo/rest/v1/feed";

/// Split an inclusive date span into consecutive windows no longer than
/// the per-request limit. Adjacent windows do not overlap; together they
/// cover exactly `[start, end]`.
pub fn request_windows(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, NaiveDate)>, FeedError> {
    if end < start {
        return Err(FeedError::InvalidSpan { start, end });
    }
    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let window_end = (cursor + Duration::days(MAX_WINDOW_DAYS)).min(end);
        windows.push((cursor, window_end));
        cursor = window_end + Duration::days(1);
    }
    Ok(windows)
}

/// Build the request URL for one window.
pub fn feed_url(start: NaiveDate, end: NaiveDate, api_key: &str) -> String {
    format!(
        "{FEED_ENDPOINT}?start_date={}&end_date={}&api_key={}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        api_key
    )
}
