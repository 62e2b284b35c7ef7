// Event normalization: real time → compressed time, raw physics → ratios.
//
// The batch's real span (first to last approach) is rescaled into the
// configured piece duration, and each event's miss distance and relative
// speed are min-max scaled over the whole batch into [0, 1]. Closeness is
// inverted so nearer passes score higher. An epsilon in the denominator
// keeps degenerate batches (all distances equal, all speeds equal) from
// dividing by zero; they come out as closeness 1 and speed 0.
//
// An empty batch normalizes to an empty batch. A single event, or a batch
// whose events all share a timestamp, lands entirely at compressed time 0.

use crate::settings::Settings;
use neo_feed::event::CloseApproach;

/// Denominator guard for min-max scaling of degenerate batches.
const EPSILON: f64 = 1e-9;

/// A close approach with its derived position and ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub event: CloseApproach,
    /// Seconds into the compressed piece, 0 ≤ t ≤ target duration.
    pub compressed_time_sec: f64,
    /// 1 at the batch's nearest pass, approaching 0 at its farthest.
    pub closeness: f64,
    /// 0 at the batch's slowest pass, approaching 1 at its fastest.
    pub speed: f64,
}

/// Normalize a chronologically sorted batch. Output preserves length and
/// order; empty input yields empty output.
pub fn normalize(events: &[CloseApproach], settings: &Settings) -> Vec<NormalizedEvent> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Vec::new();
    };

    let real_span_sec = (last.when - first.when).num_milliseconds() as f64 / 1000.0;
    let target_sec = settings.target_duration_sec();

    let mut miss_min = f64::INFINITY;
    let mut miss_max = f64::NEG_INFINITY;
    let mut speed_min = f64::INFINITY;
    let mut speed_max = f64::NEG_INFINITY;
    for event in events {
        miss_min = miss_min.min(event.miss_distance_km);
        miss_max = miss_max.max(event.miss_distance_km);
        speed_min = speed_min.min(event.relative_speed_kps);
        speed_max = speed_max.max(event.relative_speed_kps);
    }

    events
        .iter()
        .map(|event| {
            let compressed_time_sec = if real_span_sec > 0.0 {
                let elapsed = (event.when - first.when).num_milliseconds() as f64 / 1000.0;
                (elapsed / real_span_sec) * target_sec
            } else {
                0.0
            };
            let closeness =
                1.0 - (event.miss_distance_km - miss_min) / (miss_max - miss_min + EPSILON);
            let speed =
                (event.relative_speed_kps - speed_min) / (speed_max - speed_min + EPSILON);
            NormalizedEvent {
                event: event.clone(),
                compressed_time_sec,
                closeness,
                speed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_441_700_000 + secs, 0).unwrap()
    }

    fn approach(secs: i64, miss_km: f64, speed_kps: f64) -> CloseApproach {
        CloseApproach {
            when: at(secs),
            miss_distance_km: miss_km,
            relative_speed_kps: speed_kps,
            hazardous: false,
            diameter_m: 100.0,
        }
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        assert!(normalize(&[], &Settings::default()).is_empty());
    }

    #[test]
    fn single_event_lands_at_time_zero() {
        let normalized = normalize(&[approach(0, 1000.0, 10.0)], &Settings::default());
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].compressed_time_sec, 0.0);
    }

    #[test]
    fn identical_timestamps_all_land_at_time_zero() {
        let events = [approach(0, 1000.0, 10.0), approach(0, 2000.0, 12.0)];
        let normalized = normalize(&events, &Settings::default());
        assert!(normalized.iter().all(|n| n.compressed_time_sec == 0.0));
    }

    #[test]
    fn time_is_rescaled_into_the_target_span() {
        // Three events over 100 real seconds into a 180-second piece.
        let events = [
            approach(0, 1000.0, 5.0),
            approach(50, 2000.0, 10.0),
            approach(100, 3000.0, 20.0),
        ];
        let mut settings = Settings::default();
        settings.target_minutes = 3.0;
        let normalized = normalize(&events, &settings);
        assert_eq!(normalized[0].compressed_time_sec, 0.0);
        assert!((normalized[1].compressed_time_sec - 90.0).abs() < 1e-9);
        assert!((normalized[2].compressed_time_sec - 180.0).abs() < 1e-9);
    }

    #[test]
    fn closeness_inverts_miss_distance() {
        let events = [approach(0, 1000.0, 5.0), approach(60, 5000.0, 20.0)];
        let normalized = normalize(&events, &Settings::default());
        // Nearest pass scores exactly 1; farthest approaches 0.
        assert_eq!(normalized[0].closeness, 1.0);
        assert!(normalized[1].closeness < 1e-6);
        assert!(normalized[0].closeness > normalized[1].closeness);
    }

    #[test]
    fn speed_scales_with_velocity() {
        let events = [approach(0, 1000.0, 5.0), approach(60, 5000.0, 20.0)];
        let normalized = normalize(&events, &Settings::default());
        assert_eq!(normalized[0].speed, 0.0);
        assert!((normalized[1].speed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_batch_does_not_divide_by_zero() {
        // All events share one miss distance and one speed.
        let events = [
            approach(0, 1234.0, 7.5),
            approach(30, 1234.0, 7.5),
            approach(60, 1234.0, 7.5),
        ];
        let normalized = normalize(&events, &Settings::default());
        for n in &normalized {
            assert!(n.closeness.is_finite());
            assert!(n.speed.is_finite());
            assert_eq!(n.closeness, 1.0);
            assert_eq!(n.speed, 0.0);
        }
    }

    #[test]
    fn ratios_stay_in_unit_range() {
        let events = [
            approach(0, 384_400.0, 3.2),
            approach(10, 42_000.0, 31.9),
            approach(200, 7_500_000.0, 12.4),
            approach(300, 42_000.0, 8.8),
        ];
        let normalized = normalize(&events, &Settings::default());
        for n in &normalized {
            assert!((0.0..=1.0).contains(&n.closeness));
            assert!((0.0..=1.0).contains(&n.speed));
            assert!(n.compressed_time_sec >= 0.0);
            assert!(n.compressed_time_sec <= Settings::default().target_duration_sec());
        }
    }
}
