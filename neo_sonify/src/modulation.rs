// Time-driven key/scale modulation.
//
// Every `modulation_every_sec` seconds of compressed time, the active key
// advances one position through `Key::ALL` and the active scale advances
// one position through `Scale::ALL`. The two cycles have coprime-ish
// lengths (17 and 7), so after the first few steps the key and scale
// combinations stop lining up with the starting pair. That drift is the
// intended harmonic character of the piece, not an artifact.
//
// Pure function of (time, settings): no state, same input → same output.

use crate::scale::{Key, Scale};
use crate::settings::Settings;

/// The key and scale active at a given moment of compressed time.
pub fn active_key_and_scale(compressed_time_sec: f64, settings: &Settings) -> (Key, Scale) {
    let step = (compressed_time_sec / settings.modulation_every_sec).floor() as usize;
    (settings.key.advance(step), settings.scale.advance(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_pair_holds_through_the_first_interval() {
        let settings = Settings::default(); // A minor-pentatonic, 60 s
        assert_eq!(
            active_key_and_scale(0.0, &settings),
            (Key::A, Scale::MinorPentatonic)
        );
        assert_eq!(
            active_key_and_scale(59.9, &settings),
            (Key::A, Scale::MinorPentatonic)
        );
    }

    #[test]
    fn each_interval_advances_one_step() {
        let settings = Settings::default();
        assert_eq!(
            active_key_and_scale(60.0, &settings),
            (Key::As, Scale::MajorPentatonic)
        );
        assert_eq!(
            active_key_and_scale(120.0, &settings),
            (Key::Bb, Scale::NaturalMinor)
        );
    }

    #[test]
    fn events_two_intervals_apart_differ_by_two_steps() {
        let mut settings = Settings::default();
        settings.modulation_every_sec = 60.0;
        settings.target_minutes = 3.0;

        // Events at 10 s and 130 s of compressed time: two steps apart.
        let early = active_key_and_scale(10.0, &settings);
        let late = active_key_and_scale(130.0, &settings);
        assert_ne!(early, late);
        assert_eq!(late.0, early.0.advance(2));
        assert_eq!(late.1, early.1.advance(2));
    }

    #[test]
    fn cycles_desynchronize_and_wrap_independently() {
        let settings = Settings::default();
        // Seven steps return the scale to its start, but not the key.
        let (key, scale) = active_key_and_scale(7.0 * 60.0, &settings);
        assert_eq!(scale, settings.scale);
        assert_ne!(key, settings.key);
        // Seventeen steps return the key but not the scale.
        let (key, scale) = active_key_and_scale(17.0 * 60.0, &settings);
        assert_eq!(key, settings.key);
        assert_ne!(scale, settings.scale);
    }

    #[test]
    fn schedule_is_deterministic() {
        let settings = Settings::default();
        for i in 0..40 {
            let t = i as f64 * 13.7;
            assert_eq!(
                active_key_and_scale(t, &settings),
                active_key_and_scale(t, &settings)
            );
        }
    }
}
