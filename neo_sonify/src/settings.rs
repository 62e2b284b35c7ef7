// Musical and timing configuration.
//
// All tunable parameters live in `Settings`, loadable from JSON and
// overridable field by field. The pipeline never reads magic numbers — it
// reads from here. `validate()` runs eagerly, before any pipeline stage:
// once a `Settings` passes validation, normalization, mapping, and
// sequencing cannot fail.
//
// **Critical constraint: determinism.** Identical settings and identical
// input events must produce byte-identical output. Settings are never
// mutated once the pipeline starts.

use crate::scale::{Key, Scale};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One melodic instrument lane: a MIDI channel and the program (instrument)
/// sounding on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub channel: u8,
    pub program: u8,
}

/// Channel/program assignment per object size class, plus the percussion
/// channel for hazard markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruments {
    /// Objects up to `SizeThresholds::small_max_m`.
    pub small: Lane,
    /// Objects up to `SizeThresholds::medium_max_m`.
    pub medium: Lane,
    /// Everything larger.
    pub large: Lane,
    /// Channel for hazard drum hits (10 in 1-based MIDI terms).
    pub drum_channel: u8,
}

/// Note velocity range. Closer approaches map toward `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityRange {
    pub min: u8,
    pub max: u8,
}

/// Note duration range in seconds. Faster approaches map toward `min_sec`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min_sec: f64,
    pub max_sec: f64,
}

/// Diameter boundaries (meters) between the three size classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeThresholds {
    pub small_max_m: f64,
    pub medium_max_m: f64,
}

/// The percussive marker emitted for potentially hazardous objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardMarker {
    /// Drum-channel note number (39 = hand clap in General MIDI).
    pub note: u8,
    pub velocity: u8,
    pub duration_sec: f64,
}

/// Complete configuration for one sonification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Tempo in beats per minute.
    pub bpm: u16,
    /// Length of the finished piece in minutes; the whole event batch is
    /// compressed into this span.
    pub target_minutes: f64,
    /// Starting key. Modulation advances from here through `Key::ALL`.
    pub key: Key,
    /// Starting scale. Modulation advances from here through `Scale::ALL`.
    pub scale: Scale,
    /// Seconds of compressed time between key/scale shifts.
    pub modulation_every_sec: f64,
    /// Octave of the tonic (3 puts the tonic near the bottom of the bass
    /// clef for most keys).
    pub base_octave: u8,
    /// How many octaves of scale degrees the closeness mapping spans.
    pub octave_spread: u8,
    /// MIDI time resolution, ticks per quarter-note beat.
    pub ticks_per_beat: u16,
    pub instruments: Instruments,
    pub velocity: VelocityRange,
    pub duration: DurationRange,
    pub size_thresholds: SizeThresholds,
    pub hazard: HazardMarker,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bpm: 100,
            target_minutes: 3.0,
            key: Key::A,
            scale: Scale::MinorPentatonic,
            modulation_every_sec: 60.0,
            base_octave: 3,
            octave_spread: 3,
            ticks_per_beat: 480,
            instruments: Instruments {
                // Pizzicato strings, recorder, brass section: airy textures
                // that layer without mudding.
                small: Lane {
                    channel: 0,
                    program: 46,
                },
                medium: Lane {
                    channel: 1,
                    program: 74,
                },
                large: Lane {
                    channel: 2,
                    program: 61,
                },
                drum_channel: 9,
            },
            velocity: VelocityRange { min: 28, max: 112 },
            duration: DurationRange {
                min_sec: 0.15,
                max_sec: 1.8,
            },
            size_thresholds: SizeThresholds {
                small_max_m: 50.0,
                medium_max_m: 300.0,
            },
            hazard: HazardMarker {
                note: 39,
                velocity: 96,
                duration_sec: 0.1,
            },
        }
    }
}

/// A settings field violating its invariant. Every variant is detected by
/// `Settings::validate` before the pipeline runs, never mid-pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("tempo must be positive")]
    NonPositiveTempo,
    #[error("tempo slower than 4 bpm does not fit the MIDI tempo field: {0}")]
    TempoBelowMidiRange(u16),
    #[error("ticks per beat must be positive")]
    NonPositiveResolution,
    #[error("ticks per beat exceeds the SMF limit of 32767: {0}")]
    ResolutionTooLarge(u16),
    #[error("target duration must be positive (got {0} minutes)")]
    NonPositiveDuration(f64),
    #[error("modulation interval must be positive (got {0} seconds)")]
    NonPositiveModulationInterval(f64),
    #[error("octave spread must be at least 1")]
    ZeroOctaveSpread,
    #[error("velocity range is inverted: min {min} > max {max}")]
    InvertedVelocityRange { min: u8, max: u8 },
    #[error("duration range is inverted: min {min}s > max {max}s")]
    InvertedDurationRange { min: f64, max: f64 },
    #[error("size thresholds are inverted: small {small}m > medium {medium}m")]
    InvertedSizeThresholds { small: f64, medium: f64 },
    #[error("MIDI channel out of range 0-15: {0}")]
    ChannelOutOfRange(u8),
    #[error("MIDI data value out of range 0-127: {0}")]
    DataValueOutOfRange(u8),
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("unknown scale name {0:?}")]
    UnknownScale(String),
    #[error("failed to read settings file: {0}")]
    Unreadable(String),
    #[error("failed to parse settings file: {0}")]
    Unparsable(String),
}

impl Settings {
    /// Load settings from a JSON file. Parse and I/O failures are wrapped
    /// as configuration errors; the result is not yet validated.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Unreadable(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| SettingsError::Unparsable(e.to_string()))
    }

    /// Check every invariant. Returns the first violation found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bpm == 0 {
            return Err(SettingsError::NonPositiveTempo);
        }
        // The set-tempo meta event stores microseconds per beat in 24 bits;
        // 60_000_000 / bpm only fits for bpm >= 4.
        if self.bpm < 4 {
            return Err(SettingsError::TempoBelowMidiRange(self.bpm));
        }
        if self.ticks_per_beat == 0 {
            return Err(SettingsError::NonPositiveResolution);
        }
        // The SMF header stores the metrical division in 15 bits.
        if self.ticks_per_beat > 0x7FFF {
            return Err(SettingsError::ResolutionTooLarge(self.ticks_per_beat));
        }
        if !self.target_minutes.is_finite() || self.target_minutes <= 0.0 {
            return Err(SettingsError::NonPositiveDuration(self.target_minutes));
        }
        if !self.modulation_every_sec.is_finite() || self.modulation_every_sec <= 0.0 {
            return Err(SettingsError::NonPositiveModulationInterval(
                self.modulation_every_sec,
            ));
        }
        if self.octave_spread == 0 {
            return Err(SettingsError::ZeroOctaveSpread);
        }
        if self.velocity.min > self.velocity.max {
            return Err(SettingsError::InvertedVelocityRange {
                min: self.velocity.min,
                max: self.velocity.max,
            });
        }
        if self.duration.min_sec > self.duration.max_sec {
            return Err(SettingsError::InvertedDurationRange {
                min: self.duration.min_sec,
                max: self.duration.max_sec,
            });
        }
        if self.size_thresholds.small_max_m > self.size_thresholds.medium_max_m {
            return Err(SettingsError::InvertedSizeThresholds {
                small: self.size_thresholds.small_max_m,
                medium: self.size_thresholds.medium_max_m,
            });
        }
        for channel in self.channels() {
            if channel > 15 {
                return Err(SettingsError::ChannelOutOfRange(channel));
            }
        }
        for value in [
            self.instruments.small.program,
            self.instruments.medium.program,
            self.instruments.large.program,
            self.velocity.max,
            self.hazard.note,
            self.hazard.velocity,
        ] {
            if value > 127 {
                return Err(SettingsError::DataValueOutOfRange(value));
            }
        }
        Ok(())
    }

    /// Target piece duration in seconds.
    pub fn target_duration_sec(&self) -> f64 {
        self.target_minutes * 60.0
    }

    /// Every channel the piece uses, melodic lanes first, drums last.
    /// Duplicate assignments are allowed (two size classes may share a
    /// channel) and collapse into one stream at sequencing time.
    pub fn channels(&self) -> [u8; 4] {
        [
            self.instruments.small.channel,
            self.instruments.medium.channel,
            self.instruments.large.channel,
            self.instruments.drum_channel,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn default_settings_serialize_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, restored);
    }

    #[test]
    fn key_and_scale_use_musical_names_in_json() {
        let settings = Settings {
            key: Key::Cs,
            scale: Scale::NaturalMinor,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"C#\""));
        assert!(json.contains("\"natural_minor\""));
    }

    #[test]
    fn settings_load_from_json_string() {
        let json = r#"{
            "bpm": 90,
            "target_minutes": 2.0,
            "key": "Eb",
            "scale": "dorian",
            "modulation_every_sec": 30.0,
            "base_octave": 4,
            "octave_spread": 2,
            "ticks_per_beat": 960,
            "instruments": {
                "small": { "channel": 0, "program": 12 },
                "medium": { "channel": 1, "program": 33 },
                "large": { "channel": 2, "program": 48 },
                "drum_channel": 9
            },
            "velocity": { "min": 40, "max": 100 },
            "duration": { "min_sec": 0.2, "max_sec": 1.0 },
            "size_thresholds": { "small_max_m": 25.0, "medium_max_m": 200.0 },
            "hazard": { "note": 38, "velocity": 110, "duration_sec": 0.05 }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.key, Key::Eb);
        assert_eq!(settings.scale, Scale::Dorian);
        assert_eq!(settings.ticks_per_beat, 960);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut settings = Settings::default();
        settings.velocity = VelocityRange { min: 100, max: 20 };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvertedVelocityRange { .. })
        ));

        let mut settings = Settings::default();
        settings.duration = DurationRange {
            min_sec: 2.0,
            max_sec: 0.5,
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvertedDurationRange { .. })
        ));

        let mut settings = Settings::default();
        settings.size_thresholds = SizeThresholds {
            small_max_m: 500.0,
            medium_max_m: 300.0,
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvertedSizeThresholds { .. })
        ));
    }

    #[test]
    fn degenerate_timing_is_rejected() {
        let mut settings = Settings::default();
        settings.bpm = 0;
        assert_eq!(settings.validate(), Err(SettingsError::NonPositiveTempo));

        let mut settings = Settings::default();
        settings.bpm = 2;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::TempoBelowMidiRange(2))
        );

        // 4 bpm is the slowest tempo whose microsecond value fits.
        let mut settings = Settings::default();
        settings.bpm = 4;
        assert_eq!(settings.validate(), Ok(()));

        let mut settings = Settings::default();
        settings.ticks_per_beat = 0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NonPositiveResolution)
        );

        let mut settings = Settings::default();
        settings.ticks_per_beat = 40_000;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ResolutionTooLarge(40_000))
        );

        let mut settings = Settings::default();
        settings.modulation_every_sec = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonPositiveModulationInterval(_))
        ));

        let mut settings = Settings::default();
        settings.target_minutes = -1.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonPositiveDuration(_))
        ));
    }

    #[test]
    fn out_of_range_midi_fields_are_rejected() {
        let mut settings = Settings::default();
        settings.instruments.drum_channel = 16;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ChannelOutOfRange(16))
        );

        let mut settings = Settings::default();
        settings.hazard.note = 200;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::DataValueOutOfRange(200))
        );
    }
}
