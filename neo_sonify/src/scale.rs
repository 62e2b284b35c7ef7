// Key and scale lookup tables.
//
// Both tables are closed enums rather than string-keyed maps: an unknown
// key or scale name is a construction-time error (settings validation),
// never a runtime lookup failure inside the pipeline.
//
// The `ALL` orderings double as the modulation cycles (see modulation.rs).
// The key cycle keeps the enharmonic spellings as distinct entries — C#
// and Db are different cycle positions with the same base pitch — and the
// two cycles have different lengths (17 keys, 7 scales), so key and scale
// drift apart after a few modulation steps. Both orderings are part of the
// output contract: reordering either changes every generated piece.

use serde::{Deserialize, Serialize};

/// A key name, mapped to a MIDI base pitch in the octave around middle C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    C,
    #[serde(rename = "C#")]
    Cs,
    Db,
    D,
    #[serde(rename = "D#")]
    Ds,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    Fs,
    Gb,
    G,
    #[serde(rename = "G#")]
    Gs,
    Ab,
    A,
    #[serde(rename = "A#")]
    As,
    Bb,
    B,
}

impl Key {
    /// Every key name in cycle order. Enharmonic pairs are adjacent, the
    /// sharp spelling first.
    pub const ALL: [Key; 17] = [
        Key::C,
        Key::Cs,
        Key::Db,
        Key::D,
        Key::Ds,
        Key::Eb,
        Key::E,
        Key::F,
        Key::Fs,
        Key::Gb,
        Key::G,
        Key::Gs,
        Key::Ab,
        Key::A,
        Key::As,
        Key::Bb,
        Key::B,
    ];

    /// Position in the cycle.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Advance cyclically through `ALL` by `steps` positions.
    pub fn advance(self, steps: usize) -> Key {
        Key::ALL[(self.index() + steps) % Key::ALL.len()]
    }

    /// MIDI pitch of this key's tonic in the middle-C octave (C = 60).
    pub fn base_pitch(self) -> u8 {
        match self {
            Key::C => 60,
            Key::Cs | Key::Db => 61,
            Key::D => 62,
            Key::Ds | Key::Eb => 63,
            Key::E => 64,
            Key::F => 65,
            Key::Fs | Key::Gb => 66,
            Key::G => 67,
            Key::Gs | Key::Ab => 68,
            Key::A => 69,
            Key::As | Key::Bb => 70,
            Key::B => 71,
        }
    }

    /// Pitch class 0-11 (C = 0).
    pub fn pitch_class(self) -> u8 {
        self.base_pitch() % 12
    }

    /// Display name, e.g. "C#".
    pub fn name(self) -> &'static str {
        match self {
            Key::C => "C",
            Key::Cs => "C#",
            Key::Db => "Db",
            Key::D => "D",
            Key::Ds => "D#",
            Key::Eb => "Eb",
            Key::E => "E",
            Key::F => "F",
            Key::Fs => "F#",
            Key::Gb => "Gb",
            Key::G => "G",
            Key::Gs => "G#",
            Key::Ab => "Ab",
            Key::A => "A",
            Key::As => "A#",
            Key::Bb => "Bb",
            Key::B => "B",
        }
    }

    /// Parse a key name, case-insensitively. Returns `None` for unknown
    /// names so callers can surface a configuration error.
    pub fn from_name(name: &str) -> Option<Key> {
        Key::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

/// A scale: semitone offsets from the tonic defining the allowed pitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    MinorPentatonic,
    MajorPentatonic,
    NaturalMinor,
    Major,
    Dorian,
    Lydian,
    Phrygian,
}

impl Scale {
    /// Every scale in cycle order.
    pub const ALL: [Scale; 7] = [
        Scale::MinorPentatonic,
        Scale::MajorPentatonic,
        Scale::NaturalMinor,
        Scale::Major,
        Scale::Dorian,
        Scale::Lydian,
        Scale::Phrygian,
    ];

    /// Position in the cycle.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Advance cyclically through `ALL` by `steps` positions.
    pub fn advance(self, steps: usize) -> Scale {
        Scale::ALL[(self.index() + steps) % Scale::ALL.len()]
    }

    /// Semitone offsets from the tonic, ascending within one octave.
    pub fn offsets(self) -> &'static [u8] {
        match self {
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
        }
    }

    /// Config/CLI name, e.g. "minor_pentatonic".
    pub fn name(self) -> &'static str {
        match self {
            Scale::MinorPentatonic => "minor_pentatonic",
            Scale::MajorPentatonic => "major_pentatonic",
            Scale::NaturalMinor => "natural_minor",
            Scale::Major => "major",
            Scale::Dorian => "dorian",
            Scale::Lydian => "lydian",
            Scale::Phrygian => "phrygian",
        }
    }

    /// Parse a scale name, case-insensitively. Returns `None` for unknown
    /// names so callers can surface a configuration error.
    pub fn from_name(name: &str) -> Option<Scale> {
        Scale::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Whether the piece's key signature should carry a minor qualifier:
    /// true for any scale whose name contains "minor" or "pentatonic".
    pub fn is_minor_flavored(self) -> bool {
        matches!(
            self,
            Scale::MinorPentatonic | Scale::MajorPentatonic | Scale::NaturalMinor
        )
    }
}
