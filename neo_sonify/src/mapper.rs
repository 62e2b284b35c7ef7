// Note mapping: normalized events → concrete notes and drum hits.
//
// Each normalized event becomes exactly one melodic note; potentially
// hazardous objects additionally stamp a percussion hit at the same
// compressed time. Closeness drives both pitch (higher scale degree when
// nearer) and velocity (louder when nearer); relative speed drives
// duration, inverted (faster pass → shorter note); diameter picks the
// instrument lane.
//
// Pitch selection quantizes onto the active scale: closeness maps linearly
// onto the scale-degree ladder (scale length × octave spread degrees),
// rounds half away from zero to an index, and the index resolves to
// offset-within-scale plus whole octaves above the tonic. Every emitted
// pitch therefore lies on whatever scale the modulation schedule has
// active at that moment.

use crate::modulation::active_key_and_scale;
use crate::normalize::NormalizedEvent;
use crate::settings::{Settings, SizeThresholds};

/// Object size class, classified by mean estimated diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Classify a diameter against the configured boundaries. Boundaries
    /// are inclusive on the smaller class.
    pub fn classify(diameter_m: f64, thresholds: &SizeThresholds) -> SizeClass {
        if diameter_m <= thresholds.small_max_m {
            SizeClass::Small
        } else if diameter_m <= thresholds.medium_max_m {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

/// One event placed in musical terms, ready for sequencing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedEvent {
    /// A melodic note on a size-class lane.
    Note {
        /// Compressed start time in seconds.
        time_sec: f64,
        duration_sec: f64,
        pitch: u8,
        velocity: u8,
        channel: u8,
        program: u8,
    },
    /// A hazard marker on the drum channel.
    Drum {
        /// Compressed start time in seconds.
        time_sec: f64,
        duration_sec: f64,
        pitch: u8,
        velocity: u8,
        channel: u8,
    },
}

impl MappedEvent {
    pub fn time_sec(&self) -> f64 {
        match *self {
            MappedEvent::Note { time_sec, .. } | MappedEvent::Drum { time_sec, .. } => time_sec,
        }
    }

    pub fn duration_sec(&self) -> f64 {
        match *self {
            MappedEvent::Note { duration_sec, .. }
            | MappedEvent::Drum { duration_sec, .. } => duration_sec,
        }
    }

    pub fn pitch(&self) -> u8 {
        match *self {
            MappedEvent::Note { pitch, .. } | MappedEvent::Drum { pitch, .. } => pitch,
        }
    }

    pub fn velocity(&self) -> u8 {
        match *self {
            MappedEvent::Note { velocity, .. } | MappedEvent::Drum { velocity, .. } => velocity,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MappedEvent::Note { channel, .. } | MappedEvent::Drum { channel, .. } => channel,
        }
    }
}

/// Map one normalized event to its note, plus a drum hit when the object
/// is flagged hazardous.
pub fn map_event(
    event: &NormalizedEvent,
    settings: &Settings,
) -> (MappedEvent, Option<MappedEvent>) {
    let (key, scale) = active_key_and_scale(event.compressed_time_sec, settings);
    let offsets = scale.offsets();

    // Tonic an octave below the configured base octave's keynote, matching
    // the key table's middle-C-octave base pitches.
    let tonic = key.base_pitch() as i32 - 12 + settings.base_octave as i32 * 12;
    let degree_count = offsets.len() * settings.octave_spread as usize;
    let index = (event.closeness * (degree_count - 1) as f64).round() as usize;
    let mut pitch = tonic
        + offsets[index % offsets.len()] as i32
        + 12 * (index / offsets.len()) as i32;
    // Keys near B with a wide octave spread can arithmetically exceed the
    // MIDI range. Fold overflow down by whole octaves: stays in range and
    // stays on the active scale.
    while pitch > 127 {
        pitch -= 12;
    }
    let pitch = pitch as u8;

    let velocity_span = (settings.velocity.max - settings.velocity.min) as f64;
    let velocity =
        (settings.velocity.min as f64 + event.closeness * velocity_span).round() as u8;

    // Inverted: the fastest pass gets the shortest note.
    let duration_sec = settings.duration.max_sec
        - event.speed * (settings.duration.max_sec - settings.duration.min_sec);

    let lane = match SizeClass::classify(event.event.diameter_m, &settings.size_thresholds) {
        SizeClass::Small => settings.instruments.small,
        SizeClass::Medium => settings.instruments.medium,
        SizeClass::Large => settings.instruments.large,
    };

    let note = MappedEvent::Note {
        time_sec: event.compressed_time_sec,
        duration_sec,
        pitch,
        velocity,
        channel: lane.channel,
        program: lane.program,
    };

    let drum = event.event.hazardous.then(|| MappedEvent::Drum {
        time_sec: event.compressed_time_sec,
        duration_sec: settings.hazard.duration_sec,
        pitch: settings.hazard.note,
        velocity: settings.hazard.velocity,
        channel: settings.instruments.drum_channel,
    });

    (note, drum)
}

/// Map a whole normalized batch, notes and drum hits merged into one list
/// in input order (each note immediately followed by its drum hit, if any).
pub fn map_events(events: &[NormalizedEvent], settings: &Settings) -> Vec<MappedEvent> {
    let mut mapped = Vec::with_capacity(events.len());
    for event in events {
        let (note, drum) = map_event(event, settings);
        mapped.push(note);
        if let Some(drum) = drum {
            mapped.push(drum);
        }
    }
    mapped
}
