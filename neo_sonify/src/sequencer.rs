// The sequencer: mapped events → per-channel delta-time streams.
//
// MIDI cannot represent negative time, so the whole job here is turning
// absolute compressed-time seconds into non-negative per-channel deltas.
// All mapped events (notes and drum hits) are stable-sorted by
// (time, channel) — the channel tie-break keeps cross-channel emission
// order deterministic for simultaneous events — then walked once while a
// per-channel cursor tracks the latest end time already emitted on that
// channel. The delta is clamped at zero *before* tick rounding, so a
// floating-point regression upstream can never leak a negative delta into
// the output, and the cursor only ever moves forward (overlapping notes
// on one channel must not drag it backward).
//
// Channels are independent once the global sort has fixed the order, so a
// parallel-per-channel split would need no synchronization — but the sort
// must stay global. Cursors are an explicit value passed through the
// merge, not process state.

use crate::mapper::MappedEvent;
use crate::scale::Key;
use crate::settings::Settings;
use std::collections::BTreeMap;

/// One sequenced note: a delta from the previous event on its channel,
/// then the note itself. Serializes as note-on (after `delta_ticks`)
/// followed by note-off (after `duration_ticks`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencedNote {
    pub delta_ticks: u32,
    pub pitch: u8,
    pub velocity: u8,
    pub duration_ticks: u32,
}

/// Per-channel cursors: the latest absolute end time (seconds) already
/// emitted on each channel. Created at zero, advanced monotonically,
/// discarded after the run.
#[derive(Debug, Clone)]
pub struct ChannelCursors(BTreeMap<u8, f64>);

impl ChannelCursors {
    /// All cursors start at time zero.
    pub fn new(channels: impl IntoIterator<Item = u8>) -> Self {
        ChannelCursors(channels.into_iter().map(|ch| (ch, 0.0)).collect())
    }

    /// Seconds between a channel's cursor and `time_sec`, clamped at zero.
    pub fn delta_from(&self, channel: u8, time_sec: f64) -> f64 {
        let cursor = self.0.get(&channel).copied().unwrap_or(0.0);
        (time_sec - cursor).max(0.0)
    }

    /// Advance a channel's cursor to `end_sec`, never backward.
    pub fn advance(&mut self, channel: u8, end_sec: f64) {
        let cursor = self.0.entry(channel).or_insert(0.0);
        *cursor = cursor.max(end_sec);
    }

    /// Current cursor position for a channel.
    pub fn position(&self, channel: u8) -> f64 {
        self.0.get(&channel).copied().unwrap_or(0.0)
    }
}

/// The sequenced piece: per-channel event streams plus the global metadata
/// the serializer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub bpm: u16,
    pub ticks_per_beat: u16,
    /// Nominal starting key of the piece.
    pub key: Key,
    /// Whether the key signature carries a minor qualifier.
    pub minor: bool,
    /// Ordered note streams, keyed by channel. Configured channels with no
    /// events are present as empty streams.
    pub channels: BTreeMap<u8, Vec<SequencedNote>>,
    /// Program (instrument) per melodic channel. The drum channel has no
    /// program assignment.
    pub programs: BTreeMap<u8, u8>,
    pub drum_channel: u8,
}

impl Score {
    /// Textual key/mode label, e.g. "Am" or "C".
    pub fn key_label(&self) -> String {
        if self.minor {
            format!("{}m", self.key.name())
        } else {
            self.key.name().to_string()
        }
    }

    /// Total sequenced notes across all channels.
    pub fn note_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }
}

/// Convert non-negative seconds to ticks at the configured tempo and
/// resolution, rounding to the nearest tick. Saturates at the 28-bit
/// ceiling of an SMF delta time.
fn seconds_to_ticks(seconds: f64, settings: &Settings) -> u32 {
    const MAX_DELTA_TICKS: f64 = ((1u32 << 28) - 1) as f64;
    (seconds * settings.ticks_per_beat as f64 * settings.bpm as f64 / 60.0)
        .round()
        .min(MAX_DELTA_TICKS) as u32
}

/// Merge mapped events into per-channel delta streams.
pub fn sequence(mapped: &[MappedEvent], settings: &Settings) -> Score {
    let mut events: Vec<&MappedEvent> = mapped.iter().collect();
    events.sort_by(|a, b| {
        a.time_sec()
            .total_cmp(&b.time_sec())
            .then(a.channel().cmp(&b.channel()))
    });

    let mut channels: BTreeMap<u8, Vec<SequencedNote>> = settings
        .channels()
        .into_iter()
        .map(|ch| (ch, Vec::new()))
        .collect();
    let mut cursors = ChannelCursors::new(settings.channels());

    for event in events {
        let channel = event.channel();
        let delta_sec = cursors.delta_from(channel, event.time_sec());
        let note = SequencedNote {
            delta_ticks: seconds_to_ticks(delta_sec, settings),
            pitch: event.pitch(),
            velocity: event.velocity(),
            duration_ticks: seconds_to_ticks(event.duration_sec().max(0.0), settings),
        };
        channels.entry(channel).or_default().push(note);
        cursors.advance(channel, event.time_sec() + event.duration_sec());
    }

    let mut programs = BTreeMap::new();
    for lane in [
        settings.instruments.small,
        settings.instruments.medium,
        settings.instruments.large,
    ] {
        programs.insert(lane.channel, lane.program);
    }

    Score {
        bpm: settings.bpm,
        ticks_per_beat: settings.ticks_per_beat,
        key: settings.key,
        minor: settings.scale.is_minor_flavored(),
        channels,
        programs,
        drum_channel: settings.instruments.drum_channel,
    }
}
