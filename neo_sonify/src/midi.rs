// MIDI output from sequenced scores.
//
// Converts a `Score` into a Standard MIDI File for playback. Track 0
// carries the piece metadata (tempo, 4/4 time signature, key signature);
// every channel stream becomes its own track — small/medium/large stems
// and the hazard drums — so the piece can be remixed per stem in any DAW.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1
// (multi-track). An empty score serializes to a valid, silent file.

use crate::scale::Key;
use crate::sequencer::Score;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Convert a score to MIDI and write it to a file.
pub fn write_midi(score: &Score, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let smf = score_to_smf(score);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Sharps (positive) or flats (negative) in the key signature of the
/// piece's nominal key. For a minor qualifier the count comes from the
/// relative major. The tritone key is spelled with six sharps.
pub fn key_signature_accidentals(key: Key, minor: bool) -> i8 {
    let pitch_class = if minor {
        (key.pitch_class() + 3) % 12
    } else {
        key.pitch_class()
    };
    match pitch_class {
        0 => 0,   // C
        7 => 1,   // G
        2 => 2,   // D
        9 => 3,   // A
        4 => 4,   // E
        11 => 5,  // B
        6 => 6,   // F#
        1 => -5,  // Db
        8 => -4,  // Ab
        3 => -3,  // Eb
        10 => -2, // Bb
        _ => -1,  // F (pitch_class is always 0-11)
    }
}

/// Convert a score to an in-memory SMF.
fn score_to_smf(score: &Score) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(score.ticks_per_beat)),
    ));

    // Track 0: tempo, meter, key signature.
    let mut meta_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / score.bpm as u32;
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
    });
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::KeySignature(
            key_signature_accidentals(score.key, score.minor),
            score.minor,
        )),
    });
    meta_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(meta_track);

    // One track per channel stream, ascending channel order.
    for (&channel, notes) in &score.channels {
        let mut track: Track<'static> = Vec::new();
        let ch = u4::new(channel);

        if let Some(&program) = score.programs.get(&channel) {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel: ch,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(program),
                    },
                },
            });
        }

        for note in notes {
            track.push(TrackEvent {
                delta: u28::new(note.delta_ticks),
                kind: TrackEventKind::Midi {
                    channel: ch,
                    message: MidiMessage::NoteOn {
                        key: u7::new(note.pitch),
                        vel: u7::new(note.velocity),
                    },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(note.duration_ticks),
                kind: TrackEventKind::Midi {
                    channel: ch,
                    message: MidiMessage::NoteOff {
                        key: u7::new(note.pitch),
                        vel: u7::new(0),
                    },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}
