// NEO close-approach sonification.
//
// Turns a chronologically sorted batch of near-Earth object close
// approaches into a deterministic multi-channel musical score and writes
// it to a Standard MIDI File. The pipeline:
// feed events → normalize → map → sequence → MIDI.
//
// Architecture:
// - scale.rs: closed key/scale tables, the fixed modulation cycle orderings
// - settings.rs: all musical/timing parameters + eager validation
// - normalize.rs: time compression and min-max closeness/speed ratios
// - modulation.rs: compressed time → active (key, scale), pure function
// - mapper.rs: normalized events → quantized notes + hazard drum hits
// - sequencer.rs: global (time, channel) sort, per-channel cursors,
//   non-negative delta-tick streams
// - midi.rs: `Score` → SMF Format 1 via midly
//
// Every stage is a pure batch transform: same events + same settings →
// byte-identical output. The only mutable state anywhere is the
// sequencer's per-channel cursor set, local to one `sequence` call.

pub mod mapper;
pub mod midi;
pub mod modulation;
pub mod normalize;
pub mod scale;
pub mod sequencer;
pub mod settings;

use neo_feed::event::CloseApproach;
use sequencer::Score;
use settings::Settings;

/// Run the full mapping pipeline on a sorted event batch. The settings are
/// assumed validated (see `Settings::validate`); given that, this cannot
/// fail — an empty batch produces a valid silent score.
pub fn sonify(events: &[CloseApproach], settings: &Settings) -> Score {
    let normalized = normalize::normalize(events, settings);
    let mapped = mapper::map_events(&normalized, settings);
    sequencer::sequence(&mapped, settings)
}
