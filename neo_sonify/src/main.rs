// NEO Close-Approach Sonifier — CLI entry point.
//
// Turns saved NeoWs feed documents into a MIDI piece. The pipeline:
// feed loading → flatten/sort → normalize → map → sequence → MIDI output.
//
// Usage:
//   sonify [output.mid] --feed feed.json [--feed more.json ...]
//     [--settings settings.json] [--minutes F] [--bpm N] [--key NAME]
//     [--mode NAME] [--modulation-every SECS]
//
//   sonify --start YYYY-MM-DD --end YYYY-MM-DD
//     Prints the feed request URLs covering the span (the API serves at
//     most 7 days per request) so the documents can be fetched with any
//     HTTP client, then fed back in via --feed.
//
// Keys: C, C#, Db, ... B. Modes: minor_pentatonic, major_pentatonic,
// natural_minor, major, dorian, lydian, phrygian.

use chrono::NaiveDate;
use neo_sonify::midi::write_midi;
use neo_sonify::scale::{Key, Scale};
use neo_sonify::settings::{Settings, SettingsError};
use neo_sonify::sonify;
use std::path::{Path, PathBuf};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("neo_piece.mid");

    let feed_paths = parse_repeated_flag(&args, "--feed");
    let start: Option<String> = parse_flag(&args, "--start");
    let end: Option<String> = parse_flag(&args, "--end");

    // URL-printing mode: no feed documents, just tell the caller what to
    // fetch. Transport stays outside this binary.
    if feed_paths.is_empty() {
        if let (Some(start), Some(end)) = (start, end) {
            print_fetch_plan(&start, &end);
            return;
        }
        eprintln!("No feed documents. Either pass --feed feed.json (repeatable),");
        eprintln!("or pass --start/--end YYYY-MM-DD to print the fetch URLs.");
        std::process::exit(1);
    }

    let settings = match build_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    println!("=== NEO Close-Approach Sonifier ===");
    println!("Output: {output_path}");
    println!(
        "Key: {} {} | {} BPM | {:.1} minute piece | modulate every {:.0}s",
        settings.key.name(),
        settings.scale.name(),
        settings.bpm,
        settings.target_minutes,
        settings.modulation_every_sec
    );
    println!();

    println!("[1/4] Loading {} feed document(s)...", feed_paths.len());
    let mut documents = Vec::new();
    for path in &feed_paths {
        match neo_feed::model::load_document(path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                eprintln!("  Failed to load {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    println!("[2/4] Flattening close-approach events...");
    let events = match neo_feed::model::flatten_all(&documents) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("  Bad feed data: {e}");
            std::process::exit(1);
        }
    };
    let hazardous = events.iter().filter(|e| e.hazardous).count();
    println!("  {} events, {} flagged hazardous.", events.len(), hazardous);
    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        println!("  Span: {} to {}.", first.when, last.when);
    } else {
        println!("  Empty batch: the piece will be silent but valid.");
    }

    println!("[3/4] Mapping and sequencing...");
    let score = sonify(&events, &settings);
    let drum_hits = score.channels[&score.drum_channel].len();
    println!(
        "  {} notes ({} hazard drum hits) across {} channels, key signature {}.",
        score.note_count(),
        drum_hits,
        score.channels.len(),
        score.key_label()
    );

    println!("[4/4] Writing MIDI to {output_path}...");
    match write_midi(&score, Path::new(output_path)) {
        Ok(()) => {
            println!(
                "  Done! {:.0}s of music from {} close approaches.",
                settings.target_duration_sec(),
                events.len()
            );
        }
        Err(e) => {
            eprintln!("  Error writing MIDI: {e}");
            std::process::exit(1);
        }
    }

    println!();
    println!("Play with: timidity {output_path} (or any MIDI player)");
}

/// Assemble settings: optional JSON file, then per-flag overrides, then
/// validation. Any failure here aborts before the pipeline starts.
fn build_settings(args: &[String]) -> Result<Settings, SettingsError> {
    let mut settings = match parse_flag::<PathBuf>(args, "--settings") {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    if let Some(minutes) = parse_flag(args, "--minutes") {
        settings.target_minutes = minutes;
    }
    if let Some(bpm) = parse_flag(args, "--bpm") {
        settings.bpm = bpm;
    }
    if let Some(every) = parse_flag(args, "--modulation-every") {
        settings.modulation_every_sec = every;
    }
    if let Some(name) = parse_flag::<String>(args, "--key") {
        settings.key = Key::from_name(&name).ok_or(SettingsError::UnknownKey(name))?;
    }
    if let Some(name) = parse_flag::<String>(args, "--mode") {
        settings.scale = Scale::from_name(&name).ok_or(SettingsError::UnknownScale(name))?;
    }

    settings.validate()?;
    Ok(settings)
}

/// Print the chunked request windows and their URLs for a date span.
fn print_fetch_plan(start: &str, end: &str) {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| {
            eprintln!("Dates must be YYYY-MM-DD (got {s:?})");
            std::process::exit(1);
        })
    };
    let start = parse(start);
    let end = parse(end);

    let windows = match neo_feed::window::request_windows(start, end) {
        Ok(windows) => windows,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let api_key = std::env::var("NASA_API_KEY").unwrap_or_else(|_| "DEMO_KEY".to_string());
    println!(
        "# {} request window(s) for {start} to {end}:",
        windows.len()
    );
    for (window_start, window_end) in windows {
        println!(
            "{}",
            neo_feed::window::feed_url(window_start, window_end, &api_key)
        );
    }
    println!("# Fetch each URL to a file, then rerun with --feed per file.");
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn parse_repeated_flag(args: &[String], flag: &str) -> Vec<PathBuf> {
    args.iter()
        .enumerate()
        .filter(|(_, a)| *a == flag)
        .filter_map(|(i, _)| args.get(i + 1))
        .map(PathBuf::from)
        .collect()
}
