// Integration test: chart and config documents on disk feeding a conductor

use conductor::chart::{ChartLoadOptions, DocumentFormat};
use conductor::{
    ChartDocument, ChartError, ChartLoader, Conductor, ConductorConfig, Offsets, SongTiming,
    TimeChangeEntry, TimeSignature,
};
use std::fs;
use tempfile::tempdir;

const CHART_RON: &str = r#"(
    title: "Two Tempos",
    artist: Some("Test Artist"),
    timing: (
        bpm: 120.0,
        time_changes: [
            (position_ms: 0.0, bpm: 120.0),
            (position_ms: 8000.0, bpm: 150.0),
        ],
        instrumental_offset: -20.0,
    ),
)"#;

const CHART_JSON: &str = r#"{
    "title": "Two Tempos",
    "artist": "Test Artist",
    "timing": {
        "bpm": 120.0,
        "time_changes": [
            { "position_ms": 0.0, "bpm": 120.0 },
            { "position_ms": 8000.0, "bpm": 150.0, "numerator": 4, "denominator": 4 }
        ],
        "instrumental_offset": -20.0
    }
}"#;

#[test]
fn test_ron_and_json_charts_map_identically() {
    let dir = tempdir().unwrap();
    let ron_path = dir.path().join("song.ron");
    let json_path = dir.path().join("song.json");
    fs::write(&ron_path, CHART_RON).unwrap();
    fs::write(&json_path, CHART_JSON).unwrap();

    let loader = ChartLoader::default();
    let from_ron = loader.load(&ron_path).unwrap();
    let from_json = loader.load(&json_path).unwrap();
    assert_eq!(from_ron, from_json);
    assert_eq!(from_ron.artist.as_deref(), Some("Test Artist"));

    let mut conductor = Conductor::new();
    conductor.map_song_timing(&from_ron.timing);
    assert_eq!(conductor.instrumental_offset(), -20.0);
    assert_eq!(conductor.step_at(8000.0), Some(64.0));
    assert_eq!(conductor.step_at(8500.0), Some(69.0));

    // Raw 8520 ms minus the 20 ms instrumental offset lands on step 69
    conductor.tick(8520.0);
    assert_eq!(conductor.current_step(), 69);
    assert_eq!(conductor.bpm(), Some(150.0));
}

#[test]
fn test_invalid_chart_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    let broken = r#"{
        "title": "Broken",
        "timing": { "bpm": 120.0, "time_changes": [ { "position_ms": 4000.0, "bpm": -1.0 } ] }
    }"#;
    fs::write(&path, broken).unwrap();

    let err = ChartLoader::default().load(&path).unwrap_err();
    assert!(matches!(err, ChartError::InvalidStructure(_)));

    // Unvalidated, the conductor still drops the bad change on its own
    let chart = ChartLoader::new(ChartLoadOptions { validate: false })
        .load(&path)
        .unwrap();
    let mut conductor = Conductor::new();
    conductor.map_song_timing(&chart.timing);
    assert_eq!(conductor.tempo_map().unwrap().point_count(), 1);
    assert_eq!(conductor.bpm(), Some(120.0));
}

#[test]
fn test_chart_opens_at_starting_bpm_before_first_change() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("late.ron");
    let late = r#"(
        title: "Late Change",
        timing: (bpm: 120.0, time_changes: [(position_ms: 8000.0, bpm: 150.0)]),
    )"#;
    fs::write(&path, late).unwrap();

    let chart = ChartLoader::default().load(&path).unwrap();
    let mut conductor = Conductor::new();
    conductor.map_song_timing(&chart.timing);

    assert_eq!(conductor.tempo_map().unwrap().point_count(), 2);
    assert_eq!(conductor.step_at(8000.0), Some(64.0));
    conductor.tick(4000.0);
    assert_eq!(conductor.bpm(), Some(120.0));
    conductor.tick(8500.0);
    assert_eq!(conductor.bpm(), Some(150.0));
    assert_eq!(conductor.current_step(), 69);
}

#[test]
fn test_chart_save_load_cycle() {
    let dir = tempdir().unwrap();
    let loader = ChartLoader::default();

    let timing = SongTiming::constant(96.0, TimeSignature::three_four())
        .with_time_change(TimeChangeEntry::new(0.0, 96.0, 3, 4))
        .with_time_change(TimeChangeEntry::new(15000.0, 128.0, 4, 4));
    let chart = ChartDocument::new("Waltz Into Four", timing);

    let path = dir.path().join("charts").join("waltz.ron");
    loader.save(&chart, &path).unwrap();
    assert_eq!(loader.load(&path).unwrap(), chart);

    let parsed = loader
        .parse(&fs::read_to_string(&path).unwrap(), DocumentFormat::Ron)
        .unwrap();
    assert_eq!(parsed.title, "Waltz Into Four");
}

#[test]
fn test_config_file_drives_conductor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conductor.ron");
    fs::write(
        &path,
        "(default_bpm: 100.0, offsets: (input: 30.0, audio_visual: -5.0))",
    )
    .unwrap();

    let config = ConductorConfig::load(&path).unwrap();
    assert_eq!(config.offsets, Offsets::new(0.0, 0.0, 30.0, -5.0));

    let mut conductor = Conductor::with_config(config);
    assert_eq!(conductor.combined_offset(), 25.0);

    conductor.map_song(f64::NAN, Vec::new());
    assert_eq!(conductor.bpm(), Some(100.0));

    // 100 BPM: 150 ms steps; 275 + 25 = 300 ms = step 2
    conductor.tick(275.0);
    assert_eq!(conductor.current_step(), 2);
}
