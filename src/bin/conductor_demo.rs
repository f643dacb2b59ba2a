// Conductor demonstration: simulated playback of a chart's tempo map
// Run with:
//   cargo run --bin conductor_demo -- [chart.ron|chart.json] [--config conductor.ron] [--seconds N]
// Set RUST_LOG=debug to see tempo map and remap logging

use conductor::{
    ChartDocument, ChartLoader, Conductor, ConductorConfig, ConductorEvent, PlaybackClock,
    SongTiming, TimeChangeEntry, TimeSignature,
};
use std::path::PathBuf;

// 60 FPS frame loop
const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_SECONDS: f64 = 12.0;

struct Args {
    chart: Option<PathBuf>,
    config: Option<PathBuf>,
    seconds: f64,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut args = Args {
        chart: None,
        config: None,
        seconds: DEFAULT_SECONDS,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config expects a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--seconds" => {
                let value = iter.next().ok_or("--seconds expects a number")?;
                args.seconds = value.parse()?;
            }
            _ => args.chart = Some(PathBuf::from(arg)),
        }
    }

    Ok(args)
}

/// Built-in chart: 4/4 at 120 BPM, speeding up to 150 BPM at 8 s, 3/4 at 10 s
fn builtin_chart() -> ChartDocument {
    let timing = SongTiming::constant(120.0, TimeSignature::four_four())
        .with_time_change(TimeChangeEntry::new(0.0, 120.0, 4, 4))
        .with_time_change(TimeChangeEntry::new(8000.0, 150.0, 4, 4))
        .with_time_change(TimeChangeEntry::new(10000.0, 150.0, 3, 4));
    ChartDocument::new("Built-in demo", timing)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => ConductorConfig::load(path)?,
        None => ConductorConfig::default(),
    };

    let chart = match &args.chart {
        Some(path) => ChartLoader::default().load(path)?,
        None => builtin_chart(),
    };

    println!("=== Conductor demo ===");
    println!("Chart: {}", chart.title);
    if let Some(artist) = &chart.artist {
        println!("Artist: {}", artist);
    }
    println!(
        "Time changes: {} | Simulating {:.1}s at 60 FPS\n",
        chart.timing.time_changes.len(),
        args.seconds
    );

    let mut conductor = Conductor::with_config(config);
    println!(
        "Default tempo: {} BPM | Combined offset: {} ms",
        conductor.config().default_bpm,
        conductor.combined_offset()
    );
    conductor.subscribe(|event| match event {
        ConductorEvent::BeatHit { beat } => println!("  beat    {:4}", beat),
        ConductorEvent::MeasureHit { measure } => println!("  MEASURE {:4}", measure),
        ConductorEvent::BpmChanged { bpm } => println!("~ tempo -> {:.2} BPM", bpm),
        ConductorEvent::StepHit { .. } => {}
    });

    conductor.map_song_timing(&chart.timing);

    let mut clock = PlaybackClock::new();
    clock.play();

    let frames = (args.seconds * 1000.0 / FRAME_MS).ceil() as usize;
    for _ in 0..frames {
        clock.advance(FRAME_MS);
        conductor.update(&clock);
    }

    println!(
        "\nStopped at {:.0} ms: {} ({:.3} steps)",
        conductor.song_position_ms(),
        conductor.position(),
        conductor.current_step_time()
    );

    Ok(())
}
