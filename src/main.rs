//! Sort Replay CLI - Record a sort and replay it from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use sort_replay::{
    animation::{IntervalClock, PlaybackEngine, PlaybackState, RasterSurface, Stat},
    schema::VisualizerConfig,
    trace::{StepKind, record},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [output.ppm]", args[0]);
        eprintln!();
        eprintln!("Record a sort and replay it as a cost-weighted animation.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to visualizer configuration file");
        eprintln!("  output.ppm   Write the final frame as a PPM image (optional)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let output_path = args.get(2).map(PathBuf::from);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: VisualizerConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    println!("Sort Replay");
    println!("===========");
    println!("Algorithm: {}", config.algorithm);
    println!("Elements: {} ({})", config.size, config.distribution);
    println!(
        "Surface: {}x{}",
        config.surface.width, config.surface.height
    );
    println!(
        "Pacing: {} cycles/frame, restore after {} frames, {} ms/frame",
        config.playback.cycles_per_frame,
        config.playback.restore_threshold,
        config.frame_interval_ms
    );
    println!();

    // Record
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let trace = record(config.size, config.distribution, &mut rng, &config.algorithm);
    let total_steps = trace.len();

    println!("Recorded trace:");
    println!("  Steps: {}", total_steps);
    println!("  Compares: {}", trace.count(StepKind::Cmp));
    println!("  Swap steps: {}", trace.count(StepKind::Swap));
    println!("  Total cycles: {}", trace.total_cycles());
    println!();

    // Replay
    let surface = RasterSurface::new(config.surface.width, config.surface.height);
    let clock = IntervalClock::from_millis(config.frame_interval_ms);
    let mut engine = PlaybackEngine::new(surface, clock, config.playback);

    if let Err(e) = engine.play(trace, |_| {}) {
        eprintln!("Error starting playback: {}", e);
        std::process::exit(1);
    }

    println!("Replaying...");
    let start = Instant::now();
    let report_every = (total_steps / 10).max(1);
    let mut next_report = report_every;
    let mut frames: u64 = 0;

    loop {
        match engine.pump() {
            Ok(true) => frames += 1,
            Ok(false) => break,
            Err(e) => {
                eprintln!("Playback aborted: {}", e);
                std::process::exit(1);
            }
        }

        // Print progress every 10%
        if engine.state() == PlaybackState::Playing && engine.cursor() >= next_report {
            println!(
                "  Step {}/{}: cycles={}, frame {}",
                engine.cursor(),
                total_steps,
                engine.get(Stat::Cycles),
                frames
            );
            next_report += report_every;
        }
    }

    let elapsed = start.elapsed();
    let stats = engine.counters().snapshot();

    println!();
    println!("Final statistics:");
    println!("  Compares: {}", stats.cmp);
    println!("  Swaps: {}", stats.swap);
    println!("  Copies: {}", stats.copy);
    println!("  Sets: {}", stats.set);
    println!("  Cycles: {}", stats.cycles);
    println!();
    println!(
        "Time: {:.2}s ({} frames, {:.1} frames/s)",
        elapsed.as_secs_f32(),
        frames,
        frames as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );

    if let Some(path) = output_path {
        let written = File::create(&path)
            .map(BufWriter::new)
            .and_then(|mut w| {
                engine.surface().write_ppm(&mut w)?;
                w.flush()
            });
        match written {
            Ok(()) => println!("Final frame written to {}", path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}

fn print_example_config() {
    let config = VisualizerConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
