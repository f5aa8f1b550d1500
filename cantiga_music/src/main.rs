// Cantiga CLI entry point.
//
// Analyzes a Portuguese text and writes the resulting melody to MIDI.
// The pipeline: configuration → orchestrated analysis → MIDI output.
//
// Usage:
//   cargo run -p cantiga_music -- "Que noite linda!" [--output out.mid]
//     [--scale NAME] [--dialect NAME] [--mode NAME] [--key NAME]
//     [--tempo BPM] [--config FILE] [--json]
//
// Unknown scale/dialect/mode/key names fall back to their defaults with a
// warning. Set RUST_LOG=cantiga_music=debug to trace the stages.

use cantiga_music::config::{PipelineConfig, tempo_or_default};
use cantiga_music::pipeline::Orchestrator;
use cantiga_music::player::{MidiFilePlayer, Player, total_seconds};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "cantiga", about = "Turn Portuguese text into a melody")]
#[command(version)]
struct Cli {
    /// Text to analyze
    text: String,

    /// Output MIDI path
    #[arg(short, long, default_value = "output.mid")]
    output: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale for letter pitches (major, minor, pentatonic, blues, dorian, chromatic)
    #[arg(long)]
    scale: Option<String>,

    /// Dialect (paulista, carioca, nordestino, gaucho)
    #[arg(long)]
    dialect: Option<String>,

    /// Analysis mode (basic, grammatical, harmonic, phonetic, prosodic, complete)
    #[arg(long)]
    mode: Option<String>,

    /// Musical key (C, G, D, A, F, Am, Em)
    #[arg(long)]
    key: Option<String>,

    /// Tempo in BPM (20-300)
    #[arg(long)]
    tempo: Option<u16>,

    /// Print the analysis as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> PipelineConfig {
    let mut config = match &cli.config {
        Some(path) => {
            let parsed = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|s| PipelineConfig::from_json(&s).map_err(|e| e.to_string()));
            match parsed {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error reading config {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => PipelineConfig::default(),
    };

    let overrides = PipelineConfig::from_names(
        cli.scale.as_deref().unwrap_or(config.scale.name()),
        cli.dialect.as_deref().unwrap_or(config.dialect.name()),
        cli.mode.as_deref().unwrap_or(config.mode.name()),
        cli.key.as_deref().unwrap_or(config.key.name()),
    );
    config.scale = overrides.scale;
    config.dialect = overrides.dialect;
    config.mode = overrides.mode;
    config.key = overrides.key;
    if let Some(t) = cli.tempo {
        config.tempo_bpm = tempo_or_default(t);
    }
    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cantiga_music=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    info!(
        scale = config.scale.name(),
        dialect = config.dialect.name(),
        mode = config.mode.name(),
        key = config.key.name(),
        tempo = config.tempo_bpm,
        "starting analysis"
    );

    let performance = Orchestrator::new(config).analyze(&cli.text);

    if cli.json {
        match serde_json::to_string_pretty(&performance) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error serializing analysis: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("=== Cantiga ===");
        println!("Text: {}", cli.text);
        println!("Mode: {} | Scale: {} | Key: {}", config.mode, config.scale, config.key.name());
        println!("Sentence: {:?}", performance.sentence_type);
        if let Some(plan) = &performance.plan {
            println!(
                "Harmony: {} ({}) mood {}",
                plan.progression_id,
                plan.chords.join(" "),
                plan.mood_label
            );
        }
        if performance.fallback {
            println!("Analysis failed; using direct character mapping.");
        }
        println!(
            "Events: {} ({:.1}s at {} BPM)",
            performance.events.len(),
            total_seconds(&performance.events, performance.tempo_bpm),
            performance.tempo_bpm
        );
    }

    let mut player = MidiFilePlayer::new(&cli.output);
    if let Err(e) = player.play(&performance) {
        eprintln!("Error writing MIDI: {e}");
        std::process::exit(1);
    }
    if !cli.json {
        println!("Wrote {}", cli.output.display());
    }
}
