/// Decibel CLI - Offline sound level and noise dose analysis
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use decibel_cli::{analyze_samples, load_config, read_mono, ConfigOverrides};
use decibel_core::types::{FrequencyWeighting, NoiseStandard, TimeWeighting};
use decibel_meter::{dose, LevelDurationAccumulator};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "decibel-cli")]
#[command(about = "Sound level meter and noise dosimeter for WAV recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure a WAV recording and print the report as JSON
    Analyze {
        /// WAV file to analyze
        path: PathBuf,
        /// Configuration file path (TOML)
        #[arg(short, long, env = "DECIBEL_CONFIG")]
        config: Option<PathBuf>,
        /// Frequency weighting of the primary meter (A, B, C, Z, ITU-R 468)
        #[arg(short = 'w', long)]
        weighting: Option<FrequencyWeighting>,
        /// Time weighting (fast, slow, impulse)
        #[arg(short, long)]
        time_weighting: Option<TimeWeighting>,
        /// Calibration offset in dB
        #[arg(long, allow_hyphen_values = true)]
        calibration: Option<f64>,
        /// Noise standard for dose calculation (osha, niosh, gbz, eu)
        #[arg(short, long)]
        standard: Option<NoiseStandard>,
        /// Samples per block
        #[arg(short, long)]
        block_size: Option<usize>,
        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the permissible exposure table of a noise standard
    Table {
        #[arg(short, long, default_value = "niosh")]
        standard: NoiseStandard,
        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// List the supported noise standards
    Standards,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "decibel_cli=info,decibel_meter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            config,
            weighting,
            time_weighting,
            calibration,
            standard,
            block_size,
            pretty,
        } => {
            let overrides = ConfigOverrides {
                block_size,
                frequency_weighting: weighting,
                time_weighting,
                calibration_offset_db: calibration,
                noise_standard: standard,
            };
            analyze(&path, config.as_deref(), &overrides, pretty)?;
        }
        Commands::Table { standard, json } => {
            print_table(standard, json)?;
        }
        Commands::Standards => {
            print_standards();
        }
    }

    Ok(())
}

fn analyze(
    path: &std::path::Path,
    config_path: Option<&std::path::Path>,
    overrides: &ConfigOverrides,
    pretty: bool,
) -> anyhow::Result<()> {
    let recording =
        read_mono(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut config = load_config(config_path, overrides)?;
    if config.sample_rate != recording.sample_rate {
        tracing::info!(
            "Using the file sample rate {} Hz instead of {} Hz",
            recording.sample_rate,
            config.sample_rate
        );
        config.sample_rate = recording.sample_rate;
        config.validate()?;
    }

    let report = analyze_samples(&recording.samples, config, Utc::now())?;
    let json = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };
    println!("{json}");
    Ok(())
}

fn print_table(standard: NoiseStandard, json: bool) -> anyhow::Result<()> {
    let table = dose::permissible_exposure_table(&standard.profile(), &LevelDurationAccumulator::new());

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!(
        "{} (criterion {} dB, exchange rate {} dB)",
        standard.description(),
        table.criterion_level_db,
        table.exchange_rate_db
    );
    println!("{:>10}  {:>14}", "Level dB", "Allowed");
    for row in &table.durations {
        println!(
            "{:>10.0}  {:>14}",
            row.sound_level,
            format_duration(row.allowed_duration_seconds)
        );
    }
    Ok(())
}

fn print_standards() {
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10}",
        "Name", "TWA limit", "Exchange", "Action", "Peak"
    );
    for standard in NoiseStandard::all() {
        let profile = standard.profile();
        println!(
            "{:<8} {:>10.0} {:>10.0} {:>10.0} {:>10.0}",
            standard.as_str(),
            profile.twa_limit_db,
            profile.exchange_rate_db,
            profile.action_level_db,
            profile.peak_limit_db
        );
    }
}

/// `8h 00m`, `1h 35m`, `28s`
fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}
