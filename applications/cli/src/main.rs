/// loudnorm - batch loudness normalizer
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use loudnorm_batch::{
    save_to_disk, BatchEntry, BatchProcessor, LoudnessPipeline, Preset, PresetStore, UploadSet,
};
use loudnorm_cli::{AppConfig, ParamOverrides};
use loudnorm_core::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loudnorm")]
#[command(about = "Normalize the loudness of audio files", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./loudnorm.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress, limit and normalize files into the cache
    Process {
        /// Input audio files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,

        /// Output format (wav or aac)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Target loudness magnitude, e.g. 16 for -16 LUFS
        #[arg(short, long)]
        loudness: Option<f64>,

        /// Start from a saved preset
        #[arg(short, long)]
        preset: Option<String>,

        /// Copy finished files into "Normalized Loudness" next to the inputs
        #[arg(short, long)]
        save: bool,
    },
    /// Report loudness and peak figures without processing
    Measure {
        /// Input audio files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Manage presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Delete everything in the cache directory
    ClearCache,
}

#[derive(Subcommand)]
enum PresetAction {
    /// Save compressor and limiter settings under a name
    Save {
        name: String,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Show a preset
    Load { name: String },
    /// List preset names
    List,
    /// Delete a preset
    Delete { name: String },
}

/// Compressor and limiter flags
#[derive(Args, Clone, Copy)]
struct ParamArgs {
    /// Compressor threshold in dBFS
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f64>,

    /// Compression ratio
    #[arg(long)]
    ratio: Option<f64>,

    /// Attack time in ms
    #[arg(long)]
    attack: Option<f64>,

    /// Release time in ms
    #[arg(long)]
    release: Option<f64>,

    /// Peak ceiling in dBFS
    #[arg(long, allow_negative_numbers = true)]
    peak_limit: Option<f64>,
}

impl ParamArgs {
    fn overrides(self) -> ParamOverrides {
        ParamOverrides {
            threshold: self.threshold,
            ratio: self.ratio,
            attack: self.attack,
            release: self.release,
            peak_limit: self.peak_limit,
            ..ParamOverrides::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loudnorm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let paths = config.paths();
    paths
        .prepare()
        .context("Failed to create cache and preset directories")?;
    let presets = PresetStore::new(&paths.presets_dir);

    match cli.command {
        Commands::Process {
            files,
            params,
            format,
            loudness,
            preset,
            save,
        } => {
            let preset = preset
                .map(|name| presets.load(&name))
                .transpose()
                .context("Failed to load preset")?;
            let overrides = ParamOverrides {
                output_format: format,
                target_loudness: loudness,
                ..params.overrides()
            };
            let request = config.request_with(preset.as_ref(), &overrides);
            request.validate().context("Invalid processing parameters")?;

            let pipeline = LoudnessPipeline::new(paths, config.encoder_settings());
            let uploads = UploadSet::new(files);
            let processor = BatchProcessor::new(&pipeline).on_progress(Box::new(|progress| {
                tracing::info!(
                    "[{}/{}] {}",
                    progress.processed,
                    progress.total,
                    progress.current_file.as_deref().unwrap_or_default()
                );
            }));

            let entries = processor.survey(&uploads);
            let done = processor.run(&entries, &uploads, &request);
            print_table(&done);

            if save {
                let report = save_to_disk(&done, &uploads).context("Failed to save files")?;
                for (file, reason) in &report.failed {
                    eprintln!("Failed to save {file}: {reason}");
                }
                println!("{report}");
            }
        }
        Commands::Measure { files } => {
            let pipeline = LoudnessPipeline::new(paths, config.encoder_settings());
            for file in files {
                match pipeline.analyze_file(&file) {
                    Ok(report) => println!("{}\n{}\n", file.display(), report),
                    Err(e) => println!("{}\n  {}\n", file.display(), e),
                }
            }
        }
        Commands::Preset { action } => match action {
            PresetAction::Save { name, params } => {
                // Unset flags fall back to the configured defaults
                let request = config.request_with(None, &params.overrides());
                let preset = Preset::new(request.compressor, request.peak_limit_dbfs);
                let path = presets.save(&name, &preset)?;
                println!("Saved preset {} to {}", name.trim(), path.display());
            }
            PresetAction::Load { name } => {
                let preset = presets.load(&name)?;
                println!("threshold:         {} dBFS", preset.threshold_db);
                println!("ratio:             {}:1", preset.ratio);
                println!("attack:            {} ms", preset.attack_ms);
                println!("release:           {} ms", preset.release_ms);
                println!("peak_limit_target: {} dBFS", preset.peak_limit_dbfs);
            }
            PresetAction::List => {
                for name in presets.list()? {
                    println!("{name}");
                }
            }
            PresetAction::Delete { name } => {
                presets.delete(&name)?;
                println!("Deleted preset {}", name.trim());
            }
        },
        Commands::ClearCache => {
            let removed = paths.clear_cache()?;
            println!(
                "Removed {} item(s) from {}",
                removed,
                paths.cache_dir.display()
            );
        }
    }

    Ok(())
}

fn print_table(entries: &[BatchEntry]) {
    let width = entries
        .iter()
        .map(|e| e.file_name.len())
        .max()
        .unwrap_or(0)
        .max("File".len());

    println!(
        "{:<width$}  {:>14}  {:>15}  Status",
        "File", "Original LUFS", "Processed LUFS"
    );
    for entry in entries {
        println!(
            "{:<width$}  {:>14}  {:>15}  {}",
            entry.file_name,
            format_lufs(entry.original_loudness_lufs),
            format_lufs(entry.processed_loudness_lufs),
            entry.status
        );
    }
}

fn format_lufs(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}
