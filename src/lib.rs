//! Birdtag - Bird species tagging for images, video and audio.
//!
//! Media files are analyzed with ONNX models (an object detector for
//! images and video frames, an event classifier for audio), reduced to a
//! small recognized-species vocabulary and stored as queryable records.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod inference;
pub mod labels;
pub mod media;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod video;

use crate::audio::AudioClassifierConfig;
use crate::cli::{AnalyzeArgs, Cli, Command, ConfigAction, SearchArgs};
use crate::config::{Config, load_default_config, validate_config};
use crate::detector::{DetectorConfig, ImageDetector};
use crate::inference::ModelContext;
use crate::media::MediaType;
use crate::query::{FilterGroup, parse_get_filters, parse_post_filters};
use crate::store::{JsonStore, RecordStore};
use crate::video::ImageSequenceSource;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for the birdtag CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.analyze.verbose, cli.analyze.quiet);

    let config = load_default_config()?;
    validate_config(&config)?;

    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    if cli.inputs.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    analyze_files(&cli.inputs, &cli.analyze, &config)
}

/// Analyze input files with the given options.
fn analyze_files(inputs: &[PathBuf], args: &AnalyzeArgs, config: &Config) -> Result<()> {
    let mut store = open_store(args.store.as_deref(), config)?;
    let context = ModelContext::global(config)?;

    let detector_config = DetectorConfig {
        confidence_threshold: args
            .min_confidence
            .unwrap_or(config.defaults.detector_confidence),
        ..DetectorConfig::default()
    };
    let audio_config = AudioClassifierConfig {
        confidence_threshold: args
            .min_confidence
            .unwrap_or(config.defaults.audio_confidence),
        ..AudioClassifierConfig::default()
    };
    let write_sidecar = !args.no_predictions && config.defaults.write_predictions;

    let progress = create_progress(inputs.len(), !args.quiet);

    let mut processed = 0usize;
    let mut records = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;

    for input in inputs {
        let outcome = analyze_one(
            input,
            args.fps,
            context,
            detector_config,
            audio_config,
            write_sidecar,
        );

        match outcome {
            Ok(Some(record)) => {
                info!(
                    file = %input.display(),
                    species = record.detected_birds.len(),
                    "recorded"
                );
                store.put(record)?;
                processed += 1;
                records += 1;
            }
            Ok(None) => {
                processed += 1;
                skipped += 1;
            }
            Err(e) => {
                error!("Failed to process {}: {}", input.display(), e);
                errors += 1;
                if args.fail_fast {
                    return Err(e);
                }
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        "Complete: {processed} processed, {records} record(s), {skipped} without recognized species, {errors} error(s)"
    );

    if errors > 0 && !args.fail_fast {
        warn!("{errors} file(s) had errors");
    }

    Ok(())
}

/// Analyze a single input, dispatching on its media type.
///
/// Directories are treated as pre-extracted video frame sequences.
fn analyze_one(
    input: &Path,
    fps: Option<f32>,
    context: &ModelContext,
    detector_config: DetectorConfig,
    audio_config: AudioClassifierConfig,
    write_sidecar: bool,
) -> Result<Option<store::DetectionRecord>> {
    if input.is_dir() {
        let loaded = context.require_detector()?;
        let detector =
            ImageDetector::with_config(loaded.model.as_ref(), &loaded.labels, detector_config);
        let mut source = ImageSequenceSource::open(input, fps)?;
        return pipeline::analyze_video(
            &detector,
            &mut source,
            None,
            &input.display().to_string(),
        );
    }

    match MediaType::from_path(input)? {
        MediaType::Image => {
            let loaded = context.require_detector()?;
            let detector =
                ImageDetector::with_config(loaded.model.as_ref(), &loaded.labels, detector_config);
            pipeline::analyze_image(&detector, input)
        }
        MediaType::Video => Err(Error::VideoDecodeUnavailable {
            path: input.to_path_buf(),
        }),
        MediaType::Audio => {
            let loaded = context.require_audio()?;
            let analysis = pipeline::analyze_audio(
                loaded.model.as_ref(),
                &loaded.labels,
                input,
                audio_config,
                write_sidecar,
            )?;
            Ok(analysis.record)
        }
    }
}

/// Open the record store, preferring CLI override, then config, then the
/// platform data directory.
fn open_store(override_path: Option<&Path>, config: &Config) -> Result<JsonStore> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => match &config.defaults.store {
            Some(path) => path.clone(),
            None => config::default_store_path()?,
        },
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    JsonStore::open(path)
}

fn create_progress(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default; it is noisy about provider
    // selection. Use -v to raise it alongside our own level.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
        Command::Search(args) => handle_search_command(&args, config),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config::save_default_config(&Config::default())?;
            info!("Created config file: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{rendered}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config::config_file_path()?.display());
            Ok(())
        }
    }
}

#[allow(clippy::print_stdout)]
fn handle_search_command(args: &SearchArgs, config: &Config) -> Result<()> {
    let store = open_store(args.store.as_deref(), config)?;

    let groups = if let Some(example) = &args.file {
        example_filter_groups(example, args.fps, config)?
    } else if let Some(body) = &args.json {
        parse_post_filters(body)?
    } else {
        let pairs: Vec<(String, Option<String>)> = args
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), args.counts.get(i).cloned()))
            .collect();
        parse_get_filters(&pairs)
    };

    let response = query::search(&store, &groups)?;
    let rendered = serde_json::to_string_pretty(&response).map_err(|e| Error::Internal {
        message: format!("failed to render search response: {e}"),
    })?;
    println!("{rendered}");
    Ok(())
}

/// Analyze an example file and turn its detected species into a single
/// membership group, so matching records contain everything found in it.
fn example_filter_groups(
    example: &Path,
    fps: Option<f32>,
    config: &Config,
) -> Result<Vec<FilterGroup>> {
    let context = ModelContext::global(config)?;
    let detector_config = DetectorConfig {
        confidence_threshold: config.defaults.detector_confidence,
        ..DetectorConfig::default()
    };
    let audio_config = AudioClassifierConfig {
        confidence_threshold: config.defaults.audio_confidence,
        ..AudioClassifierConfig::default()
    };

    let record = analyze_one(example, fps, context, detector_config, audio_config, false)?;
    let Some(record) = record else {
        info!(
            "no recognized species in {}; nothing to search for",
            example.display()
        );
        return Err(Error::EmptyQuery);
    };

    let species: Vec<String> = record
        .detected_birds
        .iter()
        .map(|s| s.label.to_lowercase())
        .collect();
    info!(species = ?species, "searching by example");
    Ok(vec![FilterGroup::Membership(species)])
}
