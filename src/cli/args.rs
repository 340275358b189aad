//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bird species tagging for images, video frames and audio recordings.
#[derive(Debug, Parser)]
#[command(name = "birdtag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Media files (or frame directories) to analyze.
    pub inputs: Vec<PathBuf>,

    /// Common options for analysis.
    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Search stored records by species tags.
    Search(SearchArgs),
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the search subcommand.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Species tag to match exactly (repeatable; pairs with --count).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Exact count for the tag at the same position (defaults to 1).
    #[arg(long = "count")]
    pub counts: Vec<String>,

    /// JSON query body: an array of {"species": min_count} objects
    /// and/or ["species", ...] membership lists.
    #[arg(long, conflicts_with_all = ["tags", "counts"])]
    pub json: Option<String>,

    /// Search by example: analyze this media file and match records
    /// containing every species detected in it.
    #[arg(long, conflicts_with_all = ["tags", "counts", "json"])]
    pub file: Option<PathBuf>,

    /// Frame rate when --file is a directory of extracted video frames.
    #[arg(long, requires = "file")]
    pub fps: Option<f32>,

    /// Record store file (overrides config).
    #[arg(long, env = "BIRDTAG_STORE")]
    pub store: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Record store file (overrides config).
    #[arg(long, env = "BIRDTAG_STORE")]
    pub store: Option<PathBuf>,

    /// Minimum detection confidence (0.0-1.0, overrides config).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "BIRDTAG_MIN_CONFIDENCE")]
    pub min_confidence: Option<f32>,

    /// Frame rate for directories of extracted video frames.
    #[arg(long, env = "BIRDTAG_FPS")]
    pub fps: Option<f32>,

    /// Skip writing audio prediction sidecar files.
    #[arg(long)]
    pub no_predictions: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse and validate a confidence threshold.
fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "confidence must be between 0.0 and 1.0, got {value}"
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_confidence_valid() {
        assert_eq!(parse_confidence("0.5"), Ok(0.5));
        assert_eq!(parse_confidence("0.0"), Ok(0.0));
        assert_eq!(parse_confidence("1.0"), Ok(1.0));
    }

    #[test]
    fn test_parse_confidence_invalid() {
        assert!(parse_confidence("1.5").is_err());
        assert!(parse_confidence("-0.1").is_err());
        assert!(parse_confidence("abc").is_err());
    }

    #[test]
    fn test_cli_parses_inputs_and_flags() {
        let cli = Cli::parse_from(["birdtag", "photo.jpg", "clip.wav", "-v", "--fail-fast"]);
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.analyze.verbose, 1);
        assert!(cli.analyze.fail_fast);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_subcommand_pairs_tags_and_counts() {
        let cli = Cli::parse_from([
            "birdtag", "search", "--tag", "crow", "--count", "3", "--tag", "pigeon",
        ]);
        let Some(Command::Search(args)) = cli.command else {
            panic!("expected search subcommand");
        };
        assert_eq!(args.tags, vec!["crow", "pigeon"]);
        assert_eq!(args.counts, vec!["3"]);
    }

    #[test]
    fn test_search_by_file_excludes_other_criteria() {
        let cli = Cli::parse_from(["birdtag", "search", "--file", "sample.jpg"]);
        let Some(Command::Search(args)) = cli.command else {
            panic!("expected search subcommand");
        };
        assert_eq!(args.file.as_deref(), Some(Path::new("sample.jpg")));

        assert!(
            Cli::try_parse_from(["birdtag", "search", "--file", "sample.jpg", "--tag", "crow"])
                .is_err()
        );
    }
}
