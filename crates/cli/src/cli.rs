//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lightsaber Duel - two-player skeleton-tracked saber game
#[derive(Parser, Debug)]
#[command(
    name = "lightsaber-duel",
    author,
    version,
    about = "Two-player lightsaber duel driven by skeleton tracking",
    long_about = "Reads color and skeleton frames from a depth sensor (synthetic or replayed),\n\
                  draws a saber on each player's fighting arm, plays swing and clash cues,\n\
                  scores hits and rounds, and listens for the 'hulk' and 'smash' commands."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LIGHTSABER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LIGHTSABER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the duel
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "LIGHTSABER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replay a JSONL recording instead of the configured sensor source
    #[arg(long, env = "LIGHTSABER_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = recorded pace)
    #[arg(long, requires = "replay")]
    pub replay_speed: Option<f64>,

    /// Loop the replay when it ends
    #[arg(long, requires = "replay")]
    pub replay_loop: bool,

    /// Disable voice commands
    #[arg(long)]
    pub no_speech: bool,

    /// Stop after this many frame updates (0 = unlimited)
    #[arg(long, default_value = "0", env = "LIGHTSABER_MAX_FRAMES")]
    pub max_frames: u64,

    /// Duel timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "LIGHTSABER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Override the sensor event channel capacity
    #[arg(long, env = "LIGHTSABER_BUFFER_SIZE")]
    pub buffer_size: Option<usize>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "LIGHTSABER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "lightsaber.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sensor and speech details
    #[arg(long)]
    pub sensor: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_replay() {
        let cli = Cli::parse_from([
            "lightsaber-duel",
            "-v",
            "run",
            "--replay",
            "duel.jsonl",
            "--replay-speed",
            "2",
            "--max-frames",
            "90",
        ]);

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.replay, Some(PathBuf::from("duel.jsonl")));
        assert_eq!(args.replay_speed, Some(2.0));
        assert_eq!(args.max_frames, 90);
        assert!(args.config.is_none());
    }

    #[test]
    fn replay_speed_requires_replay() {
        let result = Cli::try_parse_from(["lightsaber-duel", "run", "--replay-speed", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["lightsaber-duel", "-q", "-v", "info"]);
        assert!(result.is_err());
    }
}
