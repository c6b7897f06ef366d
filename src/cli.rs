// src/cli.rs

//! CLI argument parsing using `clap`.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `maestro`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "maestro",
    version,
    about = "Run a dependency graph of jobs with a bounded number of workers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Maestro.toml")]
    pub jobs: String,

    /// Maximum number of jobs running at once. Overrides `[controller].workers`.
    ///
    /// Zero or a negative value runs nothing.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Longest idle wait between polls (e.g. "500ms", "2s"). Overrides
    /// `[controller].idle_wait`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub idle_wait: Option<Duration>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MAESTRO_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the job file and print the launch plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["maestro"]).unwrap();
        assert_eq!(args.jobs, "Maestro.toml");
        assert_eq!(args.workers, None);
        assert_eq!(args.idle_wait, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn overrides_are_parsed() {
        let args = CliArgs::try_parse_from([
            "maestro",
            "--jobs",
            "ci.toml",
            "--workers",
            "-1",
            "--idle-wait",
            "250ms",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.jobs, "ci.toml");
        assert_eq!(args.workers, Some(-1));
        assert_eq!(args.idle_wait, Some(Duration::from_millis(250)));
        assert!(args.dry_run);
    }

    #[test]
    fn bad_idle_wait_is_rejected() {
        assert!(CliArgs::try_parse_from(["maestro", "--idle-wait", "soon"]).is_err());
    }
}
