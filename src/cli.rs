//! CLI argument parsing via clap.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Learn and generate extended semantic palettes for base16 themes.
#[derive(Debug, Parser)]
#[command(name = "paletteer", version)]
pub struct Args {
    /// Path to config file (default: ./paletteer.toml or ~/.config/paletteer/paletteer.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate extended palettes for themes that have none.
    Generate {
        /// Print the plan without writing files.
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Generate missing palettes and recompute every generated one.
    Regenerate {
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Also overwrite plugin and unmarked themes.
        #[arg(long = "force")]
        force: bool,
    },
    /// Tag untagged extended palettes as plugin-authored.
    MarkExisting {
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Learn a rule set from the labeled themes.
    Learn {
        /// Write the rules to FILE (.json for JSON, TOML otherwise).
        #[arg(long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
        /// Print the learned rules as JSON instead of the report.
        #[arg(long = "json")]
        json: bool,
    },
    /// Leave-one-out accuracy over the labeled themes.
    Validate {
        #[arg(long = "strategy", value_enum, default_value_t = StrategyArg::Rules)]
        strategy: StrategyArg,
        /// Print the full report as JSON.
        #[arg(long = "json")]
        json: bool,
        /// Compare per-field accuracy with a recorded baseline.
        #[arg(long = "baseline", value_name = "FILE")]
        baseline: Option<PathBuf>,
        /// Record this run's accuracy as a baseline.
        #[arg(long = "record", value_name = "FILE")]
        record: Option<PathBuf>,
    },
    /// Per-field slot-choice frequencies across the labeled themes.
    Analyze,
    /// Show the palette the rules would generate for a theme.
    Preview {
        /// Theme id (directory name).
        theme: String,
    },
    /// Print the feature vector of a theme.
    Features {
        theme: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Grade the configured (or built-in) rule set.
    Rules,
    /// Relearn rules without the held-out theme.
    Relearn,
    /// Borrow the nearest theme's slot mapping.
    Neighbor,
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, StrategyArg};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn regenerate_parses_flags() {
        let args = Args::parse_from(["paletteer", "regenerate", "--dry-run", "--force"]);
        assert!(matches!(
            args.command,
            Command::Regenerate {
                dry_run: true,
                force: true
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let args = Args::parse_from(["paletteer", "generate", "-vv", "-c", "p.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("p.toml")));
    }

    #[test]
    fn validate_defaults_to_rules_strategy() {
        let args = Args::parse_from(["paletteer", "validate"]);
        match args.command {
            Command::Validate {
                strategy,
                json,
                baseline,
                record,
            } => {
                assert_eq!(strategy, StrategyArg::Rules);
                assert!(!json);
                assert!(baseline.is_none() && record.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_neighbor_strategy() {
        let args = Args::parse_from(["paletteer", "validate", "--strategy", "neighbor", "--json"]);
        assert!(matches!(
            args.command,
            Command::Validate {
                strategy: StrategyArg::Neighbor,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn mark_existing_uses_kebab_case() {
        let args = Args::parse_from(["paletteer", "mark-existing"]);
        assert!(matches!(args.command, Command::MarkExisting { dry_run: false }));
    }

    #[test]
    fn preview_requires_theme() {
        assert!(Args::try_parse_from(["paletteer", "preview"]).is_err());
        let args = Args::parse_from(["paletteer", "preview", "nord"]);
        assert!(matches!(args.command, Command::Preview { theme } if theme == "nord"));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Args::try_parse_from(["paletteer", "validate", "--strategy", "vibes"]).is_err());
    }
}
