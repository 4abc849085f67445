//! Command-line interface for the instrument locator.

mod commands;
/// Plain-text tables and detail cards.
pub mod render;
/// Interactive form shell.
pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ImageCommand, ListCommand, SearchCommand, ShowCommand, UpdateCommand,
};

use crate::logging::Verbosity;

/// instrument-locator - Find sterile instruments by cabinet, shelf, and tray
///
/// Every invocation starts from the seed inventory; use `shell` to add and
/// edit instruments within one session.
#[derive(Debug, Parser)]
#[command(name = "instrument-locator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands served by a fresh session.
    #[command(flatten)]
    Session(SessionCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Commands that open a session seeded per the configuration.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List every instrument
    List(ListCommand),

    /// Search instruments by name
    Search(SearchCommand),

    /// Show one instrument's details
    Show(ShowCommand),

    /// Add an instrument
    Add(AddCommand),

    /// Update an instrument
    Update(UpdateCommand),

    /// Look up and cache an instrument picture
    Image(ImageCommand),

    /// Browse and edit interactively
    Shell,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["instrument-locator", "-q", "list"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["instrument-locator", "list"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);

        let cli = Cli::try_parse_from(["instrument-locator", "-v", "list"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose);

        let cli = Cli::try_parse_from(["instrument-locator", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_search_without_query() {
        let cli = Cli::try_parse_from(["instrument-locator", "search"]).unwrap();
        match cli.command {
            Command::Session(SessionCommand::Search(cmd)) => assert!(cmd.query.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_defaults_optional_fields() {
        let cli = Cli::try_parse_from([
            "instrument-locator",
            "add",
            "--name",
            "Retractor",
            "--category",
            "Holding",
            "--cabinet",
            "D4",
        ])
        .unwrap();
        let Command::Session(SessionCommand::Add(cmd)) = cli.command else {
            panic!("expected add");
        };
        let draft = cmd.to_draft(None);
        assert_eq!(draft.quantity, 0);
        assert_eq!(draft.shelf, "");
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn test_add_trims_text_fields() {
        let cli = Cli::try_parse_from([
            "instrument-locator",
            "add",
            "--name",
            " Retractor ",
            "--category",
            "Holding",
            "--cabinet",
            "   ",
        ])
        .unwrap();
        let Command::Session(SessionCommand::Add(cmd)) = cli.command else {
            panic!("expected add");
        };
        let draft = cmd.to_draft(None);
        assert_eq!(draft.name, "Retractor");
        assert_eq!(draft.missing_field(), Some(crate::types::RequiredField::Cabinet));
    }

    #[test]
    fn test_parse_config_subcommands() {
        let cli = Cli::try_parse_from(["instrument-locator", "config", "validate", "other.toml"]).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Validate { file }) => {
                assert_eq!(file, Some(PathBuf::from("other.toml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_builds_sparse_patch() {
        let cli = Cli::try_parse_from(["instrument-locator", "update", "Forceps", "--quantity", "10"]).unwrap();
        let Command::Session(SessionCommand::Update(cmd)) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(cmd.target, "Forceps");
        let patch = cmd.to_patch(None);
        assert_eq!(patch.quantity, Some(10));
        assert!(patch.name.is_none());
        assert!(patch.category.is_none());
    }

    #[test]
    fn test_negative_quantity_rejected_by_parser() {
        assert!(Cli::try_parse_from(["instrument-locator", "update", "Forceps", "--quantity", "-1"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["instrument-locator", "-c", "/custom/config.toml", "shell"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Session(SessionCommand::Shell)));
    }
}
