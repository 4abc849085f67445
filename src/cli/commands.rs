//! CLI command definitions.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::{
    config::Config,
    error::Result,
    instrument::{InstrumentDraft, InstrumentPatch},
};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Case-insensitive name fragment; omit to list everything
    pub query: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Exact instrument name
    pub name: String,

    /// Look up a picture when the instrument has none
    #[arg(long)]
    pub image: bool,
}

/// Add command arguments.
///
/// Text fields are trimmed; empty required fields are rejected by the store,
/// not by the parser.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Instrument name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Category
    #[arg(long, default_value = "")]
    pub category: String,

    /// Cabinet location
    #[arg(long, default_value = "")]
    pub cabinet: String,

    /// Shelf number
    #[arg(long, default_value = "")]
    pub shelf: String,

    /// Quantity available
    #[arg(long, default_value_t = 0)]
    pub quantity: u32,

    /// Trays where this instrument can be found
    #[arg(long, default_value = "")]
    pub trays: String,
}

impl AddCommand {
    /// Draft carrying the given fields.
    #[must_use]
    pub fn to_draft(&self, today: Option<String>) -> InstrumentDraft {
        InstrumentDraft {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            cabinet: self.cabinet.trim().to_string(),
            shelf: self.shelf.trim().to_string(),
            quantity: self.quantity,
            trays: self.trays.trim().to_string(),
            last_updated: today,
            image: None,
        }
    }
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Exact name of the instrument to update
    pub target: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// New cabinet location
    #[arg(long)]
    pub cabinet: Option<String>,

    /// New shelf number
    #[arg(long)]
    pub shelf: Option<String>,

    /// New quantity available
    #[arg(long)]
    pub quantity: Option<u32>,

    /// New tray list
    #[arg(long)]
    pub trays: Option<String>,
}

impl UpdateCommand {
    /// Sparse patch carrying only the flags that were given.
    #[must_use]
    pub fn to_patch(&self, today: Option<String>) -> InstrumentPatch {
        InstrumentPatch {
            name: self.name.clone(),
            category: self.category.clone(),
            cabinet: self.cabinet.clone(),
            shelf: self.shelf.clone(),
            quantity: self.quantity,
            trays: self.trays.clone(),
            last_updated: today,
            image: None,
        }
    }
}

/// Image command arguments.
#[derive(Debug, Args)]
pub struct ImageCommand {
    /// Exact instrument name
    pub name: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Path to config file (defaults to the standard location)
        file: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// Runs the command against `config_path` (the `-c` flag), writing to `out`.
    ///
    /// Nothing is loaded until the command needs it, so `path` and
    /// `validate FILE` work while the default file is broken.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration being shown or validated does
    /// not load, or if writing fails.
    pub fn run<W: Write>(self, config_path: Option<PathBuf>, out: &mut W) -> Result<()> {
        match self {
            Self::Show { json } => {
                let config = Config::load_from(config_path)?;
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
                } else {
                    write_config_text(&config, out)?;
                }
            }
            Self::Path => {
                let path = config_path.unwrap_or_else(Config::default_config_path);
                writeln!(out, "{}", path.display())?;
            }
            Self::Validate { file } => {
                let path = file
                    .or(config_path)
                    .unwrap_or_else(Config::default_config_path);
                writeln!(out, "Validating configuration: {}", path.display())?;
                if !path.exists() {
                    writeln!(out, "No file at this path; defaults and environment apply.")?;
                }
                Config::load_from(Some(path))?;
                writeln!(out, "Configuration is valid.")?;
            }
        }
        Ok(())
    }
}

fn write_config_text<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    writeln!(out, "Current Configuration")?;
    writeln!(out, "=====================")?;
    writeln!(out)?;
    writeln!(out, "[Image]")?;
    writeln!(out, "  Enabled:            {}", config.image.enabled)?;
    writeln!(out, "  Endpoint:           {}", config.image.endpoint)?;
    writeln!(out, "  API key set:        {}", config.image.api_key.is_some())?;
    writeln!(out, "  Timeout (ms):       {}", config.image.timeout_ms)?;
    writeln!(out)?;
    writeln!(out, "[Session]")?;
    writeln!(out, "  Seed data:          {}", config.session.seed)?;
    writeln!(out, "  Command queue:      {}", config.session.command_queue_bound)?;
    writeln!(out, "  Event capacity:     {}", config.session.event_capacity)?;
    Ok(())
}
