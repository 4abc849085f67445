//! `instrument-locator` - CLI over one in-memory instrument session.

#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use instrument_locator::cli::render::{render_details, render_image, render_table};
use instrument_locator::cli::shell::Shell;
use instrument_locator::cli::{Cli, Command, SessionCommand};
use instrument_locator::core::store::InstrumentStore;
use instrument_locator::image::{HttpImageLookup, ImageLookup, NoImageLookup};
use instrument_locator::instrument::InstrumentRecord;
use instrument_locator::runtime::handle::{RuntimeConfig, SessionHandle, spawn_session};
use instrument_locator::{Config, Result, init_logging};

/// Exit status for an add or update the store refused.
const EXIT_REJECTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_store_rejection() => {
            eprintln!("{err}");
            ExitCode::from(EXIT_REJECTED)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Config(cmd) => cmd.run(cli.config, &mut std::io::stdout()),
        Command::Session(cmd) => {
            let config = Config::load_from(cli.config)?;
            let session = open_session(&config)?;
            let result = run_session_command(&session, cmd).await;
            session.shutdown().await?;
            result
        }
    }
}

fn open_session(config: &Config) -> Result<SessionHandle> {
    let store = if config.session.seed {
        InstrumentStore::seeded()
    } else {
        InstrumentStore::new()
    };

    let lookup: Arc<dyn ImageLookup> = if config.image.enabled {
        Arc::new(HttpImageLookup::new(&config.image)?)
    } else {
        Arc::new(NoImageLookup)
    };

    debug!(records = store.len(), image_lookup = config.image.enabled, "opening session");
    Ok(spawn_session(store, lookup, RuntimeConfig::from(config)))
}

async fn run_session_command(session: &SessionHandle, command: SessionCommand) -> Result<()> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    match command {
        SessionCommand::List(cmd) => {
            let records = session.list().await?;
            print_records(&records, cmd.json)?;
        }
        SessionCommand::Search(cmd) => {
            let records = session.search(cmd.query.unwrap_or_default()).await?;
            print_records(&records, cmd.json)?;
        }
        SessionCommand::Show(cmd) => {
            let rec = session.get_by_name(cmd.name.as_str()).await?;
            if cmd.image && rec.image.is_none() {
                session.fetch_image(rec.id).await?;
            }
            let rec = session.get(rec.id).await?.unwrap_or(rec);
            print!("{}", render_details(&rec));
        }
        SessionCommand::Add(cmd) => {
            let draft = cmd.to_draft(Some(today));
            let name = draft.name.clone();
            let id = session.insert(draft).await?;
            println!("Instrument added successfully: {name} (id {id})");
        }
        SessionCommand::Update(cmd) => {
            let patch = cmd.to_patch(Some(today));
            session.update_by_name(cmd.target.as_str(), patch).await?;
            println!("Instrument updated successfully: {}", cmd.name.as_ref().unwrap_or(&cmd.target));
        }
        SessionCommand::Image(cmd) => {
            let image = session.fetch_image_by_name(cmd.name.as_str()).await?;
            println!("{}", render_image(&image));
        }
        SessionCommand::Shell => {
            let mut shell = Shell::new(session.clone(), std::io::stdout());
            shell.run(tokio::io::BufReader::new(tokio::io::stdin())).await?;
        }
    }
    Ok(())
}

fn print_records(records: &[InstrumentRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        print!("{}", render_table(records));
    }
    Ok(())
}
