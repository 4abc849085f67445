//! Line-oriented form shell over a [`SessionHandle`].
//!
//! One-line commands (`search`, `show`, `add key=value ...`) sit next to two
//! prompt-driven forms: `add` with no fields asks for each field in turn, and
//! `edit <name>` offers each current value as the default.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{
    error::Result,
    instrument::{InstrumentDraft, InstrumentPatch, InstrumentRecord},
    runtime::handle::{RuntimeError, SessionHandle},
};

use super::render::{render_details, render_image, render_table};

const HELP: &str = "\
Commands:
  list                              show every instrument
  search [text]                     filter by name (case-insensitive)
  show <name>                       details for one instrument
  image <name>                      look up and cache a picture
  add                               add an instrument (form)
  add name=.. category=.. cabinet=.. [shelf=..] [quantity=..] [trays=..]
  edit <name>                       update an instrument (form)
  update <name> key=value ...       update selected fields
  help                              this text
  quit                              leave the shell
Quote values containing spaces: trays=\"Ortho Kit, Minor Kit\"";

/// Rejected shell input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellParseError {
    /// First word is not a command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// A command was given without its required argument.
    #[error("missing {0}")]
    MissingArgument(&'static str),
    /// A field token was not `key=value` or named an unknown field.
    #[error("bad field `{0}`, expected one of name, category, cabinet, shelf, quantity, trays")]
    BadField(String),
    /// Quantity was not a non-negative integer.
    #[error("quantity must be a non-negative integer, got `{0}`")]
    BadQuantity(String),
    /// A double quote was opened and never closed.
    #[error("unclosed quote")]
    UnclosedQuote,
}

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show every record.
    List,
    /// Filter by name fragment.
    Search(String),
    /// Detail card for one name.
    Show(String),
    /// Fetch and cache a picture.
    Image(String),
    /// Insert from inline fields.
    Add(InstrumentPatch),
    /// Insert through prompts.
    AddForm,
    /// Update through prompts.
    Edit(String),
    /// Update from inline fields.
    Update {
        /// Exact name of the target.
        name: String,
        /// Fields to overwrite.
        patch: InstrumentPatch,
    },
    /// Print usage.
    Help,
    /// Leave the shell.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

enum FormOutcome {
    Filled(InstrumentPatch),
    Discarded,
    Ended,
}

/// Text fields collected by the add and edit forms.
#[derive(Debug, Clone, Copy)]
enum FormField {
    Name,
    Category,
    Cabinet,
    Shelf,
    Trays,
}

impl FormField {
    const BEFORE_QUANTITY: [Self; 4] = [Self::Name, Self::Category, Self::Cabinet, Self::Shelf];

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Instrument Name",
            Self::Category => "Category",
            Self::Cabinet => "Cabinet Location",
            Self::Shelf => "Shelf Number",
            Self::Trays => "Trays where this instrument can be found",
        }
    }

    fn current(self, rec: &InstrumentRecord) -> &str {
        match self {
            Self::Name => &rec.name,
            Self::Category => &rec.category,
            Self::Cabinet => &rec.cabinet,
            Self::Shelf => &rec.shelf,
            Self::Trays => &rec.trays,
        }
    }

    fn set(self, patch: &mut InstrumentPatch, value: String) {
        match self {
            Self::Name => patch.name = Some(value),
            Self::Category => patch.category = Some(value),
            Self::Cabinet => patch.cabinet = Some(value),
            Self::Shelf => patch.shelf = Some(value),
            Self::Trays => patch.trays = Some(value),
        }
    }
}

fn tokenize(line: &str) -> std::result::Result<Vec<String>, ShellParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ShellParseError::UnclosedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_quantity(value: &str) -> std::result::Result<u32, ShellParseError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ShellParseError::BadQuantity(value.to_string()))
}

fn parse_fields(tokens: &[String]) -> std::result::Result<InstrumentPatch, ShellParseError> {
    let mut patch = InstrumentPatch::default();
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ShellParseError::BadField(token.clone()))?;
        let value = value.trim().to_string();
        match key.to_ascii_lowercase().as_str() {
            "name" => patch.name = Some(value),
            "category" => patch.category = Some(value),
            "cabinet" => patch.cabinet = Some(value),
            "shelf" => patch.shelf = Some(value),
            "quantity" | "qty" => patch.quantity = Some(parse_quantity(&value)?),
            "trays" => patch.trays = Some(value),
            _ => return Err(ShellParseError::BadField(token.clone())),
        }
    }
    Ok(patch)
}

fn required_name(rest: &[String]) -> std::result::Result<String, ShellParseError> {
    let name = rest.join(" ");
    if name.is_empty() {
        Err(ShellParseError::MissingArgument("instrument name"))
    } else {
        Ok(name)
    }
}

/// Parses one input line; blank lines yield `None`.
pub fn parse_line(line: &str) -> std::result::Result<Option<ShellCommand>, ShellParseError> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(None);
    };

    let cmd = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "search" | "find" => ShellCommand::Search(rest.join(" ")),
        "show" | "view" => ShellCommand::Show(required_name(rest)?),
        "image" => ShellCommand::Image(required_name(rest)?),
        "add" if rest.is_empty() => ShellCommand::AddForm,
        "add" => ShellCommand::Add(parse_fields(rest)?),
        "edit" => ShellCommand::Edit(required_name(rest)?),
        "update" => {
            let (name, fields) = rest
                .split_first()
                .ok_or(ShellParseError::MissingArgument("instrument name"))?;
            if fields.is_empty() {
                return Err(ShellParseError::MissingArgument("fields to update"));
            }
            ShellCommand::Update {
                name: name.clone(),
                patch: parse_fields(fields)?,
            }
        }
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

fn draft_from_patch(patch: InstrumentPatch, today: &str) -> InstrumentDraft {
    InstrumentDraft {
        name: patch.name.unwrap_or_default(),
        category: patch.category.unwrap_or_default(),
        cabinet: patch.cabinet.unwrap_or_default(),
        shelf: patch.shelf.unwrap_or_default(),
        quantity: patch.quantity.unwrap_or(0),
        trays: patch.trays.unwrap_or_default(),
        last_updated: Some(today.to_string()),
        image: None,
    }
}

/// Interactive session front end writing to `out`.
#[derive(Debug)]
pub struct Shell<W: Write> {
    session: SessionHandle,
    out: W,
    today: String,
}

impl<W: Write> Shell<W> {
    /// Shell stamping edits with today's local date.
    pub fn new(session: SessionHandle, out: W) -> Self {
        Self {
            session,
            out,
            today: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Overrides the date stamped on added and updated records.
    #[must_use]
    pub fn with_date(mut self, today: impl Into<String>) -> Self {
        self.today = today.into();
        self
    }

    /// Consumes the shell, returning the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails, or if the
    /// session has shut down.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        writeln!(self.out, "Sterile Instrument Locator. Type `help` for commands.")?;

        loop {
            self.prompt("> ")?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match parse_line(&line) {
                Ok(None) => {}
                Ok(Some(cmd)) => {
                    if self.execute(cmd, &mut lines).await? == Flow::Quit {
                        break;
                    }
                }
                Err(err) => writeln!(self.out, "Error: {err}. Type `help` for commands.")?,
            }
        }
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<()> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(())
    }

    async fn execute<R: AsyncBufRead + Unpin>(&mut self, cmd: ShellCommand, lines: &mut Lines<R>) -> Result<Flow> {
        match cmd {
            ShellCommand::List => {
                let records = self.session.list().await?;
                write!(self.out, "{}", render_table(&records))?;
            }
            ShellCommand::Search(query) => {
                let records = self.session.search(query).await?;
                write!(self.out, "{}", render_table(&records))?;
            }
            ShellCommand::Show(name) => match self.session.get_by_name(name.as_str()).await {
                Ok(rec) => write!(self.out, "{}", render_details(&rec))?,
                Err(RuntimeError::Store(err)) => writeln!(self.out, "{err}")?,
                Err(err) => return Err(err.into()),
            },
            ShellCommand::Image(name) => match self.session.fetch_image_by_name(name.as_str()).await {
                Ok(image) => writeln!(self.out, "Image for {name}: {}", render_image(&image))?,
                Err(RuntimeError::Store(err)) => writeln!(self.out, "{err}")?,
                Err(err) => return Err(err.into()),
            },
            ShellCommand::Add(patch) => {
                let draft = draft_from_patch(patch, &self.today);
                self.insert(draft).await?;
            }
            ShellCommand::AddForm => return self.add_form(lines).await,
            ShellCommand::Edit(name) => return self.edit_form(&name, lines).await,
            ShellCommand::Update { name, mut patch } => {
                patch.last_updated = Some(self.today.clone());
                match self.session.update_by_name(name.as_str(), patch).await {
                    Ok(_) => writeln!(self.out, "Instrument updated successfully: {name}")?,
                    Err(RuntimeError::Store(err)) => writeln!(self.out, "Could not update instrument: {err}")?,
                    Err(err) => return Err(err.into()),
                }
            }
            ShellCommand::Help => writeln!(self.out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn insert(&mut self, draft: InstrumentDraft) -> Result<()> {
        let name = draft.name.clone();
        match self.session.insert(draft).await {
            Ok(id) => writeln!(self.out, "Instrument added successfully: {name} (id {id})")?,
            Err(RuntimeError::Store(err)) => writeln!(self.out, "Could not add instrument: {err}")?,
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    /// Prompts for one value; `None` means input ended.
    async fn ask<R: AsyncBufRead + Unpin>(
        &mut self,
        lines: &mut Lines<R>,
        label: &str,
        current: Option<&str>,
    ) -> Result<Option<String>> {
        match current {
            Some(value) => self.prompt(&format!("{label} [{value}]: "))?,
            None => self.prompt(&format!("{label}: "))?,
        }
        Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
    }

    async fn fill_form<R: AsyncBufRead + Unpin>(
        &mut self,
        lines: &mut Lines<R>,
        current: Option<&InstrumentRecord>,
    ) -> Result<FormOutcome> {
        let mut patch = InstrumentPatch::default();

        for field in FormField::BEFORE_QUANTITY {
            let Some(value) = self.ask(lines, field.label(), current.map(|rec| field.current(rec))).await? else {
                return Ok(FormOutcome::Ended);
            };
            if current.is_none() || !value.is_empty() {
                field.set(&mut patch, value);
            }
        }

        let default_quantity = current.map_or(0, |rec| rec.quantity).to_string();
        let Some(quantity) = self.ask(lines, "Quantity Available", Some(default_quantity.as_str())).await? else {
            return Ok(FormOutcome::Ended);
        };
        if !quantity.is_empty() {
            match parse_quantity(&quantity) {
                Ok(q) => patch.quantity = Some(q),
                Err(err) => {
                    writeln!(self.out, "Error: {err}. Form discarded.")?;
                    return Ok(FormOutcome::Discarded);
                }
            }
        }

        let field = FormField::Trays;
        let Some(trays) = self.ask(lines, field.label(), current.map(|rec| field.current(rec))).await? else {
            return Ok(FormOutcome::Ended);
        };
        if current.is_none() || !trays.is_empty() {
            field.set(&mut patch, trays);
        }

        Ok(FormOutcome::Filled(patch))
    }

    async fn add_form<R: AsyncBufRead + Unpin>(&mut self, lines: &mut Lines<R>) -> Result<Flow> {
        match self.fill_form(lines, None).await? {
            FormOutcome::Filled(patch) => {
                let draft = draft_from_patch(patch, &self.today);
                self.insert(draft).await?;
                Ok(Flow::Continue)
            }
            FormOutcome::Discarded => Ok(Flow::Continue),
            FormOutcome::Ended => Ok(Flow::Quit),
        }
    }

    async fn edit_form<R: AsyncBufRead + Unpin>(&mut self, name: &str, lines: &mut Lines<R>) -> Result<Flow> {
        let rec = match self.session.get_by_name(name).await {
            Ok(rec) => rec,
            Err(RuntimeError::Store(err)) => {
                writeln!(self.out, "{err}")?;
                return Ok(Flow::Continue);
            }
            Err(err) => return Err(err.into()),
        };

        writeln!(self.out, "Editing {} (press Enter to keep a value)", rec.name)?;
        let mut patch = match self.fill_form(lines, Some(&rec)).await? {
            FormOutcome::Filled(patch) => patch,
            FormOutcome::Discarded => return Ok(Flow::Continue),
            FormOutcome::Ended => return Ok(Flow::Quit),
        };

        if patch.is_empty() {
            writeln!(self.out, "No changes.")?;
            return Ok(Flow::Continue);
        }

        patch.last_updated = Some(self.today.clone());
        let new_name = patch.name.clone().unwrap_or_else(|| rec.name.clone());
        // Addressed by id so a rename in this form cannot retarget the write.
        match self.session.update(rec.id, patch).await {
            Ok(()) => writeln!(self.out, "Instrument updated successfully: {new_name}")?,
            Err(RuntimeError::Store(err)) => writeln!(self.out, "Could not update instrument: {err}")?,
            Err(err) => return Err(err.into()),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequiredField;

    #[test]
    fn blank_lines_parse_to_nothing() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn search_joins_words_and_allows_empty() {
        assert_eq!(parse_line("search"), Ok(Some(ShellCommand::Search(String::new()))));
        assert_eq!(
            parse_line("search tissue for"),
            Ok(Some(ShellCommand::Search("tissue for".to_string())))
        );
    }

    #[test]
    fn show_requires_a_name() {
        assert_eq!(
            parse_line("show"),
            Err(ShellParseError::MissingArgument("instrument name"))
        );
        assert_eq!(
            parse_line("show Tissue Forceps"),
            Ok(Some(ShellCommand::Show("Tissue Forceps".to_string())))
        );
    }

    #[test]
    fn add_parses_quoted_fields() {
        let cmd = parse_line(r#"add name=Retractor category=Holding cabinet=D4 quantity=2 trays="Ortho Kit, Minor Kit""#)
            .unwrap()
            .unwrap();
        let ShellCommand::Add(patch) = cmd else {
            panic!("expected add");
        };
        assert_eq!(patch.name.as_deref(), Some("Retractor"));
        assert_eq!(patch.quantity, Some(2));
        assert_eq!(patch.trays.as_deref(), Some("Ortho Kit, Minor Kit"));
    }

    #[test]
    fn bare_add_opens_form() {
        assert_eq!(parse_line("add"), Ok(Some(ShellCommand::AddForm)));
    }

    #[test]
    fn update_takes_quoted_target_and_fields() {
        let cmd = parse_line(r#"update "Tissue Forceps" quantity=10"#).unwrap().unwrap();
        assert_eq!(
            cmd,
            ShellCommand::Update {
                name: "Tissue Forceps".to_string(),
                patch: InstrumentPatch {
                    quantity: Some(10),
                    ..InstrumentPatch::default()
                },
            }
        );
        assert_eq!(
            parse_line("update Forceps"),
            Err(ShellParseError::MissingArgument("fields to update"))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_line("add name=X colour=red"),
            Err(ShellParseError::BadField("colour=red".to_string()))
        );
        assert_eq!(
            parse_line("update Forceps quantity=-3"),
            Err(ShellParseError::BadQuantity("-3".to_string()))
        );
        assert_eq!(parse_line(r#"show "Forceps"#), Err(ShellParseError::UnclosedQuote));
        assert_eq!(
            parse_line("delete Forceps"),
            Err(ShellParseError::UnknownCommand("delete".to_string()))
        );
    }

    #[test]
    fn empty_quoted_value_is_kept() {
        let cmd = parse_line(r#"add name=X category="" cabinet=A"#).unwrap().unwrap();
        let ShellCommand::Add(patch) = cmd else {
            panic!("expected add");
        };
        assert_eq!(patch.category.as_deref(), Some(""));
    }

    #[test]
    fn field_values_are_trimmed() {
        let cmd = parse_line(r#"add name=" Retractor " category="  " cabinet=D4"#).unwrap().unwrap();
        let ShellCommand::Add(patch) = cmd else {
            panic!("expected add");
        };
        assert_eq!(patch.name.as_deref(), Some("Retractor"));
        assert_eq!(patch.category.as_deref(), Some(""));
        assert_eq!(draft_from_patch(patch, "2026-10-18").missing_field(), Some(RequiredField::Category));
    }
}
