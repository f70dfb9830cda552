//! Line-oriented chat console.
//!
//! Reads guest input line by line and drives a [`SessionEngine`]. Lines
//! starting with `/` are commands; everything else is sent to the assistant.

use crate::completion::ChatCompletion;
use crate::error::Result;
use crate::session::{SessionEngine, SessionRecord, SessionSink};
use crate::transcript::write_download;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

const HELP: &str = "Commands: /end (save the session), /new (start over), /profile, /help, /quit";

/// A console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session and save it.
    End,
    /// Discard the session and start over.
    New,
    /// Show the extracted contact fields.
    Profile,
    /// Show the command list.
    Help,
    /// Leave the console.
    Quit,
    /// Send text to the assistant.
    Say(String),
    /// Blank line.
    Empty,
    /// Unrecognised `/command`.
    Unknown(String),
}

impl Command {
    /// Parse one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed {
            "/end" => Self::End,
            "/new" => Self::New,
            "/profile" => Self::Profile,
            "/help" => Self::Help,
            "/quit" | "/exit" | "exit" => Self::Quit,
            other if other.starts_with('/') => Self::Unknown(other.to_string()),
            other => Self::Say(other.to_string()),
        }
    }
}

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Prompt printed before each input line.
    pub prompt: String,
    /// Where transcripts are written on `/end`; `None` skips the download.
    pub downloads_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "You: ".to_string(),
            downloads_dir: None,
        }
    }
}

impl ConsoleConfig {
    /// Create a new console config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prompt string.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the transcript download directory.
    #[must_use]
    pub fn downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.downloads_dir = Some(dir.into());
        self
    }
}

/// Interactive chat console over any reader and writer.
pub struct Console<'a, R, W> {
    input: R,
    output: W,
    config: ConsoleConfig,
    completion: &'a dyn ChatCompletion,
    sink: &'a dyn SessionSink,
    records: Vec<SessionRecord>,
}

impl<R, W> std::fmt::Debug for Console<'_, R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .field("completion", &self.completion.name())
            .field("sink", &self.sink.name())
            .finish_non_exhaustive()
    }
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Create a console.
    pub fn new(
        input: R,
        output: W,
        config: ConsoleConfig,
        completion: &'a dyn ChatCompletion,
        sink: &'a dyn SessionSink,
    ) -> Self {
        Self {
            input,
            output,
            config,
            completion,
            sink,
            records: Vec::new(),
        }
    }

    /// Records produced by `/end` so far.
    #[must_use]
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self, engine: &mut SessionEngine) -> Result<()> {
        self.greet(engine)?;

        let prompt = self.config.prompt.clone();
        while let Some(line) = self.read_line(&prompt)? {
            match Command::parse(&line) {
                Command::Empty => {}
                Command::Quit => break,
                Command::Help => writeln!(self.output, "{HELP}")?,
                Command::Unknown(cmd) => writeln!(self.output, "Unknown command {cmd}. {HELP}")?,
                Command::Profile => self.show_profile(engine)?,
                Command::Say(text) => self.say(engine, &text).await?,
                Command::New => self.start_new(engine)?,
                Command::End => self.end(engine).await?,
            }
        }

        debug!(sessions = self.records.len(), "console closed");
        Ok(())
    }

    fn greet(&mut self, engine: &mut SessionEngine) -> Result<()> {
        if let Some(greeting) = engine.greet() {
            writeln!(self.output, "AI: {}", greeting.content())?;
        }
        Ok(())
    }

    async fn say(&mut self, engine: &mut SessionEngine, text: &str) -> Result<()> {
        match engine.send(text, self.completion).await {
            Ok(reply) => writeln!(self.output, "AI: {}", reply.content())?,
            Err(e) => {
                let hint = if e.is_transient() {
                    " Please try again."
                } else {
                    ""
                };
                writeln!(self.output, "! The assistant could not respond.{hint}")?;
            }
        }
        Ok(())
    }

    fn show_profile(&mut self, engine: &SessionEngine) -> Result<()> {
        let profile = engine.session().profile();
        writeln!(self.output, "Name:  {}", profile.name().unwrap_or("-"))?;
        writeln!(self.output, "Email: {}", profile.email().unwrap_or("-"))?;
        writeln!(self.output, "Phone: {}", profile.phone().unwrap_or("-"))?;
        Ok(())
    }

    fn start_new(&mut self, engine: &mut SessionEngine) -> Result<()> {
        let mut answer = None;
        let needs_confirm = engine.has_messages();
        if needs_confirm {
            answer = self.read_line("Start new chat? The current session will be lost. [y/N] ")?;
        }
        let confirmed = answer
            .as_deref()
            .is_some_and(|a| matches!(a.trim(), "y" | "Y" | "yes"));

        if engine.start_new(|| confirmed) {
            writeln!(self.output, "New chat started.")?;
            self.greet(engine)?;
        }
        Ok(())
    }

    async fn end(&mut self, engine: &mut SessionEngine) -> Result<()> {
        if !engine.has_messages() {
            writeln!(self.output, "Nothing to save yet.")?;
            return Ok(());
        }

        let ended = engine.end_session(self.sink).await;
        // Saving is best effort; the guest is told it is saved either way.
        writeln!(self.output, "Chat saved.")?;
        writeln!(self.output, "{}", ended.record.to_json_pretty()?)?;

        if let Some(dir) = self.config.downloads_dir.clone() {
            match write_download(&ended.record, &dir).await {
                Ok(path) => writeln!(self.output, "Transcript: {}", path.display())?,
                Err(e) => warn!(error = %e, "transcript download failed"),
            }
        }

        self.records.push(ended.record);
        self.greet(engine)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
