//! Line prompts on the controlling terminal
//!
//! Prompts go through `rustyline` with the terminal preferred over stdio, so
//! a redirected stdout only ever receives the token set.

use rustyline::config::{Behavior, Config};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{Result, SkolauthError};

/// Line editor bound to the controlling terminal.
pub struct Prompt {
    editor: DefaultEditor,
}

impl Prompt {
    /// Creates a prompt.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::Io`] if the terminal cannot be initialized.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .behavior(Behavior::PreferTerm)
            .auto_add_history(true)
            .build();
        let editor = DefaultEditor::with_config(config).map_err(readline_error)?;
        Ok(Self { editor })
    }

    /// Reads one trimmed line.
    ///
    /// Returns `Ok(None)` on end of input or Ctrl-C. Blank lines are
    /// returned as empty strings.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(readline_error(e).into()),
        }
    }
}

fn readline_error(e: ReadlineError) -> SkolauthError {
    match e {
        ReadlineError::Io(io) => SkolauthError::Io(io),
        other => SkolauthError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}

/// Reads one line on a blocking thread so the runtime keeps running.
///
/// A fresh editor is created for every call.
pub async fn ask(label: impl Into<String>) -> Result<Option<String>> {
    let label = label.into();
    tokio::task::spawn_blocking(move || Prompt::new()?.read_line(&label))
        .await
        .map_err(|e| {
            SkolauthError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                e.to_string(),
            ))
        })?
}
