//! Terminal prompts
//!
//! Numbered menus and yes/no questions read line by line. End of input is
//! never an error: a menu returns `None` and a question returns its default.

use anyhow::Result;
use docsheet_interchange::{CollisionDecision, CollisionPolicy};
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr and read stdin
    pub fn terminal() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Show a numbered menu and return the index of the chosen option.
    ///
    /// Invalid answers ask again.
    pub fn select(&mut self, message: &str, options: &[String]) -> Result<Option<usize>> {
        writeln!(self.output, "{}", message)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {}", i + 1, option)?;
        }

        loop {
            write!(self.output, "Choose 1-{}: ", options.len())?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number between 1 and {}", options.len())?,
            }
        }
    }

    /// Ask a yes/no question. An empty answer takes `default`.
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "{} {} ", message, hint)?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                writeln!(self.output)?;
                return Ok(default);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n")?,
            }
        }
    }
}

/// Asks on the terminal before replacing an existing collection.
///
/// Defaults to keeping the collection.
pub struct InteractivePolicy;

impl CollisionPolicy for InteractivePolicy {
    fn decide(&self, database: &str, collection: &str) -> Option<CollisionDecision> {
        let question = format!(
            "Collection {}.{} already exists. Replace its documents?",
            database, collection
        );
        match Prompter::terminal().confirm(&question, false) {
            Ok(true) => Some(CollisionDecision::Overwrite),
            Ok(false) => Some(CollisionDecision::Skip),
            Err(e) => {
                tracing::warn!(error = %e, "could not read an answer");
                None
            }
        }
    }
}
