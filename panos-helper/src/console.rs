use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use thiserror::Error;

/// Failures of the operator terminal itself.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    /// Input reached end of file while a prompt was waiting.
    #[error("input closed")]
    Closed,
}

/// Line-oriented prompts and status output.
pub struct Console<R, W> {
    input: R,
    output: W,
}

/// Console bound to the process terminal.
pub type StdConsole = Console<StdinLock<'static>, Stdout>;

impl StdConsole {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `message` without a newline and read one line of input.
    ///
    /// The line terminator is removed; other whitespace is kept for the
    /// caller to judge.
    pub fn prompt(&mut self, message: &str) -> Result<String, ConsoleError> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(ConsoleError::Closed);
        }
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Ok(line)
    }

    /// Print one line.
    pub fn line(&mut self, text: impl Display) -> Result<(), ConsoleError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Print an empty line.
    pub fn blank(&mut self) -> Result<(), ConsoleError> {
        writeln!(self.output)?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
