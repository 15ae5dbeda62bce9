//! The `db > ` prompt loop.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::error::{ExecuteError, StorageError};
use crate::statement::{InputType, MetaCommand, Statement};
use crate::table::Table;

/// Why a session ended early.
#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading a command or writing a reply failed.
    #[error("Terminal I/O error: {0}")]
    Terminal(#[from] io::Error),
}

#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Output(#[from] io::Error),
}

struct InputBuffer {
    buffer: String,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Reads the next line; `false` once the input is exhausted.
    fn read_input<R: BufRead>(&mut self, input: &mut R) -> io::Result<bool> {
        self.buffer.clear();
        let bytes_read = input.read_line(&mut self.buffer)?;
        let trimmed_len = self.buffer.trim_end().len();
        self.buffer.truncate(trimmed_len);
        Ok(bytes_read > 0)
    }

    fn as_str(&self) -> &str {
        self.buffer.trim_start()
    }
}

fn print_prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "db > ")?;
    out.flush()
}

/// Runs the interpreter until `.exit` or end of input, then closes `table`.
///
/// Rejected statements and full/empty table results are reported to `out`
/// and the loop continues. A storage or terminal failure ends the session
/// and is returned without closing the table.
pub fn run<R, W>(mut table: Table, mut input: R, mut out: W) -> Result<(), ReplError>
where
    R: BufRead,
    W: Write,
{
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt(&mut out)?;
        if !input_buffer.read_input(&mut input)? {
            tracing::debug!("end of input, closing");
            break;
        }

        let line = input_buffer.as_str();
        if line.is_empty() {
            continue;
        }

        match InputType::parse(line) {
            Ok(InputType::Meta(MetaCommand::Exit)) => break,
            Ok(InputType::Meta(MetaCommand::Unrecognized)) => {
                writeln!(out, "Unrecognized meta-command: {line}")?;
            }
            Ok(InputType::Statement(statement)) => {
                execute(&statement, &mut table, &mut out)?;
            }
            Err(err) => {
                tracing::debug!(%err, "rejected statement");
                writeln!(out, "{err}")?;
            }
        }
    }

    out.flush()?;
    table.close()?;
    Ok(())
}

fn execute<W: Write>(
    statement: &Statement,
    table: &mut Table,
    out: &mut W,
) -> Result<(), ReplError> {
    let result: Result<(), StepError> =
        statement.execute(table, |row| Ok(writeln!(out, "{row}")?));
    match result {
        Ok(()) => writeln!(out, "Executed.")?,
        Err(StepError::Output(err)) => return Err(err.into()),
        Err(StepError::Execute(ExecuteError::Storage(err))) => return Err(err.into()),
        Err(StepError::Execute(err)) => writeln!(out, "Error: {err}")?,
    }
    Ok(())
}
