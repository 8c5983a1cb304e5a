use std::{
    collections::VecDeque,
    io::{self, BufRead as _, Write as _},
};

use crate::error::{RunError, RunResult};

/// Trait for handling output from the `>>` operator and the `print` builtin.
///
/// Implement this trait to capture or redirect print output. The default
/// implementation `StdPrint` writes to stdout.
pub trait PrintWriter {
    /// Called once for each rendered argument passed to `>>` / `print`, and for
    /// scan prompts.
    ///
    /// This method is responsible for writing only the given text; separators and
    /// the final newline are emitted via [`PrintWriter::push`].
    fn write(&mut self, output: &str) -> RunResult<()>;

    /// Adds a single character to the output.
    ///
    /// Generally called to add the spaces between print arguments and the trailing
    /// newline.
    fn push(&mut self, end: char) -> RunResult<()>;
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write(&mut self, output: &str) -> RunResult<()> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|err| RunError::value(format!("failed to write to stdout: {err}")))
    }

    fn push(&mut self, end: char) -> RunResult<()> {
        let mut buffer = [0u8; 4];
        self.write(end.encode_utf8(&mut buffer))
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    /// Creates a new empty `CollectStringPrint`.
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Returns the collected output as a string slice.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write(&mut self, output: &str) -> RunResult<()> {
        self.0.push_str(output);
        Ok(())
    }

    fn push(&mut self, end: char) -> RunResult<()> {
        self.0.push(end);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write(&mut self, _output: &str) -> RunResult<()> {
        Ok(())
    }

    fn push(&mut self, _end: char) -> RunResult<()> {
        Ok(())
    }
}

/// Trait for supplying input to the `<<` operator and the `scan` builtin.
///
/// Each call returns one line of input without its trailing newline.
pub trait ScanSource {
    /// Reads the next line of input.
    ///
    /// # Errors
    /// Returns a value error when no further input is available.
    fn read_line(&mut self) -> RunResult<String>;
}

/// Default `ScanSource` that reads lines from stdin.
#[derive(Debug, Default)]
pub struct StdScan;

impl ScanSource for StdScan {
    fn read_line(&mut self) -> RunResult<String> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| RunError::value(format!("failed to read from stdin: {err}")))?;
        if read == 0 {
            return Err(RunError::value("end of input while scanning"));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// A `ScanSource` that hands out pre-queued lines.
///
/// Useful for testing programs that scan without attaching a terminal.
#[derive(Debug, Default)]
pub struct QueuedScan(VecDeque<String>);

impl QueuedScan {
    /// Creates a queue from the given lines, handed out in order.
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl ScanSource for QueuedScan {
    fn read_line(&mut self) -> RunResult<String> {
        self.0
            .pop_front()
            .ok_or_else(|| RunError::value("end of input while scanning"))
    }
}

/// `ScanSource` for programs that never scan; any read is an error.
#[derive(Debug, Default)]
pub struct NoScan;

impl ScanSource for NoScan {
    fn read_line(&mut self) -> RunResult<String> {
        Err(RunError::value("end of input while scanning"))
    }
}
