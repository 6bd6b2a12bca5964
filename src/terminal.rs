//! Terminal output collaborators.
//!
//! A [`ProgressBar`](crate::ProgressBar) never talks to a stream directly.
//! It goes through the [`Terminal`] trait, which provides the three
//! primitives a single-line display needs: erase the current line, write a
//! status frame, and write a styled completion line.
//!
//! | Implementation | Output |
//! |----------------|--------|
//! | [`ConsoleTerminal`] | stdout or stderr via the `console` crate |
//! | [`CaptureTerminal`] | in-memory recording |

use console::{Term, style};
use std::io;
use std::sync::{Arc, Mutex};

use crate::lock;

/// Output primitives used to draw a progress line.
pub trait Terminal: Send {
    /// Clear the current line.
    ///
    /// Implementations may do nothing when the output is not a terminal.
    fn erase_line(&mut self) -> io::Result<()>;

    /// Write an in-progress status frame. No newline is appended.
    fn write_status(&mut self, line: &str) -> io::Result<()>;

    /// Write the final line, styled as a success and terminated by a newline.
    fn write_success(&mut self, line: &str) -> io::Result<()>;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn erase_line(&mut self) -> io::Result<()> {
        (**self).erase_line()
    }

    fn write_status(&mut self, line: &str) -> io::Result<()> {
        (**self).write_status(line)
    }

    fn write_success(&mut self, line: &str) -> io::Result<()> {
        (**self).write_success(line)
    }
}

/// A [`Terminal`] writing to stdout or stderr.
#[derive(Debug, Clone)]
pub struct ConsoleTerminal {
    term: Term,
    stderr: bool,
}

impl ConsoleTerminal {
    /// Draw on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
            stderr: false,
        }
    }

    /// Draw on standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            term: Term::stderr(),
            stderr: true,
        }
    }

    /// Whether the underlying stream is attended by a terminal.
    #[must_use]
    pub fn is_term(&self) -> bool {
        self.term.is_term()
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Terminal for ConsoleTerminal {
    fn erase_line(&mut self) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_line()
        } else {
            Ok(())
        }
    }

    fn write_status(&mut self, line: &str) -> io::Result<()> {
        self.term.write_str(line)?;
        self.term.flush()
    }

    fn write_success(&mut self, line: &str) -> io::Result<()> {
        let styled = if self.stderr {
            style(line).for_stderr().green()
        } else {
            style(line).green()
        };
        self.term.write_line(&styled.to_string())
    }
}

#[derive(Debug, Default)]
struct Recording {
    statuses: Vec<String>,
    successes: Vec<String>,
    erases: usize,
}

/// A [`Terminal`] that records everything written to it.
///
/// Clones share the same recording, so a clone can be handed to a
/// progress bar while the original is kept for inspection.
///
/// # Example
///
/// ```
/// use copybar::{CaptureTerminal, ProgressBuilder};
///
/// let capture = CaptureTerminal::new();
/// let bar = ProgressBuilder::new(10).terminal(capture.clone()).build();
/// bar.update();
/// assert_eq!(capture.statuses().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureTerminal {
    recording: Arc<Mutex<Recording>>,
}

impl CaptureTerminal {
    /// Create an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status frames written so far, oldest first.
    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        lock(&self.recording).statuses.clone()
    }

    /// Success lines written so far, oldest first.
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        lock(&self.recording).successes.clone()
    }

    /// Number of line erasures requested.
    #[must_use]
    pub fn erases(&self) -> usize {
        lock(&self.recording).erases
    }
}

impl Terminal for CaptureTerminal {
    fn erase_line(&mut self) -> io::Result<()> {
        lock(&self.recording).erases += 1;
        Ok(())
    }

    fn write_status(&mut self, line: &str) -> io::Result<()> {
        lock(&self.recording).statuses.push(line.to_owned());
        Ok(())
    }

    fn write_success(&mut self, line: &str) -> io::Result<()> {
        lock(&self.recording).successes.push(line.to_owned());
        Ok(())
    }
}
