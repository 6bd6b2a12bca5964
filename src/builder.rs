//! Builder API for configuring progress displays.
//!
//! The builder pattern provides a fluent interface for creating a
//! [`ProgressBar`]. This is often more convenient than constructing
//! [`ProgressOptions`] and a terminal by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use copybar::ProgressBuilder;
//!
//! let bar = ProgressBuilder::new(4096).build();
//! bar.start()?;
//! bar.add(4096);
//! bar.finish();
//! # Ok::<(), copybar::Error>(())
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use copybar::{ConsoleTerminal, ProgressBuilder};
//! use std::time::Duration;
//!
//! let bar = ProgressBuilder::new(0)
//!     .refresh_period(Duration::from_millis(500))
//!     .caption_width(30)
//!     .caption("s3://bucket/key\0/tmp/key\0GET")
//!     .terminal(ConsoleTerminal::stderr())
//!     .build();
//! ```

use std::fmt;
use std::time::Duration;

use crate::bar::ProgressBar;
use crate::options::ProgressOptions;
use crate::terminal::{ConsoleTerminal, Terminal};

/// A builder for configuring a [`ProgressBar`].
///
/// # Example
///
/// ```
/// use copybar::{CaptureTerminal, ProgressBuilder};
///
/// let bar = ProgressBuilder::new(100)
///     .caption_width(8)
///     .caption("a.txt\0b.txt\0COPY")
///     .terminal(CaptureTerminal::new())
///     .build();
///
/// assert_eq!(bar.captions().src, "a.txt   ");
/// ```
pub struct ProgressBuilder {
    total: u64,
    options: ProgressOptions,
    caption: Option<String>,
    terminal: Option<Box<dyn Terminal>>,
}

impl ProgressBuilder {
    /// Create a new `ProgressBuilder` expecting `total` bytes.
    ///
    /// Uses default options (125 ms refresh, 18-column captions, stdout).
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            options: ProgressOptions::default(),
            caption: None,
            terminal: None,
        }
    }

    /// Set the refresh period of the background loop.
    ///
    /// Clamped to at least one millisecond.
    #[must_use]
    pub fn refresh_period(mut self, period: Duration) -> Self {
        self.options = self.options.with_refresh_period(period);
        self
    }

    /// Set the width of the source and destination captions.
    #[must_use]
    pub fn caption_width(mut self, width: usize) -> Self {
        self.options = self.options.with_caption_width(width);
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: ProgressOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the initial combined `src\0dst\0action` caption.
    ///
    /// Fitted with the caption width in effect when [`build`](Self::build)
    /// runs, regardless of call order.
    #[must_use]
    pub fn caption(mut self, combined: impl Into<String>) -> Self {
        self.caption = Some(combined.into());
        self
    }

    /// Draw on `terminal` instead of stdout.
    #[must_use]
    pub fn terminal(mut self, terminal: impl Terminal + 'static) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    /// Get a reference to the current options.
    pub fn get_options(&self) -> &ProgressOptions {
        &self.options
    }

    /// Create the bar. It does not draw until [`ProgressBar::start`].
    #[must_use]
    pub fn build(self) -> ProgressBar {
        let bar = match self.terminal {
            Some(terminal) => ProgressBar::with_options(self.total, self.options, terminal),
            None => ProgressBar::with_options(self.total, self.options, ConsoleTerminal::stdout()),
        };
        if let Some(caption) = self.caption {
            bar.set_caption(&caption);
        }
        bar
    }
}

impl fmt::Debug for ProgressBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBuilder")
            .field("total", &self.total)
            .field("options", &self.options)
            .field("caption", &self.caption)
            .field("custom_terminal", &self.terminal.is_some())
            .finish()
    }
}
