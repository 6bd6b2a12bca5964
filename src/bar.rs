//! Self-refreshing single-line progress display.
//!
//! A [`ProgressBar`] session goes through four states:
//!
//! ```text
//! Created --start()--> Running --finish()--> Finished
//! ```
//!
//! While running, a dedicated thread redraws the line every refresh period.
//! Counts are updated lock-free through the embedded [`Counter`]; captions
//! and terminal writes share one mutex so a render never sees a caption
//! half-replaced.
//!
//! # Line format
//!
//! ```text
//! \r[ <action> ] [ <src> > <dst> ] [<current>] [<total>]
//! \r[ done ] [ <elapsed> ]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use copybar::{ProgressBar, ProgressReader};
//! use std::fs::File;
//! use std::io;
//!
//! let src = File::open("input.bin")?;
//! let bar = ProgressBar::new(src.metadata()?.len());
//! bar.set_caption_parts("input.bin", "output.bin", "COPY");
//! bar.start()?;
//!
//! let mut reader = ProgressReader::new(src, bar.clone());
//! io::copy(&mut reader, &mut File::create("output.bin")?)?;
//!
//! bar.finish();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, Once, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::caption::Captions;
use crate::counter::Counter;
use crate::error::{Error, Result};
use crate::io::{Finisher, Progress};
use crate::lock;
use crate::options::ProgressOptions;
use crate::terminal::{ConsoleTerminal, Terminal};

const REFRESH_THREAD_NAME: &str = "copybar-refresh";

/// A cloneable handle to a single-line progress display.
///
/// Clones share the same session. The handle can be passed to a
/// [`ProgressReader`](crate::ProgressReader) on one thread while another
/// thread changes captions or finishes it.
#[derive(Clone)]
pub struct ProgressBar {
    shared: Arc<Shared>,
}

struct Shared {
    counter: Counter,
    start: Instant,
    options: ProgressOptions,
    render: Mutex<RenderState>,
    refresher: Mutex<Refresher>,
    finish: Once,
}

/// State guarded by the render lock.
struct RenderState {
    captions: Captions,
    terminal: Box<dyn Terminal>,
    /// Set once the done line has been written. No frame may follow it.
    finished: bool,
}

#[derive(Default)]
struct Refresher {
    state: LoopState,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl ProgressBar {
    /// Create a bar expecting `total` bytes, drawing on stdout with default options.
    ///
    /// A `total` of zero means the size is unknown.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self::with_options(total, ProgressOptions::default(), ConsoleTerminal::stdout())
    }

    /// Create a bar with explicit options and terminal.
    #[must_use]
    pub fn with_options(
        total: u64,
        options: ProgressOptions,
        terminal: impl Terminal + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                counter: Counter::new(total),
                start: Instant::now(),
                options,
                render: Mutex::new(RenderState {
                    captions: Captions::default(),
                    terminal: Box::new(terminal),
                    finished: false,
                }),
                refresher: Mutex::new(Refresher::default()),
                finish: Once::new(),
            }),
        }
    }

    /// Start drawing.
    ///
    /// The line is drawn once before this returns, then redrawn every
    /// refresh period by a background thread until [`finish`](Self::finish).
    /// Starting a running or finished bar does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the refresh thread cannot be created.
    pub fn start(&self) -> Result<()> {
        let mut refresher = lock(&self.shared.refresher);
        if refresher.state != LoopState::Idle {
            return Ok(());
        }

        self.shared.update();

        let (stop_tx, stop_rx) = mpsc::channel();
        let weak = Arc::downgrade(&self.shared);
        let period = self.shared.options.refresh_period;
        let handle = thread::Builder::new()
            .name(REFRESH_THREAD_NAME.to_owned())
            .spawn(move || refresh_loop(&weak, &stop_rx, period))
            .map_err(|source| Error::Spawn { source })?;

        refresher.state = LoopState::Running;
        refresher.stop = Some(stop_tx);
        refresher.handle = Some(handle);

        #[cfg(feature = "tracing")]
        tracing::debug!(?period, total = self.get_total(), "progress started");

        Ok(())
    }

    /// Redraw the line now.
    ///
    /// Does nothing once the bar is finished.
    pub fn update(&self) {
        self.shared.update();
    }

    /// Finish the session.
    ///
    /// The first call erases the line, prints `[ done ] [ <elapsed> ]` and
    /// stops the refresh thread. Every later call, from any thread, is a
    /// no-op. Concurrent callers return only after the first call completed.
    pub fn finish(&self) {
        self.shared.finish.call_once(|| self.shared.finalize());
    }

    /// Whether [`finish`](Self::finish) has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.shared.finish.is_completed()
    }

    /// Time since the bar was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.shared.start.elapsed()
    }

    /// Options the bar was created with.
    #[must_use]
    pub fn options(&self) -> ProgressOptions {
        self.shared.options
    }

    /// Replace all three captions from a combined `src\0dst\0action` string.
    ///
    /// Source and destination are fitted to the caption width. A string that
    /// does not split into exactly three parts resets every caption to `?`.
    pub fn set_caption(&self, combined: &str) {
        let captions = Captions::parse(combined, self.shared.options.caption_width);
        lock(&self.shared.render).captions = captions;
    }

    /// Replace all three captions.
    pub fn set_caption_parts(&self, src: &str, dst: &str, action: &str) {
        self.set_caption(&Captions::join(src, dst, action));
    }

    /// Snapshot of the current captions.
    #[must_use]
    pub fn captions(&self) -> Captions {
        lock(&self.shared.render).captions.clone()
    }

    /// Bytes observed so far.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.shared.counter.get()
    }

    /// Expected total, or zero when unknown.
    #[must_use]
    pub fn get_total(&self) -> u64 {
        self.shared.counter.get_total()
    }

    /// Replace the expected total.
    pub fn set_total(&self, total: u64) {
        self.shared.counter.set_total(total);
    }

    /// Replace the current count.
    pub fn set_current(&self, current: u64) {
        self.shared.counter.set_current(current);
    }

    /// Add `n` bytes, clamping to a non-zero total, and return the new count.
    pub fn add(&self, n: u64) -> u64 {
        self.shared.counter.add(n)
    }
}

impl Shared {
    fn update(&self) {
        let mut render = lock(&self.render);
        if render.finished {
            return;
        }
        let line = format!(
            "\r[ {} ] [ {} > {} ] [{}] [{}]",
            render.captions.action,
            render.captions.src,
            render.captions.dst,
            self.counter.get(),
            self.counter.get_total(),
        );
        let result = render
            .terminal
            .erase_line()
            .and_then(|()| render.terminal.write_status(&line));
        log_dropped_write(result);
    }

    /// Runs exactly once, from [`ProgressBar::finish`].
    fn finalize(&self) {
        let elapsed = self.start.elapsed();
        {
            let mut render = lock(&self.render);
            let line = format!("\r[ done ] [ {elapsed:?} ]");
            let result = render
                .terminal
                .erase_line()
                .and_then(|()| render.terminal.write_success(&line));
            log_dropped_write(result);
            render.finished = true;
        }

        let handle = {
            let mut refresher = lock(&self.refresher);
            refresher.state = LoopState::Stopped;
            if let Some(stop) = refresher.stop.take() {
                // The loop may already be gone; a closed channel is fine.
                let _ = stop.send(());
            }
            refresher.handle.take()
        };

        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!("progress refresh thread panicked");
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(?elapsed, current = self.counter.get(), "progress finished");
    }
}

fn refresh_loop(shared: &Weak<Shared>, stop: &Receiver<()>, period: Duration) {
    loop {
        match stop.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.update();
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("progress refresh loop exited");
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_dropped_write(result: io::Result<()>) {
    if let Err(error) = result {
        #[cfg(feature = "tracing")]
        tracing::debug!(%error, "progress line write dropped");
    }
}

impl std::fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBar")
            .field("current", &self.get())
            .field("total", &self.get_total())
            .field("options", &self.shared.options)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Progress for ProgressBar {
    fn get(&self) -> u64 {
        ProgressBar::get(self)
    }

    fn get_total(&self) -> u64 {
        ProgressBar::get_total(self)
    }

    fn set_total(&self, total: u64) {
        ProgressBar::set_total(self, total);
    }

    fn add(&self, n: u64) -> u64 {
        ProgressBar::add(self, n)
    }

    fn as_finisher(&self) -> Option<&dyn Finisher> {
        Some(self)
    }
}

impl Finisher for ProgressBar {
    fn finish(&self) {
        ProgressBar::finish(self);
    }
}

/// Counting sink: bytes are added to the count and discarded.
impl Write for ProgressBar {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.add(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
