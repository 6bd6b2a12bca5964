//! # copybar
//!
//! Single-line, self-refreshing progress display for terminal copy tools.
//!
//! ## Core Features
//!
//! - **Lock-free counting**: bytes are counted with atomics, so the I/O path never waits on a render
//! - **Self-refreshing**: a background thread redraws the line every 125 ms until finished
//! - **Exactly-once finish**: the completion line is printed once, however many callers finish the bar
//! - **Overshoot clamping**: the count never stays above a known total
//! - **Pass-through I/O**: [`ProgressReader`] and [`ProgressWriter`] count bytes without touching data or errors
//! - **Capability queries**: callers hold a generic [`Progress`] handle and finalize it via [`finish_progress`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use copybar::{ProgressBar, ProgressReader, finish_progress};
//! use std::fs::File;
//! use std::io;
//!
//! let src = File::open("disk.img")?;
//! let bar = ProgressBar::new(src.metadata()?.len());
//! bar.set_caption("disk.img\0/mnt/backup/disk.img\0COPY");
//! bar.start()?;
//!
//! let mut reader = ProgressReader::new(src, bar);
//! io::copy(&mut reader, &mut File::create("/mnt/backup/disk.img")?)?;
//!
//! if !finish_progress(&reader) {
//!     println!("copied");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The line looks like this while running, and is replaced by the done
//! line when finished:
//!
//! ```text
//! [ COPY ] [ disk.img           > ...backup/disk.img ] [1048576] [4194304]
//! [ done ] [ 2.318204s ]
//! ```
//!
//! ## Silent Accounting
//!
//! A bare [`Counter`] implements [`Progress`] without a finalizer. Hand it
//! out when nothing should be drawn; [`finish_progress`] then returns
//! `false` and the caller prints its own summary.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `indicatif` | Use an indicatif bar as a [`Progress`] handle |
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`ProgressOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

use std::sync::{Mutex, MutexGuard, PoisonError};

mod bar;
mod builder;
mod caption;
mod counter;
mod error;
mod io;
mod options;
mod terminal;

#[cfg(feature = "indicatif")]
mod indicatif_bar;

pub use bar::ProgressBar;
pub use builder::ProgressBuilder;
pub use caption::{CAPTION_SEPARATOR, Captions, UNKNOWN_CAPTION, fit_caption};
pub use counter::Counter;
pub use error::{Error, Result};
pub use io::{Finisher, Progress, ProgressRead, ProgressReader, ProgressWriter, finish_progress};
pub use options::{
    DEFAULT_CAPTION_WIDTH, DEFAULT_REFRESH_PERIOD, MIN_CAPTION_WIDTH, MIN_REFRESH_PERIOD,
    ProgressOptions,
};
pub use terminal::{CaptureTerminal, ConsoleTerminal, Terminal};

#[cfg(feature = "indicatif")]
#[cfg_attr(docsrs, doc(cfg(feature = "indicatif")))]
pub use indicatif_bar::create_progress_bar;

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section in this crate leaves its data consistent, so a
/// poisoned lock carries no broken invariant.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
