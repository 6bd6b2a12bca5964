//! Progress capabilities and I/O wrappers.
//!
//! Code that moves bytes only needs a handle implementing [`Progress`]: it
//! can report how much has been transferred and accept the expected total.
//! Whether the handle draws a line on a terminal, drives an indicatif bar
//! or only counts silently is decided by whoever created it.
//!
//! At the end of a transfer the caller asks the handle for its
//! [`Finisher`] capability via [`Progress::as_finisher`]. Handles that draw
//! something finalize their display; the rest return `None` and leave the
//! summary to the caller. [`finish_progress`] wraps that query.
//!
//! [`ProgressReader`] and [`ProgressWriter`] are pass-through wrappers:
//! every successful `read`/`write` of `n` bytes adds `n` to the progress
//! handle. Data and errors are never altered.

use std::io::{self, Read, Write};
use std::sync::Arc;

/// Current amount of data transferred.
pub trait Progress {
    /// Bytes transferred so far.
    fn get(&self) -> u64;

    /// Expected total, or zero when unknown.
    fn get_total(&self) -> u64;

    /// Replace the expected total.
    fn set_total(&self, total: u64);

    /// Record `n` more bytes and return the resulting count.
    ///
    /// Implementations clamp the count to a non-zero total.
    fn add(&self, n: u64) -> u64;

    /// The finalize capability of this handle, if it has one.
    fn as_finisher(&self) -> Option<&dyn Finisher> {
        None
    }
}

/// A progress handle whose display must be closed out exactly once.
pub trait Finisher {
    /// Finalize the display. Calls after the first are no-ops.
    fn finish(&self);
}

/// A readable byte source that also reports its progress.
pub trait ProgressRead: Read + Progress {}

impl<T: Read + Progress + ?Sized> ProgressRead for T {}

/// Finalize `progress` if it can be finalized.
///
/// Returns `true` when a finalizer ran. When it returns `false` the caller
/// is responsible for printing its own summary.
///
/// # Example
///
/// ```
/// use copybar::{Counter, finish_progress};
///
/// let counter = Counter::new(10);
/// assert!(!finish_progress(&counter));
/// ```
pub fn finish_progress<P: Progress + ?Sized>(progress: &P) -> bool {
    match progress.as_finisher() {
        Some(finisher) => {
            finisher.finish();
            true
        }
        None => false,
    }
}

macro_rules! forward_progress {
    ($($ty:ty),*) => {$(
        impl<P: Progress + ?Sized> Progress for $ty {
            fn get(&self) -> u64 {
                (**self).get()
            }

            fn get_total(&self) -> u64 {
                (**self).get_total()
            }

            fn set_total(&self, total: u64) {
                (**self).set_total(total);
            }

            fn add(&self, n: u64) -> u64 {
                (**self).add(n)
            }

            fn as_finisher(&self) -> Option<&dyn Finisher> {
                (**self).as_finisher()
            }
        }
    )*};
}

forward_progress!(&P, Box<P>, Arc<P>);

/// A wrapper around [`Read`] that counts bytes read into a [`Progress`] handle.
///
/// # Example
///
/// ```
/// use copybar::{Counter, ProgressReader};
/// use std::io::Read;
///
/// let counter = Counter::new(5);
/// let mut reader = ProgressReader::new(&b"hello"[..], &counter);
/// let mut out = String::new();
/// reader.read_to_string(&mut out)?;
/// assert_eq!(counter.get(), 5);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ProgressReader<R, P> {
    inner: R,
    progress: P,
}

impl<R, P> ProgressReader<R, P> {
    /// Wrap `inner`, counting into `progress`.
    pub const fn new(inner: R, progress: P) -> Self {
        Self { inner, progress }
    }

    /// The wrapped reader.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// The wrapped reader, mutably. Bytes read through it are not counted.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// The progress handle.
    pub const fn progress(&self) -> &P {
        &self.progress
    }

    /// Unwrap into the reader and the progress handle.
    pub fn into_inner(self) -> (R, P) {
        (self.inner, self.progress)
    }
}

impl<R: Read, P: Progress> Read for ProgressReader<R, P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.progress.add(n as u64);
        }
        Ok(n)
    }
}

impl<R, P: Progress> Progress for ProgressReader<R, P> {
    fn get(&self) -> u64 {
        self.progress.get()
    }

    fn get_total(&self) -> u64 {
        self.progress.get_total()
    }

    fn set_total(&self, total: u64) {
        self.progress.set_total(total);
    }

    fn add(&self, n: u64) -> u64 {
        self.progress.add(n)
    }

    fn as_finisher(&self) -> Option<&dyn Finisher> {
        self.progress.as_finisher()
    }
}

/// A wrapper around [`Write`] that counts bytes written into a [`Progress`] handle.
#[derive(Debug)]
pub struct ProgressWriter<W, P> {
    inner: W,
    progress: P,
}

impl<W, P> ProgressWriter<W, P> {
    /// Wrap `inner`, counting into `progress`.
    pub const fn new(inner: W, progress: P) -> Self {
        Self { inner, progress }
    }

    /// The wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// The wrapped writer, mutably. Bytes written through it are not counted.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// The progress handle.
    pub const fn progress(&self) -> &P {
        &self.progress
    }

    /// Unwrap into the writer and the progress handle.
    pub fn into_inner(self) -> (W, P) {
        (self.inner, self.progress)
    }
}

impl<W: Write, P: Progress> Write for ProgressWriter<W, P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.progress.add(n as u64);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W, P: Progress> Progress for ProgressWriter<W, P> {
    fn get(&self) -> u64 {
        self.progress.get()
    }

    fn get_total(&self) -> u64 {
        self.progress.get_total()
    }

    fn set_total(&self, total: u64) {
        self.progress.set_total(total);
    }

    fn add(&self, n: u64) -> u64 {
        self.progress.add(n)
    }

    fn as_finisher(&self) -> Option<&dyn Finisher> {
        self.progress.as_finisher()
    }
}
