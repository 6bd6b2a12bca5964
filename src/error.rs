//! Error types for copybar.
//!
//! Progress display is defensive by construction: malformed captions,
//! overshooting counters and repeated finalization are absorbed silently.
//! The only operation that can fail is starting the background refresh
//! thread, reported as [`Error::Spawn`].

use thiserror::Error;

/// Result type for copybar operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a progress display.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The operating system refused to spawn the refresh thread
    #[error("Failed to spawn progress refresh thread: {source}")]
    Spawn {
        /// Underlying error
        source: std::io::Error,
    },
}
