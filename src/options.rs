//! Configuration options for progress displays.
//!
//! # Example
//!
//! ```
//! use copybar::ProgressOptions;
//! use std::time::Duration;
//!
//! let options = ProgressOptions::default()
//!     .with_refresh_period(Duration::from_millis(250))
//!     .with_caption_width(24);
//! ```

use std::time::Duration;

/// Default spacing between two timer-driven renders.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_millis(125);

/// Default display width of the source and destination captions.
pub const DEFAULT_CAPTION_WIDTH: usize = 18;

/// Smallest refresh period accepted. Shorter values are clamped up.
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

/// Smallest caption width accepted.
///
/// Below four columns there is no room for the `...` ellipsis plus one
/// character, and trimming can no longer produce an exact width.
pub const MIN_CAPTION_WIDTH: usize = 4;

/// Options for a [`ProgressBar`](crate::ProgressBar).
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `refresh_period` | 125 ms | Minimum spacing between renders |
/// | `caption_width` | 18 | Width of source/destination captions |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressOptions {
    /// Period of the background refresh loop (default: 125 ms)
    ///
    /// This is a minimum spacing, not a deadline. Under load the loop
    /// may render less often.
    pub refresh_period: Duration,

    /// Display width of the source and destination captions (default: 18)
    pub caption_width: usize,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            refresh_period: DEFAULT_REFRESH_PERIOD,
            caption_width: DEFAULT_CAPTION_WIDTH,
        }
    }
}

impl ProgressOptions {
    /// Set the refresh period
    ///
    /// Value is clamped to at least [`MIN_REFRESH_PERIOD`] so the loop
    /// never spins.
    #[must_use]
    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period.max(MIN_REFRESH_PERIOD);
        self
    }

    /// Set the caption width
    ///
    /// Value is clamped to at least [`MIN_CAPTION_WIDTH`].
    #[must_use]
    pub fn with_caption_width(mut self, width: usize) -> Self {
        self.caption_width = width.max(MIN_CAPTION_WIDTH);
        self
    }
}
