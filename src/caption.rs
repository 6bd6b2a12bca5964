//! Caption formatting.
//!
//! A progress line carries three captions: the source, the destination and
//! the action being performed. Callers hand them over as a single string
//! joined by NUL bytes (`src\0dst\0action`), which [`Captions::parse`]
//! splits and fits to the display width.
//!
//! Widths are counted in `char`s, so multi-byte paths are never cut in the
//! middle of a code point.

use std::iter;

/// Separator between the parts of a combined caption.
pub const CAPTION_SEPARATOR: char = '\0';

/// Placeholder shown for a caption that is unset or malformed.
pub const UNKNOWN_CAPTION: &str = "?";

const ELLIPSIS: &str = "...";

/// Fit `caption` to exactly `width` characters.
///
/// - Shorter captions are right-padded with spaces.
/// - Longer captions keep their tail, prefixed with `...`, so the end of a
///   path (usually the file name) stays visible.
/// - When `width` is three or less there is no room for the ellipsis and
///   the caption is returned unchanged. This is the only case where the
///   result is not exactly `width` characters long.
///
/// # Example
///
/// ```
/// use copybar::fit_caption;
///
/// assert_eq!(fit_caption("abc", 5), "abc  ");
/// assert_eq!(fit_caption("/very/long/path.txt", 10), "...ath.txt");
/// ```
#[must_use]
pub fn fit_caption(caption: &str, width: usize) -> String {
    let len = caption.chars().count();

    if len < width {
        let mut fitted = String::with_capacity(caption.len() + width - len);
        fitted.push_str(caption);
        fitted.extend(iter::repeat_n(' ', width - len));
        return fitted;
    }

    if len > width {
        let trim = len - width + ELLIPSIS.len();
        if trim < len {
            let mut fitted = String::with_capacity(caption.len());
            fitted.push_str(ELLIPSIS);
            fitted.extend(caption.chars().skip(trim));
            return fitted;
        }
    }

    caption.to_owned()
}

/// The three captions of a progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captions {
    /// Source, fitted to the caption width
    pub src: String,
    /// Destination, fitted to the caption width
    pub dst: String,
    /// Action being performed, stored as given
    pub action: String,
}

impl Default for Captions {
    fn default() -> Self {
        Self {
            src: UNKNOWN_CAPTION.to_owned(),
            dst: UNKNOWN_CAPTION.to_owned(),
            action: UNKNOWN_CAPTION.to_owned(),
        }
    }
}

impl Captions {
    /// Decode a combined `src\0dst\0action` caption.
    ///
    /// Anything other than exactly three parts resets every caption to
    /// [`UNKNOWN_CAPTION`]. Empty parts are shown as [`UNKNOWN_CAPTION`] too.
    #[must_use]
    pub fn parse(combined: &str, width: usize) -> Self {
        let parts: Vec<&str> = combined.split(CAPTION_SEPARATOR).collect();
        let [src, dst, action] = parts.as_slice() else {
            #[cfg(feature = "tracing")]
            tracing::warn!(parts = parts.len(), "malformed progress caption");
            return Self::default();
        };

        Self {
            src: fit_part(src, width),
            dst: fit_part(dst, width),
            action: if action.is_empty() {
                UNKNOWN_CAPTION.to_owned()
            } else {
                (*action).to_owned()
            },
        }
    }

    /// Join three captions into the combined form accepted by [`Captions::parse`].
    #[must_use]
    pub fn join(src: &str, dst: &str, action: &str) -> String {
        let mut combined = String::with_capacity(src.len() + dst.len() + action.len() + 2);
        combined.push_str(src);
        combined.push(CAPTION_SEPARATOR);
        combined.push_str(dst);
        combined.push(CAPTION_SEPARATOR);
        combined.push_str(action);
        combined
    }
}

fn fit_part(part: &str, width: usize) -> String {
    if part.is_empty() {
        UNKNOWN_CAPTION.to_owned()
    } else {
        fit_caption(part, width)
    }
}
