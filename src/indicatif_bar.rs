//! indicatif display mode (requires `indicatif` feature)
//!
//! An [`indicatif::ProgressBar`] can stand in anywhere a [`Progress`]
//! handle is expected, including [`ProgressReader`](crate::ProgressReader).
//! Its finalizer is indicatif's own `finish`.

use indicatif::{ProgressBar, ProgressStyle};

use crate::io::{Finisher, Progress};

/// Create a default byte-transfer bar
#[must_use]
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

impl Progress for ProgressBar {
    fn get(&self) -> u64 {
        self.position()
    }

    fn get_total(&self) -> u64 {
        self.length().unwrap_or(0)
    }

    fn set_total(&self, total: u64) {
        self.set_length(total);
    }

    fn add(&self, n: u64) -> u64 {
        self.inc(n);
        let current = self.position();
        match self.length() {
            Some(total) if total > 0 && current > total => {
                self.set_position(total);
                total
            }
            _ => current,
        }
    }

    fn as_finisher(&self) -> Option<&dyn Finisher> {
        Some(self)
    }
}

impl Finisher for ProgressBar {
    fn finish(&self) {
        if !self.is_finished() {
            ProgressBar::finish(self);
        }
    }
}
