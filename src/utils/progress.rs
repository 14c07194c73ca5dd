//! Per-item progress markers for batch rendering.
//!
//! Every processed email emits one character:
//!
//! - `.` rendered and written
//! - `F` substituted by the default locale
//! - `E` failed
//!
//! On an interactive terminal the markers are shown on an `indicatif` bar;
//! otherwise they are printed as plain characters on stdout.
//!
//! # Environment Variables
//!
//! - `EMAIL_PARSER_NO_PROGRESS`: set to any value to use plain markers

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::io::{IsTerminal, Write};
use std::sync::Mutex;

/// Markers kept visible in the bar message.
const VISIBLE_MARKERS: usize = 60;

fn is_progress_disabled() -> bool {
    std::env::var("EMAIL_PARSER_NO_PROGRESS").is_ok()
}

fn default_style() -> Option<IndicatifStyle> {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .ok()
        .map(|style| style.progress_chars("━╸━"))
}

/// Outcome marker of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Written,
    Substituted,
    Failed,
}

impl Marker {
    pub const fn as_char(self) -> char {
        match self {
            Self::Written => '.',
            Self::Substituted => 'F',
            Self::Failed => 'E',
        }
    }
}

enum Display {
    Bar(IndicatifBar),
    Plain,
    Hidden,
}

/// Marker display for one batch.
pub struct MarkerProgress {
    display: Display,
    markers: Mutex<String>,
}

impl MarkerProgress {
    /// Progress for `len` items; a bar only when `interactive` is allowed and
    /// stdout is a terminal.
    pub fn new(len: u64, interactive: bool) -> Self {
        let display = if interactive && !is_progress_disabled() && std::io::stdout().is_terminal() {
            let bar = IndicatifBar::new(len);
            if let Some(style) = default_style() {
                bar.set_style(style);
            }
            bar.set_prefix("Rendering");
            Display::Bar(bar)
        } else {
            Display::Plain
        };
        Self {
            display,
            markers: Mutex::new(String::new()),
        }
    }

    /// Progress that records markers without printing anything.
    pub fn hidden() -> Self {
        Self {
            display: Display::Hidden,
            markers: Mutex::new(String::new()),
        }
    }

    /// Set the expected item count once it is known.
    pub fn set_length(&self, len: u64) {
        if let Display::Bar(bar) = &self.display {
            bar.set_length(len);
        }
    }

    /// Record one item outcome.
    pub fn mark(&self, marker: Marker) {
        let mut markers = self.markers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        markers.push(marker.as_char());

        match &self.display {
            Display::Bar(bar) => {
                let start = markers.len().saturating_sub(VISIBLE_MARKERS);
                bar.set_message(markers[start..].to_string());
                bar.inc(1);
            }
            Display::Plain => {
                let mut stdout = std::io::stdout().lock();
                let _ = write!(stdout, "{}", marker.as_char());
                let _ = stdout.flush();
            }
            Display::Hidden => {}
        }
    }

    /// Every marker recorded so far, in order.
    pub fn markers(&self) -> String {
        self.markers.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Finish the line so later output starts on a fresh one.
    pub fn finish(&self) {
        match &self.display {
            Display::Bar(bar) => bar.finish(),
            Display::Plain => println!(),
            Display::Hidden => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_chars() {
        assert_eq!(Marker::Written.as_char(), '.');
        assert_eq!(Marker::Substituted.as_char(), 'F');
        assert_eq!(Marker::Failed.as_char(), 'E');
    }

    #[test]
    fn test_hidden_progress_records_markers() {
        let progress = MarkerProgress::hidden();
        progress.mark(Marker::Written);
        progress.mark(Marker::Substituted);
        progress.mark(Marker::Failed);
        progress.finish();
        assert_eq!(progress.markers(), ".FE");
    }
}
