// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Shared output formatting utilities for CLI commands.
//!
//! Human-readable messages go through these helpers. Machine-readable
//! output (plan records, manifests, `--json`) is printed verbatim by the
//! commands and never decorated.
//!
//! # Examples
//!
//! ```rust
//! use mediatrim_cli::output;
//!
//! output::success("Plan written to plan.json");
//! output::detail("Segments", "12");
//! ```

use console::style;
use mediatrim_core::RationalTime;

/// Print a success message with a green check mark.
pub fn success(msg: &str) {
    println!("{} {}", style("✅").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("❌").red().bold(), msg);
}

/// Print an informational message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ️").cyan(), msg);
}

/// Print a warning message to stderr.
///
/// Warnings go to stderr so they never corrupt JSON written to stdout.
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠️").yellow(), msg);
}

/// Print a detail line with key-value formatting.
///
/// The key is displayed in regular text, and the value is highlighted in cyan.
///
/// ```rust
/// mediatrim_cli::output::detail("Segments", "3");
/// // Output:
/// //   Segments: 3
/// ```
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Print a header message with the film emoji.
pub fn header(msg: &str) {
    println!("{} {}", style("🎬").green().bold(), msg);
}

/// Print a bold section title
pub fn section(title: &str) {
    println!("{}", style(title).bold());
}

/// Render a duration as seconds plus the exact frame count.
///
/// ```rust
/// use mediatrim_core::{FrameRate, RationalTime};
///
/// let rate = FrameRate::integer(24).unwrap();
/// let text = mediatrim_cli::output::format_duration(&RationalTime::new(36, rate));
/// assert_eq!(text, "1.500s (36 frames @ 24 fps)");
/// ```
pub fn format_duration(duration: &RationalTime) -> String {
    format!(
        "{:.3}s ({} frames @ {} fps)",
        duration.to_seconds(),
        duration.frames(),
        duration.rate()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mediatrim_core::FrameRate;

    #[test]
    fn test_format_duration_ntsc() {
        let rate = FrameRate::from_fps(29.97).unwrap();
        let text = format_duration(&RationalTime::new(30, rate));
        assert_eq!(text, "1.001s (30 frames @ 29.970 fps)");
    }

    #[test]
    fn test_format_zero_duration() {
        let rate = FrameRate::integer(25).unwrap();
        assert_eq!(
            format_duration(&RationalTime::zero(rate)),
            "0.000s (0 frames @ 25 fps)"
        );
    }
}
