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
//! Error types for time-range consolidation

use crate::time::FrameRate;
use thiserror::Error;

/// Consolidation and arithmetic errors
#[derive(Debug, Error)]
pub enum TrimError {
    /// Arithmetic attempted across two rates without an explicit rescale
    #[error("Rate mismatch in {context}: {left} fps vs {right} fps")]
    RateMismatch {
        /// Rate of the left operand
        left: FrameRate,
        /// Rate of the right operand
        right: FrameRate,
        /// Where the mismatch was detected
        context: String,
    },

    /// A range whose end precedes its start
    #[error("Invalid range for {context}: end {end} is before start {start}")]
    InvalidRange {
        /// Clip, segment or source that owns the range
        context: String,
        /// Offending start, formatted as `frames@rate`
        start: String,
        /// Offending end, formatted as `frames@rate`
        end: String,
    },

    /// A timeline clip without a resolvable source clip
    #[error("Clip '{clip}' has no resolvable source media")]
    MissingSourceReference {
        /// Name of the clip
        clip: String,
    },

    /// Rate that is zero, negative or not finite
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    /// Frame arithmetic left the representable range
    #[error("Frame arithmetic overflow: {0}")]
    Overflow(String),

    /// Arena handle that does not belong to this project
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),

    /// Manifest or plan record could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrimError {
    /// Build a rate mismatch error
    pub fn rate_mismatch(left: FrameRate, right: FrameRate, context: impl Into<String>) -> Self {
        TrimError::RateMismatch {
            left,
            right,
            context: context.into(),
        }
    }

    /// Build an invalid range error
    pub fn invalid_range(
        context: impl Into<String>,
        start: impl std::fmt::Display,
        end: impl std::fmt::Display,
    ) -> Self {
        TrimError::InvalidRange {
            context: context.into(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Result type for consolidation operations
pub type Result<T> = std::result::Result<T, TrimError>;
