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
//! Handle (padding) policy for transfer ranges

use crate::error::Result;
use crate::time::RationalTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Normalized start/end padding, in frames of the range being padded
///
/// Deserialized values go through [`normalize_handles`], so `end` may be
/// omitted and negative counts are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawHandles")]
pub struct Handles {
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct RawHandles {
    #[serde(default)]
    start: i64,
    #[serde(default)]
    end: Option<i64>,
}

impl From<RawHandles> for Handles {
    fn from(raw: RawHandles) -> Self {
        normalize_handles(raw.start, raw.end)
    }
}

impl Handles {
    /// Same padding on both sides
    pub fn symmetric(frames: i64) -> Self {
        normalize_handles(frames, None)
    }

    /// Frames added before a range
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Frames added after a range
    pub fn end(&self) -> i64 {
        self.end
    }
}

/// Clamp handle counts to be non-negative; a missing end takes the start value
pub fn normalize_handles(start_handles: i64, end_handles: Option<i64>) -> Handles {
    let start = clamp_handle(start_handles, "start");
    let end = match end_handles {
        Some(value) => clamp_handle(value, "end"),
        None => start,
    };
    Handles { start, end }
}

fn clamp_handle(value: i64, side: &str) -> i64 {
    if value < 0 {
        warn!(value, side, "Negative handle count clamped to zero");
        0
    } else {
        value
    }
}

/// Pad `[start, end)` by `handles`, expressed at the range's own rate
///
/// The start is clamped at zero. The end is not bounded by the source file's
/// real duration.
pub fn apply_handles_to_range(
    start: RationalTime,
    end: RationalTime,
    handles: Handles,
) -> Result<(RationalTime, RationalTime)> {
    let start_pad = RationalTime::new(handles.start, start.rate());
    let end_pad = RationalTime::new(handles.end, end.rate());

    let new_start = start.subtract(start_pad)?.ensure_non_negative();
    let new_end = end.add(end_pad)?;
    Ok((new_start, new_end))
}
