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
//! Coverage predicates between segments and clip ranges
//!
//! Ranges are half-open. The segment's rate is canonical: the other operand
//! is rescaled to it before any comparison.

use crate::error::Result;
use crate::time::{RationalTime, TimeRange};
use std::cmp::Ordering;

/// `clip` lies entirely inside `segment`
pub fn covers(segment: &TimeRange, clip: &TimeRange) -> Result<bool> {
    let rate = segment.rate();
    let clip = clip.rescale_to(rate)?;
    Ok(clip.start().frames() >= segment.start().frames()
        && clip.end().frames() <= segment.end().frames())
}

/// `clip` intersects `segment`
pub fn partially_covers(segment: &TimeRange, clip: &TimeRange) -> Result<bool> {
    overlaps(clip, segment.start(), segment.end())
}

/// `range` intersects `[start, end)`
pub fn overlaps(range: &TimeRange, start: RationalTime, end: RationalTime) -> Result<bool> {
    let rate = start.rate();
    let disjoint = range.end().cmp_at(&start, rate)? != Ordering::Greater
        || range.start().cmp_at(&end, rate)? != Ordering::Less;
    Ok(!disjoint)
}

/// `clip` is contained in or intersects `segment`
///
/// A zero-length clip sitting inside a segment does not intersect it under
/// half-open rules, but it is still served by that segment.
pub fn provides_coverage(segment: &TimeRange, clip: &TimeRange) -> Result<bool> {
    Ok(partially_covers(segment, clip)? || covers(segment, clip)?)
}
