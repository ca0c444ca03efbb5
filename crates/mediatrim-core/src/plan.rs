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
//! Transfer segments and plans

use crate::coverage;
use crate::error::Result;
use crate::handles::Handles;
use crate::model::{file_name_of, ClipId, Metadata, TimelineId};
use crate::stats::{calculate_statistics, PlanStatistics};
use crate::time::{FrameRate, RationalTime, TimeRange};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A timeline clip served by a segment
///
/// Plans rebuilt from records only know clip names, so the handle is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveredClip {
    /// Live handle, when the plan was built from a project
    pub clip: Option<ClipId>,
    /// Clip name
    pub name: String,
}

impl CoveredClip {
    /// Reference to a live clip
    pub fn live(clip: ClipId, name: impl Into<String>) -> Self {
        CoveredClip {
            clip: Some(clip),
            name: name.into(),
        }
    }

    /// Name-only reference
    pub fn named(name: impl Into<String>) -> Self {
        CoveredClip {
            clip: None,
            name: name.into(),
        }
    }
}

/// One contiguous range of a source file slated for transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSegment {
    name: String,
    source_path: PathBuf,
    range: TimeRange,
    coverage: Vec<CoveredClip>,
    metadata: Metadata,
}

impl TransferSegment {
    /// Create a segment, rejecting `end < start`
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        start: RationalTime,
        end: RationalTime,
    ) -> Result<Self> {
        let name = name.into();
        let source_path = source_path.into();
        let context = format!("segment '{}' of {}", name, source_path.display());
        let range = TimeRange::new(start, end, &context)?;

        Ok(TransferSegment {
            name,
            source_path,
            range,
            coverage: Vec::new(),
            metadata: Metadata::new(),
        })
    }

    /// Record the clips this segment serves
    pub fn with_coverage(mut self, coverage: Vec<CoveredClip>) -> Self {
        self.coverage = coverage;
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Segment name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the source media
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name of the source media
    pub fn source_file_name(&self) -> String {
        file_name_of(&self.source_path)
    }

    /// Inclusive start in the source
    pub fn source_start(&self) -> RationalTime {
        self.range.start()
    }

    /// Exclusive end in the source
    pub fn source_end(&self) -> RationalTime {
        self.range.end()
    }

    /// `[source_start, source_end)`
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Rate of the segment bounds
    pub fn rate(&self) -> FrameRate {
        self.range.rate()
    }

    /// Derived length of the segment
    pub fn duration(&self) -> RationalTime {
        self.range.duration()
    }

    /// Clips served by this segment
    pub fn coverage(&self) -> &[CoveredClip] {
        &self.coverage
    }

    /// Names of the clips served by this segment
    pub fn covered_clip_names(&self) -> Vec<String> {
        self.coverage.iter().map(|c| c.name.clone()).collect()
    }

    /// Metadata map
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `range` lies entirely inside this segment
    pub fn covers(&self, range: &TimeRange) -> Result<bool> {
        coverage::covers(&self.range, range)
    }

    /// `range` intersects this segment
    pub fn partially_covers(&self, range: &TimeRange) -> Result<bool> {
        coverage::partially_covers(&self.range, range)
    }
}

/// Consolidated set of segments for every source used by a set of timelines
///
/// A plan is a single-writer value: appending segments or timelines needs
/// `&mut self`, which also drops any cached statistics.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    name: String,
    min_gap_duration: f64,
    handles: Handles,
    segments: Vec<TransferSegment>,
    timelines: Vec<TimelineId>,
    statistics: OnceLock<PlanStatistics>,
}

impl TransferPlan {
    /// Empty plan with its merge parameters
    pub fn new(name: impl Into<String>, min_gap_duration: f64, handles: Handles) -> Self {
        TransferPlan {
            name: name.into(),
            min_gap_duration,
            handles,
            segments: Vec::new(),
            timelines: Vec::new(),
            statistics: OnceLock::new(),
        }
    }

    /// Plan name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge tolerance in seconds
    pub fn min_gap_duration(&self) -> f64 {
        self.min_gap_duration
    }

    /// Padding applied to every segment
    pub fn handles(&self) -> Handles {
        self.handles
    }

    /// Frames added before each segment
    pub fn start_handles(&self) -> i64 {
        self.handles.start()
    }

    /// Frames added after each segment
    pub fn end_handles(&self) -> i64 {
        self.handles.end()
    }

    /// Segments in plan order
    pub fn segments(&self) -> &[TransferSegment] {
        &self.segments
    }

    /// Timelines that contributed to this plan
    pub fn timelines(&self) -> &[TimelineId] {
        &self.timelines
    }

    /// Append a segment
    pub fn add_segment(&mut self, segment: TransferSegment) {
        self.segments.push(segment);
        self.statistics = OnceLock::new();
    }

    /// Append a contributing timeline; returns `false` if it was already listed
    pub fn add_timeline(&mut self, timeline: TimelineId) -> bool {
        if self.timelines.contains(&timeline) {
            return false;
        }
        self.timelines.push(timeline);
        self.statistics = OnceLock::new();
        true
    }

    /// Statistics for the current segments, computed once and cached
    ///
    /// `fallback_rate` is only used when the plan has no segments.
    pub fn statistics(&self, fallback_rate: FrameRate) -> Result<PlanStatistics> {
        if let Some(cached) = self.statistics.get() {
            return Ok(cached.clone());
        }
        let computed = calculate_statistics(self, fallback_rate)?;
        Ok(self.statistics.get_or_init(|| computed).clone())
    }

    /// Previously computed statistics, if still valid
    pub fn cached_statistics(&self) -> Option<&PlanStatistics> {
        self.statistics.get()
    }

    pub(crate) fn seed_statistics(&mut self, statistics: PlanStatistics) {
        self.statistics = OnceLock::from(statistics);
    }
}
