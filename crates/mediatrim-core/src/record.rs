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
//! Serializable form of a transfer plan
//!
//! A [`TransferPlanRecord`] is what plans look like on disk and over the
//! wire. Converting a plan to a record keeps everything except live clip
//! handles, which degrade to clip names. Converting back yields an
//! equivalent plan whose segments reference clips by name only.

use crate::error::Result;
use crate::handles::normalize_handles;
use crate::model::Metadata;
use crate::plan::{CoveredClip, TransferPlan, TransferSegment};
use crate::stats::PlanStatistics;
use crate::time::{FrameRate, RationalTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk shape of a [`TransferPlan`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPlanRecord {
    /// Plan name
    pub name: String,
    /// Merge tolerance in seconds
    pub min_gap_duration: f64,
    /// Frames of padding before each segment
    pub start_handles: i64,
    /// Frames of padding after each segment
    pub end_handles: i64,
    /// Segments in plan order
    pub segments: Vec<SegmentRecord>,
    /// Statistics snapshot taken when the record was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<PlanStatistics>,
}

/// On-disk shape of a [`TransferSegment`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Segment name
    pub name: String,
    /// Source media path
    pub source_file: PathBuf,
    /// Inclusive start frame
    pub source_start: i64,
    /// Exclusive end frame
    pub source_end: i64,
    /// Rate of both frame values
    pub rate: FrameRate,
    /// Names of the clips the segment serves
    #[serde(default)]
    pub covered_clip_names: Vec<String>,
    /// Segment metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl From<&TransferSegment> for SegmentRecord {
    fn from(segment: &TransferSegment) -> Self {
        SegmentRecord {
            name: segment.name().to_string(),
            source_file: segment.source_path().to_path_buf(),
            source_start: segment.source_start().frames(),
            source_end: segment.source_end().frames(),
            rate: segment.rate(),
            covered_clip_names: segment.covered_clip_names(),
            metadata: segment.metadata().clone(),
        }
    }
}

impl SegmentRecord {
    /// Rebuild the segment, validating its range
    pub fn to_segment(&self) -> Result<TransferSegment> {
        let coverage = self
            .covered_clip_names
            .iter()
            .map(CoveredClip::named)
            .collect();

        Ok(TransferSegment::new(
            self.name.clone(),
            self.source_file.clone(),
            RationalTime::new(self.source_start, self.rate),
            RationalTime::new(self.source_end, self.rate),
        )?
        .with_coverage(coverage)
        .with_metadata(self.metadata.clone()))
    }
}

impl TransferPlan {
    /// Serializable form of this plan, including a statistics snapshot
    pub fn to_record(&self, fallback_rate: FrameRate) -> Result<TransferPlanRecord> {
        Ok(TransferPlanRecord {
            name: self.name().to_string(),
            min_gap_duration: self.min_gap_duration(),
            start_handles: self.start_handles(),
            end_handles: self.end_handles(),
            segments: self.segments().iter().map(SegmentRecord::from).collect(),
            statistics: Some(self.statistics(fallback_rate)?),
        })
    }

    /// Rebuild a plan from its record
    ///
    /// Segment ranges are validated. A stored statistics snapshot becomes the
    /// plan's cached statistics.
    pub fn from_record(record: &TransferPlanRecord) -> Result<Self> {
        let handles = normalize_handles(record.start_handles, Some(record.end_handles));
        let mut plan = TransferPlan::new(record.name.clone(), record.min_gap_duration, handles);

        for segment in &record.segments {
            plan.add_segment(segment.to_segment()?);
        }
        if let Some(statistics) = &record.statistics {
            plan.seed_statistics(statistics.clone());
        }
        Ok(plan)
    }
}

impl TransferPlanRecord {
    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
