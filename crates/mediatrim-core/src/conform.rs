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
//! Consolidated output timeline
//!
//! Lays a plan's segments end to end, starting at zero with no gaps. The
//! result is a presentation of the plan for tools that expect a timeline,
//! not a structure the engine reads back.

use crate::error::Result;
use crate::model::{ClipRange, NewTimelineClip, Timeline, TimelineId};
use crate::plan::TransferPlan;
use crate::project::Project;
use crate::time::{FrameRate, RationalTime};
use tracing::{debug, instrument};

impl Project {
    /// Add a timeline holding one clip per segment of `plan`
    ///
    /// The timeline runs at `rate`, or `default_rate` when none is given.
    /// Sources are looked up by segment path and created on first use.
    #[instrument(skip_all, fields(plan = %plan.name(), segments = plan.segments().len()))]
    pub fn consolidated_timeline(
        &mut self,
        plan: &TransferPlan,
        name: impl Into<String>,
        rate: Option<FrameRate>,
        default_rate: FrameRate,
    ) -> Result<TimelineId> {
        let rate = rate.unwrap_or(default_rate);

        // Lay out every clip first so a failure leaves the project untouched.
        let mut cursor = RationalTime::zero(rate);
        let mut placements = Vec::with_capacity(plan.segments().len());
        for segment in plan.segments() {
            let context = format!("consolidated clip '{}'", segment.name());
            let end = cursor.add(segment.duration().rescale_to(rate)?)?;
            let source_range =
                ClipRange::bounded(segment.source_start(), segment.source_end(), &context)?;
            let timeline_range = ClipRange::bounded(cursor, end, &context)?;
            placements.push((segment, source_range, timeline_range));
            cursor = end;
        }

        let timeline = self.add_timeline(Timeline::new(name, rate));
        for (segment, source_range, timeline_range) in placements {
            let source = self.source_for_path(segment.source_path(), segment.rate());
            let clip = NewTimelineClip::new(segment.name(), source)
                .with_source_range(source_range)
                .with_timeline_range(timeline_range)
                .with_metadata(segment.metadata().clone());
            self.add_clip(timeline, clip)?;
        }

        debug!(
            timeline = %timeline,
            total_frames = cursor.frames(),
            rate = %rate,
            "Built consolidated timeline"
        );
        Ok(timeline)
    }
}
