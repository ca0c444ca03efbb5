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
//! Consolidation of timeline clip ranges into transfer segments
//!
//! Clips are partitioned by source file. Within a source, ranges are sorted
//! by start, then end, then encounter order, and swept into windows: a range
//! whose gap to the open window is at most `min_gap_duration` extends it,
//! anything further away closes it. The tolerance is rounded down to whole
//! frames of the source rate, so a gap longer than `min_gap_duration` never
//! merges. Each closed window becomes exactly one [`TransferSegment`] after
//! handles are applied.
//!
//! Partitions are emitted in the order their source was first encountered
//! while walking the input timelines, and windows in sweep order within a
//! partition. The output is fully determined by the input order.
//!
//! # Example
//!
//! ```rust
//! use mediatrim_core::{
//!     consolidate, ClipRange, ConsolidationOptions, FrameRate, Handles, NewTimelineClip,
//!     Project, RationalTime, Timeline,
//! };
//!
//! # fn example() -> mediatrim_core::Result<()> {
//! let fps = FrameRate::integer(24)?;
//! let mut project = Project::new();
//! let source = project.source_for_path("A.mov", fps);
//! let edit = project.add_timeline(Timeline::new("edit", fps));
//!
//! for (name, start, end) in [("a", 10, 20), ("b", 22, 30), ("c", 50, 60)] {
//!     let range = ClipRange::bounded(
//!         RationalTime::new(start, fps),
//!         RationalTime::new(end, fps),
//!         name,
//!     )?;
//!     project.add_clip(edit, NewTimelineClip::new(name, source).with_source_range(range))?;
//! }
//!
//! let options = ConsolidationOptions::new("dailies", 0.5).with_handles(Handles::symmetric(0));
//! let plan = consolidate(&project, &[edit], &options)?;
//! assert_eq!(plan.segments().len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::coverage::provides_coverage;
use crate::error::Result;
use crate::handles::{apply_handles_to_range, Handles};
use crate::model::{ClipId, Metadata, MetadataValue, SourceId, TimelineId};
use crate::plan::{CoveredClip, TransferPlan, TransferSegment};
use crate::project::Project;
use crate::time::{FrameRate, RationalTime, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, trace, warn};

/// Whether gaps are measured before or after handles are added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOrder {
    /// Merge raw clip ranges, then pad each merged window
    #[default]
    MergeThenPad,
    /// Pad every clip range, then merge the padded ranges
    PadThenMerge,
}

/// Parameters of a consolidation run
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationOptions {
    /// Name given to the resulting plan
    pub plan_name: String,
    /// Largest gap, in seconds, that still merges two ranges
    pub min_gap_duration: f64,
    /// Padding applied to each segment
    pub handles: Handles,
    /// Merge/pad ordering
    pub merge_order: MergeOrder,
}

impl ConsolidationOptions {
    /// Options with no handles and the default merge order
    pub fn new(plan_name: impl Into<String>, min_gap_duration: f64) -> Self {
        ConsolidationOptions {
            plan_name: plan_name.into(),
            min_gap_duration,
            handles: Handles::default(),
            merge_order: MergeOrder::default(),
        }
    }

    /// Set the handles
    pub fn with_handles(mut self, handles: Handles) -> Self {
        self.handles = handles;
        self
    }

    /// Set the merge order
    pub fn with_merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }
}

/// A usable clip range inside a source partition
#[derive(Debug, Clone)]
struct Usage {
    clip: ClipId,
    name: String,
    range: TimeRange,
}

/// All usable clip ranges of one source, at the source's rate
#[derive(Debug)]
struct Partition {
    source: SourceId,
    path: PathBuf,
    source_name: String,
    rate: FrameRate,
    usages: Vec<Usage>,
}

/// A merged run of usages, before or after padding depending on merge order
#[derive(Debug)]
struct Window {
    start: RationalTime,
    end: RationalTime,
    members: Vec<usize>,
}

/// Build the minimal transfer plan covering every usable clip of `timelines`
///
/// Clips without a source, or whose source range lacks a start or end, are
/// skipped with a warning. Arithmetic failures abort the run.
#[instrument(skip_all, fields(plan = %options.plan_name, timelines = timelines.len()))]
pub fn consolidate(
    project: &Project,
    timelines: &[TimelineId],
    options: &ConsolidationOptions,
) -> Result<TransferPlan> {
    let timelines = dedup_timelines(timelines);
    let min_gap = if options.min_gap_duration < 0.0 {
        warn!(
            min_gap_duration = options.min_gap_duration,
            "Negative gap tolerance treated as zero"
        );
        0.0
    } else {
        options.min_gap_duration
    };

    let partitions = collect_partitions(project, &timelines)?;

    let mut plan = TransferPlan::new(&options.plan_name, min_gap, options.handles);
    for mut partition in partitions {
        for segment in consolidate_partition(&mut partition, min_gap, options)? {
            plan.add_segment(segment);
        }
    }
    for timeline in timelines {
        plan.add_timeline(timeline);
    }

    info!(
        segments = plan.segments().len(),
        timelines = plan.timelines().len(),
        "Consolidated transfer plan"
    );
    Ok(plan)
}

fn dedup_timelines(timelines: &[TimelineId]) -> Vec<TimelineId> {
    let mut seen = HashSet::new();
    timelines
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

fn collect_partitions(project: &Project, timelines: &[TimelineId]) -> Result<Vec<Partition>> {
    let mut partitions: Vec<Partition> = Vec::new();
    let mut index: HashMap<SourceId, usize> = HashMap::new();
    let mut seen_clips = HashSet::new();
    let mut skipped = 0usize;

    for timeline in timelines {
        for clip in project.timeline_clips(*timeline)? {
            if !seen_clips.insert(clip.id()) {
                continue;
            }

            let Some(source_id) = clip.source() else {
                warn!(clip = clip.name(), "Skipping clip without source media");
                skipped += 1;
                continue;
            };
            let source = project.source(source_id)?;

            let context = format!("clip '{}' of {}", clip.name(), source.path().display());
            let Some(range) = clip.source_range().resolve_at(source.rate(), &context)? else {
                warn!(
                    clip = clip.name(),
                    source = %source.path().display(),
                    "Skipping clip without a complete source range"
                );
                skipped += 1;
                continue;
            };

            let slot = *index.entry(source_id).or_insert_with(|| {
                partitions.push(Partition {
                    source: source_id,
                    path: source.path().to_path_buf(),
                    source_name: source.name().to_string(),
                    rate: source.rate(),
                    usages: Vec::new(),
                });
                partitions.len() - 1
            });

            partitions[slot].usages.push(Usage {
                clip: clip.id(),
                name: clip.name().to_string(),
                range,
            });
        }
    }

    if skipped > 0 {
        warn!(skipped, "Clips skipped during consolidation");
    }
    debug!(partitions = partitions.len(), "Partitioned clips by source");
    Ok(partitions)
}

fn consolidate_partition(
    partition: &mut Partition,
    min_gap: f64,
    options: &ConsolidationOptions,
) -> Result<Vec<TransferSegment>> {
    // stable: equal (start, end) pairs keep encounter order
    partition.usages.sort_by(|a, b| {
        a.range
            .start()
            .frames()
            .cmp(&b.range.start().frames())
            .then_with(|| a.range.end().frames().cmp(&b.range.end().frames()))
    });

    let gap = RationalTime::floor_seconds(min_gap, partition.rate)?;
    let handles = options.handles;

    let windows = match options.merge_order {
        MergeOrder::MergeThenPad => {
            let ranges = partition
                .usages
                .iter()
                .map(|usage| (usage.range.start(), usage.range.end()))
                .collect::<Vec<_>>();
            sweep(&ranges, gap, &partition.path)?
        }
        MergeOrder::PadThenMerge => {
            let padded = partition
                .usages
                .iter()
                .map(|usage| apply_handles_to_range(usage.range.start(), usage.range.end(), handles))
                .collect::<Result<Vec<_>>>()?;
            sweep(&padded, gap, &partition.path)?
        }
    };

    let stem = file_stem_of(&partition.path);
    let mut segments = Vec::with_capacity(windows.len());

    for (ordinal, window) in windows.iter().enumerate() {
        let merged = TimeRange::new(window.start, window.end, &partition.path.display().to_string())?;
        let (start, end) = match options.merge_order {
            MergeOrder::MergeThenPad => apply_handles_to_range(window.start, window.end, handles)?,
            MergeOrder::PadThenMerge => (window.start, window.end),
        };

        let mut coverage = Vec::with_capacity(window.members.len());
        for member in &window.members {
            let usage = &partition.usages[*member];
            if provides_coverage(&merged, &usage.range)? {
                coverage.push(CoveredClip::live(usage.clip, usage.name.clone()));
            }
        }

        let name = format!("{}_{:03}", stem, ordinal);
        trace!(
            segment = %name,
            source = %partition.source,
            window = %merged,
            clips = coverage.len(),
            "Emitting segment"
        );

        let segment = TransferSegment::new(name, partition.path.clone(), start, end)?
            .with_coverage(coverage)
            .with_metadata(segment_metadata(partition, window));
        segments.push(segment);
    }

    debug!(
        source = %partition.path.display(),
        clips = partition.usages.len(),
        segments = segments.len(),
        "Consolidated source"
    );
    Ok(segments)
}

/// Merge sorted ranges whose gap to the open window is at most `gap`
fn sweep(
    ranges: &[(RationalTime, RationalTime)],
    gap: RationalTime,
    path: &Path,
) -> Result<Vec<Window>> {
    let mut windows: Vec<Window> = Vec::new();
    let mut open: Option<Window> = None;

    for (index, (start, end)) in ranges.iter().copied().enumerate() {
        open = Some(match open.take() {
            None => Window {
                start,
                end,
                members: vec![index],
            },
            Some(mut window) => {
                let distance = start.subtract(window.end)?;
                if distance.frames() <= gap.frames() {
                    window.end = window.end.max(end)?;
                    window.members.push(index);
                    window
                } else {
                    debug!(
                        source = %path.display(),
                        gap_frames = distance.frames(),
                        tolerance_frames = gap.frames(),
                        "Gap exceeds tolerance, closing window"
                    );
                    windows.push(window);
                    Window {
                        start,
                        end,
                        members: vec![index],
                    }
                }
            }
        });
    }

    if let Some(window) = open {
        windows.push(window);
    }
    Ok(windows)
}

fn segment_metadata(partition: &Partition, window: &Window) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        "source_name".to_string(),
        MetadataValue::from(partition.source_name.as_str()),
    );
    metadata.insert(
        "merged_start".to_string(),
        MetadataValue::Number(window.start.frames() as f64),
    );
    metadata.insert(
        "merged_end".to_string(),
        MetadataValue::Number(window.end.frames() as f64),
    );
    metadata
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::handles::normalize_handles;
    use crate::model::{ClipRange, NewTimelineClip, Timeline};

    fn fps(n: u32) -> FrameRate {
        FrameRate::integer(n).unwrap()
    }

    fn place(
        project: &mut Project,
        timeline: TimelineId,
        source: SourceId,
        name: &str,
        rate: u32,
        start: i64,
        end: i64,
    ) -> ClipId {
        let range = ClipRange::bounded(
            RationalTime::new(start, fps(rate)),
            RationalTime::new(end, fps(rate)),
            name,
        )
        .unwrap();
        project
            .add_clip(
                timeline,
                NewTimelineClip::new(name, source).with_source_range(range),
            )
            .unwrap()
    }

    fn example_a() -> (Project, TimelineId) {
        let mut project = Project::new();
        let source = project.source_for_path("/media/A.mov", fps(24));
        let edit = project.add_timeline(Timeline::new("edit", fps(24)));
        place(&mut project, edit, source, "a", 24, 10, 20);
        place(&mut project, edit, source, "b", 24, 22, 30);
        place(&mut project, edit, source, "c", 24, 50, 60);
        (project, edit)
    }

    fn bounds(plan: &TransferPlan) -> Vec<(i64, i64)> {
        plan.segments()
            .iter()
            .map(|s| (s.source_start().frames(), s.source_end().frames()))
            .collect()
    }

    #[test]
    fn test_merges_within_gap_tolerance() {
        let (project, edit) = example_a();
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.5)).unwrap();

        assert_eq!(bounds(&plan), vec![(10, 30), (50, 60)]);
        assert_eq!(plan.segments()[0].name(), "A_000");
        assert_eq!(plan.segments()[1].name(), "A_001");
        assert_eq!(plan.segments()[0].covered_clip_names(), vec!["a", "b"]);
        assert_eq!(plan.segments()[1].covered_clip_names(), vec!["c"]);
    }

    fn two_clips(rate: FrameRate, second_start: i64) -> (Project, TimelineId) {
        let mut project = Project::new();
        let source = project.source_for_path("/media/T.mov", rate);
        let edit = project.add_timeline(Timeline::new("edit", rate));
        for (name, start, end) in [("x", 0, 10), ("y", second_start, 30)] {
            let range = ClipRange::bounded(
                RationalTime::new(start, rate),
                RationalTime::new(end, rate),
                name,
            )
            .unwrap();
            project
                .add_clip(edit, NewTimelineClip::new(name, source).with_source_range(range))
                .unwrap();
        }
        (project, edit)
    }

    #[test]
    fn test_gap_tolerance_between_whole_frames() {
        // 0.53s is 12.72 frames: a 13 frame gap (0.5417s) is too far
        let (project, edit) = two_clips(fps(24), 23);
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.53)).unwrap();
        assert_eq!(bounds(&plan), vec![(0, 10), (23, 30)]);

        let (project, edit) = two_clips(fps(24), 22);
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.53)).unwrap();
        assert_eq!(bounds(&plan), vec![(0, 30)]);
    }

    #[test]
    fn test_gap_tolerance_at_ntsc_rate() {
        let ntsc = FrameRate::new(24000, 1001).unwrap();
        // 12 frames @23.976 is 0.5005s
        let (project, edit) = two_clips(ntsc, 22);
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.5)).unwrap();
        assert_eq!(plan.segments().len(), 2);

        // 11 frames is 0.4588s
        let (project, edit) = two_clips(ntsc, 21);
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.5)).unwrap();
        assert_eq!(bounds(&plan), vec![(0, 30)]);
    }

    #[test]
    fn test_handles_applied_after_merge() {
        let (project, edit) = example_a();
        let options = ConsolidationOptions::new("p", 0.5).with_handles(Handles::symmetric(5));
        let plan = consolidate(&project, &[edit], &options).unwrap();
        assert_eq!(bounds(&plan), vec![(5, 35), (45, 65)]);
    }

    #[test]
    fn test_handles_never_go_negative() {
        let (project, edit) = example_a();
        let options =
            ConsolidationOptions::new("p", 0.5).with_handles(normalize_handles(12, None));
        let plan = consolidate(&project, &[edit], &options).unwrap();
        assert_eq!(bounds(&plan)[0], (0, 42));
    }

    #[test]
    fn test_pad_then_merge_joins_padded_ranges() {
        let (project, edit) = example_a();
        // 20 frame gap to "c" closes once each side is padded by 10
        let options = ConsolidationOptions::new("p", 0.0)
            .with_handles(Handles::symmetric(10))
            .with_merge_order(MergeOrder::PadThenMerge);
        let plan = consolidate(&project, &[edit], &options).unwrap();
        assert_eq!(bounds(&plan), vec![(0, 70)]);
        assert_eq!(plan.segments()[0].coverage().len(), 3);

        let merge_first = ConsolidationOptions::new("p", 0.0).with_handles(Handles::symmetric(10));
        let plan = consolidate(&project, &[edit], &merge_first).unwrap();
        assert_eq!(plan.segments().len(), 3);
    }

    #[test]
    fn test_skips_unresolved_and_open_ended_clips() {
        let (mut project, edit) = example_a();
        let source = project.source_by_path("/media/A.mov").unwrap();
        project
            .add_clip(edit, NewTimelineClip::unresolved("offline"))
            .unwrap();
        let open = ClipRange::new(Some(RationalTime::new(5, fps(24))), None, "open").unwrap();
        project
            .add_clip(edit, NewTimelineClip::new("open", source).with_source_range(open))
            .unwrap();

        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.5)).unwrap();
        assert_eq!(bounds(&plan), vec![(10, 30), (50, 60)]);
    }

    #[test]
    fn test_multi_rate_clips_use_source_rate() {
        let mut project = Project::new();
        let source = project.source_for_path("B.mxf", fps(24));
        let edit = project.add_timeline(Timeline::new("edit", fps(48)));
        place(&mut project, edit, source, "fast", 48, 20, 60); // [10, 30) @24
        place(&mut project, edit, source, "slow", 24, 31, 40);

        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.1)).unwrap();
        assert_eq!(bounds(&plan), vec![(10, 40)]);
        assert_eq!(plan.segments()[0].rate(), fps(24));
    }

    #[test]
    fn test_partition_and_tie_order() {
        let mut project = Project::new();
        let b = project.source_for_path("B.mov", fps(24));
        let a = project.source_for_path("A.mov", fps(24));
        let edit = project.add_timeline(Timeline::new("edit", fps(24)));
        place(&mut project, edit, b, "b1", 24, 100, 110);
        place(&mut project, edit, a, "a1", 24, 0, 10);
        place(&mut project, edit, a, "a2", 24, 0, 10);
        place(&mut project, edit, b, "b0", 24, 0, 5);

        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", 0.0)).unwrap();
        let names: Vec<&str> = plan.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["B_000", "B_001", "A_000"]);
        assert_eq!(plan.segments()[2].covered_clip_names(), vec!["a1", "a2"]);
    }

    #[test]
    fn test_duplicate_timelines_counted_once() {
        let (project, edit) = example_a();
        let plan =
            consolidate(&project, &[edit, edit], &ConsolidationOptions::new("p", 0.5)).unwrap();
        assert_eq!(plan.timelines(), &[edit]);
        assert_eq!(plan.segments()[0].coverage().len(), 2);
    }

    #[test]
    fn test_negative_gap_treated_as_zero() {
        let (project, edit) = example_a();
        let plan = consolidate(&project, &[edit], &ConsolidationOptions::new("p", -3.0)).unwrap();
        assert_eq!(plan.min_gap_duration(), 0.0);
        assert_eq!(plan.segments().len(), 3);
    }

    #[test]
    fn test_segment_metadata_records_merged_window() {
        let (project, edit) = example_a();
        let options = ConsolidationOptions::new("p", 0.5).with_handles(Handles::symmetric(2));
        let plan = consolidate(&project, &[edit], &options).unwrap();
        let metadata = plan.segments()[0].metadata();
        assert_eq!(metadata["merged_start"], MetadataValue::Number(10.0));
        assert_eq!(metadata["merged_end"], MetadataValue::Number(30.0));
        assert_eq!(metadata["source_name"], MetadataValue::from("A.mov"));
    }
}
