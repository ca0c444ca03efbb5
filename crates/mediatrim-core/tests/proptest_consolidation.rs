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
#![allow(clippy::unwrap_used)]
//! Property-Based Tests for Consolidation
//!
//! Uses proptest to verify consolidation properties with random clip layouts:
//! - Idempotence (same input, same segments)
//! - Coverage completeness
//! - Merged windows never overlap within a source
//! - Gap threshold correctness, including tolerances between whole frames
//! - Handles never produce a negative start

use mediatrim_core::coverage::provides_coverage;
use mediatrim_core::{
    consolidate, ClipRange, ConsolidationOptions, FrameRate, Handles, NewTimelineClip, Project,
    RationalTime, TimeRange, Timeline, TimelineId, TransferPlan,
};
use proptest::prelude::*;

const SOURCES: [&str; 3] = ["A.mov", "B.mov", "C.mov"];

fn fps24() -> FrameRate {
    FrameRate::integer(24).unwrap()
}

/// Generate (source index, start frame, length) triples
fn arb_clips() -> impl Strategy<Value = Vec<(usize, i64, i64)>> {
    prop::collection::vec((0..SOURCES.len(), 0i64..2000, 0i64..120), 0..60)
}

fn build(clips: &[(usize, i64, i64)]) -> (Project, TimelineId) {
    let mut project = Project::new();
    let timeline = project.add_timeline(Timeline::new("random", fps24()));
    for (i, (source, start, len)) in clips.iter().enumerate() {
        let id = project.source_for_path(SOURCES[*source], fps24());
        let name = format!("clip{}", i);
        let range = ClipRange::bounded(
            RationalTime::new(*start, fps24()),
            RationalTime::new(start + len, fps24()),
            &name,
        )
        .unwrap();
        project
            .add_clip(timeline, NewTimelineClip::new(name, id).with_source_range(range))
            .unwrap();
    }
    (project, timeline)
}

fn options(gap_frames: i64, handles: i64) -> ConsolidationOptions {
    ConsolidationOptions::new("prop", gap_frames as f64 / 24.0).with_handles(Handles::symmetric(handles))
}

fn per_source(plan: &TransferPlan, path: &str) -> Vec<(i64, i64)> {
    plan.segments()
        .iter()
        .filter(|s| s.source_path().to_string_lossy() == path)
        .map(|s| (s.source_start().frames(), s.source_end().frames()))
        .collect()
}

#[test]
fn proptest_consolidation_idempotent() {
    proptest!(|(clips in arb_clips(), gap in 0i64..48, handles in 0i64..30)| {
        let (project, timeline) = build(&clips);
        let first = consolidate(&project, &[timeline], &options(gap, handles)).unwrap();
        let second = consolidate(&project, &[timeline], &options(gap, handles)).unwrap();

        prop_assert_eq!(first.segments(), second.segments());
    });
}

#[test]
fn proptest_every_clip_is_covered() {
    proptest!(|(clips in arb_clips(), gap in 0i64..48, handles in 0i64..30)| {
        let (project, timeline) = build(&clips);
        let plan = consolidate(&project, &[timeline], &options(gap, handles)).unwrap();

        for clip in project.timeline_clips(timeline).unwrap() {
            let path = project.source(clip.source().unwrap()).unwrap().path().to_path_buf();
            let range = clip.source_range().resolve_at(fps24(), "clip").unwrap().unwrap();

            let served = plan.segments().iter().filter(|s| s.source_path() == path).any(|s| {
                provides_coverage(&s.range(), &range).unwrap()
            });
            prop_assert!(served, "{} is not served by any segment", clip.name());

            let recorded = plan
                .segments()
                .iter()
                .filter(|s| s.coverage().iter().any(|c| c.clip == Some(clip.id())))
                .count();
            prop_assert_eq!(recorded, 1);
        }
    });
}

#[test]
fn proptest_windows_respect_gap_threshold() {
    proptest!(|(clips in arb_clips(), gap in 0i64..48)| {
        let (project, timeline) = build(&clips);
        // without handles the segments are the merged windows themselves
        let plan = consolidate(&project, &[timeline], &options(gap, 0)).unwrap();

        for path in SOURCES {
            let windows = per_source(&plan, path);
            for pair in windows.windows(2) {
                let (_, prev_end) = pair[0];
                let (next_start, _) = pair[1];
                // no overlap, and the gap is strictly above the tolerance
                prop_assert!(next_start > prev_end + gap);
            }
        }
    });
}

#[test]
fn proptest_ranges_within_gap_always_merge() {
    proptest!(|(start in 0i64..1000, len in 1i64..100, gap in 0i64..48, extra in 0i64..48)| {
        let distance = gap.min(extra);
        let clips = vec![(0, start, len), (0, start + len + distance, len)];
        let (project, timeline) = build(&clips);
        let plan = consolidate(&project, &[timeline], &options(gap, 0)).unwrap();

        prop_assert_eq!(plan.segments().len(), 1);
    });
}

/// Whole, fractional and NTSC source rates
fn arb_rate() -> impl Strategy<Value = FrameRate> {
    prop::sample::select(vec![(24, 1), (25, 1), (24000, 1001), (30000, 1001), (50, 3)])
        .prop_map(|(numerator, denominator)| FrameRate::new(numerator, denominator).unwrap())
}

#[test]
fn proptest_gap_threshold_in_seconds() {
    proptest!(|(rate in arb_rate(), gap in 0i64..40, tolerance_ms in 0i64..1500)| {
        let mut project = Project::new();
        let source = project.source_for_path("A.mov", rate);
        let timeline = project.add_timeline(Timeline::new("random", rate));
        for (name, start, end) in [("first", 0, 10), ("second", 10 + gap, 20 + gap)] {
            let range = ClipRange::bounded(
                RationalTime::new(start, rate),
                RationalTime::new(end, rate),
                name,
            )
            .unwrap();
            project
                .add_clip(timeline, NewTimelineClip::new(name, source).with_source_range(range))
                .unwrap();
        }

        let tolerance = tolerance_ms as f64 / 1000.0;
        let plan = consolidate(&project, &[timeline], &ConsolidationOptions::new("prop", tolerance)).unwrap();

        // gap seconds = gap * den / num, compared exactly against tolerance_ms / 1000
        let within = i128::from(gap) * i128::from(rate.denominator()) * 1000
            <= i128::from(tolerance_ms) * i128::from(rate.numerator());
        prop_assert_eq!(plan.segments().len(), if within { 1 } else { 2 });
    });
}

#[test]
fn proptest_handles_never_negative() {
    proptest!(|(clips in arb_clips(), handles in 0i64..5000)| {
        let (project, timeline) = build(&clips);
        let plan = consolidate(&project, &[timeline], &options(12, handles)).unwrap();

        for segment in plan.segments() {
            prop_assert!(segment.source_start().frames() >= 0);
            prop_assert!(segment.source_end().frames() >= segment.source_start().frames());
        }
    });
}

#[test]
fn proptest_merged_windows_contain_their_clips() {
    proptest!(|(clips in arb_clips(), gap in 0i64..48, handles in 0i64..30)| {
        let (project, timeline) = build(&clips);
        let plan = consolidate(&project, &[timeline], &options(gap, handles)).unwrap();

        for segment in plan.segments() {
            for covered in segment.coverage() {
                let clip = project.clip(covered.clip.unwrap()).unwrap();
                let range: TimeRange = clip.source_range().resolve_at(fps24(), "clip").unwrap().unwrap();
                prop_assert!(segment.covers(&range).unwrap());
            }
        }
    });
}
