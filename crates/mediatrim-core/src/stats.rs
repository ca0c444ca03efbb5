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
//! Plan statistics and transfer savings estimation
//!
//! Every duration is rescaled to one canonical rate before it is summed: the
//! rate of the plan's first segment, or the caller's fallback rate when the
//! plan is empty.

use crate::error::Result;
use crate::plan::TransferPlan;
use crate::time::{FrameRate, RationalTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Aggregate counts and durations of a transfer plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatistics {
    /// Number of contributing timelines
    pub timeline_count: usize,
    /// Number of segments
    pub segment_count: usize,
    /// Number of distinct source files
    pub unique_source_count: usize,
    /// Sum of all segment durations at the canonical rate
    pub total_duration: RationalTime,
    /// Segment count keyed by source path
    pub segments_per_source: BTreeMap<String, usize>,
    /// Summed segment duration keyed by source path
    pub duration_per_source: BTreeMap<String, RationalTime>,
    /// Merge tolerance the plan was built with, in seconds
    pub min_gap_duration: f64,
    /// Frames of padding before each segment
    pub start_handles: i64,
    /// Frames of padding after each segment
    pub end_handles: i64,
}

impl PlanStatistics {
    /// Canonical rate of every duration in this snapshot
    pub fn rate(&self) -> FrameRate {
        self.total_duration.rate()
    }
}

/// Percentage of footage avoided by transferring segments only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Savings {
    /// `(1 - optimized / original) * 100`
    Percent(f64),
    /// The original baseline is zero, so no ratio exists
    NotApplicable,
}

impl Savings {
    /// Percentage, if defined
    pub fn percent(&self) -> Option<f64> {
        match self {
            Savings::Percent(value) => Some(*value),
            Savings::NotApplicable => None,
        }
    }
}

/// Optimized footprint compared with the original source footage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    /// Baseline footage duration
    pub original_duration: RationalTime,
    /// Total duration of all segments
    pub optimized_duration: RationalTime,
    /// `true` when the baseline was approximated from segment extents
    pub original_is_estimated: bool,
    /// Baseline per source, keyed as supplied or by source path
    pub original_per_source: BTreeMap<String, RationalTime>,
    /// Resulting savings
    pub savings: Savings,
}

/// Count segments and sources and sum their durations
#[instrument(skip_all, fields(plan = %plan.name(), segments = plan.segments().len()))]
pub fn calculate_statistics(plan: &TransferPlan, fallback_rate: FrameRate) -> Result<PlanStatistics> {
    let rate = canonical_rate(plan, fallback_rate);
    let mut total = RationalTime::zero(rate);
    let mut segments_per_source: BTreeMap<String, usize> = BTreeMap::new();
    let mut duration_per_source: BTreeMap<String, RationalTime> = BTreeMap::new();

    for segment in plan.segments() {
        let key = segment.source_path().to_string_lossy().into_owned();
        let duration = segment.duration().rescale_to(rate)?;

        total = total.add(duration)?;
        *segments_per_source.entry(key.clone()).or_insert(0) += 1;
        let entry = duration_per_source
            .entry(key)
            .or_insert_with(|| RationalTime::zero(rate));
        *entry = entry.add(duration)?;
    }

    debug!(
        total_frames = total.frames(),
        rate = %rate,
        sources = segments_per_source.len(),
        "Calculated plan statistics"
    );

    Ok(PlanStatistics {
        timeline_count: plan.timelines().len(),
        segment_count: plan.segments().len(),
        unique_source_count: segments_per_source.len(),
        total_duration: total,
        segments_per_source,
        duration_per_source,
        min_gap_duration: plan.min_gap_duration(),
        start_handles: plan.start_handles(),
        end_handles: plan.end_handles(),
    })
}

/// Compare the plan's footprint with the original footage
///
/// When `original_durations` is supplied, its values are summed as the
/// baseline. Otherwise each source's original length is approximated as
/// `max(source_end) - min(source_start)` over that source's segments. The
/// approximation understates the real file length whenever usage does not
/// span the whole file, and it never sees sources that no segment touches.
#[instrument(skip_all, fields(plan = %plan.name(), supplied = original_durations.is_some()))]
pub fn estimate_savings(
    plan: &TransferPlan,
    original_durations: Option<&BTreeMap<String, RationalTime>>,
    fallback_rate: FrameRate,
) -> Result<SavingsEstimate> {
    let statistics = calculate_statistics(plan, fallback_rate)?;
    let rate = statistics.rate();

    let (original_per_source, original_is_estimated) = match original_durations {
        Some(durations) => {
            let mut rescaled = BTreeMap::new();
            for (key, duration) in durations {
                rescaled.insert(key.clone(), duration.rescale_to(rate)?);
            }
            (rescaled, false)
        }
        None => (estimate_source_extents(plan, rate)?, true),
    };

    let mut original = RationalTime::zero(rate);
    for duration in original_per_source.values() {
        original = original.add(*duration)?;
    }

    let optimized = statistics.total_duration;
    let savings = if original.frames() == 0 {
        Savings::NotApplicable
    } else {
        let saved = i128::from(original.frames()) - i128::from(optimized.frames());
        Savings::Percent(saved as f64 * 100.0 / original.frames() as f64)
    };

    debug!(
        original_frames = original.frames(),
        optimized_frames = optimized.frames(),
        ?savings,
        "Estimated transfer savings"
    );

    Ok(SavingsEstimate {
        original_duration: original,
        optimized_duration: optimized,
        original_is_estimated,
        original_per_source,
        savings,
    })
}

fn estimate_source_extents(
    plan: &TransferPlan,
    rate: FrameRate,
) -> Result<BTreeMap<String, RationalTime>> {
    let mut extents: BTreeMap<String, (RationalTime, RationalTime)> = BTreeMap::new();

    for segment in plan.segments() {
        let key = segment.source_path().to_string_lossy().into_owned();
        let start = segment.source_start().rescale_to(rate)?;
        let end = segment.source_end().rescale_to(rate)?;

        match extents.get_mut(&key) {
            Some((min_start, max_end)) => {
                *min_start = min_start.min(start)?;
                *max_end = max_end.max(end)?;
            }
            None => {
                extents.insert(key, (start, end));
            }
        }
    }

    extents
        .into_iter()
        .map(|(key, (start, end))| Ok((key, end.subtract(start)?)))
        .collect()
}

fn canonical_rate(plan: &TransferPlan, fallback_rate: FrameRate) -> FrameRate {
    plan.segments()
        .first()
        .map(|segment| segment.rate())
        .unwrap_or(fallback_rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::handles::Handles;
    use crate::plan::TransferSegment;

    fn fps(n: u32) -> FrameRate {
        FrameRate::integer(n).unwrap()
    }

    fn segment(path: &str, rate: u32, start: i64, end: i64) -> TransferSegment {
        TransferSegment::new(
            format!("{}-{}", path, start),
            path,
            RationalTime::new(start, fps(rate)),
            RationalTime::new(end, fps(rate)),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_plan_statistics() {
        let plan = TransferPlan::new("empty", 0.5, Handles::symmetric(5));
        let stats = calculate_statistics(&plan, fps(25)).unwrap();

        assert_eq!(stats.segment_count, 0);
        assert_eq!(stats.unique_source_count, 0);
        assert_eq!(stats.timeline_count, 0);
        assert_eq!(stats.total_duration, RationalTime::zero(fps(25)));
        assert_eq!(stats.start_handles, 5);
        assert_eq!(stats.end_handles, 5);
    }

    #[test]
    fn test_statistics_rescale_mixed_rates() {
        let mut plan = TransferPlan::new("mixed", 0.0, Handles::default());
        plan.add_segment(segment("A.mov", 24, 0, 48));
        plan.add_segment(segment("B.mov", 48, 0, 96));
        plan.add_segment(segment("A.mov", 24, 100, 124));

        let stats = calculate_statistics(&plan, fps(25)).unwrap();
        assert_eq!(stats.rate(), fps(24));
        assert_eq!(stats.total_duration.frames(), 48 + 48 + 24);
        assert_eq!(stats.unique_source_count, 2);
        assert_eq!(stats.segments_per_source["A.mov"], 2);
        assert_eq!(stats.duration_per_source["B.mov"].frames(), 48);
    }

    #[test]
    fn test_savings_with_supplied_originals() {
        let mut plan = TransferPlan::new("plan", 0.5, Handles::default());
        // 40 seconds at 24 fps
        plan.add_segment(segment("A.mov", 24, 0, 480));
        plan.add_segment(segment("A.mov", 24, 1000, 1480));

        let mut originals = BTreeMap::new();
        originals.insert(
            "A.mov".to_string(),
            RationalTime::from_seconds(100.0, fps(24)).unwrap(),
        );

        let estimate = estimate_savings(&plan, Some(&originals), fps(24)).unwrap();
        assert!(!estimate.original_is_estimated);
        assert_eq!(estimate.optimized_duration.frames(), 960);
        assert_eq!(estimate.savings, Savings::Percent(60.0));
    }

    #[test]
    fn test_savings_estimated_from_extents() {
        let mut plan = TransferPlan::new("plan", 0.5, Handles::default());
        plan.add_segment(segment("A.mov", 24, 0, 10));
        plan.add_segment(segment("A.mov", 24, 90, 100));

        let estimate = estimate_savings(&plan, None, fps(24)).unwrap();
        assert!(estimate.original_is_estimated);
        assert_eq!(estimate.original_duration.frames(), 100);
        assert_eq!(estimate.optimized_duration.frames(), 20);
        assert_eq!(estimate.savings.percent(), Some(80.0));
    }

    #[test]
    fn test_savings_not_applicable_for_zero_baseline() {
        let plan = TransferPlan::new("empty", 0.5, Handles::default());
        let estimate = estimate_savings(&plan, None, fps(24)).unwrap();
        assert_eq!(estimate.savings, Savings::NotApplicable);
        assert_eq!(estimate.savings.percent(), None);
    }

    #[test]
    fn test_savings_serialization() {
        assert_eq!(
            serde_json::to_string(&Savings::NotApplicable).unwrap(),
            r#""not_applicable""#
        );
        assert_eq!(
            serde_json::to_string(&Savings::Percent(60.0)).unwrap(),
            r#"{"percent":60.0}"#
        );
    }
}
