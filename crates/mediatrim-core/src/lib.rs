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
//! Time-range consolidation engine for MediaTrim
//!
//! Reconciles many editorial timeline references to shared source media
//! into the minimal set of contiguous source ranges worth transferring or
//! transcoding.
//!
//! This crate provides:
//! - Exact frame/rate arithmetic ([`time`])
//! - Handle (padding) policy ([`handles`])
//! - Source, clip and timeline entities in a handle-addressed arena ([`model`], [`project`])
//! - Coverage predicates ([`coverage`])
//! - Gap-tolerant segment merging ([`consolidate`](mod@consolidate))
//! - Plan statistics and savings estimates ([`stats`])
//! - Serializable plan records and JSON timeline manifests ([`record`], [`manifest`])
//! - A consolidated output timeline ([`conform`])
//!
//! The engine performs no I/O of its own and holds no locks. Independent
//! plans can be built on separate threads from separate projects.

pub mod conform;
pub mod consolidate;
pub mod coverage;
pub mod error;
pub mod handles;
pub mod manifest;
pub mod model;
pub mod plan;
pub mod project;
pub mod record;
pub mod stats;
pub mod time;

// Re-export commonly used types
pub use consolidate::{consolidate, ConsolidationOptions, MergeOrder};
pub use error::{Result, TrimError};
pub use handles::{apply_handles_to_range, normalize_handles, Handles};
pub use manifest::{ClipManifest, SourceManifest, TimelineManifest};
pub use model::{
    ClipId, ClipRange, Metadata, MetadataValue, NewTimelineClip, SourceClip, SourceId, Timeline,
    TimelineClip, TimelineId,
};
pub use plan::{CoveredClip, TransferPlan, TransferSegment};
pub use project::Project;
pub use record::{SegmentRecord, TransferPlanRecord};
pub use stats::{calculate_statistics, estimate_savings, PlanStatistics, Savings, SavingsEstimate};
pub use time::{FrameRate, RationalTime, TimeRange};
