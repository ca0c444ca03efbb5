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
//! Entity model: source media, timeline placements and timelines
//!
//! Entities live in a [`Project`](crate::project::Project) arena and refer to
//! each other through the copyable handles defined here ([`SourceId`],
//! [`ClipId`], [`TimelineId`]). A [`SourceClip`] keeps the set of clip handles
//! that use it as a plain usage index; it never owns the clips.

use crate::error::{Result, TrimError};
use crate::time::{FrameRate, RationalTime, TimeRange};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Free-form metadata attached to sources, clips, timelines and segments
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Closed set of metadata value kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean flag
    Bool(bool),
    /// Any numeric value
    Number(f64),
    /// Text
    String(String),
    /// Nested key/value map
    Map(Metadata),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

macro_rules! arena_handle {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                $name(index)
            }

            /// Position of the entity in its arena
            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

arena_handle!(
    /// Handle to a [`SourceClip`] in a project
    SourceId,
    "source"
);
arena_handle!(
    /// Handle to a [`TimelineClip`] in a project
    ClipId,
    "clip"
);
arena_handle!(
    /// Handle to a [`Timeline`] in a project
    TimelineId,
    "timeline"
);

/// One physical source media file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceClip {
    path: PathBuf,
    name: String,
    rate: FrameRate,
    duration: Option<RationalTime>,
    metadata: Metadata,
    usages: BTreeSet<ClipId>,
}

impl SourceClip {
    /// Create a source whose display name defaults to the file name
    pub fn new(path: impl Into<PathBuf>, rate: FrameRate) -> Self {
        let path = path.into();
        let name = file_name_of(&path);
        SourceClip {
            path,
            name,
            rate,
            duration: None,
            metadata: Metadata::new(),
            usages: BTreeSet::new(),
        }
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record the known media duration
    pub fn with_duration(mut self, duration: RationalTime) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Path to the media file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Native frame rate
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Media duration, when known
    pub fn duration(&self) -> Option<RationalTime> {
        self.duration
    }

    /// Metadata map
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Clips placed on any timeline that reference this source
    pub fn usages(&self) -> &BTreeSet<ClipId> {
        &self.usages
    }

    pub(crate) fn register_usage(&mut self, clip: ClipId) {
        self.usages.insert(clip);
    }
}

/// Optional `[start, end)` bounds of a clip
///
/// Either bound may be missing when the interchange reader could not
/// determine it. When both are present, `end >= start` is enforced at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClipRange {
    start: Option<RationalTime>,
    end: Option<RationalTime>,
}

impl ClipRange {
    /// Create a range from optional bounds; `context` names the owner in errors
    pub fn new(
        start: Option<RationalTime>,
        end: Option<RationalTime>,
        context: &str,
    ) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if e.cmp_instant(&s) == Ordering::Less {
                return Err(TrimError::invalid_range(context, s, e));
            }
        }
        Ok(ClipRange { start, end })
    }

    /// Range with both bounds present
    pub fn bounded(start: RationalTime, end: RationalTime, context: &str) -> Result<Self> {
        Self::new(Some(start), Some(end), context)
    }

    /// Range with no known bounds
    pub fn unknown() -> Self {
        ClipRange::default()
    }

    /// Inclusive start, if known
    pub fn start(&self) -> Option<RationalTime> {
        self.start
    }

    /// Exclusive end, if known
    pub fn end(&self) -> Option<RationalTime> {
        self.end
    }

    /// Both bounds expressed at `rate`, or `None` when either is missing
    pub fn resolve_at(&self, rate: FrameRate, context: &str) -> Result<Option<TimeRange>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some(TimeRange::new(
                start.rescale_to(rate)?,
                end.rescale_to(rate)?,
                context,
            )?)),
            _ => Ok(None),
        }
    }
}

/// A placement of source media on an editorial timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineClip {
    id: ClipId,
    name: String,
    source: Option<SourceId>,
    source_range: ClipRange,
    timeline_range: ClipRange,
    metadata: Metadata,
}

impl TimelineClip {
    pub(crate) fn from_new(id: ClipId, new: NewTimelineClip) -> Self {
        TimelineClip {
            id,
            name: new.name,
            source: new.source,
            source_range: new.source_range,
            timeline_range: new.timeline_range,
            metadata: new.metadata,
        }
    }

    /// Arena handle of this clip
    pub fn id(&self) -> ClipId {
        self.id
    }

    /// Clip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced source, if the interchange layer resolved one
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Used portion of the source media
    pub fn source_range(&self) -> ClipRange {
        self.source_range
    }

    /// Position on the timeline
    pub fn timeline_range(&self) -> ClipRange {
        self.timeline_range
    }

    /// Metadata map
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Description of a clip to place on a timeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTimelineClip {
    /// Clip name
    pub name: String,
    /// Referenced source
    pub source: Option<SourceId>,
    /// Used portion of the source media
    pub source_range: ClipRange,
    /// Position on the timeline
    pub timeline_range: ClipRange,
    /// Metadata map
    pub metadata: Metadata,
}

impl NewTimelineClip {
    /// Clip referencing `source`
    pub fn new(name: impl Into<String>, source: SourceId) -> Self {
        NewTimelineClip {
            name: name.into(),
            source: Some(source),
            ..Default::default()
        }
    }

    /// Clip the interchange layer could not resolve to a source
    pub fn unresolved(name: impl Into<String>) -> Self {
        NewTimelineClip {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the used source range
    pub fn with_source_range(mut self, range: ClipRange) -> Self {
        self.source_range = range;
        self
    }

    /// Set the timeline range
    pub fn with_timeline_range(mut self, range: ClipRange) -> Self {
        self.timeline_range = range;
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An ordered sequence of clips with a registry of the sources they use
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    name: String,
    rate: FrameRate,
    metadata: Metadata,
    clips: Vec<ClipId>,
    sources: BTreeMap<PathBuf, SourceId>,
}

impl Timeline {
    /// Empty timeline
    pub fn new(name: impl Into<String>, rate: FrameRate) -> Self {
        Timeline {
            name: name.into(),
            rate,
            metadata: Metadata::new(),
            clips: Vec::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Timeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Edit rate
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Metadata map
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Clips in timeline order
    pub fn clips(&self) -> &[ClipId] {
        &self.clips
    }

    /// Source path registry derived from the clips
    pub fn sources(&self) -> &BTreeMap<PathBuf, SourceId> {
        &self.sources
    }

    pub(crate) fn push_clip(&mut self, clip: ClipId, source: Option<(&Path, SourceId)>) {
        self.clips.push(clip);
        if let Some((path, id)) = source {
            self.sources.entry(path.to_path_buf()).or_insert(id);
        }
    }
}

/// File name component of a path, falling back to the whole path
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
