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
//! Neutral JSON timeline manifests
//!
//! A manifest is the boundary where raw frame numbers enter the engine. Each
//! value is read at the most specific rate available: the clip's rate, then
//! its source's rate, then the timeline's rate, and finally the caller's
//! default rate. The default is applied here and nowhere else.
//!
//! ```json
//! {
//!   "name": "reel_1",
//!   "rate": 24,
//!   "clips": [
//!     {
//!       "name": "shot_010",
//!       "source": { "path": "/media/A001.mov", "rate": 23.976 },
//!       "source_start": 120,
//!       "source_end": 240,
//!       "timeline_start": 0,
//!       "timeline_end": 120
//!     }
//!   ]
//! }
//! ```

use crate::error::Result;
use crate::model::{ClipRange, Metadata, NewTimelineClip, SourceClip, Timeline, TimelineId};
use crate::project::Project;
use crate::time::{FrameRate, RationalTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// A timeline as written by an interchange reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineManifest {
    /// Timeline name
    pub name: String,
    /// Edit rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<FrameRate>,
    /// Clips in timeline order
    #[serde(default)]
    pub clips: Vec<ClipManifest>,
    /// Timeline metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// One clip of a [`TimelineManifest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipManifest {
    /// Clip name
    pub name: String,
    /// Referenced media, absent when the reader could not resolve it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceManifest>,
    /// Rate of the source range values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<FrameRate>,
    /// Inclusive source start frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_start: Option<i64>,
    /// Exclusive source end frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_end: Option<i64>,
    /// Inclusive timeline start frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_start: Option<i64>,
    /// Exclusive timeline end frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_end: Option<i64>,
    /// Clip metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Source media referenced by a [`ClipManifest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceManifest {
    /// Media file path
    pub path: PathBuf,
    /// Display name, defaults to the file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Native rate of the media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<FrameRate>,
    /// Media length in frames at `rate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Source metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl TimelineManifest {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build this timeline inside `project`
    ///
    /// Sources whose path the project already knows are reused as-is.
    #[instrument(skip_all, fields(timeline = %self.name, clips = self.clips.len()))]
    pub fn load_into(&self, project: &mut Project, default_rate: FrameRate) -> Result<TimelineId> {
        let timeline_rate = self.rate.unwrap_or(default_rate);

        // Validate every range before touching the project.
        let mut pending = Vec::with_capacity(self.clips.len());
        for clip in &self.clips {
            let source_rate = clip
                .source
                .as_ref()
                .and_then(|source| source.rate)
                .unwrap_or(timeline_rate);
            let clip_rate = clip.rate.unwrap_or(source_rate);
            let context = format!("clip '{}' of timeline '{}'", clip.name, self.name);

            let source_range = ClipRange::new(
                clip.source_start.map(|f| RationalTime::new(f, clip_rate)),
                clip.source_end.map(|f| RationalTime::new(f, clip_rate)),
                &context,
            )?;
            let timeline_range = ClipRange::new(
                clip.timeline_start.map(|f| RationalTime::new(f, timeline_rate)),
                clip.timeline_end.map(|f| RationalTime::new(f, timeline_rate)),
                &context,
            )?;
            pending.push((clip, source_rate, source_range, timeline_range));
        }

        let timeline = project.add_timeline(
            Timeline::new(self.name.clone(), timeline_rate).with_metadata(self.metadata.clone()),
        );

        for (clip, source_rate, source_range, timeline_range) in pending {
            let new_clip = match &clip.source {
                Some(manifest) => {
                    let source = project.insert_source(manifest.to_source(source_rate));
                    NewTimelineClip::new(clip.name.clone(), source)
                }
                None => NewTimelineClip::unresolved(clip.name.clone()),
            };
            project.add_clip(
                timeline,
                new_clip
                    .with_source_range(source_range)
                    .with_timeline_range(timeline_range)
                    .with_metadata(clip.metadata.clone()),
            )?;
        }

        debug!(timeline = %timeline, rate = %timeline_rate, "Loaded timeline manifest");
        Ok(timeline)
    }
}

impl SourceManifest {
    fn to_source(&self, rate: FrameRate) -> SourceClip {
        let mut source = SourceClip::new(self.path.clone(), rate).with_metadata(self.metadata.clone());
        if let Some(name) = &self.name {
            source = source.with_name(name.clone());
        }
        if let Some(duration) = self.duration {
            source = source.with_duration(RationalTime::new(duration, rate));
        }
        source
    }
}

impl Project {
    /// Describe a timeline of this project as a manifest
    ///
    /// Every rate is written out explicitly, so the manifest loads back the
    /// same way whatever default rate the reader uses.
    pub fn export_timeline(&self, id: TimelineId) -> Result<TimelineManifest> {
        let timeline = self.timeline(id)?;
        let mut clips = Vec::with_capacity(timeline.clips().len());

        for clip in self.timeline_clips(id)? {
            let source = match clip.source() {
                Some(source_id) => {
                    let source = self.source(source_id)?;
                    Some(SourceManifest {
                        path: source.path().to_path_buf(),
                        name: Some(source.name().to_string()),
                        rate: Some(source.rate()),
                        duration: match source.duration() {
                            Some(duration) => Some(duration.rescale_to(source.rate())?.frames()),
                            None => None,
                        },
                        metadata: source.metadata().clone(),
                    })
                }
                None => None,
            };

            let source_range = clip.source_range();
            let clip_rate = source_range.start().or(source_range.end()).map(|t| t.rate());
            let at_clip_rate = |t: Option<RationalTime>| -> Result<Option<i64>> {
                match (t, clip_rate) {
                    (Some(t), Some(rate)) => Ok(Some(t.rescale_to(rate)?.frames())),
                    _ => Ok(None),
                }
            };
            let at_timeline_rate = |t: Option<RationalTime>| -> Result<Option<i64>> {
                t.map(|t| t.rescale_to(timeline.rate()).map(|t| t.frames()))
                    .transpose()
            };

            clips.push(ClipManifest {
                name: clip.name().to_string(),
                source,
                rate: clip_rate,
                source_start: at_clip_rate(source_range.start())?,
                source_end: at_clip_rate(source_range.end())?,
                timeline_start: at_timeline_rate(clip.timeline_range().start())?,
                timeline_end: at_timeline_rate(clip.timeline_range().end())?,
                metadata: clip.metadata().clone(),
            });
        }

        Ok(TimelineManifest {
            name: timeline.name().to_string(),
            rate: Some(timeline.rate()),
            clips,
            metadata: timeline.metadata().clone(),
        })
    }
}
