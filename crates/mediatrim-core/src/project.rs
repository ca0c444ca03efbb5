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
//! Arena that owns every source, clip and timeline
//!
//! Handles returned by a [`Project`] are only meaningful for that project.
//! Passing a foreign handle yields [`TrimError::UnknownHandle`].

use crate::error::{Result, TrimError};
use crate::model::{
    ClipId, NewTimelineClip, SourceClip, SourceId, Timeline, TimelineClip, TimelineId,
};
use crate::time::FrameRate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Owner of all entities participating in a consolidation run
#[derive(Debug, Clone, Default)]
pub struct Project {
    sources: Vec<SourceClip>,
    source_paths: HashMap<PathBuf, SourceId>,
    clips: Vec<TimelineClip>,
    timelines: Vec<Timeline>,
}

impl Project {
    /// Empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source; if its path is already known the existing source wins
    pub fn insert_source(&mut self, source: SourceClip) -> SourceId {
        if let Some(existing) = self.source_paths.get(source.path()) {
            debug!(
                path = %source.path().display(),
                source = %existing,
                "Reusing existing source for path"
            );
            return *existing;
        }

        let id = SourceId::new(self.sources.len());
        trace!(path = %source.path().display(), source = %id, "Registered source");
        self.source_paths.insert(source.path().to_path_buf(), id);
        self.sources.push(source);
        id
    }

    /// Source for `path`, created at `rate` the first time the path is seen
    pub fn source_for_path(&mut self, path: impl AsRef<Path>, rate: FrameRate) -> SourceId {
        let path = path.as_ref();
        match self.source_paths.get(path) {
            Some(id) => *id,
            None => self.insert_source(SourceClip::new(path, rate)),
        }
    }

    /// Look up a source by path
    pub fn source_by_path(&self, path: impl AsRef<Path>) -> Option<SourceId> {
        self.source_paths.get(path.as_ref()).copied()
    }

    /// Source behind a handle
    pub fn source(&self, id: SourceId) -> Result<&SourceClip> {
        self.sources
            .get(id.index())
            .ok_or_else(|| TrimError::UnknownHandle(id.to_string()))
    }

    /// All sources in registration order
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &SourceClip)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(index, source)| (SourceId::new(index), source))
    }

    /// Add an empty timeline
    pub fn add_timeline(&mut self, timeline: Timeline) -> TimelineId {
        let id = TimelineId::new(self.timelines.len());
        self.timelines.push(timeline);
        id
    }

    /// Timeline behind a handle
    pub fn timeline(&self, id: TimelineId) -> Result<&Timeline> {
        self.timelines
            .get(id.index())
            .ok_or_else(|| TrimError::UnknownHandle(id.to_string()))
    }

    /// All timeline handles in creation order
    pub fn timeline_ids(&self) -> impl Iterator<Item = TimelineId> {
        (0..self.timelines.len()).map(TimelineId::new)
    }

    /// Place a clip at the end of `timeline`
    ///
    /// The clip is registered in its source's usage index and the timeline's
    /// source registry. A clip without a source is accepted; consolidation
    /// skips it.
    pub fn add_clip(&mut self, timeline: TimelineId, clip: NewTimelineClip) -> Result<ClipId> {
        self.timeline(timeline)?;
        if let Some(source) = clip.source {
            self.source(source)?;
        }

        let id = ClipId::new(self.clips.len());
        let source = clip.source;
        self.clips.push(TimelineClip::from_new(id, clip));

        let registry_entry = match source {
            Some(source_id) => {
                let entry = &mut self.sources[source_id.index()];
                entry.register_usage(id);
                Some((entry.path().to_path_buf(), source_id))
            }
            None => None,
        };

        self.timelines[timeline.index()].push_clip(
            id,
            registry_entry
                .as_ref()
                .map(|(path, source_id)| (path.as_path(), *source_id)),
        );
        Ok(id)
    }

    /// Clip behind a handle
    pub fn clip(&self, id: ClipId) -> Result<&TimelineClip> {
        self.clips
            .get(id.index())
            .ok_or_else(|| TrimError::UnknownHandle(id.to_string()))
    }

    /// Clips of a timeline in timeline order
    pub fn timeline_clips(&self, timeline: TimelineId) -> Result<Vec<&TimelineClip>> {
        self.timeline(timeline)?
            .clips()
            .iter()
            .map(|id| self.clip(*id))
            .collect()
    }

    /// Clips on any timeline that reference `source`
    pub fn clips_using(&self, source: SourceId) -> Result<Vec<&TimelineClip>> {
        self.source(source)?
            .usages()
            .iter()
            .map(|id| self.clip(*id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ClipRange;
    use crate::time::RationalTime;

    fn fps24() -> FrameRate {
        FrameRate::integer(24).unwrap()
    }

    #[test]
    fn test_first_source_for_path_wins() {
        let mut project = Project::new();
        let first = project.insert_source(SourceClip::new("A.mov", fps24()).with_name("first"));
        let second = project.insert_source(SourceClip::new("A.mov", fps24()).with_name("second"));

        assert_eq!(first, second);
        assert_eq!(project.source(first).unwrap().name(), "first");
        assert_eq!(project.sources().count(), 1);
    }

    #[test]
    fn test_source_for_path_is_lazy() {
        let mut project = Project::new();
        assert!(project.source_by_path("B.mov").is_none());

        let id = project.source_for_path("B.mov", fps24());
        assert_eq!(project.source_by_path("B.mov"), Some(id));
        assert_eq!(project.source_for_path("B.mov", FrameRate::integer(25).unwrap()), id);
        assert_eq!(project.source(id).unwrap().rate(), fps24());
    }

    #[test]
    fn test_add_clip_registers_usage_and_registry() {
        let mut project = Project::new();
        let source = project.source_for_path("/media/A.mov", fps24());
        let timeline = project.add_timeline(Timeline::new("edit", fps24()));

        let range = ClipRange::bounded(
            RationalTime::new(10, fps24()),
            RationalTime::new(20, fps24()),
            "shot",
        )
        .unwrap();
        let clip = project
            .add_clip(timeline, NewTimelineClip::new("shot", source).with_source_range(range))
            .unwrap();

        assert!(project.source(source).unwrap().usages().contains(&clip));
        let registry = project.timeline(timeline).unwrap().sources();
        assert_eq!(registry.get(Path::new("/media/A.mov")), Some(&source));
        assert_eq!(project.clips_using(source).unwrap()[0].name(), "shot");
        assert_eq!(project.timeline_clips(timeline).unwrap().len(), 1);
    }

    #[test]
    fn test_add_clip_rejects_foreign_handles() {
        let mut project = Project::new();
        let timeline = project.add_timeline(Timeline::new("edit", fps24()));

        let bogus_source = SourceId::new(7);
        assert!(matches!(
            project.add_clip(timeline, NewTimelineClip::new("x", bogus_source)),
            Err(TrimError::UnknownHandle(_))
        ));
        assert!(matches!(
            project.add_clip(TimelineId::new(3), NewTimelineClip::unresolved("x")),
            Err(TrimError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_unresolved_clip_is_kept_on_timeline() {
        let mut project = Project::new();
        let timeline = project.add_timeline(Timeline::new("edit", fps24()));
        project
            .add_clip(timeline, NewTimelineClip::unresolved("offline"))
            .unwrap();

        let timeline = project.timeline(timeline).unwrap();
        assert_eq!(timeline.clips().len(), 1);
        assert!(timeline.sources().is_empty());
    }
}
