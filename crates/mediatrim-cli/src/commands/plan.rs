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
use crate::context::AppContext;
use crate::output;
use anyhow::{Context, Result};
use clap::Parser;
use mediatrim_core::{
    consolidate, normalize_handles, ConsolidationOptions, MergeOrder, Project, TimelineId,
    TimelineManifest,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Consolidate timeline manifests into a transfer plan
#[derive(Parser, Debug)]
pub struct PlanCmd {
    /// Timeline manifests (JSON) to consolidate
    #[arg(required = true, value_name = "MANIFEST")]
    pub manifests: Vec<PathBuf>,

    /// Largest gap in seconds that still merges two ranges
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub min_gap: Option<f64>,

    /// Frames of padding before (and, unless --end-handles is given, after) each segment
    #[arg(long, value_name = "FRAMES", allow_negative_numbers = true)]
    pub handles: Option<i64>,

    /// Frames of padding after each segment
    #[arg(long, value_name = "FRAMES", allow_negative_numbers = true)]
    pub end_handles: Option<i64>,

    /// Pad every clip before merging instead of padding merged windows
    #[arg(long)]
    pub pad_then_merge: bool,

    /// Plan name
    #[arg(long)]
    pub name: Option<String>,

    /// Write the plan here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl PlanCmd {
    /// Consolidation options: configuration first, flags on top
    pub fn options(&self, ctx: &AppContext) -> ConsolidationOptions {
        let consolidation = &ctx.config.consolidation;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| ctx.config.output.plan_name.clone());
        let mut options = ctx.config.consolidation_options(name);

        if let Some(min_gap) = self.min_gap {
            options.min_gap_duration = min_gap;
        }

        if self.handles.is_some() || self.end_handles.is_some() {
            let start = self.handles.unwrap_or(consolidation.start_handles);
            // an explicit --handles re-derives the end unless --end-handles is also given
            let end = match (self.handles, self.end_handles) {
                (_, Some(end)) => Some(end),
                (Some(_), None) => None,
                (None, None) => consolidation.end_handles,
            };
            options.handles = normalize_handles(start, end);
        }

        if self.pad_then_merge {
            options.merge_order = MergeOrder::PadThenMerge;
        }

        options
    }

    /// Load every manifest into one project and consolidate them
    #[instrument(skip_all, fields(manifests = self.manifests.len()))]
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let mut project = Project::new();
        let mut timelines = Vec::with_capacity(self.manifests.len());
        for path in &self.manifests {
            timelines.push(load_manifest(&mut project, path, ctx).await?);
        }

        let options = self.options(ctx);
        let plan = consolidate(&project, &timelines, &options)?;
        let record = plan.to_record(ctx.default_rate)?;
        ctx.emit(self.output.as_deref(), &ctx.to_json(&record)?).await?;

        info!(plan = plan.name(), segments = plan.segments().len(), "Plan built");

        if let (Some(path), false) = (&self.output, ctx.quiet) {
            output::success(&format!("Transfer plan written to {}", path.display()));
            output::detail("Timelines", &timelines.len().to_string());
            output::detail("Segments", &plan.segments().len().to_string());
            if let Some(statistics) = &record.statistics {
                output::detail("Sources", &statistics.unique_source_count.to_string());
                output::detail(
                    "Total duration",
                    &output::format_duration(&statistics.total_duration),
                );
            }
        }

        Ok(())
    }
}

async fn load_manifest(project: &mut Project, path: &Path, ctx: &AppContext) -> Result<TimelineId> {
    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest = TimelineManifest::from_json(&json)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    manifest
        .load_into(project, ctx.default_rate)
        .with_context(|| format!("Invalid manifest {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mediatrim_config::Config;
    use mediatrim_core::Handles;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: PlanCmd,
    }

    fn parse(args: &[&str]) -> PlanCmd {
        let mut argv = vec!["plan"];
        argv.extend_from_slice(args);
        Harness::parse_from(argv).cmd
    }

    fn context(start: i64, end: Option<i64>) -> AppContext {
        let mut config = Config::default();
        config.consolidation.start_handles = start;
        config.consolidation.end_handles = end;
        AppContext::new(config, true).unwrap()
    }

    #[test]
    fn test_options_from_config() {
        let options = parse(&["a.json"]).options(&context(6, Some(2)));
        assert_eq!(options.plan_name, "transfer_plan");
        assert_eq!(options.min_gap_duration, 1.0);
        assert_eq!(options.handles.start(), 6);
        assert_eq!(options.handles.end(), 2);
        assert_eq!(options.merge_order, MergeOrder::MergeThenPad);
    }

    #[test]
    fn test_handles_flag_overrides_both_sides() {
        let options = parse(&["a.json", "--handles", "10"]).options(&context(6, Some(2)));
        assert_eq!(options.handles, Handles::symmetric(10));
    }

    #[test]
    fn test_end_handles_flag_alone() {
        let options = parse(&["a.json", "--end-handles", "3"]).options(&context(6, None));
        assert_eq!(options.handles.start(), 6);
        assert_eq!(options.handles.end(), 3);
    }

    #[test]
    fn test_flags() {
        let options = parse(&[
            "a.json",
            "b.json",
            "--min-gap",
            "0.25",
            "--pad-then-merge",
            "--name",
            "reel",
        ])
        .options(&context(0, None));
        assert_eq!(options.plan_name, "reel");
        assert_eq!(options.min_gap_duration, 0.25);
        assert_eq!(options.merge_order, MergeOrder::PadThenMerge);
    }
}
