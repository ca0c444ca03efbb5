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
use mediatrim_core::{FrameRate, Project, RationalTime};
use std::path::PathBuf;
use tracing::info;

/// Lay a plan's segments end to end as a new timeline manifest
#[derive(Parser, Debug)]
pub struct ConformCmd {
    /// Plan file written by `mediatrim plan`
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Timeline rate as fps or an exact `num/den` (defaults to the configured rate)
    #[arg(long, value_name = "FPS")]
    pub rate: Option<String>,

    /// Timeline name
    #[arg(long)]
    pub name: Option<String>,

    /// Write the manifest here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ConformCmd {
    /// Build the consolidated timeline and export it
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let plan = ctx.read_plan(&self.plan).await?;
        let rate = self
            .rate
            .as_deref()
            .map(str::parse::<FrameRate>)
            .transpose()
            .context("Invalid --rate")?;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| ctx.config.output.timeline_name.clone());

        let mut project = Project::new();
        let timeline = project.consolidated_timeline(&plan, name, rate, ctx.default_rate)?;
        let manifest = project.export_timeline(timeline)?;

        ctx.emit(self.output.as_deref(), &ctx.to_json(&manifest)?).await?;
        info!(timeline = %manifest.name, clips = manifest.clips.len(), "Consolidated timeline exported");

        if let (Some(path), false) = (&self.output, ctx.quiet) {
            output::success(&format!("Consolidated timeline written to {}", path.display()));
            output::detail("Clips", &manifest.clips.len().to_string());
            if let Some(end) = manifest.clips.last().and_then(|clip| clip.timeline_end) {
                let rate = manifest.rate.unwrap_or(ctx.default_rate);
                output::detail(
                    "Length",
                    &output::format_duration(&RationalTime::new(end, rate)),
                );
            }
        }

        Ok(())
    }
}
