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
use anyhow::Result;
use clap::Parser;
use mediatrim_core::{PlanStatistics, TransferPlan};
use std::path::PathBuf;

/// Show transfer plan statistics
#[derive(Parser, Debug)]
pub struct StatsCmd {
    /// Plan file written by `mediatrim plan`
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCmd {
    /// Print the plan's statistics
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let plan = ctx.read_plan(&self.plan).await?;
        let statistics = plan.statistics(ctx.default_rate)?;

        if self.json {
            println!("{}", ctx.to_json(&statistics)?);
            return Ok(());
        }

        print_statistics(&plan, &statistics);
        Ok(())
    }
}

fn print_statistics(plan: &TransferPlan, statistics: &PlanStatistics) {
    output::header(&format!("Transfer plan '{}'\n", plan.name()));

    output::section("Plan:");
    output::detail("Timelines", &statistics.timeline_count.to_string());
    output::detail("Segments", &statistics.segment_count.to_string());
    output::detail("Sources", &statistics.unique_source_count.to_string());
    output::detail(
        "Total duration",
        &output::format_duration(&statistics.total_duration),
    );
    output::detail(
        "Merge tolerance",
        &format!("{}s", statistics.min_gap_duration),
    );
    output::detail(
        "Handles",
        &format!(
            "{} frames before, {} frames after",
            statistics.start_handles, statistics.end_handles
        ),
    );
    println!();

    if statistics.segments_per_source.is_empty() {
        return;
    }

    output::section("Per source:");
    for (source, count) in &statistics.segments_per_source {
        let duration = statistics
            .duration_per_source
            .get(source)
            .map(output::format_duration)
            .unwrap_or_default();
        output::detail(source, &format!("{} segment(s), {}", count, duration));
    }
}
