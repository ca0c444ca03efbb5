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
use mediatrim_core::{estimate_savings, RationalTime, Savings, SavingsEstimate};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Estimate how much footage a plan avoids transferring
#[derive(Parser, Debug)]
pub struct SavingsCmd {
    /// Plan file written by `mediatrim plan`
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Known full length of a source, as PATH=SECONDS (repeatable).
    /// When given, only the listed sources form the baseline.
    #[arg(long = "original", value_name = "PATH=SECONDS", value_parser = parse_original)]
    pub originals: Vec<(String, f64)>,

    /// Format as JSON
    #[arg(long)]
    pub json: bool,
}

impl SavingsCmd {
    /// Print the savings estimate
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let plan = ctx.read_plan(&self.plan).await?;
        let rate = plan.statistics(ctx.default_rate)?.rate();

        let originals = if self.originals.is_empty() {
            None
        } else {
            let mut durations = BTreeMap::new();
            for (path, seconds) in &self.originals {
                durations.insert(path.clone(), RationalTime::from_seconds(*seconds, rate)?);
            }
            Some(durations)
        };

        let estimate = estimate_savings(&plan, originals.as_ref(), ctx.default_rate)?;

        if self.json {
            println!("{}", ctx.to_json(&estimate)?);
        } else {
            print_estimate(&estimate);
        }
        Ok(())
    }
}

/// Parse `PATH=SECONDS`, splitting on the last `=`
pub fn parse_original(value: &str) -> Result<(String, f64), String> {
    let (path, seconds) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=SECONDS, got '{}'", value))?;
    if path.is_empty() {
        return Err(format!("missing source path in '{}'", value));
    }
    let seconds: f64 = seconds
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration '{}' in '{}'", seconds, value))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("duration must be zero or more seconds in '{}'", value));
    }
    Ok((path.to_string(), seconds))
}

fn print_estimate(estimate: &SavingsEstimate) {
    output::header("Transfer savings\n");

    let baseline = if estimate.original_is_estimated {
        "Original (estimated from segment extents)"
    } else {
        "Original"
    };
    output::detail(baseline, &output::format_duration(&estimate.original_duration));
    output::detail(
        "Optimized",
        &output::format_duration(&estimate.optimized_duration),
    );

    match estimate.savings {
        Savings::Percent(percent) => output::detail("Savings", &format!("{:.1}%", percent)),
        Savings::NotApplicable => {
            output::detail("Savings", "n/a");
            output::warning("Original duration is zero; savings are undefined");
        }
    }
}
