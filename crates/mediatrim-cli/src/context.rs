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
//! State shared by every command: the resolved configuration, the default
//! frame rate derived from it, and helpers for plan files.

use anyhow::{Context, Result};
use mediatrim_config::{Config, ConfigLoader};
use mediatrim_core::{FrameRate, TransferPlan, TransferPlanRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Resolved configuration and global flags
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Effective configuration after file and environment layers
    pub config: Config,
    /// Rate applied to inputs that state none
    pub default_rate: FrameRate,
    /// Suppress human-readable chatter
    pub quiet: bool,
}

impl AppContext {
    /// Build a context from an explicit configuration
    pub fn new(config: Config, quiet: bool) -> Result<Self> {
        let default_rate = config
            .default_rate()
            .context("Invalid default frame rate in configuration")?;
        Ok(AppContext {
            config,
            default_rate,
            quiet,
        })
    }

    /// Load configuration from `path`, or from `mediatrim.toml` in the
    /// working directory when present, then apply environment overrides
    pub async fn load(path: Option<&Path>, quiet: bool) -> Result<Self> {
        let path: Option<PathBuf> = match path {
            Some(path) => Some(path.to_path_buf()),
            None => ConfigLoader::discover(std::env::current_dir()?),
        };

        let config = ConfigLoader::new()
            .load_with_overrides(path.as_deref())
            .await
            .with_context(|| match &path {
                Some(path) => format!("Failed to load configuration from {}", path.display()),
                None => "Failed to apply configuration overrides".to_string(),
            })?;

        Self::new(config, quiet)
    }

    /// Read a plan record and rebuild the plan
    pub async fn read_plan(&self, path: &Path) -> Result<TransferPlan> {
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        let record = TransferPlanRecord::from_json(&json)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?;
        let plan = TransferPlan::from_record(&record)
            .with_context(|| format!("Invalid plan {}", path.display()))?;

        debug!(plan = plan.name(), segments = plan.segments().len(), "Plan loaded");
        Ok(plan)
    }

    /// Serialize `value` honoring the `output.pretty` setting
    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.config.output.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Write `contents` to `path`, or to stdout when no path is given
    pub async fn emit(&self, path: Option<&Path>, contents: &str) -> Result<()> {
        match path {
            Some(path) => {
                fs::write(path, format!("{}\n", contents))
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                debug!(path = %path.display(), bytes = contents.len(), "Output written");
            }
            None => println!("{}", contents),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_context_derives_default_rate() {
        let mut config = Config::default();
        config.defaults.frame_rate = 25.0;
        let ctx = AppContext::new(config, false).unwrap();
        assert_eq!(ctx.default_rate, FrameRate::integer(25).unwrap());
    }

    #[test]
    fn test_context_rejects_bad_rate() {
        let mut config = Config::default();
        config.defaults.frame_rate = -1.0;
        assert!(AppContext::new(config, false).is_err());
    }

    #[test]
    fn test_compact_json() {
        let mut config = Config::default();
        config.output.pretty = false;
        let ctx = AppContext::new(config, false).unwrap();
        assert_eq!(ctx.to_json(&vec![1, 2]).unwrap(), "[1,2]");
    }
}
