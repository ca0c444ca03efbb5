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
//! Configuration schema
//!
//! Every section carries serde defaults so that a partial file (or no file
//! at all) yields a usable configuration.

use crate::error::{ConfigError, ConfigResult};
use mediatrim_core::{normalize_handles, ConsolidationOptions, FrameRate, Handles, MergeOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Values applied where raw numbers enter the system
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Consolidation parameters
    #[serde(default)]
    pub consolidation: ConsolidationConfig,

    /// Names and formatting of written files
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Custom user-defined settings, carried into plan metadata by callers
    #[serde(default)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl Config {
    /// The default frame rate as an exact rate
    pub fn default_rate(&self) -> ConfigResult<FrameRate> {
        FrameRate::from_fps(self.defaults.frame_rate).map_err(|e| {
            ConfigError::invalid_value("defaults.frame_rate", format!("is not a usable rate ({})", e))
        })
    }

    /// Consolidation options for a plan called `plan_name`
    pub fn consolidation_options(&self, plan_name: impl Into<String>) -> ConsolidationOptions {
        ConsolidationOptions::new(plan_name, self.consolidation.min_gap_duration)
            .with_handles(self.consolidation.handles())
            .with_merge_order(self.consolidation.merge_order)
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Save(e.to_string()))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

/// Defaults applied at the input boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Frame rate for manifests, clips and sources that state none
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            frame_rate: default_frame_rate(),
        }
    }
}

/// Consolidation parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsolidationConfig {
    /// Largest gap in seconds that still merges two ranges
    #[serde(default = "default_min_gap")]
    pub min_gap_duration: f64,

    /// Frames of padding before each segment
    #[serde(default)]
    pub start_handles: i64,

    /// Frames of padding after each segment; defaults to `start_handles`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_handles: Option<i64>,

    /// Whether gaps are measured before or after padding
    #[serde(default)]
    pub merge_order: MergeOrder,
}

impl ConsolidationConfig {
    /// Normalized handles
    pub fn handles(&self) -> Handles {
        normalize_handles(self.start_handles, self.end_handles)
    }
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        ConsolidationConfig {
            min_gap_duration: default_min_gap(),
            start_handles: 0,
            end_handles: None,
            merge_order: MergeOrder::default(),
        }
    }
}

/// Output naming and formatting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Name of generated transfer plans
    #[serde(default = "default_plan_name")]
    pub plan_name: String,

    /// Name of generated consolidated timelines
    #[serde(default = "default_timeline_name")]
    pub timeline_name: String,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            plan_name: default_plan_name(),
            timeline_name: default_timeline_name(),
            pretty: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> f64 {
    24.0
}

fn default_min_gap() -> f64 {
    1.0
}

fn default_plan_name() -> String {
    "transfer_plan".to_string()
}

fn default_timeline_name() -> String {
    "consolidated".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
