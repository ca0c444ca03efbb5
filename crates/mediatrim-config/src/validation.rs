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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Validator for configuration settings
pub trait Validator {
    /// Check the section, naming the first offending field
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.defaults.validate()?;
        self.consolidation.validate()?;
        self.output.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for DefaultsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::invalid_value(
                "defaults.frame_rate",
                format!("must be a positive number of frames per second, got {}", self.frame_rate),
            ));
        }
        Ok(())
    }
}

impl Validator for ConsolidationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.min_gap_duration.is_finite() || self.min_gap_duration < 0.0 {
            return Err(ConfigError::invalid_value(
                "consolidation.min_gap_duration",
                format!("must be zero or more seconds, got {}", self.min_gap_duration),
            ));
        }

        if self.start_handles < 0 {
            return Err(ConfigError::invalid_value(
                "consolidation.start_handles",
                format!("must be zero or more frames, got {}", self.start_handles),
            ));
        }

        if let Some(end) = self.end_handles {
            if end < 0 {
                return Err(ConfigError::invalid_value(
                    "consolidation.end_handles",
                    format!("must be zero or more frames, got {}", end),
                ));
            }
        }

        Ok(())
    }
}

impl Validator for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.plan_name.trim().is_empty() {
            return Err(ConfigError::EmptyName("output.plan_name".to_string()));
        }
        if self.timeline_name.trim().is_empty() {
            return Err(ConfigError::EmptyName("output.timeline_name".to_string()));
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", LOG_LEVELS.join(", ")),
            ));
        }

        if !LOG_FORMATS.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", LOG_FORMATS.join(", ")),
            ));
        }

        Ok(())
    }
}
