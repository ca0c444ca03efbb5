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
use std::path::PathBuf;
use thiserror::Error;

/// Why MediaTrim settings could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings are not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("settings are not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `Config::save` could not render the settings
    #[error("cannot write settings: {0}")]
    Save(String),

    /// Extension other than toml, yaml, yml or json
    #[error("settings files must end in .toml, .yaml, .yml or .json, not .{0}")]
    UnsupportedFormat(String),

    #[error("no settings file at {}", .0.display())]
    NotFound(PathBuf),

    /// No extension to pick a format from
    #[error("cannot tell the settings format of {} (no file extension)", .0.display())]
    NoExtension(PathBuf),

    /// A `MEDIATRIM_*` variable holds something unusable
    #[error("{variable}={value:?} is not valid: {expected}")]
    BadOverride {
        /// Variable name
        variable: String,
        /// Raw value
        value: String,
        /// What the variable should contain
        expected: String,
    },

    /// A consolidation, output or logging setting is out of range
    #[error("setting '{field}' {reason}")]
    InvalidValue {
        /// Dotted setting path, e.g. `consolidation.min_gap_duration`
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A name used for generated plans or timelines is blank
    #[error("setting '{0}' must not be empty")]
    EmptyName(String),
}

impl ConfigError {
    pub(crate) fn bad_override(
        variable: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ConfigError::BadOverride {
            variable: variable.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Build a [`ConfigError::InvalidValue`]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
