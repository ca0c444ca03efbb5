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
use crate::schema::Config;
use crate::validation::Validator;
use mediatrim_core::MergeOrder;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "mediatrim.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "MEDIATRIM_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::NoExtension(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Find [`DEFAULT_CONFIG_FILE`] in `dir`
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        debug!("Configuration loaded from {}", format.name());

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Load a file (or the defaults when `path` is `None`) and apply
    /// environment overrides on top
    pub async fn load_with_overrides<P: AsRef<Path>>(
        &self,
        path: Option<P>,
    ) -> ConfigResult<Config> {
        let mut config = match path {
            Some(path) => self.load_file(path).await?,
            None => Config::default(),
        };
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply `MEDIATRIM_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, keyed by full variable name
    pub fn apply_overrides_from<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let name = format!("{}{}", ENV_PREFIX, suffix);
            lookup(&name).map(|value| (name, value))
        };

        if let Some((name, value)) = var("FRAME_RATE") {
            config.defaults.frame_rate = parse_env(&name, &value, "expected frames per second")?;
        }
        if let Some((name, value)) = var("MIN_GAP") {
            config.consolidation.min_gap_duration =
                parse_env(&name, &value, "expected a duration in seconds")?;
        }
        if let Some((name, value)) = var("START_HANDLES") {
            config.consolidation.start_handles =
                parse_env(&name, &value, "expected a frame count")?;
        }
        if let Some((name, value)) = var("END_HANDLES") {
            config.consolidation.end_handles =
                Some(parse_env(&name, &value, "expected a frame count")?);
        }
        if let Some((name, value)) = var("MERGE_ORDER") {
            config.consolidation.merge_order = parse_merge_order(&name, &value)?;
        }
        if let Some((_, value)) = var("LOG_LEVEL") {
            config.observability.log_level = value;
        }
        if let Some((_, value)) = var("LOG_FORMAT") {
            config.observability.log_format = value;
        }

        if self.validate {
            config.validate()?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str, reason: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::bad_override(name, value, reason))
}

fn parse_merge_order(name: &str, value: &str) -> ConfigResult<MergeOrder> {
    match value.trim().to_lowercase().replace('_', "-").as_str() {
        "merge-then-pad" => Ok(MergeOrder::MergeThenPad),
        "pad-then-merge" => Ok(MergeOrder::PadThenMerge),
        _ => Err(ConfigError::bad_override(
            name,
            value,
            "expected 'merge-then-pad' or 'pad-then-merge'",
        )),
    }
}
