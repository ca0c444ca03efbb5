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
//! Configuration management for MediaTrim
//!
//! Layered configuration: built-in defaults, then an optional TOML, YAML or
//! JSON file, then `MEDIATRIM_*` environment overrides.
//!
//! # Features
//!
//! - Multi-format configuration support (TOML, YAML, JSON)
//! - Environment variable overrides with `MEDIATRIM_` prefix
//! - Validation with the offending field named in the error
//! - The one place where the default frame rate is defined
//!
//! # Example
//!
//! ```no_run
//! use mediatrim_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides(Some("mediatrim.toml")).await?;
//!
//!     println!("Default rate: {}", config.default_rate()?);
//!     println!("Merge tolerance: {}s", config.consolidation.min_gap_duration);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use schema::*;
pub use validation::Validator;
