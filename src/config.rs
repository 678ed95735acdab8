//! Client configuration.
//!
//! Settings come from an optional TOML file, overridden by environment
//! variables prefixed with `PHOTONDB_REQL_` (for example
//! `PHOTONDB_REQL_DEFAULT_DB=app`).
//!
//! ```toml
//! default_db = "app"
//! durability = "soft"
//! read_mode = "majority"
//! array_limit = 200000
//! time_format = "raw"
//! ```

use crate::error::Result;
use crate::query::RunOptions;
use crate::reql::{Durability, ReadMode};
use crate::response::{BinaryFormat, FormatOptions, GroupFormat, TimeFormat};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PHOTONDB_REQL";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Database used by queries that do not name one.
    pub default_db: Option<String>,
    pub durability: Option<Durability>,
    pub read_mode: Option<ReadMode>,
    /// Ask the server for query profiles.
    pub profile: bool,
    /// Largest array the server may build for a query.
    pub array_limit: Option<u64>,
    pub time_format: TimeFormat,
    pub binary_format: BinaryFormat,
    pub group_format: GroupFormat,
}

impl ClientConfig {
    /// Load from `path` (if given and present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config: ClientConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        debug!(?config, "Loaded client configuration");
        Ok(config)
    }

    /// Parse TOML text; the environment is not consulted.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }

    /// Global optargs for START queries.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            db: self.default_db.clone(),
            durability: self.durability,
            read_mode: self.read_mode,
            profile: self.profile.then_some(true),
            array_limit: self.array_limit,
            ..Default::default()
        }
    }

    /// Client-side output formats for the deserializer.
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            time_format: self.time_format,
            binary_format: self.binary_format,
            group_format: self.group_format,
        }
    }
}
