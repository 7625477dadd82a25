// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run configuration

use crate::error::{Result, XcsgError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default curve approximation tolerance when the scene root does not set one
pub const DEFAULT_SECANT_TOLERANCE: f64 = 0.01;

/// Default ceiling on boolean operations per model
pub const DEFAULT_MAX_BOOL: usize = 100_000;

const CONFIG_FILE: &str = "xcsg.toml";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum boolean operations a single model may request
    pub max_bool: usize,
    /// Secant tolerance used when the scene root has none
    pub default_secant_tolerance: f64,
    /// Show a progress bar during boolean reduction
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_bool: DEFAULT_MAX_BOOL,
            default_secant_tolerance: DEFAULT_SECANT_TOLERANCE,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            XcsgError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| XcsgError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| XcsgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// An explicit path wins; otherwise `xcsg.toml` in the working directory is used
    /// when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };

        if let Ok(max_bool) = std::env::var("XCSG_MAX_BOOL") {
            config.max_bool = max_bool
                .parse()
                .map_err(|_| XcsgError::Config(format!("XCSG_MAX_BOOL='{}'", max_bool)))?;
        }

        if let Ok(progress) = std::env::var("XCSG_PROGRESS") {
            config.progress = progress == "1" || progress.to_lowercase() == "true";
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_secant_tolerance > 0.0) {
            return Err(XcsgError::Config(format!(
                "default_secant_tolerance must be positive, got {}",
                self.default_secant_tolerance
            )));
        }
        Ok(())
    }
}
