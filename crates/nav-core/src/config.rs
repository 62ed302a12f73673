//! Controller configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavigationError, Result};

/// Default bound on consecutive open redirects.
pub const DEFAULT_MAX_REDIRECT_DEPTH: usize = 5;

/// What a container does when its backstack becomes empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBehavior {
    /// Leave the container empty.
    #[default]
    AllowEmpty,
    /// Close the destination that hosts the container.
    CloseParent,
}

/// Settings shared by every root and container of a controller.
///
/// Loaded from TOML; every field is optional:
///
/// ```toml
/// strict_mode = true
/// max_redirect_depth = 5
/// default_empty_behavior = "close_parent"
/// log_transitions = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Treat instructions no container accepts as errors instead of warnings.
    pub strict_mode: bool,
    /// Consecutive open redirects allowed before dispatch fails.
    pub max_redirect_depth: usize,
    /// Empty behavior for containers that do not choose one.
    pub default_empty_behavior: EmptyBehavior,
    /// Log every committed transition at debug level.
    pub log_transitions: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_redirect_depth: DEFAULT_MAX_REDIRECT_DEPTH,
            default_empty_behavior: EmptyBehavior::AllowEmpty,
            log_transitions: false,
        }
    }
}

impl NavigationConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| NavigationError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| NavigationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_mode = true;
        self
    }
}
