// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render settings.
//!
//! Settings are stored as RON so a publishing pipeline can keep them next to
//! the exported document.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default library namespace for definition references
pub const DEFAULT_NAMESPACE: &str = "lib";

/// Default maximum nesting depth of definitions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default decimal places for emitted numbers
pub const DEFAULT_PRECISION: u32 = 4;

/// Most decimal places an `f32` value can meaningfully carry
pub const MAX_PRECISION: u32 = 9;

/// Settings shared by every render in a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Namespace prefixed to definition names in construction statements
    pub namespace: String,
    /// Maximum depth of nested definition rendering
    pub max_depth: usize,
    /// Decimal places kept in transform and keyframe values, at most
    /// [`MAX_PRECISION`]
    pub precision: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl RenderSettings {
    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = ron::from_str(s)?;
        if settings.precision > MAX_PRECISION {
            tracing::warn!(
                precision = settings.precision,
                max = MAX_PRECISION,
                "Precision capped"
            );
        }
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
