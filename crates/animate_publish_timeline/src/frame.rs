// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame, label and script definitions.

use serde::{Deserialize, Serialize};

/// A frame script attached to a timeline frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    /// Raw source as exported, line breaks escaped as `\n`
    source: String,
}

impl Script {
    /// Create a script from exported source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Raw exported source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Source with escaped line breaks restored
    pub fn code(&self) -> String {
        self.source.replace("\\n", "\n")
    }
}

/// One addressable position along a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame index
    pub index: u32,
    /// Frame label name
    pub label: Option<String>,
    /// Scripts run when the frame is reached
    pub scripts: Option<Vec<Script>>,
}

impl Frame {
    /// Create an empty frame
    pub fn new(index: u32) -> Self {
        Self {
            index,
            label: None,
            scripts: None,
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a script
    pub fn with_script(mut self, script: Script) -> Self {
        self.scripts.get_or_insert_with(Vec::new).push(script);
        self
    }

    /// Scripts attached to this frame, empty if none
    pub fn scripts(&self) -> &[Script] {
        self.scripts.as_deref().unwrap_or_default()
    }

    /// Whether the frame carries at least one script
    pub fn has_scripts(&self) -> bool {
        !self.scripts().is_empty()
    }
}
