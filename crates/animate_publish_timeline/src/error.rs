// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for loading and rendering timelines.

use crate::library::ItemId;

/// Error raised by a [`Renderer`](crate::renderer::Renderer) template lookup
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template registered under this name
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Template exists but substitution failed
    #[error("Template {name} failed: {reason}")]
    Render {
        /// Template name
        name: String,
        /// Failure description
        reason: String,
    },
}

/// Error while rendering a timeline
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A definition places itself, directly or through its children
    #[error("Cyclic definition chain: {chain:?}")]
    Cycle {
        /// Definitions being rendered, outermost first, ending with the repeat
        chain: Vec<ItemId>,
    },

    /// Nesting went deeper than the configured limit
    #[error("Render depth exceeded limit of {limit}")]
    DepthExceeded {
        /// Configured maximum depth
        limit: usize,
    },

    /// An instance references a definition the library does not have
    #[error("Definition not found: {0}")]
    MissingDefinition(ItemId),

    /// Template collaborator failed
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Label or option serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error while loading an exported document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Document is not valid JSON for the exporter format
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// Document could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two timelines share an asset id
    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(ItemId),

    /// A place command references an unknown asset
    #[error("Timeline {parent} places unknown asset {asset}")]
    MissingDefinition {
        /// Timeline containing the place command
        parent: ItemId,
        /// Referenced asset id
        asset: ItemId,
    },

    /// A move or remove command targets an instance that is not on stage
    #[error("Timeline {timeline} frame {frame}: no placed instance {instance}")]
    UnknownInstance {
        /// Timeline containing the command
        timeline: ItemId,
        /// Frame index of the command
        frame: u32,
        /// Instance id the command targets
        instance: u32,
    },
}

/// Error reading or writing render settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}
