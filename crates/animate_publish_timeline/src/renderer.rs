// SPDX-License-Identifier: MIT OR Apache-2.0
//! Template collaborator and per-pass render state.

use crate::codegen::CallNames;
use crate::config::RenderSettings;
use crate::error::{RenderError, TemplateError};
use crate::library::{ItemId, Library};
use crate::timeline::Timeline;
use std::collections::HashSet;

/// Template name for verbose timeline output
pub const TIMELINE_TEMPLATE: &str = "timeline";

/// Template name for compressed timeline output
pub const TIMELINE_TINY_TEMPLATE: &str = "timeline-tiny";

/// Supplies named templates and the lexical mode
pub trait Renderer {
    /// Whether output uses the size-compressed lexical mode
    fn compress(&self) -> bool;

    /// Substitute `context` fields into the named template
    fn template(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError>;
}

/// State of one render pass over a library
///
/// Tracks which definitions are being rendered so cyclic placements fail
/// instead of recursing, and collects each rendered definition once.
pub struct RenderContext<'a> {
    library: &'a Library,
    renderer: &'a dyn Renderer,
    settings: RenderSettings,
    active: Vec<ItemId>,
    emitted: HashSet<ItemId>,
    definitions: Vec<String>,
}

impl<'a> RenderContext<'a> {
    /// Create a context with default settings
    pub fn new(library: &'a Library, renderer: &'a dyn Renderer) -> Self {
        Self {
            library,
            renderer,
            settings: RenderSettings::default(),
            active: Vec::new(),
            emitted: HashSet::new(),
            definitions: Vec::new(),
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the renderer
    pub fn renderer(&self) -> &'a dyn Renderer {
        self.renderer
    }

    /// Get the library definitions resolve against
    pub fn library(&self) -> &'a Library {
        self.library
    }

    /// Get the settings
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Whether the renderer is in compressed mode
    pub fn compress(&self) -> bool {
        self.renderer.compress()
    }

    /// Call names for the renderer's mode
    pub fn names(&self) -> CallNames {
        CallNames::for_mode(self.compress())
    }

    /// Resolve a definition
    pub fn definition(&self, id: ItemId) -> Result<&'a Timeline, RenderError> {
        self.library.get(id).ok_or(RenderError::MissingDefinition(id))
    }

    /// Render a definition into this pass unless it was already emitted
    pub fn require(&mut self, id: ItemId) -> Result<(), RenderError> {
        if self.is_emitted(id) {
            return Ok(());
        }

        if self.active.contains(&id) {
            let mut chain = self.active.clone();
            chain.push(id);
            tracing::warn!(?chain, "Cyclic definition, aborting render");
            return Err(RenderError::Cycle { chain });
        }

        let limit = self.settings.max_depth;
        if self.active.len() >= limit {
            tracing::warn!(definition = %id, limit, "Render depth exceeded");
            return Err(RenderError::DepthExceeded { limit });
        }

        let timeline = self.definition(id)?;
        self.active.push(id);
        let result = timeline.render(self);
        self.active.pop();

        self.definitions.push(result?);
        self.emitted.insert(id);
        Ok(())
    }

    /// Whether a definition was emitted in this pass
    pub fn is_emitted(&self, id: ItemId) -> bool {
        self.emitted.contains(&id)
    }

    /// Definitions rendered so far, dependencies first
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    /// Consume the context, returning the rendered definitions
    pub fn into_definitions(self) -> Vec<String> {
        self.definitions
    }
}
