// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared helpers for unit tests.

use crate::error::TemplateError;
use crate::library::{ItemId, Library};
use crate::renderer::Renderer;
use crate::timeline::{Timeline, TimelineKind};

/// Renderer with fixed `${field}` templates
///
/// - `timeline`: `[${id}|${duration}${labels}]{${contents}}`
/// - `timeline-tiny`: `<${id}|${duration}${labels}>{${contents}}`
pub struct StubRenderer {
    pub compress: bool,
}

impl StubRenderer {
    pub fn verbose() -> Self {
        Self { compress: false }
    }

    pub fn compressed() -> Self {
        Self { compress: true }
    }
}

impl Renderer for StubRenderer {
    fn compress(&self) -> bool {
        self.compress
    }

    fn template(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError> {
        let mut text = match name {
            "timeline" => "[${id}|${duration}${labels}]{${contents}}".to_string(),
            "timeline-tiny" => "<${id}|${duration}${labels}>{${contents}}".to_string(),
            other => return Err(TemplateError::UnknownTemplate(other.to_string())),
        };
        let fields = context.as_object().ok_or_else(|| TemplateError::Render {
            name: name.to_string(),
            reason: "context is not an object".to_string(),
        })?;
        for (key, value) in fields {
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("${{{key}}}"), &replacement);
        }
        Ok(text)
    }
}

/// Movie clip timeline with no frames or instances
pub fn timeline(id: u32, name: &str, total_frames: u32) -> Timeline {
    Timeline::new(ItemId(id), TimelineKind::MovieClip, name, total_frames)
}

/// Library holding the given timelines
pub fn library(timelines: Vec<Timeline>) -> Library {
    let mut library = Library::new();
    for timeline in timelines {
        library.add(timeline);
    }
    library
}
