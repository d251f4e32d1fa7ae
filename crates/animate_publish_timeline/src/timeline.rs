// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline definitions and their code generation.

use crate::codegen::{CallNames, Chain, RECEIVER};
use crate::container::Container;
use crate::error::RenderError;
use crate::frame::Frame;
use crate::instance::Instance;
use crate::library::ItemId;
use crate::renderer::{RenderContext, TIMELINE_TEMPLATE, TIMELINE_TINY_TEMPLATE};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Frame label name to frame index
pub type Labels = IndexMap<String, u32>;

/// Kind of timeline definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    /// Document root
    Stage,
    /// Independently playing symbol
    MovieClip,
    /// Symbol synched to its parent's playhead
    Graphic,
}

impl TimelineKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stage => "Stage",
            Self::MovieClip => "MovieClip",
            Self::Graphic => "Graphic",
        }
    }
}

/// An animation definition: frames plus child placements
#[derive(Debug, Clone)]
pub struct Timeline {
    /// Library id
    pub id: ItemId,
    /// Definition kind
    pub kind: TimelineKind,
    /// Full playback duration in frames
    pub total_frames: u32,
    container: Container,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(id: ItemId, kind: TimelineKind, name: impl Into<String>, total_frames: u32) -> Self {
        Self {
            id,
            kind,
            total_frames,
            container: Container::new(name),
        }
    }

    /// Get the name
    pub fn name(&self) -> &str {
        self.container.name()
    }

    /// Get the shared storage
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Get the shared storage mutably
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Get all child placements
    pub fn instances(&self) -> &[Instance] {
        self.container.instances()
    }

    /// Get all frames
    pub fn frames(&self) -> &[Frame] {
        self.container.frames()
    }

    /// Append a child placement
    pub fn add_instance(&mut self, instance: Instance) {
        self.container.add_instance(instance);
    }

    /// Add a frame in index order
    pub fn add_frame(&mut self, frame: Frame) {
        self.container.add_frame(frame);
    }

    /// Template used for the given mode
    pub fn template_name(compress: bool) -> &'static str {
        if compress {
            TIMELINE_TINY_TEMPLATE
        } else {
            TIMELINE_TEMPLATE
        }
    }

    /// Render the full definition through the renderer's template
    pub fn render(&self, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        tracing::debug!(
            timeline = self.name(),
            kind = self.kind.name(),
            instances = self.instances().len(),
            "Rendering timeline"
        );

        let compress = cx.compress();
        let labels = self.labels();

        let mut options = serde_json::Map::new();
        options.insert("duration".to_string(), json!(self.total_frames));
        let labels_text = if labels.is_empty() {
            String::new()
        } else {
            options.insert("labels".to_string(), serde_json::to_value(&labels)?);
            format!(", {}", serde_json::to_string(&labels)?)
        };

        let context = json!({
            "id": self.name(),
            "options": options,
            "duration": self.total_frames,
            "labels": labels_text,
            "contents": self.contents(cx)?,
        });

        Ok(cx.renderer().template(Self::template_name(compress), &context)?)
    }

    /// Child construction followed by frame script registration
    pub fn contents(&self, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let mut out = self.children(cx)?;
        out.push_str(&self.frame_scripts(cx.compress()));
        Ok(out)
    }

    /// Statements constructing and placing every child
    ///
    /// A child that is on stage unchanged for the whole duration is static and
    /// goes into one batched add call, in reverse declaration order since the
    /// runtime stacks later arguments below earlier ones. Every other child
    /// gets its own timed call.
    pub fn children(&self, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let names = cx.names();
        let compress = cx.compress();
        let precision = cx.settings().precision;
        let total = i64::from(self.total_frames);

        let mut buffer = String::new();
        let mut chain = Chain::new(RECEIVER);
        let mut statics = Vec::new();

        for instance in self.instances() {
            buffer.push_str(&instance.render(cx)?);

            let duration = instance.duration(self.total_frames);
            let frames = instance.frames_with_precision(compress, precision);

            if frames.is_none() && instance.start_frame == 0 && duration == total {
                tracing::trace!(instance = %instance.local_name, "Static child");
                statics.push(instance.local_name.as_str());
            } else {
                tracing::trace!(instance = %instance.local_name, duration, "Timed child");
                let mut args = vec![
                    instance.local_name.clone(),
                    instance.start_frame.to_string(),
                    duration.to_string(),
                ];
                args.extend(frames);
                chain.call(names.add_timed_child, args);
            }
        }

        if !statics.is_empty() {
            statics.reverse();
            chain.call(names.add_child, statics);
        }

        buffer.push_str(&chain.finish());
        Ok(buffer)
    }

    /// Script registration statements, empty when no frame has scripts
    pub fn frame_scripts(&self, compress: bool) -> String {
        let add_action = CallNames::for_mode(compress).add_action;
        let mut chain = Chain::new(RECEIVER);

        for frame in self.frames().iter().filter(|f| f.has_scripts()) {
            for script in frame.scripts() {
                chain.call(
                    add_action,
                    [format!("function(){{\n{}}}", script.code()), frame.index.to_string()],
                );
            }
        }

        chain.finish()
    }

    /// Label map; a repeated label keeps the later frame
    pub fn labels(&self) -> Labels {
        let mut labels = Labels::new();
        for frame in self.frames() {
            if let Some(label) = &frame.label {
                labels.insert(label.clone(), frame.index);
            }
        }
        labels
    }

    /// Create a placement of this timeline for embedding in a parent
    pub fn create(&self, id: u32) -> Instance {
        Instance::new(self.id, id)
    }
}
