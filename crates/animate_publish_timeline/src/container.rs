// SPDX-License-Identifier: MIT OR Apache-2.0
//! Name, instance and frame storage shared by every timeline kind.

use crate::frame::Frame;
use crate::instance::Instance;

/// Storage composed into each renderable definition
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Definition name, used as its identifier in generated code
    pub name: String,
    /// Child placements in document order
    instances: Vec<Instance>,
    /// Frames in ascending index order
    frames: Vec<Frame>,
}

impl Container {
    /// Create an empty container
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Get the name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child placement
    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Get all child placements
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Replace all child placements
    pub fn set_instances(&mut self, instances: Vec<Instance>) {
        self.instances = instances;
    }

    /// Insert a frame after any frames with an index not above its own
    pub fn add_frame(&mut self, frame: Frame) {
        let idx = self.frames.partition_point(|f| f.index <= frame.index);
        self.frames.insert(idx, frame);
    }

    /// Replace all frames as given, without reordering
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
    }

    /// Get all frames
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
