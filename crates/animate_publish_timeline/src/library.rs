// SPDX-License-Identifier: MIT OR Apache-2.0
//! Library of timeline definitions loaded from an exported document.
//!
//! The exporter writes one entry per timeline with its frames; each frame
//! carries labels, scripts and display list commands. Loading replays the
//! commands into instance placements:
//! - `Place` opens an instance at the frame
//! - `Move` records a transform keyframe relative to the instance start
//! - `Remove` closes the instance at the frame
//! - `Visibility` and `ColorTransform` record visibility and alpha keyframes
//!
//! Stacking updates (`ZOrder`, the `placeAfter` field), masks and blend modes
//! have no counterpart in the generated calls and are skipped.

use crate::config::RenderSettings;
use crate::error::{LoadError, RenderError};
use crate::frame::{Frame, Script};
use crate::instance::{Instance, Matrix, Transform};
use crate::renderer::{RenderContext, Renderer};
use crate::timeline::{Timeline, TimelineKind};
use crate::validate::ValidationIssue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Asset id of a library definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Id the exporter gives the stage
    pub const STAGE: Self = Self(0);
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All timeline definitions of one document
#[derive(Debug, Clone, Default)]
pub struct Library {
    timelines: IndexMap<ItemId, Timeline>,
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timeline, replacing any with the same id
    pub fn add(&mut self, timeline: Timeline) -> ItemId {
        let id = timeline.id;
        self.timelines.insert(id, timeline);
        id
    }

    /// Get a timeline
    pub fn get(&self, id: ItemId) -> Option<&Timeline> {
        self.timelines.get(&id)
    }

    /// Get a mutable timeline
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Timeline> {
        self.timelines.get_mut(&id)
    }

    /// Get all timelines in document order
    pub fn timelines(&self) -> impl Iterator<Item = &Timeline> {
        self.timelines.values()
    }

    /// Get the stage timeline
    pub fn stage(&self) -> Option<&Timeline> {
        self.timelines().find(|t| t.kind == TimelineKind::Stage)
    }

    /// Get timeline count
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    /// Whether the library has no timelines
    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Load an exported document from a file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build a library from exported document JSON
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let document: DocumentData = serde_json::from_str(json)?;
        let mut library = Self::new();

        for data in &document.timelines {
            let id = ItemId(data.asset_id);
            if library.get(id).is_some() {
                return Err(LoadError::DuplicateDefinition(id));
            }
            let mut timeline = Timeline::new(id, data.kind, data.name.clone(), data.total_frames);
            timeline.container_mut().set_frames(data.frames.iter().map(FrameData::to_frame).collect());
            library.add(timeline);
        }

        // Definitions are all known now; placements can resolve them
        let mut placements = Vec::with_capacity(document.timelines.len());
        for data in &document.timelines {
            let id = ItemId(data.asset_id);
            placements.push((id, library.replay(id, &data.frames)?));
        }
        for (id, instances) in placements {
            if let Some(timeline) = library.get_mut(id) {
                timeline.container_mut().set_instances(instances);
            }
        }

        tracing::debug!(timelines = library.len(), "Loaded library");
        Ok(library)
    }

    fn replay(&self, id: ItemId, frames: &[FrameData]) -> Result<Vec<Instance>, LoadError> {
        let mut instances: Vec<Instance> = Vec::new();
        let mut on_stage: HashMap<u32, usize> = HashMap::new();
        let mut names: HashSet<String> = HashSet::new();

        for frame in frames {
            for command in &frame.commands {
                match command {
                    CommandData::Place {
                        asset_id,
                        instance_id,
                        transform,
                        instance_name,
                        looping,
                    } => {
                        let asset = ItemId(*asset_id);
                        let definition = self.get(asset).ok_or(LoadError::MissingDefinition {
                            parent: id,
                            asset,
                        })?;

                        let mut instance = definition.create(*instance_id);
                        if let Some(name) = instance_name.as_deref().filter(|n| !n.is_empty()) {
                            instance.local_name = name.to_string();
                        }
                        instance.local_name = unique_name(&mut names, &instance.local_name);
                        instance.start_frame = frame.frame;
                        instance.looping = *looping;
                        instance.set_keyframe(0, transform.unwrap_or_default().decompose());

                        if let Some(previous) = on_stage.insert(*instance_id, instances.len()) {
                            instances[previous].end_frame = frame.frame;
                        }
                        instances.push(instance);
                    }
                    CommandData::Move { instance_id, transform } => {
                        let idx = on_stage_index(&on_stage, id, frame.frame, *instance_id)?;
                        update(&mut instances[idx], frame.frame, |state| {
                            *state = state.with_matrix(transform);
                        });
                    }
                    CommandData::Visibility { instance_id, visibility } => {
                        let idx = on_stage_index(&on_stage, id, frame.frame, *instance_id)?;
                        update(&mut instances[idx], frame.frame, |state| state.visible = *visibility);
                    }
                    CommandData::ColorTransform { instance_id, color_matrix } => {
                        let idx = on_stage_index(&on_stage, id, frame.frame, *instance_id)?;
                        let alpha = color_matrix.get(ALPHA_MULTIPLIER).copied().unwrap_or(1.0);
                        update(&mut instances[idx], frame.frame, |state| state.alpha = alpha);
                    }
                    CommandData::Remove { instance_id } => {
                        let idx = on_stage.remove(instance_id).ok_or(LoadError::UnknownInstance {
                            timeline: id,
                            frame: frame.frame,
                            instance: *instance_id,
                        })?;
                        instances[idx].end_frame = frame.frame;
                    }
                    CommandData::Other => {
                        tracing::warn!(timeline = %id, frame = frame.frame, "Unsupported command ignored");
                    }
                }
            }
        }

        Ok(instances)
    }

    /// Render every definition, dependencies before the timelines placing them
    pub fn render(&self, renderer: &dyn Renderer) -> Result<String, RenderError> {
        self.render_with(renderer, RenderSettings::default())
    }

    /// [`Library::render`] with explicit settings
    pub fn render_with(
        &self,
        renderer: &dyn Renderer,
        settings: RenderSettings,
    ) -> Result<String, RenderError> {
        let mut cx = RenderContext::new(self, renderer).with_settings(settings);
        for id in self.timelines.keys() {
            cx.require(*id)?;
        }
        Ok(cx.into_definitions().join("\n"))
    }

    /// Run opt-in validation over every timeline
    pub fn validate(&self) -> Vec<(ItemId, ValidationIssue)> {
        let mut issues = Vec::new();
        for timeline in self.timelines() {
            for issue in timeline.validate() {
                tracing::warn!(timeline = timeline.name(), %issue, "Validation issue");
                issues.push((timeline.id, issue));
            }
        }
        issues
    }
}

fn on_stage_index(
    on_stage: &HashMap<u32, usize>,
    timeline: ItemId,
    frame: u32,
    instance: u32,
) -> Result<usize, LoadError> {
    on_stage.get(&instance).copied().ok_or(LoadError::UnknownInstance {
        timeline,
        frame,
        instance,
    })
}

/// Apply a change at a parent frame, relative to the instance start
fn update(instance: &mut Instance, frame: u32, change: impl FnOnce(&mut Transform)) {
    let offset = frame.saturating_sub(instance.start_frame);
    instance.update_keyframe(offset, change);
}

/// `base`, or `base_N` with the smallest N from 2 not taken yet
fn unique_name(taken: &mut HashSet<String>, base: &str) -> String {
    let mut name = base.to_string();
    let mut n = 1;
    while taken.contains(&name) {
        n += 1;
        name = format!("{base}_{n}");
    }
    taken.insert(name.clone());
    name
}

/// Alpha multiplier slot of the row-major 4x5 color matrix
const ALPHA_MULTIPLIER: usize = 18;

/// Exported document
#[derive(Debug, Deserialize)]
struct DocumentData {
    timelines: Vec<TimelineData>,
}

/// Exported timeline entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineData {
    #[serde(default)]
    asset_id: u32,
    #[serde(rename = "type")]
    kind: TimelineKind,
    name: String,
    total_frames: u32,
    #[serde(default)]
    frames: Vec<FrameData>,
}

/// Exported frame entry
#[derive(Debug, Deserialize)]
struct FrameData {
    frame: u32,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    commands: Vec<CommandData>,
    #[serde(default)]
    scripts: Option<Vec<Script>>,
}

impl FrameData {
    fn to_frame(&self) -> Frame {
        if self.labels.len() > 1 {
            tracing::warn!(frame = self.frame, labels = ?self.labels, "Extra frame labels ignored");
        }
        Frame {
            index: self.frame,
            label: self.labels.first().cloned(),
            scripts: self.scripts.clone(),
        }
    }
}

/// Exported display list command
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum CommandData {
    Place {
        #[serde(rename = "assetId")]
        asset_id: u32,
        #[serde(rename = "instanceId")]
        instance_id: u32,
        #[serde(default)]
        transform: Option<Matrix>,
        #[serde(rename = "instanceName", default)]
        instance_name: Option<String>,
        #[serde(rename = "loop", default = "default_loop")]
        looping: bool,
    },
    Move {
        #[serde(rename = "instanceId")]
        instance_id: u32,
        transform: Matrix,
    },
    Remove {
        #[serde(rename = "instanceId")]
        instance_id: u32,
    },
    Visibility {
        #[serde(rename = "instanceId")]
        instance_id: u32,
        visibility: bool,
    },
    ColorTransform {
        #[serde(rename = "instanceId")]
        instance_id: u32,
        #[serde(rename = "colorMatrix", default)]
        color_matrix: Vec<f32>,
    },
    #[serde(other)]
    Other,
}

fn default_loop() -> bool {
    true
}
