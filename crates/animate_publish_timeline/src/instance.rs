// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placement of a child definition inside a parent timeline.

use crate::codegen::{format_number, format_number_compact, CallNames};
use crate::config::DEFAULT_PRECISION;
use crate::error::RenderError;
use crate::library::ItemId;
use crate::renderer::RenderContext;
use crate::timeline::TimelineKind;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Affine matrix as exported, `[a, b, c, d, tx, ty]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 6]", into = "[f32; 6]")]
pub struct Matrix {
    /// X scale / rotation component
    pub a: f32,
    /// Y skew / rotation component
    pub b: f32,
    /// X skew / rotation component
    pub c: f32,
    /// Y scale / rotation component
    pub d: f32,
    /// X translation
    pub tx: f32,
    /// Y translation
    pub ty: f32,
}

impl Matrix {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Split into position, scale, rotation and skew, fully opaque and visible
    pub fn decompose(&self) -> Transform {
        Transform::IDENTITY.with_matrix(self)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 6]> for Matrix {
    fn from([a, b, c, d, tx, ty]: [f32; 6]) -> Self {
        Self { a, b, c, d, tx, ty }
    }
}

impl From<Matrix> for [f32; 6] {
    fn from(m: Matrix) -> Self {
        [m.a, m.b, m.c, m.d, m.tx, m.ty]
    }
}

/// Animatable display property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Horizontal position
    X,
    /// Vertical position
    Y,
    /// Horizontal scale
    ScaleX,
    /// Vertical scale
    ScaleY,
    /// Rotation in radians
    Rotation,
    /// Horizontal skew in radians
    SkewX,
    /// Vertical skew in radians
    SkewY,
    /// Opacity from 0 to 1
    Alpha,
    /// Shown (1) or hidden (0)
    Visible,
}

impl Property {
    /// Key in verbose keyframe objects
    pub fn key(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::ScaleX => "sx",
            Self::ScaleY => "sy",
            Self::Rotation => "r",
            Self::SkewX => "kx",
            Self::SkewY => "ky",
            Self::Alpha => "a",
            Self::Visible => "v",
        }
    }

    /// Whether the property is set through the transform setter
    pub fn is_geometric(&self) -> bool {
        !matches!(self, Self::Alpha | Self::Visible)
    }

    /// Letter in compressed keyframe strings
    pub fn letter(&self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::ScaleX => 'A',
            Self::ScaleY => 'B',
            Self::Rotation => 'R',
            Self::SkewX => 'C',
            Self::SkewY => 'D',
            Self::Alpha => 'L',
            Self::Visible => 'V',
        }
    }
}

/// Decomposed display transform with opacity and visibility
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
    /// Horizontal scale
    pub scale_x: f32,
    /// Vertical scale
    pub scale_y: f32,
    /// Rotation in radians
    pub rotation: f32,
    /// Horizontal skew in radians
    pub skew_x: f32,
    /// Vertical skew in radians
    pub skew_y: f32,
    /// Opacity from 0 to 1
    pub alpha: f32,
    /// Whether the instance is shown
    pub visible: bool,
}

impl Transform {
    /// Untransformed state
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
        skew_x: 0.0,
        skew_y: 0.0,
        alpha: 1.0,
        visible: true,
    };

    /// Arguments of the runtime's transform setter, in order
    pub fn geometry(&self) -> [f32; 7] {
        [
            self.x,
            self.y,
            self.scale_x,
            self.scale_y,
            self.rotation,
            self.skew_x,
            self.skew_y,
        ]
    }

    /// Replace the geometric part, keeping opacity and visibility
    pub fn with_matrix(&self, m: &Matrix) -> Transform {
        let skew_x = -(-m.c).atan2(m.d);
        let skew_y = m.b.atan2(m.a);
        let delta = (skew_x + skew_y).abs();

        // Equal skews are a plain rotation
        let (rotation, skew_x, skew_y) = if delta < 0.00001 || (TAU - delta).abs() < 0.00001 {
            (skew_y, 0.0, 0.0)
        } else {
            (0.0, skew_x, skew_y)
        };

        Transform {
            x: m.tx,
            y: m.ty,
            scale_x: (m.a * m.a + m.b * m.b).sqrt(),
            scale_y: (m.c * m.c + m.d * m.d).sqrt(),
            rotation,
            skew_x,
            skew_y,
            ..*self
        }
    }

    /// Property values in emission order
    pub fn values(&self) -> [(Property, f32); 9] {
        [
            (Property::X, self.x),
            (Property::Y, self.y),
            (Property::ScaleX, self.scale_x),
            (Property::ScaleY, self.scale_y),
            (Property::Rotation, self.rotation),
            (Property::SkewX, self.skew_x),
            (Property::SkewY, self.skew_y),
            (Property::Alpha, self.alpha),
            (Property::Visible, if self.visible { 1.0 } else { 0.0 }),
        ]
    }

    /// Properties whose formatted value differs from `previous`
    pub fn changes(&self, previous: &Transform, precision: u32) -> Vec<(Property, f32)> {
        self.values()
            .into_iter()
            .zip(previous.values())
            .filter(|((_, v), (_, p))| format_number(*v, precision) != format_number(*p, precision))
            .map(|(current, _)| current)
            .collect()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transform state of an instance at a frame relative to its start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Frame offset from the instance start
    pub frame: u32,
    /// Transform from this frame on
    pub transform: Transform,
}

/// A placement of a definition inside a parent timeline
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance id from the exporter
    pub id: u32,
    /// Placed definition (owned by the library)
    pub definition: ItemId,
    /// Name the parent's generated code uses for this child
    pub local_name: String,
    /// First parent frame the child is on stage
    pub start_frame: u32,
    /// Parent frame the child leaves the stage, 0 for the parent's end
    pub end_frame: u32,
    /// Whether a synched graphic loops
    pub looping: bool,
    /// Transform keyframes, sorted by frame
    keyframes: Vec<Keyframe>,
}

impl Instance {
    /// Create a full-duration placement of `definition`
    pub fn new(definition: ItemId, id: u32) -> Self {
        Self {
            id,
            definition,
            local_name: format!("instance{id}"),
            start_frame: 0,
            end_frame: 0,
            looping: true,
            keyframes: Vec::new(),
        }
    }

    /// Set the local name
    pub fn with_name(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = local_name.into();
        self
    }

    /// Set the placement window
    pub fn with_window(mut self, start_frame: u32, end_frame: u32) -> Self {
        self.start_frame = start_frame;
        self.end_frame = end_frame;
        self
    }

    /// Insert or replace the keyframe at a relative frame
    pub fn set_keyframe(&mut self, frame: u32, transform: Transform) {
        match self.keyframes.binary_search_by_key(&frame, |k| k.frame) {
            Ok(idx) => self.keyframes[idx].transform = transform,
            Err(idx) => self.keyframes.insert(idx, Keyframe { frame, transform }),
        }
    }

    /// Change the state in effect at a relative frame and store it as a keyframe
    ///
    /// The change starts from the latest keyframe at or before `frame`, so
    /// properties it does not touch carry over.
    pub fn update_keyframe(&mut self, frame: u32, change: impl FnOnce(&mut Transform)) {
        let mut state = self.state_at(frame);
        change(&mut state);
        self.set_keyframe(frame, state);
    }

    /// State in effect at a relative frame
    pub fn state_at(&self, frame: u32) -> Transform {
        let idx = self.keyframes.partition_point(|k| k.frame <= frame);
        idx.checked_sub(1)
            .map_or(Transform::IDENTITY, |i| self.keyframes[i].transform)
    }

    /// Builder form of [`Instance::set_keyframe`]
    pub fn with_keyframe(mut self, frame: u32, transform: Transform) -> Self {
        self.set_keyframe(frame, transform);
        self
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Transform when the instance is placed
    pub fn initial_transform(&self) -> Transform {
        self.keyframes
            .first()
            .filter(|k| k.frame == 0)
            .map_or(Transform::IDENTITY, |k| k.transform)
    }

    /// Frames on stage within a parent of `total_frames`
    ///
    /// Not validated: an end before the start yields a negative duration.
    pub fn duration(&self, total_frames: u32) -> i64 {
        if self.end_frame > 0 {
            i64::from(self.end_frame) - i64::from(self.start_frame)
        } else {
            i64::from(total_frames) - i64::from(self.start_frame)
        }
    }

    /// Per-frame property changes, or `None` when positioning is static
    pub fn frames(&self, compress: bool) -> Option<String> {
        self.frames_with_precision(compress, DEFAULT_PRECISION)
    }

    /// [`Instance::frames`] with an explicit number of decimals
    pub fn frames_with_precision(&self, compress: bool, precision: u32) -> Option<String> {
        if self.keyframes.len() < 2 {
            return None;
        }

        let mut previous = Transform::IDENTITY;
        let mut entries = Vec::new();
        for keyframe in &self.keyframes {
            let changes = keyframe.transform.changes(&previous, precision);
            previous = keyframe.transform;
            if !changes.is_empty() {
                entries.push((keyframe.frame, changes));
            }
        }

        if entries.iter().all(|(frame, _)| *frame == 0) {
            return None;
        }

        let text = if compress {
            let tokens: Vec<String> = entries
                .iter()
                .map(|(frame, changes)| {
                    let mut token = frame.to_string();
                    for (property, value) in changes {
                        token.push(property.letter());
                        token.push_str(&format_number_compact(*value, precision));
                    }
                    token
                })
                .collect();
            format!("\"{}\"", tokens.join(" "))
        } else {
            let objects: Vec<String> = entries
                .iter()
                .map(|(frame, changes)| {
                    let fields: Vec<String> = changes
                        .iter()
                        .map(|(property, value)| {
                            format!("{}:{}", property.key(), format_number(*value, precision))
                        })
                        .collect();
                    format!("{frame}:{{{}}}", fields.join(","))
                })
                .collect();
            format!("{{{}}}", objects.join(","))
        };
        Some(text)
    }

    /// Emit the construction statement for this child
    ///
    /// The definition is rendered into the context first if this pass has
    /// not emitted it yet.
    pub fn render(&self, cx: &mut RenderContext<'_>) -> Result<String, RenderError> {
        let definition = cx.definition(self.definition)?;
        cx.require(self.definition)?;

        let names = cx.names();
        let precision = cx.settings().precision;
        let args = match definition.kind {
            TimelineKind::Graphic => format!(
                "{{mode: {}, startPosition: 0, loop: {}}}",
                names.synched_mode, self.looping
            ),
            TimelineKind::Stage | TimelineKind::MovieClip => String::new(),
        };

        let mut out = format!(
            "const {} = new {}.{}({});",
            self.local_name,
            cx.settings().namespace,
            definition.name(),
            args
        );

        let initial = self.initial_transform();
        let changes = initial.changes(&Transform::IDENTITY, precision);
        if changes.iter().any(|(property, _)| property.is_geometric()) {
            out.push_str(&self.transform_statement(&initial, names, precision));
        }
        for (property, value) in changes {
            match property {
                Property::Alpha => out.push_str(&format!(
                    "{}.alpha = {};",
                    self.local_name,
                    format_number(value, precision)
                )),
                Property::Visible => out.push_str(&format!("{}.visible = false;", self.local_name)),
                _ => {}
            }
        }
        Ok(out)
    }

    fn transform_statement(&self, transform: &Transform, names: CallNames, precision: u32) -> String {
        let values: Vec<String> = transform
            .geometry()
            .iter()
            .map(|v| format_number(*v, precision))
            .collect();
        format!("{}.{}({});", self.local_name, names.set_transform, values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Transform {
        Transform {
            x,
            y,
            ..Transform::IDENTITY
        }
    }

    #[test]
    fn test_identity_decomposes_to_identity() {
        assert_eq!(Matrix::IDENTITY.decompose(), Transform::IDENTITY);
    }

    #[test]
    fn test_rotation_matrix_decomposes_to_rotation() {
        let angle = std::f32::consts::FRAC_PI_2;
        let matrix = Matrix {
            a: angle.cos(),
            b: angle.sin(),
            c: -angle.sin(),
            d: angle.cos(),
            tx: 5.0,
            ty: 6.0,
        };
        let t = matrix.decompose();
        assert!((t.rotation - angle).abs() < 1e-5);
        assert_eq!(t.skew_x, 0.0);
        assert_eq!(t.skew_y, 0.0);
        assert!((t.scale_x - 1.0).abs() < 1e-5);
        assert_eq!((t.x, t.y), (5.0, 6.0));
    }

    #[test]
    fn test_matrix_from_array() {
        let matrix: Matrix = serde_json::from_str("[2, 0, 0, 3, 10, 20]").unwrap();
        let t = matrix.decompose();
        assert_eq!((t.scale_x, t.scale_y, t.x, t.y), (2.0, 3.0, 10.0, 20.0));
    }

    #[test]
    fn test_duration() {
        let open = Instance::new(ItemId(1), 1).with_window(5, 0);
        assert_eq!(open.duration(20), 15);

        let closed = Instance::new(ItemId(1), 1).with_window(5, 12);
        assert_eq!(closed.duration(20), 7);

        // Not validated
        let inverted = Instance::new(ItemId(1), 1).with_window(9, 4);
        assert_eq!(inverted.duration(20), -5);
    }

    #[test]
    fn test_single_keyframe_is_static() {
        let instance = Instance::new(ItemId(1), 1).with_keyframe(0, at(10.0, 20.0));
        assert_eq!(instance.frames(false), None);
        assert_eq!(instance.frames(true), None);
        assert_eq!(instance.initial_transform(), at(10.0, 20.0));
    }

    #[test]
    fn test_unchanged_keyframes_are_static() {
        let instance = Instance::new(ItemId(1), 1)
            .with_keyframe(0, at(10.0, 20.0))
            .with_keyframe(4, at(10.0, 20.0));
        assert_eq!(instance.frames(false), None);
    }

    #[test]
    fn test_verbose_frames() {
        let instance = Instance::new(ItemId(1), 1)
            .with_keyframe(0, at(10.0, 20.0))
            .with_keyframe(5, at(30.0, 20.0));
        assert_eq!(instance.frames(false).unwrap(), "{0:{x:10,y:20},5:{x:30}}");
    }

    #[test]
    fn test_compressed_frames() {
        let instance = Instance::new(ItemId(1), 1)
            .with_keyframe(0, at(10.0, 0.5))
            .with_keyframe(5, at(30.0, 0.5));
        assert_eq!(instance.frames(true).unwrap(), "\"0X10Y.5 5X30\"");
    }

    #[test]
    fn test_keyframe_replaced_at_same_frame() {
        let mut instance = Instance::new(ItemId(1), 1);
        instance.set_keyframe(3, at(1.0, 1.0));
        instance.set_keyframe(0, at(0.0, 0.0));
        instance.set_keyframe(3, at(2.0, 2.0));
        let frames: Vec<u32> = instance.keyframes().iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![0, 3]);
        assert_eq!(instance.keyframes()[1].transform, at(2.0, 2.0));
    }

    #[test]
    fn test_update_keyframe_carries_state() {
        let mut instance = Instance::new(ItemId(1), 1).with_keyframe(0, at(10.0, 20.0));
        instance.update_keyframe(3, |state| state.alpha = 0.5);
        instance.update_keyframe(6, |state| state.visible = false);
        instance.update_keyframe(6, |state| *state = state.with_matrix(&Matrix::IDENTITY));

        let late = instance.state_at(8);
        assert_eq!((late.x, late.alpha, late.visible), (0.0, 0.5, false));
        assert_eq!(instance.state_at(3), Transform { alpha: 0.5, ..at(10.0, 20.0) });
        assert_eq!(instance.keyframes().len(), 3);
    }

    #[test]
    fn test_alpha_and_visibility_frames() {
        let mut instance = Instance::new(ItemId(1), 1);
        instance.update_keyframe(0, |state| state.alpha = 0.25);
        instance.update_keyframe(4, |state| state.alpha = 1.0);
        instance.update_keyframe(9, |state| state.visible = false);

        assert_eq!(instance.frames(false).unwrap(), "{0:{a:0.25},4:{a:1},9:{v:0}}");
        assert_eq!(instance.frames(true).unwrap(), "\"0L.25 4L1 9V0\"");
    }

    #[test]
    fn test_skew_letters() {
        let skewed = Transform {
            skew_x: 0.5,
            skew_y: 0.25,
            ..Transform::IDENTITY
        };
        let instance = Instance::new(ItemId(1), 1)
            .with_keyframe(0, Transform::IDENTITY)
            .with_keyframe(2, skewed);
        assert_eq!(instance.frames(true).unwrap(), "\"2C.5D.25\"");
        assert_eq!(instance.frames(false).unwrap(), "{2:{kx:0.5,ky:0.25}}");
    }

    #[test]
    fn test_default_local_name() {
        assert_eq!(Instance::new(ItemId(4), 12).local_name, "instance12");
    }
}
