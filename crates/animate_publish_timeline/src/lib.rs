// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline code generation for Animate publishing.
//!
//! This crate turns loaded timeline definitions into source text that a
//! runtime animation library executes to rebuild them:
//! - Child construction and placement (static batches and timed windows)
//! - Per-frame transform keyframes
//! - Frame labels
//! - Frame scripts
//!
//! ## Architecture
//!
//! The generator is built on:
//! - A library of timeline definitions loaded from exporter JSON
//! - Instances that place one definition inside another
//! - A renderer collaborator supplying templates and the lexical mode
//! - A render context guarding recursive definition rendering

pub mod codegen;
pub mod config;
pub mod container;
pub mod error;
pub mod frame;
pub mod instance;
pub mod library;
pub mod renderer;
pub mod timeline;
pub mod validate;

#[cfg(test)]
mod test_utils;

pub use codegen::{CallNames, Chain};
pub use config::RenderSettings;
pub use container::Container;
pub use error::{ConfigError, LoadError, RenderError, TemplateError};
pub use frame::{Frame, Script};
pub use instance::{Instance, Keyframe, Matrix, Property, Transform};
pub use library::{ItemId, Library};
pub use renderer::{RenderContext, Renderer, TIMELINE_TEMPLATE, TIMELINE_TINY_TEMPLATE};
pub use timeline::{Labels, Timeline, TimelineKind};
pub use validate::ValidationIssue;
