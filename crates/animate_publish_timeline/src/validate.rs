// SPDX-License-Identifier: MIT OR Apache-2.0
//! Opt-in well-formedness checks.
//!
//! Rendering never validates; malformed input yields text that reflects it.
//! A pipeline that wants to reject such input calls these checks itself.

use crate::timeline::Timeline;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Problem found in a timeline definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// Frame indices are not ascending
    #[error("Frame {index} follows frame {previous}")]
    UnsortedFrames {
        /// Index of the earlier frame in storage order
        previous: u32,
        /// Index of the out-of-order frame
        index: u32,
    },

    /// Placement ends before it starts
    #[error("Instance {name} ends at {end} before starting at {start}")]
    InvertedWindow {
        /// Instance local name
        name: String,
        /// Start frame
        start: u32,
        /// End frame
        end: u32,
    },

    /// Placement starts after the timeline ends
    #[error("Instance {name} starts at {start}, past duration {total}")]
    StartPastEnd {
        /// Instance local name
        name: String,
        /// Start frame
        start: u32,
        /// Timeline duration
        total: u32,
    },

    /// Two frames use the same label; the later one wins
    #[error("Label {label} on frame {index} repeats frame {first}")]
    DuplicateLabel {
        /// Label name
        label: String,
        /// Frame that declared it first
        first: u32,
        /// Frame declaring it again
        index: u32,
    },
}

impl Timeline {
    /// Check frame order, placement windows and label uniqueness
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for pair in self.frames().windows(2) {
            if pair[1].index < pair[0].index {
                issues.push(ValidationIssue::UnsortedFrames {
                    previous: pair[0].index,
                    index: pair[1].index,
                });
            }
        }

        for instance in self.instances() {
            if instance.end_frame > 0 && instance.end_frame < instance.start_frame {
                issues.push(ValidationIssue::InvertedWindow {
                    name: instance.local_name.clone(),
                    start: instance.start_frame,
                    end: instance.end_frame,
                });
            } else if instance.end_frame == 0 && instance.start_frame > self.total_frames {
                issues.push(ValidationIssue::StartPastEnd {
                    name: instance.local_name.clone(),
                    start: instance.start_frame,
                    total: self.total_frames,
                });
            }
        }

        let mut seen: HashMap<&str, u32> = HashMap::new();
        for frame in self.frames() {
            let Some(label) = frame.label.as_deref() else {
                continue;
            };
            match seen.entry(label) {
                Entry::Occupied(first) => issues.push(ValidationIssue::DuplicateLabel {
                    label: label.to_string(),
                    first: *first.get(),
                    index: frame.index,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(frame.index);
                }
            }
        }

        issues
    }
}
