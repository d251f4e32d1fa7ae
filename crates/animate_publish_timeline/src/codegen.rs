// SPDX-License-Identifier: MIT OR Apache-2.0
//! Statement building helpers shared by timelines and instances.

use crate::config::MAX_PRECISION;

/// Receiver token for chained statements inside a definition body
pub const RECEIVER: &str = "this";

/// Call names for one lexical mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallNames {
    /// Timed child placement
    pub add_timed_child: &'static str,
    /// Batched static child placement
    pub add_child: &'static str,
    /// Frame script registration
    pub add_action: &'static str,
    /// Initial transform of a placed instance
    pub set_transform: &'static str,
    /// Synched playback mode for graphic instances
    pub synched_mode: &'static str,
}

impl CallNames {
    /// Verbose names
    pub const VERBOSE: Self = Self {
        add_timed_child: "addTimedChild",
        add_child: "addChild",
        add_action: "addAction",
        set_transform: "setTransform",
        synched_mode: "MovieClip.SYNCHED",
    };

    /// Size-compressed aliases
    pub const COMPRESSED: Self = Self {
        add_timed_child: "at",
        add_child: "ac",
        add_action: "aa",
        set_transform: "t",
        synched_mode: "1",
    };

    /// Names for the given compression flag
    pub fn for_mode(compress: bool) -> Self {
        if compress {
            Self::COMPRESSED
        } else {
            Self::VERBOSE
        }
    }
}

/// A chained call statement, `receiver.a(..).b(..);`
///
/// Calls are collected in order and joined once in [`Chain::finish`]; a chain
/// without calls renders as empty text.
#[derive(Debug, Clone)]
pub struct Chain {
    receiver: String,
    calls: Vec<String>,
}

impl Chain {
    /// Start a chain on a receiver
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            calls: Vec::new(),
        }
    }

    /// Append a call
    pub fn call<I, S>(&mut self, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        self.calls.push(format!(".{name}({})", args.join(", ")));
        self
    }

    /// Number of calls so far
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call was added
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Join into a terminated statement, or empty text without calls
    pub fn finish(self) -> String {
        if self.calls.is_empty() {
            return String::new();
        }
        let mut out = self.receiver;
        for call in &self.calls {
            out.push_str(call);
        }
        out.push(';');
        out
    }
}

/// Format a number with at most `precision` decimals and no trailing zeros
///
/// `precision` is capped at [`MAX_PRECISION`].
pub fn format_number(value: f32, precision: u32) -> String {
    let precision = precision.min(MAX_PRECISION);
    let factor = 10f64.powi(precision as i32);
    let rounded = (f64::from(value) * factor).round() / factor;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut text = format!("{:.*}", precision as usize, rounded);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

/// Compact form of [`format_number`] that drops the leading zero
pub fn format_number_compact(value: f32, precision: u32) -> String {
    let text = format_number(value, precision);
    if let Some(rest) = text.strip_prefix("0.") {
        format!(".{rest}")
    } else if let Some(rest) = text.strip_prefix("-0.") {
        format!("-.{rest}")
    } else {
        text
    }
}
