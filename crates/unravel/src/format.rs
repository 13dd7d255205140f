// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rendering unpacked error chains as strings and JSON.

use std::error::Error as StdError;

use serde_json::{Map, Value};

use crate::frame::StackFrame;
use crate::unpack::{UnpackedError, unpack_with};

/// Options shared by every output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::struct_excessive_bools, reason = "independent switches")]
pub struct FormatOptions {
    /// Render the root first instead of the outermost wrap.
    pub invert_output: bool,
    /// Include call stacks and wrap sites.
    pub with_trace: bool,
    /// Render stacks starting at the program entry instead of the error site.
    pub invert_trace: bool,
    /// Include the message of a foreign error found at the end of the chain.
    pub with_external: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            invert_output: false,
            with_trace: false,
            invert_trace: false,
            with_external: true,
        }
    }
}

/// Separators for the string renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringFormat {
    /// Format options.
    pub options: FormatOptions,
    /// Between a message and its frames.
    pub msg_stack_sep: String,
    /// Before each frame.
    pub pre_stack_sep: String,
    /// Between the name, file and line of a frame.
    pub stack_elem_sep: String,
    /// Between errors, and between frames.
    pub error_sep: String,
}

impl StringFormat {
    /// Creates the default string format for `options`.
    ///
    /// Without trace, messages are joined by `": "`. With trace, every message and every frame
    /// sits on its own line and frames are indented by a tab.
    #[must_use]
    pub fn new(options: FormatOptions) -> Self {
        let (msg_stack_sep, pre_stack_sep, stack_elem_sep, error_sep) = if options.with_trace {
            ("\n", "\t", ":", "\n")
        } else {
            ("", "", "", ": ")
        };

        Self {
            options,
            msg_stack_sep: msg_stack_sep.to_string(),
            pre_stack_sep: pre_stack_sep.to_string(),
            stack_elem_sep: stack_elem_sep.to_string(),
            error_sep: error_sep.to_string(),
        }
    }
}

impl Default for StringFormat {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

/// Settings for the JSON renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFormat {
    /// Format options.
    pub options: FormatOptions,
    /// Between the name, file and line of a frame.
    pub stack_elem_sep: String,
}

impl JsonFormat {
    /// Creates the default JSON format for `options`.
    #[must_use]
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            stack_elem_sep: ":".to_string(),
        }
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

/// Renders `err` with the default string format.
///
/// ```rust
/// use unravel::Error;
///
/// let err = Error::wrap(Error::new("root error"), "additional context");
/// assert_eq!(unravel::to_string(&err, false), "additional context: root error");
/// ```
#[must_use]
pub fn to_string(err: &(dyn StdError + 'static), with_trace: bool) -> String {
    to_custom_string(
        err,
        &StringFormat::new(FormatOptions {
            with_trace,
            ..FormatOptions::default()
        }),
    )
}

/// Renders `err` with the default JSON format.
#[must_use]
pub fn to_json(err: &(dyn StdError + 'static), with_trace: bool) -> Map<String, Value> {
    to_custom_json(
        err,
        &JsonFormat::new(FormatOptions {
            with_trace,
            ..FormatOptions::default()
        }),
    )
}

/// Renders `err` with a custom string format.
#[must_use]
pub fn to_custom_string(err: &(dyn StdError + 'static), format: &StringFormat) -> String {
    unpack_with(err, format.options.with_trace).to_custom_string(format)
}

/// Renders `err` with a custom JSON format.
#[must_use]
pub fn to_custom_json(err: &(dyn StdError + 'static), format: &JsonFormat) -> Map<String, Value> {
    unpack_with(err, format.options.with_trace).to_custom_json(format)
}

/// One error of the chain with the frames that belong to it.
struct Entry<'a> {
    message: &'a str,
    frames: Vec<&'a StackFrame>,
}

impl UnpackedError {
    /// Renders this snapshot as a string.
    #[must_use]
    pub fn to_custom_string(&self, format: &StringFormat) -> String {
        let options = format.options;
        let mut entries = Vec::with_capacity(self.chain.len() + 1);

        if let Some(root) = &self.root {
            entries.push(Entry {
                message: &root.message,
                frames: ordered_stack(&root.stack, options),
            });
        } else if options.with_external
            && let Some(external) = &self.external
        {
            entries.push(Entry {
                message: external,
                frames: Vec::new(),
            });
        }

        entries.extend(self.chain.iter().map(|link| Entry {
            message: &link.message,
            frames: link.frame.iter().filter(|_| options.with_trace).collect(),
        }));

        if !options.invert_output {
            entries.reverse();
        }

        let blocks: Vec<String> = entries.iter().map(|entry| render_entry(entry, format)).collect();
        blocks.join(&format.error_sep)
    }

    /// Renders this snapshot as a JSON object.
    ///
    /// The object has a `root` entry with the root message (and its `stack` when tracing), a
    /// `wrap` array with one entry per wrap, and an `external` entry for foreign errors.
    #[must_use]
    pub fn to_custom_json(&self, format: &JsonFormat) -> Map<String, Value> {
        let options = format.options;
        let sep = format.stack_elem_sep.as_str();
        let mut json = Map::new();

        if let Some(root) = &self.root {
            let mut root_json = Map::new();
            root_json.insert("message".to_string(), Value::from(root.message.as_str()));
            if options.with_trace {
                let stack = ordered_stack(&root.stack, options).into_iter().map(|frame| Value::from(frame.format(sep)));
                root_json.insert("stack".to_string(), Value::Array(stack.collect()));
            }
            json.insert("root".to_string(), Value::Object(root_json));
        }

        if !self.chain.is_empty() {
            let mut links: Vec<Value> = self
                .chain
                .iter()
                .map(|link| {
                    let mut link_json = Map::new();
                    link_json.insert("message".to_string(), Value::from(link.message.as_str()));
                    if options.with_trace
                        && let Some(frame) = &link.frame
                    {
                        link_json.insert("stack".to_string(), Value::from(frame.format(sep)));
                    }
                    Value::Object(link_json)
                })
                .collect();
            if !options.invert_output {
                links.reverse();
            }
            json.insert("wrap".to_string(), Value::Array(links));
        }

        if options.with_external
            && let Some(external) = &self.external
        {
            json.insert("external".to_string(), Value::from(external.as_str()));
        }

        json
    }
}

fn ordered_stack(stack: &[StackFrame], options: FormatOptions) -> Vec<&StackFrame> {
    if !options.with_trace {
        return Vec::new();
    }
    if options.invert_trace {
        stack.iter().rev().collect()
    } else {
        stack.iter().collect()
    }
}

fn render_entry(entry: &Entry<'_>, format: &StringFormat) -> String {
    let mut out = entry.message.to_string();
    if entry.frames.is_empty() {
        return out;
    }

    out.push_str(&format.msg_stack_sep);
    let frames: Vec<String> = entry
        .frames
        .iter()
        .map(|frame| format!("{}{}", format.pre_stack_sep, frame.format(&format.stack_elem_sep)))
        .collect();
    out.push_str(&frames.join(&format.error_sep));
    out
}
