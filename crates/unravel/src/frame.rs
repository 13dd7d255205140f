// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::ffi::c_void;
use std::fmt;

use serde::Serialize;

const CRATE_PATH: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
const CRATE_QUALIFIED: &str = concat!("<", env!("CARGO_CRATE_NAME"), "::");
const CRATE_TRAIT_IMPL: &str = concat!(" as ", env!("CARGO_CRATE_NAME"), "::");
const SHORT_BACKTRACE_MARKER: &str = "__rust_begin_short_backtrace";
const UNKNOWN: &str = "<unknown>";

/// One captured call site.
///
/// A frame is an opaque instruction pointer. It is cheap to copy and compare; turning it into
/// names, files and lines happens only when [`resolve`](Frame::resolve) is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    ip: usize,
}

impl Frame {
    pub(crate) const fn from_ip(ip: usize) -> Self {
        Self { ip }
    }

    /// Returns the raw instruction pointer of this frame.
    #[must_use]
    pub const fn ip(&self) -> usize {
        self.ip
    }

    /// Resolves this frame into source-level frames.
    ///
    /// When the compiler inlined calls at this address, more than one frame is returned,
    /// innermost call first. An address without debug information resolves to a single
    /// `<unknown>` frame.
    #[must_use]
    pub fn resolve(&self) -> Vec<StackFrame> {
        let mut frames = Vec::new();
        self.for_each_symbol(|name, file, line| {
            frames.push(StackFrame {
                name: name.unwrap_or_else(|| UNKNOWN.to_string()),
                file: file.unwrap_or_else(|| UNKNOWN.to_string()),
                line,
            });
        });

        if frames.is_empty() {
            frames.push(StackFrame::unknown());
        }
        frames
    }

    /// Name of the function this address physically belongs to.
    ///
    /// Inlined callees are reported first by the symbolizer, so the enclosing function is the last one.
    pub(crate) fn outermost_name(&self) -> Option<String> {
        let mut outermost = None;
        self.for_each_symbol(|name, _, _| {
            if name.is_some() {
                outermost = name;
            }
        });
        outermost
    }

    pub(crate) fn symbol_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.for_each_symbol(|name, _, _| names.extend(name));
        names
    }

    fn for_each_symbol(&self, mut f: impl FnMut(Option<String>, Option<String>, u32)) {
        backtrace::resolve(std::ptr::without_provenance_mut::<c_void>(self.ip), |symbol| {
            let name = symbol.name().map(|name| format!("{name:#}"));
            let file = symbol.filename().map(|path| path.display().to_string());
            f(name, file, symbol.lineno().unwrap_or(0));
        });
    }
}

/// A resolved call site: function name, source file and line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StackFrame {
    /// Demangled function path, without the symbol hash.
    pub name: String,
    /// Source file the function is defined in.
    pub file: String,
    /// Line within [`file`](StackFrame::file), or 0 when unknown.
    pub line: u32,
}

impl StackFrame {
    /// Creates a frame from its parts.
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
        }
    }

    fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, 0)
    }

    /// Renders the frame as `name{sep}file{sep}line`.
    #[must_use]
    pub fn format(&self, sep: &str) -> String {
        format!("{}{sep}{}{sep}{}", self.name, self.file, self.line)
    }

    pub(crate) fn is_internal(&self) -> bool {
        is_internal(&self.name)
    }

    pub(crate) fn is_entry_marker(&self) -> bool {
        self.name.contains(SHORT_BACKTRACE_MARKER)
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.file, self.line)
    }
}

/// Whether a symbol belongs to the capture machinery rather than to the caller.
///
/// Unit tests of this crate count as callers.
pub(crate) fn is_internal(name: &str) -> bool {
    if name.contains("::tests::") {
        return false;
    }

    name.starts_with(CRATE_PATH)
        || name.starts_with(CRATE_QUALIFIED)
        || name.contains(CRATE_TRAIT_IMPL)
        || name.starts_with("backtrace::")
}
