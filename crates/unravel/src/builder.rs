// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use crate::Error;
use crate::stack::{DEFAULT_MAX_DEPTH, Stack};

/// Policy for capturing the call stack of root errors.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePolicy {
    /// Capture the call stack when the error is built.
    #[default]
    Always,
    /// Never capture; the root starts with an empty stack and only gains wrap sites.
    Never,
}

/// Builder for root [`Error`]s with custom capture settings.
///
/// ```rust
/// use unravel::{CapturePolicy, Error};
///
/// let err = Error::builder()
///     .message("connection refused")
///     .capture_policy(CapturePolicy::Never)
///     .build();
/// assert_eq!(err.to_string(), "connection refused");
/// ```
#[derive(Debug, Clone)]
pub struct ErrorBuilder {
    message: Cow<'static, str>,
    capture_policy: CapturePolicy,
    max_depth: usize,
    global: Option<bool>,
}

impl Default for ErrorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorBuilder {
    /// Creates a new [`ErrorBuilder`] with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: Cow::Borrowed(""),
            capture_policy: CapturePolicy::Always,
            max_depth: DEFAULT_MAX_DEPTH,
            global: None,
        }
    }

    /// Sets the error message.
    #[must_use]
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the stack capture policy.
    #[must_use]
    pub fn capture_policy(mut self, policy: CapturePolicy) -> Self {
        self.capture_policy = policy;
        self
    }

    /// Sets the maximum number of frames recorded.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Marks the error as global (or not), overriding detection from the call stack.
    ///
    /// Wrapping a global error never touches its stack: every wrap builds a fresh root
    /// carrying the stack of the wrap site. Detection relies on symbol names, so binaries
    /// built without debug information need this to mark their sentinels.
    #[must_use]
    pub fn global(mut self, global: bool) -> Self {
        self.global = Some(global);
        self
    }

    /// Builds the error.
    #[must_use]
    #[inline(never)]
    pub fn build(self) -> Error {
        let stack = match self.capture_policy {
            CapturePolicy::Always => Stack::capture(self.max_depth),
            CapturePolicy::Never => Stack::empty(),
        };
        let global = self.global.unwrap_or_else(|| stack.is_global());
        Error::from_root_parts(self.message, stack, global)
    }
}
