// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::frame::{Frame, StackFrame, is_internal};

/// Default number of frames kept per capture.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// Capture machinery sits on top of every capture; this bounds how far we look for the caller.
const MAX_INTERNAL_FRAMES: usize = 32;

const LAZY_INIT_MARKERS: [&str; 5] = [
    "std::sync::lazy_lock::LazyLock",
    "std::sync::once_lock::OnceLock",
    "once_cell::",
    "lazy_static::",
    "::once::Once::call_once",
];

/// Frames captured at one point in time, deepest call first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub(crate) const fn empty() -> Self {
        Self { frames: Vec::new() }
    }

    pub(crate) const fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Captures the current call stack, starting at the first caller outside this crate.
    #[inline(never)]
    pub(crate) fn capture(max_depth: usize) -> Self {
        let limit = max_depth.saturating_add(MAX_INTERNAL_FRAMES);
        let mut ips = Vec::with_capacity(limit.min(128));
        backtrace::trace(|frame| {
            // the unwinder ends some walks with a null address
            if frame.ip().is_null() {
                return false;
            }
            ips.push(frame.ip().addr());
            ips.len() < limit
        });

        let skip = leading_internal_frames(&ips);
        let frames = ips.into_iter().skip(skip).take(max_depth).map(Frame::from_ip).collect();
        Self { frames }
    }

    pub(crate) fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub(crate) fn first(&self) -> Option<Frame> {
        self.frames.first().copied()
    }

    /// Whether the capture happened while a lazily initialized static was being built.
    pub(crate) fn is_global(&self) -> bool {
        self.frames
            .iter()
            .flat_map(Frame::symbol_names)
            .any(|name| LAZY_INIT_MARKERS.iter().any(|marker| name.contains(marker)))
    }

    /// Resolves every frame, dropping this crate's own functions and the runtime's entry plumbing.
    pub(crate) fn resolve(&self) -> Vec<StackFrame> {
        let mut resolved = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            for stack_frame in frame.resolve() {
                if stack_frame.is_entry_marker() {
                    return resolved;
                }
                if !stack_frame.is_internal() {
                    resolved.push(stack_frame);
                }
            }
        }
        resolved
    }

    /// Returns this stack with the wrap site from `new` spliced in, or `None` when nothing changes.
    pub(crate) fn merged_with(&self, new: &Self) -> Option<Self> {
        merge(&self.frames, &new.frames).map(Self::from_frames)
    }
}

/// Splices the wrap site `new[0]` into `existing`.
///
/// `new` is the stack captured at the wrap site. When `existing` already holds the wrap site
/// nothing changes, which keeps wraps inside loops from growing the stack. Otherwise the
/// wrap site is inserted right before the first entry equal to its caller `new[1]`.
pub(crate) fn merge(existing: &[Frame], new: &[Frame]) -> Option<Vec<Frame>> {
    let (&site, rest) = new.split_first()?;

    if existing.is_empty() || rest.is_empty() {
        let mut merged = existing.to_vec();
        merged.push(site);
        return Some(merged);
    }

    let caller = rest[0];
    for (index, &frame) in existing.iter().enumerate() {
        if frame == site {
            return None;
        }
        if frame == caller {
            let mut merged = Vec::with_capacity(existing.len() + 1);
            merged.extend_from_slice(&existing[..index]);
            merged.push(site);
            merged.extend_from_slice(&existing[index..]);
            return Some(merged);
        }
    }

    None
}

fn leading_internal_frames(ips: &[usize]) -> usize {
    let mut seen_internal = false;
    for (index, &ip) in ips.iter().take(MAX_INTERNAL_FRAMES).enumerate() {
        let internal = Frame::from_ip(ip).outermost_name().is_some_and(|name| is_internal(&name));
        if internal {
            seen_internal = true;
        } else if seen_internal {
            return index;
        }
    }

    // without symbols there is no way to tell, keep everything
    0
}
