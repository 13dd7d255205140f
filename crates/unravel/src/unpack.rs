// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error as StdError;

use serde::Serialize;

use crate::Error;
use crate::error::Node;
use crate::frame::{Frame, StackFrame};

/// A detached snapshot of an error chain, ready to be formatted or serialized.
///
/// Produced by [`unpack`]. Holds no reference to the live chain, so later wraps of the same
/// error do not change it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnpackedError {
    /// The root at the bottom of the chain, `None` when the error is foreign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<UnpackedRoot>,
    /// Wraps in creation order: the first entry wraps the root directly.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<UnpackedLink>,
    /// Message of the foreign error at the end of the chain, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
}

/// The root of an unpacked chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnpackedRoot {
    /// Root message.
    pub message: String,
    /// Resolved call stack, deepest call first.
    pub stack: Vec<StackFrame>,
}

/// One wrap of an unpacked chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnpackedLink {
    /// Wrap message.
    pub message: String,
    /// Where the wrap happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<StackFrame>,
}

/// Walks `err` and returns a snapshot of its chain with resolved call stacks.
///
/// ```rust
/// use unravel::{Error, unpack};
///
/// let err = Error::wrap(Error::new("root error"), "context");
/// let unpacked = unpack(&err);
/// assert_eq!(unpacked.root.map(|root| root.message).as_deref(), Some("root error"));
/// assert_eq!(unpacked.chain[0].message, "context");
/// ```
#[must_use]
pub fn unpack(err: &(dyn StdError + 'static)) -> UnpackedError {
    unpack_with(err, true)
}

/// Like [`unpack`], but leaves stacks and frames empty unless `resolve_stacks` is set.
pub(crate) fn unpack_with(err: &(dyn StdError + 'static), resolve_stacks: bool) -> UnpackedError {
    let mut unpacked = UnpackedError::default();
    let mut current = err;

    loop {
        let Some(library) = Error::from_dyn(current) else {
            unpacked.external = Some(current.to_string());
            break;
        };

        match library.node() {
            Node::Wrap(wrap) => {
                unpacked.chain.push(UnpackedLink {
                    message: wrap.message.to_string(),
                    frame: wrap.frame.filter(|_| resolve_stacks).and_then(caller_frame),
                });
                current = &wrap.cause;
            }
            Node::Root(root) => {
                unpacked.root = Some(UnpackedRoot {
                    message: root.message.to_string(),
                    stack: if resolve_stacks { root.stack().resolve() } else { Vec::new() },
                });
                unpacked.external = root.external.as_ref().map(ToString::to_string);
                break;
            }
        }
    }

    unpacked.chain.reverse();
    unpacked
}

fn caller_frame(frame: Frame) -> Option<StackFrame> {
    frame.resolve().into_iter().find(|frame| !frame.is_internal())
}

impl Error {
    /// Returns a snapshot of this chain with resolved call stacks.
    #[must_use]
    pub fn unpack(&self) -> UnpackedError {
        unpack(self)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("external error")]
    struct ExternalError;

    #[test]
    fn unpack_chain_order() {
        let err = Error::wrap(Error::wrap(Error::new("root error"), "additional context"), "even more context");
        let unpacked = unpack(&err);

        let root = unpacked.root.expect("library root");
        assert_eq!(root.message, "root error");
        assert!(!root.stack.is_empty());

        let messages: Vec<_> = unpacked.chain.iter().map(|link| link.message.as_str()).collect();
        assert_eq!(messages, ["additional context", "even more context"]);
        assert!(unpacked.chain.iter().all(|link| link.frame.is_some()));
        assert_eq!(unpacked.external, None);
    }

    #[test]
    fn unpack_foreign_error() {
        let unpacked = unpack(&ExternalError);
        assert_eq!(
            unpacked,
            UnpackedError {
                root: None,
                chain: Vec::new(),
                external: Some("external error".to_string()),
            }
        );
    }

    #[test]
    fn unpack_wrapped_foreign_error() {
        let unpacked = Error::wrap(ExternalError, "context").unpack();
        assert_eq!(unpacked.root.map(|root| root.message).as_deref(), Some("external error"));
        assert_eq!(unpacked.external.as_deref(), Some("external error"));
        assert_eq!(unpacked.chain.len(), 1);
    }

    #[test]
    fn unpack_without_resolution() {
        let err = Error::wrap(Error::new("root error"), "context");
        let unpacked = unpack_with(&err, false);
        assert_eq!(unpacked.root.as_ref().map(|root| root.stack.len()), Some(0));
        assert_eq!(unpacked.chain[0].frame, None);
    }

    #[test]
    fn unpack_is_repeatable() {
        let err = Error::wrap(Error::new("root error"), "context");
        assert_eq!(unpack(&err), unpack(&err));
    }

    #[test]
    fn serialize_snapshot() {
        let err = Error::wrap(Error::new("root error"), "context");
        let mut unpacked = unpack_with(&err, false);
        unpacked.chain[0].frame = Some(StackFrame::new("app::run", "src/main.rs", 7));

        let json = serde_json::to_string(&unpacked).expect("serializable");
        insta::assert_snapshot!(json, @r#"{"root":{"message":"root error","stack":[]},"chain":[{"message":"context","frame":{"name":"app::run","file":"src/main.rs","line":7}}]}"#);
    }
}
