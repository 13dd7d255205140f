// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::builder::ErrorBuilder;
use crate::format::{FormatOptions, StringFormat};
use crate::frame::Frame;
use crate::stack::{DEFAULT_MAX_DEPTH, Stack};
use crate::unpack::unpack_with;

/// An error that records where it was created and every place it was wrapped.
///
/// `Error` is a cheap handle: cloning it shares the same chain. An error is either a root,
/// created with [`Error::new`] or [`err!`](crate::err), or a wrap, created with
/// [`Error::wrap`] or [`wrap!`](crate::wrap), which adds a message on top of a cause.
///
/// Foreign errors passed to [`Error::wrap`] stay reachable through
/// [`source`](StdError::source) below a root that carries their message.
///
/// # Examples
///
/// ```rust
/// use unravel::Error;
///
/// let root = Error::new("root error");
/// let err = Error::wrap(Error::wrap(root, "additional context"), "even more context");
/// assert_eq!(err.to_string(), "even more context: additional context: root error");
/// ```
#[derive(Clone)]
pub struct Error {
    node: Arc<Node>,
}

/// The two kinds of errors built by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An error at the bottom of a chain, holding the call stack.
    Root,
    /// Additional context on top of another error, holding the wrap site.
    Wrap,
}

pub(crate) enum Node {
    Root(Root),
    Wrap(Wrap),
}

pub(crate) struct Root {
    pub(crate) message: Cow<'static, str>,
    stack: Mutex<Arc<Stack>>,
    pub(crate) global: bool,
    /// Lives in a static, so wraps must copy the chain instead of merging into it.
    shared: bool,
    pub(crate) external: Option<Arc<dyn StdError + Send + Sync>>,
}

pub(crate) struct Wrap {
    pub(crate) message: Cow<'static, str>,
    pub(crate) cause: Error,
    pub(crate) frame: Option<Frame>,
}

/// What a wrap is applied to.
enum Cause {
    Message(Cow<'static, str>),
    Chain(Error),
    External(Arc<dyn StdError + Send + Sync>),
}

impl Cause {
    fn classify(cause: Box<dyn StdError + Send + Sync + 'static>, is_string: bool) -> Self {
        if is_string {
            return Self::Message(Cow::Owned(cause.to_string()));
        }

        let cause = match cause.downcast::<Error>() {
            Ok(err) => return Self::Chain(*err),
            Err(cause) => cause,
        };

        if let Some(err) = cause.downcast_ref::<&'static Error>() {
            return Self::Chain(Error::clone(err));
        }

        Self::External(Arc::from(cause))
    }
}

impl Root {
    pub(crate) fn stack(&self) -> Arc<Stack> {
        Arc::clone(&self.stack.lock())
    }

    fn merge(&self, new: &Stack) {
        let mut stack = self.stack.lock();
        if let Some(merged) = stack.merged_with(new) {
            *stack = Arc::new(merged);
        }
    }
}

impl Error {
    /// Creates a root error and captures the current call stack.
    #[must_use]
    #[inline(never)]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        ErrorBuilder::new().message(message).build()
    }

    /// Creates a new [`ErrorBuilder`] for configuring how a root error is captured.
    #[must_use]
    pub fn builder() -> ErrorBuilder {
        ErrorBuilder::new()
    }

    /// Adds `message` on top of `cause` and records the call site.
    ///
    /// - Wrapping one of this crate's errors keeps its root. A global root (one built inside a
    ///   lazily initialized static) is replaced by a copy carrying the stack of this call;
    ///   any other root gets this call site merged into its stack.
    /// - A string cause becomes a root error with that message.
    /// - Any other error becomes the cause of a new root with the same message, captured here.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unravel::Error;
    ///
    /// let io = std::io::Error::other("disk full");
    /// let err = Error::wrap(io, "failed to save");
    /// assert_eq!(err.to_string(), "failed to save: disk full");
    /// ```
    #[must_use]
    pub fn wrap<E>(cause: E, message: impl Into<Cow<'static, str>>) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let is_string = is_string_error(&cause);
        Self::wrap_cause(Cause::classify(cause.into(), is_string), message.into())
    }

    #[inline(never)]
    fn wrap_cause(cause: Cause, message: Cow<'static, str>) -> Self {
        let stack = Arc::new(Stack::capture(DEFAULT_MAX_DEPTH));
        let frame = stack.first();

        let cause = match cause {
            Cause::Message(root_message) => {
                let global = stack.is_global();
                Self::root(root_message, Arc::clone(&stack), global, global, None)
            }
            Cause::External(external) => {
                let shared = stack.is_global();
                Self::root(Cow::Owned(external.to_string()), Arc::clone(&stack), false, shared, Some(external))
            }
            Cause::Chain(err) => err.with_wrap_site(&stack),
        };

        Self {
            node: Arc::new(Node::Wrap(Wrap { message, cause, frame })),
        }
    }

    pub(crate) fn from_root_parts(message: Cow<'static, str>, stack: Stack, global: bool) -> Self {
        Self::root(message, Arc::new(stack), global, global, None)
    }

    fn root(
        message: Cow<'static, str>,
        stack: Arc<Stack>,
        global: bool,
        shared: bool,
        external: Option<Arc<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            node: Arc::new(Node::Root(Root {
                message,
                stack: Mutex::new(stack),
                global,
                shared,
                external,
            })),
        }
    }

    fn with_wrap_site(self, stack: &Arc<Stack>) -> Self {
        if self.terminal_root().shared {
            return self.copied_onto(stack);
        }
        self.terminal_root().merge(stack);
        self
    }

    /// Copies this chain onto a fresh root holding `stack`, leaving the original untouched.
    fn copied_onto(&self, stack: &Arc<Stack>) -> Self {
        match &*self.node {
            Node::Root(root) => Self::root(
                root.message.clone(),
                Arc::clone(stack),
                root.global,
                stack.is_global(),
                root.external.clone(),
            ),
            Node::Wrap(wrap) => Self {
                node: Arc::new(Node::Wrap(Wrap {
                    message: wrap.message.clone(),
                    cause: wrap.cause.copied_onto(stack),
                    frame: wrap.frame,
                })),
            },
        }
    }

    /// Views a chain element as one of this crate's errors, including `&'static Error` sentinels.
    pub(crate) fn from_dyn<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Self> {
        if let Some(err) = err.downcast_ref::<Self>() {
            return Some(err);
        }
        err.downcast_ref::<&'static Self>().copied()
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn terminal_root(&self) -> &Root {
        let mut node = &*self.node;
        loop {
            match node {
                Node::Root(root) => return root,
                Node::Wrap(wrap) => node = &wrap.cause.node,
            }
        }
    }

    /// Returns the message of this error alone, without its causes.
    #[must_use]
    pub fn message(&self) -> &str {
        match &*self.node {
            Node::Root(root) => &root.message,
            Node::Wrap(wrap) => &wrap.message,
        }
    }

    /// Returns whether this error is a root or a wrap.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match &*self.node {
            Node::Root(_) => ErrorKind::Root,
            Node::Wrap(_) => ErrorKind::Wrap,
        }
    }

    /// Returns whether the root of this chain was built inside a lazily initialized static.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.terminal_root().global
    }

    /// Returns the call site of a wrap, `None` for roots or when nothing was captured.
    #[must_use]
    pub fn wrap_frame(&self) -> Option<Frame> {
        match &*self.node {
            Node::Root(_) => None,
            Node::Wrap(wrap) => wrap.frame,
        }
    }

    /// Returns the foreign error adapted by the root of this chain, if any.
    #[must_use]
    pub fn external(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.terminal_root().external.as_deref()
    }

    /// Returns `true` if both handles share the same error.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &*self.node {
            Node::Wrap(wrap) => Some(&wrap.cause),
            Node::Root(root) => root.external.as_deref().map(|external| external as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let with_trace = f.alternate();
        let format = StringFormat::new(FormatOptions {
            with_trace,
            ..FormatOptions::default()
        });
        f.write_str(&unpack_with(self, with_trace).to_custom_string(&format))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = StringFormat::new(FormatOptions {
            with_trace: true,
            ..FormatOptions::default()
        });
        f.write_str(&unpack_with(self, true).to_custom_string(&format))
    }
}

const STR_TYPE_IDS: [typeid::ConstTypeId; 3] = [
    typeid::ConstTypeId::of::<&str>(),
    typeid::ConstTypeId::of::<String>(),
    typeid::ConstTypeId::of::<Cow<'_, str>>(),
];

fn is_string_error<T>(_: &T) -> bool {
    let typeid_of_t = typeid::of::<T>();
    STR_TYPE_IDS.iter().any(|&id| id == typeid_of_t)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("external error")]
    struct ExternalError;

    #[test]
    fn is_string_error_test() {
        assert!(is_string_error(&"a string slice"));
        assert!(is_string_error(&String::from("a string")));
        assert!(is_string_error(&Cow::Borrowed("a string slice")));
        assert!(!is_string_error(&std::io::Error::other("an io error")));
        assert!(!is_string_error(&Error::new("library error")));
    }

    #[test]
    fn new_is_root() {
        let err = Error::new("root error");
        assert_eq!(err.kind(), ErrorKind::Root);
        assert_eq!(err.message(), "root error");
        assert!(err.source().is_none());
        assert!(err.external().is_none());
        assert!(err.wrap_frame().is_none());
        assert!(!err.is_global());
    }

    #[test]
    fn wrap_string_synthesizes_root() {
        let err = Error::wrap("root error", "context");
        assert_eq!(err.kind(), ErrorKind::Wrap);
        assert_eq!(err.message(), "context");

        let root = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("root below the wrap");
        assert_eq!(root.kind(), ErrorKind::Root);
        assert_eq!(root.message(), "root error");
        assert!(root.external().is_none());
    }

    #[test]
    fn wrap_external_keeps_foreign_error() {
        let err = Error::wrap(ExternalError, "context");
        let root = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("synthesized root");
        assert_eq!(root.message(), "external error");
        assert!(!root.is_global());

        let external = root.source().expect("foreign error below the root");
        assert!(external.is::<ExternalError>());
        assert!(external.source().is_none());
        assert!(err.external().is_some_and(|e| e.is::<ExternalError>()));
    }

    #[test]
    fn wrap_shares_non_global_root() {
        let root = Error::new("root error");
        let err = Error::wrap(root.clone(), "context");
        let below = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("root below the wrap");
        assert!(below.ptr_eq(&root));
    }

    #[test]
    fn wrap_records_frame() {
        let err = Error::wrap(Error::new("root"), "context");
        let frame = err.wrap_frame().expect("wrap site");
        assert!(
            frame.resolve().iter().any(|f| f.name.contains("wrap_records_frame")),
            "{:?}",
            frame.resolve()
        );
    }

    #[test]
    fn wrap_merges_into_root_stack() {
        #[inline(never)]
        fn make_root() -> Error {
            Error::new("root")
        }

        let root = make_root();
        let before = root.terminal_root().stack();
        let err = Error::wrap(root.clone(), "context");
        let after = root.terminal_root().stack();

        let frame = err.wrap_frame().expect("wrap site");
        assert!(!before.frames().contains(&frame));
        assert!(after.frames().contains(&frame));
        assert_eq!(after.frames().len(), before.frames().len() + 1);
    }

    #[test]
    fn global_root_is_replaced() {
        let sentinel = Error::builder().message("not found").global(true).build();
        let err = Error::wrap(sentinel.clone(), "lookup failed");
        let below = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("root below the wrap");

        assert!(!below.ptr_eq(&sentinel));
        assert!(below.is_global());
        assert_eq!(below.message(), "not found");
        assert_eq!(below.terminal_root().stack().first(), err.wrap_frame());
    }

    #[test]
    fn wrapped_sentinel_is_copied() {
        static SENTINEL: std::sync::LazyLock<Error> =
            std::sync::LazyLock::new(|| Error::wrap(Error::new("not found"), "lookup failed"));

        let before = SENTINEL.stack_frames();
        let err = Error::wrap(&*SENTINEL, "request failed");

        assert_eq!(err.to_string(), "request failed: lookup failed: not found");
        assert_eq!(SENTINEL.stack_frames(), before);

        let copy = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("copied wrap");
        assert!(!copy.ptr_eq(&SENTINEL));
        assert_eq!(copy.wrap_frame(), SENTINEL.wrap_frame());
        assert_eq!(copy.terminal_root().stack().first(), err.wrap_frame());
    }

    #[test]
    fn static_reference_is_recognized() {
        static SENTINEL: std::sync::LazyLock<Error> = std::sync::LazyLock::new(|| Error::new("not found"));

        let err = Error::wrap(&*SENTINEL, "lookup failed");
        let below = err.source().and_then(|e| e.downcast_ref::<Error>()).expect("library root");
        assert_eq!(below.message(), "not found");
        assert!(below.external().is_none());
        assert!(SENTINEL.is_global());
    }

    #[test]
    fn display_and_debug() {
        let err = Error::wrap(Error::new("root error"), "context");
        assert_eq!(format!("{err}"), "context: root error");

        let with_trace = format!("{err:#}");
        assert!(with_trace.starts_with("context\n"), "{with_trace}");
        assert!(with_trace.contains("\nroot error\n"), "{with_trace}");
        assert_eq!(format!("{err:?}"), with_trace);
    }
}
