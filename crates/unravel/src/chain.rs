// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Walking and inspecting error chains.
//!
//! The free functions accept any error, so they work on chains that mix this crate's errors
//! with foreign ones.

use std::error::Error as StdError;
use std::iter::FusedIterator;

use crate::Error;
use crate::frame::Frame;

/// Iterator over an error and its causes, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Chain<'a> {
    /// Creates an iterator starting at `err`.
    #[must_use]
    pub fn new(err: &'a (dyn StdError + 'static)) -> Self {
        Self { next: Some(err) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

/// Returns the next error in the chain.
///
/// A wrap yields its cause, a root adapting a foreign error yields that error, and anything
/// else yields whatever its own [`source`](StdError::source) returns.
#[must_use]
pub fn unwrap<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    err.source()
}

/// Returns the last error in the chain.
#[must_use]
pub fn cause<'a>(err: Option<&'a (dyn StdError + 'static)>) -> Option<&'a (dyn StdError + 'static)> {
    err.and_then(|err| Chain::new(err).last())
}

/// Reports whether any error in the chain of `err` matches `target`.
///
/// An element matches when it is the very same object as `target`. One of this crate's errors
/// also matches a target of the same kind with the same message, or a target of another kind
/// whose full rendering equals its message. Two `None`s match each other and nothing else.
///
/// ```rust
/// use unravel::{Error, is};
///
/// let not_found = Error::new("not found");
/// let err = Error::wrap(Error::new("not found"), "lookup failed");
/// assert!(is(Some(&err), Some(&not_found)));
/// assert!(!is(Some(&err), None));
/// ```
#[must_use]
pub fn is(err: Option<&(dyn StdError + 'static)>, target: Option<&(dyn StdError + 'static)>) -> bool {
    match (err, target) {
        (None, None) => true,
        (Some(err), Some(target)) => Chain::new(err).any(|element| matches(element, target)),
        _ => false,
    }
}

/// Returns the first error in the chain that is a `T`.
#[must_use]
pub fn find<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    Chain::new(err).find_map(|element| element.downcast_ref::<T>())
}

/// Returns the call stack of the root at the end of the chain, with every merged wrap site.
///
/// Chains without one of this crate's roots yield an empty vector.
#[must_use]
pub fn stack_frames(err: &(dyn StdError + 'static)) -> Vec<Frame> {
    Chain::new(err)
        .find_map(Error::from_dyn)
        .map(|err| err.terminal_root().stack().frames().to_vec())
        .unwrap_or_default()
}

fn matches(element: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    if std::ptr::addr_eq(element, target) {
        return true;
    }

    let Some(element) = Error::from_dyn(element) else {
        return false;
    };

    match Error::from_dyn(target) {
        Some(target) if element.ptr_eq(target) => true,
        Some(target) if element.kind() == target.kind() => element.message() == target.message(),
        _ => element.message() == target.to_string(),
    }
}

impl Error {
    /// Returns an iterator over this error and its causes.
    #[must_use]
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Reports whether any error in this chain matches `target`. See [`is`](crate::is).
    #[must_use]
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        is(Some(self), Some(target))
    }

    /// Returns the first error in this chain that is a `T`.
    #[must_use]
    pub fn find<T: StdError + 'static>(&self) -> Option<&T> {
        find(self)
    }

    /// Returns the first error in this chain of the same kind as `target` with the same message.
    #[must_use]
    pub fn find_like(&self, target: &Self) -> Option<&Self> {
        self.chain()
            .filter_map(Self::from_dyn)
            .find(|element| element.kind() == target.kind() && element.message() == target.message())
    }

    /// Returns the last error in this chain.
    #[must_use]
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// Returns the call stack of the root of this chain, with every merged wrap site.
    #[must_use]
    pub fn stack_frames(&self) -> Vec<Frame> {
        self.terminal_root().stack().frames().to_vec()
    }
}
