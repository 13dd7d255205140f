// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for the unravel crate.
//!
//! This module is only available when the `test-util` feature is enabled.

/// Assert that an error renders to the expected message chain, ignoring call stacks.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # {
/// use unravel::{Error, assert_error_message};
///
/// let error = Error::wrap(Error::new("root error"), "context");
/// assert_error_message!(error, "context: root error");
/// # }
/// ```
#[macro_export]
#[cfg_attr(coverage_nightly, coverage(off))] // coverage doesn't handle panics well
macro_rules! assert_error_message {
    ($error:expr, $expected:expr) => {{
        let error_string = $crate::to_string(&$error, false);
        let expected: &str = $expected;
        if error_string != expected {
            panic!("left : {expected}\nright: {error_string}");
        }
    }};
}

/// Assert that the call stack of an error contains a frame whose function name contains `$function`.
///
/// Looks at the root stack and at every wrap site.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # {
/// use unravel::{Error, assert_frame};
///
/// fn load() -> Error {
///     Error::new("missing")
/// }
///
/// assert_frame!(load(), "load");
/// # }
/// ```
#[macro_export]
#[cfg_attr(coverage_nightly, coverage(off))] // coverage doesn't handle panics well
macro_rules! assert_frame {
    ($error:expr, $function:expr) => {{
        let unpacked = $crate::unpack(&$error);
        let function: &str = $function;
        let in_root = unpacked
            .root
            .iter()
            .flat_map(|root| root.stack.iter())
            .any(|frame| frame.name.contains(function));
        let in_chain = unpacked
            .chain
            .iter()
            .filter_map(|link| link.frame.as_ref())
            .any(|frame| frame.name.contains(function));
        if !in_root && !in_chain {
            panic!("no frame in `{function}`\n{unpacked:#?}");
        }
    }};
}
