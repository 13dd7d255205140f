// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Formatting shorthands for building and wrapping errors.

/// Creates a root [`Error`](crate::Error) from a format string.
///
/// ```rust
/// use unravel::err;
///
/// let id = 42;
/// let err = err!("user {id} not found");
/// assert_eq!(err.to_string(), "user 42 not found");
/// ```
#[macro_export]
macro_rules! err {
    ($msg:literal $(,)?) => {
        $crate::Error::new(::std::format!($msg))
    };
    ($fmt:literal, $($arg:tt)*) => {
        $crate::Error::new(::std::format!($fmt, $($arg)*))
    };
}

/// Wraps an error with a message built from a format string.
///
/// ```rust
/// use unravel::{Error, wrap};
///
/// let attempt = 3;
/// let err = wrap!(Error::new("timeout"), "attempt {attempt} failed");
/// assert_eq!(err.to_string(), "attempt 3 failed: timeout");
/// ```
#[macro_export]
macro_rules! wrap {
    ($cause:expr, $msg:literal $(,)?) => {
        $crate::Error::wrap($cause, ::std::format!($msg))
    };
    ($cause:expr, $fmt:literal, $($arg:tt)*) => {
        $crate::Error::wrap($cause, ::std::format!($fmt, $($arg)*))
    };
}

/// Returns early with an error.
///
/// - `bail!("message {x}")` returns a new root error.
/// - `bail!(error)` returns the given [`Error`](crate::Error), converted with [`Into`].
///
/// ```rust
/// use unravel::bail;
///
/// fn check(value: i32) -> unravel::Result<i32> {
///     if value < 0 {
///         bail!("value must be non-negative, got {value}");
///     }
///     Ok(value)
/// }
///
/// assert_eq!(check(-1).unwrap_err().to_string(), "value must be non-negative, got -1");
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return ::core::result::Result::Err(::core::convert::Into::into($crate::err!($msg)))
    };
    ($fmt:literal, $($arg:tt)*) => {
        return ::core::result::Result::Err(::core::convert::Into::into($crate::err!($fmt, $($arg)*)))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err(::core::convert::Into::into($err))
    };
}
