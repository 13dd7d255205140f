// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::error::Error as StdError;

use crate::Error;

/// Wraps the error of a `Result`, or the absence of a value in an `Option`.
///
/// Success values pass through untouched and no call stack is captured for them.
///
/// ```rust
/// use unravel::WrapErr;
///
/// fn read(path: &str) -> unravel::Result<String> {
///     std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))
/// }
///
/// let err = read("/definitely/not/here").unwrap_err();
/// assert!(err.to_string().starts_with("failed to read /definitely/not/here: "));
/// ```
pub trait WrapErr<T> {
    /// Wraps the error with `message`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error when `self` holds no value.
    fn wrap_err(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error>;

    /// Wraps the error with a message built by `f`, which only runs on failure.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error when `self` holds no value.
    fn wrap_err_with<F, M>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>;
}

impl<T, E> WrapErr<T> for Result<T, E>
where
    E: Into<Box<dyn StdError + Send + Sync + 'static>>,
{
    fn wrap_err(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(cause) => Err(Error::wrap(cause, message)),
        }
    }

    fn wrap_err_with<F, M>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(cause) => Err(Error::wrap(cause, f())),
        }
    }
}

impl<T> WrapErr<T> for Option<T> {
    fn wrap_err(self, message: impl Into<Cow<'static, str>>) -> Result<T, Error> {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::new(message)),
        }
    }

    fn wrap_err_with<F, M>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>,
    {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::new(f())),
        }
    }
}

/// Wraps `cause` with `message` when there is one, `None` otherwise.
///
/// ```rust
/// use unravel::{Error, wrap};
///
/// assert!(wrap(None::<Error>, "context").is_none());
/// let err = wrap(Some(Error::new("root")), "context");
/// assert_eq!(err.map(|e| e.to_string()).as_deref(), Some("context: root"));
/// ```
#[must_use]
pub fn wrap<E>(cause: Option<E>, message: impl Into<Cow<'static, str>>) -> Option<Error>
where
    E: Into<Box<dyn StdError + Send + Sync + 'static>>,
{
    let cause = cause?;
    Some(Error::wrap(cause, message))
}
