// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Error chains that remember the call path they travelled.
//!
//! Unravel attaches human-readable context to a failure as it propagates, keeps the original
//! cause reachable, and records where the error was created and every place it was wrapped.
//! A later observer can rebuild the whole causal chain and call path without reproducing the
//! failure.
//!
//! # Key Features
//!
//! - [**`Error`**](Error): a cheap-to-clone, `Send + Sync` error holding either a root (message
//!   and call stack) or a wrap (message, cause and wrap site)
//! - [**`WrapErr`**](WrapErr): `wrap_err` and `wrap_err_with` on `Result` and `Option`
//! - [**`#[wrap_err("...")]`**](wrap_err): attribute macro wrapping every error a function returns
//! - [**Inspection**](chain): [`is`], [`find`], [`cause`], [`unwrap`] and [`stack_frames`] on any error
//! - [**Formatting**](format): strings and JSON, with or without call stacks, in either order
//!
//! # Quick Start
//!
//! ```rust
//! use unravel::{Error, WrapErr};
//!
//! fn read_config(path: &str) -> unravel::Result<String> {
//!     std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))
//! }
//!
//! fn start() -> unravel::Result<()> {
//!     read_config("/no/such/config.toml").wrap_err("failed to start")?;
//!     Ok(())
//! }
//!
//! let err = start().unwrap_err();
//! assert!(err.to_string().starts_with("failed to start: failed to read /no/such/config.toml: "));
//! ```
//!
//! # Roots, Wraps and Foreign Errors
//!
//! Every chain ends in a root. [`Error::new`] and [`err!`] build one, capturing the current
//! call stack. [`Error::wrap`] and [`wrap!`] put a message on top of a cause and record the
//! call site:
//!
//! - Wrapping one of this crate's errors merges the wrap site into the root's call stack, so the
//!   stack shows the path the error travelled.
//! - Wrapping any other error builds a root carrying its message; the foreign error stays
//!   reachable through [`source`](std::error::Error::source).
//!
//! ```rust
//! use unravel::Error;
//!
//! let err = Error::wrap(std::io::Error::other("disk full"), "failed to save");
//! assert_eq!(err.to_string(), "failed to save: disk full");
//! assert!(err.find::<std::io::Error>().is_some());
//! ```
//!
//! # Sentinel Errors
//!
//! Errors built inside a lazily initialized static are global. Wrapping one never touches the
//! shared value; the wrap gets a fresh root with the stack of the wrap site instead.
//!
//! ```rust
//! use std::sync::LazyLock;
//!
//! use unravel::Error;
//!
//! static NOT_FOUND: LazyLock<Error> = LazyLock::new(|| Error::new("not found"));
//!
//! fn lookup(key: &str) -> unravel::Result<u32> {
//!     Err(Error::wrap(&*NOT_FOUND, format!("no entry for {key}")))
//! }
//!
//! let err = lookup("alpha").unwrap_err();
//! assert!(err.is(&*NOT_FOUND));
//! ```
//!
//! # Formatting
//!
//! `Display` renders the messages outermost first; the alternate form (`{:#}`) and `Debug` add
//! the call stacks. [`to_custom_string`] and [`to_custom_json`] take a [`StringFormat`] or a
//! [`JsonFormat`] for anything else.
//!
//! ```rust
//! use unravel::{Error, FormatOptions, StringFormat};
//!
//! let err = Error::wrap(Error::wrap(Error::new("root error"), "additional context"), "even more context");
//! assert_eq!(err.to_string(), "even more context: additional context: root error");
//!
//! let format = StringFormat::new(FormatOptions { invert_output: true, ..FormatOptions::default() });
//! assert_eq!(unravel::to_custom_string(&err, &format), "root error: additional context: even more context");
//!
//! let json = unravel::to_json(&err, false);
//! assert_eq!(
//!     serde_json::Value::Object(json).to_string(),
//!     r#"{"root":{"message":"root error"},"wrap":[{"message":"even more context"},{"message":"additional context"}]}"#
//! );
//! ```
//!
//! # Features
//!
//! - `tracing`: [`log::emit`] writes an error chain as a structured `tracing` event.
//! - `test-util`: assertion macros for tests.

#[doc(hidden)]
extern crate self as unravel;

mod builder;
pub mod chain;
mod error;
mod ext;
pub mod format;
mod frame;
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub mod log;
mod macros;
mod stack;
mod unpack;

#[cfg(any(feature = "test-util", test))]
pub mod test_util;

pub use builder::{CapturePolicy, ErrorBuilder};
pub use chain::{Chain, cause, find, is, stack_frames, unwrap};
pub use error::{Error, ErrorKind};
pub use ext::{WrapErr, wrap};
pub use format::{FormatOptions, JsonFormat, StringFormat, to_custom_json, to_custom_string, to_json, to_string};
pub use frame::{Frame, StackFrame};
pub use stack::DEFAULT_MAX_DEPTH;
pub use unpack::{UnpackedError, UnpackedLink, UnpackedRoot, unpack};
pub use unravel_macros::wrap_err;

/// A `Result` defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
