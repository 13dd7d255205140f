// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Procedural macros to support the [`unravel`](https://docs.rs/unravel) crate. See `unravel` for more information.
//!
//! # Macros
//!
//! - `#[wrap_err("message")]` - Wrap every error a function returns, recording the function as the wrap site

use proc_macro::TokenStream;

mod wrap_err;

/// Attribute macro wrapping every error returned by a function with a message.
///
/// Supports a plain message, a message with inline arguments (`"failed to read {path}"`), or a
/// format string followed by arguments (`"failed after {} tries", tries`). Without arguments the
/// message names the function. The message is only built when the function fails.
///
/// See the main `unravel` crate documentation for detailed usage examples.
#[proc_macro_attribute]
#[cfg_attr(test, mutants::skip)]
pub fn wrap_err(args: TokenStream, input: TokenStream) -> TokenStream {
    wrap_err::wrap_err(args, input)
}
