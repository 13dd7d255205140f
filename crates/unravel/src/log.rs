// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Emitting error chains as structured [`tracing`] events.
//!
//! Only available with the `tracing` feature.

use std::error::Error as StdError;

use serde_json::Value;
use tracing::Level;

use crate::format::{self, JsonFormat};

/// Emits `err` as one event at `level`.
///
/// The event carries two fields: `error.message` holds the chain rendered on one line,
/// `error.chain` holds the chain rendered by `format` as JSON.
///
/// ```rust
/// use unravel::{Error, JsonFormat};
///
/// let err = Error::wrap(Error::new("connection reset"), "failed to fetch");
/// unravel::log::emit(&err, tracing::Level::ERROR, &JsonFormat::default());
/// ```
pub fn emit(err: &(dyn StdError + 'static), level: Level, format: &JsonFormat) {
    let message = format::to_string(err, false);
    let chain = Value::Object(format::to_custom_json(err, format)).to_string();

    match level {
        Level::ERROR => tracing::error!(error.message = %message, error.chain = %chain, "{message}"),
        Level::WARN => tracing::warn!(error.message = %message, error.chain = %chain, "{message}"),
        Level::INFO => tracing::info!(error.message = %message, error.chain = %chain, "{message}"),
        Level::DEBUG => tracing::debug!(error.message = %message, error.chain = %chain, "{message}"),
        _ => tracing::trace!(error.message = %message, error.chain = %chain, "{message}"),
    }
}
