// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Emits an error chain as a structured `tracing` event.

use unravel::{Error, FormatOptions, JsonFormat, WrapErr};

fn read_config(path: &str) -> unravel::Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let err = read_config("/no/such/config.toml").wrap_err("startup failed").unwrap_err();
    unravel::log::emit(&err, tracing::Level::ERROR, &JsonFormat::default());

    let traced = JsonFormat::new(FormatOptions {
        with_trace: true,
        ..FormatOptions::default()
    });
    let err = Error::wrap(err, "retrying");
    unravel::log::emit(&err, tracing::Level::WARN, &traced);
}
