// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builds a chain across a few calls and prints it with and without call stacks.

use std::sync::LazyLock;

use unravel::{Error, FormatOptions, StringFormat, WrapErr, wrap_err};

static NOT_FOUND: LazyLock<Error> = LazyLock::new(|| Error::new("not found"));

fn lookup(key: &str) -> unravel::Result<u32> {
    match key {
        "answer" => Ok(42),
        _ => Err(unravel::wrap!(&*NOT_FOUND, "no entry for {key}")),
    }
}

#[wrap_err("failed to load {name}")]
fn load(name: &str) -> unravel::Result<u32> {
    let value = lookup(name)?;
    Ok(value)
}

fn main() {
    let err = load("question").wrap_err("startup failed").unwrap_err();

    println!("{err}");
    println!();
    println!("{err:#}");
    println!();

    let inverted = StringFormat::new(FormatOptions {
        invert_output: true,
        ..FormatOptions::default()
    });
    println!("{}", unravel::to_custom_string(&err, &inverted));
    println!("sentinel in chain: {}", err.is(&*NOT_FOUND));
}
