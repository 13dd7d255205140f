// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Building and wrapping errors.

use std::error::Error as StdError;

use unravel::{Error, ErrorKind, WrapErr, err, wrap};

#[derive(Debug, thiserror::Error)]
#[error("external error")]
struct ExternalError;

#[test]
fn new_renders_its_message() {
    for message in ["root error", "", "with: separators\nand lines"] {
        assert_eq!(Error::new(message).to_string(), message);
    }
    assert_eq!(Error::new(String::from("owned")).to_string(), "owned");
}

#[test]
fn errorf_formats() {
    let code = 404;
    assert_eq!(err!("status {code}").to_string(), "status 404");
    assert_eq!(err!("{}-{}", "a", 1).to_string(), "a-1");
}

#[test]
fn wrapping_k_times() {
    let mut err = Error::new("root");
    for i in 1..=4 {
        err = wrap!(err, "m{i}");
    }

    assert_eq!(err.to_string(), "m4: m3: m2: m1: root");
    assert_eq!(err.chain().count(), 5);

    let mut current: Option<&(dyn StdError + 'static)> = Some(&err);
    for _ in 0..4 {
        current = current.and_then(unravel::unwrap);
    }
    let terminal = current.expect("root after four steps");
    assert_eq!(terminal.to_string(), "root");
    assert!(unravel::unwrap(terminal).is_none());
}

#[test]
fn wrapping_nil_stays_nil() {
    let mut current: Option<Error> = None;
    for i in 0..3 {
        current = wrap(current, format!("m{i}"));
    }
    assert!(current.is_none());

    let ok: Result<u8, Error> = Ok(1);
    assert_eq!(ok.wrap_err("never").ok(), Some(1));
}

#[test]
fn foreign_error_wrapped_once() {
    let err = Error::wrap(ExternalError, "ctx");
    assert_eq!(err.to_string(), "ctx: external error");

    let next = unravel::unwrap(&err).expect("synthesized root");
    assert_eq!(next.to_string(), "external error");

    let cause = unravel::cause(Some(&err)).expect("terminal");
    assert!(cause.is::<ExternalError>());
}

#[test]
fn foreign_error_wrapped_twice_keeps_single_root() {
    let err = Error::wrap(Error::wrap(ExternalError, "inner"), "outer");
    assert_eq!(err.to_string(), "outer: inner: external error");

    let roots = err
        .chain()
        .filter_map(|e| e.downcast_ref::<Error>())
        .filter(|e| e.kind() == ErrorKind::Root)
        .count();
    assert_eq!(roots, 1);
}

#[test]
fn boxed_errors_are_accepted() {
    let boxed: Box<dyn StdError + Send + Sync> = Box::new(ExternalError);
    let err = Error::wrap(boxed, "boxed");
    assert_eq!(err.to_string(), "boxed: external error");
    assert!(err.find::<ExternalError>().is_some());

    let boxed_library: Box<dyn StdError + Send + Sync> = Box::new(Error::new("library"));
    let err = Error::wrap(boxed_library, "boxed");
    assert!(err.external().is_none());
    assert_eq!(err.chain().count(), 2);
}

#[test]
fn question_mark_into_box() {
    fn inner() -> Result<(), Box<dyn StdError + Send + Sync>> {
        let result: Result<(), Error> = Err(Error::new("root"));
        result?;
        Ok(())
    }

    let err = inner().unwrap_err();
    let err = Error::wrap(err, "outer");
    assert_eq!(err.to_string(), "outer: root");
    assert_eq!(err.chain().count(), 2);
}

#[test]
fn clones_share_the_chain() {
    let err = Error::wrap(Error::new("root"), "ctx");
    let clone = err.clone();
    assert!(clone.ptr_eq(&err));
    assert_eq!(clone.to_string(), err.to_string());
}
