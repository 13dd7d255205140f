// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Walking and matching error chains.

use std::error::Error as StdError;
use std::sync::LazyLock;

use unravel::{Error, ErrorKind, cause, find, is};

#[derive(Debug, thiserror::Error)]
#[error("external error")]
struct ExternalError;

#[derive(Debug, thiserror::Error)]
#[error("request failed")]
struct RequestError {
    #[source]
    source: Error,
}

static NOT_FOUND: LazyLock<Error> = LazyLock::new(|| Error::new("not found"));

#[test]
fn cause_of_wrapped_root_is_the_root() {
    let root = Error::new("root");
    let err = Error::wrap(Error::wrap(root.clone(), "a"), "b");

    let found = cause(Some(&err)).and_then(|e| e.downcast_ref::<Error>()).expect("library root");
    assert!(found.ptr_eq(&root));
    assert!(cause(None).is_none());
}

#[test]
fn is_finds_sentinels() {
    let err = Error::wrap(Error::wrap(&*NOT_FOUND, "lookup failed"), "request failed");
    assert!(is(Some(&err), Some(&*NOT_FOUND)));
    assert!(err.is(&*NOT_FOUND));
    assert!(!err.is(&Error::new("timeout")));
}

#[test]
fn is_against_none() {
    let err = Error::new("root");
    assert!(is(None, None));
    assert!(!is(Some(&err), None));
    assert!(!is(None, Some(&err)));
}

#[test]
fn is_through_foreign_wrapper() {
    let err = RequestError {
        source: Error::wrap(Error::new("connection reset"), "read failed"),
    };
    assert!(is(Some(&err), Some(&Error::new("connection reset"))));
    assert!(!is(Some(&err), Some(&Error::new("request failed"))));
}

#[test]
fn find_by_type_through_chain() {
    let err = Error::wrap(ExternalError, "ctx");
    assert!(find::<ExternalError>(&err).is_some());
    assert!(find::<std::io::Error>(&err).is_none());

    let wrapper = RequestError { source: err };
    let library = find::<Error>(&wrapper).expect("library error below the wrapper");
    assert_eq!(library.message(), "ctx");
}

#[test]
fn find_like_locates_sentinel_copy() {
    let err = Error::wrap(&*NOT_FOUND, "lookup failed");
    let found = err.find_like(&NOT_FOUND).expect("sentinel copy in chain");
    assert_eq!(found.kind(), ErrorKind::Root);
    assert_eq!(found.message(), "not found");
    assert!(!found.ptr_eq(&NOT_FOUND));
}

#[test]
fn root_cause_of_foreign_chain() {
    let err = Error::wrap(ExternalError, "ctx");
    assert!(err.root_cause().is::<ExternalError>());

    let root = Error::new("plain");
    let terminal: &(dyn StdError + 'static) = root.root_cause();
    assert!(terminal.downcast_ref::<Error>().is_some_and(|e| e.ptr_eq(&root)));
}

#[test]
fn stack_frames_follow_the_root() {
    let root = Error::new("root");
    let err = Error::wrap(root.clone(), "ctx");

    assert_eq!(unravel::stack_frames(&err), root.stack_frames());
    assert!(unravel::stack_frames(&ExternalError).is_empty());
    assert!(root.stack_frames().iter().all(|frame| frame.ip() != 0));
}
