// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tests for the `wrap_err` attribute on async functions.
#![cfg(not(miri))]

use unravel::{Error, err, wrap_err};

#[tokio::test]
async fn simple_async_wrap() {
    #[wrap_err("async operation failed")]
    async fn fetch() -> unravel::Result<String> {
        std::future::ready(()).await;
        Err(Error::new("connection reset"))
    }

    let err = fetch().await.unwrap_err();
    assert_eq!(err.to_string(), "async operation failed: connection reset");
    assert!(err.wrap_frame().is_some());
}

#[tokio::test]
async fn async_with_params() {
    #[wrap_err("failed to fetch item {id}")]
    async fn fetch(id: u32) -> unravel::Result<String> {
        std::future::ready(()).await;
        Err(err!("item {id} unavailable"))
    }

    let err = fetch(42).await.unwrap_err();
    assert_eq!(err.to_string(), "failed to fetch item 42: item 42 unavailable");
}

#[tokio::test]
async fn async_success_passes_through() {
    #[wrap_err("never used")]
    async fn fetch(value: &str) -> unravel::Result<String> {
        std::future::ready(()).await;
        Ok(value.to_uppercase())
    }

    assert_eq!(fetch("ok").await.ok().as_deref(), Some("OK"));
}

#[tokio::test]
async fn async_wraps_nest() {
    #[wrap_err("inner step")]
    async fn inner() -> unravel::Result<()> {
        Err(Error::new("root"))
    }

    #[wrap_err("outer step")]
    async fn outer() -> unravel::Result<()> {
        inner().await?;
        Ok(())
    }

    let err = outer().await.unwrap_err();
    assert_eq!(err.to_string(), "outer step: inner step: root");
    assert_eq!(err.chain().count(), 3);
}
