use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::email::{ApiError, SendResponse};

/// Outcome of a submitted send.
///
/// Nothing inside runs until the `Delivery` is first polled, so a caller that
/// drops it without awaiting never waits on the operation.
#[must_use = "a Delivery does nothing unless awaited"]
pub struct Delivery {
    inner: BoxFuture<'static, Result<SendResponse, ApiError>>,
}

impl Delivery {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<SendResponse, ApiError>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }
}

impl Future for Delivery {
    type Output = Result<SendResponse, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Delivery")
    }
}
