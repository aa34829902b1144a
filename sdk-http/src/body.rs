/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `SdkBody`: the request/response body type threaded through the
//! pipeline. Wraps either an in-memory buffer (the common case — most
//! AWS request/response bodies fit in memory and must be replayable for
//! retries) or a streaming `http_body::Body` for large payloads that
//! can't be buffered or re-sent.

use bytes::Bytes;
use http_body::Body as HttpBody;
use pin_project::pin_project;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

type BoxBody = Pin<Box<dyn HttpBody<Data = Bytes, Error = Box<dyn std::error::Error + Send + Sync>> + Send + Sync>>;

#[pin_project(project = SdkBodyProj)]
enum Inner {
    /// A body that has already been fully buffered in memory. Cloning
    /// this variant (via [`SdkBody::try_clone`]) is how a request is
    /// replayed across retries.
    Once(Option<Bytes>),
    /// A body backed by an opaque streaming source that cannot be
    /// replayed; retrying a request with this body will fail with
    /// [`SdkBody::try_clone`] returning `None`.
    Streaming(#[pin] BoxBody),
}

/// The body of an HTTP request or response as it moves through the
/// pipeline.
#[pin_project]
pub struct SdkBody {
    #[pin]
    inner: Inner,
}

impl SdkBody {
    pub fn from(bytes: impl Into<Bytes>) -> Self {
        SdkBody {
            inner: Inner::Once(Some(bytes.into())),
        }
    }

    pub fn empty() -> Self {
        SdkBody::from(Bytes::new())
    }

    pub fn from_dyn(body: BoxBody) -> Self {
        SdkBody {
            inner: Inner::Streaming(body),
        }
    }

    /// Returns a cheap clone of this body if it is replayable (i.e.
    /// fully buffered). Retry middleware must check this before
    /// re-attempting a request.
    pub fn try_clone(&self) -> Option<Self> {
        match &self.inner {
            Inner::Once(bytes) => Some(SdkBody {
                inner: Inner::Once(bytes.clone()),
            }),
            Inner::Streaming(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.inner {
            Inner::Once(Some(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Debug for SdkBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Once(bytes) => write!(f, "SdkBody::Once({} bytes)", bytes.as_ref().map_or(0, |b| b.len())),
            Inner::Streaming(_) => write!(f, "SdkBody::Streaming"),
        }
    }
}

impl HttpBody for SdkBody {
    type Data = Bytes;
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        let this = self.project();
        match this.inner.project() {
            SdkBodyProj::Once(bytes) => Poll::Ready(bytes.take().map(Ok)),
            SdkBodyProj::Streaming(body) => body.poll_data(cx),
        }
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<http::HeaderMap>, Self::Error>> {
        let this = self.project();
        match this.inner.project() {
            SdkBodyProj::Once(_) => Poll::Ready(Ok(None)),
            SdkBodyProj::Streaming(body) => body.poll_trailers(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.inner {
            Inner::Once(bytes) => bytes.as_ref().map_or(true, |b| b.is_empty()),
            Inner::Streaming(body) => body.is_end_stream(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_body_is_cloneable() {
        let body = SdkBody::from("hello");
        let clone = body.try_clone().expect("buffered bodies are replayable");
        assert_eq!(clone.bytes(), Some(&b"hello"[..]));
    }

    #[test]
    fn empty_body_reports_end_stream() {
        assert!(SdkBody::empty().is_end_stream());
    }
}
