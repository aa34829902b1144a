/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The transport escape hatch: anything that can turn an
//! `http::Request<SdkBody>` into an `http::Response<SdkBody>` can back a
//! [`crate::Client`]. [`Standard`] wraps a hyper client (plain or TLS)
//! for the common case; [`HttpConnector::Dyn`] lets a caller plug in
//! their own tower `Service` (a test double, a proxy, a mock).

use bytes::Bytes;
use hyper::client::HttpConnector as HyperHttpConnector;
use sdk_http::body::SdkBody;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;
pub type ConnectorFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<SdkBody>, BoxError>> + Send>>;

/// A transport that turns a request into a response. Implemented for
/// [`Standard`] and for any `tower::Service<http::Request<SdkBody>,
/// Response = http::Response<SdkBody>>`.
pub trait HttpConnector: Send + Sync {
    fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture;
}

#[derive(Clone)]
enum Inner {
    Https(hyper::Client<hyper_tls::HttpsConnector<HyperHttpConnector>, hyper::Body>),
    Http(hyper::Client<HyperHttpConnector, hyper::Body>),
    Dyn(Arc<dyn HttpConnector>),
}

/// The connector a [`crate::Client`] dispatches requests through.
/// Defaults to [`Standard::https`]; swap in [`Standard::dyn_connector`]
/// to point at a test double or a non-hyper transport.
#[derive(Clone)]
pub struct Standard(Inner);

impl fmt::Debug for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Https(_) => write!(f, "Standard::Https"),
            Inner::Http(_) => write!(f, "Standard::Http"),
            Inner::Dyn(_) => write!(f, "Standard::Dyn"),
        }
    }
}

impl Standard {
    /// A hyper client with TLS support (`https://` and `http://`).
    pub fn https() -> Self {
        let https = hyper_tls::HttpsConnector::new();
        Standard(Inner::Https(hyper::Client::builder().build(https)))
    }

    /// A plain hyper client with no TLS support, for talking to an
    /// unencrypted local endpoint (e.g. a test server).
    pub fn http() -> Self {
        Standard(Inner::Http(hyper::Client::new()))
    }

    /// Wrap an arbitrary connector, e.g. a record/replay test double.
    pub fn dyn_connector(connector: impl HttpConnector + 'static) -> Self {
        Standard(Inner::Dyn(Arc::new(connector)))
    }
}

impl Default for Standard {
    fn default() -> Self {
        Standard::https()
    }
}

impl HttpConnector for Standard {
    fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture {
        match &self.0 {
            Inner::Https(client) => call_hyper(client.clone(), request),
            Inner::Http(client) => call_hyper(client.clone(), request),
            Inner::Dyn(connector) => connector.call(request),
        }
    }
}

/// `SdkBody` has no native wrapper over `hyper::Body`, so responses are
/// buffered fully here; operations that need a streaming response read
/// the raw bytes back out of the resulting `SdkBody` via `bytes()`.
fn call_hyper<C>(client: hyper::Client<C, hyper::Body>, request: http::Request<SdkBody>) -> ConnectorFuture
where
    C: hyper::client::connect::Connect + Clone + Send + Sync + 'static,
{
    Box::pin(async move {
        let (parts, body) = request.into_parts();
        let body = match body.bytes() {
            Some(bytes) => Bytes::copy_from_slice(bytes),
            None => hyper::body::to_bytes(body).await?,
        };
        let request = http::Request::from_parts(parts, hyper::Body::from(body));
        let response = client.request(request).await?;
        let (parts, body) = response.into_parts();
        let bytes = hyper::body::to_bytes(body).await?;
        Ok(http::Response::from_parts(parts, SdkBody::from(bytes)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_https_debug_does_not_panic() {
        let connector = Standard::https();
        assert_eq!(format!("{connector:?}"), "Standard::Https");
    }

    struct Echo;
    impl HttpConnector for Echo {
        fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture {
            let (_, body) = request.into_parts();
            Box::pin(async move { Ok(http::Response::new(body)) })
        }
    }

    #[tokio::test]
    async fn dyn_connector_round_trips_a_body() {
        let connector = Standard::dyn_connector(Echo);
        let request = http::Request::new(SdkBody::from("hello"));
        let response = connector.call(request).await.unwrap();
        assert_eq!(response.into_body().bytes(), Some(b"hello".as_slice()));
    }
}
