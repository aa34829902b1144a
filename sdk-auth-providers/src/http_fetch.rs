/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A minimal async HTTP fetch abstraction so the metadata-service
//! providers in this crate are testable without a live network; the
//! default implementation is a small standalone `hyper` client, kept
//! independent of `sdk-client`'s transport since credential resolution
//! must work before a service client exists to hand one down.

use hyper::{Body, Client};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;
type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A GET (and, for IMDSv2, PUT) capable fetch used to reach the ECS and
/// EC2 instance-metadata credential endpoints.
pub trait HttpFetch: Send + Sync {
    fn get<'a>(&'a self, uri: &'a str, auth_token: Option<&'a str>) -> BoxFuture<'a, Result<String, BoxError>>;

    fn put<'a>(&'a self, uri: &'a str, headers: &'a [(&'a str, &'a str)]) -> BoxFuture<'a, Result<String, BoxError>>;
}

/// Plain-HTTP client used to reach the link-local metadata services
/// (IMDS, the ECS/EKS container credentials endpoint). These never sit
/// behind TLS, so a bare `hyper::Client` (no `hyper-tls` connector) is
/// enough; this is deliberately its own client rather than one borrowed
/// from `sdk-client`, since credential resolution must work before a
/// service client exists.
pub struct HyperFetch {
    client: Client<hyper::client::HttpConnector>,
}

impl HyperFetch {
    pub fn new() -> Self {
        HyperFetch { client: Client::new() }
    }

    async fn send(&self, request: http::Request<Body>) -> Result<String, BoxError> {
        let response = self.client.request(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if !status.is_success() {
            return Err(format!("metadata endpoint returned {status}").into());
        }
        Ok(String::from_utf8(body.to_vec())?)
    }
}

impl Default for HyperFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch for HyperFetch {
    fn get<'a>(&'a self, uri: &'a str, auth_token: Option<&'a str>) -> BoxFuture<'a, Result<String, BoxError>> {
        Box::pin(async move {
            let mut builder = http::Request::builder().method("GET").uri(uri);
            if let Some(token) = auth_token {
                builder = builder.header("x-aws-ec2-metadata-token", token);
            }
            let request = builder.body(Body::empty())?;
            self.send(request).await
        })
    }

    fn put<'a>(&'a self, uri: &'a str, headers: &'a [(&'a str, &'a str)]) -> BoxFuture<'a, Result<String, BoxError>> {
        Box::pin(async move {
            let mut builder = http::Request::builder().method("PUT").uri(uri);
            for (name, value) in headers {
                builder = builder.header(*name, *value);
            }
            let request = builder.body(Body::empty())?;
            self.send(request).await
        })
    }
}

/// The default, process-wide metadata-service client shared by
/// `InstanceMetadataCredentialsProvider` and `EcsCredentialsProvider`
/// so neither needs a transport parameter threaded through its
/// constructor.
pub fn default_client() -> Arc<dyn HttpFetch> {
    Arc::new(HyperFetch::new())
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    /// A fetch stub that returns a fixed body (or error) regardless of
    /// the requested URI, for unit-testing providers.
    pub struct StaticFetch {
        body: Result<String, String>,
    }

    impl StaticFetch {
        pub fn ok(body: impl Into<String>) -> Self {
            StaticFetch { body: Ok(body.into()) }
        }

        pub fn err(message: impl Into<String>) -> Self {
            StaticFetch { body: Err(message.into()) }
        }
    }

    impl HttpFetch for StaticFetch {
        fn get<'a>(&'a self, _uri: &'a str, _auth_token: Option<&'a str>) -> BoxFuture<'a, Result<String, BoxError>> {
            Box::pin(async move { self.body.clone().map_err(|e| e.into()) })
        }

        fn put<'a>(&'a self, _uri: &'a str, _headers: &'a [(&'a str, &'a str)]) -> BoxFuture<'a, Result<String, BoxError>> {
            Box::pin(async move { self.body.clone().map_err(|e| e.into()) })
        }
    }
}
