/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The unit of work a client dispatches: a request alongside the
//! response parser and retry policy to run it with, plus the
//! service/operation name used for logging and request metrics.

use sdk_http::operation::Request;
use sdk_http::response::ParseHttpResponse;

/// The service/operation name pair attached to a request for logging
/// and the `aws_requests_total`/`aws_request_errors` counters.
#[derive(Clone, Copy, Debug)]
pub struct Metadata {
    pub service: &'static str,
    pub operation: &'static str,
}

impl Metadata {
    pub const fn new(service: &'static str, operation: &'static str) -> Self {
        Metadata { service, operation }
    }
}

/// A request bundled with the handler that parses its response and the
/// retry policy governing it. `Retry` is generic so different
/// operations can carry different [`crate::classify::ClassifyResponse`]
/// implementations (or a `tower::retry::Policy` built from one)
/// without this type depending on either concretely.
pub struct Operation<H, Retry> {
    request: Request,
    handler: H,
    retry_policy: Retry,
    metadata: Metadata,
}

impl<H, Retry> Operation<H, Retry> {
    pub fn new(request: Request, handler: H, retry_policy: Retry, metadata: Metadata) -> Self {
        Operation { request, handler, retry_policy, metadata }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn retry_policy(&self) -> &Retry {
        &self.retry_policy
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    /// Decomposes into the request, handler, retry policy, and metadata,
    /// for a client driving the retry loop itself.
    pub fn into_parts(self) -> (Request, H, Retry, Metadata) {
        (self.request, self.handler, self.retry_policy, self.metadata)
    }
}

impl<H: Clone, Retry: Clone> Operation<H, Retry> {
    /// A replayable clone for the retry middleware, or `None` if the
    /// request's body has already been consumed past the point of
    /// replay (e.g. a streaming upload mid-transmission).
    pub fn try_clone(&self) -> Option<Self> {
        Some(Operation {
            request: self.request.try_clone()?,
            handler: self.handler.clone(),
            retry_policy: self.retry_policy.clone(),
            metadata: self.metadata,
        })
    }
}

impl<H, O> Operation<H, crate::retry::StandardRetryStrategy<crate::classify::DefaultResponseClassifier>>
where
    H: ParseHttpResponse<Output = O>,
{
    /// Shorthand for building an operation with the default retry
    /// classification rules and a fresh token bucket.
    pub fn standard(request: Request, handler: H, metadata: Metadata, retry_config: crate::retry::RetryConfig) -> Self {
        let ctx = std::sync::Arc::new(std::sync::Mutex::new(crate::retry::RetryCtx::new(retry_config)));
        let retry_policy =
            crate::retry::StandardRetryStrategy::new(ctx, crate::classify::DefaultResponseClassifier);
        Operation::new(request, handler, retry_policy, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk_http::SdkBody;

    #[derive(Clone)]
    struct EchoHandler;

    impl ParseHttpResponse for EchoHandler {
        type Output = Result<(), ()>;

        fn parse_loaded(&self, _response: &http::Response<SdkBody>) -> Self::Output {
            Ok(())
        }
    }

    #[test]
    fn try_clone_preserves_metadata() {
        let request = Request::new(http::Request::builder().uri("https://example.com").body(SdkBody::from("x")).unwrap());
        let metadata = Metadata::new("dynamodb", "GetItem");
        let op = Operation::standard(request, EchoHandler, metadata, crate::retry::RetryConfig::default());
        let cloned = op.try_clone().expect("buffered body is replayable");
        assert_eq!(cloned.metadata().operation, "GetItem");
    }
}
