/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The request/response envelope and the per-operation metadata
//! (`MiddlewareContext`) carried alongside it through the middleware
//! chain.

use crate::body::SdkBody;
use crate::property_bag::PropertyBag;
use sdk_types::region::{SigningRegion, SigningService};
use sdk_types::Credentials;
use std::sync::Arc;

/// An HTTP request together with the property bag middleware uses to
/// pass typed configuration down the chain.
#[derive(Debug)]
pub struct Request {
    base: http::Request<SdkBody>,
    properties: PropertyBag,
}

impl Request {
    pub fn new(base: http::Request<SdkBody>) -> Self {
        Request {
            base,
            properties: PropertyBag::new(),
        }
    }

    pub fn http(&self) -> &http::Request<SdkBody> {
        &self.base
    }

    pub fn http_mut(&mut self) -> &mut http::Request<SdkBody> {
        &mut self.base
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    pub fn into_parts(self) -> (http::Request<SdkBody>, PropertyBag) {
        (self.base, self.properties)
    }

    /// Returns a replayable clone of this request if its body supports
    /// it, for use by the retry middleware.
    pub fn try_clone(&self) -> Option<Self> {
        let cloned_body = self.base.body().try_clone()?;
        let mut builder = http::Request::builder()
            .method(self.base.method().clone())
            .uri(self.base.uri().clone())
            .version(self.base.version());
        *builder.headers_mut().expect("builder is fresh") = self.base.headers().clone();
        let cloned = builder.body(cloned_body).expect("cloned from valid request");
        Some(Request {
            base: cloned,
            properties: PropertyBag::new(),
        })
    }
}

/// An HTTP response as returned by the transport, before protocol
/// decoding.
pub type Response = http::Response<SdkBody>;

/// The four pieces of per-request context the spec's middleware chain
/// requires every middleware stage to be able to read or set: the
/// signing region/service (set by endpoint resolution, read by
/// signing), the credentials provider to sign with, and the resolved
/// endpoint itself.
#[derive(Debug, Default)]
pub struct MiddlewareContext {
    pub signing_region: Option<SigningRegion>,
    pub signing_service: Option<SigningService>,
    pub credentials_provider: Option<Arc<dyn sdk_types::ProvideCredentials>>,
    pub credentials: Option<Credentials>,
}

impl MiddlewareContext {
    pub fn load(bag: &PropertyBag) -> Self {
        MiddlewareContext {
            signing_region: bag.get::<SigningRegion>().cloned(),
            signing_service: bag.get::<SigningService>().cloned(),
            credentials_provider: bag
                .get::<Arc<dyn sdk_types::ProvideCredentials>>()
                .cloned(),
            credentials: bag.get::<Credentials>().cloned(),
        }
    }

    pub fn store(self, bag: &mut PropertyBag) {
        if let Some(region) = self.signing_region {
            bag.insert(region);
        }
        if let Some(service) = self.signing_service {
            bag.insert(service);
        }
        if let Some(provider) = self.credentials_provider {
            bag.insert(provider);
        }
        if let Some(credentials) = self.credentials {
            bag.insert(credentials);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_try_clone_preserves_method_and_body() {
        let req = Request::new(
            http::Request::builder()
                .method("POST")
                .uri("https://example.com/")
                .body(SdkBody::from("payload"))
                .unwrap(),
        );
        let cloned = req.try_clone().expect("buffered body is replayable");
        assert_eq!(cloned.http().method(), "POST");
        assert_eq!(cloned.http().body().bytes(), Some(&b"payload"[..]));
    }

    #[test]
    fn middleware_context_round_trips_through_bag() {
        let mut bag = PropertyBag::new();
        let ctx = MiddlewareContext {
            signing_region: Some(SigningRegion::from_static("us-east-1")),
            signing_service: Some(SigningService::from_static("dynamodb")),
            credentials_provider: None,
            credentials: None,
        };
        ctx.store(&mut bag);
        let reloaded = MiddlewareContext::load(&bag);
        assert_eq!(reloaded.signing_region.unwrap().as_ref(), "us-east-1");
    }
}
