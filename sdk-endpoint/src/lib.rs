/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Resolving the endpoint a request is sent to: the static precedence
//! table (`resolver`), the `MapRequest` stage that applies a resolved
//! endpoint and sets the signing region/service
//! (`AwsEndpointStage`), and the discovery cache used by operations
//! whose endpoint must itself be fetched from the service
//! (`discovery`).

pub mod discovery;
pub mod resolver;

pub use resolver::{EndpointResolver, ResolveAwsEndpoint};

use sdk_http::endpoint::{Endpoint, EndpointPrefix};
use sdk_http::middleware::MapRequest;
use sdk_http::operation::Request;
use sdk_types::region::{Region, SigningRegion, SigningService};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AwsEndpointStageError {
    #[error("no Region was set on the request")]
    MissingRegion,
    #[error("no endpoint resolver was set on the request")]
    MissingResolver,
    #[error(transparent)]
    EndpointResolution(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    EndpointApplication(#[from] sdk_http::endpoint::EndpointError),
}

/// Per-service parameters that narrow endpoint resolution: the
/// signing scope a resolved endpoint implies, and an optional
/// caller-supplied endpoint prefix (e.g. S3 virtual-hosted bucket
/// addressing).
#[derive(Clone, Debug, Default)]
pub struct Params {
    pub endpoint_prefix: Option<EndpointPrefix>,
}

/// The `MapRequest` stage that resolves and applies the endpoint, then
/// sets `SigningRegion`/`SigningService` from the resolver's
/// credential scope so the signing stage downstream doesn't need to
/// know anything about endpoints.
pub struct AwsEndpointStage;

impl MapRequest for AwsEndpointStage {
    type Error = AwsEndpointStageError;

    fn apply(&self, mut request: Request) -> Result<Request, Self::Error> {
        let region = request
            .properties()
            .get::<Region>()
            .cloned()
            .ok_or(AwsEndpointStageError::MissingRegion)?;
        let resolver = request
            .properties()
            .get::<Arc<dyn ResolveAwsEndpoint>>()
            .cloned()
            .ok_or(AwsEndpointStageError::MissingResolver)?;
        let params = request.properties().get::<Params>().cloned().unwrap_or_default();

        let resolved = resolver
            .resolve_endpoint(&region)
            .map_err(AwsEndpointStageError::EndpointResolution)?;

        let mut uri = request.http().uri().clone();
        resolved
            .endpoint
            .set_endpoint(&mut uri, params.endpoint_prefix.as_ref())?;
        *request.http_mut().uri_mut() = uri;

        request.properties_mut().insert(resolved.credential_scope.region);
        request.properties_mut().insert(resolved.credential_scope.service);
        tracing::debug!(endpoint = %resolved.endpoint.uri(), "resolved endpoint");

        Ok(request)
    }
}

/// The signing scope implied by a resolved endpoint: most services
/// sign with the request's own region/service, but some global
/// services pin signing to a fixed region (e.g. IAM always signs to
/// `us-east-1` regardless of which regional endpoint served the
/// request).
#[derive(Clone, Debug)]
pub struct CredentialScope {
    pub region: SigningRegion,
    pub service: SigningService,
}

/// The result of resolving an endpoint: the endpoint itself, plus the
/// signing scope it implies.
#[derive(Clone, Debug)]
pub struct ResolvedEndpoint {
    pub endpoint: Endpoint,
    pub credential_scope: CredentialScope,
}
