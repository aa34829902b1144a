/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `MapRequest` stage that pulls signing configuration and
//! credentials out of the request's property bag and invokes
//! [`SigV4Signer`].

use crate::signer::{OperationSigningConfig, RequestConfig, SigV4Signer, SigningError};
use sdk_http::middleware::MapRequest;
use sdk_http::operation::Request;
use sdk_types::region::{SigningRegion, SigningService};
use sdk_types::{Credentials, DateTime};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningStageError {
    #[error("no OperationSigningConfig was set on the request")]
    MissingSigningConfig,
    #[error("no signing region was set on the request")]
    MissingSigningRegion,
    #[error("no signing service was set on the request")]
    MissingSigningService,
    #[error("no credentials were set on the request")]
    MissingCredentials,
    #[error(transparent)]
    SigningFailure(#[from] SigningError),
}

/// Signs the request with SigV4, reading `OperationSigningConfig`,
/// `SigningRegion`, `SigningService`, and `Credentials` out of the
/// property bag (placed there by earlier stages: endpoint resolution
/// sets the region/service, the credentials provider sets the
/// credentials).
#[derive(Default)]
pub struct SigV4SigningStage {
    signer: SigV4Signer,
}

impl SigV4SigningStage {
    pub fn new(signer: SigV4Signer) -> Self {
        SigV4SigningStage { signer }
    }
}

impl MapRequest for SigV4SigningStage {
    type Error = SigningStageError;

    fn apply(&self, mut request: Request) -> Result<Request, Self::Error> {
        let operation_config = request
            .properties()
            .get::<OperationSigningConfig>()
            .cloned()
            .ok_or(SigningStageError::MissingSigningConfig)?;
        let region = request
            .properties()
            .get::<SigningRegion>()
            .cloned()
            .ok_or(SigningStageError::MissingSigningRegion)?;
        let service = request
            .properties()
            .get::<SigningService>()
            .cloned()
            .ok_or(SigningStageError::MissingSigningService)?;
        let credentials = request
            .properties()
            .get::<Credentials>()
            .cloned()
            .ok_or(SigningStageError::MissingCredentials)?;

        let request_config = RequestConfig {
            region: &region,
            service: &service,
            request_ts: DateTime::now(),
        };

        self.signer
            .sign(&operation_config, &request_config, &credentials, request.http_mut())?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk_http::SdkBody;

    #[test]
    fn missing_credentials_is_reported() {
        let mut request = Request::new(
            http::Request::builder()
                .uri("https://example.amazonaws.com/")
                .body(SdkBody::empty())
                .unwrap(),
        );
        request.properties_mut().insert(OperationSigningConfig::default());
        request.properties_mut().insert(SigningRegion::from_static("us-east-1"));
        request.properties_mut().insert(SigningService::from_static("dynamodb"));

        let stage = SigV4SigningStage::default();
        let err = stage.apply(request).unwrap_err();
        assert!(matches!(err, SigningStageError::MissingCredentials));
    }

    #[test]
    fn fully_configured_request_is_signed() {
        let mut request = Request::new(
            http::Request::builder()
                .uri("https://example.amazonaws.com/")
                .header("host", "example.amazonaws.com")
                .body(SdkBody::empty())
                .unwrap(),
        );
        request.properties_mut().insert(OperationSigningConfig::default());
        request.properties_mut().insert(SigningRegion::from_static("us-east-1"));
        request.properties_mut().insert(SigningService::from_static("dynamodb"));
        request
            .properties_mut()
            .insert(Credentials::from_keys("akid", "secret", None));

        let stage = SigV4SigningStage::default();
        let signed = stage.apply(request).unwrap();
        assert!(signed.http().headers().contains_key("authorization"));
    }
}
