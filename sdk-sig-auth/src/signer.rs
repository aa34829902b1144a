/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-operation signing configuration and the signer that applies it
//! to a request.

use once_cell::sync::Lazy;
use regex::Regex;
use sdk_sigv4::http_request::{
    sign, PayloadChecksumKind, SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings,
    UriEncoding,
};
use sdk_types::region::{SigningRegion, SigningService};
use sdk_types::{Credentials, DateTime};
use std::time::Duration;
use thiserror::Error;

/// Whether (and how) a particular operation should be signed. Most
/// operations require standard signing; a few (e.g. presigned S3
/// `PutObject`) opt out of payload hashing, and some public, unsigned
/// operations opt out of signing entirely.
#[derive(Clone, Debug)]
pub struct SigningRequirements {
    pub disabled: bool,
    pub payload_checksum_kind: PayloadChecksumKind,
}

impl Default for SigningRequirements {
    fn default() -> Self {
        SigningRequirements {
            disabled: false,
            payload_checksum_kind: PayloadChecksumKind::NoHeader,
        }
    }
}

/// Signing configuration set once per operation (not per request), by
/// the generated operation metadata.
#[derive(Clone, Debug, Default)]
pub struct OperationSigningConfig {
    pub requirements: SigningRequirements,
    pub signing_options: SigningOptions,
}

/// Tunables that apply uniformly, independent of the specific
/// operation.
#[derive(Clone, Debug)]
pub struct SigningOptions {
    pub double_uri_encode: bool,
    pub content_sha256_header: bool,
    pub expires_in: Option<Duration>,
    pub signature_location: SignatureLocation,
}

impl Default for SigningOptions {
    fn default() -> Self {
        SigningOptions {
            double_uri_encode: true,
            content_sha256_header: false,
            expires_in: None,
            signature_location: SignatureLocation::Headers,
        }
    }
}

/// The resolved, request-specific configuration needed to sign: where
/// to sign to, and with what credentials.
#[derive(Clone, Debug)]
pub struct RequestConfig<'a> {
    pub region: &'a SigningRegion,
    pub service: &'a SigningService,
    pub request_ts: DateTime,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningError {
    #[error("signing requirements were disabled for this operation but signing was still attempted")]
    SigningNotRequired,
    #[error(transparent)]
    SigV4(#[from] sdk_sigv4::http_request::Error),
}

/// A regex matching one or more leading `/` in a path. S3 (and a few
/// other services) can receive object keys that legitimately start
/// with `/`, producing request paths like `//foo`; these must be
/// deduplicated to a single `/` before computing the canonical path,
/// or the signature will not match what the service computes.
static LEADING_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new("^/{2,}").unwrap());

pub(crate) fn dedupe_leading_forward_slashes(path: &str) -> std::borrow::Cow<'_, str> {
    LEADING_SLASHES.replace(path, "/")
}

#[derive(Default)]
pub struct SigV4Signer;

impl SigV4Signer {
    pub fn new() -> Self {
        SigV4Signer
    }

    /// Sign `request` in place, using `credentials` and the given
    /// per-operation/per-request configuration.
    pub fn sign(
        &self,
        operation_config: &OperationSigningConfig,
        request_config: &RequestConfig<'_>,
        credentials: &Credentials,
        request: &mut http::Request<sdk_http::SdkBody>,
    ) -> Result<(), SigningError> {
        if operation_config.requirements.disabled {
            return Ok(());
        }

        let deduped_path = dedupe_leading_forward_slashes(request.uri().path()).into_owned();
        if deduped_path != request.uri().path() {
            let mut parts = request.uri().clone().into_parts();
            let path_and_query = match request.uri().query() {
                Some(q) => format!("{deduped_path}?{q}"),
                None => deduped_path,
            };
            parts.path_and_query = Some(path_and_query.parse().expect("re-encoded path is valid"));
            *request.uri_mut() = http::Uri::from_parts(parts).expect("valid uri parts");
        }

        let body_bytes = request.body().bytes().unwrap_or(&[]).to_vec();
        let settings = SigningSettings {
            uri_encoding: if operation_config.signing_options.double_uri_encode {
                UriEncoding::Double
            } else {
                UriEncoding::Single
            },
            payload_checksum_kind: operation_config.requirements.payload_checksum_kind,
            signature_location: operation_config.signing_options.signature_location,
            expires_in: operation_config.signing_options.expires_in,
        };
        let params = SigningParams {
            access_key: credentials.access_key_id(),
            secret_key: credentials.secret_access_key(),
            security_token: credentials.session_token(),
            region: request_config.region,
            service: request_config.service,
            time: request_config.request_ts,
            settings,
        };

        warn_if_expiring_soon(credentials, request_config.request_ts);

        let method = request.method().clone();
        let uri = request.uri().clone();
        let headers = request.headers().clone();
        let signable = SignableRequest::new(&method, &uri, &headers, SignableBody::Bytes(&body_bytes));
        let instructions = sign(signable, &params)?;
        instructions.apply_to_headers(request.headers_mut())?;
        Ok(())
    }
}

fn warn_if_expiring_soon(credentials: &Credentials, now: DateTime) {
    if let Some(expiry) = credentials.expiry() {
        if expiry.secs() - now.secs() < 0 {
            tracing::warn!("credentials expired before signing; the request will likely be rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_leading_slashes() {
        assert_eq!(dedupe_leading_forward_slashes("//foo/bar"), "/foo/bar");
        assert_eq!(dedupe_leading_forward_slashes("/foo/bar"), "/foo/bar");
        assert_eq!(dedupe_leading_forward_slashes("///"), "/");
    }

    #[test]
    fn sign_populates_authorization_header() {
        let signer = SigV4Signer::new();
        let mut request = http::Request::builder()
            .method("GET")
            .uri("https://dynamodb.us-east-1.amazonaws.com/")
            .header("host", "dynamodb.us-east-1.amazonaws.com")
            .body(sdk_http::SdkBody::empty())
            .unwrap();

        let region = SigningRegion::from_static("us-east-1");
        let service = SigningService::from_static("dynamodb");
        let request_config = RequestConfig {
            region: &region,
            service: &service,
            request_ts: DateTime::from_secs(1440938160),
        };
        let credentials = Credentials::from_keys("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY", None);

        signer
            .sign(&OperationSigningConfig::default(), &request_config, &credentials, &mut request)
            .unwrap();

        assert!(request.headers().contains_key("authorization"));
        assert!(request.headers().contains_key("x-amz-date"));
    }
}
