/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Signing HTTP requests specifically (as opposed to, e.g., event
//! stream messages, which are out of scope here).

pub mod canonical_request;
pub mod sign;
mod url_escape;

pub use canonical_request::CanonicalRequest;
pub use sign::{sign, SignableBody, SignableRequest, SigningInstructions, SigningParams};

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid header value produced during signing: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    #[error("invalid header name produced during signing: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error("unsupported signing settings: {0}")]
    UnsupportedSigningSettings(&'static str),
}

/// Where the computed signature should be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureLocation {
    /// In the `Authorization` header (the common case).
    Headers,
    /// As query-string parameters, for presigned URLs.
    QueryParams,
}

/// Whether the URI's path is already percent-encoded once (most AWS
/// services) or needs a second pass (S3, whose paths may legitimately
/// contain `%`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UriEncoding {
    Single,
    Double,
}

/// Whether to add an `x-amz-content-sha256` header with the payload
/// hash (required by S3 and a few other services).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadChecksumKind {
    NoHeader,
    XAmzSha256,
}

/// Tunable signing behavior, analogous to `SigningSettings` in the
/// teacher crate.
#[derive(Clone, Debug)]
pub struct SigningSettings {
    pub uri_encoding: UriEncoding,
    pub payload_checksum_kind: PayloadChecksumKind,
    pub signature_location: SignatureLocation,
    /// For presigned URLs: how long the signature remains valid.
    pub expires_in: Option<std::time::Duration>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        SigningSettings {
            uri_encoding: UriEncoding::Double,
            payload_checksum_kind: PayloadChecksumKind::NoHeader,
            signature_location: SignatureLocation::Headers,
            expires_in: None,
        }
    }
}
