/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The signable request view, the computed signing instructions, and
//! the top-level `sign()` entry point that dispatches on
//! [`SignatureLocation`].

use super::canonical_request::{CanonicalRequest, HMAC_256};
use super::{Error, SignatureLocation, SigningSettings};
use crate::sign::{calculate_signature, generate_signing_key, sha256_hex_string};
use http::{HeaderMap, HeaderValue, Method, Uri};
use sdk_types::date_time::{DateTime as SdkDateTime, Format};
use sdk_types::region::{SigningRegion, SigningService};

/// The body of a request being signed.
#[derive(Debug)]
pub enum SignableBody<'a> {
    /// The full payload, to be hashed.
    Bytes(&'a [u8]),
    /// A hash the caller already computed (e.g. for a streaming body
    /// whose checksum was computed up front).
    Precomputed(String),
    /// Skip payload signing entirely (used over TLS, where the
    /// transport already authenticates the body).
    UnsignedPayload,
}

/// A read-only view over the parts of a request needed for signing, so
/// the signer doesn't need to own (or mutate) the caller's request
/// type directly.
#[derive(Debug)]
pub struct SignableRequest<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
    body: SignableBody<'a>,
}

impl<'a> SignableRequest<'a> {
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap, body: SignableBody<'a>) -> Self {
        SignableRequest {
            method,
            uri,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        self.method
    }

    pub fn uri(&self) -> &Uri {
        self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        self.headers
    }

    pub fn body(&self) -> &SignableBody<'a> {
        &self.body
    }
}

/// Parameters needed to compute a SigV4 signature, independent of the
/// request being signed.
pub struct SigningParams<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub security_token: Option<&'a str>,
    pub region: &'a SigningRegion,
    pub service: &'a SigningService,
    pub time: SdkDateTime,
    pub settings: SigningSettings,
}

/// Redacts `secret_key`/`security_token` — this is logged via
/// `tracing::trace!` when signing, and a real secret must never reach a
/// log sink even at trace level.
impl<'a> std::fmt::Debug for SigningParams<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningParams")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("security_token", &self.security_token.map(|_| "** redacted **"))
            .field("region", &self.region)
            .field("service", &self.service)
            .field("time", &self.time)
            .field("settings", &self.settings)
            .finish()
    }
}

/// The headers (or query parameters) a caller must add to their
/// request to make it a validly signed SigV4 request.
#[derive(Debug)]
pub struct SigningInstructions {
    headers: Vec<(String, String)>,
    params: Vec<(String, String)>,
}

impl SigningInstructions {
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Apply these instructions to a request's headers.
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        for (name, value) in &self.headers {
            let header_name: http::HeaderName = name.parse().map_err(|_| {
                Error::UnsupportedSigningSettings("generated header name was invalid")
            })?;
            headers.insert(header_name, HeaderValue::from_str(value)?);
        }
        Ok(())
    }
}

/// Compute signing instructions for `request` under `params`.
pub fn sign<'a>(request: SignableRequest<'a>, params: &'a SigningParams<'a>) -> Result<SigningInstructions, Error> {
    let date_time = params.time.fmt(Format::DateTimeBasic);
    let date = params.time.fmt(Format::Date);
    let scope = format!("{date}/{}/{}/aws4_request", params.region.as_ref(), params.service.as_ref());

    tracing::trace!(request = ?request, params = ?params, "signing request");

    let creq = CanonicalRequest::from(&request, &params.settings, &date_time, params.security_token)?;
    let hashed_creq = sha256_hex_string(creq.to_string().as_bytes());
    let string_to_sign = format!("{HMAC_256}\n{date_time}\n{scope}\n{hashed_creq}");
    tracing::trace!(canonical_request = %creq, string_to_sign = %string_to_sign, "calculated signing parameters");

    let signing_key = generate_signing_key(params.secret_key, &date, params.region.as_ref(), params.service.as_ref());
    let signature = calculate_signature(&signing_key, string_to_sign.as_bytes());

    match params.settings.signature_location {
        SignatureLocation::Headers => {
            let mut headers = vec![("x-amz-date".to_string(), date_time.clone())];
            if let Some(token) = params.security_token {
                headers.push(("x-amz-security-token".to_string(), token.to_string()));
            }
            let authorization = format!(
                "{HMAC_256} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
                params.access_key,
                creq.signed_headers.to_string(),
            );
            headers.push(("authorization".to_string(), authorization));
            Ok(SigningInstructions {
                headers,
                params: vec![],
            })
        }
        SignatureLocation::QueryParams => {
            let credential = format!("{}/{scope}", params.access_key);
            let mut params_out = vec![
                ("X-Amz-Algorithm".to_string(), HMAC_256.to_string()),
                ("X-Amz-Credential".to_string(), credential),
                ("X-Amz-Date".to_string(), date_time),
                (
                    "X-Amz-Expires".to_string(),
                    params
                        .settings
                        .expires_in
                        .map(|d| d.as_secs().to_string())
                        .unwrap_or_else(|| "604800".to_string()),
                ),
                (
                    "X-Amz-SignedHeaders".to_string(),
                    creq.signed_headers.to_string(),
                ),
            ];
            if let Some(token) = params.security_token {
                params_out.push(("X-Amz-Security-Token".to_string(), token.to_string()));
            }
            params_out.push(("X-Amz-Signature".to_string(), signature));
            Ok(SigningInstructions {
                headers: vec![],
                params: params_out,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_request::{PayloadChecksumKind, UriEncoding};
    use http::header::HOST;

    fn reference_params(time: SdkDateTime) -> SigningParams<'static> {
        SigningParams {
            access_key: "AKIDEXAMPLE",
            secret_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            security_token: None,
            region: Box::leak(Box::new(SigningRegion::from_static("us-east-1"))),
            service: Box::leak(Box::new(SigningService::from_static("service"))),
            time,
            settings: SigningSettings {
                uri_encoding: UriEncoding::Double,
                payload_checksum_kind: PayloadChecksumKind::NoHeader,
                signature_location: super::super::SignatureLocation::Headers,
                expires_in: None,
            },
        }
    }

    #[test]
    fn header_signing_produces_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("example.amazonaws.com"));
        let method = Method::GET;
        let uri: Uri = "/".parse().unwrap();
        let request = SignableRequest::new(&method, &uri, &headers, SignableBody::Bytes(b""));

        let params = reference_params(SdkDateTime::from_secs(1440938160));
        let instructions = sign(request, &params).unwrap();
        let auth = instructions
            .headers()
            .iter()
            .find(|(name, _)| name == "authorization")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request"));
    }

    #[test]
    fn query_param_signing_adds_x_amz_signature() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("example.amazonaws.com"));
        let method = Method::GET;
        let uri: Uri = "/".parse().unwrap();
        let request = SignableRequest::new(&method, &uri, &headers, SignableBody::Bytes(b""));

        let mut params = reference_params(SdkDateTime::from_secs(1440938160));
        params.settings.signature_location = super::super::SignatureLocation::QueryParams;
        let instructions = sign(request, &params).unwrap();
        assert!(instructions.params().iter().any(|(k, _)| k == "X-Amz-Signature"));
    }
}
