/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Canonical request construction: the first step of SigV4 signing,
//! producing the exact byte string that gets hashed into the
//! string-to-sign.

use super::url_escape::{percent_encode, percent_encode_path};
use super::{Error, PayloadChecksumKind, SignableBody, SigningSettings, UriEncoding};
use crate::http_request::sign::SignableRequest;
use crate::sign::sha256_hex_string;
use http::header::{HeaderName, HOST, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, Uri};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

pub(crate) const HMAC_256: &str = "AWS4-HMAC-SHA256";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// A header name as it participates in the `SignedHeaders` list:
/// lowercase, ordered by byte value.
#[derive(Debug, Eq, PartialEq)]
struct CanonicalHeaderName(HeaderName);

impl PartialOrd for CanonicalHeaderName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalHeaderName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_str().cmp(other.0.as_str())
    }
}

/// The alphabetically sorted, semicolon-joined list of header names
/// that were included in the signature.
#[derive(Debug, PartialEq)]
pub struct SignedHeaders(Vec<CanonicalHeaderName>);

impl SignedHeaders {
    fn new(mut headers: Vec<CanonicalHeaderName>) -> Self {
        headers.sort();
        headers.dedup();
        SignedHeaders(headers)
    }
}

impl fmt::Display for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, header) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", header.0.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct CanonicalRequest<'a> {
    method: &'a Method,
    path: String,
    params: Option<String>,
    headers: HeaderMap,
    pub(crate) signed_headers: SignedHeaders,
    date_time: String,
    security_token: Option<&'a str>,
    content_sha256: Cow<'a, str>,
}

impl<'a> CanonicalRequest<'a> {
    /// Construct a canonical request from a signable view of a request.
    ///
    /// `date_time` must already be formatted in SigV4's basic ISO 8601
    /// form (`YYYYMMDD'T'HHMMSS'Z'`).
    pub fn from<'b>(
        req: &'b SignableRequest<'b>,
        settings: &SigningSettings,
        date_time: &str,
        security_token: Option<&'b str>,
    ) -> Result<CanonicalRequest<'b>, Error> {
        let path = req.uri().path();
        let path = match settings.uri_encoding {
            UriEncoding::Double => path.replace('%', "%25"),
            UriEncoding::Single => path.to_string(),
        };
        let payload_hash = Self::payload_hash(req.body());

        let (signed_headers, canonical_headers) =
            Self::headers(req, settings, &payload_hash, date_time, security_token)?;
        Ok(CanonicalRequest {
            method: req.method(),
            path,
            params: Self::params(req.uri()),
            headers: canonical_headers,
            signed_headers: SignedHeaders::new(signed_headers),
            date_time: date_time.to_string(),
            security_token,
            content_sha256: payload_hash,
        })
    }

    fn headers(
        req: &SignableRequest,
        settings: &SigningSettings,
        payload_hash: &str,
        date_time: &str,
        security_token: Option<&str>,
    ) -> Result<(Vec<CanonicalHeaderName>, HeaderMap), Error> {
        let mut canonical_headers = req.headers().clone();
        if !canonical_headers.contains_key(HOST) {
            if let Some(authority) = req.uri().authority() {
                canonical_headers.insert(HOST, HeaderValue::from_str(authority.as_str())?);
            }
        }
        canonical_headers.insert(X_AMZ_DATE, HeaderValue::from_str(date_time)?);

        if let Some(security_token) = security_token {
            let mut sec_header = HeaderValue::from_str(security_token)?;
            sec_header.set_sensitive(true);
            canonical_headers.insert(X_AMZ_SECURITY_TOKEN, sec_header);
        }

        if settings.payload_checksum_kind == PayloadChecksumKind::XAmzSha256 {
            canonical_headers.insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(payload_hash)?);
        }

        let mut signed_headers = Vec::with_capacity(canonical_headers.len());
        for (name, _) in &canonical_headers {
            // The user agent is commonly rewritten in-flight by proxies,
            // so it is excluded from the signature.
            if name != USER_AGENT {
                signed_headers.push(CanonicalHeaderName(name.clone()));
            }
        }
        Ok((signed_headers, canonical_headers))
    }

    fn payload_hash<'b>(body: &'b SignableBody<'b>) -> Cow<'b, str> {
        match body {
            SignableBody::Bytes(data) => Cow::Owned(sha256_hex_string(data)),
            SignableBody::Precomputed(digest) => Cow::Borrowed(digest.as_str()),
            SignableBody::UnsignedPayload => Cow::Borrowed(UNSIGNED_PAYLOAD),
        }
    }

    fn params(uri: &Uri) -> Option<String> {
        let query = uri.query()?;
        let mut params: Vec<(Cow<str>, Cow<str>)> = form_urlencoded::parse(query.as_bytes()).collect();
        params.sort();
        let mut out = String::new();
        for (i, (key, value)) in params.into_iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(&percent_encode(&key));
            out.push('=');
            out.push_str(&percent_encode(&value));
        }
        Some(out)
    }
}

impl fmt::Display for CanonicalRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", percent_encode_path(&self.path))?;
        writeln!(f, "{}", self.params.as_deref().unwrap_or(""))?;
        let mut sorted: Vec<_> = self.headers.keys().collect();
        sorted.sort_by_key(|name| name.as_str());
        sorted.dedup();
        for name in sorted {
            let mut values: Vec<&str> = self
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().unwrap_or(""))
                .collect();
            values.sort_unstable();
            writeln!(f, "{}:{}", name.as_str(), values.join(","))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.content_sha256)?;
        let _ = &self.date_time;
        let _ = &self.security_token;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_request::SignableRequest;
    use http::header::HOST;

    #[test]
    fn canonical_request_matches_reference_get_vanilla() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("example.amazonaws.com"));
        let method = Method::GET;
        let uri: Uri = "/".parse().unwrap();
        let request = SignableRequest::new(&method, &uri, &headers, SignableBody::Bytes(b""));
        let settings = SigningSettings::default();
        let creq = CanonicalRequest::from(&request, &settings, "20150830T123600Z", None).unwrap();
        let rendered = creq.to_string();
        assert!(rendered.starts_with("GET\n/\n\nhost:example.amazonaws.com\n"));
        assert!(rendered.contains("host;x-amz-date"));
    }

    #[test]
    fn query_params_are_sorted_and_encoded() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("example.amazonaws.com"));
        let method = Method::GET;
        let uri: Uri = "/?b=2&a=1".parse().unwrap();
        let request = SignableRequest::new(&method, &uri, &headers, SignableBody::Bytes(b""));
        let settings = SigningSettings::default();
        let creq = CanonicalRequest::from(&request, &settings, "20150830T123600Z", None).unwrap();
        assert_eq!(creq.params.as_deref(), Some("a=1&b=2"));
    }
}
