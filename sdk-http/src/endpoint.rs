/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The endpoint types shared between static resolution (`sdk-endpoint`)
//! and the HTTP request mutation that applies a resolved endpoint.

use http::uri::{Authority, PathAndQuery, Scheme, Uri};
use std::fmt;

/// A resolved service endpoint: a URI with no path, just scheme and
/// authority, since the operation's own path is merged in afterward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    uri: Uri,
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint URI was invalid: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("failed to merge endpoint with request URI: {0}")]
    MergeFailure(#[from] http::Error),
}

impl Endpoint {
    pub fn immutable(uri: Uri) -> Self {
        Endpoint { uri }
    }

    pub fn from_str(uri: &str) -> Result<Self, EndpointError> {
        Ok(Endpoint {
            uri: uri.parse()?,
        })
    }

    /// Rewrite `request`'s URI to use this endpoint's scheme and
    /// authority, preserving the request's own path and query, and
    /// prepending any path the endpoint itself carries (for endpoints
    /// that embed an account-id or service prefix in the path).
    pub fn set_endpoint(&self, uri: &mut Uri, prefix: Option<&EndpointPrefix>) -> Result<(), EndpointError> {
        let authority = self
            .uri
            .authority()
            .cloned()
            .unwrap_or_else(|| Authority::from_static("localhost"));
        let authority = match prefix {
            Some(prefix) => {
                let host = format!("{}{}", prefix.0, authority.host());
                let with_port = match authority.port_u16() {
                    Some(port) => format!("{host}:{port}"),
                    None => host,
                };
                with_port.parse()?
            }
            None => authority,
        };
        let scheme = self.uri.scheme().cloned().unwrap_or(Scheme::HTTPS);
        let path_and_query: PathAndQuery = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        let merged_path = merge_paths(self.uri.path(), path_and_query.as_str());
        let mut builder = Uri::builder().scheme(scheme).authority(authority);
        builder = builder.path_and_query(merged_path.parse::<PathAndQuery>().map_err(http::Error::from)?);
        *uri = builder.build().map_err(http::Error::from)?;
        Ok(())
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }
}

fn merge_paths(endpoint_path: &str, request_path_and_query: &str) -> String {
    let endpoint_path = endpoint_path.trim_end_matches('/');
    if endpoint_path.is_empty() {
        request_path_and_query.to_string()
    } else {
        format!("{endpoint_path}{request_path_and_query}")
    }
}

/// A per-operation host-label prefix (e.g. `{Bucket}.` for S3 virtual
/// hosted-style addressing), validated against RFC 1123 host-label
/// rules before being spliced into the endpoint's authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointPrefix(String);

#[derive(Debug, thiserror::Error)]
#[error("invalid endpoint prefix {0:?}: must be a valid RFC 1123 host label")]
pub struct InvalidEndpointPrefix(String);

impl EndpointPrefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self, InvalidEndpointPrefix> {
        let prefix = prefix.into();
        let valid = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            && !prefix.starts_with('-')
            && !prefix.ends_with('-');
        if valid {
            Ok(EndpointPrefix(prefix))
        } else {
            Err(InvalidEndpointPrefix(prefix))
        }
    }
}

impl fmt::Display for EndpointPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
