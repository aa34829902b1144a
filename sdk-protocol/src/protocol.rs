/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The protocol variants a generated service can select, and the
//! content-type/extra-header rules each implies.

/// Which wire protocol an operation uses. Selected once per service
/// (or, for `awsQueryCompatible` services, per the presence of an
/// error-code header), not per request.
#[derive(Clone, Copy, Debug)]
pub enum Protocol {
    /// `application/x-amz-json-1.0` or `-1.1`, with `X-Amz-Target`.
    Json { version: &'static str, target_prefix: &'static str },
    /// JSON body for non-`header`/`uri`/`querystring` members, method
    /// and URI from the operation's HTTP binding.
    RestJson,
    /// A single XML document with a named root, `text/xml`.
    Xml,
    /// Like `Xml`, but method/URI come from the operation's HTTP
    /// binding and an optional namespace is applied to the root.
    RestXml { namespace: Option<&'static str> },
    /// Flattened form-urlencoded body, `Action`/`Version` required.
    Query { api_version: &'static str },
    /// Like `Query`, but list flattening omits the `.member` wrapper.
    Ec2 { api_version: &'static str },
}

impl Protocol {
    pub fn content_type(&self) -> &'static str {
        match self {
            Protocol::Json { version, .. } if *version == "1.0" => "application/x-amz-json-1.0",
            Protocol::Json { .. } => "application/x-amz-json-1.1",
            Protocol::RestJson => "application/json",
            Protocol::Xml | Protocol::RestXml { .. } => "text/xml",
            Protocol::Query { .. } | Protocol::Ec2 { .. } => "application/x-www-form-urlencoded",
        }
    }

    pub fn is_query_like(&self) -> bool {
        matches!(self, Protocol::Query { .. } | Protocol::Ec2 { .. })
    }

    pub fn is_json_like(&self) -> bool {
        matches!(self, Protocol::Json { .. } | Protocol::RestJson)
    }

    pub fn is_xml_like(&self) -> bool {
        matches!(self, Protocol::Xml | Protocol::RestXml { .. })
    }
}
