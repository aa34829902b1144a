/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Extracting `{code, message}` from an error response, per protocol.
//! The generated service-specific error decoder consumes this to
//! build a typed error; when it recognizes neither `code` nor the
//! response shape, the orchestrator falls back to a raw/untyped error.

use crate::protocol::Protocol;
use crate::{json, query, xml};
use sdk_types::Document;

/// The protocol-agnostic result of locating an error's code and
/// message in a response.
#[derive(Clone, Debug, Default)]
pub struct ExtractedError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Extracts `code`/`message` from an error response's headers and
/// body, per the wire protocol in use.
pub fn extract(protocol: Protocol, headers: &http::HeaderMap, body: &[u8]) -> ExtractedError {
    match protocol {
        Protocol::Json { .. } => extract_json(body),
        Protocol::RestJson => extract_rest_json(headers, body),
        Protocol::Xml | Protocol::RestXml { .. } => extract_xml(body),
        Protocol::Query { .. } | Protocol::Ec2 { .. } => extract_xml(body),
    }
}

fn extract_json(body: &[u8]) -> ExtractedError {
    let Ok(doc) = json::from_slice(body) else {
        return ExtractedError::default();
    };
    let Some(obj) = doc.as_object() else {
        return ExtractedError::default();
    };
    let code = obj
        .get("__type")
        .and_then(Document::as_str)
        .map(|s| s.rsplit('#').next().unwrap_or(s).to_string());
    let message = obj
        .get("message")
        .or_else(|| obj.get("Message"))
        .and_then(Document::as_str)
        .map(str::to_string);
    ExtractedError { code, message }
}

fn extract_rest_json(headers: &http::HeaderMap, body: &[u8]) -> ExtractedError {
    let code = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(':').next().unwrap_or(s).rsplit('#').next().unwrap_or(s).to_string());
    let mut extracted = extract_json(body);
    extracted.code = code.or(extracted.code);
    extracted
}

fn extract_xml(body: &[u8]) -> ExtractedError {
    let Ok(text) = std::str::from_utf8(body) else {
        return ExtractedError::default();
    };
    let Ok(root) = xml::parse(text) else {
        return ExtractedError::default();
    };

    // The error element may be the root itself (`<Error>...`) or
    // nested under a wrapper (`<ErrorResponse><Error>...`); search one
    // level deep either way.
    let error_obj = if root.name == "Error" {
        root.body.as_object().cloned()
    } else {
        root.body
            .as_object()
            .and_then(|fields| fields.get("Error"))
            .and_then(Document::as_object)
            .cloned()
    };

    let Some(error_obj) = error_obj else {
        // `query`'s body is form-urlencoded, not XML; fall back to
        // scanning its pairs for an Error.Code-shaped key.
        if let Ok(text) = std::str::from_utf8(body) {
            let pairs = query::parse_pairs(text);
            if let Some(code) = pairs.get("Error.Code") {
                return ExtractedError {
                    code: Some(code.clone()),
                    message: pairs.get("Error.Message").cloned(),
                };
            }
        }
        return ExtractedError::default();
    };

    ExtractedError {
        code: error_obj.get("Code").and_then(Document::as_str).map(str::to_string),
        message: error_obj.get("Message").and_then(Document::as_str).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_error_type_and_message() {
        let body = br#"{"__type":"com.amazonaws.dynamodb#ResourceNotFoundException","message":"no such table"}"#;
        let extracted = extract_json(body);
        assert_eq!(extracted.code.as_deref(), Some("ResourceNotFoundException"));
        assert_eq!(extracted.message.as_deref(), Some("no such table"));
    }

    #[test]
    fn rest_json_prefers_header_code() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-amzn-errortype", "ResourceNotFoundException:http://...".parse().unwrap());
        let extracted = extract_rest_json(&headers, br#"{"message":"missing"}"#);
        assert_eq!(extracted.code.as_deref(), Some("ResourceNotFoundException"));
        assert_eq!(extracted.message.as_deref(), Some("missing"));
    }

    #[test]
    fn extracts_xml_error_from_wrapper() {
        let body = b"<ErrorResponse><Error><Code>Throttling</Code><Message>slow down</Message></Error></ErrorResponse>";
        let extracted = extract_xml(body);
        assert_eq!(extracted.code.as_deref(), Some("Throttling"));
        assert_eq!(extracted.message.as_deref(), Some("slow down"));
    }
}
