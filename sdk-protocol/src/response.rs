/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Parses an HTTP response into an output `Document`, per protocol:
//! header-bound output members are read with type coercion, the
//! structured body (JSON or XML) supplies the rest, and a bound
//! payload member consumes the raw body.

use crate::member::{FieldLocation, OperationSchema};
use crate::protocol::Protocol;
use crate::{json, xml};
use sdk_types::document::Number;
use sdk_types::Document;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResponseParseError {
    #[error(transparent)]
    Json(#[from] json::JsonError),
    #[error(transparent)]
    Xml(#[from] xml::XmlError),
    #[error("response body was not valid UTF-8")]
    InvalidUtf8,
}

/// Parses `body`/`headers` into an output `Document`, unwrapping a
/// `json`/`xml`-protocol envelope (`<OperationResponse><OperationResult>
/// ...` for XML-family protocols) one level if present.
pub fn parse(
    protocol: Protocol,
    operation: &OperationSchema,
    headers: &http::HeaderMap,
    body: &[u8],
) -> Result<Document, ResponseParseError> {
    let mut fields: HashMap<String, Document> = HashMap::new();

    let body_doc = if body.is_empty() {
        Document::Object(HashMap::new())
    } else if protocol.is_json_like() {
        json::from_slice(body)?
    } else if protocol.is_xml_like() {
        let text = std::str::from_utf8(body).map_err(|_| ResponseParseError::InvalidUtf8)?;
        let parsed = xml::parse(text)?;
        unwrap_operation_envelope(operation.name, parsed.body)
    } else {
        Document::Object(HashMap::new())
    };

    if let Some(body_fields) = body_doc.as_object() {
        for member in operation.members {
            if matches!(member.location, FieldLocation::Body) {
                if let Some(value) = body_fields.get(member.wire_name) {
                    fields.insert(member.name.to_string(), value.clone());
                }
            }
        }
    }

    for member in operation.members {
        match member.location {
            FieldLocation::Header => {
                if let Some(value) = headers.get(member.wire_name) {
                    if let Ok(text) = value.to_str() {
                        fields.insert(member.name.to_string(), coerce_header_value(text));
                    }
                }
            }
            FieldLocation::Payload => {
                fields.insert(member.name.to_string(), Document::String(String::from_utf8_lossy(body).into_owned()));
            }
            _ => {}
        }
    }

    Ok(Document::Object(fields))
}

/// For `xml`/`restXml` responses, unwraps `<OperationNameResponse>
/// <OperationNameResult>...</OperationNameResult></OperationNameResponse>`
/// down to the `Result` element's body, if the root matches that
/// shape; otherwise returns the root body unchanged.
fn unwrap_operation_envelope(operation_name: &str, root_body: Document) -> Document {
    let result_tag = format!("{operation_name}Result");
    match root_body {
        Document::Object(ref fields) if fields.len() == 1 && fields.contains_key(&result_tag) => {
            fields[&result_tag].clone()
        }
        other => other,
    }
}

fn coerce_header_value(text: &str) -> Document {
    if let Ok(v) = text.parse::<u64>() {
        Document::Number(Number::PosInt(v))
    } else if let Ok(v) = text.parse::<i64>() {
        Document::Number(Number::NegInt(v))
    } else if let Ok(v) = text.parse::<f64>() {
        Document::Number(Number::Float(v))
    } else if text.eq_ignore_ascii_case("true") {
        Document::Bool(true)
    } else if text.eq_ignore_ascii_case("false") {
        Document::Bool(false)
    } else {
        Document::String(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberSchema;

    #[test]
    fn coerces_header_booleans_and_numbers() {
        assert_eq!(coerce_header_value("true"), Document::Bool(true));
        assert_eq!(coerce_header_value("42"), Document::Number(Number::PosInt(42)));
        assert_eq!(coerce_header_value("hello"), Document::String("hello".into()));
    }

    #[test]
    fn parses_json_body_and_header_output() {
        let schema = OperationSchema {
            name: "GetWidget",
            http_method: "GET",
            http_uri: "/widgets/{id}",
            members: &[
                MemberSchema::body("name"),
                MemberSchema::body("requestId").with_location(FieldLocation::Header).with_wire_name("x-request-id"),
            ],
        };
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", "abc-123".parse().unwrap());
        let output = parse(Protocol::RestJson, &schema, &headers, br#"{"name":"widget"}"#).unwrap();
        let obj = output.as_object().unwrap();
        assert_eq!(obj.get("name").unwrap().as_str(), Some("widget"));
        assert_eq!(obj.get("requestId").unwrap().as_str(), Some("abc-123"));
    }

    #[test]
    fn unwraps_xml_operation_result_envelope() {
        let schema = OperationSchema {
            name: "GetWidget",
            http_method: "POST",
            http_uri: "/",
            members: &[MemberSchema::body("name")],
        };
        let body = b"<GetWidgetResponse><GetWidgetResult><name>widget</name></GetWidgetResult></GetWidgetResponse>";
        let headers = http::HeaderMap::new();
        let output = parse(Protocol::Xml, &schema, &headers, body).unwrap();
        assert_eq!(output.as_object().unwrap().get("name").unwrap().as_str(), Some("widget"));
    }
}
