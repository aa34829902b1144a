/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Builds an HTTP request from an operation's input `Document`,
//! dispatching each member to the header, query-string, URI template,
//! payload, or structured body per its [`MemberSchema`].

use crate::member::{FieldLocation, MemberSchema, OperationSchema};
use crate::protocol::Protocol;
use crate::{json, query, xml};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use sdk_http::SdkBody;
use sdk_types::document::Number;
use sdk_types::Document;
use std::collections::HashMap;
use thiserror::Error;

const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`').add(b'#').add(b'?').add(b'{').add(b'}').add(b'/');
const PATH_SEGMENT_GREEDY: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`').add(b'#').add(b'?').add(b'{').add(b'}');

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RequestBuildError {
    #[error("operation input is missing required member {0:?}")]
    MissingMember(&'static str),
    #[error("member {0:?} bound to the URI or a header must be a scalar value")]
    NonScalarBinding(&'static str),
    #[error(transparent)]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error(transparent)]
    Http(#[from] http::Error),
}

/// Builds the request for `operation` under `protocol`, given its
/// input document. `input` is expected to be a `Document::Object`
/// (or `Document::Null` for operations with no input members).
pub fn build(
    protocol: Protocol,
    operation: &OperationSchema,
    action_name: &str,
    input: &Document,
) -> Result<http::Request<SdkBody>, RequestBuildError> {
    let empty = HashMap::new();
    let fields = input.as_object().unwrap_or(&empty);

    let mut path = operation.http_uri.to_string();
    let mut query_pairs: Vec<(String, String)> = Vec::new();
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut body_fields: HashMap<String, Document> = HashMap::new();
    let mut payload: Option<&Document> = None;

    for member in operation.members {
        let value = fields.get(member.name);
        match member.location {
            FieldLocation::Header => {
                if let Some(value) = value {
                    headers.push((member.wire_name.to_string(), stringify_scalar(value, member)?));
                }
            }
            FieldLocation::QueryString => {
                if let Some(value) = value {
                    push_query_value(&mut query_pairs, member.wire_name, value);
                }
            }
            FieldLocation::Uri { greedy } => {
                let value = value.ok_or(RequestBuildError::MissingMember(member.name))?;
                let encoded = if greedy {
                    utf8_percent_encode(&stringify_scalar(value, member)?, PATH_SEGMENT_GREEDY).to_string()
                } else {
                    utf8_percent_encode(&stringify_scalar(value, member)?, PATH_SEGMENT).to_string()
                };
                let placeholder_braced = format!("{{{}}}", member.wire_name);
                let placeholder_greedy = format!("{{{}+}}", member.wire_name);
                path = path.replace(&placeholder_greedy, &encoded).replace(&placeholder_braced, &encoded);
            }
            FieldLocation::Payload => {
                if let Some(value) = value {
                    payload = Some(value);
                }
            }
            FieldLocation::Body => {
                if let Some(value) = value {
                    body_fields.insert(member.wire_name.to_string(), value.clone());
                }
            }
        }
    }

    let is_get_or_head = operation.http_method.eq_ignore_ascii_case("GET") || operation.http_method.eq_ignore_ascii_case("HEAD");

    let body = if is_get_or_head {
        for (key, value) in &body_fields {
            push_query_value(&mut query_pairs, key, value);
        }
        SdkBody::empty()
    } else {
        match protocol {
            Protocol::Json { target_prefix, .. } => {
                headers.push(("x-amz-target".to_string(), format!("{target_prefix}.{action_name}")));
                SdkBody::from(json::to_string(&Document::Object(body_fields)))
            }
            Protocol::RestJson => {
                if let Some(payload) = payload {
                    SdkBody::from(raw_payload(payload))
                } else if body_fields.is_empty() {
                    SdkBody::empty()
                } else {
                    SdkBody::from(json::to_string(&Document::Object(body_fields)))
                }
            }
            Protocol::Xml => SdkBody::from(xml::encode(action_name, &Document::Object(body_fields), None)),
            Protocol::RestXml { namespace } => {
                if let Some(payload) = payload {
                    SdkBody::from(raw_payload(payload))
                } else if body_fields.is_empty() {
                    SdkBody::empty()
                } else {
                    SdkBody::from(xml::encode(action_name, &Document::Object(body_fields), namespace))
                }
            }
            Protocol::Query { api_version } => {
                SdkBody::from(query::encode(&Document::Object(body_fields), action_name, api_version, false))
            }
            Protocol::Ec2 { api_version } => {
                SdkBody::from(query::encode(&Document::Object(body_fields), action_name, api_version, true))
            }
        }
    };

    query_pairs.sort();
    let mut uri = path;
    if !query_pairs.is_empty() {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &query_pairs {
            serializer.append_pair(k, v);
        }
        uri.push('?');
        uri.push_str(&serializer.finish());
    }

    let mut builder = http::Request::builder().method(operation.http_method).uri(uri.parse::<http::Uri>()?);
    builder = builder.header("content-type", protocol.content_type());
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }

    Ok(builder.body(body)?)
}

fn raw_payload(value: &Document) -> Vec<u8> {
    match value {
        Document::String(s) => s.clone().into_bytes(),
        other => json::to_string(other).into_bytes(),
    }
}

fn push_query_value(pairs: &mut Vec<(String, String)>, name: &str, value: &Document) {
    match value {
        Document::Array(items) => {
            for item in items {
                if let Ok(scalar) = stringify_any_scalar(item) {
                    pairs.push((name.to_string(), scalar));
                }
            }
        }
        other => {
            if let Ok(scalar) = stringify_any_scalar(other) {
                pairs.push((name.to_string(), scalar));
            }
        }
    }
}

fn stringify_scalar(value: &Document, member: &MemberSchema) -> Result<String, RequestBuildError> {
    if let Some(format) = member.timestamp_format {
        if let Document::Number(Number::PosInt(seconds)) = value {
            let dt = sdk_types::DateTime::from_secs(*seconds as i64);
            return Ok(dt.fmt(format));
        }
    }
    stringify_any_scalar(value).map_err(|_| RequestBuildError::NonScalarBinding(member.name))
}

fn stringify_any_scalar(value: &Document) -> Result<String, ()> {
    match value {
        Document::String(s) => Ok(s.clone()),
        Document::Bool(b) => Ok(b.to_string()),
        Document::Number(Number::PosInt(v)) => Ok(v.to_string()),
        Document::Number(Number::NegInt(v)) => Ok(v.to_string()),
        Document::Number(Number::Float(v)) => Ok(v.to_string()),
        Document::Null => Ok(String::new()),
        Document::Array(_) | Document::Object(_) => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> OperationSchema {
        OperationSchema {
            name: "GetWidget",
            http_method: "GET",
            http_uri: "/widgets/{id}",
            members: &[
                MemberSchema::body("id").with_location(FieldLocation::Uri { greedy: false }),
                MemberSchema::body("verbose").with_location(FieldLocation::QueryString),
            ],
        }
    }

    #[test]
    fn substitutes_uri_placeholder_and_adds_query() {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), Document::from("abc 123"));
        fields.insert("verbose".to_string(), Document::Bool(true));
        let request = build(Protocol::RestJson, &schema(), "GetWidget", &Document::Object(fields)).unwrap();
        assert_eq!(request.uri().path(), "/widgets/abc%20123");
        assert_eq!(request.uri().query(), Some("verbose=true"));
    }

    #[test]
    fn json_protocol_sets_target_header() {
        let schema = OperationSchema {
            name: "GetWidget",
            http_method: "POST",
            http_uri: "/",
            members: &[MemberSchema::body("name")],
        };
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), Document::from("widget"));
        let request = build(
            Protocol::Json { version: "1.1", target_prefix: "WidgetService" },
            &schema,
            "GetWidget",
            &Document::Object(fields),
        )
        .unwrap();
        assert_eq!(
            request.headers().get("x-amz-target").unwrap(),
            "WidgetService.GetWidget"
        );
        assert_eq!(request.headers().get("content-type").unwrap(), "application/x-amz-json-1.1");
    }

    #[test]
    fn query_protocol_flattens_body_into_form() {
        let schema = OperationSchema {
            name: "CreateThing",
            http_method: "POST",
            http_uri: "/",
            members: &[MemberSchema::body("Name")],
        };
        let mut fields = HashMap::new();
        fields.insert("Name".to_string(), Document::from("widget"));
        let request = build(
            Protocol::Query { api_version: "2015-01-01" },
            &schema,
            "CreateThing",
            &Document::Object(fields),
        )
        .unwrap();
        let body = request.body().bytes().unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert!(body.contains("Action=CreateThing"));
        assert!(body.contains("Name=widget"));
    }
}
