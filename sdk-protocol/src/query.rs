/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `query` (AWSQuery) and `ec2` (EC2Query) protocols: both encode
//! the input as a flattened `application/x-www-form-urlencoded` body,
//! differing only in how lists are flattened (`ec2` drops the
//! `.member` wrapper).

use sdk_types::document::Number;
use sdk_types::Document;
use std::collections::HashMap;

/// Encodes `input` as a sorted, flattened query-string body, with
/// `Action`/`Version` added as required by every AWSQuery/EC2Query
/// request.
pub fn encode(input: &Document, action: &str, api_version: &str, ec2: bool) -> String {
    let mut pairs = Vec::new();
    pairs.push(("Action".to_string(), action.to_string()));
    pairs.push(("Version".to_string(), api_version.to_string()));

    if let Document::Object(fields) = input {
        for (key, value) in fields {
            flatten(key, value, ec2, &mut pairs);
        }
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn flatten(prefix: &str, value: &Document, ec2: bool, out: &mut Vec<(String, String)>) {
    match value {
        Document::Null => {}
        Document::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Document::Number(n) => out.push((prefix.to_string(), format_number(n))),
        Document::String(s) => out.push((prefix.to_string(), s.clone())),
        Document::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let position = index + 1;
                let child_key = if ec2 {
                    format!("{prefix}.{position}")
                } else {
                    format!("{prefix}.member.{position}")
                };
                flatten(&child_key, item, ec2, out);
            }
        }
        // A nested object is treated as a Smithy map: flattened as
        // numbered key/value entry pairs, sorted here so entry
        // ordinals are deterministic across encodes of the same map.
        Document::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            for (index, key) in keys.iter().enumerate() {
                let position = index + 1;
                out.push((format!("{prefix}.entry.{position}.key"), (*key).clone()));
                flatten(&format!("{prefix}.entry.{position}.value"), &fields[*key], ec2, out);
            }
        }
    }
}

fn format_number(n: &Number) -> String {
    match n {
        Number::PosInt(v) => v.to_string(),
        Number::NegInt(v) => v.to_string(),
        Number::Float(v) => v.to_string(),
    }
}

/// Parses a flattened query-string body back into key/value pairs,
/// without attempting to reconstruct nested structure (decoding a
/// query-protocol response body is only used for error extraction,
/// which only needs top-level `Error.Code`/`Error.Message`-shaped
/// fields via the XML path, not the form body).
pub fn parse_pairs(body: &str) -> HashMap<String, String> {
    form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_list_with_member_wrapper_for_query() {
        let mut fields = HashMap::new();
        fields.insert(
            "Names".to_string(),
            Document::Array(vec![Document::from("a"), Document::from("b")]),
        );
        let encoded = encode(&Document::Object(fields), "ListThings", "2015-01-01", false);
        assert!(encoded.contains("Names.member.1=a"));
        assert!(encoded.contains("Names.member.2=b"));
    }

    #[test]
    fn flattens_list_without_member_wrapper_for_ec2() {
        let mut fields = HashMap::new();
        fields.insert(
            "InstanceIds".to_string(),
            Document::Array(vec![Document::from("i-1")]),
        );
        let encoded = encode(&Document::Object(fields), "DescribeInstances", "2016-11-15", true);
        assert!(encoded.contains("InstanceIds.1=i-1"));
        assert!(!encoded.contains("InstanceIds.member"));
    }

    #[test]
    fn flattens_nested_map_as_entries() {
        let mut inner = HashMap::new();
        inner.insert("a".to_string(), Document::from("1"));
        let mut fields = HashMap::new();
        fields.insert("Tags".to_string(), Document::Object(inner));
        let encoded = encode(&Document::Object(fields), "TagThing", "2015-01-01", false);
        assert!(encoded.contains("Tags.entry.1.key=a"));
        assert!(encoded.contains("Tags.entry.1.value=1"));
    }

    #[test]
    fn always_includes_action_and_version() {
        let encoded = encode(&Document::Object(HashMap::new()), "NoOp", "2020-01-01", false);
        assert!(encoded.contains("Action=NoOp"));
        assert!(encoded.contains("Version=2020-01-01"));
    }
}
