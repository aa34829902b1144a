/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `xml`/`restXml` structured-body protocols: a document with a
//! single root element, encoded/decoded directly against
//! [`Document`](sdk_types::Document) rather than through per-shape
//! generated code.
//!
//! No surviving XML binding source was available to ground this
//! against; the encoder/decoder below are hand-written to the wire
//! shape Smithy's XML traits describe (a structure's members become
//! child elements named after the member, repeated elements of a list
//! share the list member's tag name).

use sdk_types::document::Number;
use sdk_types::Document;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum XmlError {
    #[error("unexpected end of XML input")]
    UnexpectedEof,
    #[error("malformed tag starting at byte offset {0}")]
    MalformedTag(usize),
}

/// Encodes `body` as an XML document whose root element is named
/// `root_name`, with an optional namespace declaration on the root.
pub fn encode(root_name: &str, body: &Document, namespace: Option<&str>) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(root_name);
    if let Some(ns) = namespace {
        out.push_str(" xmlns=\"");
        out.push_str(&escape_text(ns));
        out.push('"');
    }
    out.push('>');
    write_children(&mut out, body);
    out.push_str("</");
    out.push_str(root_name);
    out.push('>');
    out
}

fn write_children(out: &mut String, value: &Document) {
    match value {
        Document::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            for key in keys {
                write_element(out, key, &fields[key]);
            }
        }
        other => write_scalar(out, other),
    }
}

fn write_element(out: &mut String, name: &str, value: &Document) {
    match value {
        Document::Null => {}
        Document::Array(items) => {
            for item in items {
                out.push('<');
                out.push_str(name);
                out.push('>');
                write_element_body(out, item);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        other => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            write_element_body(out, other);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_element_body(out: &mut String, value: &Document) {
    match value {
        Document::Object(_) => write_children(out, value),
        other => write_scalar(out, other),
    }
}

fn write_scalar(out: &mut String, value: &Document) {
    match value {
        Document::Null => {}
        Document::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Document::Number(n) => out.push_str(&format_number(n)),
        Document::String(s) => out.push_str(&escape_text(s)),
        Document::Array(_) | Document::Object(_) => write_children(out, value),
    }
}

fn format_number(n: &Number) -> String {
    match n {
        Number::PosInt(v) => v.to_string(),
        Number::NegInt(v) => v.to_string(),
        Number::Float(v) => v.to_string(),
    }
}

fn escape_text(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_text(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// The decoded root element: its tag name and its children as a
/// `Document` (an `Object`, or `String` if the element had only text
/// content and no child elements).
pub struct ParsedElement {
    pub name: String,
    pub body: Document,
}

/// Parses one XML document, returning its root element.
pub fn parse(input: &str) -> Result<ParsedElement, XmlError> {
    let mut cursor = Cursor { input, pos: 0 };
    cursor.skip_prolog();
    let (name, body) = cursor.parse_element()?;
    Ok(ParsedElement { name, body })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_prolog(&mut self) {
        self.skip_whitespace();
        if self.rest().starts_with("<?") {
            if let Some(end) = self.rest().find("?>") {
                self.pos += end + 2;
            }
        }
        self.skip_whitespace();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Parses `<name ...>...</name>` (or the self-closing form),
    /// returning the tag name and its decoded body: `Object` when the
    /// element has child elements (repeated child tags collapse into
    /// an `Array`), otherwise the unescaped text content as a
    /// `String`, or `Document::Null` when the element is empty.
    fn parse_element(&mut self) -> Result<(String, Document), XmlError> {
        self.skip_whitespace();
        if self.rest().chars().next() != Some('<') {
            return Err(XmlError::MalformedTag(self.pos));
        }
        let tag_end = self.rest().find('>').ok_or(XmlError::UnexpectedEof)?;
        let tag_content = &self.rest()[1..tag_end];
        let self_closing = tag_content.ends_with('/');
        let tag_content = tag_content.trim_end_matches('/').trim();
        let name = tag_content.split_whitespace().next().unwrap_or("").to_string();
        self.pos += tag_end + 1;

        if self_closing {
            return Ok((name, Document::Null));
        }

        let close_tag = format!("</{name}>");
        let mut children: HashMap<String, Document> = HashMap::new();
        let mut text = String::new();

        loop {
            if self.rest().starts_with(&close_tag) {
                self.pos += close_tag.len();
                break;
            }
            if self.rest().is_empty() {
                return Err(XmlError::UnexpectedEof);
            }
            if self.rest().starts_with('<') {
                let (child_name, child_body) = self.parse_element()?;
                insert_child(&mut children, child_name, child_body);
            } else {
                let next_tag = self.rest().find('<').unwrap_or(self.rest().len());
                text.push_str(&unescape_text(&self.rest()[..next_tag]));
                self.pos += next_tag;
            }
        }

        if children.is_empty() {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok((name, Document::Null))
            } else {
                Ok((name, Document::String(trimmed.to_string())))
            }
        } else {
            Ok((name, Document::Object(children)))
        }
    }
}

fn insert_child(children: &mut HashMap<String, Document>, name: String, body: Document) {
    match children.remove(&name) {
        Some(Document::Array(mut items)) => {
            items.push(body);
            children.insert(name, Document::Array(items));
        }
        Some(existing) => {
            children.insert(name, Document::Array(vec![existing, body]));
        }
        None => {
            children.insert(name, body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_scalar_fields_sorted() {
        let mut fields = HashMap::new();
        fields.insert("Name".to_string(), Document::from("widget"));
        fields.insert("Count".to_string(), Document::Number(Number::PosInt(3)));
        let xml = encode("Item", &Document::Object(fields), None);
        assert_eq!(xml, "<Item><Count>3</Count><Name>widget</Name></Item>");
    }

    #[test]
    fn encodes_list_as_repeated_elements() {
        let mut fields = HashMap::new();
        fields.insert(
            "Tag".to_string(),
            Document::Array(vec![Document::from("a"), Document::from("b")]),
        );
        let xml = encode("Tags", &Document::Object(fields), None);
        assert_eq!(xml, "<Tags><Tag>a</Tag><Tag>b</Tag></Tags>");
    }

    #[test]
    fn applies_namespace_to_root() {
        let xml = encode("Item", &Document::Object(HashMap::new()), Some("https://example.com"));
        assert!(xml.starts_with("<Item xmlns=\"https://example.com\">"));
    }

    #[test]
    fn escapes_special_characters() {
        let mut fields = HashMap::new();
        fields.insert("Name".to_string(), Document::from("<a & b>"));
        let xml = encode("Item", &Document::Object(fields), None);
        assert_eq!(xml, "<Item><Name>&lt;a &amp; b&gt;</Name></Item>");
    }

    #[test]
    fn parses_nested_elements_into_object() {
        let parsed = parse("<Item><Name>widget</Name><Count>3</Count></Item>").unwrap();
        assert_eq!(parsed.name, "Item");
        let obj = parsed.body.as_object().unwrap();
        assert_eq!(obj.get("Name").unwrap().as_str(), Some("widget"));
    }

    #[test]
    fn parses_repeated_elements_into_array() {
        let parsed = parse("<Tags><Tag>a</Tag><Tag>b</Tag></Tags>").unwrap();
        let obj = parsed.body.as_object().unwrap();
        assert_eq!(obj.get("Tag").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn round_trips_through_encode_and_parse() {
        let mut fields = HashMap::new();
        fields.insert("Name".to_string(), Document::from("widget"));
        let original = Document::Object(fields);
        let xml = encode("Item", &original, None);
        let parsed = parse(&xml).unwrap();
        assert_eq!(parsed.body, original);
    }
}
