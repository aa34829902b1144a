/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A minimal JSON reader/writer operating directly on
//! [`Document`](sdk_types::Document), used by the `json`/`restJson`
//! protocols for the structured body and by the `document` Smithy type
//! under every protocol.

mod escape;

use escape::{escape_string, unescape_string};
use sdk_types::document::Number;
use sdk_types::Document;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum JsonError {
    #[error("unexpected end of JSON input")]
    UnexpectedEof,
    #[error("unexpected character {0:?} at byte offset {1}")]
    UnexpectedChar(char, usize),
    #[error("invalid JSON string: {0}")]
    InvalidString(#[from] escape::EscapeError),
    #[error("invalid JSON number at byte offset {0}")]
    InvalidNumber(usize),
    #[error("trailing data after JSON value")]
    TrailingData,
}

pub fn to_string(doc: &Document) -> String {
    let mut out = String::new();
    write_document(&mut out, doc);
    out
}

fn write_document(out: &mut String, doc: &Document) {
    match doc {
        Document::Null => out.push_str("null"),
        Document::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Document::Number(n) => write_number(out, n),
        Document::String(s) => write_string(out, s),
        Document::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_document(out, item);
            }
            out.push(']');
        }
        Document::Object(fields) => {
            out.push('{');
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_document(out, &fields[*key]);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape_string(s));
    out.push('"');
}

fn write_number(out: &mut String, n: &Number) {
    use std::fmt::Write;
    match n {
        Number::PosInt(v) => write!(out, "{v}").unwrap(),
        Number::NegInt(v) => write!(out, "{v}").unwrap(),
        Number::Float(v) => write!(out, "{v}").unwrap(),
    }
}

pub fn from_slice(input: &[u8]) -> Result<Document, JsonError> {
    let text = std::str::from_utf8(input).map_err(|_| JsonError::InvalidNumber(0))?;
    let mut parser = Parser { input: text, pos: 0 };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(JsonError::TrailingData);
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, c: char) -> Result<(), JsonError> {
        match self.peek() {
            Some(found) if found == c => {
                self.pos += found.len_utf8();
                Ok(())
            }
            Some(found) => Err(JsonError::UnexpectedChar(found, self.pos)),
            None => Err(JsonError::UnexpectedEof),
        }
    }

    fn parse_value(&mut self) -> Result<Document, JsonError> {
        self.skip_whitespace();
        match self.peek().ok_or(JsonError::UnexpectedEof)? {
            '{' => self.parse_object(),
            '[' => self.parse_array(),
            '"' => self.parse_string().map(Document::String),
            't' => self.parse_literal("true", Document::Bool(true)),
            'f' => self.parse_literal("false", Document::Bool(false)),
            'n' => self.parse_literal("null", Document::Null),
            '-' | '0'..='9' => self.parse_number(),
            other => Err(JsonError::UnexpectedChar(other, self.pos)),
        }
    }

    fn parse_literal(&mut self, literal: &str, value: Document) -> Result<Document, JsonError> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(JsonError::UnexpectedChar(self.peek().unwrap_or('\0'), self.pos))
        }
    }

    fn parse_string(&mut self) -> Result<String, JsonError> {
        self.expect('"')?;
        let (unescaped, consumed) = unescape_string(self.rest())?;
        let value = unescaped.into_owned();
        self.pos += consumed;
        self.expect('"')?;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Document, JsonError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => self.pos += 1,
                '.' | 'e' | 'E' | '+' | '-' if self.pos > start => {
                    is_float = is_float || c == '.' || c == 'e' || c == 'E';
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let text = &self.input[start..self.pos];
        if is_float {
            let v: f64 = text.parse().map_err(|_| JsonError::InvalidNumber(start))?;
            Ok(Document::Number(Number::Float(v)))
        } else if let Ok(v) = text.parse::<u64>() {
            Ok(Document::Number(Number::PosInt(v)))
        } else {
            let v: i64 = text.parse().map_err(|_| JsonError::InvalidNumber(start))?;
            Ok(Document::Number(Number::NegInt(v)))
        }
    }

    fn parse_array(&mut self) -> Result<Document, JsonError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Document::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(other) => return Err(JsonError::UnexpectedChar(other, self.pos)),
                None => return Err(JsonError::UnexpectedEof),
            }
        }
        Ok(Document::Array(items))
    }

    fn parse_object(&mut self) -> Result<Document, JsonError> {
        self.expect('{')?;
        let mut fields = std::collections::HashMap::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Document::Object(fields));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            fields.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(other) => return Err(JsonError::UnexpectedChar(other, self.pos)),
                None => return Err(JsonError::UnexpectedEof),
            }
        }
        Ok(Document::Object(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn round_trips_scalar_values() {
        assert_eq!(from_slice(b"42").unwrap(), Document::Number(Number::PosInt(42)));
        assert_eq!(from_slice(b"-3").unwrap(), Document::Number(Number::NegInt(-3)));
        assert_eq!(from_slice(b"true").unwrap(), Document::Bool(true));
        assert_eq!(from_slice(br#""hi""#).unwrap(), Document::String("hi".into()));
        assert_eq!(from_slice(b"null").unwrap(), Document::Null);
    }

    #[test]
    fn parses_nested_object_and_array() {
        let parsed = from_slice(br#"{"a":[1,2,3],"b":{"c":"d"}}"#).unwrap();
        let obj = parsed.as_object().unwrap();
        assert_eq!(
            obj.get("a").unwrap().as_array().unwrap().len(),
            3
        );
        assert_eq!(
            obj.get("b").unwrap().as_object().unwrap().get("c").unwrap().as_str(),
            Some("d")
        );
    }

    #[test]
    fn writes_object_keys_sorted_for_determinism() {
        let mut fields = HashMap::new();
        fields.insert("zebra".to_string(), Document::from("z"));
        fields.insert("alpha".to_string(), Document::from("a"));
        let doc = Document::Object(fields);
        assert_eq!(to_string(&doc), r#"{"alpha":"a","zebra":"z"}"#);
    }

    #[test]
    fn escapes_strings_when_writing() {
        let doc = Document::String("line\nbreak".to_string());
        assert_eq!(to_string(&doc), r#""line\nbreak""#);
    }

    #[test]
    fn rejects_trailing_data() {
        assert_eq!(from_slice(b"1 2"), Err(JsonError::TrailingData));
    }
}
