/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A small dotted-path accessor over [`Document`]: `a.b.c` and
//! `a.b[2].c` forms. Shared by the paginator (input/output/more-results
//! token paths) and the waiter's JMESPath-subset matchers — neither
//! needs more than field projection and array indexing, so this stops
//! well short of the full JMESPath grammar (slicing, filters, pipes).

use sdk_types::Document;

enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

fn segments(path: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(bracket) = part.find('[') {
            let (field, rest) = part.split_at(bracket);
            if !field.is_empty() {
                segments.push(Segment::Field(field));
            }
            let mut rest = rest;
            while let Some(end) = rest.find(']') {
                if let Ok(index) = rest[1..end].parse::<usize>() {
                    segments.push(Segment::Index(index));
                }
                rest = &rest[end + 1..];
            }
        } else if !part.is_empty() {
            segments.push(Segment::Field(part));
        }
    }
    segments
}

/// Looks up `path` (e.g. `NextToken` or `Reservations[0].State.Name`)
/// within `doc`, returning `None` if any segment is absent or the wrong
/// shape.
pub fn get<'a>(doc: &'a Document, path: &str) -> Option<&'a Document> {
    let mut current = doc;
    for segment in segments(path) {
        current = match segment {
            Segment::Field(name) => current.as_object()?.get(name)?,
            Segment::Index(index) => current.as_array()?.get(index)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_a_nested_field() {
        let mut inner = HashMap::new();
        inner.insert("TableStatus".to_string(), Document::from("ACTIVE"));
        let mut outer = HashMap::new();
        outer.insert("Table".to_string(), Document::Object(inner));
        let doc = Document::Object(outer);
        assert_eq!(get(&doc, "Table.TableStatus").and_then(Document::as_str), Some("ACTIVE"));
    }

    #[test]
    fn reads_an_array_index() {
        let doc = Document::Array(vec![Document::from("a"), Document::from("b")]);
        assert_eq!(get(&doc, "[1]").and_then(Document::as_str), Some("b"));
    }

    #[test]
    fn missing_field_is_none() {
        let doc = Document::Object(HashMap::new());
        assert!(get(&doc, "Missing.Field").is_none());
    }
}
