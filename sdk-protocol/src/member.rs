/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The member metadata that drives field placement: generated code
//! pairs a shape's dynamic [`Document`](sdk_types::Document) value with
//! a static `&[MemberSchema]` describing where each field goes on the
//! wire, and the codecs in this crate place/extract fields by walking
//! that table rather than hand-writing per-operation (de)serializers.

use sdk_types::date_time::Format as TimestampFormat;

/// Where a member is placed on an HTTP request/response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldLocation {
    /// Stringified and written to the named HTTP header.
    Header,
    /// Added to the query parameter table.
    QueryString,
    /// Substituted into a `{name}` or `{name+}` path template
    /// placeholder; `greedy` members (`{name+}`) retain literal `/`.
    Uri { greedy: bool },
    /// This member *is* the request/response body (raw for
    /// blob/string, structured per protocol otherwise).
    Payload,
    /// Placed into the structured body alongside other `Body` members
    /// (the default for members with no binding trait).
    Body,
}

/// Static description of one structure member: its wire name, where it
/// goes, and (for timestamps) which format to encode with.
#[derive(Clone, Copy, Debug)]
pub struct MemberSchema {
    /// The field's name in Rust-land, used to look it up in the
    /// shape's `Document::Object` map.
    pub name: &'static str,
    /// The name this member is serialized under on the wire. Usually
    /// equal to `name`, but protocols may rename (e.g. a `uri` member
    /// bound to a different path placeholder).
    pub wire_name: &'static str,
    pub location: FieldLocation,
    pub timestamp_format: Option<TimestampFormat>,
}

impl MemberSchema {
    pub const fn body(name: &'static str) -> Self {
        MemberSchema {
            name,
            wire_name: name,
            location: FieldLocation::Body,
            timestamp_format: None,
        }
    }

    pub const fn with_location(mut self, location: FieldLocation) -> Self {
        self.location = location;
        self
    }

    pub const fn with_wire_name(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    pub const fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = Some(format);
        self
    }
}

/// Operation-level metadata needed to build a request independent of
/// any one protocol: the HTTP method/path template (for REST-style
/// protocols), the `Action`/`amzTarget` operation name, and the
/// service's API version (for query/ec2).
#[derive(Clone, Copy, Debug)]
pub struct OperationSchema {
    pub name: &'static str,
    pub http_method: &'static str,
    pub http_uri: &'static str,
    pub members: &'static [MemberSchema],
}
