/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Wire protocol codecs: maps an operation's input `Document` to an
//! HTTP request, and an HTTP response back to an output `Document`,
//! driven entirely by a static [`member::MemberSchema`] table rather
//! than per-operation generated (de)serializers.
//!
//! Six protocols are supported: `json` (1.0/1.1), `restJson`, `xml`,
//! `restXml`, `query` (AWSQuery), and `ec2` (EC2Query). [`error`]
//! extracts `{code, message}` from an error response for each.

pub mod error;
pub mod json;
pub mod member;
pub mod protocol;
pub mod query;
pub mod request;
pub mod response;
pub mod xml;

pub use error::{extract, ExtractedError};
pub use member::{FieldLocation, MemberSchema, OperationSchema};
pub use protocol::Protocol;
pub use request::{build as build_request, RequestBuildError};
pub use response::{parse as parse_response, ResponseParseError};
