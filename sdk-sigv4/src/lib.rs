/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! AWS Signature Version 4 request signing.
//!
//! This crate implements the canonical request / string-to-sign /
//! signing-key-derivation algorithm described at
//! <https://docs.aws.amazon.com/general/latest/gr/sigv4_signing.html>,
//! independent of any particular HTTP client.

pub mod http_request;
pub mod sign;

pub use http_request::canonical_request::CanonicalRequest;
pub use http_request::{sign as sign_request, SignableBody, SignableRequest, SigningParams};
pub use sign::{calculate_signature, generate_signing_key, sha256_hex_string};
