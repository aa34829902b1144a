/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The trait protocol codecs implement to turn a raw HTTP response into
//! a modeled output or error.

use crate::body::SdkBody;

/// Parses a complete, buffered HTTP response into a modeled type.
///
/// Implemented once per operation by the generated (here: hand-written
/// per test fixture) protocol codec glue; `Output` is typically
/// `Result<T, E>` where `E` is the operation's modeled error enum.
pub trait ParseHttpResponse {
    type Output;

    /// Inspect the response before the body is consumed; codecs that
    /// need header-bound fields (e.g. REST-bound response members)
    /// implement this to stash them, returning `Some` to short-circuit
    /// `parse_loaded` entirely (used by streaming operations that
    /// cannot buffer the body).
    fn parse_unloaded(&self, _response: &mut http::Response<SdkBody>) -> Option<Self::Output> {
        None
    }

    /// Parse a response whose body has already been fully buffered.
    fn parse_loaded(&self, response: &http::Response<SdkBody>) -> Self::Output;
}
