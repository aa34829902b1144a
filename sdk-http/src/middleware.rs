/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `MapRequest` trait implemented by each stage of the middleware
//! chain (endpoint resolution, user-agent, signing, ...).

use crate::operation::Request;

/// A middleware stage that transforms a [`Request`] in place, possibly
/// failing.
///
/// Stages are composed in the fixed order the pipeline requires:
/// transport-level concerns first, then signing, leaving
/// service-specific and caller-supplied stages for last.
pub trait MapRequest {
    type Error;

    fn apply(&self, request: Request) -> Result<Request, Self::Error>;
}

impl<F, E> MapRequest for F
where
    F: Fn(Request) -> Result<Request, E>,
{
    type Error = E;

    fn apply(&self, request: Request) -> Result<Request, Self::Error> {
        (self)(request)
    }
}
