/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The top-level `Result` type returned by a client operation call.

use std::error::Error as StdError;
use std::fmt;

/// A successful operation result, carrying the raw response alongside
/// the parsed value for callers that need response metadata (request
/// id, headers).
#[derive(Debug)]
pub struct SdkSuccess<O> {
    pub raw: http::Response<crate::body::SdkBody>,
    pub parsed: O,
}

/// Everything that can go wrong executing an operation, distinguished
/// by which stage of the pipeline produced the failure. Mirrors the
/// error taxonomy: construction errors never reach the network;
/// dispatch failures never produced a response; response errors did.
#[derive(Debug)]
pub enum SdkError<E> {
    /// The request could not be constructed (e.g. serialization
    /// failure). No network activity occurred.
    ConstructionFailure(Box<dyn StdError + Send + Sync + 'static>),
    /// The request could not be signed (e.g. no credentials available).
    SigningFailure(Box<dyn StdError + Send + Sync + 'static>),
    /// The underlying connector failed to get a response at all
    /// (connection refused, DNS failure, timeout before headers).
    DispatchFailure(Box<dyn StdError + Send + Sync + 'static>),
    /// A response was received, but it could not be parsed as either a
    /// success or modeled error (e.g. malformed JSON, truncated body).
    ResponseError {
        raw: http::Response<crate::body::SdkBody>,
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
    /// A response was received and parsed into a modeled service error.
    ServiceError { raw: http::Response<crate::body::SdkBody>, err: E },
}

impl<E: fmt::Display> fmt::Display for SdkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::ConstructionFailure(err) => write!(f, "failed to construct request: {err}"),
            SdkError::SigningFailure(err) => write!(f, "failed to sign request: {err}"),
            SdkError::DispatchFailure(err) => write!(f, "failed to dispatch request: {err}"),
            SdkError::ResponseError { source, .. } => write!(f, "failed to parse response: {source}"),
            SdkError::ServiceError { err, .. } => write!(f, "service error: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> StdError for SdkError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SdkError::ConstructionFailure(err) => Some(err.as_ref()),
            SdkError::SigningFailure(err) => Some(err.as_ref()),
            SdkError::DispatchFailure(err) => Some(err.as_ref()),
            SdkError::ResponseError { source, .. } => Some(source.as_ref()),
            SdkError::ServiceError { .. } => None,
        }
    }
}

impl<E> SdkError<E> {
    /// The modeled error, if this is a [`SdkError::ServiceError`].
    pub fn into_service_error(self) -> Option<E> {
        match self {
            SdkError::ServiceError { err, .. } => Some(err),
            _ => None,
        }
    }

    pub fn raw_response(&self) -> Option<&http::Response<crate::body::SdkBody>> {
        match self {
            SdkError::ResponseError { raw, .. } | SdkError::ServiceError { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
