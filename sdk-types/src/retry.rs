/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The vocabulary used to classify whether a failed request should be
//! retried, and who is responsible for deciding that (transport,
//! protocol codec, or modeled service error).

/// A coarse classification of *why* an operation failed, used by the
/// retry policy to decide whether another attempt is worthwhile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The server indicated the client sent a malformed request
    /// (modeled client error); retrying without changing the request
    /// will not help.
    ClientError,
    /// The server returned a retryable, transient error (5xx, throttling).
    ServerError,
    /// The server indicated the request should be throttled and retried.
    ThrottlingError,
    /// The connection was dropped or timed out before a response was
    /// received.
    TransientError,
    /// The request timed out waiting for a response.
    ResponseTimeoutError,
}

/// What a classifier decided should happen to a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RetryKind {
    /// Retry after the given classification.
    Error(ErrorKind),
    /// The server returned an explicit `Retry-After` duration; honor it
    /// exactly rather than computing our own backoff.
    Explicit(std::time::Duration),
    /// Do not retry this error.
    UnretryableError,
    /// Not an error at all.
    NotRetryable,
}

/// Implemented by modeled service errors so the retry policy can ask
/// "what kind of error is this?" without depending on the wire protocol
/// that produced it.
pub trait ProvideErrorKind {
    /// Returns the classification of this error, if it is classifiable.
    fn error_kind(&self) -> Option<ErrorKind>;

    /// Returns the modeled error code (e.g. `ThrottlingException`), if any.
    fn code(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_retry_kind_carries_duration() {
        let kind = RetryKind::Explicit(std::time::Duration::from_secs(5));
        match kind {
            RetryKind::Explicit(d) => assert_eq!(d.as_secs(), 5),
            _ => panic!("expected Explicit"),
        }
    }
}
