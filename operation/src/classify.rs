/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Classifying a completed attempt (success, modeled service error,
//! transport failure) into a [`RetryKind`] the retry policy can act on.

use sdk_http::result::{SdkError, SdkSuccess};
use sdk_types::retry::{ErrorKind, ProvideErrorKind, RetryKind};
use std::time::Duration;

/// Service-specific throttle codes beyond the generic HTTP 429 status.
const THROTTLE_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Implemented by a retry policy to turn a completed attempt into a
/// retry decision, without needing to know which wire protocol or
/// service produced it.
pub trait ClassifyResponse<T, E> {
    fn classify(&self, result: Result<&T, &E>) -> RetryKind;
}

/// The classification rules used by every operation unless overridden:
/// an explicit `Retry-After` header is honored literally; HTTP 429 or
/// 5xx status, a modeled throttling error code, or a transport-level
/// failure before a response was received are all retryable; anything
/// else defers to the modeled error's own [`ProvideErrorKind`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultResponseClassifier;

impl<T, E: ProvideErrorKind> ClassifyResponse<SdkSuccess<T>, SdkError<E>> for DefaultResponseClassifier {
    fn classify(&self, result: Result<&SdkSuccess<T>, &SdkError<E>>) -> RetryKind {
        classify(result)
    }
}

fn classify<T, E: ProvideErrorKind>(result: Result<&SdkSuccess<T>, &SdkError<E>>) -> RetryKind {
    let err = match result {
        Ok(_) => return RetryKind::NotRetryable,
        Err(err) => err,
    };

    if let Some(raw) = err.raw_response() {
        if let Some(retry_after) = retry_after(raw) {
            return RetryKind::Explicit(retry_after);
        }
        if raw.status() == http::StatusCode::TOO_MANY_REQUESTS {
            return RetryKind::Error(ErrorKind::ThrottlingError);
        }
        if raw.status().is_server_error() {
            return RetryKind::Error(ErrorKind::ServerError);
        }
    }

    match err {
        SdkError::ConstructionFailure(_) | SdkError::SigningFailure(_) => RetryKind::UnretryableError,
        SdkError::DispatchFailure(_) | SdkError::ResponseError { .. } => RetryKind::Error(ErrorKind::TransientError),
        SdkError::ServiceError { err, .. } => {
            if err.code().map_or(false, |code| THROTTLE_CODES.contains(&code)) {
                return RetryKind::Error(ErrorKind::ThrottlingError);
            }
            match err.error_kind() {
                Some(kind) => RetryKind::Error(kind),
                None => RetryKind::UnretryableError,
            }
        }
    }
}

fn retry_after(raw: &http::Response<sdk_http::SdkBody>) -> Option<Duration> {
    let value = raw.headers().get(http::header::RETRY_AFTER)?;
    let secs: u64 = value.to_str().ok()?.parse().ok()?;
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ModeledError {
        kind: Option<ErrorKind>,
        code: &'static str,
    }

    impl ProvideErrorKind for ModeledError {
        fn error_kind(&self) -> Option<ErrorKind> {
            self.kind
        }

        fn code(&self) -> Option<&str> {
            Some(self.code)
        }
    }

    fn response(status: u16) -> http::Response<sdk_http::SdkBody> {
        http::Response::builder().status(status).body(sdk_http::SdkBody::empty()).unwrap()
    }

    #[test]
    fn success_is_not_retryable() {
        let success = SdkSuccess { raw: response(200), parsed: () };
        let kind: Result<&SdkSuccess<()>, &SdkError<ModeledError>> = Ok(&success);
        assert_eq!(classify(kind), RetryKind::NotRetryable);
    }

    #[test]
    fn five_hundred_status_is_server_error() {
        let err: SdkError<ModeledError> = SdkError::ResponseError {
            raw: response(503),
            source: "boom".into(),
        };
        assert_eq!(classify(Err(&err)), RetryKind::Error(ErrorKind::ServerError));
    }

    #[test]
    fn throttling_error_code_overrides_status() {
        let err = SdkError::ServiceError {
            raw: response(400),
            err: ModeledError { kind: None, code: "ThrottlingException" },
        };
        assert_eq!(classify(Err(&err)), RetryKind::Error(ErrorKind::ThrottlingError));
    }

    #[test]
    fn retry_after_header_is_honored_literally() {
        let raw = http::Response::builder()
            .status(503)
            .header(http::header::RETRY_AFTER, "7")
            .body(sdk_http::SdkBody::empty())
            .unwrap();
        let err: SdkError<ModeledError> = SdkError::ResponseError { raw, source: "boom".into() };
        assert_eq!(classify(Err(&err)), RetryKind::Explicit(Duration::from_secs(7)));
    }

    #[test]
    fn construction_failure_is_unretryable() {
        let err: SdkError<ModeledError> = SdkError::ConstructionFailure("bad input".into());
        assert_eq!(classify(Err(&err)), RetryKind::UnretryableError);
    }
}
