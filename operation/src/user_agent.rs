/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Builds the `User-Agent` / `x-amz-user-agent` headers identifying
//! this SDK, its version, and the host OS/language runtime.

use sdk_http::middleware::MapRequest;
use sdk_http::operation::Request;
use http::header::{InvalidHeaderValue, HeaderName, USER_AGENT};
use http::HeaderValue;
use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

const X_AMZ_USER_AGENT: HeaderName = HeaderName::from_static("x-amz-user-agent");

/// The components of a generated user-agent string. Construct once per
/// client and store it in the request's property bag; [`UserAgentStage`]
/// reads it back out.
#[derive(Clone)]
pub struct AwsUserAgent {
    sdk_version: &'static str,
    api_service_id: String,
    api_version: &'static str,
    os_family: &'static str,
    rust_version: &'static str,
}

impl AwsUserAgent {
    pub fn new(api_service_id: impl Into<String>, api_version: &'static str) -> Self {
        AwsUserAgent {
            sdk_version: env!("CARGO_PKG_VERSION"),
            api_service_id: api_service_id.into(),
            api_version,
            os_family: os_family(),
            rust_version: "unknown",
        }
    }

    pub fn aws_ua_header(&self) -> String {
        format!(
            "aws-sdk-rust/{} api/{}/{} os/{} lang/rust/{}",
            self.sdk_version, self.api_service_id, self.api_version, self.os_family, self.rust_version
        )
    }

    pub fn ua_header(&self) -> String {
        format!("aws-sdk-rust/{} os/{} lang/rust/{}", self.sdk_version, self.os_family, self.rust_version)
    }
}

fn os_family() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "android") {
        "android"
    } else if cfg!(target_os = "ios") {
        "ios"
    } else {
        "other"
    }
}

impl Display for AwsUserAgent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.aws_ua_header())
    }
}

#[non_exhaustive]
#[derive(Default, Clone, Debug)]
pub struct UserAgentStage;

impl UserAgentStage {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Error)]
pub enum UserAgentStageError {
    #[error("no AwsUserAgent was set on the request")]
    UserAgentMissing,
    #[error(transparent)]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl MapRequest for UserAgentStage {
    type Error = UserAgentStageError;

    fn apply(&self, mut request: Request) -> Result<Request, Self::Error> {
        let ua = request
            .properties()
            .get::<AwsUserAgent>()
            .cloned()
            .ok_or(UserAgentStageError::UserAgentMissing)?;
        request.http_mut().headers_mut().append(USER_AGENT, HeaderValue::try_from(ua.ua_header())?);
        request.http_mut().headers_mut().append(X_AMZ_USER_AGENT, HeaderValue::try_from(ua.aws_ua_header())?);
        Ok(request)
    }
}
