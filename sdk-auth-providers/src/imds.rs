/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! EC2 instance metadata credentials, preferring the IMDSv2
//! token-gated flow and falling back to unauthenticated IMDSv1
//! requests when token issuance fails (older instances, or IMDSv2
//! explicitly disabled by the instance's metadata options).

use crate::http_fetch::HttpFetch;
use sdk_types::provide_credentials::future;
use sdk_types::{Credentials, CredentialsError, ProvideCredentials};
use std::sync::Arc;

const IMDS_HOST: &str = "http://169.254.169.254";
const TOKEN_PATH: &str = "/latest/api/token";
const ROLE_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const TOKEN_TTL_HEADER: (&str, &str) = ("x-aws-ec2-metadata-token-ttl-seconds", "21600");
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";

#[non_exhaustive]
pub struct InstanceMetadataCredentialsProvider {
    fetch: Arc<dyn HttpFetch>,
}

impl Default for InstanceMetadataCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceMetadataCredentialsProvider {
    pub fn new() -> Self {
        InstanceMetadataCredentialsProvider {
            fetch: crate::http_fetch::default_client(),
        }
    }

    #[doc(hidden)]
    pub fn with_shims(fetch: Arc<dyn HttpFetch>) -> Self {
        InstanceMetadataCredentialsProvider { fetch }
    }

    /// Fetch a v2 token; on any failure, fall back to `None` so callers
    /// proceed with unauthenticated (v1-style) requests rather than
    /// hard-failing on instances with IMDSv2 disabled.
    async fn token(&self) -> Option<String> {
        match self
            .fetch
            .put(&format!("{IMDS_HOST}{TOKEN_PATH}"), &[TOKEN_TTL_HEADER])
            .await
        {
            Ok(token) => Some(token),
            Err(error) => {
                tracing::debug!(%error, "IMDSv2 token request failed, falling back to IMDSv1");
                None
            }
        }
    }

    async fn credentials(&self) -> sdk_types::provide_credentials::Result {
        let token = self.token().await;
        let token_header = token.as_deref();

        let role = self
            .fetch
            .get(&format!("{IMDS_HOST}{ROLE_PATH}"), token_header)
            .await
            .map_err(CredentialsError::ProviderError)?;
        let role = role.lines().next().ok_or_else(|| {
            CredentialsError::Unhandled("instance metadata role list was empty".into())
        })?;

        let body = self
            .fetch
            .get(&format!("{IMDS_HOST}{ROLE_PATH}{role}"), token_header)
            .await
            .map_err(CredentialsError::ProviderError)?;
        parse_credentials_json(&body, "Ec2InstanceMetadata")
    }
}

impl ProvideCredentials for InstanceMetadataCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.credentials())
    }
}

/// Parse the small, fixed-shape JSON document returned by both the
/// ECS container endpoint and the IMDS role-credentials endpoint,
/// without pulling in a full JSON parser for four fields.
pub(crate) fn parse_credentials_json(
    body: &str,
    provider_name: &'static str,
) -> sdk_types::provide_credentials::Result {
    let field = |key: &str| -> Option<String> {
        let needle = format!("\"{key}\"");
        let start = body.find(&needle)? + needle.len();
        let rest = &body[start..];
        let colon = rest.find(':')?;
        let rest = rest[colon + 1..].trim_start();
        let rest = rest.strip_prefix('"')?;
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    };

    let access_key = field("AccessKeyId")
        .ok_or_else(|| CredentialsError::Unhandled("missing AccessKeyId in metadata response".into()))?;
    let secret_key = field("SecretAccessKey")
        .ok_or_else(|| CredentialsError::Unhandled("missing SecretAccessKey in metadata response".into()))?;
    let session_token = field("Token");
    // Metadata-vended credentials are always temporary; without the
    // expiration the outer credentials cache would never refresh them
    // and requests would start failing once the instance-side session
    // actually expires.
    let expiration = field("Expiration")
        .map(|value| {
            sdk_types::date_time::DateTime::parse_rfc3339(&value)
                .map_err(|e| CredentialsError::Unhandled(e.to_string().into()))
        })
        .transpose()?;

    Ok(Credentials::new(access_key, secret_key, session_token, expiration, provider_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_fetch::test_util::StaticFetch;

    #[tokio::test]
    async fn falls_back_to_v1_when_token_fails() {
        // The stub returns the same body for both PUT (token) and GET
        // (role list / credentials); exercising the fallback path only
        // requires that a failed PUT doesn't abort the flow.
        let fetch = StaticFetch::err("token endpoint unreachable");
        let provider = InstanceMetadataCredentialsProvider::with_shims(Arc::new(fetch));
        assert!(provider.token().await.is_none());
    }

    #[test]
    fn parses_fixed_shape_credentials_json() {
        let body = r#"{
            "Code" : "Success",
            "AccessKeyId" : "ASIAEXAMPLE",
            "SecretAccessKey" : "secretvalue",
            "Token" : "tokenvalue",
            "Expiration" : "2024-01-01T00:00:00Z"
        }"#;
        let creds = parse_credentials_json(body, "Ec2InstanceMetadata").unwrap();
        assert_eq!(creds.access_key_id(), "ASIAEXAMPLE");
        assert_eq!(creds.session_token(), Some("tokenvalue"));
        assert_eq!(creds.expiry().unwrap().secs(), 1704067200);
    }
}
