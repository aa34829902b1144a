/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Credentials from the ECS/EKS-pod-identity container credentials
//! endpoint, reached via `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` (or
//! the absolute-URI + auth-token variant used by EKS pod identity).

use crate::env_shim::Env;
use crate::http_fetch::HttpFetch;
use sdk_types::provide_credentials::future;
use sdk_types::{Credentials, CredentialsError, ProvideCredentials};
use std::sync::Arc;

const CONTAINER_CREDENTIALS_HOST: &str = "169.254.170.2";

#[non_exhaustive]
pub struct EcsCredentialsProvider {
    env: Env,
    fetch: Arc<dyn HttpFetch>,
}

impl Default for EcsCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsCredentialsProvider {
    pub fn new() -> Self {
        EcsCredentialsProvider {
            env: Env::real(),
            fetch: crate::http_fetch::default_client(),
        }
    }

    #[doc(hidden)]
    pub fn with_shims(env: Env, fetch: Arc<dyn HttpFetch>) -> Self {
        EcsCredentialsProvider { env, fetch }
    }

    fn request_uri(&self) -> Result<(String, Option<String>), CredentialsError> {
        if let Ok(relative) = self.env.get("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI") {
            return Ok((format!("http://{CONTAINER_CREDENTIALS_HOST}{relative}"), None));
        }
        if let Ok(full) = self.env.get("AWS_CONTAINER_CREDENTIALS_FULL_URI") {
            let token = self.env.get("AWS_CONTAINER_AUTHORIZATION_TOKEN").ok();
            return Ok((full, token));
        }
        Err(CredentialsError::CredentialsNotLoaded)
    }

    async fn credentials(&self) -> sdk_types::provide_credentials::Result {
        let (uri, token) = self.request_uri()?;
        let body = self
            .fetch
            .get(&uri, token.as_deref())
            .await
            .map_err(CredentialsError::ProviderError)?;
        crate::imds::parse_credentials_json(&body, "EcsContainer")
    }
}

impl ProvideCredentials for EcsCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.credentials())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_fetch::test_util::StaticFetch;

    #[tokio::test]
    async fn reads_relative_uri_from_environment() {
        let env = Env::from_slice(&[("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI", "/v2/credentials/abc")]);
        let fetch = StaticFetch::ok(
            r#"{"AccessKeyId":"akid","SecretAccessKey":"secret","Token":"token","Expiration":"2024-01-01T00:00:00Z"}"#,
        );
        let provider = EcsCredentialsProvider::with_shims(env, Arc::new(fetch));
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "akid");
        assert_eq!(creds.provider_name(), "EcsContainer");
    }

    #[tokio::test]
    async fn no_uri_configured_is_not_loaded() {
        let provider = EcsCredentialsProvider::with_shims(Env::from_slice(&[]), Arc::new(StaticFetch::ok("{}")));
        assert!(matches!(
            provider.provide_credentials().await.unwrap_err(),
            CredentialsError::CredentialsNotLoaded
        ));
    }
}
