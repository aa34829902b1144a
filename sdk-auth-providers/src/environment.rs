/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
//! `AWS_SESSION_TOKEN`.

use crate::env_shim::Env;
use sdk_types::provide_credentials::future;
use sdk_types::{Credentials, CredentialsError, ProvideCredentials};

#[non_exhaustive]
pub struct EnvironmentVariableCredentialsProvider {
    env: Env,
}

impl Default for EnvironmentVariableCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentVariableCredentialsProvider {
    pub fn new() -> Self {
        EnvironmentVariableCredentialsProvider { env: Env::real() }
    }

    #[doc(hidden)]
    pub fn from_env(env: Env) -> Self {
        EnvironmentVariableCredentialsProvider { env }
    }

    fn credentials(&self) -> sdk_types::provide_credentials::Result {
        let access_key = self
            .env
            .get("AWS_ACCESS_KEY_ID")
            .map_err(|_| CredentialsError::CredentialsNotLoaded)?;
        let secret_key = self
            .env
            .get("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| CredentialsError::CredentialsNotLoaded)?;
        let session_token = self.env.get("AWS_SESSION_TOKEN").ok();
        Ok(Credentials::new(access_key, secret_key, session_token, None, "Environment"))
    }
}

impl ProvideCredentials for EnvironmentVariableCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(self.credentials())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_all_three_variables() {
        let env = Env::from_slice(&[
            ("AWS_ACCESS_KEY_ID", "akid"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
        ]);
        let provider = EnvironmentVariableCredentialsProvider::from_env(env);
        let creds = provider.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "akid");
        assert_eq!(creds.session_token(), Some("token"));
    }

    #[tokio::test]
    async fn missing_access_key_is_not_loaded() {
        let env = Env::from_slice(&[("AWS_SECRET_ACCESS_KEY", "secret")]);
        let provider = EnvironmentVariableCredentialsProvider::from_env(env);
        let err = provider.provide_credentials().await.unwrap_err();
        assert!(matches!(err, CredentialsError::CredentialsNotLoaded));
    }
}
