/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A provider that tries a series of inner providers in order, using
//! the first that succeeds.

use sdk_types::provide_credentials::future;
use sdk_types::{CredentialsError, ProvideCredentials};
use std::borrow::Cow;
use tracing::Instrument;

/// Credentials provider that checks a series of inner providers.
///
/// Each provider is checked in turn; the first to return `Ok` wins.
///
/// ```
/// # use sdk_auth_providers::chain::ChainProvider;
/// # use sdk_auth_providers::environment::EnvironmentVariableCredentialsProvider;
/// # use sdk_types::Credentials;
/// let provider = ChainProvider::first_try("Environment", EnvironmentVariableCredentialsProvider::new())
///     .or_else("Static", Credentials::from_keys("akid", "secret", None));
/// ```
pub struct ChainProvider {
    providers: Vec<(Cow<'static, str>, Box<dyn ProvideCredentials>)>,
}

impl ChainProvider {
    pub fn first_try(name: impl Into<Cow<'static, str>>, provider: impl ProvideCredentials + 'static) -> Self {
        ChainProvider {
            providers: vec![(name.into(), Box::new(provider))],
        }
    }

    pub fn or_else(mut self, name: impl Into<Cow<'static, str>>, provider: impl ProvideCredentials + 'static) -> Self {
        self.providers.push((name.into(), Box::new(provider)));
        self
    }

    async fn credentials(&self) -> sdk_types::provide_credentials::Result {
        let mut last_error = CredentialsError::Unhandled("no providers configured in chain".into());
        for (name, provider) in &self.providers {
            let span = tracing::info_span!("load_credentials", provider = %name);
            match provider.provide_credentials().instrument(span).await {
                Ok(credentials) => {
                    tracing::info!(provider = %name, "loaded credentials");
                    return Ok(credentials);
                }
                Err(err) => {
                    tracing::info!(provider = %name, error = %err, "provider in chain did not provide credentials");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

impl ProvideCredentials for ChainProvider {
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
    use sdk_types::Credentials;

    struct AlwaysFails;
    impl ProvideCredentials for AlwaysFails {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            future::ProvideCredentials::ready(Err(CredentialsError::CredentialsNotLoaded))
        }
    }

    #[tokio::test]
    async fn falls_through_to_working_provider() {
        let chain = ChainProvider::first_try("Failing", AlwaysFails)
            .or_else("Static", Credentials::from_keys("akid", "secret", None));
        let creds = chain.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "akid");
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let chain = ChainProvider::first_try("A", AlwaysFails).or_else("B", AlwaysFails);
        assert!(chain.provide_credentials().await.is_err());
    }
}
