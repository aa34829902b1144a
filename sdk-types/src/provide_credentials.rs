/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The [`ProvideCredentials`] trait and its error type.

use crate::Credentials;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// An error encountered while resolving credentials.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialsError {
    /// No credentials were available from this provider.
    #[error("the provider could not provide credentials or required configuration was not set")]
    CredentialsNotLoaded,

    /// Credential resolution exceeded the maximum allowed duration.
    #[error("credentials provider timed out after {0:?}")]
    ProviderTimedOut(Duration),

    /// The provider was given an invalid configuration (e.g. a syntax
    /// error in `~/.aws/config`, or an assume-role profile chain that
    /// forms a cycle).
    #[error("the credentials provider was not configured correctly: {0}")]
    InvalidConfiguration(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// The provider experienced an error during credential resolution
    /// (e.g. a non-2xx from STS, or a filesystem error).
    #[error("an error occurred while loading credentials: {0}")]
    ProviderError(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// An unexpected error, reserved for cases outside expected provider
    /// usage (malformed UTF-8, a provider response missing required
    /// fields).
    #[error("unexpected error during credential resolution: {0}")]
    Unhandled(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

pub type Result = std::result::Result<Credentials, CredentialsError>;

pub mod future {
    use super::Result;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

    /// A future returned by [`ProvideCredentials::provide_credentials`].
    ///
    /// Wraps either an already-resolved value or a boxed future, so
    /// providers that can answer synchronously (e.g. static credentials)
    /// avoid an allocation on the hot path.
    pub struct ProvideCredentials<'a>(Inner<'a>);

    enum Inner<'a> {
        Ready(Option<Result>),
        Pending(BoxFuture<'a, Result>),
    }

    impl<'a> ProvideCredentials<'a> {
        pub fn new(future: impl Future<Output = Result> + Send + 'a) -> Self {
            ProvideCredentials(Inner::Pending(Box::pin(future)))
        }

        pub fn ready(credentials: Result) -> Self {
            ProvideCredentials(Inner::Ready(Some(credentials)))
        }
    }

    impl Future for ProvideCredentials<'_> {
        type Output = Result;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            match &mut self.0 {
                Inner::Ready(value) => {
                    Poll::Ready(value.take().expect("polled after completion"))
                }
                Inner::Pending(fut) => fut.as_mut().poll(cx),
            }
        }
    }
}

/// Asynchronously provide [`Credentials`] for signing a request.
///
/// Implementors should prefer defining an inherent `async fn` and
/// delegating to it from this trait, rather than writing the state
/// machine by hand.
pub trait ProvideCredentials: Send + Sync {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a;
}

impl ProvideCredentials for Credentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(Ok(self.clone()))
    }
}

impl ProvideCredentials for Arc<dyn ProvideCredentials> {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        self.as_ref().provide_credentials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_credentials_resolve_immediately() {
        let creds = Credentials::from_keys("akid", "secret", None);
        let resolved = creds.provide_credentials().await.unwrap();
        assert_eq!(resolved.access_key_id(), "akid");
    }
}
