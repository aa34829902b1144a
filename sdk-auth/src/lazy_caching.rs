/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Wraps any [`ProvideCredentials`] with caching: a cached value is
//! reused until it is within `buffer_time` of expiring (or has no
//! expiry, in which case it is treated as valid forever), at which
//! point the next caller triggers a refresh.

use crate::cache::Cache;
use crate::time_source::{SystemTimeSource, TimeSource};
use sdk_types::provide_credentials::future;
use sdk_types::{Credentials, CredentialsError, ProvideCredentials};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

const DEFAULT_BUFFER_TIME: Duration = Duration::from_secs(10);
const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LazyCachingCredentialsProvider {
    inner: Arc<dyn ProvideCredentials>,
    cache: Cache,
    time_source: Arc<dyn TimeSource>,
    buffer_time: Duration,
    load_timeout: Duration,
}

pub struct Builder {
    provider: Option<Arc<dyn ProvideCredentials>>,
    time_source: Arc<dyn TimeSource>,
    buffer_time: Duration,
    load_timeout: Duration,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            provider: None,
            time_source: Arc::new(SystemTimeSource),
            buffer_time: DEFAULT_BUFFER_TIME,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(mut self, provider: impl ProvideCredentials + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = Arc::new(time_source);
        self
    }

    pub fn buffer_time(mut self, buffer_time: Duration) -> Self {
        self.buffer_time = buffer_time;
        self
    }

    pub fn load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn build(self) -> LazyCachingCredentialsProvider {
        LazyCachingCredentialsProvider {
            inner: self.provider.expect("a provider to wrap must be set with `load`"),
            cache: Cache::new(),
            time_source: self.time_source,
            buffer_time: self.buffer_time,
            load_timeout: self.load_timeout,
        }
    }
}

impl LazyCachingCredentialsProvider {
    pub fn builder() -> Builder {
        Builder::new()
    }

    fn needs_refresh(&self, creds: &Credentials) -> bool {
        match creds.expiry() {
            None => false,
            Some(expiry) => {
                let now = self.time_source.now();
                expiry.secs() - now.secs() <= self.buffer_time.as_secs() as i64
            }
        }
    }

    async fn refresh(&self) -> sdk_types::provide_credentials::Result {
        let fut = self.inner.provide_credentials();
        match tokio::time::timeout(self.load_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CredentialsError::ProviderTimedOut(self.load_timeout)),
        }
    }
}

impl ProvideCredentials for LazyCachingCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(
            async move {
                if let Some(cached) = self.cache.peek().await {
                    if !self.needs_refresh(&cached) {
                        return Ok(cached);
                    }
                    self.cache.invalidate().await;
                }
                tracing::debug!("refreshing credentials");
                self.cache.get_or_refresh(|| self.refresh()).await
            }
            .instrument(tracing::debug_span!("load_cached_credentials")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::TestTimeSource;
    use sdk_types::date_time::DateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        expiry: DateTime,
    }

    impl ProvideCredentials for CountingProvider {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            future::ProvideCredentials::ready(Ok(Credentials::new(
                "akid",
                "secret",
                None,
                Some(self.expiry),
                "Counting",
            )))
        }
    }

    #[tokio::test]
    async fn reuses_unexpired_credentials() {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = TestTimeSource::new(DateTime::from_secs(0));
        let provider = LazyCachingCredentialsProvider::builder()
            .load(CountingProvider {
                calls: calls.clone(),
                expiry: DateTime::from_secs(1000),
            })
            .time_source(clock)
            .build();

        provider.provide_credentials().await.unwrap();
        provider.provide_credentials().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_once_within_buffer_of_expiry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = TestTimeSource::new(DateTime::from_secs(995));
        let provider = LazyCachingCredentialsProvider::builder()
            .load(CountingProvider {
                calls: calls.clone(),
                expiry: DateTime::from_secs(1000),
            })
            .time_source(clock)
            .buffer_time(Duration::from_secs(10))
            .build();

        provider.provide_credentials().await.unwrap();
        provider.provide_credentials().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
