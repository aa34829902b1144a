/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A TTL-keyed cache for services whose endpoint must itself be
//! discovered by calling the service (e.g. a `DescribeEndpoints`-style
//! operation), rather than computed from a static table.
//!
//! Grounded on the same single-slot, coalescing-refresh shape as
//! `sdk_auth::cache::Cache`, generalized to multiple keys (discovered
//! endpoints are usually keyed by the request's identity, e.g. access
//! key) and to entries that expire on their own TTL rather than being
//! invalidated wholesale.

use sdk_http::endpoint::Endpoint;
use sdk_types::date_time::DateTime;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// An endpoint returned by a discovery call, along with how long it
/// remains valid.
#[derive(Clone, Debug)]
pub struct DiscoveredEndpoint {
    pub endpoint: Endpoint,
    pub expires_at: DateTime,
}

impl DiscoveredEndpoint {
    fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at.secs() <= now.secs()
    }
}

enum Slot {
    Refreshing,
    Filled(DiscoveredEndpoint),
}

/// A cache of discovered endpoints, keyed by caller-chosen identity
/// (usually the credentials' access key, since endpoint discovery
/// results are specific to the calling identity).
pub struct EndpointDiscoveryCache {
    entries: Mutex<HashMap<String, Slot>>,
    notify: Notify,
}

impl Default for EndpointDiscoveryCache {
    fn default() -> Self {
        EndpointDiscoveryCache {
            entries: Mutex::new(HashMap::new()),
            notify: Notify::new(),
        }
    }
}

impl EndpointDiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, calling `discover` to populate (or repopulate, if
    /// expired) the entry. Concurrent calls for the same key while a
    /// discovery call is in flight await its result rather than issuing
    /// their own.
    pub async fn get_or_discover<F, Fut, E>(&self, key: &str, now: DateTime, discover: F) -> Result<Endpoint, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DiscoveredEndpoint, E>>,
    {
        loop {
            let mut guard = self.entries.lock().await;
            match guard.get(key) {
                Some(Slot::Filled(entry)) if !entry.is_expired(now) => return Ok(entry.endpoint.clone()),
                Some(Slot::Refreshing) => {
                    // Register as a waiter before releasing the lock: a
                    // `notify_waiters()` call only wakes waiters already
                    // registered, so dropping the guard first can miss a
                    // concurrent notification and hang forever.
                    let notified = self.notify.notified();
                    drop(guard);
                    notified.await;
                    continue;
                }
                _ => {
                    guard.insert(key.to_string(), Slot::Refreshing);
                    drop(guard);
                    let result = discover().await;
                    let mut guard = self.entries.lock().await;
                    match &result {
                        Ok(entry) => {
                            guard.insert(key.to_string(), Slot::Filled(entry.clone()));
                        }
                        Err(_) => {
                            guard.remove(key);
                        }
                    }
                    drop(guard);
                    self.notify.notify_waiters();
                    return result.map(|entry| entry.endpoint);
                }
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

/// Threads an [`EndpointDiscoveryCache`] through operations that need
/// it; stored in the client's shared state rather than per-request,
/// since discovery results are reused across many requests.
pub type SharedEndpointDiscoveryCache = Arc<EndpointDiscoveryCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::str::FromStr;

    fn endpoint(host: &str) -> Endpoint {
        Endpoint::from_str(&format!("https://{host}")).unwrap()
    }

    #[tokio::test]
    async fn concurrent_misses_for_same_key_coalesce() {
        let cache = Arc::new(EndpointDiscoveryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_discover("akid", DateTime::from_secs(0), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok::<_, ()>(DiscoveredEndpoint {
                            endpoint: endpoint("discovered.example.com"),
                            expires_at: DateTime::from_secs(60),
                        })
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_rediscovered() {
        let cache = EndpointDiscoveryCache::new();
        cache
            .get_or_discover("akid", DateTime::from_secs(0), || async {
                Ok::<_, ()>(DiscoveredEndpoint {
                    endpoint: endpoint("first.example.com"),
                    expires_at: DateTime::from_secs(10),
                })
            })
            .await
            .unwrap();

        let resolved = cache
            .get_or_discover("akid", DateTime::from_secs(20), || async {
                Ok::<_, ()>(DiscoveredEndpoint {
                    endpoint: endpoint("second.example.com"),
                    expires_at: DateTime::from_secs(90),
                })
            })
            .await
            .unwrap();

        assert_eq!(resolved.uri().host(), Some("second.example.com"));
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let cache = EndpointDiscoveryCache::new();
        cache
            .get_or_discover("a", DateTime::from_secs(0), || async {
                Ok::<_, ()>(DiscoveredEndpoint {
                    endpoint: endpoint("a.example.com"),
                    expires_at: DateTime::from_secs(60),
                })
            })
            .await
            .unwrap();
        let b = cache
            .get_or_discover("b", DateTime::from_secs(0), || async {
                Ok::<_, ()>(DiscoveredEndpoint {
                    endpoint: endpoint("b.example.com"),
                    expires_at: DateTime::from_secs(60),
                })
            })
            .await
            .unwrap();
        assert_eq!(b.uri().host(), Some("b.example.com"));
    }
}
