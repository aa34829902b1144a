/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A single-slot cache that coalesces concurrent misses: if two
//! callers race on an expired/empty cache, only one of them drives the
//! refresh; the other awaits its result.

use sdk_types::Credentials;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

enum Slot {
    Empty,
    Refreshing,
    Filled(Credentials),
}

pub struct Cache {
    slot: Mutex<Slot>,
    notify: Notify,
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            slot: Mutex::new(Slot::Empty),
            notify: Notify::new(),
        }
    }
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value without triggering a refresh.
    pub async fn peek(&self) -> Option<Credentials> {
        match &*self.slot.lock().await {
            Slot::Filled(creds) => Some(creds.clone()),
            _ => None,
        }
    }

    /// Run `refresh` to populate the cache, coalescing concurrent
    /// callers so only one `refresh` call is in flight at a time.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<Credentials, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Credentials, E>>,
    {
        loop {
            let mut guard = self.slot.lock().await;
            match &*guard {
                Slot::Filled(creds) => return Ok(creds.clone()),
                Slot::Refreshing => {
                    // Register as a waiter before releasing the lock, so a
                    // `notify_waiters()` from the refreshing task can't land
                    // in the gap between checking the slot and awaiting —
                    // `Notify::notified()` only wakes waiters already
                    // registered at the time it's called.
                    let notified = self.notify.notified();
                    drop(guard);
                    notified.await;
                    continue;
                }
                Slot::Empty => {
                    *guard = Slot::Refreshing;
                    drop(guard);
                    let result = refresh().await;
                    let mut guard = self.slot.lock().await;
                    *guard = match &result {
                        Ok(creds) => Slot::Filled(creds.clone()),
                        Err(_) => Slot::Empty,
                    };
                    drop(guard);
                    self.notify.notify_waiters();
                    return result;
                }
            }
        }
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = Slot::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_misses_coalesce_to_one_refresh() {
        let cache = Arc::new(Cache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok::<_, ()>(Credentials::from_keys("akid", "secret", None))
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
