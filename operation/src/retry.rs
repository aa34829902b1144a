/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Exponential backoff with jitter, gated by a retry quota: a shared
//! token bucket that throttles retries independently of the backoff
//! timer. The bucket starts full, each retry spends from it (more for
//! a transient timeout than an ordinary server error), and a request
//! that eventually succeeds after retrying gives back what it spent.
//! Once the bucket is empty, retries stop even if the classifier says
//! the error is retryable.

use crate::classify::ClassifyResponse;
use sdk_types::retry::RetryKind;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_TOKENS: usize = 500;
const RETRY_COST: usize = 5;

#[derive(Clone)]
pub struct RetryConfig {
    initial_retry_tokens: usize,
    retry_cost: usize,
    no_retry_increment: usize,
    timeout_retry_cost: usize,
    max_retries: u32,
    max_backoff: Duration,
    base: fn() -> f64,
}

impl RetryConfig {
    /// Use a fixed jitter base instead of `fastrand::f64`, for
    /// deterministic backoff-timing tests.
    pub fn with_static_base(mut self, base: fn() -> f64) -> Self {
        self.base = base;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_retry_tokens: INITIAL_RETRY_TOKENS,
            retry_cost: RETRY_COST,
            no_retry_increment: 1,
            timeout_retry_cost: 10,
            max_retries: MAX_RETRIES,
            max_backoff: Duration::from_secs(20),
            base: fastrand::f64,
        }
    }
}

/// How many retry tokens remain in a [`RetryCtx`]'s quota. Surfaced
/// separately from `RetryCtx` (which also holds the mutex and config)
/// so callers — and `Debug` impls further up the stack — can report it
/// without taking a lock themselves beyond a single snapshot read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryQuota(pub usize);

/// Cross-request retry state: the shared token bucket and config. One
/// instance is shared (via `Arc<Mutex<_>>`) across every attempt of a
/// single logical operation call.
pub struct RetryCtx {
    retry_quota: usize,
    last_retry: Option<usize>,
    config: RetryConfig,
}

impl RetryCtx {
    pub fn new(config: RetryConfig) -> Self {
        RetryCtx { retry_quota: config.initial_retry_tokens, last_retry: None, config }
    }

    pub fn quota_available(&self) -> RetryQuota {
        RetryQuota(self.retry_quota)
    }

    fn retry_quota_release(&mut self) {
        self.retry_quota += self.last_retry.take().unwrap_or(self.config.no_retry_increment);
    }

    fn take_retry_quota(&mut self, timeout: bool) -> bool {
        let cost = if timeout { self.config.timeout_retry_cost } else { self.config.retry_cost };
        if cost > self.retry_quota {
            false
        } else {
            self.last_retry = Some(cost);
            self.retry_quota -= cost;
            true
        }
    }

    #[cfg(test)]
    fn with_base_provider(mut self, base: fn() -> f64) -> Self {
        self.config.base = base;
        self
    }
}

/// `tower::retry::Policy` built from [`RetryConfig`]/[`RetryCtx`] plus
/// a [`ClassifyResponse`] implementation. `attempts` is local to one
/// request; `ctx` (the quota) is shared across every attempt of it.
#[derive(Clone)]
pub struct StandardRetryStrategy<C> {
    attempts: u32,
    ctx: Arc<Mutex<RetryCtx>>,
    classifier: C,
}

impl<C: Clone> StandardRetryStrategy<C> {
    pub fn new(ctx: Arc<Mutex<RetryCtx>>, classifier: C) -> Self {
        Self { attempts: 0, ctx, classifier }
    }

    pub fn ctx(&self) -> MutexGuard<'_, RetryCtx> {
        self.ctx.lock().unwrap()
    }

    /// Decides whether `kind` should be retried given the current quota
    /// and attempt count, returning the next strategy state and backoff
    /// duration if so. A successful attempt releases quota spent by any
    /// earlier attempt of the same request and always returns `None`.
    fn do_retry(&self, kind: RetryKind) -> Option<(Self, Duration)> {
        let mut ctx = self.ctx.lock().unwrap();
        let timeout = matches!(kind, RetryKind::Error(sdk_types::retry::ErrorKind::TransientError));
        match kind {
            RetryKind::NotRetryable => {
                ctx.retry_quota_release();
                None
            }
            RetryKind::UnretryableError => None,
            RetryKind::Explicit(dur) => {
                drop(ctx);
                let mut next = self.clone();
                next.attempts += 1;
                Some((next, dur))
            }
            RetryKind::Error(_) => {
                if self.attempts + 1 >= ctx.config.max_retries {
                    return None;
                }
                if !ctx.take_retry_quota(timeout) {
                    return None;
                }
                let base = (ctx.config.base)();
                let backoff = base * 2f64.powi(self.attempts as i32);
                let backoff = Duration::from_secs_f64(backoff).min(ctx.config.max_backoff);
                drop(ctx);
                let mut next = self.clone();
                next.attempts += 1;
                Some((next, backoff))
            }
        }
    }
}

/// A request that can produce a replayable copy of itself, or `None`
/// if it no longer can (e.g. a streaming body already in flight).
/// Implemented for [`sdk_http::operation::Request`] by delegating to
/// its own `try_clone`; unlike `std::Clone`, this lets the retry
/// policy apply to requests that aren't unconditionally cloneable.
pub trait Replayable: Sized {
    fn try_clone(&self) -> Option<Self>;
}

impl Replayable for sdk_http::operation::Request {
    fn try_clone(&self) -> Option<Self> {
        sdk_http::operation::Request::try_clone(self)
    }
}

impl<Req, T, E, C> tower::retry::Policy<Req, sdk_http::result::SdkSuccess<T>, sdk_http::result::SdkError<E>>
    for StandardRetryStrategy<C>
where
    Req: Replayable,
    C: ClassifyResponse<sdk_http::result::SdkSuccess<T>, sdk_http::result::SdkError<E>> + Clone,
{
    type Future = Pin<Box<dyn Future<Output = Self> + Send>>;

    fn retry(
        &self,
        _req: &Req,
        result: Result<&sdk_http::result::SdkSuccess<T>, &sdk_http::result::SdkError<E>>,
    ) -> Option<Self::Future> {
        let kind = self.classifier.classify(result);
        let (next, wait) = self.do_retry(kind)?;
        Some(Box::pin(async move {
            tokio::time::sleep(wait).await;
            next
        }))
    }

    fn clone_request(&self, req: &Req) -> Option<Req> {
        Replayable::try_clone(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk_types::retry::ErrorKind;

    fn strategy(config: RetryConfig) -> StandardRetryStrategy<crate::classify::DefaultResponseClassifier> {
        let ctx = RetryCtx::new(config).with_base_provider(|| 1_f64);
        StandardRetryStrategy::new(Arc::new(Mutex::new(ctx)), crate::classify::DefaultResponseClassifier)
    }

    #[test]
    fn eventual_success_releases_quota() {
        let strategy = strategy(RetryConfig::default());
        let (strategy, dur) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(dur, Duration::from_secs(1));
        assert_eq!(strategy.ctx().quota_available(), RetryQuota(495));

        let (strategy, dur) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(dur, Duration::from_secs(2));
        assert_eq!(strategy.ctx().quota_available(), RetryQuota(490));

        assert!(strategy.do_retry(RetryKind::NotRetryable).is_none());
        assert_eq!(strategy.ctx().quota_available(), RetryQuota(495));
    }

    #[test]
    fn stops_after_max_retries() {
        let strategy = strategy(RetryConfig::default());
        let (strategy, _) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        let (strategy, _) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert!(strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).is_none());
    }

    #[test]
    fn stops_when_quota_exhausted() {
        let mut config = RetryConfig::default();
        config.initial_retry_tokens = 5;
        let strategy = strategy(config);
        let (strategy, _) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(strategy.ctx().quota_available(), RetryQuota(0));
        assert!(strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).is_none());
    }

    #[test]
    fn explicit_retry_after_bypasses_backoff_math() {
        let strategy = strategy(RetryConfig::default());
        let (_, dur) = strategy.do_retry(RetryKind::Explicit(Duration::from_secs(30))).expect("should retry");
        assert_eq!(dur, Duration::from_secs(30));
    }

    #[test]
    fn max_backoff_caps_growth() {
        let mut config = RetryConfig::default().with_max_retries(5);
        config.max_backoff = Duration::from_secs(3);
        let strategy = strategy(config);
        let (strategy, dur) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(dur, Duration::from_secs(1));
        let (strategy, dur) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(dur, Duration::from_secs(2));
        let (_, dur) = strategy.do_retry(RetryKind::Error(ErrorKind::ServerError)).expect("should retry");
        assert_eq!(dur, Duration::from_secs(3));
    }
}
