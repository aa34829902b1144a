/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Polls an operation until an acceptor declares a terminal state, per
//! spec.md's waiter state machine: each attempt wraps the call's result,
//! evaluates acceptors in order, and the first match decides whether to
//! stop (successfully or not) or sleep and retry.

use crate::path;
use crate::time::AsyncSleep;
use sdk_types::Document;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// The outcome of one operation call, as an acceptor sees it: either a
/// successful output or an error carrying whatever the operation's
/// typed error exposes (HTTP status, error code).
pub enum WaiterAttempt<O, E> {
    Output(O),
    Error(E),
}

/// What an acceptor needs to read off a failed attempt to drive
/// [`Matcher::ErrorStatusMatcher`]/[`Matcher::ErrorCodeMatcher`].
pub trait WaiterError {
    fn http_status(&self) -> Option<u16> {
        None
    }
    fn error_code(&self) -> Option<&str> {
        None
    }
}

/// What an acceptor needs to read off a successful attempt to drive the
/// JMESPath-subset matchers.
pub trait WaiterOutput {
    fn as_document(&self) -> Document;
}

#[derive(Clone, Debug)]
pub enum Matcher {
    JMESPath { path: &'static str, expected: &'static str },
    JMESAnyPath { path: &'static str, expected: &'static str },
    JMESAllPath { path: &'static str, expected: &'static str },
    Success,
    ErrorStatus(u16),
    ErrorCode(&'static str),
}

impl Matcher {
    fn matches<O: WaiterOutput, E: WaiterError>(&self, attempt: &WaiterAttempt<O, E>) -> bool {
        match (self, attempt) {
            (Matcher::Success, WaiterAttempt::Output(_)) => true,
            (Matcher::Success, WaiterAttempt::Error(_)) => false,
            (Matcher::ErrorStatus(code), WaiterAttempt::Error(err)) => err.http_status() == Some(*code),
            (Matcher::ErrorCode(code), WaiterAttempt::Error(err)) => err.error_code() == Some(*code),
            (Matcher::ErrorStatus(_) | Matcher::ErrorCode(_), WaiterAttempt::Output(_)) => false,
            (Matcher::JMESPath { .. } | Matcher::JMESAnyPath { .. } | Matcher::JMESAllPath { .. }, WaiterAttempt::Error(_)) => false,
            (Matcher::JMESPath { path, expected }, WaiterAttempt::Output(output)) => {
                let doc = output.as_document();
                path::get(&doc, path).map(stringify).as_deref() == Some(*expected)
            }
            (Matcher::JMESAnyPath { path, expected }, WaiterAttempt::Output(output)) => {
                let doc = output.as_document();
                path::get(&doc, path)
                    .and_then(Document::as_array)
                    .is_some_and(|items| items.iter().any(|item| stringify(item) == *expected))
            }
            (Matcher::JMESAllPath { path, expected }, WaiterAttempt::Output(output)) => {
                let doc = output.as_document();
                path::get(&doc, path)
                    .and_then(Document::as_array)
                    .is_some_and(|items| !items.is_empty() && items.iter().all(|item| stringify(item) == *expected))
            }
        }
    }
}

fn stringify(doc: &Document) -> String {
    match doc {
        Document::String(s) => s.clone(),
        Document::Bool(b) => b.to_string(),
        Document::Number(sdk_types::document::Number::PosInt(v)) => v.to_string(),
        Document::Number(sdk_types::document::Number::NegInt(v)) => v.to_string(),
        Document::Number(sdk_types::document::Number::Float(v)) => v.to_string(),
        Document::Null => String::new(),
        Document::Array(_) | Document::Object(_) => String::new(),
    }
}

#[derive(Clone, Copy, Debug)]
pub enum AcceptorState {
    Success,
    Retry,
    Failure,
}

#[derive(Clone, Debug)]
pub struct Acceptor {
    pub state: AcceptorState,
    pub matcher: Matcher,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WaiterTimeoutError {
    #[error("waiter failed: an acceptor matched the failure state")]
    WaiterFailed,
    #[error("waiter timed out after {0:?} without reaching a terminal state")]
    WaiterTimeout(Duration),
}

/// The acceptor list, backoff, and overall deadline driving one
/// `waitUntil` call.
pub struct Waiter {
    acceptors: Vec<Acceptor>,
    min_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl Waiter {
    pub fn new(acceptors: Vec<Acceptor>, min_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Waiter { acceptors, min_delay, max_delay, max_attempts }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.min_delay.saturating_mul(attempt.max(1));
        scaled.min(self.max_delay)
    }
}

type AttemptFuture<'a, O, E> = Pin<Box<dyn Future<Output = WaiterAttempt<O, E>> + Send + 'a>>;

/// Polls `call` (one operation attempt per invocation) against
/// `waiter`'s acceptors until a terminal state is reached or
/// `max_wait_time` elapses.
pub async fn wait_until<'a, O, E>(
    waiter: &Waiter,
    sleeper: Arc<dyn AsyncSleep>,
    max_wait_time: Duration,
    mut call: impl FnMut() -> AttemptFuture<'a, O, E> + Send + 'a,
) -> Result<(), WaiterTimeoutError>
where
    O: WaiterOutput,
    E: WaiterError,
{
    let deadline = Instant::now() + max_wait_time;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let outcome = call().await;

        for acceptor in &waiter.acceptors {
            if acceptor.matcher.matches(&outcome) {
                return match acceptor.state {
                    AcceptorState::Success => Ok(()),
                    AcceptorState::Failure => Err(WaiterTimeoutError::WaiterFailed),
                    AcceptorState::Retry => {
                        if Instant::now() >= deadline || attempt >= waiter.max_attempts {
                            return Err(WaiterTimeoutError::WaiterTimeout(max_wait_time));
                        }
                        sleeper.sleep(waiter.delay_for(attempt)).await;
                        break;
                    }
                };
            }
        }

        if Instant::now() >= deadline || attempt >= waiter.max_attempts {
            return Err(WaiterTimeoutError::WaiterTimeout(max_wait_time));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TokioSleep;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeOutput(Document);
    impl WaiterOutput for FakeOutput {
        fn as_document(&self) -> Document {
            self.0.clone()
        }
    }

    struct FakeError(u16);
    impl WaiterError for FakeError {
        fn http_status(&self) -> Option<u16> {
            Some(self.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_on_404_then_succeeds() {
        let waiter = Waiter::new(
            vec![
                Acceptor { state: AcceptorState::Success, matcher: Matcher::Success },
                Acceptor { state: AcceptorState::Retry, matcher: Matcher::ErrorStatus(404) },
            ],
            Duration::from_secs(1),
            Duration::from_secs(10),
            10,
        );

        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let result = wait_until::<FakeOutput, FakeError>(&waiter, Arc::new(TokioSleep), Duration::from_secs(10), move || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if count < 2 {
                    WaiterAttempt::Error(FakeError(404))
                } else {
                    WaiterAttempt::Output(FakeOutput(Document::Object(HashMap::new())))
                }
            })
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn jmespath_matcher_compares_stringified_value() {
        let mut fields = HashMap::new();
        fields.insert("TableStatus".to_string(), Document::from("ACTIVE"));
        let output = FakeOutput(Document::Object(fields));
        let matcher = Matcher::JMESPath { path: "TableStatus", expected: "ACTIVE" };
        assert!(matcher.matches::<FakeOutput, FakeError>(&WaiterAttempt::Output(output)));
    }
}
