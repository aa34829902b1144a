/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Everything a client needs to dispatch one operation and retry it on
//! failure: response classification, the backoff/quota retry policy,
//! the fixed endpoint/user-agent/signing middleware chain, and the
//! `Operation` struct bundling a request with its handler and policy.

pub mod classify;
pub mod metadata;
pub mod middleware;
pub mod retry;
pub mod user_agent;

pub use classify::{ClassifyResponse, DefaultResponseClassifier};
pub use metadata::{Metadata, Operation};
pub use middleware::{BoxedStage, MiddlewareChain, MiddlewareError};
pub use retry::{Replayable, RetryConfig, RetryCtx, RetryQuota, StandardRetryStrategy};
pub use user_agent::{AwsUserAgent, UserAgentStage, UserAgentStageError};
