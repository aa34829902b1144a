/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Caches credentials returned by an inner [`ProvideCredentials`],
//! refreshing them before they expire and coalescing concurrent
//! refreshes into a single inner call.

pub mod cache;
pub mod lazy_caching;
pub mod time_source;

pub use lazy_caching::LazyCachingCredentialsProvider;
pub use time_source::TimeSource;
