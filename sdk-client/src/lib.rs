/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The hyper-backed client: the execute pipeline (credential
//! resolution, middleware chain, dispatch, retry), the transport escape
//! hatch, and the paginator/waiter helpers built on top of it.

pub mod client;
pub mod connector;
mod path;
pub mod paginator;
pub mod test_connection;
pub mod time;
pub mod waiter;

pub use client::{Client, Config};
pub use connector::{HttpConnector, Standard};
pub use paginator::{Paginator, PaginatorState};
pub use test_connection::{TestConnection, ValidateRequest};
pub use time::{AsyncSleep, SystemTimeSource, TimeSource, TokioSleep};
pub use waiter::{Acceptor, AcceptorState, Matcher, Waiter, WaiterAttempt, WaiterError, WaiterOutput, WaiterTimeoutError};
