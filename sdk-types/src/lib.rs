/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Core data types shared by every crate in the request pipeline:
//! regions, credentials, the retry-classification vocabulary, the
//! `Document` dynamic value, base64, and wire date formats.

pub mod base64;
pub mod credentials;
pub mod date_time;
pub mod document;
pub mod provide_credentials;
pub mod region;
pub mod retry;

pub use credentials::Credentials;
pub use date_time::{DateTime, Format};
pub use document::Document;
pub use provide_credentials::{CredentialsError, ProvideCredentials};
pub use region::{Region, SigningRegion};
