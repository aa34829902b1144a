/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Bridges the generic `sdk-sigv4` signer to the request pipeline: the
//! [`signer::SigV4Signer`] reads signing configuration out of the
//! request, and [`middleware::SigV4SigningStage`] is the `MapRequest`
//! stage that invokes it.

pub mod middleware;
pub mod signer;

pub use middleware::SigV4SigningStage;
pub use signer::{OperationSigningConfig, SigV4Signer, SigningRequirements};
