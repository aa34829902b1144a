/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Concrete [`sdk_types::ProvideCredentials`] implementations and the
//! chain that composes them into the SDK's default resolution order.

pub mod chain;
pub mod ecs;
pub mod environment;
pub mod http_fetch;
pub mod imds;
pub mod profile;

mod env_shim;

pub use chain::ChainProvider;
pub use ecs::EcsCredentialsProvider;
pub use environment::EnvironmentVariableCredentialsProvider;
pub use imds::InstanceMetadataCredentialsProvider;
pub use profile::ProfileFileCredentialsProvider;

use sdk_auth::LazyCachingCredentialsProvider;

/// The SDK's default provider chain: environment variables, then the
/// shared profile file, then the ECS/EKS container credentials
/// endpoint, then EC2 instance metadata — wrapped in a single lazy
/// cache so the whole chain is only re-run when the winning provider's
/// credentials are about to expire.
pub fn default_provider_chain() -> LazyCachingCredentialsProvider {
    let chain = ChainProvider::first_try("Environment", EnvironmentVariableCredentialsProvider::new())
        .or_else("Profile", ProfileFileCredentialsProvider::new())
        .or_else("EcsContainer", EcsCredentialsProvider::new())
        .or_else("Ec2InstanceMetadata", InstanceMetadataCredentialsProvider::new());
    LazyCachingCredentialsProvider::builder().load(chain).build()
}

/// Re-exported so provider implementations and their tests don't each
/// need to depend on `ProvideCredentials` directly.
pub use sdk_types::provide_credentials::{future, CredentialsError, Result as ProvideCredentialsResult};
