/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Static endpoint resolution, in strict precedence order:
//! 1. an exact region+variant override (e.g. a FIPS or dual-stack
//!    variant of a specific region),
//! 2. a region-specific override with no variant,
//! 3. the partition's global default template (`{service}.{region}.{dnsSuffix}`),
//! 4. if no partition matches the region at all, an error.

use crate::{CredentialScope, ResolvedEndpoint};
use sdk_http::endpoint::Endpoint;
use sdk_types::region::{Region, SigningRegion, SigningService};
use std::collections::HashMap;
use std::error::Error as StdError;
use thiserror::Error;

/// Resolves an AWS endpoint (and the signing scope it implies) for a
/// region. Implemented by [`EndpointResolver`] for static tables, and
/// by the discovery cache for operations with dynamic endpoints.
pub trait ResolveAwsEndpoint: Send + Sync {
    fn resolve_endpoint(&self, region: &Region) -> Result<ResolvedEndpoint, Box<dyn StdError + Send + Sync>>;
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveEndpointError {
    #[error("no partition matches region {0:?}")]
    NoMatchingPartition(String),
    #[error(transparent)]
    Endpoint(#[from] sdk_http::endpoint::EndpointError),
}

/// A variant of a region's endpoint: FIPS, dual-stack, both, or
/// neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variant {
    pub fips: bool,
    pub dual_stack: bool,
}

impl Variant {
    pub const STANDARD: Variant = Variant { fips: false, dual_stack: false };
}

/// A partition: a DNS suffix and template applied to any region in it
/// that has no explicit override.
#[derive(Clone, Debug)]
pub struct Partition {
    pub id: &'static str,
    pub region_regex: &'static str,
    pub dns_suffix: &'static str,
    pub default_signing_service: &'static str,
}

/// The static endpoint table for one service: a default partition
/// template plus explicit per-region, per-variant overrides.
pub struct EndpointResolver {
    service: &'static str,
    partitions: Vec<Partition>,
    overrides: HashMap<(String, Variant), (String, Option<&'static str>)>,
}

impl EndpointResolver {
    pub fn new(service: &'static str, partitions: Vec<Partition>) -> Self {
        EndpointResolver {
            service,
            partitions,
            overrides: HashMap::new(),
        }
    }

    /// Register an explicit override for `region`/`variant`, optionally
    /// pinning signing to a different region (e.g. IAM's `aws-global`
    /// endpoint still signs to `us-east-1`).
    pub fn with_override(
        mut self,
        region: impl Into<String>,
        variant: Variant,
        hostname: impl Into<String>,
        signing_region_override: Option<&'static str>,
    ) -> Self {
        self.overrides
            .insert((region.into(), variant), (hostname.into(), signing_region_override));
        self
    }

    fn partition_for(&self, region: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| {
            regex_lite_match(p.region_regex, region)
        })
    }

    fn resolve(&self, region: &Region, variant: Variant) -> Result<ResolvedEndpoint, ResolveEndpointError> {
        let region_str = region.as_ref();

        if let Some((hostname, signing_region_override)) =
            self.overrides.get(&(region_str.to_string(), variant))
        {
            let endpoint = Endpoint::from_str(&format!("https://{hostname}"))?;
            let signing_region = signing_region_override
                .map(Region::from_static)
                .unwrap_or_else(|| region.clone());
            return Ok(ResolvedEndpoint {
                endpoint,
                credential_scope: CredentialScope {
                    region: signing_region.into(),
                    service: SigningService::from_static(self.service),
                },
            });
        }

        let partition = self
            .partition_for(region_str)
            .ok_or_else(|| ResolveEndpointError::NoMatchingPartition(region_str.to_string()))?;

        let fips = if variant.fips { "-fips" } else { "" };
        let dualstack = if variant.dual_stack { ".dualstack" } else { "" };
        let hostname = format!(
            "{}{fips}{dualstack}.{}.{}",
            self.service, region_str, partition.dns_suffix
        );
        let endpoint = Endpoint::from_str(&format!("https://{hostname}"))?;
        Ok(ResolvedEndpoint {
            endpoint,
            credential_scope: CredentialScope {
                region: region.clone().into(),
                service: SigningService::from_static(self.service),
            },
        })
    }
}

impl ResolveAwsEndpoint for EndpointResolver {
    fn resolve_endpoint(&self, region: &Region) -> Result<ResolvedEndpoint, Box<dyn StdError + Send + Sync>> {
        self.resolve(region, Variant::STANDARD).map_err(|e| Box::new(e) as _)
    }
}

/// Regions are essentially static strings in practice; rather than
/// pull in a full regex engine for what is always a simple prefix
/// match against a partition (`us-*`, `cn-*`, `us-gov-*`), match on the
/// region-regex's literal prefix up to its first metacharacter.
fn regex_lite_match(pattern: &str, region: &str) -> bool {
    let prefix = pattern.split(['^', '$', '(', '[', '.', '*']).next().unwrap_or(pattern);
    !prefix.is_empty() && region.starts_with(prefix)
}
