/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The region to send requests to, and the (possibly different) region
//! used when computing a SigV4 signature.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The region to send requests to.
///
/// The region MUST be specified on a request. It may be configured
/// globally or on a per-client basis unless otherwise noted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(Cow<'static, str>);

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Region {
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Self(region.into())
    }

    pub const fn from_static(region: &'static str) -> Self {
        Self(Cow::Borrowed(region))
    }
}

/// The partition a [`Region`] belongs to (`aws`, `aws-cn`, `aws-us-gov`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Partition(Cow<'static, str>);

impl Partition {
    pub const fn from_static(partition: &'static str) -> Self {
        Self(Cow::Borrowed(partition))
    }
}

impl AsRef<str> for Partition {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The region used when signing requests. Usually identical to the
/// [`Region`] requests are sent to, but can differ for global services
/// whose signing scope is pinned to a single region (e.g. `us-east-1`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningRegion(Cow<'static, str>);

impl AsRef<str> for SigningRegion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SigningRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Region> for SigningRegion {
    fn from(region: Region) -> Self {
        SigningRegion(region.0)
    }
}

impl SigningRegion {
    pub fn from_static(region: &'static str) -> Self {
        SigningRegion(Cow::Borrowed(region))
    }
}

/// The signing name of a service, e.g. `s3` or `dynamodb`. Usually
/// distinct from the service's endpoint prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningService(Cow<'static, str>);

impl SigningService {
    pub fn from_static(name: &'static str) -> Self {
        SigningService(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        SigningService(name.into())
    }
}

impl AsRef<str> for SigningService {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SigningService {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A future that resolves to an optional [`Region`].
pub struct RegionFuture<'a>(Pin<Box<dyn Future<Output = Option<Region>> + Send + 'a>>);

impl<'a> RegionFuture<'a> {
    pub fn new(f: impl Future<Output = Option<Region>> + Send + 'a) -> Self {
        RegionFuture(Box::pin(f))
    }

    pub fn ready(region: Option<Region>) -> Self {
        Self::new(std::future::ready(region))
    }
}

impl Future for RegionFuture<'_> {
    type Output = Option<Region>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

/// Provide a [`Region`] to use with AWS requests.
pub trait ProvideRegion: Send + Sync {
    fn region(&self) -> RegionFuture;
}

impl ProvideRegion for Region {
    fn region(&self) -> RegionFuture {
        RegionFuture::ready(Some(self.clone()))
    }
}

impl ProvideRegion for Option<Region> {
    fn region(&self) -> RegionFuture {
        RegionFuture::ready(self.clone())
    }
}

/// A region provider chain: first provider to resolve `Some` wins.
pub struct ChainProvider {
    providers: Vec<Box<dyn ProvideRegion>>,
}

impl ChainProvider {
    pub fn first_try(provider: impl ProvideRegion + 'static) -> Self {
        ChainProvider {
            providers: vec![Box::new(provider)],
        }
    }

    pub fn or_else(mut self, fallback: impl ProvideRegion + 'static) -> Self {
        self.providers.push(Box::new(fallback));
        self
    }

    pub async fn region(&self) -> Option<Region> {
        for provider in &self.providers {
            if let Some(region) = provider.region().await {
                return Some(region);
            }
        }
        None
    }
}

impl ProvideRegion for ChainProvider {
    fn region(&self) -> RegionFuture {
        RegionFuture::new(async move { self.region().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chain_provider_takes_first_some() {
        let chain = ChainProvider::first_try(None::<Region>)
            .or_else(Region::from_static("us-west-2"));
        assert_eq!(chain.region().await, Some(Region::from_static("us-west-2")));
    }

    #[test]
    fn signing_region_derived_from_region() {
        let region = Region::new("us-east-1");
        let signing: SigningRegion = region.into();
        assert_eq!(signing.as_ref(), "us-east-1");
    }
}
