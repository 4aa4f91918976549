//! Driving port for public profile resolution.

use async_trait::async_trait;

use crate::domain::{Error, ResolvedProfile};

/// Request to resolve a public path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveProfileRequest {
    /// The path segment: a merge slug, public username, or username.
    pub key: String,
}

/// Driving port resolving public keys to profile representations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicProfileQuery: Send + Sync {
    /// Resolve `key` per the documented precedence: redirect slug first,
    /// then merged-account redirect, then individual profile.
    async fn resolve(&self, request: ResolveProfileRequest) -> Result<ResolvedProfile, Error>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicProfileQuery;

#[async_trait]
impl PublicProfileQuery for FixturePublicProfileQuery {
    async fn resolve(&self, request: ResolveProfileRequest) -> Result<ResolvedProfile, Error> {
        Err(Error::not_found(format!(
            "no public profile matches {}",
            request.key
        )))
    }
}
