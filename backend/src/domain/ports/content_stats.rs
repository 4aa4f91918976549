//! Port for aggregate public content statistics.
//!
//! The journal and media tables belong to the wider application; this port
//! reads them only to decorate public profile views with counts.

use async_trait::async_trait;

use crate::domain::{AccountId, ContentStats};

use super::define_port_error;

define_port_error! {
    /// Errors raised by content statistics adapters.
    pub enum PublicContentStatsError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "content stats connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "content stats query failed: {message}",
    }
}

/// Port computing public entry and media counts for a set of accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicContentStats: Send + Sync {
    /// Aggregate counts over the public content of `account_ids`.
    async fn stats_for_accounts(
        &self,
        account_ids: &[AccountId],
    ) -> Result<ContentStats, PublicContentStatsError>;
}

/// Fixture implementation returning zero counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicContentStats;

#[async_trait]
impl PublicContentStats for FixturePublicContentStats {
    async fn stats_for_accounts(
        &self,
        _account_ids: &[AccountId],
    ) -> Result<ContentStats, PublicContentStatsError> {
        Ok(ContentStats::default())
    }
}
