//! Port for reading the merge history ledger.
//!
//! Writes happen only inside workflow transactions; this port is read-only
//! by construction so no adapter can be tempted to mutate the ledger.

use async_trait::async_trait;

use crate::domain::{AccountId, MergeHistoryEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by merge history adapters.
    pub enum MergeHistoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "merge history repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "merge history repository query failed: {message}",
    }
}

/// Port for chronological history reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeHistoryRepository: Send + Sync {
    /// List every entry involving `account_id`, oldest first.
    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<MergeHistoryEntry>, MergeHistoryRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMergeHistoryRepository;

#[async_trait]
impl MergeHistoryRepository for FixtureMergeHistoryRepository {
    async fn list_for_account(
        &self,
        _account_id: &AccountId,
    ) -> Result<Vec<MergeHistoryEntry>, MergeHistoryRepositoryError> {
        Ok(Vec::new())
    }
}
