//! PostgreSQL-backed `MergeHistoryRepository` implementation using Diesel.
//!
//! Read-only by construction; ledger writes happen inside the workflow
//! repository's transactions.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MergeHistoryRepository, MergeHistoryRepositoryError};
use crate::domain::{AccountId, MergeHistoryEntry};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::HistoryRow;
use super::pool::{DbPool, PoolError};
use super::schema::account_merge_history;

/// Diesel-backed implementation of the history read port.
#[derive(Clone)]
pub struct DieselMergeHistoryRepository {
    pool: DbPool,
}

impl DieselMergeHistoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> MergeHistoryRepositoryError {
    map_pool_error(error, MergeHistoryRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> MergeHistoryRepositoryError {
    map_diesel_error(
        error,
        MergeHistoryRepositoryError::query,
        MergeHistoryRepositoryError::connection,
    )
}

#[async_trait]
impl MergeHistoryRepository for DieselMergeHistoryRepository {
    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<MergeHistoryEntry>, MergeHistoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let account = *account_id.as_uuid();

        let rows = account_merge_history::table
            .filter(
                account_merge_history::account_a_id
                    .eq(account)
                    .or(account_merge_history::account_b_id.eq(account)),
            )
            .order((
                account_merge_history::recorded_at.asc(),
                account_merge_history::id.asc(),
            ))
            .select(HistoryRow::as_select())
            .load::<HistoryRow>(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter()
            .map(|row| {
                MergeHistoryEntry::try_from(row)
                    .map_err(|err| MergeHistoryRepositoryError::query(err.to_string()))
            })
            .collect()
    }
}
