//! Aggregate public content statistics over the application's journal tables.
//!
//! Strictly read-only; the journal and media tables are owned by the wider
//! application.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PublicContentStats, PublicContentStatsError};
use crate::domain::{AccountId, ContentStats};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{entry_media, journal_entries};

/// Diesel-backed implementation of the content statistics port.
#[derive(Clone)]
pub struct DieselPublicContentStats {
    pool: DbPool,
}

impl DieselPublicContentStats {
    /// Create a new adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> PublicContentStatsError {
    map_pool_error(error, PublicContentStatsError::connection)
}

fn map_diesel(error: diesel::result::Error) -> PublicContentStatsError {
    map_diesel_error(
        error,
        PublicContentStatsError::query,
        PublicContentStatsError::connection,
    )
}

#[async_trait]
impl PublicContentStats for DieselPublicContentStats {
    async fn stats_for_accounts(
        &self,
        account_ids: &[AccountId],
    ) -> Result<ContentStats, PublicContentStatsError> {
        if account_ids.is_empty() {
            return Ok(ContentStats::default());
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let ids: Vec<Uuid> = account_ids.iter().map(|id| *id.as_uuid()).collect();

        let entry_count: i64 = journal_entries::table
            .filter(journal_entries::account_id.eq_any(ids.clone()))
            .filter(journal_entries::is_public.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let media_count: i64 = entry_media::table
            .inner_join(journal_entries::table)
            .filter(journal_entries::account_id.eq_any(ids))
            .filter(journal_entries::is_public.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(ContentStats {
            entry_count,
            media_count,
        })
    }
}
