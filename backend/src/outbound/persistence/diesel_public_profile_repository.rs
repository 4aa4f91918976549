//! PostgreSQL-backed `PublicProfileRepository` implementation using Diesel.
//!
//! Read-only adapter for the profile resolver; no locking beyond the
//! store's default read isolation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    PublicProfileRepository, PublicProfileRepositoryError, RedirectLookup,
};
use crate::domain::{Account, AccountId, Merge, UrlRedirect};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AccountRow, MergeRow, RedirectRow};
use super::pool::{DbPool, PoolError};
use super::schema::{account_merges, accounts, merge_url_redirects};

/// Diesel-backed implementation of the public profile read port.
#[derive(Clone)]
pub struct DieselPublicProfileRepository {
    pool: DbPool,
}

impl DieselPublicProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> PublicProfileRepositoryError {
    map_pool_error(error, PublicProfileRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> PublicProfileRepositoryError {
    map_diesel_error(
        error,
        PublicProfileRepositoryError::query,
        PublicProfileRepositoryError::connection,
    )
}

fn decode_failure(error: impl std::fmt::Display) -> PublicProfileRepositoryError {
    PublicProfileRepositoryError::query(error.to_string())
}

#[async_trait]
impl PublicProfileRepository for DieselPublicProfileRepository {
    async fn find_redirect_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<RedirectLookup>, PublicProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let redirect_row = merge_url_redirects::table
            .filter(merge_url_redirects::merge_slug.eq(slug))
            .order(merge_url_redirects::created_at.asc())
            .select(RedirectRow::as_select())
            .first::<RedirectRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        let Some(redirect_row) = redirect_row else {
            return Ok(None);
        };

        let merge = account_merges::table
            .filter(account_merges::id.eq(redirect_row.merge_id))
            .select(MergeRow::as_select())
            .first::<MergeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(Merge::try_from)
            .transpose()
            .map_err(decode_failure)?;

        Ok(Some(RedirectLookup {
            redirect: UrlRedirect::from(redirect_row),
            merge,
        }))
    }

    async fn find_merge_by_id(
        &self,
        merge_id: Uuid,
    ) -> Result<Option<Merge>, PublicProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        account_merges::table
            .filter(account_merges::id.eq(merge_id))
            .select(MergeRow::as_select())
            .first::<MergeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(Merge::try_from)
            .transpose()
            .map_err(decode_failure)
    }

    async fn find_account_by_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = accounts::table
            .filter(accounts::id.eq(account_id.as_uuid()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Account::from))
    }

    async fn find_account_by_public_key(
        &self,
        key: &str,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let by_public = accounts::table
            .filter(accounts::public_username.eq(key))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        if let Some(row) = by_public {
            return Ok(Some(Account::from(row)));
        }

        let by_username = accounts::table
            .filter(accounts::username.eq(key))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(by_username.map(Account::from))
    }
}
