//! Port for read-side public profile lookups.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, AccountId, Merge, UrlRedirect};

use super::define_port_error;

define_port_error! {
    /// Errors raised by public profile repository adapters.
    pub enum PublicProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "public profile repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "public profile repository query failed: {message}",
    }
}

/// A redirect record together with its merge, when the merge still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectLookup {
    /// The permanent redirect record.
    pub redirect: UrlRedirect,
    /// The active merge the record points at; `None` once dissolved.
    pub merge: Option<Merge>,
}

/// Port for the lookups the profile resolver performs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublicProfileRepository: Send + Sync {
    /// Find a redirect record by its merge slug, joined with the merge row
    /// when one still exists.
    async fn find_redirect_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<RedirectLookup>, PublicProfileRepositoryError>;

    /// Find a merge by its id.
    async fn find_merge_by_id(
        &self,
        merge_id: Uuid,
    ) -> Result<Option<Merge>, PublicProfileRepositoryError>;

    /// Find an account by its id.
    async fn find_account_by_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Account>, PublicProfileRepositoryError>;

    /// Find an account by a public path key: exact public username first,
    /// then login username.
    async fn find_account_by_public_key(
        &self,
        key: &str,
    ) -> Result<Option<Account>, PublicProfileRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePublicProfileRepository;

#[async_trait]
impl PublicProfileRepository for FixturePublicProfileRepository {
    async fn find_redirect_by_slug(
        &self,
        _slug: &str,
    ) -> Result<Option<RedirectLookup>, PublicProfileRepositoryError> {
        Ok(None)
    }

    async fn find_merge_by_id(
        &self,
        _merge_id: Uuid,
    ) -> Result<Option<Merge>, PublicProfileRepositoryError> {
        Ok(None)
    }

    async fn find_account_by_id(
        &self,
        _account_id: &AccountId,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        Ok(None)
    }

    async fn find_account_by_public_key(
        &self,
        _key: &str,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        Ok(None)
    }
}
