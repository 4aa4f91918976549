//! Port for read-only account lookups.
//!
//! Account registration and profile editing belong to the wider application;
//! this port only resolves accounts for invitation targeting.

use async_trait::async_trait;

use crate::domain::{Account, AccountId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
    }
}

/// Port for resolving accounts by id or user-supplied identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Resolve a user-supplied identifier to an account.
    ///
    /// Tries an exact match on username, then email, then public username;
    /// the first hit wins.
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn find_by_id(
        &self,
        _id: &AccountId,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_by_identifier(
        &self,
        _identifier: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(None)
    }
}
