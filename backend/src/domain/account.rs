//! Account identity and merge-state fields.
//!
//! The wider application owns account registration and authentication; the
//! merge subsystem only reads identity fields and maintains the three
//! merge-state columns (`merge_id`, `is_merged`, `original_public_username`).
//!
//! ## Invariants
//! - `is_merged == true` exactly when `merge_id` names an existing merge in
//!   which this account is one of the two members.
//! - `original_public_username` is populated while merged and cleared on
//!   unmerge, restoring `public_username` in the same transaction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

/// Validation errors returned when parsing an [`AccountId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountIdParseError {
    /// The input was empty or not a valid UUID.
    InvalidId,
}

impl fmt::Display for AccountIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
        }
    }
}

impl std::error::Error for AccountIdParseError {}

impl AccountId {
    /// Validate and construct an [`AccountId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountIdParseError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(AccountIdParseError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountIdParseError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`AccountId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An application account as seen by the merge subsystem.
///
/// Identity and profile fields are read-only here; only the merge-state
/// fields are written, and only inside workflow transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account identifier.
    pub id: AccountId,
    /// Login name, unique across the application.
    pub username: String,
    /// Contact address, unique across the application.
    pub email: String,
    /// Optional given name shown on public pages.
    pub first_name: Option<String>,
    /// Public-facing name used in profile URLs.
    pub public_username: String,
    /// Free-form profile biography.
    pub bio: Option<String>,
    /// Profile avatar image location.
    pub avatar_url: Option<String>,
    /// Profile hero image location.
    pub hero_image_url: Option<String>,
    /// Whether the individual profile is publicly visible.
    pub is_profile_public: bool,
    /// Active merge this account belongs to, if any.
    pub merge_id: Option<Uuid>,
    /// Whether the account is currently part of an active merge.
    pub is_merged: bool,
    /// Pre-merge public name, preserved for restoration on unmerge.
    pub original_public_username: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Name used for slugs and public display: first name when present,
    /// username otherwise.
    pub fn display_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.username.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn account_with_first_name(first_name: Option<&str>) -> Account {
        Account {
            id: AccountId::random(),
            username: "wanderer".to_owned(),
            email: "wanderer@example.net".to_owned(),
            first_name: first_name.map(ToOwned::to_owned),
            public_username: "wanderer".to_owned(),
            bio: None,
            avatar_url: None,
            hero_image_url: None,
            is_profile_public: true,
            merge_id: None,
            is_merged: false,
            original_public_username: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Some("Alva"), "Alva")]
    #[case(Some("   "), "wanderer")]
    #[case(None, "wanderer")]
    fn display_name_prefers_first_name(#[case] first_name: Option<&str>, #[case] expected: &str) {
        let account = account_with_first_name(first_name);
        assert_eq!(account.display_name(), expected);
    }

    #[rstest]
    fn account_id_rejects_garbage() {
        assert!(AccountId::new("not-a-uuid").is_err());
        assert!(AccountId::new(" 3fa85f64-5717-4562-b3fc-2c963f66afa6").is_err());
    }

    #[rstest]
    fn account_id_serialises_as_plain_uuid_string() {
        let id = AccountId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id");
        let value = serde_json::to_value(id).expect("id serialises");
        assert_eq!(value, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }
}
