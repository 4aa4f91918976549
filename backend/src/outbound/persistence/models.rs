//! Row and insert structs bridging Diesel and the domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, Merge, MergeHistoryEntry, MergeInvitation, MergeSettings, UrlRedirect,
};

use super::schema::{
    account_merge_history, account_merge_invitations, account_merges, accounts,
    merge_url_redirects,
};

/// Error decoding a database row into a domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecodeError {
    /// What failed to decode.
    pub message: String,
}

impl RowDecodeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row decode failed: {}", self.message)
    }
}

impl std::error::Error for RowDecodeError {}

/// Account row as stored.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    /// Primary key.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Optional given name.
    pub first_name: Option<String>,
    /// Public-facing name.
    pub public_username: String,
    /// Profile biography.
    pub bio: Option<String>,
    /// Avatar image location.
    pub avatar_url: Option<String>,
    /// Hero image location.
    pub hero_image_url: Option<String>,
    /// Whether the profile is publicly visible.
    pub is_profile_public: bool,
    /// Active merge, when merged.
    pub merge_id: Option<Uuid>,
    /// Pre-merge public name.
    pub original_public_username: Option<String>,
    /// Whether the account is merged.
    pub is_merged: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            public_username: row.public_username,
            bio: row.bio,
            avatar_url: row.avatar_url,
            hero_image_url: row.hero_image_url,
            is_profile_public: row.is_profile_public,
            merge_id: row.merge_id,
            is_merged: row.is_merged,
            original_public_username: row.original_public_username,
            created_at: row.created_at,
        }
    }
}

/// Invitation row as stored.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_merge_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvitationRow {
    /// Primary key.
    pub id: Uuid,
    /// Proposing account.
    pub inviter_id: Uuid,
    /// Invited account.
    pub invited_id: Uuid,
    /// Optional message.
    pub message: Option<String>,
    /// Status string.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationRow> for MergeInvitation {
    type Error = RowDecodeError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|err| RowDecodeError::new(format!("invitation {}: {err}", row.id)))?;
        Ok(Self {
            id: row.id,
            inviter_id: AccountId::from_uuid(row.inviter_id),
            invited_id: AccountId::from_uuid(row.invited_id),
            message: row.message,
            status,
            created_at: row.created_at,
            expires_at: row.expires_at,
            responded_at: row.responded_at,
        })
    }
}

/// New invitation values.
#[derive(Debug, Insertable)]
#[diesel(table_name = account_merge_invitations)]
pub struct NewInvitationRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Proposing account.
    pub inviter_id: Uuid,
    /// Invited account.
    pub invited_id: Uuid,
    /// Optional message.
    pub message: Option<&'a str>,
    /// Status string.
    pub status: &'a str,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Merge row as stored.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_merges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MergeRow {
    /// Primary key.
    pub id: Uuid,
    /// The inviting account.
    pub user1_id: Uuid,
    /// The invited account.
    pub user2_id: Uuid,
    /// Public slug.
    pub slug: String,
    /// Display-preference document.
    pub settings: Value,
    /// When the merge was formed.
    pub merged_at: DateTime<Utc>,
}

impl TryFrom<MergeRow> for Merge {
    type Error = RowDecodeError;

    fn try_from(row: MergeRow) -> Result<Self, Self::Error> {
        // Documents written by older releases decode through serde defaults.
        let settings: MergeSettings = serde_json::from_value(row.settings)
            .map_err(|err| RowDecodeError::new(format!("merge {} settings: {err}", row.id)))?;
        Ok(Self {
            id: row.id,
            user1_id: AccountId::from_uuid(row.user1_id),
            user2_id: AccountId::from_uuid(row.user2_id),
            slug: row.slug,
            settings,
            merged_at: row.merged_at,
        })
    }
}

/// New merge values.
#[derive(Debug, Insertable)]
#[diesel(table_name = account_merges)]
pub struct NewMergeRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// The inviting account.
    pub user1_id: Uuid,
    /// The invited account.
    pub user2_id: Uuid,
    /// Public slug.
    pub slug: &'a str,
    /// Display-preference document.
    pub settings: &'a Value,
    /// When the merge was formed.
    pub merged_at: DateTime<Utc>,
}

/// History row as stored.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_merge_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Primary key.
    pub id: Uuid,
    /// Event string.
    pub event: String,
    /// Canonically-first participant.
    pub account_a_id: Uuid,
    /// Canonically-second participant.
    pub account_b_id: Uuid,
    /// Merge slug.
    pub slug: String,
    /// Initiating account.
    pub initiated_by: Uuid,
    /// Duration in whole days.
    pub duration_days: Option<i64>,
    /// Free-form reason.
    pub reason: Option<String>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for MergeHistoryEntry {
    type Error = RowDecodeError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let event = row
            .event
            .parse()
            .map_err(|err| RowDecodeError::new(format!("history {}: {err}", row.id)))?;
        Ok(Self {
            id: row.id,
            event,
            account_a_id: AccountId::from_uuid(row.account_a_id),
            account_b_id: AccountId::from_uuid(row.account_b_id),
            slug: row.slug,
            initiated_by: AccountId::from_uuid(row.initiated_by),
            duration_days: row.duration_days,
            reason: row.reason,
            recorded_at: row.recorded_at,
        })
    }
}

/// New history values.
#[derive(Debug, Insertable)]
#[diesel(table_name = account_merge_history)]
pub struct NewHistoryRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Event string.
    pub event: &'a str,
    /// Canonically-first participant.
    pub account_a_id: Uuid,
    /// Canonically-second participant.
    pub account_b_id: Uuid,
    /// Merge slug.
    pub slug: &'a str,
    /// Initiating account.
    pub initiated_by: Uuid,
    /// Duration in whole days.
    pub duration_days: Option<i64>,
    /// Free-form reason.
    pub reason: Option<&'a str>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Redirect row as stored.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = merge_url_redirects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RedirectRow {
    /// Primary key.
    pub id: Uuid,
    /// Originating merge.
    pub merge_id: Uuid,
    /// The slug the pair presented under.
    pub merge_slug: String,
    /// The inviting account.
    pub user1_id: Uuid,
    /// The invited account.
    pub user2_id: Uuid,
    /// Inviter's login name at merge time.
    pub original_username1: String,
    /// Invited account's login name at merge time.
    pub original_username2: String,
    /// Inviter's public name at merge time.
    pub original_public_username1: String,
    /// Invited account's public name at merge time.
    pub original_public_username2: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<RedirectRow> for UrlRedirect {
    fn from(row: RedirectRow) -> Self {
        Self {
            id: row.id,
            merge_id: row.merge_id,
            merge_slug: row.merge_slug,
            user1_id: AccountId::from_uuid(row.user1_id),
            user2_id: AccountId::from_uuid(row.user2_id),
            original_username1: row.original_username1,
            original_username2: row.original_username2,
            original_public_username1: row.original_public_username1,
            original_public_username2: row.original_public_username2,
            created_at: row.created_at,
        }
    }
}

/// New redirect values.
#[derive(Debug, Insertable)]
#[diesel(table_name = merge_url_redirects)]
pub struct NewRedirectRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Originating merge.
    pub merge_id: Uuid,
    /// The slug the pair presents under.
    pub merge_slug: &'a str,
    /// The inviting account.
    pub user1_id: Uuid,
    /// The invited account.
    pub user2_id: Uuid,
    /// Inviter's login name.
    pub original_username1: &'a str,
    /// Invited account's login name.
    pub original_username2: &'a str,
    /// Inviter's public name.
    pub original_public_username1: &'a str,
    /// Invited account's public name.
    pub original_public_username2: &'a str,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
