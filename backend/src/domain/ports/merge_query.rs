//! Driving port for merge status and history reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Error, MergeHistoryEntry, MergeInvitation, ProfileDisplaySettings};

/// Request for the caller's merge status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStatusRequest {
    /// The authenticated account.
    pub account_id: AccountId,
}

/// Summary of the caller's active merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStatusInfo {
    /// The merge identifier.
    pub merge_id: uuid::Uuid,
    /// The merge slug.
    pub slug: String,
    /// The other member.
    pub partner_id: AccountId,
    /// When the merge was formed.
    pub merged_at: DateTime<Utc>,
}

/// The caller's merge status and pending invitations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStatusResponse {
    /// The active merge, if any.
    pub merge: Option<MergeStatusInfo>,
    /// Pending invitations the caller has sent.
    pub sent_invitations: Vec<MergeInvitation>,
    /// Pending invitations the caller has received.
    pub received_invitations: Vec<MergeInvitation>,
    /// Whether the caller may currently send a new invitation.
    pub can_send_invitation: bool,
}

/// Request for the caller's merge history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHistoryRequest {
    /// The authenticated account.
    pub account_id: AccountId,
}

/// Chronological merge history for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHistoryResponse {
    /// Entries oldest first.
    pub entries: Vec<MergeHistoryEntry>,
}

/// Request for the caller's merge display settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettingsRequest {
    /// The authenticated account.
    pub account_id: AccountId,
}

/// Driving port for merge reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeQuery: Send + Sync {
    /// Current merge info, pending invitations, and send eligibility.
    async fn status(&self, request: MergeStatusRequest) -> Result<MergeStatusResponse, Error>;

    /// Chronological merge history for the caller.
    async fn history(&self, request: MergeHistoryRequest) -> Result<MergeHistoryResponse, Error>;

    /// Display settings of the caller's active merge.
    async fn get_display_settings(
        &self,
        request: DisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMergeQuery;

#[async_trait]
impl MergeQuery for FixtureMergeQuery {
    async fn status(&self, _request: MergeStatusRequest) -> Result<MergeStatusResponse, Error> {
        Ok(MergeStatusResponse {
            merge: None,
            sent_invitations: Vec::new(),
            received_invitations: Vec::new(),
            can_send_invitation: true,
        })
    }

    async fn history(&self, _request: MergeHistoryRequest) -> Result<MergeHistoryResponse, Error> {
        Ok(MergeHistoryResponse {
            entries: Vec::new(),
        })
    }

    async fn get_display_settings(
        &self,
        _request: DisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error> {
        Err(Error::conflict("account is not part of an active merge"))
    }
}
