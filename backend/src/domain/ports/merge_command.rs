//! Driving port for merge lifecycle commands.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AccountId, Error, MergeInvitation, ProfileDisplaySettings};

/// Request to send a merge invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInvitationRequest {
    /// The authenticated proposing account.
    pub inviter_id: AccountId,
    /// Username, email, or public username naming the target account.
    pub invited_identifier: String,
    /// Optional message shown to the target.
    pub message: Option<String>,
}

/// Response after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInvitationResponse {
    /// The pending invitation.
    pub invitation: MergeInvitation,
}

/// Request to accept a pending invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptInvitationRequest {
    /// The invitation to accept.
    pub invitation_id: Uuid,
    /// The authenticated responding account; must be the invited party.
    pub responder_id: AccountId,
}

/// Response after a successful accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptInvitationResponse {
    /// The new merge's slug.
    pub merge_slug: String,
    /// Public URL of the joint profile.
    pub public_url: String,
}

/// Request to decline or cancel a pending invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondInvitationRequest {
    /// The invitation acted on.
    pub invitation_id: Uuid,
    /// The authenticated acting account.
    pub account_id: AccountId,
}

/// Request to dissolve the caller's merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergeRequest {
    /// The authenticated requesting account.
    pub account_id: AccountId,
    /// Optional free-form reason recorded in history.
    pub reason: Option<String>,
}

/// Response after a successful unmerge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergeResponse {
    /// Whole days the merge lasted.
    pub duration_days: i64,
}

/// Request to replace the caller's merge display settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDisplaySettingsRequest {
    /// The authenticated requesting account.
    pub account_id: AccountId,
    /// The validated replacement settings.
    pub display: ProfileDisplaySettings,
}

/// Driving port for merge lifecycle commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeCommand: Send + Sync {
    /// Send a merge invitation to another account.
    async fn send_invitation(
        &self,
        request: SendInvitationRequest,
    ) -> Result<SendInvitationResponse, Error>;

    /// Accept a pending invitation, forming the merge.
    async fn accept_invitation(
        &self,
        request: AcceptInvitationRequest,
    ) -> Result<AcceptInvitationResponse, Error>;

    /// Decline a pending invitation addressed to the caller.
    async fn decline_invitation(&self, request: RespondInvitationRequest) -> Result<(), Error>;

    /// Cancel a pending invitation sent by the caller.
    async fn cancel_invitation(&self, request: RespondInvitationRequest) -> Result<(), Error>;

    /// Dissolve the caller's merge.
    async fn unmerge(&self, request: UnmergeRequest) -> Result<UnmergeResponse, Error>;

    /// Replace the caller's merge display settings.
    async fn update_display_settings(
        &self,
        request: UpdateDisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMergeCommand;

#[async_trait]
impl MergeCommand for FixtureMergeCommand {
    async fn send_invitation(
        &self,
        _request: SendInvitationRequest,
    ) -> Result<SendInvitationResponse, Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }

    async fn accept_invitation(
        &self,
        _request: AcceptInvitationRequest,
    ) -> Result<AcceptInvitationResponse, Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }

    async fn decline_invitation(&self, _request: RespondInvitationRequest) -> Result<(), Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }

    async fn cancel_invitation(&self, _request: RespondInvitationRequest) -> Result<(), Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }

    async fn unmerge(&self, _request: UnmergeRequest) -> Result<UnmergeResponse, Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }

    async fn update_display_settings(
        &self,
        _request: UpdateDisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error> {
        Err(Error::service_unavailable("merge workflow is not configured"))
    }
}
