//! Merge lifecycle domain service.
//!
//! Implements the [`MergeCommand`] and [`MergeQuery`] driving ports over the
//! workflow, account, history, and settings ports. Policy values (expiry,
//! cooling-off) are resolved here; every eligibility decision is made by the
//! workflow adapter inside its own transaction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::Error;
use crate::domain::invitation::validate_message;
use crate::domain::ports::{
    AcceptInvitationRequest, AcceptInvitationResponse, AccountRepository, AccountRepositoryError,
    DisplaySettingsRequest, MergeCommand, MergeHistoryRepository, MergeHistoryRepositoryError,
    MergeHistoryRequest, MergeHistoryResponse, MergeQuery, MergeStatusInfo, MergeStatusRequest,
    MergeStatusResponse, MergeWorkflowError, MergeWorkflowRepository, NewInvitation,
    RespondInvitationRequest, SendInvitationRequest, SendInvitationResponse, SettingsProvider,
    UnmergeRequest, UnmergeResponse, UpdateDisplaySettingsRequest,
};
use crate::domain::{MergeInvitation, ProfileDisplaySettings};

fn map_workflow_error(error: MergeWorkflowError) -> Error {
    match error {
        MergeWorkflowError::AlreadyMerged => {
            Error::conflict("account is already part of an active merge")
                .with_details(json!({ "code": "already_merged" }))
        }
        MergeWorkflowError::HasActiveInvitation => {
            Error::conflict("a pending merge invitation already exists for one of the accounts")
                .with_details(json!({ "code": "has_active_invitation" }))
        }
        MergeWorkflowError::Expired => Error::gone("the invitation expired before it was accepted")
            .with_details(json!({ "code": "invitation_expired" })),
        MergeWorkflowError::NotFoundOrProcessed => {
            Error::not_found("no matching pending invitation")
                .with_details(json!({ "code": "invitation_not_found_or_processed" }))
        }
        MergeWorkflowError::NotMerged => Error::conflict("account is not part of an active merge")
            .with_details(json!({ "code": "not_merged" })),
        MergeWorkflowError::CoolingPeriod { remaining_days } => {
            Error::forbidden("the cooling-off period has not elapsed yet").with_details(json!({
                "code": "cooling_period",
                "remainingDays": remaining_days,
            }))
        }
        MergeWorkflowError::InvalidSetting { message } => {
            Error::invalid_request(format!("invalid display setting: {message}"))
        }
        MergeWorkflowError::Conflict { message } => {
            Error::conflict(format!("conflicting merge request: {message}"))
                .with_details(json!({ "code": "conflict" }))
        }
        MergeWorkflowError::Connection { message } => {
            Error::service_unavailable(format!("merge workflow unavailable: {message}"))
        }
        MergeWorkflowError::Query { message } => {
            Error::internal(format!("merge workflow error: {message}"))
        }
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
    }
}

fn map_history_error(error: MergeHistoryRepositoryError) -> Error {
    match error {
        MergeHistoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("merge history unavailable: {message}"))
        }
        MergeHistoryRepositoryError::Query { message } => {
            Error::internal(format!("merge history error: {message}"))
        }
    }
}

/// Merge lifecycle service over the workflow, account, history, and
/// settings ports.
#[derive(Clone)]
pub struct MergeService<W, A, H, S> {
    workflow: Arc<W>,
    accounts: Arc<A>,
    history: Arc<H>,
    settings: Arc<S>,
}

impl<W, A, H, S> MergeService<W, A, H, S> {
    /// Create a new service over the given ports.
    pub fn new(workflow: Arc<W>, accounts: Arc<A>, history: Arc<H>, settings: Arc<S>) -> Self {
        Self {
            workflow,
            accounts,
            history,
            settings,
        }
    }
}

#[async_trait]
impl<W, A, H, S> MergeCommand for MergeService<W, A, H, S>
where
    W: MergeWorkflowRepository,
    A: AccountRepository,
    H: MergeHistoryRepository,
    S: SettingsProvider,
{
    async fn send_invitation(
        &self,
        request: SendInvitationRequest,
    ) -> Result<SendInvitationResponse, Error> {
        validate_message(request.message.as_deref()).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "message", "code": "invalid_message" }))
        })?;

        let invited = self
            .accounts
            .find_by_identifier(request.invited_identifier.trim())
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| {
                Error::not_found("no account matches the supplied identifier")
                    .with_details(json!({ "code": "account_not_found" }))
            })?;

        if invited.id == request.inviter_id {
            return Err(Error::invalid_request("cannot send a merge invitation to yourself")
                .with_details(json!({ "code": "self_invitation" })));
        }

        let expires_in_days = self.settings.invitation_expiry_days().await;
        let invitation = self
            .workflow
            .create_invitation(NewInvitation {
                inviter_id: request.inviter_id,
                invited_id: invited.id,
                message: request.message,
                expires_in_days,
            })
            .await
            .map_err(map_workflow_error)?;

        Ok(SendInvitationResponse { invitation })
    }

    async fn accept_invitation(
        &self,
        request: AcceptInvitationRequest,
    ) -> Result<AcceptInvitationResponse, Error> {
        let outcome = self
            .workflow
            .accept_invitation(request.invitation_id, &request.responder_id)
            .await
            .map_err(map_workflow_error)?;

        info!(
            merge_id = %outcome.merge.id,
            slug = %outcome.merge.slug,
            "merge formed"
        );

        let merge_slug = outcome.merge.slug;
        let public_url = format!("/u/{merge_slug}");
        Ok(AcceptInvitationResponse {
            merge_slug,
            public_url,
        })
    }

    async fn decline_invitation(&self, request: RespondInvitationRequest) -> Result<(), Error> {
        self.workflow
            .decline_invitation(request.invitation_id, &request.account_id)
            .await
            .map_err(map_workflow_error)
    }

    async fn cancel_invitation(&self, request: RespondInvitationRequest) -> Result<(), Error> {
        self.workflow
            .cancel_invitation(request.invitation_id, &request.account_id)
            .await
            .map_err(map_workflow_error)
    }

    async fn unmerge(&self, request: UnmergeRequest) -> Result<UnmergeResponse, Error> {
        let cooling_period_days = self.settings.unmerge_cooling_period_days().await;
        let outcome = self
            .workflow
            .unmerge(&request.account_id, request.reason, cooling_period_days)
            .await
            .map_err(map_workflow_error)?;

        info!(
            slug = %outcome.slug,
            duration_days = outcome.duration_days,
            "merge dissolved"
        );

        Ok(UnmergeResponse {
            duration_days: outcome.duration_days,
        })
    }

    async fn update_display_settings(
        &self,
        request: UpdateDisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error> {
        self.workflow
            .update_display_settings(&request.account_id, request.display)
            .await
            .map_err(map_workflow_error)
    }
}

fn pending_only(invitations: Vec<MergeInvitation>) -> Vec<MergeInvitation> {
    invitations
        .into_iter()
        .filter(|invitation| invitation.status == crate::domain::InvitationStatus::Pending)
        .collect()
}

#[async_trait]
impl<W, A, H, S> MergeQuery for MergeService<W, A, H, S>
where
    W: MergeWorkflowRepository,
    A: AccountRepository,
    H: MergeHistoryRepository,
    S: SettingsProvider,
{
    async fn status(&self, request: MergeStatusRequest) -> Result<MergeStatusResponse, Error> {
        let snapshot = self
            .workflow
            .merge_status(&request.account_id)
            .await
            .map_err(map_workflow_error)?;

        let merge = snapshot
            .merge
            .map(|merge| {
                let partner_id = merge.partner_of(&request.account_id).ok_or_else(|| {
                    Error::internal("merge does not include the requesting account")
                })?;
                Ok::<_, Error>(MergeStatusInfo {
                    merge_id: merge.id,
                    slug: merge.slug,
                    partner_id,
                    merged_at: merge.merged_at,
                })
            })
            .transpose()?;

        let sent_invitations = pending_only(snapshot.pending_sent);
        let received_invitations = pending_only(snapshot.pending_received);
        let can_send_invitation =
            merge.is_none() && sent_invitations.is_empty() && received_invitations.is_empty();

        Ok(MergeStatusResponse {
            merge,
            sent_invitations,
            received_invitations,
            can_send_invitation,
        })
    }

    async fn history(&self, request: MergeHistoryRequest) -> Result<MergeHistoryResponse, Error> {
        let entries = self
            .history
            .list_for_account(&request.account_id)
            .await
            .map_err(map_history_error)?;

        Ok(MergeHistoryResponse { entries })
    }

    async fn get_display_settings(
        &self,
        request: DisplaySettingsRequest,
    ) -> Result<ProfileDisplaySettings, Error> {
        self.workflow
            .get_display_settings(&request.account_id)
            .await
            .map_err(map_workflow_error)
    }
}

#[cfg(test)]
#[path = "merge_service_tests.rs"]
mod tests;
