//! Port for the transactional merge workflow.
//!
//! Every mutating operation behind this port is one transaction boundary:
//! the adapter locks the participating account rows, re-evaluates
//! eligibility under those locks, performs all writes, and commits or rolls
//! back as a unit. Callers must never pre-check eligibility outside the
//! port call and rely on the answer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AccountId, Merge, MergeInvitation, ProfileDisplaySettings};

use super::define_port_error;

define_port_error! {
    /// Errors raised by merge workflow adapters.
    pub enum MergeWorkflowError {
        /// A participant already belongs to an active merge.
        AlreadyMerged =>
            "account is already part of an active merge",
        /// A participant already holds a pending invitation.
        HasActiveInvitation =>
            "a pending merge invitation already exists for one of the accounts",
        /// The invitation lapsed before it was accepted; its status is now
        /// `cancelled`.
        Expired =>
            "the invitation expired before it was accepted",
        /// No pending invitation matches the id and responding account.
        NotFoundOrProcessed =>
            "no matching pending invitation",
        /// The account has no active merge to dissolve or configure.
        NotMerged =>
            "account is not part of an active merge",
        /// The cooling-off period has not elapsed yet.
        CoolingPeriod { remaining_days: i64 } =>
            "unmerge is available in {remaining_days} day(s)",
        /// A display-settings document failed validation.
        InvalidSetting { message: String } =>
            "invalid display setting: {message}",
        /// A unique constraint rejected the write (e.g. a duplicate
        /// invitation row committed by a concurrent request).
        Conflict { message: String } =>
            "merge workflow conflict: {message}",
        /// Repository connection could not be established.
        Connection { message: String } =>
            "merge workflow connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "merge workflow query failed: {message}",
    }
}

/// Input for creating a pending invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitation {
    /// The proposing account.
    pub inviter_id: AccountId,
    /// The resolved target account.
    pub invited_id: AccountId,
    /// Optional, already-validated message.
    pub message: Option<String>,
    /// Days until the invitation lapses, from the settings provider.
    pub expires_in_days: i64,
}

/// Result of a successful accept: the merge and the terminal invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// The newly-created merge.
    pub merge: Merge,
    /// The invitation, now `accepted`.
    pub invitation: MergeInvitation,
}

/// Result of a successful unmerge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergeOutcome {
    /// The dissolved merge's slug (still routable via its redirect).
    pub slug: String,
    /// Whole days the merge lasted.
    pub duration_days: i64,
}

/// Current merge and pending invitations for one account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeStatusSnapshot {
    /// The account's active merge, if any.
    pub merge: Option<Merge>,
    /// Pending invitations the account has sent.
    pub pending_sent: Vec<MergeInvitation>,
    /// Pending invitations the account has received.
    pub pending_received: Vec<MergeInvitation>,
}

/// Port executing the merge lifecycle transitions atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeWorkflowRepository: Send + Sync {
    /// Insert a pending invitation after re-checking both parties'
    /// eligibility under row locks.
    async fn create_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<MergeInvitation, MergeWorkflowError>;

    /// Accept a pending invitation and execute the whole merge transaction:
    /// slug assignment, merge row, account updates, redirect record, and
    /// history entry commit together or not at all.
    ///
    /// Discovering an expired invitation cancels it and fails with
    /// [`MergeWorkflowError::Expired`]; the cancellation itself commits.
    async fn accept_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<AcceptOutcome, MergeWorkflowError>;

    /// Decline a pending invitation addressed to `responder_id`.
    async fn decline_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<(), MergeWorkflowError>;

    /// Cancel a pending invitation sent by `inviter_id`.
    async fn cancel_invitation(
        &self,
        invitation_id: Uuid,
        inviter_id: &AccountId,
    ) -> Result<(), MergeWorkflowError>;

    /// Dissolve the requester's merge: restore both identities, delete the
    /// merge row, and append the history entry in one transaction. Redirect
    /// records are left in place.
    async fn unmerge(
        &self,
        account_id: &AccountId,
        reason: Option<String>,
        cooling_period_days: i64,
    ) -> Result<UnmergeOutcome, MergeWorkflowError>;

    /// Read the account's current merge and pending invitations.
    async fn merge_status(
        &self,
        account_id: &AccountId,
    ) -> Result<MergeStatusSnapshot, MergeWorkflowError>;

    /// Read the display settings of the account's active merge.
    async fn get_display_settings(
        &self,
        account_id: &AccountId,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError>;

    /// Replace the display settings of the account's active merge.
    async fn update_display_settings(
        &self,
        account_id: &AccountId,
        display: ProfileDisplaySettings,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMergeWorkflowRepository;

#[async_trait]
impl MergeWorkflowRepository for FixtureMergeWorkflowRepository {
    async fn create_invitation(
        &self,
        _invitation: NewInvitation,
    ) -> Result<MergeInvitation, MergeWorkflowError> {
        Err(MergeWorkflowError::connection("no database configured"))
    }

    async fn accept_invitation(
        &self,
        _invitation_id: Uuid,
        _responder_id: &AccountId,
    ) -> Result<AcceptOutcome, MergeWorkflowError> {
        Err(MergeWorkflowError::connection("no database configured"))
    }

    async fn decline_invitation(
        &self,
        _invitation_id: Uuid,
        _responder_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        Err(MergeWorkflowError::connection("no database configured"))
    }

    async fn cancel_invitation(
        &self,
        _invitation_id: Uuid,
        _inviter_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        Err(MergeWorkflowError::connection("no database configured"))
    }

    async fn unmerge(
        &self,
        _account_id: &AccountId,
        _reason: Option<String>,
        _cooling_period_days: i64,
    ) -> Result<UnmergeOutcome, MergeWorkflowError> {
        Err(MergeWorkflowError::connection("no database configured"))
    }

    async fn merge_status(
        &self,
        _account_id: &AccountId,
    ) -> Result<MergeStatusSnapshot, MergeWorkflowError> {
        Ok(MergeStatusSnapshot::default())
    }

    async fn get_display_settings(
        &self,
        _account_id: &AccountId,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError> {
        Err(MergeWorkflowError::not_merged())
    }

    async fn update_display_settings(
        &self,
        _account_id: &AccountId,
        _display: ProfileDisplaySettings,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError> {
        Err(MergeWorkflowError::not_merged())
    }
}
