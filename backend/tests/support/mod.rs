//! In-memory store double backing the end-to-end merge scenarios.
//!
//! Implements every driven port over one mutex-guarded state, mirroring the
//! Diesel adapters' transactional semantics: each operation observes and
//! mutates the state atomically, eligibility is evaluated against current
//! state, and the expiry-discovery write survives the failed accept. Tests
//! reach into the state directly to shift timestamps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use backend::domain::ports::{
    AcceptOutcome, AccountRepository, AccountRepositoryError, MergeHistoryRepository,
    MergeHistoryRepositoryError, MergeStatusSnapshot, MergeWorkflowError,
    MergeWorkflowRepository, NewInvitation, PublicContentStats, PublicContentStatsError,
    PublicProfileRepository, PublicProfileRepositoryError, RedirectLookup, SettingsProvider,
    UnmergeOutcome,
};
use backend::domain::{
    Account, AccountId, ContentStats, EligibilityViolation, HistoryEvent, InvitationStatus,
    Merge, MergeHistoryEntry, MergeInvitation, MergeSettings, ParticipantSnapshot,
    ProfileDisplaySettings, UrlRedirect, canonical_pair, elapsed_whole_days,
    eligibility, slug,
};

/// Mutable state shared by every port implementation.
#[derive(Default)]
pub struct StoreState {
    /// Accounts by id.
    pub accounts: HashMap<Uuid, Account>,
    /// Invitations by id.
    pub invitations: HashMap<Uuid, MergeInvitation>,
    /// Active merges by id.
    pub merges: HashMap<Uuid, Merge>,
    /// Permanent redirect records, insertion order.
    pub redirects: Vec<UrlRedirect>,
    /// History ledger, insertion order.
    pub history: Vec<MergeHistoryEntry>,
    /// Public content stats per account.
    pub stats: HashMap<Uuid, ContentStats>,
    /// Invitation expiry policy, in days.
    pub invitation_expiry_days: i64,
    /// Unmerge cooling-off policy, in days.
    pub cooling_period_days: i64,
}

/// Shared in-memory store implementing all driven ports.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store with default policies (7-day expiry, no
    /// cooling-off).
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                invitation_expiry_days: 7,
                cooling_period_days: 0,
                ..StoreState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    /// Run `f` against the locked state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Seed an account whose public and login names equal `username`.
    pub fn seed_account(&self, username: &str, first_name: Option<&str>) -> Account {
        let account = Account {
            id: AccountId::random(),
            username: username.to_owned(),
            email: format!("{username}@example.net"),
            first_name: first_name.map(ToOwned::to_owned),
            public_username: username.to_owned(),
            bio: None,
            avatar_url: None,
            hero_image_url: None,
            is_profile_public: true,
            merge_id: None,
            is_merged: false,
            original_public_username: None,
            created_at: Utc::now(),
        };
        self.lock()
            .accounts
            .insert(*account.id.as_uuid(), account.clone());
        account
    }

    /// Set the public content stats for an account.
    pub fn set_stats(&self, account_id: &AccountId, stats: ContentStats) {
        self.lock().stats.insert(*account_id.as_uuid(), stats);
    }

    /// Shift an active merge's formation time into the past.
    pub fn age_merge_by_days(&self, merge_id: Uuid, days: i64) {
        let mut state = self.lock();
        if let Some(merge) = state.merges.get_mut(&merge_id) {
            merge.merged_at -= Duration::days(days);
        }
    }

    /// Shift an invitation's expiry instant into the past.
    pub fn expire_invitation(&self, invitation_id: Uuid) {
        let mut state = self.lock();
        if let Some(invitation) = state.invitations.get_mut(&invitation_id) {
            invitation.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    /// The single merge id currently held by an account, if any.
    pub fn merge_id_of(&self, account_id: &AccountId) -> Option<Uuid> {
        self.lock()
            .accounts
            .get(account_id.as_uuid())
            .and_then(|account| account.merge_id)
    }

    /// A copy of the account as currently stored.
    pub fn account(&self, account_id: &AccountId) -> Account {
        self.lock()
            .accounts
            .get(account_id.as_uuid())
            .cloned()
            .expect("account seeded")
    }
}

fn pending_involving(state: &StoreState, account: &AccountId, exclude: Option<Uuid>) -> u64 {
    state
        .invitations
        .values()
        .filter(|invitation| invitation.status == InvitationStatus::Pending)
        .filter(|invitation| invitation.involves(account))
        .filter(|invitation| Some(invitation.id) != exclude)
        .count() as u64
}

fn snapshot(state: &StoreState, account: &Account, exclude: Option<Uuid>) -> ParticipantSnapshot {
    ParticipantSnapshot {
        account_id: account.id,
        is_merged: account.is_merged,
        pending_invitations: pending_involving(state, &account.id, exclude),
    }
}

fn violation_error(violation: EligibilityViolation) -> MergeWorkflowError {
    match violation {
        EligibilityViolation::AlreadyMerged { .. } => MergeWorkflowError::already_merged(),
        EligibilityViolation::HasActiveInvitation { .. } => {
            MergeWorkflowError::has_active_invitation()
        }
    }
}

fn taken_slugs(state: &StoreState) -> std::collections::HashSet<String> {
    state
        .merges
        .values()
        .map(|merge| merge.slug.clone())
        .chain(state.redirects.iter().map(|r| r.merge_slug.clone()))
        .collect()
}

#[async_trait]
impl MergeWorkflowRepository for InMemoryStore {
    async fn create_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<MergeInvitation, MergeWorkflowError> {
        let mut state = self.lock();
        let now = Utc::now();

        let inviter = state
            .accounts
            .get(invitation.inviter_id.as_uuid())
            .cloned()
            .ok_or_else(|| MergeWorkflowError::query("inviter account missing"))?;
        let invited = state
            .accounts
            .get(invitation.invited_id.as_uuid())
            .cloned()
            .ok_or_else(|| MergeWorkflowError::query("invited account missing"))?;

        eligibility::check_pair(
            &snapshot(&state, &inviter, None),
            &snapshot(&state, &invited, None),
        )
        .map_err(violation_error)?;

        let row = MergeInvitation {
            id: Uuid::new_v4(),
            inviter_id: inviter.id,
            invited_id: invited.id,
            message: invitation.message,
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(invitation.expires_in_days),
            responded_at: None,
        };
        state.invitations.insert(row.id, row.clone());
        Ok(row)
    }

    async fn accept_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<AcceptOutcome, MergeWorkflowError> {
        let mut state = self.lock();
        let now = Utc::now();

        let invitation = state
            .invitations
            .get(&invitation_id)
            .filter(|invitation| invitation.invited_id == *responder_id)
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .cloned()
            .ok_or_else(MergeWorkflowError::not_found_or_processed)?;

        if invitation.is_expired(now) {
            // The cancellation sticks even though the accept fails.
            if let Some(stored) = state.invitations.get_mut(&invitation_id) {
                stored.status = InvitationStatus::Cancelled;
                stored.responded_at = Some(now);
            }
            return Err(MergeWorkflowError::expired());
        }

        let inviter = state
            .accounts
            .get(invitation.inviter_id.as_uuid())
            .cloned()
            .ok_or_else(|| MergeWorkflowError::query("inviter account missing"))?;
        let invited = state
            .accounts
            .get(invitation.invited_id.as_uuid())
            .cloned()
            .ok_or_else(|| MergeWorkflowError::query("invited account missing"))?;

        eligibility::check_pair(
            &snapshot(&state, &inviter, Some(invitation_id)),
            &snapshot(&state, &invited, Some(invitation_id)),
        )
        .map_err(violation_error)?;

        let base = slug::base_slug(inviter.display_name(), invited.display_name());
        let merge_slug = slug::resolve_collision(&base, &taken_slugs(&state));

        let merge = Merge {
            id: Uuid::new_v4(),
            user1_id: inviter.id,
            user2_id: invited.id,
            slug: merge_slug.clone(),
            settings: MergeSettings::default(),
            merged_at: now,
        };
        state.merges.insert(merge.id, merge.clone());

        for member in [&inviter, &invited] {
            if let Some(account) = state.accounts.get_mut(member.id.as_uuid()) {
                account.merge_id = Some(merge.id);
                account.is_merged = true;
                if account.original_public_username.is_none() {
                    account.original_public_username = Some(account.public_username.clone());
                }
            }
        }

        state.redirects.push(UrlRedirect {
            id: Uuid::new_v4(),
            merge_id: merge.id,
            merge_slug: merge_slug.clone(),
            user1_id: inviter.id,
            user2_id: invited.id,
            original_username1: inviter.username.clone(),
            original_username2: invited.username.clone(),
            original_public_username1: inviter.public_username.clone(),
            original_public_username2: invited.public_username.clone(),
            created_at: now,
        });

        let (account_a_id, account_b_id) = canonical_pair(inviter.id, invited.id);
        state.history.push(MergeHistoryEntry {
            id: Uuid::new_v4(),
            event: HistoryEvent::Merged,
            account_a_id,
            account_b_id,
            slug: merge_slug,
            initiated_by: invited.id,
            duration_days: None,
            reason: None,
            recorded_at: now,
        });

        let accepted = {
            let stored = state
                .invitations
                .get_mut(&invitation_id)
                .ok_or_else(|| MergeWorkflowError::query("invitation vanished"))?;
            stored.status = InvitationStatus::Accepted;
            stored.responded_at = Some(now);
            stored.clone()
        };

        Ok(AcceptOutcome {
            merge,
            invitation: accepted,
        })
    }

    async fn decline_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        let mut state = self.lock();
        let invitation = state
            .invitations
            .get_mut(&invitation_id)
            .filter(|invitation| invitation.invited_id == *responder_id)
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .ok_or_else(MergeWorkflowError::not_found_or_processed)?;
        invitation.status = InvitationStatus::Declined;
        invitation.responded_at = Some(Utc::now());
        Ok(())
    }

    async fn cancel_invitation(
        &self,
        invitation_id: Uuid,
        inviter_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        let mut state = self.lock();
        let invitation = state
            .invitations
            .get_mut(&invitation_id)
            .filter(|invitation| invitation.inviter_id == *inviter_id)
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .ok_or_else(MergeWorkflowError::not_found_or_processed)?;
        invitation.status = InvitationStatus::Cancelled;
        invitation.responded_at = Some(Utc::now());
        Ok(())
    }

    async fn unmerge(
        &self,
        account_id: &AccountId,
        reason: Option<String>,
        cooling_period_days: i64,
    ) -> Result<UnmergeOutcome, MergeWorkflowError> {
        let mut state = self.lock();
        let now = Utc::now();

        let merge = state
            .accounts
            .get(account_id.as_uuid())
            .and_then(|account| account.merge_id)
            .and_then(|merge_id| state.merges.get(&merge_id))
            .cloned()
            .ok_or_else(MergeWorkflowError::not_merged)?;

        let elapsed = elapsed_whole_days(merge.merged_at, now);
        let remaining = cooling_period_days - elapsed;
        if remaining > 0 {
            return Err(MergeWorkflowError::CoolingPeriod {
                remaining_days: remaining,
            });
        }

        for member_id in [merge.user1_id, merge.user2_id] {
            if let Some(account) = state.accounts.get_mut(member_id.as_uuid()) {
                if let Some(original) = account.original_public_username.take() {
                    account.public_username = original;
                }
                account.merge_id = None;
                account.is_merged = false;
            }
        }

        state.merges.remove(&merge.id);
        // Redirect records intentionally stay behind.

        let (account_a_id, account_b_id) = canonical_pair(merge.user1_id, merge.user2_id);
        state.history.push(MergeHistoryEntry {
            id: Uuid::new_v4(),
            event: HistoryEvent::Unmerged,
            account_a_id,
            account_b_id,
            slug: merge.slug.clone(),
            initiated_by: *account_id,
            duration_days: Some(elapsed),
            reason,
            recorded_at: now,
        });

        Ok(UnmergeOutcome {
            slug: merge.slug,
            duration_days: elapsed,
        })
    }

    async fn merge_status(
        &self,
        account_id: &AccountId,
    ) -> Result<MergeStatusSnapshot, MergeWorkflowError> {
        let state = self.lock();
        let merge = state
            .accounts
            .get(account_id.as_uuid())
            .and_then(|account| account.merge_id)
            .and_then(|merge_id| state.merges.get(&merge_id))
            .cloned();

        let mut pending_sent = Vec::new();
        let mut pending_received = Vec::new();
        for invitation in state.invitations.values() {
            if invitation.status != InvitationStatus::Pending {
                continue;
            }
            if invitation.inviter_id == *account_id {
                pending_sent.push(invitation.clone());
            } else if invitation.invited_id == *account_id {
                pending_received.push(invitation.clone());
            }
        }
        pending_sent.sort_by_key(|invitation| invitation.created_at);
        pending_received.sort_by_key(|invitation| invitation.created_at);

        Ok(MergeStatusSnapshot {
            merge,
            pending_sent,
            pending_received,
        })
    }

    async fn get_display_settings(
        &self,
        account_id: &AccountId,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError> {
        let state = self.lock();
        state
            .accounts
            .get(account_id.as_uuid())
            .and_then(|account| account.merge_id)
            .and_then(|merge_id| state.merges.get(&merge_id))
            .map(|merge| merge.settings.profile_display)
            .ok_or_else(MergeWorkflowError::not_merged)
    }

    async fn update_display_settings(
        &self,
        account_id: &AccountId,
        display: ProfileDisplaySettings,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError> {
        let mut state = self.lock();
        let merge_id = state
            .accounts
            .get(account_id.as_uuid())
            .and_then(|account| account.merge_id)
            .ok_or_else(MergeWorkflowError::not_merged)?;
        let merge = state
            .merges
            .get_mut(&merge_id)
            .ok_or_else(MergeWorkflowError::not_merged)?;
        merge.settings.profile_display = display;
        Ok(merge.settings.profile_display)
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.lock().accounts.get(id.as_uuid()).cloned())
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock();
        let by_username = state
            .accounts
            .values()
            .find(|account| account.username == identifier);
        let by_email = state
            .accounts
            .values()
            .find(|account| account.email == identifier);
        let by_public = state
            .accounts
            .values()
            .find(|account| account.public_username == identifier);
        Ok(by_username.or(by_email).or(by_public).cloned())
    }
}

#[async_trait]
impl PublicProfileRepository for InMemoryStore {
    async fn find_redirect_by_slug(
        &self,
        key: &str,
    ) -> Result<Option<RedirectLookup>, PublicProfileRepositoryError> {
        let state = self.lock();
        let redirect = state
            .redirects
            .iter()
            .find(|redirect| redirect.merge_slug == key)
            .cloned();
        Ok(redirect.map(|redirect| {
            let merge = state.merges.get(&redirect.merge_id).cloned();
            RedirectLookup { redirect, merge }
        }))
    }

    async fn find_merge_by_id(
        &self,
        merge_id: Uuid,
    ) -> Result<Option<Merge>, PublicProfileRepositoryError> {
        Ok(self.lock().merges.get(&merge_id).cloned())
    }

    async fn find_account_by_id(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        Ok(self.lock().accounts.get(account_id.as_uuid()).cloned())
    }

    async fn find_account_by_public_key(
        &self,
        key: &str,
    ) -> Result<Option<Account>, PublicProfileRepositoryError> {
        let state = self.lock();
        let by_public = state
            .accounts
            .values()
            .find(|account| account.public_username == key);
        let by_username = state
            .accounts
            .values()
            .find(|account| account.username == key);
        Ok(by_public.or(by_username).cloned())
    }
}

#[async_trait]
impl MergeHistoryRepository for InMemoryStore {
    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<MergeHistoryEntry>, MergeHistoryRepositoryError> {
        let state = self.lock();
        let mut entries: Vec<MergeHistoryEntry> = state
            .history
            .iter()
            .filter(|entry| {
                entry.account_a_id == *account_id || entry.account_b_id == *account_id
            })
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.recorded_at);
        Ok(entries)
    }
}

#[async_trait]
impl PublicContentStats for InMemoryStore {
    async fn stats_for_accounts(
        &self,
        account_ids: &[AccountId],
    ) -> Result<ContentStats, PublicContentStatsError> {
        let state = self.lock();
        let mut total = ContentStats::default();
        for id in account_ids {
            if let Some(stats) = state.stats.get(id.as_uuid()) {
                total.entry_count += stats.entry_count;
                total.media_count += stats.media_count;
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl SettingsProvider for InMemoryStore {
    async fn invitation_expiry_days(&self) -> i64 {
        self.lock().invitation_expiry_days
    }

    async fn unmerge_cooling_period_days(&self) -> i64 {
        self.lock().cooling_period_days
    }
}
