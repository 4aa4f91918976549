//! PostgreSQL-backed `MergeWorkflowRepository` implementation using Diesel.
//!
//! Every mutating operation runs as one transaction. Participant account
//! rows are locked `FOR UPDATE` in ascending id order before eligibility is
//! evaluated, so two operations touching an overlapping pair serialise while
//! disjoint pairs proceed concurrently. Slug probing happens inside the same
//! transaction that commits the merge row, making slug assignment final.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    AcceptOutcome, MergeStatusSnapshot, MergeWorkflowError, MergeWorkflowRepository,
    NewInvitation, UnmergeOutcome,
};
use crate::domain::{
    Account, AccountId, EligibilityViolation, HistoryEvent, InvitationStatus, Merge,
    MergeInvitation, MergeSettings, ParticipantSnapshot, ProfileDisplaySettings, SETTINGS_VERSION,
    canonical_pair, elapsed_whole_days, eligibility, slug,
};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{AccountRow, InvitationRow, MergeRow, NewHistoryRow, NewInvitationRow, NewMergeRow, NewRedirectRow};
use super::pool::{DbPool, PoolError};
use super::schema::{
    account_merge_history, account_merge_invitations, account_merges, accounts,
    merge_url_redirects,
};

impl From<diesel::result::Error> for MergeWorkflowError {
    fn from(error: diesel::result::Error) -> Self {
        if is_unique_violation(&error) {
            return Self::conflict("unique constraint violation");
        }
        map_diesel_error(error, Self::query, Self::connection)
    }
}

fn map_pool(error: PoolError) -> MergeWorkflowError {
    map_pool_error(error, MergeWorkflowError::connection)
}

fn decode_failure(error: impl std::fmt::Display) -> MergeWorkflowError {
    MergeWorkflowError::query(error.to_string())
}

fn violation_error(violation: EligibilityViolation) -> MergeWorkflowError {
    match violation {
        EligibilityViolation::AlreadyMerged { .. } => MergeWorkflowError::already_merged(),
        EligibilityViolation::HasActiveInvitation { .. } => {
            MergeWorkflowError::has_active_invitation()
        }
    }
}

/// Lock both participant rows in ascending id order and return them.
///
/// Locking in a stable order keeps concurrent operations on overlapping
/// pairs from deadlocking against each other.
async fn lock_account_pair(
    conn: &mut AsyncPgConnection,
    first: Uuid,
    second: Uuid,
) -> Result<Vec<AccountRow>, MergeWorkflowError> {
    let rows = accounts::table
        .filter(accounts::id.eq_any([first, second]))
        .order(accounts::id.asc())
        .select(AccountRow::as_select())
        .for_update()
        .load::<AccountRow>(conn)
        .await?;
    Ok(rows)
}

fn take_row(rows: &[AccountRow], id: Uuid, role: &str) -> Result<Account, MergeWorkflowError> {
    rows.iter()
        .find(|row| row.id == id)
        .cloned()
        .map(Account::from)
        .ok_or_else(|| MergeWorkflowError::query(format!("{role} account row missing")))
}

/// Count pending invitations where the account is either party, optionally
/// excluding the invitation currently being processed.
async fn pending_invitations_for(
    conn: &mut AsyncPgConnection,
    account_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<u64, MergeWorkflowError> {
    let involved = account_merge_invitations::table
        .filter(account_merge_invitations::status.eq(InvitationStatus::Pending.as_str()))
        .filter(
            account_merge_invitations::inviter_id
                .eq(account_id)
                .or(account_merge_invitations::invited_id.eq(account_id)),
        );
    let count: i64 = match exclude {
        Some(excluded_id) => {
            involved
                .filter(account_merge_invitations::id.ne(excluded_id))
                .count()
                .get_result(conn)
                .await?
        }
        None => involved.count().get_result(conn).await?,
    };
    Ok(count.unsigned_abs())
}

async fn snapshot_for(
    conn: &mut AsyncPgConnection,
    account: &Account,
    exclude: Option<Uuid>,
) -> Result<ParticipantSnapshot, MergeWorkflowError> {
    let pending = pending_invitations_for(conn, *account.id.as_uuid(), exclude).await?;
    Ok(ParticipantSnapshot {
        account_id: account.id,
        is_merged: account.is_merged,
        pending_invitations: pending,
    })
}

/// Probe every slug sharing the base prefix, across live merges and the
/// residual redirect records, so a dissolved pair's slug is never reissued.
async fn taken_slugs(
    conn: &mut AsyncPgConnection,
    base: &str,
) -> Result<HashSet<String>, MergeWorkflowError> {
    let pattern = format!("{base}%");
    let mut taken: HashSet<String> = account_merges::table
        .filter(account_merges::slug.like(pattern.clone()))
        .select(account_merges::slug)
        .load::<String>(conn)
        .await?
        .into_iter()
        .collect();
    let redirect_slugs: Vec<String> = merge_url_redirects::table
        .filter(merge_url_redirects::merge_slug.like(pattern))
        .select(merge_url_redirects::merge_slug)
        .load::<String>(conn)
        .await?;
    taken.extend(redirect_slugs);
    Ok(taken)
}

async fn append_history(
    conn: &mut AsyncPgConnection,
    event: HistoryEvent,
    pair: (AccountId, AccountId),
    merge_slug: &str,
    initiated_by: AccountId,
    duration_days: Option<i64>,
    reason: Option<&str>,
    recorded_at: DateTime<Utc>,
) -> Result<(), MergeWorkflowError> {
    let (account_a, account_b) = canonical_pair(pair.0, pair.1);
    diesel::insert_into(account_merge_history::table)
        .values(&NewHistoryRow {
            id: Uuid::new_v4(),
            event: event.as_str(),
            account_a_id: *account_a.as_uuid(),
            account_b_id: *account_b.as_uuid(),
            slug: merge_slug,
            initiated_by: *initiated_by.as_uuid(),
            duration_days,
            reason,
            recorded_at,
        })
        .execute(conn)
        .await?;
    Ok(())
}

enum AcceptTx {
    Done(Box<AcceptOutcome>),
    Expired,
}

/// Diesel-backed implementation of the merge workflow port.
#[derive(Clone)]
pub struct DieselMergeWorkflowRepository {
    pool: DbPool,
}

impl DieselMergeWorkflowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn close_invitation(
        &self,
        invitation_id: Uuid,
        owner_column_is_invited: bool,
        owner_id: &AccountId,
        next_status: InvitationStatus,
    ) -> Result<(), MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let now = Utc::now();
        let owner = *owner_id.as_uuid();

        // Single guarded UPDATE; ownership and pending status are part of
        // the predicate so a lost race simply matches zero rows.
        let scope = account_merge_invitations::table
            .filter(account_merge_invitations::id.eq(invitation_id))
            .filter(account_merge_invitations::status.eq(InvitationStatus::Pending.as_str()));
        let updated = if owner_column_is_invited {
            diesel::update(scope.filter(account_merge_invitations::invited_id.eq(owner)))
                .set((
                    account_merge_invitations::status.eq(next_status.as_str()),
                    account_merge_invitations::responded_at.eq(Some(now)),
                ))
                .execute(&mut conn)
                .await?
        } else {
            diesel::update(scope.filter(account_merge_invitations::inviter_id.eq(owner)))
                .set((
                    account_merge_invitations::status.eq(next_status.as_str()),
                    account_merge_invitations::responded_at.eq(Some(now)),
                ))
                .execute(&mut conn)
                .await?
        };

        if updated == 0 {
            return Err(MergeWorkflowError::not_found_or_processed());
        }
        Ok(())
    }
}

#[async_trait]
impl MergeWorkflowRepository for DieselMergeWorkflowRepository {
    async fn create_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<MergeInvitation, MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let now = Utc::now();
        let inviter_id = *invitation.inviter_id.as_uuid();
        let invited_id = *invitation.invited_id.as_uuid();

        let row = conn
            .transaction::<InvitationRow, MergeWorkflowError, _>(|conn| {
                async move {
                    let rows = lock_account_pair(conn, inviter_id, invited_id).await?;
                    let inviter = take_row(&rows, inviter_id, "inviter")?;
                    let invited = take_row(&rows, invited_id, "invited")?;

                    let inviter_snapshot = snapshot_for(conn, &inviter, None).await?;
                    let invited_snapshot = snapshot_for(conn, &invited, None).await?;
                    eligibility::check_pair(&inviter_snapshot, &invited_snapshot)
                        .map_err(violation_error)?;

                    let inserted = diesel::insert_into(account_merge_invitations::table)
                        .values(&NewInvitationRow {
                            id: Uuid::new_v4(),
                            inviter_id,
                            invited_id,
                            message: invitation.message.as_deref(),
                            status: InvitationStatus::Pending.as_str(),
                            created_at: now,
                            expires_at: now + Duration::days(invitation.expires_in_days),
                        })
                        .returning(InvitationRow::as_returning())
                        .get_result::<InvitationRow>(conn)
                        .await?;
                    Ok(inserted)
                }
                .scope_boxed()
            })
            .await?;

        MergeInvitation::try_from(row).map_err(decode_failure)
    }

    async fn accept_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<AcceptOutcome, MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let now = Utc::now();
        let responder = *responder_id.as_uuid();

        let result = conn
            .transaction::<AcceptTx, MergeWorkflowError, _>(|conn| {
                async move {
                    let invitation_row = account_merge_invitations::table
                        .filter(account_merge_invitations::id.eq(invitation_id))
                        .filter(account_merge_invitations::invited_id.eq(responder))
                        .filter(
                            account_merge_invitations::status
                                .eq(InvitationStatus::Pending.as_str()),
                        )
                        .select(InvitationRow::as_select())
                        .for_update()
                        .first::<InvitationRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(MergeWorkflowError::not_found_or_processed)?;

                    let inviter_id = invitation_row.inviter_id;
                    let rows = lock_account_pair(conn, inviter_id, responder).await?;
                    let inviter = take_row(&rows, inviter_id, "inviter")?;
                    let invited = take_row(&rows, responder, "invited")?;

                    // Lazy expiry: the cancellation must commit, so it is
                    // reported through the Ok channel and mapped after the
                    // transaction ends.
                    if now > invitation_row.expires_at {
                        diesel::update(
                            account_merge_invitations::table
                                .filter(account_merge_invitations::id.eq(invitation_id)),
                        )
                        .set((
                            account_merge_invitations::status
                                .eq(InvitationStatus::Cancelled.as_str()),
                            account_merge_invitations::responded_at.eq(Some(now)),
                        ))
                        .execute(conn)
                        .await?;
                        return Ok(AcceptTx::Expired);
                    }

                    // Acceptance is not guaranteed by having been sent:
                    // re-run both parties' checks, excluding this invitation.
                    let inviter_snapshot =
                        snapshot_for(conn, &inviter, Some(invitation_id)).await?;
                    let invited_snapshot =
                        snapshot_for(conn, &invited, Some(invitation_id)).await?;
                    eligibility::check_pair(&inviter_snapshot, &invited_snapshot)
                        .map_err(violation_error)?;

                    let base = slug::base_slug(inviter.display_name(), invited.display_name());
                    let taken = taken_slugs(conn, &base).await?;
                    let merge_slug = slug::resolve_collision(&base, &taken);

                    let settings_value = serde_json::to_value(MergeSettings::default())
                        .map_err(|err| MergeWorkflowError::query(err.to_string()))?;
                    let merge_row = diesel::insert_into(account_merges::table)
                        .values(&NewMergeRow {
                            id: Uuid::new_v4(),
                            user1_id: inviter_id,
                            user2_id: responder,
                            slug: &merge_slug,
                            settings: &settings_value,
                            merged_at: now,
                        })
                        .returning(MergeRow::as_returning())
                        .get_result::<MergeRow>(conn)
                        .await?;

                    for account in [&inviter, &invited] {
                        // Preserve the earliest pre-merge identity across
                        // repeated merges: only set when currently unset.
                        let original = account
                            .original_public_username
                            .clone()
                            .unwrap_or_else(|| account.public_username.clone());
                        diesel::update(
                            accounts::table.filter(accounts::id.eq(account.id.as_uuid())),
                        )
                        .set((
                            accounts::merge_id.eq(Some(merge_row.id)),
                            accounts::is_merged.eq(true),
                            accounts::original_public_username.eq(Some(original)),
                        ))
                        .execute(conn)
                        .await?;
                    }

                    diesel::insert_into(merge_url_redirects::table)
                        .values(&NewRedirectRow {
                            id: Uuid::new_v4(),
                            merge_id: merge_row.id,
                            merge_slug: &merge_slug,
                            user1_id: inviter_id,
                            user2_id: responder,
                            original_username1: &inviter.username,
                            original_username2: &invited.username,
                            original_public_username1: &inviter.public_username,
                            original_public_username2: &invited.public_username,
                            created_at: now,
                        })
                        .execute(conn)
                        .await?;

                    append_history(
                        conn,
                        HistoryEvent::Merged,
                        (inviter.id, invited.id),
                        &merge_slug,
                        invited.id,
                        None,
                        None,
                        now,
                    )
                    .await?;

                    let accepted_row = diesel::update(
                        account_merge_invitations::table
                            .filter(account_merge_invitations::id.eq(invitation_id)),
                    )
                    .set((
                        account_merge_invitations::status
                            .eq(InvitationStatus::Accepted.as_str()),
                        account_merge_invitations::responded_at.eq(Some(now)),
                    ))
                    .returning(InvitationRow::as_returning())
                    .get_result::<InvitationRow>(conn)
                    .await?;

                    let merge = Merge::try_from(merge_row).map_err(decode_failure)?;
                    let accepted =
                        MergeInvitation::try_from(accepted_row).map_err(decode_failure)?;
                    Ok(AcceptTx::Done(Box::new(AcceptOutcome {
                        merge,
                        invitation: accepted,
                    })))
                }
                .scope_boxed()
            })
            .await?;

        match result {
            AcceptTx::Done(outcome) => Ok(*outcome),
            AcceptTx::Expired => Err(MergeWorkflowError::expired()),
        }
    }

    async fn decline_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        self.close_invitation(invitation_id, true, responder_id, InvitationStatus::Declined)
            .await
    }

    async fn cancel_invitation(
        &self,
        invitation_id: Uuid,
        inviter_id: &AccountId,
    ) -> Result<(), MergeWorkflowError> {
        self.close_invitation(invitation_id, false, inviter_id, InvitationStatus::Cancelled)
            .await
    }

    async fn unmerge(
        &self,
        account_id: &AccountId,
        reason: Option<String>,
        cooling_period_days: i64,
    ) -> Result<UnmergeOutcome, MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let now = Utc::now();
        let requester = *account_id.as_uuid();

        conn.transaction::<UnmergeOutcome, MergeWorkflowError, _>(|conn| {
            async move {
                // Read the merge reference first, then lock in canonical
                // order and re-verify, so this cannot deadlock against a
                // concurrent accept locking the same pair.
                let merge_ref = accounts::table
                    .filter(accounts::id.eq(requester))
                    .select(accounts::merge_id)
                    .first::<Option<Uuid>>(conn)
                    .await
                    .optional()?
                    .flatten()
                    .ok_or_else(MergeWorkflowError::not_merged)?;

                let merge_row = account_merges::table
                    .filter(account_merges::id.eq(merge_ref))
                    .select(MergeRow::as_select())
                    .for_update()
                    .first::<MergeRow>(conn)
                    .await
                    .optional()?
                    .ok_or_else(MergeWorkflowError::not_merged)?;

                let rows = lock_account_pair(conn, merge_row.user1_id, merge_row.user2_id).await?;
                let requester_row = rows
                    .iter()
                    .find(|row| row.id == requester)
                    .ok_or_else(MergeWorkflowError::not_merged)?;
                if requester_row.merge_id != Some(merge_row.id) {
                    // The merge changed between the unlocked read and the
                    // row locks; treat as already dissolved.
                    return Err(MergeWorkflowError::not_merged());
                }

                let elapsed = elapsed_whole_days(merge_row.merged_at, now);
                let remaining = cooling_period_days - elapsed;
                if remaining > 0 {
                    return Err(MergeWorkflowError::CoolingPeriod {
                        remaining_days: remaining,
                    });
                }

                for row in &rows {
                    let restored = row
                        .original_public_username
                        .clone()
                        .unwrap_or_else(|| row.public_username.clone());
                    diesel::update(accounts::table.filter(accounts::id.eq(row.id)))
                        .set((
                            accounts::public_username.eq(restored),
                            accounts::merge_id.eq(None::<Uuid>),
                            accounts::is_merged.eq(false),
                            accounts::original_public_username.eq(None::<String>),
                        ))
                        .execute(conn)
                        .await?;
                }

                diesel::delete(
                    account_merges::table.filter(account_merges::id.eq(merge_row.id)),
                )
                .execute(conn)
                .await?;

                append_history(
                    conn,
                    HistoryEvent::Unmerged,
                    (
                        AccountId::from_uuid(merge_row.user1_id),
                        AccountId::from_uuid(merge_row.user2_id),
                    ),
                    &merge_row.slug,
                    AccountId::from_uuid(requester),
                    Some(elapsed),
                    reason.as_deref(),
                    now,
                )
                .await?;

                // merge_url_redirects rows stay put; from here on they
                // route the choice page for this slug.
                Ok(UnmergeOutcome {
                    slug: merge_row.slug,
                    duration_days: elapsed,
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn merge_status(
        &self,
        account_id: &AccountId,
    ) -> Result<MergeStatusSnapshot, MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let account = *account_id.as_uuid();

        let merge_ref = accounts::table
            .filter(accounts::id.eq(account))
            .select(accounts::merge_id)
            .first::<Option<Uuid>>(&mut conn)
            .await
            .optional()?
            .flatten();

        let merge = match merge_ref {
            Some(merge_id) => account_merges::table
                .filter(account_merges::id.eq(merge_id))
                .select(MergeRow::as_select())
                .first::<MergeRow>(&mut conn)
                .await
                .optional()?
                .map(Merge::try_from)
                .transpose()
                .map_err(decode_failure)?,
            None => None,
        };

        let pending_rows = account_merge_invitations::table
            .filter(account_merge_invitations::status.eq(InvitationStatus::Pending.as_str()))
            .filter(
                account_merge_invitations::inviter_id
                    .eq(account)
                    .or(account_merge_invitations::invited_id.eq(account)),
            )
            .order(account_merge_invitations::created_at.asc())
            .select(InvitationRow::as_select())
            .load::<InvitationRow>(&mut conn)
            .await?;

        let mut pending_sent = Vec::new();
        let mut pending_received = Vec::new();
        for row in pending_rows {
            let sent = row.inviter_id == account;
            let invitation = MergeInvitation::try_from(row).map_err(decode_failure)?;
            if sent {
                pending_sent.push(invitation);
            } else {
                pending_received.push(invitation);
            }
        }

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
        let snapshot = self.merge_status(account_id).await?;
        snapshot
            .merge
            .map(|merge| merge.settings.profile_display)
            .ok_or_else(MergeWorkflowError::not_merged)
    }

    async fn update_display_settings(
        &self,
        account_id: &AccountId,
        display: ProfileDisplaySettings,
    ) -> Result<ProfileDisplaySettings, MergeWorkflowError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let requester = *account_id.as_uuid();

        conn.transaction::<ProfileDisplaySettings, MergeWorkflowError, _>(|conn| {
            async move {
                let merge_ref = accounts::table
                    .filter(accounts::id.eq(requester))
                    .select(accounts::merge_id)
                    .first::<Option<Uuid>>(conn)
                    .await
                    .optional()?
                    .flatten()
                    .ok_or_else(MergeWorkflowError::not_merged)?;

                let merge_row = account_merges::table
                    .filter(account_merges::id.eq(merge_ref))
                    .select(MergeRow::as_select())
                    .for_update()
                    .first::<MergeRow>(conn)
                    .await
                    .optional()?
                    .ok_or_else(MergeWorkflowError::not_merged)?;

                let mut settings: MergeSettings =
                    serde_json::from_value(merge_row.settings).unwrap_or_default();
                settings.profile_display = display;
                settings.version = SETTINGS_VERSION;

                let settings_value = serde_json::to_value(&settings)
                    .map_err(|err| MergeWorkflowError::invalid_setting(err.to_string()))?;
                diesel::update(
                    account_merges::table.filter(account_merges::id.eq(merge_row.id)),
                )
                .set(account_merges::settings.eq(settings_value))
                .execute(conn)
                .await?;

                Ok(settings.profile_display)
            }
            .scope_boxed()
        })
        .await
    }
}
