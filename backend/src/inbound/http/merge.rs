//! Merge lifecycle HTTP handlers.
//!
//! ```text
//! GET  /api/v1/merge/status
//! POST /api/v1/merge/invite
//! POST /api/v1/merge/accept/{invitationId}
//! POST /api/v1/merge/decline/{invitationId}
//! POST /api/v1/merge/cancel/{invitationId}
//! POST /api/v1/merge/unmerge
//! GET  /api/v1/merge/history
//! GET  /api/v1/merge/public-profile/{key}
//! GET  /api/v1/merge/display-settings
//! PUT  /api/v1/merge/display-settings
//! ```

use std::str::FromStr;

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AcceptInvitationRequest, DisplaySettingsRequest, MergeHistoryRequest, MergeStatusRequest,
    MergeStatusResponse, RespondInvitationRequest, ResolveProfileRequest, SendInvitationRequest,
    UnmergeRequest, UpdateDisplaySettingsRequest,
};
use crate::domain::{
    BioDisplay, MergeHistoryEntry, MergeInvitation, MergePartner, ProfileDisplaySettings,
    ResolvedProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_choice_error, parse_uuid};

/// One invitation as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationBody {
    /// Invitation identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// The proposing account.
    #[schema(format = "uuid")]
    pub inviter_id: String,
    /// The invited account.
    #[schema(format = "uuid")]
    pub invited_id: String,
    /// Optional message from the inviter.
    pub message: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
    /// Expiry timestamp.
    #[schema(format = "date-time")]
    pub expires_at: String,
    /// Response timestamp, once terminal.
    #[schema(format = "date-time")]
    pub responded_at: Option<String>,
}

impl From<MergeInvitation> for InvitationBody {
    fn from(value: MergeInvitation) -> Self {
        Self {
            id: value.id.to_string(),
            inviter_id: value.inviter_id.to_string(),
            invited_id: value.invited_id.to_string(),
            message: value.message,
            status: value.status.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
            expires_at: value.expires_at.to_rfc3339(),
            responded_at: value.responded_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Active merge summary inside the status payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeInfoBody {
    /// Merge identifier.
    #[schema(format = "uuid")]
    pub merge_id: String,
    /// Public merge slug.
    pub slug: String,
    /// The other member.
    #[schema(format = "uuid")]
    pub partner_id: String,
    /// When the merge was formed.
    #[schema(format = "date-time")]
    pub merged_at: String,
}

/// Response payload for `GET /merge/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatusBody {
    /// Active merge, if any.
    pub merge: Option<MergeInfoBody>,
    /// Pending invitations the caller has sent.
    pub sent_invitations: Vec<InvitationBody>,
    /// Pending invitations the caller has received.
    pub received_invitations: Vec<InvitationBody>,
    /// Whether the caller may currently send an invitation.
    pub can_send_invitation: bool,
}

impl From<MergeStatusResponse> for MergeStatusBody {
    fn from(value: MergeStatusResponse) -> Self {
        Self {
            merge: value.merge.map(|info| MergeInfoBody {
                merge_id: info.merge_id.to_string(),
                slug: info.slug,
                partner_id: info.partner_id.to_string(),
                merged_at: info.merged_at.to_rfc3339(),
            }),
            sent_invitations: value.sent_invitations.into_iter().map(Into::into).collect(),
            received_invitations: value
                .received_invitations
                .into_iter()
                .map(Into::into)
                .collect(),
            can_send_invitation: value.can_send_invitation,
        }
    }
}

/// Request payload for `POST /merge/invite`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequestBody {
    /// Username, email, or public username of the target account.
    pub invited_user: String,
    /// Optional message, at most 500 characters.
    pub message: Option<String>,
}

/// Response payload for `POST /merge/invite`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponseBody {
    /// The pending invitation's identifier.
    #[schema(format = "uuid")]
    pub invitation_id: String,
    /// The message stored with the invitation.
    pub message: Option<String>,
}

/// Response payload for `POST /merge/accept/{invitationId}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptResponseBody {
    /// The new merge's slug.
    pub merge_slug: String,
    /// Public URL of the joint profile.
    pub public_url: String,
}

/// Response payload for decline/cancel.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    /// Always `true` on success.
    pub success: bool,
}

/// Request payload for `POST /merge/unmerge`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnmergeRequestBody {
    /// Optional reason recorded in the history ledger.
    pub reason: Option<String>,
}

/// Response payload for `POST /merge/unmerge`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnmergeResponseBody {
    /// Whole days the merge lasted.
    pub merge_duration: i64,
}

/// One history ledger entry as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryBody {
    /// Entry identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// `merged` or `unmerged`.
    pub event: String,
    /// Canonically-first participant.
    #[schema(format = "uuid")]
    pub account_a_id: String,
    /// Canonically-second participant.
    #[schema(format = "uuid")]
    pub account_b_id: String,
    /// The merge slug involved.
    pub slug: String,
    /// The account whose action executed the transition.
    #[schema(format = "uuid")]
    pub initiated_by: String,
    /// Whole days the merge lasted (unmerge entries only).
    pub duration_days: Option<i64>,
    /// Free-form reason (unmerge entries only).
    pub reason: Option<String>,
    /// When the transition was recorded.
    #[schema(format = "date-time")]
    pub recorded_at: String,
}

impl From<MergeHistoryEntry> for HistoryEntryBody {
    fn from(value: MergeHistoryEntry) -> Self {
        Self {
            id: value.id.to_string(),
            event: value.event.as_str().to_owned(),
            account_a_id: value.account_a_id.to_string(),
            account_b_id: value.account_b_id.to_string(),
            slug: value.slug,
            initiated_by: value.initiated_by.to_string(),
            duration_days: value.duration_days,
            reason: value.reason,
            recorded_at: value.recorded_at.to_rfc3339(),
        }
    }
}

/// Response payload for `GET /merge/history`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponseBody {
    /// Entries oldest first.
    pub entries: Vec<HistoryEntryBody>,
}

/// Display-settings payload, used for both read and write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettingsBody {
    /// `user1` or `user2`.
    pub avatar_display: String,
    /// `user1` or `user2`.
    pub hero_image_display: String,
    /// `user1`, `user2`, or `combine`.
    pub bio_display: String,
}

impl From<ProfileDisplaySettings> for DisplaySettingsBody {
    fn from(value: ProfileDisplaySettings) -> Self {
        Self {
            avatar_display: value.avatar_display.as_str().to_owned(),
            hero_image_display: value.hero_image_display.as_str().to_owned(),
            bio_display: value.bio_display.as_str().to_owned(),
        }
    }
}

fn parse_display_settings(body: DisplaySettingsBody) -> ApiResult<ProfileDisplaySettings> {
    let avatar_display = MergePartner::from_str(body.avatar_display.as_str()).map_err(|_| {
        invalid_choice_error(
            FieldName::new("avatarDisplay"),
            &body.avatar_display,
            "user1, user2",
        )
    })?;
    let hero_image_display =
        MergePartner::from_str(body.hero_image_display.as_str()).map_err(|_| {
            invalid_choice_error(
                FieldName::new("heroImageDisplay"),
                &body.hero_image_display,
                "user1, user2",
            )
        })?;
    let bio_display = BioDisplay::from_str(body.bio_display.as_str()).map_err(|_| {
        invalid_choice_error(
            FieldName::new("bioDisplay"),
            &body.bio_display,
            "user1, user2, combine",
        )
    })?;

    Ok(ProfileDisplaySettings {
        avatar_display,
        hero_image_display,
        bio_display,
    })
}

/// Card payload shared by merged and choice views.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCardBody {
    /// The account the card describes.
    #[schema(format = "uuid")]
    pub account_id: String,
    /// Public-facing name.
    pub public_username: String,
    /// Name shown on the card.
    pub display_name: String,
    /// Avatar image, when set.
    pub avatar_url: Option<String>,
    /// Whether the card may link to the individual profile.
    pub available: bool,
}

impl From<crate::domain::ProfileCard> for ProfileCardBody {
    fn from(value: crate::domain::ProfileCard) -> Self {
        Self {
            account_id: value.account_id.to_string(),
            public_username: value.public_username,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
            available: value.available,
        }
    }
}

/// Aggregate statistics payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentStatsBody {
    /// Public journal entry count.
    pub entry_count: i64,
    /// Media item count across those entries.
    pub media_count: i64,
}

/// Response payload for `GET /merge/public-profile/{key}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublicProfileBody {
    /// The key names an active merge.
    #[serde(rename_all = "camelCase")]
    Merged {
        /// The merge slug.
        slug: String,
        /// Combined display name.
        display_name: String,
        /// Strategy-selected biography.
        bio: Option<String>,
        /// Strategy-selected avatar.
        avatar_url: Option<String>,
        /// Strategy-selected hero image.
        hero_image_url: Option<String>,
        /// One card per member, inviter first.
        members: Vec<ProfileCardBody>,
        /// Aggregate public content statistics.
        stats: ContentStatsBody,
        /// When the merge was formed.
        merged_at: String,
    },
    /// The key names a dissolved merge.
    #[serde(rename_all = "camelCase")]
    UnmergedChoice {
        /// The dissolved merge's slug.
        slug: String,
        /// One card per original member.
        cards: Vec<ProfileCardBody>,
    },
    /// The key names an individual profile.
    #[serde(rename_all = "camelCase")]
    Individual {
        /// The account shown.
        account_id: String,
        /// Public-facing name.
        public_username: String,
        /// Display name.
        display_name: String,
        /// Profile biography.
        bio: Option<String>,
        /// Avatar image.
        avatar_url: Option<String>,
        /// Hero image.
        hero_image_url: Option<String>,
        /// Public content statistics.
        stats: ContentStatsBody,
    },
    /// The key names a currently-merged account.
    #[serde(rename_all = "camelCase")]
    RedirectToMerge {
        /// The merge slug to forward to.
        slug: String,
        /// Resolvable location of the joint profile.
        location: String,
    },
}

impl From<ResolvedProfile> for PublicProfileBody {
    fn from(value: ResolvedProfile) -> Self {
        match value {
            ResolvedProfile::Merged(view) => Self::Merged {
                slug: view.slug,
                display_name: view.display_name,
                bio: view.bio,
                avatar_url: view.avatar_url,
                hero_image_url: view.hero_image_url,
                members: view.members.into_iter().map(Into::into).collect(),
                stats: ContentStatsBody {
                    entry_count: view.stats.entry_count,
                    media_count: view.stats.media_count,
                },
                merged_at: view.merged_at.to_rfc3339(),
            },
            ResolvedProfile::UnmergedChoice(view) => Self::UnmergedChoice {
                slug: view.slug,
                cards: view.cards.into_iter().map(Into::into).collect(),
            },
            ResolvedProfile::Individual(view) => Self::Individual {
                account_id: view.account_id.to_string(),
                public_username: view.public_username,
                display_name: view.display_name,
                bio: view.bio,
                avatar_url: view.avatar_url,
                hero_image_url: view.hero_image_url,
                stats: ContentStatsBody {
                    entry_count: view.stats.entry_count,
                    media_count: view.stats.media_count,
                },
            },
            ResolvedProfile::RedirectToMerge { slug } => {
                let location = format!("/u/{slug}");
                Self::RedirectToMerge { slug, location }
            }
        }
    }
}

/// Current merge info, pending invitations, and send eligibility.
#[utoipa::path(
    get,
    path = "/api/v1/merge/status",
    responses(
        (status = 200, description = "Merge status", body = MergeStatusBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "mergeStatus",
    security(("SessionCookie" = []))
)]
#[get("/merge/status")]
pub async fn merge_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MergeStatusBody>> {
    let account_id = session.require_account_id()?;
    let response = state
        .merge_queries
        .status(MergeStatusRequest { account_id })
        .await?;
    Ok(web::Json(MergeStatusBody::from(response)))
}

/// Send a merge invitation to another account.
#[utoipa::path(
    post,
    path = "/api/v1/merge/invite",
    request_body = InviteRequestBody,
    responses(
        (status = 200, description = "Invitation created", body = InviteResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Target account not found", body = ErrorSchema),
        (status = 409, description = "Either party is merged or has a pending invitation", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "sendMergeInvitation",
    security(("SessionCookie" = []))
)]
#[post("/merge/invite")]
pub async fn send_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<InviteRequestBody>,
) -> ApiResult<web::Json<InviteResponseBody>> {
    let inviter_id = session.require_account_id()?;
    let body = payload.into_inner();

    let response = state
        .merge_commands
        .send_invitation(SendInvitationRequest {
            inviter_id,
            invited_identifier: body.invited_user,
            message: body.message,
        })
        .await?;

    Ok(web::Json(InviteResponseBody {
        invitation_id: response.invitation.id.to_string(),
        message: response.invitation.message,
    }))
}

/// Accept a pending invitation, forming the merge.
#[utoipa::path(
    post,
    path = "/api/v1/merge/accept/{invitationId}",
    params(("invitationId" = String, Path, description = "Invitation identifier")),
    responses(
        (status = 200, description = "Merge formed", body = AcceptResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No matching pending invitation", body = ErrorSchema),
        (status = 409, description = "Either party is no longer eligible", body = ErrorSchema),
        (status = 410, description = "Invitation expired", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "acceptMergeInvitation",
    security(("SessionCookie" = []))
)]
#[post("/merge/accept/{invitationId}")]
pub async fn accept_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AcceptResponseBody>> {
    let responder_id = session.require_account_id()?;
    let invitation_id = parse_uuid(&path.into_inner(), FieldName::new("invitationId"))?;

    let response = state
        .merge_commands
        .accept_invitation(AcceptInvitationRequest {
            invitation_id,
            responder_id,
        })
        .await?;

    Ok(web::Json(AcceptResponseBody {
        merge_slug: response.merge_slug,
        public_url: response.public_url,
    }))
}

/// Decline a pending invitation addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/merge/decline/{invitationId}",
    params(("invitationId" = String, Path, description = "Invitation identifier")),
    responses(
        (status = 200, description = "Invitation declined", body = SuccessBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No matching pending invitation", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "declineMergeInvitation",
    security(("SessionCookie" = []))
)]
#[post("/merge/decline/{invitationId}")]
pub async fn decline_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessBody>> {
    let account_id = session.require_account_id()?;
    let invitation_id = parse_uuid(&path.into_inner(), FieldName::new("invitationId"))?;

    state
        .merge_commands
        .decline_invitation(RespondInvitationRequest {
            invitation_id,
            account_id,
        })
        .await?;

    Ok(web::Json(SuccessBody { success: true }))
}

/// Cancel a pending invitation sent by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/merge/cancel/{invitationId}",
    params(("invitationId" = String, Path, description = "Invitation identifier")),
    responses(
        (status = 200, description = "Invitation cancelled", body = SuccessBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No matching pending invitation", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "cancelMergeInvitation",
    security(("SessionCookie" = []))
)]
#[post("/merge/cancel/{invitationId}")]
pub async fn cancel_invitation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessBody>> {
    let account_id = session.require_account_id()?;
    let invitation_id = parse_uuid(&path.into_inner(), FieldName::new("invitationId"))?;

    state
        .merge_commands
        .cancel_invitation(RespondInvitationRequest {
            invitation_id,
            account_id,
        })
        .await?;

    Ok(web::Json(SuccessBody { success: true }))
}

/// Dissolve the caller's merge.
#[utoipa::path(
    post,
    path = "/api/v1/merge/unmerge",
    request_body = UnmergeRequestBody,
    responses(
        (status = 200, description = "Merge dissolved", body = UnmergeResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 403, description = "Cooling-off period not elapsed", body = ErrorSchema),
        (status = 409, description = "No active merge", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "unmerge",
    security(("SessionCookie" = []))
)]
#[post("/merge/unmerge")]
pub async fn unmerge(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Option<web::Json<UnmergeRequestBody>>,
) -> ApiResult<web::Json<UnmergeResponseBody>> {
    let account_id = session.require_account_id()?;
    let reason = payload.map(web::Json::into_inner).and_then(|body| body.reason);

    let response = state
        .merge_commands
        .unmerge(UnmergeRequest { account_id, reason })
        .await?;

    Ok(web::Json(UnmergeResponseBody {
        merge_duration: response.duration_days,
    }))
}

/// Chronological merge history for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/merge/history",
    responses(
        (status = 200, description = "History entries", body = HistoryResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "mergeHistory",
    security(("SessionCookie" = []))
)]
#[get("/merge/history")]
pub async fn merge_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<HistoryResponseBody>> {
    let account_id = session.require_account_id()?;
    let response = state
        .merge_queries
        .history(MergeHistoryRequest { account_id })
        .await?;

    Ok(web::Json(HistoryResponseBody {
        entries: response.entries.into_iter().map(Into::into).collect(),
    }))
}

/// Machine-consumable resolution of a public path key.
#[utoipa::path(
    get,
    path = "/api/v1/merge/public-profile/{key}",
    params(("key" = String, Path, description = "Merge slug, public username, or username")),
    responses(
        (status = 200, description = "Resolved profile", body = PublicProfileBody),
        (status = 404, description = "Unknown key", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "resolvePublicProfile",
    security(())
)]
#[get("/merge/public-profile/{key}")]
pub async fn public_profile(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfileBody>> {
    let resolved = state
        .public_profiles
        .resolve(ResolveProfileRequest {
            key: path.into_inner(),
        })
        .await?;

    Ok(web::Json(PublicProfileBody::from(resolved)))
}

/// Read the caller's merge display settings.
#[utoipa::path(
    get,
    path = "/api/v1/merge/display-settings",
    responses(
        (status = 200, description = "Display settings", body = DisplaySettingsBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "No active merge", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "getMergeDisplaySettings",
    security(("SessionCookie" = []))
)]
#[get("/merge/display-settings")]
pub async fn get_display_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DisplaySettingsBody>> {
    let account_id = session.require_account_id()?;
    let settings = state
        .merge_queries
        .get_display_settings(DisplaySettingsRequest { account_id })
        .await?;

    Ok(web::Json(DisplaySettingsBody::from(settings)))
}

/// Replace the caller's merge display settings.
#[utoipa::path(
    put,
    path = "/api/v1/merge/display-settings",
    request_body = DisplaySettingsBody,
    responses(
        (status = 200, description = "Updated display settings", body = DisplaySettingsBody),
        (status = 400, description = "Value outside the closed enumerations", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "No active merge", body = ErrorSchema)
    ),
    tags = ["merge"],
    operation_id = "updateMergeDisplaySettings",
    security(("SessionCookie" = []))
)]
#[put("/merge/display-settings")]
pub async fn update_display_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DisplaySettingsBody>,
) -> ApiResult<web::Json<DisplaySettingsBody>> {
    let account_id = session.require_account_id()?;
    let display = parse_display_settings(payload.into_inner())?;

    let updated = state
        .merge_commands
        .update_display_settings(UpdateDisplaySettingsRequest { account_id, display })
        .await?;

    Ok(web::Json(DisplaySettingsBody::from(updated)))
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
