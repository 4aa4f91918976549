//! Permanent slug-to-pair redirect records.
//!
//! A [`UrlRedirect`] is created alongside a merge and intentionally survives
//! its dissolution: the row is the permanent memory that "this slug once
//! named these two accounts", and after an unmerge it becomes the routing
//! key for the choice page. Do not clean these rows up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;

/// Permanent record binding a merge slug to the original pair identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRedirect {
    /// Stable redirect identifier.
    pub id: Uuid,
    /// The merge that created this record; the merge row may be gone.
    pub merge_id: Uuid,
    /// The slug the pair presented under.
    pub merge_slug: String,
    /// The inviting account at merge time.
    pub user1_id: AccountId,
    /// The invited account at merge time.
    pub user2_id: AccountId,
    /// The inviter's login name at merge time.
    pub original_username1: String,
    /// The invited account's login name at merge time.
    pub original_username2: String,
    /// The inviter's public name at merge time.
    pub original_public_username1: String,
    /// The invited account's public name at merge time.
    pub original_public_username2: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl UrlRedirect {
    /// Both member ids, in stored order.
    pub fn member_ids(&self) -> [AccountId; 2] {
        [self.user1_id, self.user2_id]
    }
}
