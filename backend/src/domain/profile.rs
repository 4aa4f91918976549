//! Public profile resolution results and view models.
//!
//! A public path segment resolves to exactly one of the variants in
//! [`ResolvedProfile`]; inbound adapters decide how each variant is
//! represented (JSON payload, preview markup, or an HTTP redirect).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountId};
use super::merge::ProfileDisplaySettings;

/// Aggregate counts over accounts' public content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    /// Number of publicly visible journal entries.
    pub entry_count: i64,
    /// Number of media items attached to those entries.
    pub media_count: i64,
}

/// Public card for one account, shown on joint and choice pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
    /// The account the card describes.
    pub account_id: AccountId,
    /// Public-facing name, used to link the individual profile.
    pub public_username: String,
    /// Name shown on the card.
    pub display_name: String,
    /// Avatar image, when set.
    pub avatar_url: Option<String>,
    /// Whether the card may link to the individual profile.
    pub available: bool,
}

impl ProfileCard {
    /// Build a card for a live account.
    pub fn for_account(account: &Account) -> Self {
        Self {
            account_id: account.id,
            public_username: account.public_username.clone(),
            display_name: account.display_name().to_owned(),
            avatar_url: account.avatar_url.clone(),
            available: account.is_profile_public,
        }
    }
}

/// The joint profile rendered while a merge is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProfileView {
    /// The merge slug the pair presents under.
    pub slug: String,
    /// Combined display name, inviter first.
    pub display_name: String,
    /// Biography selected by the merge's display settings.
    pub bio: Option<String>,
    /// Avatar selected by the merge's display settings.
    pub avatar_url: Option<String>,
    /// Hero image selected by the merge's display settings.
    pub hero_image_url: Option<String>,
    /// One card per member, inviter first.
    pub members: Vec<ProfileCard>,
    /// Aggregate public content statistics across both members.
    pub stats: ContentStats,
    /// Display settings in force when the view was built.
    pub display: ProfileDisplaySettings,
    /// When the merge was formed.
    pub merged_at: DateTime<Utc>,
}

/// The choice page rendered at a slug whose merge has been dissolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoicePageView {
    /// The dissolved merge's slug.
    pub slug: String,
    /// One card per original member; unavailable cards render disabled.
    pub cards: Vec<ProfileCard>,
}

/// An ordinary individual profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualProfileView {
    /// The account shown.
    pub account_id: AccountId,
    /// Public-facing name.
    pub public_username: String,
    /// Name shown on the profile.
    pub display_name: String,
    /// Profile biography.
    pub bio: Option<String>,
    /// Avatar image, when set.
    pub avatar_url: Option<String>,
    /// Hero image, when set.
    pub hero_image_url: Option<String>,
    /// Public content statistics for the account.
    pub stats: ContentStats,
}

/// Outcome of resolving a public path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedProfile {
    /// The key names an active merge.
    Merged(MergedProfileView),
    /// The key names a dissolved merge; show the choice page.
    UnmergedChoice(ChoicePageView),
    /// The key names an unmerged account's individual profile.
    Individual(IndividualProfileView),
    /// The key names a currently-merged account; never terminal, forward to
    /// the merge slug instead.
    RedirectToMerge {
        /// The current merge slug for the account.
        slug: String,
    },
}
