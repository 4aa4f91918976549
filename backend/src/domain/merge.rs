//! Merge aggregate and its display-settings document.
//!
//! A [`Merge`] row exists exactly while two accounts present as one joint
//! public identity; dissolving the merge deletes the row. The settings
//! document is versioned and strongly typed so every write is validated
//! against the closed display enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;

/// Current settings document version.
pub const SETTINGS_VERSION: u16 = 1;

/// Which member's asset to show on the joint profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePartner {
    /// The inviter's asset.
    #[default]
    User1,
    /// The invited account's asset.
    User2,
}

impl MergePartner {
    /// Returns the persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User1 => "user1",
            Self::User2 => "user2",
        }
    }
}

impl std::fmt::Display for MergePartner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MergePartner {
    type Err = ParseDisplaySettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user1" => Ok(Self::User1),
            "user2" => Ok(Self::User2),
            _ => Err(ParseDisplaySettingError {
                input: s.to_owned(),
                expected: "user1 or user2",
            }),
        }
    }
}

/// Strategy for the joint profile biography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BioDisplay {
    /// Show only the inviter's biography.
    User1,
    /// Show only the invited account's biography.
    User2,
    /// Join both biographies.
    #[default]
    Combine,
}

impl BioDisplay {
    /// Returns the persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User1 => "user1",
            Self::User2 => "user2",
            Self::Combine => "combine",
        }
    }
}

impl std::fmt::Display for BioDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BioDisplay {
    type Err = ParseDisplaySettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user1" => Ok(Self::User1),
            "user2" => Ok(Self::User2),
            "combine" => Ok(Self::Combine),
            _ => Err(ParseDisplaySettingError {
                input: s.to_owned(),
                expected: "user1, user2, or combine",
            }),
        }
    }
}

/// Error returned when parsing an unknown display-setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDisplaySettingError {
    /// The unrecognised input value.
    pub input: String,
    /// The accepted values for the field.
    pub expected: &'static str,
}

impl std::fmt::Display for ParseDisplaySettingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.input)
    }
}

impl std::error::Error for ParseDisplaySettingError {}

/// Ordering of the members' entries on the joint profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Interleave both members' entries by date.
    #[default]
    Chronological,
    /// Group entries by member.
    ByAccount,
}

/// Per-asset display choices exposed through the display-settings API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[serde(default)]
pub struct ProfileDisplaySettings {
    /// Whose avatar the joint profile shows.
    pub avatar_display: MergePartner,
    /// Whose hero image the joint profile shows.
    pub hero_image_display: MergePartner,
    /// Biography strategy for the joint profile.
    pub bio_display: BioDisplay,
}

/// Versioned display-preference document stored on the merge row.
///
/// Unknown or missing fields deserialise to their defaults so documents
/// written by older releases keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(default)]
pub struct MergeSettings {
    /// Document schema version.
    pub version: u16,
    /// Entry ordering on the joint profile.
    pub display_order: DisplayOrder,
    /// Whether each member's content is visible on the other's pages.
    pub cross_visibility: bool,
    /// Per-asset display choices.
    pub profile_display: ProfileDisplaySettings,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            display_order: DisplayOrder::Chronological,
            cross_visibility: true,
            profile_display: ProfileDisplaySettings::default(),
        }
    }
}

/// Two accounts presenting as one joint public identity.
///
/// `user1_id` is always the inviter; the ordering is stable for the life of
/// the merge and its residual redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merge {
    /// Stable merge identifier.
    pub id: Uuid,
    /// The inviting account.
    pub user1_id: AccountId,
    /// The invited account.
    pub user2_id: AccountId,
    /// Globally unique public identifier for the pair; immutable once
    /// committed, even after dissolution.
    pub slug: String,
    /// Display-preference document.
    pub settings: MergeSettings,
    /// When the merge was formed.
    pub merged_at: DateTime<Utc>,
}

impl Merge {
    /// Whether `account_id` is one of the two members.
    pub fn involves(&self, account_id: &AccountId) -> bool {
        self.user1_id == *account_id || self.user2_id == *account_id
    }

    /// The other member, if `account_id` is a member at all.
    pub fn partner_of(&self, account_id: &AccountId) -> Option<AccountId> {
        if self.user1_id == *account_id {
            Some(self.user2_id)
        } else if self.user2_id == *account_id {
            Some(self.user1_id)
        } else {
            None
        }
    }

    /// Resolve a partner selector to the member it names.
    pub fn member_for(&self, partner: MergePartner) -> AccountId {
        match partner {
            MergePartner::User1 => self.user1_id,
            MergePartner::User2 => self.user2_id,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn settings_default_matches_the_documented_policy() {
        let settings = MergeSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.display_order, DisplayOrder::Chronological);
        assert!(settings.cross_visibility);
        assert_eq!(settings.profile_display.bio_display, BioDisplay::Combine);
        assert_eq!(settings.profile_display.avatar_display, MergePartner::User1);
    }

    #[rstest]
    fn settings_tolerate_missing_fields() {
        let decoded: MergeSettings =
            serde_json::from_value(json!({ "profile_display": { "bio_display": "user2" } }))
                .expect("partial document decodes");

        assert_eq!(decoded.version, SETTINGS_VERSION);
        assert_eq!(decoded.profile_display.bio_display, BioDisplay::User2);
        assert_eq!(decoded.profile_display.avatar_display, MergePartner::User1);
    }

    #[rstest]
    fn settings_reject_values_outside_the_closed_enums() {
        let result = serde_json::from_value::<MergeSettings>(
            json!({ "profile_display": { "avatar_display": "user3" } }),
        );
        assert!(result.is_err());
    }

    #[rstest]
    #[case("user1", MergePartner::User1)]
    #[case("user2", MergePartner::User2)]
    fn partner_parses_known_values(#[case] raw: &str, #[case] expected: MergePartner) {
        assert_eq!(raw.parse::<MergePartner>(), Ok(expected));
    }

    #[rstest]
    fn bio_display_rejects_unknown_values() {
        let err = "both".parse::<BioDisplay>().expect_err("unknown value");
        assert_eq!(err.input, "both");
    }

    #[rstest]
    fn partner_of_distinguishes_members_from_strangers() {
        let merge = Merge {
            id: Uuid::new_v4(),
            user1_id: AccountId::random(),
            user2_id: AccountId::random(),
            slug: "alva-noor-travels".to_owned(),
            settings: MergeSettings::default(),
            merged_at: Utc::now(),
        };

        assert_eq!(merge.partner_of(&merge.user1_id), Some(merge.user2_id));
        assert_eq!(merge.partner_of(&merge.user2_id), Some(merge.user1_id));
        assert_eq!(merge.partner_of(&AccountId::random()), None);
    }
}
