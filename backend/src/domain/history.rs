//! Append-only ledger of merge and unmerge transitions.
//!
//! Entries are written inside the coordinator transactions and never
//! mutated afterwards; readers use them for audit and duration display only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;

/// The transition a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEvent {
    /// Two accounts formed a joint identity.
    Merged,
    /// A joint identity was dissolved.
    Unmerged,
}

impl HistoryEvent {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Unmerged => "unmerged",
        }
    }
}

impl std::fmt::Display for HistoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHistoryEventError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseHistoryEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown history event: {}", self.input)
    }
}

impl std::error::Error for ParseHistoryEventError {}

impl std::str::FromStr for HistoryEvent {
    type Err = ParseHistoryEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merged" => Ok(Self::Merged),
            "unmerged" => Ok(Self::Unmerged),
            _ => Err(ParseHistoryEventError {
                input: s.to_owned(),
            }),
        }
    }
}

/// One recorded merge or unmerge transition.
///
/// Participants are stored in canonical order (smaller id first) so queries
/// behave identically regardless of who initiated the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeHistoryEntry {
    /// Stable entry identifier.
    pub id: Uuid,
    /// Which transition this entry records.
    pub event: HistoryEvent,
    /// Canonically-first participant.
    pub account_a_id: AccountId,
    /// Canonically-second participant.
    pub account_b_id: AccountId,
    /// The merge slug the pair presented under.
    pub slug: String,
    /// The account whose action executed the transition.
    pub initiated_by: AccountId,
    /// Whole days the merge lasted; present on `unmerged` entries only.
    pub duration_days: Option<i64>,
    /// Optional free-form reason; present on `unmerged` entries only.
    pub reason: Option<String>,
    /// When the transition was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Order a pair of participants canonically, smaller id first.
pub fn canonical_pair(a: AccountId, b: AccountId) -> (AccountId, AccountId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Whole days elapsed between two instants, never negative.
pub fn elapsed_whole_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days().max(0)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Duration;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn canonical_pair_is_order_insensitive() {
        let a = AccountId::random();
        let b = AccountId::random();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));

        let (first, second) = canonical_pair(a, b);
        assert!(first <= second);
    }

    #[rstest]
    #[case(Duration::hours(23), 0)]
    #[case(Duration::days(1), 1)]
    #[case(Duration::days(41) + Duration::hours(7), 41)]
    fn elapsed_days_floor(#[case] elapsed: Duration, #[case] expected: i64) {
        let merged_at = Utc::now();
        assert_eq!(elapsed_whole_days(merged_at, merged_at + elapsed), expected);
    }

    #[rstest]
    fn elapsed_days_never_negative() {
        let now = Utc::now();
        assert_eq!(elapsed_whole_days(now, now - Duration::hours(5)), 0);
    }

    #[rstest]
    fn event_round_trips_through_strings() {
        assert_eq!("merged".parse::<HistoryEvent>(), Ok(HistoryEvent::Merged));
        assert_eq!(HistoryEvent::Unmerged.as_str(), "unmerged");
        assert!("renamed".parse::<HistoryEvent>().is_err());
    }
}
