//! Merge invitation entity and its status state machine.
//!
//! Invitations are terminal once their status leaves `pending`; rows are
//! never deleted so the full proposal history remains auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;

/// Maximum accepted length for an invitation message, in characters.
pub const INVITATION_MESSAGE_MAX: usize = 500;

/// Lifecycle status of a merge invitation.
///
/// `pending` is the only non-terminal status. An expired invitation moves to
/// `cancelled` lazily, when an accept attempt discovers the expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting a response from the invited account.
    #[default]
    Pending,
    /// Accepted; a merge was created in the same transaction.
    Accepted,
    /// Declined by the invited account.
    Declined,
    /// Withdrawn by the inviter, or lapsed past its expiry.
    Cancelled,
}

impl InvitationStatus {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInvitationStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseInvitationStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown invitation status: {}", self.input)
    }
}

impl std::error::Error for ParseInvitationStatusError {}

impl std::str::FromStr for InvitationStatus {
    type Err = ParseInvitationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseInvitationStatusError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A proposal from one account to merge public identities with another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeInvitation {
    /// Stable invitation identifier.
    pub id: Uuid,
    /// Account that sent the proposal.
    pub inviter_id: AccountId,
    /// Account invited to merge.
    pub invited_id: AccountId,
    /// Optional message shown to the invited account.
    pub message: Option<String>,
    /// Current lifecycle status.
    pub status: InvitationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Instant after which an accept attempt fails with `Expired`.
    pub expires_at: DateTime<Utc>,
    /// When the invited party (or inviter, on cancel) acted on the proposal.
    pub responded_at: Option<DateTime<Utc>>,
}

impl MergeInvitation {
    /// Whether the invitation lapsed before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether `account_id` is one of the two parties.
    pub fn involves(&self, account_id: &AccountId) -> bool {
        self.inviter_id == *account_id || self.invited_id == *account_id
    }
}

/// Validation errors for invitation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationValidationError {
    /// The message was present but empty after trimming.
    EmptyMessage,
    /// The message exceeded [`INVITATION_MESSAGE_MAX`] characters.
    MessageTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl std::fmt::Display for InvitationValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "invitation message must not be empty"),
            Self::MessageTooLong { max } => {
                write!(f, "invitation message must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for InvitationValidationError {}

/// Validate an optional invitation message against the bounded-length rule.
pub fn validate_message(message: Option<&str>) -> Result<(), InvitationValidationError> {
    let Some(message) = message else {
        return Ok(());
    };
    if message.trim().is_empty() {
        return Err(InvitationValidationError::EmptyMessage);
    }
    if message.chars().count() > INVITATION_MESSAGE_MAX {
        return Err(InvitationValidationError::MessageTooLong {
            max: INVITATION_MESSAGE_MAX,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Duration;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("pending", InvitationStatus::Pending)]
    #[case("accepted", InvitationStatus::Accepted)]
    #[case("declined", InvitationStatus::Declined)]
    #[case("cancelled", InvitationStatus::Cancelled)]
    fn status_round_trips_through_strings(#[case] raw: &str, #[case] status: InvitationStatus) {
        assert_eq!(raw.parse::<InvitationStatus>(), Ok(status));
        assert_eq!(status.as_str(), raw);
    }

    #[rstest]
    fn status_rejects_unknown_strings() {
        let err = "expired".parse::<InvitationStatus>().expect_err("unknown");
        assert_eq!(err.input, "expired");
    }

    #[rstest]
    fn expiry_is_strictly_after_the_deadline() {
        let now = Utc::now();
        let invitation = MergeInvitation {
            id: Uuid::new_v4(),
            inviter_id: AccountId::random(),
            invited_id: AccountId::random(),
            message: None,
            status: InvitationStatus::Pending,
            created_at: now - Duration::days(7),
            expires_at: now,
            responded_at: None,
        };

        assert!(!invitation.is_expired(now));
        assert!(invitation.is_expired(now + Duration::seconds(1)));
    }

    #[rstest]
    fn message_validation_bounds_length() {
        assert_eq!(validate_message(None), Ok(()));
        assert_eq!(validate_message(Some("see you in Lisbon")), Ok(()));
        assert_eq!(
            validate_message(Some("   ")),
            Err(InvitationValidationError::EmptyMessage)
        );

        let oversized = "x".repeat(INVITATION_MESSAGE_MAX + 1);
        assert_eq!(
            validate_message(Some(&oversized)),
            Err(InvitationValidationError::MessageTooLong {
                max: INVITATION_MESSAGE_MAX
            })
        );
    }
}
