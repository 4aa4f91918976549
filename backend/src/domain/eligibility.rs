//! Eligibility rules for forming a merge.
//!
//! The predicates operate on snapshots that adapters load under row locks,
//! inside the same transaction that performs the mutation. Evaluating them
//! over unlocked reads reintroduces the check-then-mutate race this module
//! exists to close.

use super::account::AccountId;

/// Locked view of one participant's merge-related state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    /// The participant account.
    pub account_id: AccountId,
    /// Whether the account is part of an active merge.
    pub is_merged: bool,
    /// Number of pending invitations where the account is either party,
    /// excluding the invitation currently being processed (if any).
    pub pending_invitations: u64,
}

/// Reasons a pair of accounts may not merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityViolation {
    /// A participant already belongs to an active merge.
    AlreadyMerged {
        /// The blocked participant.
        account_id: AccountId,
    },
    /// A participant already holds a pending invitation.
    HasActiveInvitation {
        /// The blocked participant.
        account_id: AccountId,
    },
}

impl std::fmt::Display for EligibilityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyMerged { account_id } => {
                write!(f, "account {account_id} is already part of an active merge")
            }
            Self::HasActiveInvitation { account_id } => {
                write!(f, "account {account_id} already has a pending invitation")
            }
        }
    }
}

impl std::error::Error for EligibilityViolation {}

fn check_participant(snapshot: &ParticipantSnapshot) -> Result<(), EligibilityViolation> {
    if snapshot.is_merged {
        return Err(EligibilityViolation::AlreadyMerged {
            account_id: snapshot.account_id,
        });
    }
    if snapshot.pending_invitations > 0 {
        return Err(EligibilityViolation::HasActiveInvitation {
            account_id: snapshot.account_id,
        });
    }
    Ok(())
}

/// Check that both participants may enter a merge.
///
/// The invited party is checked first so the caller-facing failure names the
/// target of the invitation when both parties are blocked.
pub fn check_pair(
    inviter: &ParticipantSnapshot,
    invited: &ParticipantSnapshot,
) -> Result<(), EligibilityViolation> {
    check_participant(invited)?;
    check_participant(inviter)
}
