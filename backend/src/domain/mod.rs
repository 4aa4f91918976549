//! Domain entities, services, and ports for the account-merging subsystem.
//!
//! Types here are transport and persistence agnostic. Inbound adapters map
//! them to HTTP payloads; outbound adapters persist them through the driven
//! ports in [`ports`].

pub mod account;
pub mod eligibility;
pub mod error;
pub mod history;
pub mod invitation;
pub mod merge;
mod merge_service;
pub mod ports;
pub mod profile;
mod profile_resolver;
pub mod redirect;
pub mod slug;

pub use self::account::{Account, AccountId, AccountIdParseError};
pub use self::eligibility::{EligibilityViolation, ParticipantSnapshot};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::history::{HistoryEvent, MergeHistoryEntry, canonical_pair, elapsed_whole_days};
pub use self::invitation::{
    INVITATION_MESSAGE_MAX, InvitationStatus, InvitationValidationError, MergeInvitation,
};
pub use self::merge::{
    BioDisplay, DisplayOrder, Merge, MergePartner, MergeSettings, ParseDisplaySettingError,
    ProfileDisplaySettings, SETTINGS_VERSION,
};
pub use self::merge_service::MergeService;
pub use self::profile::{
    ChoicePageView, ContentStats, IndividualProfileView, MergedProfileView, ProfileCard,
    ResolvedProfile,
};
pub use self::profile_resolver::ProfileResolverService;
pub use self::redirect::UrlRedirect;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("nothing here"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
