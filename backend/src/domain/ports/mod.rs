//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod content_stats;
mod history_repository;
mod merge_command;
mod merge_query;
mod merge_workflow_repository;
mod public_profile_query;
mod public_profile_repository;
mod requester_classifier;
mod settings_provider;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError, FixtureAccountRepository};
#[cfg(test)]
pub use content_stats::MockPublicContentStats;
pub use content_stats::{FixturePublicContentStats, PublicContentStats, PublicContentStatsError};
#[cfg(test)]
pub use history_repository::MockMergeHistoryRepository;
pub use history_repository::{
    FixtureMergeHistoryRepository, MergeHistoryRepository, MergeHistoryRepositoryError,
};
#[cfg(test)]
pub use merge_command::MockMergeCommand;
pub use merge_command::{
    AcceptInvitationRequest, AcceptInvitationResponse, FixtureMergeCommand, MergeCommand,
    RespondInvitationRequest, SendInvitationRequest, SendInvitationResponse, UnmergeRequest,
    UnmergeResponse, UpdateDisplaySettingsRequest,
};
#[cfg(test)]
pub use merge_query::MockMergeQuery;
pub use merge_query::{
    DisplaySettingsRequest, FixtureMergeQuery, MergeHistoryRequest, MergeHistoryResponse,
    MergeQuery, MergeStatusInfo, MergeStatusRequest, MergeStatusResponse,
};
#[cfg(test)]
pub use merge_workflow_repository::MockMergeWorkflowRepository;
pub use merge_workflow_repository::{
    AcceptOutcome, FixtureMergeWorkflowRepository, MergeStatusSnapshot, MergeWorkflowError,
    MergeWorkflowRepository, NewInvitation, UnmergeOutcome,
};
#[cfg(test)]
pub use public_profile_query::MockPublicProfileQuery;
pub use public_profile_query::{
    FixturePublicProfileQuery, PublicProfileQuery, ResolveProfileRequest,
};
#[cfg(test)]
pub use public_profile_repository::MockPublicProfileRepository;
pub use public_profile_repository::{
    FixturePublicProfileRepository, PublicProfileRepository, PublicProfileRepositoryError,
    RedirectLookup,
};
#[cfg(test)]
pub use requester_classifier::MockRequesterClassifier;
pub use requester_classifier::{
    FixtureRequesterClassifier, RequestSignals, RequesterClass, RequesterClassifier,
};
#[cfg(test)]
pub use settings_provider::MockSettingsProvider;
pub use settings_provider::{
    DEFAULT_INVITATION_EXPIRY_DAYS, DEFAULT_UNMERGE_COOLING_DAYS, FixtureSettingsProvider,
    SettingsProvider,
};
