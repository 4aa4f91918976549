//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.

mod diesel_account_repository;
mod diesel_content_stats;
mod diesel_history_repository;
mod diesel_merge_workflow_repository;
mod diesel_public_profile_repository;
mod diesel_settings_provider;
mod error_mapping;
pub mod models;
mod pool;
pub mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_content_stats::DieselPublicContentStats;
pub use diesel_history_repository::DieselMergeHistoryRepository;
pub use diesel_merge_workflow_repository::DieselMergeWorkflowRepository;
pub use diesel_public_profile_repository::DieselPublicProfileRepository;
pub use diesel_settings_provider::DieselSettingsProvider;
pub use pool::{DbPool, PoolConfig, PoolError};
