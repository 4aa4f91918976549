//! Port for the application settings the merge subsystem consumes.
//!
//! The settings store belongs to the wider application. Adapters fall back
//! to the documented defaults on missing or malformed values and on read
//! failure, so a settings outage never fails a merge request.

use async_trait::async_trait;

/// Default invitation expiry when the setting is absent, in days.
pub const DEFAULT_INVITATION_EXPIRY_DAYS: i64 = 7;

/// Default unmerge cooling-off period when the setting is absent, in days.
pub const DEFAULT_UNMERGE_COOLING_DAYS: i64 = 0;

/// Port supplying merge policy values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Days a pending invitation stays acceptable.
    async fn invitation_expiry_days(&self) -> i64;

    /// Minimum days after merging before an unmerge is permitted.
    async fn unmerge_cooling_period_days(&self) -> i64;
}

/// Fixture implementation returning the documented defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSettingsProvider;

#[async_trait]
impl SettingsProvider for FixtureSettingsProvider {
    async fn invitation_expiry_days(&self) -> i64 {
        DEFAULT_INVITATION_EXPIRY_DAYS
    }

    async fn unmerge_cooling_period_days(&self) -> i64 {
        DEFAULT_UNMERGE_COOLING_DAYS
    }
}
