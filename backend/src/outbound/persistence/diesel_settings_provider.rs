//! Settings provider reading the application's key/value settings store.
//!
//! Missing rows, malformed values, and read failures all fall back to the
//! documented defaults; a settings outage never fails a merge request.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    DEFAULT_INVITATION_EXPIRY_DAYS, DEFAULT_UNMERGE_COOLING_DAYS, SettingsProvider,
};

use super::pool::DbPool;
use super::schema::app_settings;

const INVITATION_EXPIRY_KEY: &str = "merge_invitation_expiry_days";
const UNMERGE_COOLING_KEY: &str = "merge_unmerge_cooling_period_days";

/// Diesel-backed implementation of the settings provider port.
#[derive(Clone)]
pub struct DieselSettingsProvider {
    pool: DbPool,
}

impl DieselSettingsProvider {
    /// Create a new provider with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn read_days(&self, key: &str, default: i64) -> i64 {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(error) => {
                warn!(%key, %error, "settings read failed, using default");
                return default;
            }
        };

        let raw = app_settings::table
            .filter(app_settings::key.eq(key))
            .select(app_settings::value)
            .first::<String>(&mut conn)
            .await
            .optional();

        match raw {
            Ok(Some(value)) => match value.trim().parse::<i64>() {
                Ok(days) if days >= 0 => days,
                Ok(_) | Err(_) => {
                    warn!(%key, %value, "malformed setting value, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(error) => {
                warn!(%key, %error, "settings read failed, using default");
                default
            }
        }
    }
}

#[async_trait]
impl SettingsProvider for DieselSettingsProvider {
    async fn invitation_expiry_days(&self) -> i64 {
        self.read_days(INVITATION_EXPIRY_KEY, DEFAULT_INVITATION_EXPIRY_DAYS)
            .await
    }

    async fn unmerge_cooling_period_days(&self) -> i64 {
        self.read_days(UNMERGE_COOLING_KEY, DEFAULT_UNMERGE_COOLING_DAYS)
            .await
    }
}
