//! Builders selecting Diesel-backed or fixture port implementations.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    FixtureMergeCommand, FixtureMergeQuery, FixturePublicProfileQuery, MergeCommand, MergeQuery,
    PublicProfileQuery,
};
use crate::domain::{MergeService, ProfileResolverService};
use crate::inbound::http::requester::UserAgentClassifier;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{
    DieselAccountRepository, DieselMergeHistoryRepository, DieselMergeWorkflowRepository,
    DieselPublicContentStats, DieselPublicProfileRepository, DieselSettingsProvider,
};

use super::ServerConfig;

fn build_merge_services(
    config: &ServerConfig,
) -> (Arc<dyn MergeCommand>, Arc<dyn MergeQuery>) {
    match &config.db_pool {
        Some(pool) => {
            let service = Arc::new(MergeService::new(
                Arc::new(DieselMergeWorkflowRepository::new(pool.clone())),
                Arc::new(DieselAccountRepository::new(pool.clone())),
                Arc::new(DieselMergeHistoryRepository::new(pool.clone())),
                Arc::new(DieselSettingsProvider::new(pool.clone())),
            ));
            (
                service.clone() as Arc<dyn MergeCommand>,
                service as Arc<dyn MergeQuery>,
            )
        }
        None => (
            Arc::new(FixtureMergeCommand) as Arc<dyn MergeCommand>,
            Arc::new(FixtureMergeQuery) as Arc<dyn MergeQuery>,
        ),
    }
}

fn build_profile_resolver(config: &ServerConfig) -> Arc<dyn PublicProfileQuery> {
    match &config.db_pool {
        Some(pool) => Arc::new(ProfileResolverService::new(
            Arc::new(DieselPublicProfileRepository::new(pool.clone())),
            Arc::new(DieselPublicContentStats::new(pool.clone())),
        )),
        None => Arc::new(FixturePublicProfileQuery),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (merge_commands, merge_queries) = build_merge_services(config);
    let public_profiles = build_profile_resolver(config);

    web::Data::new(HttpState::with_app_base(
        HttpStatePorts {
            merge_commands,
            merge_queries,
            public_profiles,
            classifier: Arc::new(UserAgentClassifier),
        },
        config.app_base.clone(),
    ))
}
