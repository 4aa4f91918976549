//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    MergeCommand, MergeQuery, PublicProfileQuery, RequesterClassifier,
};

/// Base path of the interactive application's public profile pages, used to
/// build canonical URLs on the bot-facing surface.
pub const DEFAULT_APP_BASE: &str = "/app/u";

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Merge lifecycle commands.
    pub merge_commands: Arc<dyn MergeCommand>,
    /// Merge status and history reads.
    pub merge_queries: Arc<dyn MergeQuery>,
    /// Public profile resolution.
    pub public_profiles: Arc<dyn PublicProfileQuery>,
    /// Requester classification for the bot-facing surface.
    pub classifier: Arc<dyn RequesterClassifier>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Merge lifecycle commands.
    pub merge_commands: Arc<dyn MergeCommand>,
    /// Merge status and history reads.
    pub merge_queries: Arc<dyn MergeQuery>,
    /// Public profile resolution.
    pub public_profiles: Arc<dyn PublicProfileQuery>,
    /// Requester classification for the bot-facing surface.
    pub classifier: Arc<dyn RequesterClassifier>,
    /// Base path of the interactive application's profile pages.
    pub app_base: String,
}

impl HttpState {
    /// Construct state from a ports bundle with the default app base.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_app_base(ports, DEFAULT_APP_BASE)
    }

    /// Construct state from a ports bundle and an explicit app base path.
    pub fn with_app_base(ports: HttpStatePorts, app_base: impl Into<String>) -> Self {
        let HttpStatePorts {
            merge_commands,
            merge_queries,
            public_profiles,
            classifier,
        } = ports;
        Self {
            merge_commands,
            merge_queries,
            public_profiles,
            classifier,
            app_base: app_base.into(),
        }
    }
}
