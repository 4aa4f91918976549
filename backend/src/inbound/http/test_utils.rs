//! Shared helpers for HTTP adapter tests.

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{HttpResponse, web};

use crate::domain::ports::{
    FixtureMergeCommand, FixtureMergeQuery, FixturePublicProfileQuery, FixtureRequesterClassifier,
};
use crate::inbound::http::session::ACCOUNT_ID_KEY;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Session middleware with an ephemeral key and relaxed cookie flags.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Fixture-backed port bundle; swap individual fields per test.
pub fn fixture_ports() -> HttpStatePorts {
    HttpStatePorts {
        merge_commands: Arc::new(FixtureMergeCommand),
        merge_queries: Arc::new(FixtureMergeQuery),
        public_profiles: Arc::new(FixturePublicProfileQuery),
        classifier: Arc::new(FixtureRequesterClassifier),
    }
}

/// Fixture-backed HTTP state.
pub fn fixture_state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(fixture_ports()))
}

/// Test-only route handler that stores the given account id in the session.
///
/// Register it at a route taking an `{id}` path segment:
/// `web::resource("/test-login/{id}").route(web::post().to(test_login))`.
pub async fn test_login(session: Session, path: web::Path<String>) -> HttpResponse {
    match session.insert(ACCOUNT_ID_KEY, path.into_inner()) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}
