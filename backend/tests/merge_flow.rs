//! End-to-end merge scenarios driven through the HTTP surface.
//!
//! The in-memory store double stands in for PostgreSQL; domain services and
//! HTTP adapters are the real implementations.

mod support;

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use backend::domain::ports::{MergeCommand, MergeQuery, PublicProfileQuery};
use backend::domain::{Account, ContentStats, MergeService, ProfileResolverService};
use backend::inbound::http::merge::{
    accept_invitation, cancel_invitation, decline_invitation, get_display_settings,
    merge_history, merge_status, public_profile, send_invitation, unmerge,
    update_display_settings,
};
use backend::inbound::http::public_html::public_identity_page;
use backend::inbound::http::requester::UserAgentClassifier;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::test_utils::{test_login, test_session_middleware};

use support::InMemoryStore;

const BOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1)";

fn http_state(store: &InMemoryStore) -> web::Data<HttpState> {
    let ports = Arc::new(store.clone());
    let service = Arc::new(MergeService::new(
        ports.clone(),
        ports.clone(),
        ports.clone(),
        ports.clone(),
    ));
    let resolver = Arc::new(ProfileResolverService::new(ports.clone(), ports));
    web::Data::new(HttpState::new(HttpStatePorts {
        merge_commands: service.clone() as Arc<dyn MergeCommand>,
        merge_queries: service as Arc<dyn MergeQuery>,
        public_profiles: resolver as Arc<dyn PublicProfileQuery>,
        classifier: Arc::new(UserAgentClassifier),
    }))
}

macro_rules! scenario_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(http_state($store))
                .wrap(test_session_middleware())
                .route("/test-login/{id}", web::post().to(test_login))
                .service(merge_status)
                .service(send_invitation)
                .service(accept_invitation)
                .service(decline_invitation)
                .service(cancel_invitation)
                .service(unmerge)
                .service(merge_history)
                .service(public_profile)
                .service(get_display_settings)
                .service(update_display_settings)
                .service(public_identity_page),
        )
        .await
    };
}

type TestApp = actix_web::dev::ServiceResponse;

async fn login<S>(app: &S, account: &Account) -> actix_web::cookie::Cookie<'static>
where
    S: actix_web::dev::Service<actix_http::Request, Response = TestApp, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/test-login/{}", account.id))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

async fn get_json<S>(app: &S, uri: &str, cookie: Option<&actix_web::cookie::Cookie<'static>>) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<actix_http::Request, Response = TestApp, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body_json(res).await;
    (status, body)
}

async fn post_json<S>(
    app: &S,
    uri: &str,
    cookie: &actix_web::cookie::Cookie<'static>,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<actix_http::Request, Response = TestApp, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::post().uri(uri).cookie(cookie.clone());
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body_json(res).await;
    (status, body)
}

/// Invite, accept, resolve, unmerge, resolve again: the full round trip.
#[actix_web::test]
async fn merge_round_trip_restores_both_identities() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", Some("Alva"));
    let noor = store.seed_account("noor", Some("Noor"));
    store.set_stats(&alva.id, ContentStats { entry_count: 3, media_count: 4 });
    store.set_stats(&noor.id, ContentStats { entry_count: 2, media_count: 1 });

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    // Alva invites Noor.
    let (status, body) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor", "message": "travel together?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let invitation_id = body["invitationId"].as_str().expect("invitation id").to_owned();

    // Alva's status shows the pending proposal and blocks further sends.
    let (_, status_body) = get_json(&app, "/merge/status", Some(&alva_cookie)).await;
    assert_eq!(status_body["sentInvitations"].as_array().map(Vec::len), Some(1));
    assert_eq!(status_body["canSendInvitation"], false);

    // Noor accepts.
    let (status, accept_body) = post_json(
        &app,
        &format!("/merge/accept/{invitation_id}"),
        &noor_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accept_body["mergeSlug"], "alva-noor-travels");
    assert_eq!(accept_body["publicUrl"], "/u/alva-noor-travels");

    // The slug resolves to the merged profile with aggregate stats.
    let (status, profile) =
        get_json(&app, "/merge/public-profile/alva-noor-travels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["type"], "merged");
    assert_eq!(profile["displayName"], "Alva & Noor");
    assert_eq!(profile["members"].as_array().map(Vec::len), Some(2));
    assert_eq!(profile["stats"]["entryCount"], 5);
    assert_eq!(profile["stats"]["mediaCount"], 5);

    // A merged username is never terminal.
    let (_, redirected) = get_json(&app, "/merge/public-profile/alva", None).await;
    assert_eq!(redirected["type"], "redirect_to_merge");
    assert_eq!(redirected["slug"], "alva-noor-travels");

    // Alva unmerges with a reason.
    let (status, unmerge_body) = post_json(
        &app,
        "/merge/unmerge",
        &alva_cookie,
        Some(json!({ "reason": "test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unmerge_body["mergeDuration"], 0);

    // Both accounts are fully restored.
    for account in [&alva, &noor] {
        let stored = store.account(&account.id);
        assert_eq!(stored.public_username, account.public_username);
        assert!(!stored.is_merged);
        assert!(stored.merge_id.is_none());
        assert!(stored.original_public_username.is_none());
    }

    // The sticky slug now routes the choice page; usernames resolve
    // individually again.
    let (status, choice) =
        get_json(&app, "/merge/public-profile/alva-noor-travels", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(choice["type"], "unmerged_choice");
    assert_eq!(choice["cards"].as_array().map(Vec::len), Some(2));

    let (_, individual) = get_json(&app, "/merge/public-profile/alva", None).await;
    assert_eq!(individual["type"], "individual");
    assert_eq!(individual["publicUsername"], "alva");

    // History holds both transitions in canonical order.
    let (_, history) = get_json(&app, "/merge/history", Some(&alva_cookie)).await;
    let entries = history["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["event"], "merged");
    assert_eq!(entries[1]["event"], "unmerged");
    assert_eq!(entries[1]["durationDays"], 0);
    assert_eq!(entries[1]["reason"], "test");
    for entry in entries {
        let a = entry["accountAId"].as_str().expect("account a");
        let b = entry["accountBId"].as_str().expect("account b");
        assert!(a <= b, "participants must be canonically ordered");
    }
}

#[actix_web::test]
async fn cooling_period_blocks_until_the_boundary() {
    let store = InMemoryStore::new();
    store.with_state(|state| state.cooling_period_days = 30);
    let alva = store.seed_account("alva", Some("Alva"));
    let noor = store.seed_account("noor", Some("Noor"));

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("invitation id").to_owned();
    post_json(&app, &format!("/merge/accept/{invitation_id}"), &noor_cookie, None).await;

    let merge_id = store.merge_id_of(&alva.id).expect("merge formed");

    // 29 elapsed days: one remaining.
    store.age_merge_by_days(merge_id, 29);
    let (status, body) = post_json(&app, "/merge/unmerge", &alva_cookie, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["code"], "cooling_period");
    assert_eq!(body["details"]["remainingDays"], 1);

    // Exactly at the boundary the unmerge goes through.
    store.age_merge_by_days(merge_id, 1);
    let (status, body) = post_json(&app, "/merge/unmerge", &alva_cookie, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mergeDuration"], 30);
}

#[actix_web::test]
async fn expired_invitations_cancel_lazily_on_accept() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", None);
    let noor = store.seed_account("noor", None);

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("invitation id").to_owned();
    let invitation_uuid = invitation_id.parse().expect("uuid");
    store.expire_invitation(invitation_uuid);

    let (status, body) = post_json(
        &app,
        &format!("/merge/accept/{invitation_id}"),
        &noor_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["details"]["code"], "invitation_expired");

    // The discovery cancelled the row, so both parties are free again.
    let cancelled = store.with_state(|state| {
        state.invitations[&invitation_uuid].status
    });
    assert_eq!(cancelled, backend::domain::InvitationStatus::Cancelled);

    let (status, _) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn dissolved_slugs_are_never_reissued() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", Some("Alva"));
    let noor = store.seed_account("noor", Some("Noor"));

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    // First merge takes the base slug.
    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let first_id = invite["invitationId"].as_str().expect("id").to_owned();
    let (_, accepted) =
        post_json(&app, &format!("/merge/accept/{first_id}"), &noor_cookie, None).await;
    assert_eq!(accepted["mergeSlug"], "alva-noor-travels");

    post_json(&app, "/merge/unmerge", &alva_cookie, None).await;

    // The same pair re-merges; the residual redirect keeps the base taken.
    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let second_id = invite["invitationId"].as_str().expect("id").to_owned();
    let (_, accepted) =
        post_json(&app, &format!("/merge/accept/{second_id}"), &noor_cookie, None).await;
    assert_eq!(accepted["mergeSlug"], "alva-noor-travels-2");

    // The old slug still routes its choice page, the new one the live merge.
    let (_, old_slug) = get_json(&app, "/merge/public-profile/alva-noor-travels", None).await;
    assert_eq!(old_slug["type"], "unmerged_choice");
    let (_, new_slug) =
        get_json(&app, "/merge/public-profile/alva-noor-travels-2", None).await;
    assert_eq!(new_slug["type"], "merged");
}

#[actix_web::test]
async fn eligibility_is_enforced_for_both_parties() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", None);
    let noor = store.seed_account("noor", None);
    let mika = store.seed_account("mika", None);

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let mika_cookie = login(&app, &mika).await;

    let (status, _) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Mika cannot invite Noor while Noor holds a pending invitation, and
    // the check also covers the sender's own pending proposals.
    let (status, body) = post_json(
        &app,
        "/merge/invite",
        &mika_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "has_active_invitation");

    let (status, body) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "mika" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "has_active_invitation");
}

#[actix_web::test]
async fn merged_targets_are_rejected() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", None);
    let noor = store.seed_account("noor", None);
    let mika = store.seed_account("mika", None);

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;
    let mika_cookie = login(&app, &mika).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("id").to_owned();
    post_json(&app, &format!("/merge/accept/{invitation_id}"), &noor_cookie, None).await;

    let (status, body) = post_json(
        &app,
        "/merge/invite",
        &mika_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "already_merged");
}

#[actix_web::test]
async fn decline_and_cancel_respect_ownership() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", None);
    let noor = store.seed_account("noor", None);

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("id").to_owned();

    // The inviter cannot decline their own proposal.
    let (status, _) = post_json(
        &app,
        &format!("/merge/decline/{invitation_id}"),
        &alva_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The invited party declines; a second decline finds nothing pending.
    let (status, body) = post_json(
        &app,
        &format!("/merge/decline/{invitation_id}"),
        &noor_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = post_json(
        &app,
        &format!("/merge/decline/{invitation_id}"),
        &noor_cookie,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn display_settings_round_trip_over_http() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", None);
    let noor = store.seed_account("noor", None);

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("id").to_owned();
    post_json(&app, &format!("/merge/accept/{invitation_id}"), &noor_cookie, None).await;

    let (status, defaults) = get_json(&app, "/merge/display-settings", Some(&alva_cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["bioDisplay"], "combine");
    assert_eq!(defaults["avatarDisplay"], "user1");

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/merge/display-settings")
            .cookie(alva_cookie.clone())
            .set_json(json!({
                "avatarDisplay": "user2",
                "heroImageDisplay": "user2",
                "bioDisplay": "user2",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, updated) = get_json(&app, "/merge/display-settings", Some(&noor_cookie)).await;
    assert_eq!(updated["bioDisplay"], "user2");
    assert_eq!(updated["heroImageDisplay"], "user2");
}

#[actix_web::test]
async fn bot_surface_serves_preview_markup_end_to_end() {
    let store = InMemoryStore::new();
    let alva = store.seed_account("alva", Some("Alva"));
    let noor = store.seed_account("noor", Some("Noor"));

    let app = scenario_app!(&store);
    let alva_cookie = login(&app, &alva).await;
    let noor_cookie = login(&app, &noor).await;

    let (_, invite) = post_json(
        &app,
        "/merge/invite",
        &alva_cookie,
        Some(json!({ "invitedUser": "noor" })),
    )
    .await;
    let invitation_id = invite["invitationId"].as_str().expect("id").to_owned();
    post_json(&app, &format!("/merge/accept/{invitation_id}"), &noor_cookie, None).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/u/alva-noor-travels")
            .insert_header((header::USER_AGENT, BOT_UA))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");
    assert!(body.contains("og:title"));
    assert!(body.contains("Alva &amp; Noor"));

    // A merged member's own key answers with an HTTP redirect.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/u/alva")
            .insert_header((header::USER_AGENT, BOT_UA))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/u/alva-noor-travels")
    );
}
