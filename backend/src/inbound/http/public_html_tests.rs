//! Behaviour coverage for the bot-facing HTML surface.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{App, test, web};
use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockPublicProfileQuery, PublicProfileQuery};
use crate::domain::{AccountId, Error, ProfileCard};
use crate::inbound::http::requester::UserAgentClassifier;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::test_utils::fixture_ports;

const BOT_UA: &str = "Mozilla/5.0 (compatible; Googlebot/2.1)";
const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

fn merged_view() -> MergedProfileView {
    MergedProfileView {
        slug: "alva-noor-travels".to_owned(),
        display_name: "Alva & Noor".to_owned(),
        bio: Some("Two journals, one map.".to_owned()),
        avatar_url: None,
        hero_image_url: Some("https://img.example.net/pair.jpg".to_owned()),
        members: Vec::new(),
        stats: ContentStats {
            entry_count: 12,
            media_count: 34,
        },
        display: crate::domain::ProfileDisplaySettings::default(),
        merged_at: Utc::now(),
    }
}

fn individual_view() -> IndividualProfileView {
    IndividualProfileView {
        account_id: AccountId::random(),
        public_username: "alva".to_owned(),
        display_name: "Alva".to_owned(),
        bio: None,
        avatar_url: None,
        hero_image_url: None,
        stats: ContentStats::default(),
    }
}

fn state_with(profiles: Arc<dyn PublicProfileQuery>) -> web::Data<HttpState> {
    let ports = HttpStatePorts {
        public_profiles: profiles,
        classifier: Arc::new(UserAgentClassifier),
        ..fixture_ports()
    };
    web::Data::new(HttpState::new(ports))
}

async fn request_page(
    state: web::Data<HttpState>,
    user_agent: &str,
) -> actix_web::dev::ServiceResponse {
    let app =
        test::init_service(App::new().app_data(state).service(public_identity_page)).await;
    test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/u/alva-noor-travels")
            .insert_header((header::USER_AGENT, user_agent))
            .to_request(),
    )
    .await
}

#[rstest]
#[actix_web::test]
async fn bots_receive_static_preview_markup() {
    let mut profiles = MockPublicProfileQuery::new();
    profiles
        .expect_resolve()
        .returning(|_| Ok(ResolvedProfile::Merged(merged_view())));

    let res = request_page(state_with(Arc::new(profiles)), BOT_UA).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");
    assert!(body.contains("og:title"));
    assert!(body.contains("Alva &amp; Noor"));
    assert!(body.contains("og:image"));
    assert!(body.contains("<link rel=\"canonical\" href=\"/u/alva-noor-travels\">"));
    assert!(
        !body.contains("http-equiv=\"refresh\""),
        "agents must not be asked to follow client-side redirects"
    );
}

#[rstest]
#[actix_web::test]
async fn humans_receive_a_forwarding_document() {
    let mut profiles = MockPublicProfileQuery::new();
    profiles
        .expect_resolve()
        .returning(|_| Ok(ResolvedProfile::Individual(individual_view())));

    let res = request_page(state_with(Arc::new(profiles)), BROWSER_UA).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");
    assert!(body.contains("http-equiv=\"refresh\""));
    assert!(body.contains("/app/u/alva"));
}

#[rstest]
#[case(BOT_UA)]
#[case(BROWSER_UA)]
#[actix_web::test]
async fn merged_usernames_answer_with_an_http_redirect(#[case] user_agent: &str) {
    let mut profiles = MockPublicProfileQuery::new();
    profiles.expect_resolve().returning(|_| {
        Ok(ResolvedProfile::RedirectToMerge {
            slug: "alva-noor-travels".to_owned(),
        })
    });

    let res = request_page(state_with(Arc::new(profiles)), user_agent).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/u/alva-noor-travels")
    );
}

#[rstest]
#[actix_web::test]
async fn choice_pages_render_disabled_cards_without_links() {
    let mut profiles = MockPublicProfileQuery::new();
    profiles.expect_resolve().returning(|_| {
        Ok(ResolvedProfile::UnmergedChoice(ChoicePageView {
            slug: "alva-noor-travels".to_owned(),
            cards: vec![
                ProfileCard {
                    account_id: AccountId::random(),
                    public_username: "alva".to_owned(),
                    display_name: "Alva".to_owned(),
                    avatar_url: None,
                    available: true,
                },
                ProfileCard {
                    account_id: AccountId::random(),
                    public_username: "noor".to_owned(),
                    display_name: "Noor".to_owned(),
                    avatar_url: None,
                    available: false,
                },
            ],
        }))
    });

    let res = request_page(state_with(Arc::new(profiles)), BOT_UA).await;
    let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");

    assert!(body.contains("<a href=\"/u/alva\">Alva</a>"));
    assert!(body.contains("<li>Noor</li>"));
    assert!(!body.contains("<a href=\"/u/noor\">"));
}

#[rstest]
#[actix_web::test]
async fn unknown_keys_render_a_404_page() {
    let mut profiles = MockPublicProfileQuery::new();
    profiles
        .expect_resolve()
        .returning(|_| Err(Error::not_found("no public profile matches")));

    let res = request_page(state_with(Arc::new(profiles)), BROWSER_UA).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body");
    assert!(body.contains("No traveller"));
}
