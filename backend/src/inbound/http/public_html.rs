//! Bot-facing HTML surface for public identities.
//!
//! `GET /u/{key}` serves two representations of the same resource:
//! automated agents receive pre-rendered static markup carrying preview
//! metadata for the resolved case, while human visitors receive a document
//! that immediately forwards to the interactive application at the
//! canonical URL. Agents are never asked to execute client-side redirects;
//! a currently-merged username answers with a real HTTP redirect instead.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, web};

use crate::domain::ports::{RequestSignals, RequesterClass, ResolveProfileRequest};
use crate::domain::{
    ChoicePageView, ContentStats, ErrorCode, IndividualProfileView, MergedProfileView,
    ResolvedProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const SITE_NAME: &str = "Wayfarer Journal";

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

struct PreviewMeta {
    title: String,
    description: String,
    image: Option<String>,
    canonical_path: String,
}

fn stats_sentence(stats: &ContentStats) -> String {
    format!(
        "{} public entries and {} photos and videos.",
        stats.entry_count, stats.media_count
    )
}

fn merged_meta(view: &MergedProfileView) -> PreviewMeta {
    let description = view
        .bio
        .clone()
        .unwrap_or_else(|| format!("Travelling together. {}", stats_sentence(&view.stats)));
    PreviewMeta {
        title: format!("{} | {SITE_NAME}", view.display_name),
        description,
        image: view.hero_image_url.clone().or_else(|| view.avatar_url.clone()),
        canonical_path: format!("/u/{}", view.slug),
    }
}

fn choice_meta(view: &ChoicePageView) -> PreviewMeta {
    let names: Vec<String> = view
        .cards
        .iter()
        .map(|card| card.display_name.clone())
        .collect();
    PreviewMeta {
        title: format!("{} | {SITE_NAME}", names.join(" & ")),
        description: format!(
            "{} now travel separately. Pick a journal to follow.",
            names.join(" and ")
        ),
        image: view.cards.iter().find_map(|card| card.avatar_url.clone()),
        canonical_path: format!("/u/{}", view.slug),
    }
}

fn individual_meta(view: &IndividualProfileView) -> PreviewMeta {
    let description = view
        .bio
        .clone()
        .unwrap_or_else(|| stats_sentence(&view.stats));
    PreviewMeta {
        title: format!("{} | {SITE_NAME}", view.display_name),
        description,
        image: view.hero_image_url.clone().or_else(|| view.avatar_url.clone()),
        canonical_path: format!("/u/{}", view.public_username),
    }
}

fn render_preview(meta: &PreviewMeta, body: String) -> String {
    let title = escape_html(&meta.title);
    let description = escape_html(&meta.description);
    let canonical = escape_html(&meta.canonical_path);
    let image_tag = meta.image.as_deref().map_or_else(String::new, |image| {
        format!(
            "<meta property=\"og:image\" content=\"{}\">\n",
            escape_html(image)
        )
    });

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n\
<meta name=\"description\" content=\"{description}\">\n\
<meta property=\"og:type\" content=\"profile\">\n\
<meta property=\"og:site_name\" content=\"{SITE_NAME}\">\n\
<meta property=\"og:title\" content=\"{title}\">\n\
<meta property=\"og:description\" content=\"{description}\">\n\
<meta property=\"og:url\" content=\"{canonical}\">\n\
{image_tag}<link rel=\"canonical\" href=\"{canonical}\">\n\
</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn merged_body(view: &MergedProfileView) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape_html(&view.display_name));
    if let Some(bio) = &view.bio {
        body.push_str(&format!("<p>{}</p>\n", escape_html(bio)));
    }
    body.push_str(&format!("<p>{}</p>", escape_html(&stats_sentence(&view.stats))));
    body
}

fn choice_body(view: &ChoicePageView) -> String {
    let mut body = String::from("<h1>This shared journal has been unwound</h1>\n<ul>\n");
    for card in &view.cards {
        let name = escape_html(&card.display_name);
        if card.available {
            body.push_str(&format!(
                "<li><a href=\"/u/{}\">{name}</a></li>\n",
                escape_html(&card.public_username)
            ));
        } else {
            body.push_str(&format!("<li>{name}</li>\n"));
        }
    }
    body.push_str("</ul>");
    body
}

fn individual_body(view: &IndividualProfileView) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape_html(&view.display_name));
    if let Some(bio) = &view.bio {
        body.push_str(&format!("<p>{}</p>\n", escape_html(bio)));
    }
    body.push_str(&format!("<p>{}</p>", escape_html(&stats_sentence(&view.stats))));
    body
}

fn render_forward(app_base: &str, key: &str, title: &str) -> String {
    let target = escape_html(&format!("{app_base}/{key}"));
    let title = escape_html(title);
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n\
<meta http-equiv=\"refresh\" content=\"0;url={target}\">\n\
<link rel=\"canonical\" href=\"{target}\">\n\
</head>\n<body>\n\
<p>Continue to <a href=\"{target}\">{title}</a>.</p>\n\
</body>\n</html>\n"
    )
}

fn html_response(markup: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup)
}

fn not_found_page(key: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>Not found | {SITE_NAME}</title></head>\
<body><h1>No traveller at /u/{}</h1></body></html>\n",
            escape_html(key)
        ))
}

/// Public identity page for crawlers and humans alike.
#[utoipa::path(
    get,
    path = "/u/{key}",
    params(("key" = String, Path, description = "Merge slug, public username, or username")),
    responses(
        (status = 200, description = "Preview markup or forwarding document"),
        (status = 302, description = "Merged username forwarded to its merge slug"),
        (status = 404, description = "Unknown key")
    ),
    tags = ["public"],
    operation_id = "publicIdentityPage",
    security(())
)]
#[get("/u/{key}")]
pub async fn public_identity_page(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = path.into_inner();

    let resolved = match state
        .public_profiles
        .resolve(ResolveProfileRequest { key: key.clone() })
        .await
    {
        Ok(resolved) => resolved,
        Err(error) if error.code() == ErrorCode::NotFound => {
            return Ok(not_found_page(&key));
        }
        Err(error) => return Err(error),
    };

    // A merged username is never terminal; a real HTTP redirect works for
    // agents and humans alike.
    if let ResolvedProfile::RedirectToMerge { slug } = &resolved {
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, format!("/u/{slug}")))
            .finish());
    }

    let signals = RequestSignals {
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned),
    };

    let markup = match (state.classifier.classify(&signals), resolved) {
        (RequesterClass::Automated, ResolvedProfile::Merged(view)) => {
            render_preview(&merged_meta(&view), merged_body(&view))
        }
        (RequesterClass::Automated, ResolvedProfile::UnmergedChoice(view)) => {
            render_preview(&choice_meta(&view), choice_body(&view))
        }
        (RequesterClass::Automated, ResolvedProfile::Individual(view)) => {
            render_preview(&individual_meta(&view), individual_body(&view))
        }
        (RequesterClass::Human, ResolvedProfile::Merged(view)) => {
            render_forward(&state.app_base, &view.slug, &view.display_name)
        }
        (RequesterClass::Human, ResolvedProfile::UnmergedChoice(view)) => {
            render_forward(&state.app_base, &view.slug, &view.slug)
        }
        (RequesterClass::Human, ResolvedProfile::Individual(view)) => {
            render_forward(&state.app_base, &view.public_username, &view.display_name)
        }
        (_, ResolvedProfile::RedirectToMerge { slug }) => {
            // Handled above; kept total for the match.
            return Ok(HttpResponse::Found()
                .insert_header((header::LOCATION, format!("/u/{slug}")))
                .finish());
        }
    };

    Ok(html_response(markup))
}

#[cfg(test)]
#[path = "public_html_tests.rs"]
mod tests;
