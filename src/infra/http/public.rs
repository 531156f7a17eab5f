use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    application::{
        chrome::ChromeService,
        content::{ContentError, ContentService},
        error::{ErrorReport, HttpError},
        page::page_context,
        submission::SubmissionService,
    },
    presentation::views::{
        LayoutContext, PageTemplate, render_not_found_response, render_template_response,
    },
};

use super::{
    forms,
    middleware::{log_responses, set_request_context},
    relay,
};

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<ContentService>,
    pub chrome: Arc<ChromeService>,
    pub submissions: Arc<SubmissionService>,
    pub default_page: String,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/_health", get(health))
        .route("/favicon.ico", get(crate::infra::assets::favicon))
        .route(
            "/static/public/{*path}",
            get(crate::infra::assets::serve_public),
        )
        .route("/api/relay", post(relay::submit))
        .route("/pages/{key}/contact", post(forms::submit_contact))
        .route("/pages/{key}/order", post(forms::submit_order))
        .fallback(page_fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    sent: Option<String>,
}

async fn index(State(state): State<HttpState>, Query(query): Query<PageQuery>) -> Response {
    let key = state.default_page.clone();
    render_page(&state, &key, "/", query.sent.is_some()).await
}

/// Every unrouted path is resolved as a page key, tolerating trailing slashes.
async fn page_fallback(State(state): State<HttpState>, request: Request<Body>) -> Response {
    let raw_path = request.uri().path().trim_matches('/');
    let slug = raw_path.trim_end_matches('/');
    let sent = query_has_sent(request.uri().query());

    render_page(&state, slug, request.uri().path(), sent).await
}

async fn render_page(state: &HttpState, key: &str, path: &str, sent: bool) -> Response {
    let bundle = match state.content.load().await {
        Ok(bundle) => bundle,
        Err(err) => return content_error_response(err),
    };

    let chrome = state.chrome.build(&bundle.pages, Some(key));
    match page_context(key, &bundle) {
        Some(mut content) => {
            content.sent = sent;
            let canonical = canonical_url(&chrome.meta.canonical, path);
            let meta = chrome
                .meta
                .clone()
                .with_content(content.hero.title.clone(), content.hero.lead.clone())
                .with_canonical(canonical);
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(PageTemplate { view }, StatusCode::OK)
        }
        None => render_not_found_response(chrome),
    }
}

pub(super) fn content_error_response(err: ContentError) -> Response {
    const SOURCE: &str = "infra::http::public::content_error_response";

    let status = match &err {
        ContentError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    HttpError::from_error(SOURCE, status, "Content temporarily unavailable", &err).into_response()
}

async fn health(State(state): State<HttpState>) -> Response {
    match state.content.load().await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::public::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

fn query_has_sent(query: Option<&str>) -> bool {
    query.is_some_and(|query| query.split('&').any(|pair| pair.starts_with("sent=")))
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let root = normalize_public_site_url(base);
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_url_joins_base_and_path() {
        assert_eq!(
            canonical_url("https://shop.example", "/shop"),
            "https://shop.example/shop"
        );
        assert_eq!(
            canonical_url("https://shop.example/", "/"),
            "https://shop.example/"
        );
    }

    #[test]
    fn sent_query_detection() {
        assert!(query_has_sent(Some("sent=1")));
        assert!(query_has_sent(Some("a=b&sent=1")));
        assert!(!query_has_sent(Some("a=b")));
        assert!(!query_has_sent(None));
    }
}
