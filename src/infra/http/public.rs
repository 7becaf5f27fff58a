use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, header::CONTENT_TYPE},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::pages::PageService;
use crate::application::repos::DatabaseHealth;
use crate::cache::ServedPage;
use crate::presentation::views::render_not_found_response;

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

/// Content type of every page response, regardless of what the store recorded.
pub const HTML_RESPONSE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Clone)]
pub struct HttpState {
    pub pages: Arc<PageService>,
    pub db: Arc<dyn DatabaseHealth>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/articles/{slug}", get(article_detail))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.pages.index_page().await {
        Ok(page) => html_response(page),
        Err(err) => err.into_response(),
    }
}

async fn article_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.pages.article_page(&slug).await {
        Ok(Some(page)) => html_response(page),
        Ok(None) => render_not_found_response(&slug),
        Err(err) => err.into_response(),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.ping().await)
}

fn html_response(page: ServedPage) -> Response {
    let mut response = page.bytes.into_response();
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(HTML_RESPONSE_CONTENT_TYPE),
    );
    response
}
