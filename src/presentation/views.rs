use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::render::{PageRenderer, RenderError};
use crate::domain::entities::ArticleRecord;
use crate::domain::pages::{MetaTags, PageProps, PageRequest};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Uncached 404 page for unknown article slugs.
pub fn render_not_found_response(slug: &str) -> Response {
    let view = LayoutContext {
        title: "Статья не найдена".to_string(),
        meta_tags: Vec::new(),
        content: ErrorPageView::not_found(),
    };
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        format!("article `{slug}` not found"),
    )
    .attach(&mut response);
    response
}

pub struct MetaTagView {
    /// `property` for Open Graph tags, `name` otherwise.
    pub attribute: &'static str,
    pub name: String,
    pub content: String,
}

fn meta_tag_views(tags: &MetaTags) -> Vec<MetaTagView> {
    tags.iter()
        .map(|tag| MetaTagView {
            attribute: if tag.name.starts_with("og:") {
                "property"
            } else {
                "name"
            },
            name: tag.name.clone(),
            content: tag.content.clone(),
        })
        .collect()
}

pub struct LayoutContext<T> {
    pub title: String,
    pub meta_tags: Vec<MetaTagView>,
    pub content: T,
}

impl<T> LayoutContext<T> {
    fn for_request(request: &PageRequest, content: T) -> Self {
        Self {
            title: request.title().to_string(),
            meta_tags: meta_tag_views(request.meta_tags()),
            content,
        }
    }
}

pub struct ArticlePreview {
    pub href: String,
    pub title: String,
    pub description: String,
}

impl From<&ArticleRecord> for ArticlePreview {
    fn from(article: &ArticleRecord) -> Self {
        Self {
            href: format!("/articles/{}", article.slug),
            title: article.title.clone(),
            description: article.description.clone(),
        }
    }
}

pub struct HomeView {
    pub articles: Vec<ArticlePreview>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct ArticleView {
    pub title: String,
    /// Trusted, pre-rendered HTML; emitted without escaping.
    pub content_html: String,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Статья не найдена".to_string(),
            message: "Такой статьи нет. Вернитесь на главную страницу.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// Askama-backed [`PageRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRenderer for TemplateRenderer {
    fn render(&self, request: &PageRequest) -> Result<Bytes, RenderError> {
        let template = request.template().as_str();

        let html = match request.props() {
            PageProps::Index { articles } => HomeTemplate {
                view: LayoutContext::for_request(
                    request,
                    HomeView {
                        articles: articles.iter().map(ArticlePreview::from).collect(),
                    },
                ),
            }
            .render(),
            PageProps::Article { article } => ArticleTemplate {
                view: LayoutContext::for_request(
                    request,
                    ArticleView {
                        title: article.title.clone(),
                        content_html: article.content.clone(),
                    },
                ),
            }
            .render(),
        }
        .map_err(|err| RenderError::new(template, err))?;

        Ok(Bytes::from(html))
    }
}
