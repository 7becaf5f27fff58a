use std::sync::Arc;

use axum::http::StatusCode;
use tracing::debug;

use crate::application::error::HttpError;
use crate::application::repos::{ArticlesRepo, RepoError};
use crate::cache::{RenderCacheGateway, ServedPage};
use crate::config::SiteSettings;
use crate::domain::pages::PageRequest;

const SOURCE: &str = "application::pages::PageService";

/// Resolves articles, builds page requests and serves them through the
/// render cache.
#[derive(Clone)]
pub struct PageService {
    articles: Arc<dyn ArticlesRepo>,
    gateway: RenderCacheGateway,
    site: SiteSettings,
}

impl PageService {
    pub fn new(
        articles: Arc<dyn ArticlesRepo>,
        gateway: RenderCacheGateway,
        site: SiteSettings,
    ) -> Self {
        Self {
            articles,
            gateway,
            site,
        }
    }

    pub async fn index_page(&self) -> Result<ServedPage, HttpError> {
        let articles = self
            .articles
            .list_articles()
            .await
            .map_err(|err| repo_failure("list_articles", err))?;

        let request = PageRequest::index(
            self.site.title.clone(),
            self.site.description.clone(),
            articles,
        );
        Ok(self.gateway.serve(&request).await?)
    }

    /// `Ok(None)` when no article has this slug; the store is not touched.
    pub async fn article_page(&self, slug: &str) -> Result<Option<ServedPage>, HttpError> {
        let article = self
            .articles
            .find_by_slug(slug)
            .await
            .map_err(|err| repo_failure("find_by_slug", err))?;

        let Some(article) = article else {
            debug!(target = SOURCE, slug, "article not found");
            return Ok(None);
        };

        let request = PageRequest::article(article);
        Ok(Some(self.gateway.serve(&request).await?))
    }
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load articles",
        format!("{operation} failed: {err}"),
    )
}
