//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ArticleRecord, NewArticle};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    /// All articles in insertion order (ascending id).
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError>;

    async fn count_articles(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    /// Insert all articles in one transaction; returns how many rows were written.
    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
