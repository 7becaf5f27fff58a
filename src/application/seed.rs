//! Article import from a JSON file.
//!
//! The file holds an array of `{id?, slug, title, content, description}`
//! objects. Ids are ignored; the database assigns them in file order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::application::repos::{ArticlesRepo, ArticlesWriteRepo, RepoError};
use crate::domain::entities::NewArticle;

const SOURCE: &str = "application::seed";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file `{}` is not a valid article list", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("seed file `{}` is invalid: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table already had rows; nothing was read.
    AlreadyPopulated { existing: u64 },
    Imported { inserted: u64 },
}

/// Parse and validate a seed document. `path` only labels errors.
pub fn parse_articles(path: &Path, json: &str) -> Result<Vec<NewArticle>, SeedError> {
    let articles: Vec<NewArticle> =
        serde_json::from_str(json).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(path, &articles)?;
    Ok(articles)
}

fn validate(path: &Path, articles: &[NewArticle]) -> Result<(), SeedError> {
    let invalid = |message: String| SeedError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    let mut seen = HashSet::new();
    for (index, article) in articles.iter().enumerate() {
        if article.slug.trim().is_empty() {
            return Err(invalid(format!("entry {index} has an empty slug")));
        }
        if article.slug.contains('/') || article.slug.chars().any(char::is_whitespace) {
            return Err(invalid(format!(
                "entry {index} has slug `{}` with `/` or whitespace",
                article.slug
            )));
        }
        if !seen.insert(article.slug.as_str()) {
            return Err(invalid(format!("slug `{}` appears twice", article.slug)));
        }
    }

    Ok(())
}

pub async fn read_seed_file(path: &Path) -> Result<Vec<NewArticle>, SeedError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_articles(path, &json)
}

/// Insert every article from `path`.
pub async fn import_file(writer: &dyn ArticlesWriteRepo, path: &Path) -> Result<u64, SeedError> {
    let articles = read_seed_file(path).await?;
    let inserted = writer.insert_articles(&articles).await?;
    info!(
        target = SOURCE,
        path = %path.display(),
        inserted,
        "imported articles"
    );
    Ok(inserted)
}

/// Import from `path` only when the articles table is empty.
pub async fn seed_if_empty(
    reader: &dyn ArticlesRepo,
    writer: &dyn ArticlesWriteRepo,
    path: &Path,
) -> Result<SeedOutcome, SeedError> {
    let existing = reader.count_articles().await?;
    if existing > 0 {
        return Ok(SeedOutcome::AlreadyPopulated { existing });
    }

    let inserted = import_file(writer, path).await?;
    Ok(SeedOutcome::Imported { inserted })
}
