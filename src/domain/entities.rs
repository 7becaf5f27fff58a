//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i32,
    pub slug: String,
    pub title: String,
    /// Pre-rendered HTML body.
    pub content: String,
    #[serde(default)]
    pub description: String,
}

/// Article fields accepted for insertion; the id is assigned by the database
/// and ignored when present in seed input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewArticle {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
}
