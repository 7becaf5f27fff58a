//! Cache key derivation.
//!
//! Keys depend on the route identity only. Titles, meta tags and props change
//! what is rendered, never where it is stored.

use std::fmt;

use crate::domain::pages::{PageRequest, PageRoute};

const INDEX_KEY: &str = "index.html";
const ARTICLES_PREFIX: &str = "articles/";
const HTML_SUFFIX: &str = ".html";

/// Object key of a cached artifact within the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_route(route: &PageRoute) -> Self {
        match route {
            PageRoute::Index => Self(INDEX_KEY.to_string()),
            PageRoute::Article { slug } => Self(format!("{ARTICLES_PREFIX}{slug}{HTML_SUFFIX}")),
        }
    }

    pub fn for_request(request: &PageRequest) -> Self {
        Self::for_route(request.route())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
