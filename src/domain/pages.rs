//! Logical page descriptors handed to the render cache gateway.
//!
//! A [`PageRequest`] bundles everything the renderer needs (template, title,
//! meta tags, typed props) together with the [`PageRoute`] that addresses the
//! cached artifact. The route is fixed by the constructor that built the
//! request, so props and addressing can never disagree.

use serde::Serialize;

use super::entities::ArticleRecord;

/// Route identity of a logical page, independent of the data rendered into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRoute {
    Index,
    Article { slug: String },
}

/// Template identifiers understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageTemplate {
    Home,
    Article,
}

impl PageTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            PageTemplate::Home => "pages/home",
            PageTemplate::Article => "pages/article",
        }
    }
}

/// Typed props for each page kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageProps {
    Index { articles: Vec<ArticleRecord> },
    Article { article: ArticleRecord },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// Meta tags in insertion order. Re-inserting a name replaces its content in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetaTags(Vec<MetaTag>);

impl MetaTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.0.iter_mut().find(|tag| tag.name == name) {
            Some(existing) => existing.content = content,
            None => self.0.push(MetaTag { name, content }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaTag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable description of a page to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    route: PageRoute,
    template: PageTemplate,
    title: String,
    meta_tags: MetaTags,
    props: PageProps,
}

impl PageRequest {
    /// Home page listing every article.
    pub fn index(
        title: impl Into<String>,
        description: impl Into<String>,
        articles: Vec<ArticleRecord>,
    ) -> Self {
        let title = title.into();
        let meta_tags = MetaTags::new()
            .with("og:title", title.clone())
            .with("description", description);

        Self {
            route: PageRoute::Index,
            template: PageTemplate::Home,
            title,
            meta_tags,
            props: PageProps::Index { articles },
        }
    }

    /// Detail page for a single article, addressed by its slug.
    pub fn article(article: ArticleRecord) -> Self {
        let meta_tags = MetaTags::new()
            .with("og:title", article.title.clone())
            .with("description", article.description.clone());

        Self {
            route: PageRoute::Article {
                slug: article.slug.clone(),
            },
            template: PageTemplate::Article,
            title: article.title.clone(),
            meta_tags,
            props: PageProps::Article { article },
        }
    }

    pub fn route(&self) -> &PageRoute {
        &self.route
    }

    pub fn template(&self) -> PageTemplate {
        self.template
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn meta_tags(&self) -> &MetaTags {
        &self.meta_tags
    }

    pub fn props(&self) -> &PageProps {
        &self.props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(slug: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            id: 1,
            slug: slug.to_string(),
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            description: format!("about {title}"),
        }
    }

    #[test]
    fn article_request_carries_article_metadata() {
        let request = PageRequest::article(article("hello-world", "Hello"));

        assert_eq!(
            request.route(),
            &PageRoute::Article {
                slug: "hello-world".to_string()
            }
        );
        assert_eq!(request.template(), PageTemplate::Article);
        assert_eq!(request.title(), "Hello");
        assert_eq!(request.meta_tags().get("og:title"), Some("Hello"));
        assert_eq!(request.meta_tags().get("description"), Some("about Hello"));
    }

    #[test]
    fn index_request_uses_home_template() {
        let request = PageRequest::index("Blog", "Home page", Vec::new());

        assert_eq!(request.route(), &PageRoute::Index);
        assert_eq!(request.template(), PageTemplate::Home);
        assert!(matches!(request.props(), PageProps::Index { articles } if articles.is_empty()));
    }

    #[test]
    fn meta_tags_keep_insertion_order_and_replace_in_place() {
        let mut tags = MetaTags::new().with("og:title", "a").with("description", "b");
        tags.insert("og:title", "c");

        let names: Vec<_> = tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, ["og:title", "description"]);
        assert_eq!(tags.get("og:title"), Some("c"));
        assert_eq!(tags.len(), 2);
    }
}
