use async_trait::async_trait;

use crate::{
    application::repos::{ArticlesRepo, ArticlesWriteRepo, RepoError},
    domain::entities::{ArticleRecord, NewArticle},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i32,
    slug: String,
    title: String,
    content: String,
    description: String,
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            description: row.description,
        }
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn list_articles(&self) -> Result<Vec<ArticleRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, slug, title, content, description
            FROM articles
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ArticleRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, slug, title, content, description
            FROM articles
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }

    async fn count_articles(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let mut inserted = 0;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO articles (slug, title, content, description)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&article.slug)
            .bind(&article.title)
            .bind(&article.content)
            .bind(&article.description)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(inserted)
    }
}
