//! Aktuelle Themen: news articles, read-only for the client.

use chrono::NaiveDateTime;

use crate::db::SqlDb;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub article_type: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

pub async fn list_articles(sql: &SqlDb) -> Result<Vec<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>("SELECT * FROM articles ORDER BY created_at DESC, id DESC")
        .fetch_all(sql.as_ref())
        .await
}

#[cfg(test)]
mod tests {
    use crate::db::init_test_db;
    use crate::seed::seed_database;

    use super::list_articles;

    #[tokio::test]
    async fn seeded_articles_are_listed() {
        let sql = init_test_db().await;
        seed_database(&sql).await.expect("seeding should work");
        let articles = list_articles(&sql).await.expect("query should work");
        assert!(!articles.is_empty());
        assert!(articles
            .iter()
            .all(|article| article.article_type == "news"));
    }
}
