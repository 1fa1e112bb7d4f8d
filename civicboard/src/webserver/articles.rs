use axum::response::IntoResponse;
use axum::Extension;

use crate::application::Application;
use crate::articles;

use super::types::{json, ApiResponse, Result};

impl ApiResponse for Vec<articles::Article> {}

pub async fn list_articles(Extension(app): Extension<Application>) -> Result<impl IntoResponse> {
    let articles = articles::list_articles(&app.sql).await?;
    Ok(json(articles))
}
