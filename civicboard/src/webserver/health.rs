use axum::response::IntoResponse;
use axum::Extension;

use crate::application::Application;

use super::types::{json, ApiResponse, Result};

#[derive(serde::Serialize)]
pub struct HealthCheckResponse {
    done: bool,
}

impl ApiResponse for HealthCheckResponse {}

pub async fn health(Extension(app): Extension<Application>) -> Result<impl IntoResponse> {
    // a cheap query proves the database connection is alive
    sqlx::query("SELECT 1").execute(app.sql.as_ref()).await?;
    Ok(json(HealthCheckResponse { done: true }))
}
