use axum::response::IntoResponse;

use llm_prompts::personas::{debate_personas, DebatePersona};

use super::types::{json, ApiResponse, Result};

impl ApiResponse for Vec<DebatePersona> {}

pub async fn list_personas() -> Result<impl IntoResponse> {
    Ok(json(debate_personas()))
}
