//! Handlers for the Meinungscheck polls.

use axum::extract::Path;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::application::Application;
use crate::polls;

use super::identity::CallerIdentity;
use super::types::{json, ApiResponse, Error, Result};

impl ApiResponse for Vec<polls::PollWithDetails> {}

#[derive(serde::Serialize)]
pub struct VoteResponse {
    success: bool,
}

impl ApiResponse for VoteResponse {}

pub async fn list_polls(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
) -> Result<impl IntoResponse> {
    let polls = polls::list_polls(&app.sql, &user_id).await?;
    Ok(json(polls))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    option_id: i64,
}

pub async fn vote_poll(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
    Path(poll_id): Path<i64>,
    Json(VoteRequest { option_id }): Json<VoteRequest>,
) -> Result<impl IntoResponse> {
    if polls::get_poll(&app.sql, poll_id).await?.is_none() {
        return Err(Error::not_found("Umfrage nicht gefunden"));
    }
    if polls::has_voted(&app.sql, poll_id, &user_id).await? {
        return Err(Error::user("Bereits abgestimmt"));
    }
    polls::record_vote(&app.sql, poll_id, option_id, &user_id).await?;
    Ok(json(VoteResponse { success: true }))
}
