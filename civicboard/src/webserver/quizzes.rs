//! Handlers for the Wahlkompass quizzes, including the scoring submission.

use std::collections::HashMap;

use axum::extract::Path;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::application::Application;
use crate::quiz::{self, scoring};

use super::identity::CallerIdentity;
use super::types::{json, ApiResponse, Error, Result};

impl ApiResponse for Vec<quiz::Quiz> {}
impl ApiResponse for quiz::QuizWithQuestions {}
impl ApiResponse for quiz::QuizResult {}

pub async fn list_quizzes(Extension(app): Extension<Application>) -> Result<impl IntoResponse> {
    let quizzes = quiz::list_quizzes(&app.sql).await?;
    Ok(json(quizzes))
}

pub async fn get_quiz(
    Extension(app): Extension<Application>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse> {
    match quiz::load_quiz(&app.sql, quiz_id).await? {
        Some(quiz) => Ok(json(quiz)),
        None => Err(Error::not_found("Quiz nicht gefunden")),
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SubmitQuizRequest {
    answers: HashMap<String, i64>,
}

pub async fn submit_quiz(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
    Path(quiz_id): Path<i64>,
    Json(SubmitQuizRequest { answers }): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse> {
    let quiz = match quiz::load_quiz(&app.sql, quiz_id).await? {
        Some(quiz) => quiz,
        None => return Err(Error::not_found("Quiz nicht gefunden")),
    };
    let outcome = scoring::score(&quiz, &answers, app.config.scoring_policy);
    let result = quiz::save_quiz_result(&app.sql, &user_id, quiz_id, &outcome).await?;
    Ok(json(result))
}
