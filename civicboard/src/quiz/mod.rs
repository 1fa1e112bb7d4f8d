//! Wahlkompass quizzes: entities, storage access and the party alignment
//! scoring engine.

pub mod scoring;

use chrono::NaiveDateTime;

use crate::db::SqlDb;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub party_affiliation: String,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: QuizQuestion,
    pub options: Vec<QuizOption>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizWithQuestions {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithOptions>,
}

/// One stored submission outcome. `party_scores` is the per-party percentage
/// object exactly as returned to the client.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub user_id: String,
    pub quiz_id: i64,
    pub matched_party: String,
    pub party_scores: serde_json::Value,
    pub created_at: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct QuizResultRow {
    id: i64,
    user_id: String,
    quiz_id: i64,
    matched_party: String,
    party_scores: String,
    created_at: NaiveDateTime,
}

impl TryFrom<QuizResultRow> for QuizResult {
    type Error = serde_json::Error;

    fn try_from(row: QuizResultRow) -> Result<Self, Self::Error> {
        Ok(QuizResult {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            matched_party: row.matched_party,
            party_scores: serde_json::from_str(&row.party_scores)?,
            created_at: row.created_at,
        })
    }
}

pub async fn list_quizzes(sql: &SqlDb) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes ORDER BY id")
        .fetch_all(sql.as_ref())
        .await
}

/// Loads a quiz with its questions and their options fully materialized.
pub async fn load_quiz(sql: &SqlDb, quiz_id: i64) -> Result<Option<QuizWithQuestions>, sqlx::Error> {
    let quiz = sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_optional(sql.as_ref())
        .await?;
    let quiz = match quiz {
        Some(quiz) => quiz,
        None => return Ok(None),
    };

    let questions =
        sqlx::query_as::<_, QuizQuestion>("SELECT * FROM quiz_questions WHERE quiz_id = ? ORDER BY id")
            .bind(quiz_id)
            .fetch_all(sql.as_ref())
            .await?;
    let options = sqlx::query_as::<_, QuizOption>(
        "SELECT qo.* FROM quiz_options qo \
         JOIN quiz_questions qq ON qq.id = qo.question_id \
         WHERE qq.quiz_id = ? ORDER BY qo.id",
    )
    .bind(quiz_id)
    .fetch_all(sql.as_ref())
    .await?;

    let questions = questions
        .into_iter()
        .map(|question| {
            let options = options
                .iter()
                .filter(|option| option.question_id == question.id)
                .cloned()
                .collect();
            QuestionWithOptions { question, options }
        })
        .collect();

    Ok(Some(QuizWithQuestions { quiz, questions }))
}

pub async fn save_quiz_result(
    sql: &SqlDb,
    user_id: &str,
    quiz_id: i64,
    outcome: &scoring::ScoreOutcome,
) -> anyhow::Result<QuizResult> {
    let party_scores = serde_json::to_string(&outcome.party_scores)?;
    let row = sqlx::query_as::<_, QuizResultRow>(
        "INSERT INTO quiz_results (user_id, quiz_id, matched_party, party_scores) \
         VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(&outcome.matched_party)
    .bind(party_scores)
    .fetch_one(sql.as_ref())
    .await?;
    Ok(QuizResult::try_from(row)?)
}
