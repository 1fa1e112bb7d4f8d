//! Handlers for conversations and the streaming chat turn.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::sse::{self, Sse};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use futures::StreamExt;

use crate::application::Application;
use crate::chat::{self, relay};

use super::identity::CallerIdentity;
use super::types::{json, ApiResponse, Error, Result};

const DEFAULT_TITLE: &str = "Neue politische Diskussion";

impl ApiResponse for chat::Conversation {}
impl ApiResponse for Vec<chat::Conversation> {}

pub async fn list_conversations(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
) -> Result<impl IntoResponse> {
    let conversations = chat::list_conversations(&app.sql, &user_id).await?;
    Ok(json(conversations))
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
}

pub async fn create_conversation(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
    Json(request): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse> {
    let title = request
        .title
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned());
    let conversation = chat::create_conversation(
        &app.sql,
        &user_id,
        &title,
        request.system_prompt.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, json(conversation)))
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateDebateRequest {
    persona: String,
}

/// Creates a conversation preloaded with one of the politician personas.
pub async fn create_debate(
    Extension(app): Extension<Application>,
    CallerIdentity(user_id): CallerIdentity,
    Json(CreateDebateRequest { persona }): Json<CreateDebateRequest>,
) -> Result<impl IntoResponse> {
    let persona = match llm_prompts::personas::find_persona(&persona) {
        Some(persona) => persona,
        None => return Err(Error::not_found("Persona nicht gefunden")),
    };
    let conversation = chat::create_conversation(
        &app.sql,
        &user_id,
        &persona.conversation_title(),
        Some(&persona.system_prompt),
    )
    .await?;
    Ok((StatusCode::CREATED, json(conversation)))
}

#[derive(serde::Serialize)]
pub struct ConversationWithMessages {
    #[serde(flatten)]
    conversation: chat::Conversation,
    messages: Vec<chat::ChatMessage>,
}

impl ApiResponse for ConversationWithMessages {}

pub async fn get_conversation(
    Extension(app): Extension<Application>,
    Path(conversation_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let conversation = match chat::get_conversation(&app.sql, conversation_id).await? {
        Some(conversation) => conversation,
        None => return Err(Error::not_found("Conversation not found")),
    };
    let messages = chat::list_messages(&app.sql, conversation_id).await?;
    Ok(json(ConversationWithMessages {
        conversation,
        messages,
    }))
}

pub async fn delete_conversation(
    Extension(app): Extension<Application>,
    Path(conversation_id): Path<i64>,
) -> Result<impl IntoResponse> {
    chat::delete_conversation(&app.sql, conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, serde::Deserialize)]
pub struct SendMessageRequest {
    content: String,
}

/// Streams one chat turn as server sent events: `{"content": ...}` per
/// provider fragment, then `{"done": true}`, with `{"error": ...}` as the
/// terminal event once bytes are already on the wire.
pub async fn send_message(
    Extension(app): Extension<Application>,
    Path(conversation_id): Path<i64>,
    Json(SendMessageRequest { content }): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let conversation = match chat::get_conversation(&app.sql, conversation_id).await? {
        Some(conversation) => conversation,
        None => return Err(Error::not_found("Conversation not found")),
    };
    let api_key = match app.config.provider_api_keys() {
        Some(api_key) => api_key,
        None => {
            return Err(Error::upstream(
                "completion provider credentials are not configured",
            ))
        }
    };
    let lease = match app.active_sends.acquire(conversation_id) {
        Some(lease) => lease,
        None => return Err(Error::conflict("Eine Antwort wird bereits generiert")),
    };

    let events = relay::stream_chat_turn(
        app.sql.clone(),
        app.llm_broker.clone(),
        app.config.chat_model_type(),
        api_key,
        conversation,
        content,
        lease,
    )
    .await?;

    let stream = events.map(|event| {
        sse::Event::default()
            .json_data(event)
            .map_err(anyhow::Error::new)
    });
    Ok(Sse::new(Box::pin(stream)))
}
