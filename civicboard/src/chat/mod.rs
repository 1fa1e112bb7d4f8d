//! Conversations with the AI assistant: entities, storage access and the
//! per-conversation send lock.

pub mod relay;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use llm_client::clients::types::{LLMClientError, LLMClientMessage};
use thiserror::Error;

use crate::db::SqlDb;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub system_prompt: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("completion provider error: {0}")]
    Upstream(#[from] LLMClientError),

    #[error("completion provider timed out before any output")]
    ProviderTimeout,

    #[error("relay task failed: {0}")]
    RelayJoin(String),
}

pub async fn list_conversations(
    sql: &SqlDb,
    user_id: &str,
) -> Result<Vec<Conversation>, sqlx::Error> {
    sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(sql.as_ref())
    .await
}

pub async fn get_conversation(sql: &SqlDb, id: i64) -> Result<Option<Conversation>, sqlx::Error> {
    sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
        .bind(id)
        .fetch_optional(sql.as_ref())
        .await
}

pub async fn create_conversation(
    sql: &SqlDb,
    user_id: &str,
    title: &str,
    system_prompt: Option<&str>,
) -> Result<Conversation, sqlx::Error> {
    sqlx::query_as::<_, Conversation>(
        "INSERT INTO conversations (user_id, title, system_prompt) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(system_prompt)
    .fetch_one(sql.as_ref())
    .await
}

pub async fn delete_conversation(sql: &SqlDb, id: i64) -> Result<(), sqlx::Error> {
    let mut tx = sql.begin().await?;
    sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM conversations WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Messages in creation order; the order every provider request and every
/// history read relies on.
pub async fn list_messages(
    sql: &SqlDb,
    conversation_id: i64,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(sql.as_ref())
    .await
}

pub async fn create_message(
    sql: &SqlDb,
    conversation_id: i64,
    role: &str,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO messages (conversation_id, role, content) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(conversation_id)
    .bind(role)
    .bind(content)
    .fetch_one(sql.as_ref())
    .await
}

/// Builds the provider payload: the optional persona instruction first, then
/// every stored message in creation order.
pub fn provider_messages(
    conversation: &Conversation,
    history: &[ChatMessage],
) -> Vec<LLMClientMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if let Some(system_prompt) = conversation.system_prompt.as_deref() {
        messages.push(LLMClientMessage::system(system_prompt.to_owned()));
    }
    for message in history {
        match message.role.as_str() {
            ROLE_ASSISTANT => {
                messages.push(LLMClientMessage::assistant(message.content.to_owned()))
            }
            _ => messages.push(LLMClientMessage::user(message.content.to_owned())),
        }
    }
    messages
}

/// Serializes sends per conversation: while one send streams, a second one is
/// rejected instead of interleaving two provider calls on the same history.
#[derive(Clone)]
pub struct ActiveSendTracker {
    active: Arc<Mutex<HashSet<i64>>>,
}

impl ActiveSendTracker {
    pub fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claims the conversation for one send, `None` while another send holds
    /// the lease.
    pub fn acquire(&self, conversation_id: i64) -> Option<SendLease> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !active.insert(conversation_id) {
            return None;
        }
        Some(SendLease {
            conversation_id,
            tracker: self.clone(),
        })
    }
}

/// Released on drop, so an abandoned stream frees the conversation too.
pub struct SendLease {
    conversation_id: i64,
    tracker: ActiveSendTracker,
}

impl Drop for SendLease {
    fn drop(&mut self) {
        let mut active = self
            .tracker
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        active.remove(&self.conversation_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::db::init_test_db;

    use super::{
        create_conversation, create_message, delete_conversation, get_conversation,
        list_conversations, list_messages, provider_messages, ActiveSendTracker, ROLE_ASSISTANT,
        ROLE_USER,
    };

    #[tokio::test]
    async fn conversation_lifecycle() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Neue politische Diskussion", None)
            .await
            .expect("insert should work");
        assert_eq!(conversation.title, "Neue politische Diskussion");
        assert!(conversation.system_prompt.is_none());

        let loaded = get_conversation(&sql, conversation.id)
            .await
            .expect("query should work")
            .expect("conversation should exist");
        assert_eq!(loaded.id, conversation.id);

        let listed = list_conversations(&sql, "guest_test")
            .await
            .expect("query should work");
        assert_eq!(listed.len(), 1);
        assert!(list_conversations(&sql, "guest_other")
            .await
            .expect("query should work")
            .is_empty());

        create_message(&sql, conversation.id, ROLE_USER, "Hallo")
            .await
            .expect("insert should work");
        delete_conversation(&sql, conversation.id)
            .await
            .expect("delete should work");
        assert!(get_conversation(&sql, conversation.id)
            .await
            .expect("query should work")
            .is_none());
        assert!(list_messages(&sql, conversation.id)
            .await
            .expect("query should work")
            .is_empty());
    }

    #[tokio::test]
    async fn messages_are_returned_in_creation_order() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");
        for index in 0..4 {
            let role = if index % 2 == 0 { ROLE_USER } else { ROLE_ASSISTANT };
            create_message(&sql, conversation.id, role, &format!("Nachricht {}", index))
                .await
                .expect("insert should work");
        }
        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        let contents = messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            contents,
            vec!["Nachricht 0", "Nachricht 1", "Nachricht 2", "Nachricht 3"]
        );
    }

    #[tokio::test]
    async fn persona_instruction_leads_the_provider_payload() {
        let sql = init_test_db().await;
        let conversation = create_conversation(
            &sql,
            "guest_test",
            "Debatte",
            Some("Du bist ein Testminister."),
        )
        .await
        .expect("insert should work");
        create_message(&sql, conversation.id, ROLE_USER, "Guten Tag")
            .await
            .expect("insert should work");
        let history = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");

        let payload = provider_messages(&conversation, &history);
        assert_eq!(payload.len(), 2);
        assert_eq!(
            payload[0].role().to_string(),
            "system".to_owned()
        );
        assert_eq!(payload[0].content(), "Du bist ein Testminister.");
        assert_eq!(payload[1].role().to_string(), "user".to_owned());
    }

    #[test]
    fn send_lease_is_exclusive_per_conversation_and_released_on_drop() {
        let tracker = ActiveSendTracker::new();
        let lease = tracker.acquire(7).expect("first lease should succeed");
        assert!(tracker.acquire(7).is_none());
        // other conversations are unaffected
        assert!(tracker.acquire(8).is_some());
        drop(lease);
        assert!(tracker.acquire(7).is_some());
    }
}
