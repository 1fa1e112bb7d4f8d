//! The streaming relay between a conversation and the completion provider.
//! Every provider delta is forwarded to the client the moment it arrives; the
//! accumulated answer is persisted once the provider signals completion.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use llm_client::broker::LLMBroker;
use llm_client::clients::types::{LLMClientCompletionRequest, LLMType};
use llm_client::provider::LLMProviderAPIKeys;
use tokio::time::timeout;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::error;

use crate::db::SqlDb;

use super::{
    create_message, list_messages, provider_messages, ChatError, Conversation, SendLease,
    ROLE_ASSISTANT, ROLE_USER,
};

const CHAT_TEMPERATURE: f32 = 0.2;
// Time allowed between provider deltas before the relay gives up.
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// One event on the client-facing stream, serialized verbatim into the SSE
/// data payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChatStreamEvent {
    Fragment { content: String },
    Done { done: bool },
    Failed { error: String },
}

impl ChatStreamEvent {
    pub fn fragment(content: String) -> Self {
        ChatStreamEvent::Fragment { content }
    }

    pub fn done() -> Self {
        ChatStreamEvent::Done { done: true }
    }

    pub fn failed<E: std::fmt::Display>(error: E) -> Self {
        ChatStreamEvent::Failed {
            error: error.to_string(),
        }
    }
}

/// Runs one chat turn against the provider.
///
/// The user message is recorded before the provider is contacted, so a failed
/// completion never loses the question. An error before the first fragment is
/// returned as a plain `Err` while the response can still carry a status
/// code; afterwards failures surface as a terminal in-band event. The lease
/// travels with the stream and is released when the stream is dropped, which
/// also covers a client that disconnects mid-answer. A disconnect stops the
/// forwarding loop and the partial answer is not persisted.
pub async fn stream_chat_turn(
    sql: SqlDb,
    broker: Arc<LLMBroker>,
    model: LLMType,
    api_key: LLMProviderAPIKeys,
    conversation: Conversation,
    content: String,
    lease: SendLease,
) -> Result<BoxStream<'static, ChatStreamEvent>, ChatError> {
    create_message(&sql, conversation.id, ROLE_USER, &content).await?;
    let history = list_messages(&sql, conversation.id).await?;
    let request = LLMClientCompletionRequest::new(
        model,
        provider_messages(&conversation, &history),
        CHAT_TEMPERATURE,
    );

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    let completion_broker = broker.clone();
    let completion = tokio::spawn(async move {
        completion_broker
            .stream_completion(api_key, request, sender)
            .await
    });
    let mut deltas = UnboundedReceiverStream::new(receiver);

    let first = match timeout(STREAM_IDLE_TIMEOUT, deltas.next()).await {
        Ok(first) => first,
        Err(_) => {
            completion.abort();
            return Err(ChatError::ProviderTimeout);
        }
    };

    // No fragment at all: the provider either failed outright or produced an
    // empty answer. Both are resolved here, before any bytes go out.
    if first.is_none() {
        return match completion.await {
            Ok(Ok(_)) => {
                create_message(&sql, conversation.id, ROLE_ASSISTANT, "").await?;
                drop(lease);
                Ok(futures::stream::iter(vec![ChatStreamEvent::done()]).boxed())
            }
            Ok(Err(e)) => Err(ChatError::Upstream(e)),
            Err(e) => Err(ChatError::RelayJoin(e.to_string())),
        };
    }

    let relay = async_stream::stream! {
        let _lease = lease;
        let mut answer = String::new();
        if let Some(fragment) = first.as_ref().and_then(|response| response.delta()) {
            answer.push_str(fragment);
            yield ChatStreamEvent::fragment(fragment.to_owned());
        }
        loop {
            match timeout(STREAM_IDLE_TIMEOUT, deltas.next()).await {
                Ok(Some(response)) => {
                    if let Some(fragment) = response.delta() {
                        answer.push_str(fragment);
                        yield ChatStreamEvent::fragment(fragment.to_owned());
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    completion.abort();
                    yield ChatStreamEvent::failed("completion provider stopped responding");
                    return;
                }
            }
        }
        match completion.await {
            Ok(Ok(_)) => {
                match create_message(&sql, conversation.id, ROLE_ASSISTANT, &answer).await {
                    Ok(_) => yield ChatStreamEvent::done(),
                    Err(e) => {
                        error!(conversation_id = conversation.id, "failed to persist assistant message: {}", e);
                        yield ChatStreamEvent::failed("failed to persist assistant message");
                    }
                }
            }
            Ok(Err(e)) => yield ChatStreamEvent::failed(e),
            Err(e) => yield ChatStreamEvent::failed(e),
        }
    };

    Ok(relay.boxed())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use futures::StreamExt;
    use llm_client::broker::LLMBroker;
    use llm_client::clients::types::{
        LLMClient, LLMClientCompletionRequest, LLMClientCompletionResponse, LLMClientError,
        LLMClientRole, LLMType,
    };
    use llm_client::provider::{GroqAPIKey, LLMProvider, LLMProviderAPIKeys};
    use tokio::sync::mpsc::UnboundedSender;

    use crate::chat::{
        create_conversation, list_messages, ActiveSendTracker, ChatError, ROLE_ASSISTANT,
        ROLE_USER,
    };
    use crate::db::{init_test_db, SqlDb};

    use super::{stream_chat_turn, ChatStreamEvent};

    /// Plays back a fixed fragment script, optionally failing afterwards, and
    /// records every request it saw.
    struct ScriptedClient {
        fragments: Vec<&'static str>,
        final_error: Option<fn() -> LLMClientError>,
        requests: Arc<Mutex<Vec<LLMClientCompletionRequest>>>,
    }

    impl ScriptedClient {
        fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                final_error: None,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_with(mut self, error: fn() -> LLMClientError) -> Self {
            self.final_error = Some(error);
            self
        }

        fn requests(&self) -> Arc<Mutex<Vec<LLMClientCompletionRequest>>> {
            self.requests.clone()
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        fn client(&self) -> &LLMProvider {
            &LLMProvider::Groq
        }

        async fn stream_completion(
            &self,
            _api_key: LLMProviderAPIKeys,
            request: LLMClientCompletionRequest,
            sender: UnboundedSender<LLMClientCompletionResponse>,
        ) -> Result<LLMClientCompletionResponse, LLMClientError> {
            self.requests
                .lock()
                .expect("request log lock")
                .push(request.clone());
            let model = request.model().to_string();
            let mut buffer = String::new();
            for fragment in &self.fragments {
                buffer.push_str(fragment);
                sender.send(LLMClientCompletionResponse::new(
                    buffer.to_owned(),
                    Some((*fragment).to_owned()),
                    model.to_owned(),
                ))?;
            }
            if let Some(final_error) = self.final_error {
                return Err(final_error());
            }
            Ok(LLMClientCompletionResponse::new(buffer, None, model))
        }

        async fn completion(
            &self,
            api_key: LLMProviderAPIKeys,
            request: LLMClientCompletionRequest,
        ) -> Result<String, LLMClientError> {
            let (sender, _receiver) = tokio::sync::mpsc::unbounded_channel();
            self.stream_completion(api_key, request, sender)
                .await
                .map(|answer| answer.answer_up_until_now().to_owned())
        }
    }

    fn test_broker(client: ScriptedClient) -> Arc<LLMBroker> {
        Arc::new(LLMBroker::new().add_provider(LLMProvider::Groq, Box::new(client)))
    }

    fn test_api_key() -> LLMProviderAPIKeys {
        LLMProviderAPIKeys::Groq(GroqAPIKey::new("test-key".to_owned()))
    }

    async fn run_turn(
        sql: &SqlDb,
        broker: Arc<LLMBroker>,
        conversation_id: i64,
        content: &str,
    ) -> Result<Vec<ChatStreamEvent>, ChatError> {
        let conversation = crate::chat::get_conversation(sql, conversation_id)
            .await
            .expect("query should work")
            .expect("conversation should exist");
        let tracker = ActiveSendTracker::new();
        let lease = tracker
            .acquire(conversation_id)
            .expect("lease should be free");
        let stream = stream_chat_turn(
            sql.clone(),
            broker,
            LLMType::Llama3_3_70bVersatile,
            test_api_key(),
            conversation,
            content.to_owned(),
            lease,
        )
        .await?;
        Ok(stream.collect().await)
    }

    #[tokio::test]
    async fn fragments_are_forwarded_individually_then_done() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");
        let broker = test_broker(ScriptedClient::new(vec!["Hel", "lo"]));

        let events = run_turn(&sql, broker, conversation.id, "Sag hallo")
            .await
            .expect("relay should stream");
        assert_eq!(
            events,
            vec![
                ChatStreamEvent::fragment("Hel".to_owned()),
                ChatStreamEvent::fragment("lo".to_owned()),
                ChatStreamEvent::done(),
            ]
        );

        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ROLE_USER);
        assert_eq!(messages[0].content, "Sag hallo");
        assert_eq!(messages[1].role, ROLE_ASSISTANT);
        assert_eq!(messages[1].content, "Hello");
    }

    #[tokio::test]
    async fn midstream_failure_becomes_a_terminal_error_event() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");
        let broker = test_broker(
            ScriptedClient::new(vec!["Teil"])
                .failing_with(|| LLMClientError::FailedToGetResponse),
        );

        let events = run_turn(&sql, broker, conversation.id, "Frage")
            .await
            .expect("relay should stream");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ChatStreamEvent::fragment("Teil".to_owned()));
        assert!(matches!(events[1], ChatStreamEvent::Failed { .. }));

        // no partial assistant message is fabricated
        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ROLE_USER);
    }

    #[tokio::test]
    async fn failure_before_any_output_is_a_plain_error() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");
        let broker = test_broker(
            ScriptedClient::new(vec![]).failing_with(|| LLMClientError::UnauthorizedAccess),
        );

        let result = run_turn(&sql, broker, conversation.id, "Frage").await;
        assert!(matches!(result, Err(ChatError::Upstream(_))));

        // the user's question is still durably recorded
        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ROLE_USER);
    }

    #[tokio::test]
    async fn empty_completions_still_terminate_with_done() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");
        let broker = test_broker(ScriptedClient::new(vec![]));

        let events = run_turn(&sql, broker, conversation.id, "Frage")
            .await
            .expect("relay should stream");
        assert_eq!(events, vec![ChatStreamEvent::done()]);

        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, ROLE_ASSISTANT);
        assert_eq!(messages[1].content, "");
    }

    #[tokio::test]
    async fn history_alternates_after_multiple_turns() {
        let sql = init_test_db().await;
        let conversation = create_conversation(&sql, "guest_test", "Test", None)
            .await
            .expect("insert should work");

        for turn in 0..2 {
            let broker = test_broker(ScriptedClient::new(vec!["Antwort"]));
            run_turn(&sql, broker, conversation.id, &format!("Frage {}", turn))
                .await
                .expect("relay should stream");
        }

        let messages = list_messages(&sql, conversation.id)
            .await
            .expect("query should work");
        let roles = messages
            .iter()
            .map(|message| message.role.as_str())
            .collect::<Vec<_>>();
        assert_eq!(roles, vec![ROLE_USER, ROLE_ASSISTANT, ROLE_USER, ROLE_ASSISTANT]);
    }

    #[tokio::test]
    async fn persona_instruction_leads_every_provider_request() {
        let sql = init_test_db().await;
        let conversation = create_conversation(
            &sql,
            "guest_test",
            "Debatte",
            Some("Du bist der Finanzminister."),
        )
        .await
        .expect("insert should work");

        let client = ScriptedClient::new(vec!["Zahlen."]);
        let requests = client.requests();
        let broker = test_broker(client);
        run_turn(&sql, broker.clone(), conversation.id, "Erste Frage")
            .await
            .expect("relay should stream");
        run_turn(&sql, broker, conversation.id, "Zweite Frage")
            .await
            .expect("relay should stream");

        let requests = requests.lock().expect("request log lock");
        assert_eq!(requests.len(), 2);
        for request in requests.iter() {
            let first = request.messages().first().expect("payload is never empty");
            assert_eq!(first.role(), &LLMClientRole::System);
            assert_eq!(first.content(), "Du bist der Finanzminister.");
        }
        // the second turn carries the full alternating history
        let second = &requests[1];
        assert_eq!(second.messages().len(), 4);
    }
}
