//! Conversation orchestration.
//!
//! [`FutureAgent`] runs one chat turn end to end: resolve the session,
//! retrieve commit context for the user's message, assemble the
//! prompt, call the model, and only then record the exchange. History
//! is untouched when the model call fails, so a retry of the same
//! message sees the same state.

use tracing::{debug, info};

use futureme_index::{format_context, Retriever};
use futureme_llm::{CompletionRequest, Message, SharedBackend, DEFAULT_GROQ_MODEL};
use futureme_session::{SessionId, SessionStore};

use crate::error::Result;
use crate::persona::{PersonaConfig, CONTEXT_PREAMBLE};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Tunables for a [`FutureAgent`].
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub persona: PersonaConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GROQ_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            persona: PersonaConfig::default(),
        }
    }
}

/// The reply to one chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Model output, returned verbatim.
    pub reply: String,
    /// Session the turn was recorded under. Echo this back to
    /// continue the conversation.
    pub session_id: SessionId,
}

/// Retrieval-grounded future-self agent.
pub struct FutureAgent {
    backend: SharedBackend,
    retriever: Retriever,
    sessions: SessionStore,
    config: AgentConfig,
}

impl FutureAgent {
    pub fn new(
        backend: SharedBackend,
        retriever: Retriever,
        sessions: SessionStore,
        config: AgentConfig,
    ) -> Self {
        Self {
            backend,
            retriever,
            sessions,
            config,
        }
    }

    /// The session store, shared with anything else that needs to
    /// inspect histories.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one conversation turn.
    ///
    /// A missing `session_id` starts a fresh session; a provided one
    /// is used verbatim even if it has no history yet.
    pub async fn respond(
        &self,
        session_id: Option<String>,
        message: &str,
    ) -> Result<ChatOutcome> {
        let session_id = match session_id {
            Some(id) => SessionId::from(id),
            None => SessionId::new(),
        };

        let history = self.sessions.history(&session_id).await;
        let records = self.retriever.retrieve(message).await?;
        let context = format_context(&records);
        debug!(
            session = %session_id,
            history_turns = history.len(),
            context_records = records.len(),
            "assembled prompt inputs"
        );

        let mut messages: Vec<Message> =
            history.iter().map(|turn| turn.to_message()).collect();
        messages.push(Message::system(format!("{CONTEXT_PREAMBLE}\n{context}")));
        messages.push(Message::user(message));

        let request = CompletionRequest::new(&self.config.model, messages, self.config.max_tokens)
            .with_system(self.config.persona.system_prompt())
            .with_temperature(self.config.temperature);

        let response = self.backend.complete(request).await?;

        self.sessions
            .append_exchange(&session_id, message, &response.text)
            .await;
        info!(
            session = %session_id,
            model = %response.model,
            tokens = response.usage.total(),
            "completed chat turn"
        );

        Ok(ChatOutcome {
            reply: response.text,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use futureme_index::{build_index, CommitIndex};
    use futureme_ingest::CommitRecord;
    use futureme_llm::{CompletionResponse, MockBackend, MockEmbedder, Role, Usage};

    fn record(sha: &str, text: &str) -> CommitRecord {
        CommitRecord {
            text: text.to_string(),
            repo: "me/project".to_string(),
            sha: sha.to_string(),
            author_name: "Me".to_string(),
            author_email: String::new(),
            date: None,
            url: None,
        }
    }

    async fn test_retriever(name: &str) -> Retriever {
        let embedder = Arc::new(MockEmbedder::new(8));
        let index = Arc::new(CommitIndex::open(None, name, 8).unwrap());
        let records = vec![
            record("a1", "fix parser panic on empty input"),
            record("a2", "add integration tests for the chat route"),
        ];
        build_index(index.as_ref(), embedder.as_ref(), &records)
            .await
            .unwrap();
        Retriever::new(index, embedder)
    }

    fn agent_with(backend: MockBackend, retriever: Retriever) -> (FutureAgent, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let agent = FutureAgent::new(
            backend.clone(),
            retriever,
            SessionStore::new(),
            AgentConfig::default(),
        );
        (agent, backend)
    }

    #[tokio::test]
    async fn test_respond_generates_session_id_when_missing() {
        let retriever = test_retriever("agent_newid").await;
        let (agent, _) = agent_with(MockBackend::with_text("Future-Aziz: hello"), retriever);

        let outcome = agent.respond(None, "what am I working on?").await.unwrap();
        assert!(!outcome.session_id.as_str().is_empty());
        assert_eq!(outcome.reply, "Future-Aziz: hello");
        assert_eq!(agent.sessions().len(&outcome.session_id).await, 2);
    }

    #[tokio::test]
    async fn test_respond_reuses_provided_session_id() {
        let retriever = test_retriever("agent_reuse").await;
        let responses = vec![
            Ok(CompletionResponse::new("m1", "mock", "first reply", Usage::new(1, 1))),
            Ok(CompletionResponse::new("m2", "mock", "second reply", Usage::new(1, 1))),
        ];
        let (agent, backend) = agent_with(MockBackend::new(responses), retriever);

        let first = agent.respond(None, "first question").await.unwrap();
        let second = agent
            .respond(Some(first.session_id.to_string()), "second question")
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(agent.sessions().len(&second.session_id).await, 4);

        // The second request carries the first exchange as history.
        let requests = backend.requests();
        let contents: Vec<&str> = requests[1]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert!(contents.contains(&"first question"));
        assert!(contents.contains(&"first reply"));
    }

    #[tokio::test]
    async fn test_prompt_orders_history_context_then_user() {
        let retriever = test_retriever("agent_order").await;
        let responses = vec![
            Ok(CompletionResponse::new("m1", "mock", "reply one", Usage::new(1, 1))),
            Ok(CompletionResponse::new("m2", "mock", "reply two", Usage::new(1, 1))),
        ];
        let (agent, backend) = agent_with(MockBackend::new(responses), retriever);

        let first = agent.respond(None, "hello").await.unwrap();
        agent
            .respond(Some(first.session_id.to_string()), "and now?")
            .await
            .unwrap();

        let request = &backend.requests()[1];
        assert!(request.system.as_deref().unwrap().contains("FUTURE VERSION"));

        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::System, Role::User]
        );
        let context_msg = &request.messages[2];
        assert!(context_msg.content.starts_with(CONTEXT_PREAMBLE));
        assert_eq!(request.messages[3].content, "and now?");
    }

    #[tokio::test]
    async fn test_model_failure_leaves_history_untouched() {
        let retriever = test_retriever("agent_fail").await;
        let (agent, _) = agent_with(MockBackend::failing("provider down"), retriever);

        let session_id = SessionId::new();
        let err = agent
            .respond(Some(session_id.to_string()), "doomed question")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::AgentError::Model(_)));
        assert_eq!(agent.sessions().len(&session_id).await, 0);
        assert_eq!(agent.sessions().session_count().await, 0);
    }
}
