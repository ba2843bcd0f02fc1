//! Chat session controller.
//!
//! A session owns the ordered message log and allows at most one generation
//! call in flight. A turn is split in two halves so a UI can run the network
//! call on a background task:
//!
//! 1. [`ChatSession::begin_turn`] appends the user message and a loading
//!    placeholder, then returns the history to send.
//! 2. [`ChatSession::finish_turn`] overwrites the placeholder with the reply
//!    or an error and releases the single-flight lock.
//!
//! [`ChatSession::submit`] runs both halves around a single generator call.

use crate::ai::{Generator, HistoryEntry};
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::roles::AIRole;
use crate::state::{Message, MessageId, MessageRole};

/// Model identifier sent with every request
pub const MODEL: &str = "gemini-2.0-flash-lite";

/// A turn whose placeholder is waiting for the generator
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub placeholder_id: MessageId,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    in_flight: Option<MessageId>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drop the log and any pending turn
    pub fn reset(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }

    /// Start a turn. Returns `None` without touching the log when the input
    /// is blank or another turn is still pending.
    pub fn begin_turn(&mut self, input: &str, role: &AIRole) -> Option<PendingTurn> {
        if input.trim().is_empty() || self.is_busy() {
            return None;
        }

        let user_message = Message::user(input);
        let history = build_history(role.system_prompt, &self.messages, &user_message);
        let placeholder = Message::placeholder();
        let placeholder_id = placeholder.id;

        self.messages.push(user_message);
        self.messages.push(placeholder);
        self.in_flight = Some(placeholder_id);

        Some(PendingTurn { placeholder_id, history })
    }

    /// Resolve the placeholder with the generator's outcome
    pub fn finish_turn(&mut self, placeholder_id: MessageId, outcome: Result<String, GenerationError>) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == placeholder_id) {
            msg.content = match outcome {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "generation failed");
                    format!("Error: {}. Please check your API key or try again later.", e)
                }
            };
            msg.is_loading = false;
        }

        if self.in_flight == Some(placeholder_id) {
            self.in_flight = None;
        }
    }

    /// Run a whole turn against `generator`. Returns false if the submission
    /// was a no-op.
    pub async fn submit(
        &mut self,
        input: &str,
        role: &AIRole,
        config: &GenerationConfig,
        generator: &dyn Generator,
    ) -> bool {
        let Some(turn) = self.begin_turn(input, role) else {
            return false;
        };

        let outcome = generator.generate(&turn.history, MODEL, config).await;
        if outcome.is_ok() {
            tracing::debug!(role = role.id, "reply received");
        }
        self.finish_turn(turn.placeholder_id, outcome);
        true
    }
}

/// System prompt as a leading model turn, then the prior log, then the new
/// user message. Nothing is reordered or dropped.
pub fn build_history(system_prompt: &str, prior: &[Message], user_message: &Message) -> Vec<HistoryEntry> {
    let mut history = Vec::with_capacity(prior.len() + 2);
    history.push(HistoryEntry::new(MessageRole::Model, system_prompt));
    history.extend(prior.iter().map(|m| HistoryEntry::new(m.role, m.content.clone())));
    history.push(HistoryEntry::new(user_message.role, user_message.content.clone()));
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::find_role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers from a script
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, GenerationError>>>,
        calls: Mutex<Vec<(Vec<HistoryEntry>, String, GenerationConfig)>>,
    }

    impl ScriptedGenerator {
        fn new(mut replies: Vec<Result<String, GenerationError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Vec<HistoryEntry>, String, GenerationConfig)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(
            &self,
            history: &[HistoryEntry],
            model: &str,
            config: &GenerationConfig,
        ) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((history.to_vec(), model.to_string(), *config));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(GenerationError::EmptyResponse))
        }
    }

    fn role() -> &'static AIRole {
        find_role("movie-expert").unwrap()
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.begin_turn("", role()).is_none());
        assert!(session.begin_turn("   \n\t", role()).is_none());
        assert!(session.messages().is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut session = ChatSession::new();
        let turn = session.begin_turn("Hello", role()).unwrap();

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, MessageRole::User);
        assert_eq!(log[0].content, "Hello");
        assert!(!log[0].is_loading);
        assert_eq!(log[1].role, MessageRole::Model);
        assert!(log[1].is_loading);
        assert_eq!(log[1].id, turn.placeholder_id);
        assert!(session.is_busy());
    }

    #[test]
    fn test_second_submission_while_busy_is_ignored() {
        let mut session = ChatSession::new();
        session.begin_turn("first", role()).unwrap();
        let before = session.messages().to_vec();

        assert!(session.begin_turn("second", role()).is_none());
        assert_eq!(session.messages(), before.as_slice());
    }

    #[test]
    fn test_history_layout() {
        let mut session = ChatSession::new();
        let first = session.begin_turn("one", role()).unwrap();
        session.finish_turn(first.placeholder_id, Ok("reply one".into()));

        let second = session.begin_turn("two", role()).unwrap();
        assert_eq!(second.history.len(), 2 + 2);
        assert_eq!(
            second.history,
            vec![
                HistoryEntry::new(MessageRole::Model, role().system_prompt),
                HistoryEntry::new(MessageRole::User, "one"),
                HistoryEntry::new(MessageRole::Model, "reply one"),
                HistoryEntry::new(MessageRole::User, "two"),
            ]
        );
    }

    #[test]
    fn test_finish_turn_keeps_id_and_timestamp() {
        let mut session = ChatSession::new();
        let turn = session.begin_turn("Hello", role()).unwrap();
        let before = session.messages()[1].clone();

        session.finish_turn(turn.placeholder_id, Ok("Hi!".into()));

        let after = &session.messages()[1];
        assert_eq!(after.id, before.id);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.content, "Hi!");
        assert!(!after.is_loading);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_finish_unknown_turn_keeps_lock() {
        let mut session = ChatSession::new();
        session.begin_turn("Hello", role()).unwrap();
        session.finish_turn(MessageId::new(), Ok("stray".into()));
        assert!(session.is_busy());
        assert!(session.messages()[1].is_loading);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let generator = ScriptedGenerator::new(vec![Ok("Try Casablanca.".into())]);
        let config = GenerationConfig { temperature: 0.3, ..GenerationConfig::default() };
        let mut session = ChatSession::new();

        assert!(session.submit("Hello", role(), &config, &generator).await);

        let log = session.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "Hello");
        assert_eq!(log[1].content, "Try Casablanca.");
        assert!(!log[1].is_loading);

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let (history, model, sent_config) = &calls[0];
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, role().system_prompt);
        assert_eq!(model, MODEL);
        assert_eq!(*sent_config, config);
    }

    #[tokio::test]
    async fn test_submit_failure_renders_inline_error() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerationError::Request("quota exceeded".into())),
            Ok("back again".into()),
        ]);
        let mut session = ChatSession::new();
        let config = GenerationConfig::default();

        assert!(session.submit("Hello", role(), &config, &generator).await);
        assert_eq!(
            session.messages()[1].content,
            "Error: quota exceeded. Please check your API key or try again later."
        );
        assert!(!session.messages()[1].is_loading);
        assert!(!session.is_busy());

        // The session stays usable after a failed turn
        assert!(session.submit("Again", role(), &config, &generator).await);
        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.messages()[3].content, "back again");
        assert_eq!(generator.calls()[1].0.len(), 2 + 2);
    }

    #[tokio::test]
    async fn test_submit_blank_does_not_call_generator() {
        let generator = ScriptedGenerator::new(vec![]);
        let mut session = ChatSession::new();
        assert!(!session.submit("  ", role(), &GenerationConfig::default(), &generator).await);
        assert!(generator.calls().is_empty());
    }

    #[test]
    fn test_reset_clears_log_and_lock() {
        let mut session = ChatSession::new();
        session.begin_turn("Hello", role()).unwrap();
        session.reset();
        assert!(session.messages().is_empty());
        assert!(!session.is_busy());
    }
}
