//! Chat widget
//!
//! Owns the transcript, the status banner and the send control, and talks to
//! the chat API through a [`ChatBackend`]. Front-ends (the terminal client,
//! tests) drive it through [`ChatWidget`] and read back what to display.
//!
//! State sits behind one mutex that is never held across an await. Banner
//! auto-hide runs on a spawned task, so a tokio runtime must be active.

mod client;
mod render;
mod state;

pub use client::{ChatBackend, ClientError, HttpChatClient};
pub use render::{render_banner, render_turn, tools_annotation};
pub use state::{Banner, BannerKind, Focus, Sender, StatusBanner, Transcript, Turn, WidgetState};

use crate::transport::protocol::ChatRequest;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const LOADING_TEXT: &str = "Agent is thinking...";
pub const GENERIC_FAILURE: &str = "Sorry, I encountered an error. Please try again.";
pub const CREDENTIAL_PROMPT: &str =
    "Please provide your OpenAI API key in the field above to start chatting.";
pub const HEALTH_OK_TEXT: &str = "Connected to agent API";

/// Canned prompts, one per demonstration tool
pub const EXAMPLES: [&str; 4] = [
    "What's the weather like in Paris?",
    "Search Wikipedia for the Rust programming language",
    "Tell me a fun fact about octopuses",
    "Pick a random color from red, green and blue",
];

/// Result of a send attempt
#[derive(Debug)]
pub enum SendOutcome {
    /// Message was blank; nothing happened
    Ignored,
    /// Another send is in flight
    Busy,
    /// Reply appended to the transcript
    Delivered,
    /// Failure turn appended and error banner shown
    Failed(ClientError),
}

/// Keys the widget reacts to in the message field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
}

pub struct ChatWidget<B> {
    backend: Arc<B>,
    state: Arc<Mutex<WidgetState>>,
    status_timeout: Duration,
}

impl<B: ChatBackend + 'static> ChatWidget<B> {
    pub fn new(backend: B, status_timeout: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(WidgetState::default())),
            status_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        lock_state(&self.state)
    }

    /// Fill the message field without sending
    pub fn set_message(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.message_input = text.into();
        state.focus = Focus::Message;
    }

    /// Fill the API key field, moving focus to it
    pub fn set_api_key(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.api_key_input = text.into();
        state.focus = Focus::ApiKey;
    }

    /// Fill the message field with example `index` (0-based)
    pub fn use_example(&self, index: usize) -> bool {
        match EXAMPLES.get(index) {
            Some(example) => {
                self.set_message(*example);
                true
            }
            None => false,
        }
    }

    /// Handle a key press in the message field; Enter sends
    pub async fn handle_key(&self, key: Key) -> Option<SendOutcome> {
        match key {
            Key::Enter => return Some(self.send_message().await),
            Key::Char(c) => self.lock().message_input.push(c),
            Key::Backspace => {
                self.lock().message_input.pop();
            }
        }
        None
    }

    /// Send the current message
    ///
    /// Blank messages are ignored. Otherwise the user turn is appended
    /// before the request goes out, exactly one request is made, and the
    /// send control is re-enabled with focus back on the message field
    /// whatever the outcome.
    pub async fn send_message(&self) -> SendOutcome {
        let request = {
            let mut state = self.lock();
            if !state.send_enabled {
                return SendOutcome::Busy;
            }

            let message = state.message_input.trim().to_string();
            if message.is_empty() {
                return SendOutcome::Ignored;
            }

            state.transcript.push(Turn::user(message.clone()));
            state.message_input.clear();
            state.send_enabled = false;
            state.focus = Focus::None;
            state.banner.show(BannerKind::Loading, LOADING_TEXT);

            ChatRequest::new(message).with_api_key(state.api_key())
        };

        let result = self.backend.chat(&request).await;

        let mut state = self.lock();
        let outcome = match result {
            Ok(response) => {
                tracing::debug!("Reply received, tools used: {:?}", response.tool_calls);
                state
                    .transcript
                    .push(Turn::agent(response.response, response.tool_calls));
                state.banner.clear();
                SendOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                let content = if e.is_credential() {
                    CREDENTIAL_PROMPT
                } else {
                    GENERIC_FAILURE
                };
                state.transcript.push(Turn::agent(content, Vec::new()));
                let generation = state.banner.show(BannerKind::Error, format!("Error: {}", e));
                self.schedule_hide(generation);
                SendOutcome::Failed(e)
            }
        };

        state.send_enabled = true;
        state.focus = Focus::Message;
        outcome
    }

    /// Probe the server; success shows a transient banner, failure a
    /// persistent one
    pub async fn check_health(&self) -> bool {
        let result = self.backend.health().await;

        let mut state = self.lock();
        match result {
            Ok(status) if status == "healthy" => {
                let generation = state.banner.show(BannerKind::Success, HEALTH_OK_TEXT);
                self.schedule_hide(generation);
                true
            }
            Ok(status) => {
                tracing::warn!("Health check reported status '{}'", status);
                state.banner.show(
                    BannerKind::Error,
                    format!("Cannot connect to agent API: unexpected status '{}'", status),
                );
                false
            }
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                state
                    .banner
                    .show(BannerKind::Error, format!("Cannot connect to agent API: {}", e));
                false
            }
        }
    }

    fn schedule_hide(&self, generation: u64) {
        let state = self.state.clone();
        let delay = self.status_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock_state(&state).banner.hide_if(generation);
        });
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.lock().transcript.turns().to_vec()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.lock().banner.current().cloned()
    }

    pub fn send_enabled(&self) -> bool {
        self.lock().send_enabled
    }

    pub fn focus(&self) -> Focus {
        self.lock().focus
    }

    pub fn message(&self) -> String {
        self.lock().message_input.clone()
    }
}

fn lock_state(state: &Mutex<WidgetState>) -> MutexGuard<'_, WidgetState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::protocol::{ChatResponse, ErrorKind};
    use async_trait::async_trait;

    struct FixedBackend {
        reply: Result<ChatResponse, (u16, String, Option<ErrorKind>)>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl FixedBackend {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(ChatResponse {
                    response: text.to_string(),
                    tool_calls: Vec::new(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(|(status, detail, kind)| ClientError::Api {
                status,
                detail,
                kind,
            })
        }

        async fn health(&self) -> Result<String, ClientError> {
            Ok("healthy".to_string())
        }
    }

    #[tokio::test]
    async fn test_key_presses_edit_message() {
        let widget = ChatWidget::new(FixedBackend::ok("hi"), Duration::from_secs(3));
        for c in "hey".chars() {
            assert!(widget.handle_key(Key::Char(c)).await.is_none());
        }
        widget.handle_key(Key::Backspace).await;
        assert_eq!(widget.message(), "he");
    }

    #[tokio::test]
    async fn test_api_key_is_trimmed_into_request() {
        let widget = ChatWidget::new(FixedBackend::ok("hi"), Duration::from_secs(3));
        widget.set_api_key("  sk-live  ");
        widget.set_message("  hello  ");
        widget.send_message().await;

        let requests = widget.backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "hello");
        assert_eq!(requests[0].openai_api_key.as_deref(), Some("sk-live"));
    }

    #[tokio::test]
    async fn test_focus_returns_to_message_after_key_entry() {
        let widget = ChatWidget::new(FixedBackend::ok("hi"), Duration::from_secs(3));
        widget.set_api_key("sk-live");
        assert_eq!(widget.focus(), Focus::ApiKey);

        widget.set_message("hello");
        assert_eq!(widget.focus(), Focus::Message);

        widget.set_api_key("sk-other");
        widget.handle_key(Key::Enter).await;
        assert_eq!(widget.focus(), Focus::Message);
    }

    #[tokio::test]
    async fn test_use_example_bounds() {
        let widget = ChatWidget::new(FixedBackend::ok("hi"), Duration::from_secs(3));
        assert!(widget.use_example(0));
        assert_eq!(widget.message(), EXAMPLES[0]);
        assert!(!widget.use_example(EXAMPLES.len()));
    }

    #[tokio::test]
    async fn test_generic_failure_for_non_credential_error() {
        let backend = FixedBackend {
            reply: Err((502, "Upstream error: overloaded".into(), None)),
            requests: Mutex::new(Vec::new()),
        };
        let widget = ChatWidget::new(backend, Duration::from_secs(3));
        widget.set_message("hi");

        let outcome = widget.send_message().await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));

        let turns = widget.turns();
        assert_eq!(turns[1].content, GENERIC_FAILURE);
        let banner = widget.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.text, "Error: Upstream error: overloaded");
    }
}
