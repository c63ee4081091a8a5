//! toolchat: chat endpoint and widget for a tool-calling LLM agent
//!
//! This library provides:
//! - HTTP server exposing `POST /chat`, `GET /health`, `GET /tools` and the chat page
//! - Chat agent that loops between the model and its tools
//! - OpenAI chat-completions provider
//! - Chat widget state machine with an HTTP client and a terminal front-end

pub mod agent;
pub mod config;
pub mod llm;
pub mod tools;
pub mod transport;
pub mod widget;

pub use config::Config;
