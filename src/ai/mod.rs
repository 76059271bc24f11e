//! OpenAI-backed content generation
//!
//! This module holds the live API client, the prompt templates, the lenient
//! response parser and the deterministic mock generators used whenever the
//! live API is unavailable or fails.

mod client;
mod mock;
mod parser;
pub mod prompts;

pub use client::{ApiError, CompletionApi, OpenAiClient, init_client};
pub use mock::{mock_email, mock_notification};
pub use parser::{SubjectBody, parse_subject_body};
