//! Core types and error definitions for switchyard.
//!
//! This crate provides the foundational types shared by the routing layer and
//! the binaries that wire it up: error handling, message representations,
//! tool call abstractions and the completion request/response model.
//!
//! # Main types
//!
//! - [`SwitchyardError`]: Unified error enum for the provider routing layer.
//! - [`SwitchyardResult`]: Convenience alias for `Result<T, SwitchyardError>`.
//! - [`Role`]: Message role (user, assistant, system, tool).
//! - [`Message`]: A single message sent to a completion provider.
//! - [`ToolCall`]: Represents an LLM-initiated tool invocation request.
//! - [`ToolSchema`]: A tool advertised to the model.
//! - [`CompletionRequest`] / [`LlmResponse`]: Completion call payload and result.
//! - [`EmbedType`]: Query/document hint for embedding providers.

/// Completion request and response model.
pub mod completion;

pub use completion::{CompletionRequest, LlmResponse};

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Error types ---

/// Top-level error type for switchyard.
///
/// Each variant corresponds to a failure class of the provider routing layer.
#[derive(Debug, thiserror::Error)]
pub enum SwitchyardError {
    /// A routing or model configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// An outbound provider call failed (transport, non-2xx, malformed body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A descriptor names a provider kind no factory knows how to build.
    #[error("Unknown provider kind: {0}")]
    UnknownProviderKind(String),

    /// Neither the primary provider nor a fallback produced a result.
    #[error("No provider available: {0}")]
    NoProviderAvailable(String),

    /// The provider does not implement the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`SwitchyardError`].
pub type SwitchyardResult<T> = Result<T, SwitchyardError>;

// --- Message types ---

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The AI assistant.
    Assistant,
    /// A system-level instruction or prompt.
    System,
    /// Output produced by a tool invocation.
    Tool,
}

/// A single message exchanged with a completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new message with [`Role::System`].
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

// --- Tool types ---

/// A request from the LLM to invoke a specific tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier assigned by the LLM for this tool call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    pub arguments: serde_json::Value,
}

/// A tool the model may call, as advertised in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON schema of the tool's arguments.
    pub parameters_schema: serde_json::Value,
}

// --- Embedding hint ---

/// Whether a text is embedded as a search query or as a stored document.
///
/// Some embedding providers produce different vectors for the two; providers
/// that do not distinguish them ignore the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    /// Text used to search an index.
    Query,
    /// Text being stored in an index.
    #[default]
    Document,
}

impl EmbedType {
    /// Wire name of the hint.
    pub fn as_str(self) -> &'static str {
        match self {
            EmbedType::Query => "query",
            EmbedType::Document => "document",
        }
    }
}

impl fmt::Display for EmbedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmbedType {
    type Err = SwitchyardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(EmbedType::Query),
            "document" => Ok(EmbedType::Document),
            other => Err(SwitchyardError::Config(format!(
                "invalid embed type '{other}', expected 'query' or 'document'"
            ))),
        }
    }
}
