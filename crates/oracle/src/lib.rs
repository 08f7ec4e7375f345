//! # Spec Audit Oracle
//!
//! Boundary to the external reasoning oracle (a chat-completion language
//! model). Everything past this crate treats the oracle as an opaque
//! async function from messages to a reply.
//!
//! ## Layers
//!
//! ```text
//! caller
//!   │
//!   ├──> RetryingOracle (random exponential backoff, transient errors only)
//!   │      │
//!   │      └──> OpenAiOracle (POST {base_url}/chat/completions)
//!   │
//!   └──> OracleReply::parse (bracketed list / TERMINATE sentinel)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use specaudit_oracle::{OpenAiConfig, OpenAiOracle, Oracle, OracleReply, RetryPolicy, RetryingOracle};
//!
//! # async fn demo() -> specaudit_oracle::Result<()> {
//! let backend = OpenAiOracle::new(OpenAiConfig::new("gpt-4o"))?;
//! let oracle = RetryingOracle::new(backend, RetryPolicy::default());
//!
//! let reply = oracle.complete("Which file handles TCP? Answer [\"name\"]").await?;
//! let names = OracleReply::parse(&reply, true).into_names();
//! # Ok(())
//! # }
//! ```

mod error;
mod message;
mod openai;
mod reply;
mod retry;

pub use error::{OracleError, Result};
pub use message::{AssistantReply, ChatMessage, ChatRequest, ChatRole, ToolCall, ToolSpec};
pub use openai::{parse_response, OpenAiConfig, OpenAiOracle, DEFAULT_BASE_URL};
pub use reply::{OracleReply, TERMINATE};
pub use retry::{RetryPolicy, RetryingOracle};

use async_trait::async_trait;

/// A chat-completion oracle
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One round trip: the conversation so far in, one assistant reply out
    async fn chat(&self, request: &ChatRequest) -> Result<AssistantReply>;

    /// Single user prompt, text answer. A reply without content is `""`.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let reply = self.chat(&request).await?;
        Ok(reply.content.unwrap_or_default())
    }
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for std::sync::Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<AssistantReply> {
        (**self).chat(request).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Box<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<AssistantReply> {
        (**self).chat(request).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}
