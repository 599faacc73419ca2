//! Text generation behind a single request/response seam.

mod compatible;
mod http_client;
mod scrub;

use std::future::Future;
use std::pin::Pin;

use crate::error::CompletionError;
use crate::persona::Persona;

pub use compatible::OpenAiCompatibleClient;
pub use http_client::build_completion_client;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One generation call: persona instructions plus the letter being answered.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub instructions: String,
    pub content: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl CompletionRequest {
    /// Ask `persona` to answer `body`, already truncated by the caller.
    pub fn letter_reply(persona: &Persona, body: &str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            instructions: persona.instructions.clone(),
            content: format!(
                "You have received the following letter. Compose a reply in character.\n\n---\n{body}\n---\n\nSign off as: {}",
                persona.sign_off
            ),
            max_tokens,
            temperature,
        }
    }
}

pub trait CompletionService: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generated text, trimmed. Empty output is an error.
    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;
}
