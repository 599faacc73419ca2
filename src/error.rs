use std::time::Duration;

use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `persona-mailer`.
///
/// Each subsystem defines its own error variant. The orchestrator matches on
/// these to decide whether a failure ends the cycle or only the current
/// message; application glue continues to use `anyhow::Result` for ad-hoc
/// context chains.
#[derive(Debug, Error)]
pub enum MailerError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Mailbox (IMAP / SMTP) ────────────────────────────────────────────
    #[error("mailbox: {0}")]
    Mailbox(#[from] MailboxError),

    // ── Completion service ──────────────────────────────────────────────
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),

    // ── Durable state ───────────────────────────────────────────────────
    #[error("state: {0}")]
    State(#[from] StateError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate persona key: {0}")]
    DuplicatePersona(String),

    #[error("default persona {0} is not registered")]
    MissingDefaultPersona(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Mailbox errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("imap {command} rejected: {message}")]
    Rejected { command: String, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("message {0} not returned by server")]
    MissingMessage(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MailboxError {
    /// Connection and authentication problems make the whole mailbox
    /// unusable for the rest of the cycle.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Auth(_) | Self::Timeout { .. } | Self::Io(_)
        )
    }
}

// ─── Completion errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{provider} API key not set")]
    MissingApiKey { provider: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("{provider} returned an empty completion")]
    Empty { provider: String },
}

// ─── State errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, MailerError>;
