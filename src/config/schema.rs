use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::agent::content::DEFAULT_BANNED_KEYWORDS;
use crate::agent::dedup::DEFAULT_LEDGER_CAPACITY;
use crate::agent::rate_limit::{DEFAULT_GLOBAL_PER_HOUR, DEFAULT_PER_SENDER_PER_HOUR};
use crate::agent::state::DEFAULT_RECORD_RETENTION_HOURS;
use crate::completion::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::persona::{DEFAULT_PERSONA_KEY, Persona};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Directory holding config.toml and, by default, the state file
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Address of the mailbox the agent reads. Mail from it is never answered.
    #[serde(default)]
    pub account: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Defaults to `<config dir>/state.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,

    #[serde(default)]
    pub mailbox: MailboxConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    /// Added to, or replacing by key, the built-in personas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<Persona>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            config_dir: PathBuf::new(),
            account: String::new(),
            log_level: default_log_level(),
            state_path: None,
            mailbox: MailboxConfig::default(),
            completion: CompletionConfig::default(),
            limits: LimitsConfig::default(),
            agent: AgentConfig::default(),
            personas: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    #[serde(default)]
    pub imap_host: String,
    /// IMAPS port (default: 993)
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,
    #[serde(default = "default_imap_folder")]
    pub imap_folder: String,
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP port (default: 465)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Implicit TLS when true, STARTTLS when false (default: true)
    #[serde(default = "default_true")]
    pub smtp_tls: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            imap_host: String::new(),
            imap_port: default_imap_port(),
            imap_folder: default_imap_folder(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_tls: true,
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_global_per_hour")]
    pub global_per_hour: u32,
    #[serde(default = "default_per_sender_per_hour")]
    pub per_sender_per_hour: u32,
    /// Letter text beyond this many characters is not sent for generation.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
    #[serde(default = "default_record_retention_hours")]
    pub record_retention_hours: u32,
    #[serde(default = "default_banned_keywords")]
    pub banned_keywords: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            global_per_hour: DEFAULT_GLOBAL_PER_HOUR,
            per_sender_per_hour: DEFAULT_PER_SENDER_PER_HOUR,
            max_body_chars: default_max_body_chars(),
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            record_retention_hours: default_record_retention_hours(),
            banned_keywords: default_banned_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Pause between successive sends within one cycle
    #[serde(default = "default_send_pause_ms")]
    pub send_pause_ms: u64,
    #[serde(default = "default_persona")]
    pub default_persona: String,
    /// Domain for outbound `Message-ID`s; the persona's own domain when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id_domain: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            send_pause_ms: default_send_pause_ms(),
            default_persona: default_persona(),
            message_id_domain: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_imap_port() -> u16 {
    993
}

fn default_imap_folder() -> String {
    "INBOX".into()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_global_per_hour() -> u32 {
    DEFAULT_GLOBAL_PER_HOUR
}

fn default_per_sender_per_hour() -> u32 {
    DEFAULT_PER_SENDER_PER_HOUR
}

fn default_max_body_chars() -> usize {
    2000
}

fn default_ledger_capacity() -> usize {
    DEFAULT_LEDGER_CAPACITY
}

fn default_record_retention_hours() -> u32 {
    u32::try_from(DEFAULT_RECORD_RETENTION_HOURS).unwrap_or(24)
}

fn default_banned_keywords() -> Vec<String> {
    DEFAULT_BANNED_KEYWORDS.iter().map(ToString::to_string).collect()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_send_pause_ms() -> u64 {
    2000
}

fn default_persona() -> String {
    DEFAULT_PERSONA_KEY.into()
}
