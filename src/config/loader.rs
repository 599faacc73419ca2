use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::UserDirs;

use super::Config;
use crate::agent::AgentSettings;
use crate::error::ConfigError;
use crate::mailbox::{IMAP_COMMAND_TIMEOUT, MailboxSettings, SMTP_TIMEOUT};
use crate::persona::PersonaRegistry;

const CONFIG_DIR_NAME: &str = ".persona-mailer";
const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state.json";

impl Config {
    /// Load `path`, or `~/.persona-mailer/config.toml` when none is given.
    /// A missing file is created from defaults. Environment overrides are
    /// applied after reading and the result is validated.
    pub fn load_or_init(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => expand_path(path),
            None => default_config_path()?,
        };

        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read a config file without env overrides. A missing file is written
    /// out with defaults first.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(&config_dir).with_context(|| {
                format!("Failed to create config directory {}", config_dir.display())
            })?;
        }

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(e.to_string()))
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            let config = Self::default();
            let rendered =
                toml::to_string_pretty(&config).context("Failed to serialize default config")?;
            fs::write(config_path, rendered)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            config
        };

        config.config_path = config_path.to_path_buf();
        config.config_dir = config_dir;
        Ok(config)
    }

    /// Checks that hold for every command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.global_per_hour == 0 || self.limits.per_sender_per_hour == 0 {
            return Err(ConfigError::Validation(
                "rate limits must allow at least one reply per hour".into(),
            ));
        }
        if self.agent.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "agent.poll_interval_secs must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::Validation(format!(
                "completion.temperature {} is outside 0.0..=2.0",
                self.completion.temperature
            )));
        }
        if self.limits.max_body_chars == 0 || self.limits.ledger_capacity == 0 {
            return Err(ConfigError::Validation(
                "limits.max_body_chars and limits.ledger_capacity must be positive".into(),
            ));
        }
        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Validation(format!(
                "log_level {:?} is not one of trace, debug, info, warn, error",
                self.log_level
            )));
        }
        self.registry()?;
        Ok(())
    }

    /// Extra checks before talking to the mail servers.
    pub fn validate_for_run(&self) -> Result<(), ConfigError> {
        let required = [
            ("account", self.account.as_str()),
            ("mailbox.imap_host", self.mailbox.imap_host.as_str()),
            ("mailbox.smtp_host", self.mailbox.smtp_host.as_str()),
            ("mailbox.username", self.mailbox.username.as_str()),
            ("mailbox.password", self.mailbox.password.as_str()),
            (
                "completion.api_key",
                self.completion.api_key.as_deref().unwrap_or(""),
            ),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }

    pub fn state_path(&self) -> PathBuf {
        match self.state_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => expand_path(Path::new(path)),
            None => self.config_dir.join(STATE_FILE_NAME),
        }
    }

    pub fn registry(&self) -> Result<PersonaRegistry, ConfigError> {
        PersonaRegistry::with_overrides(self.personas.clone(), &self.agent.default_persona)
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            account: self.account.clone(),
            global_per_hour: self.limits.global_per_hour,
            per_sender_per_hour: self.limits.per_sender_per_hour,
            banned_keywords: self.limits.banned_keywords.clone(),
            max_body_chars: self.limits.max_body_chars,
            ledger_capacity: self.limits.ledger_capacity,
            record_retention: chrono::Duration::hours(i64::from(
                self.limits.record_retention_hours,
            )),
            poll_interval: Duration::from_secs(self.agent.poll_interval_secs),
            send_pause: Duration::from_millis(self.agent.send_pause_ms),
            completion_timeout: Duration::from_secs(self.completion.timeout_secs),
            max_tokens: self.completion.max_tokens,
            temperature: self.completion.temperature,
            message_id_domain: self
                .agent
                .message_id_domain
                .clone()
                .filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn mailbox_settings(&self) -> MailboxSettings {
        MailboxSettings {
            imap_host: self.mailbox.imap_host.clone(),
            imap_port: self.mailbox.imap_port,
            imap_folder: self.mailbox.imap_folder.clone(),
            smtp_host: self.mailbox.smtp_host.clone(),
            smtp_port: self.mailbox.smtp_port,
            smtp_tls: self.mailbox.smtp_tls,
            username: self.mailbox.username.clone(),
            password: self.mailbox.password.clone(),
            imap_timeout: IMAP_COMMAND_TIMEOUT,
            smtp_timeout: SMTP_TIMEOUT,
        }
    }
}

fn default_config_path() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
