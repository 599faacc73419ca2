use super::Config;

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Non-empty `PERSONA_MAILER_*` variables win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(account) = non_empty("PERSONA_MAILER_ACCOUNT") {
            self.account = account;
        }

        if let Some(username) = non_empty("PERSONA_MAILER_MAIL_USERNAME") {
            self.mailbox.username = username;
        }

        if let Some(password) = non_empty("PERSONA_MAILER_MAIL_PASSWORD") {
            self.mailbox.password = password;
        }

        if let Some(host) = non_empty("PERSONA_MAILER_IMAP_HOST") {
            self.mailbox.imap_host = host;
        }

        if let Some(host) = non_empty("PERSONA_MAILER_SMTP_HOST") {
            self.mailbox.smtp_host = host;
        }

        if let Some(key) =
            non_empty("PERSONA_MAILER_API_KEY").or_else(|| non_empty("DEEPSEEK_API_KEY"))
        {
            self.completion.api_key = Some(key);
        }

        if let Some(url) = non_empty("PERSONA_MAILER_BASE_URL") {
            self.completion.base_url = url;
        }

        if let Some(model) = non_empty("PERSONA_MAILER_MODEL") {
            self.completion.model = model;
        }

        if let Some(secs) = non_empty("PERSONA_MAILER_POLL_SECS")
            && let Ok(secs) = secs.trim().parse::<u64>()
            && secs > 0
        {
            self.agent.poll_interval_secs = secs;
        }

        if let Some(path) = non_empty("PERSONA_MAILER_STATE_PATH") {
            self.state_path = Some(path);
        }
    }
}
