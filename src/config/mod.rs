mod env_overrides;
mod loader;
mod schema;
#[cfg(test)]
mod test_env;

pub use schema::{AgentConfig, CompletionConfig, Config, LimitsConfig, MailboxConfig};
