use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use persona_mailer::agent::{AgentState, JsonFileStateStore, ReplyAgent, StateStore};
use persona_mailer::completion::OpenAiCompatibleClient;
use persona_mailer::config::Config;
use persona_mailer::mailbox::ImapSmtpMailbox;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::status::{render_personas, render_state};
use crate::cli::commands::{Cli, Commands};

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Run => run_agent(&config, false).await,
        Commands::Once => run_agent(&config, true).await,
        Commands::Personas => {
            println!("{}", render_personas(&config.registry()?));
            Ok(())
        }
        Commands::State => {
            let store = JsonFileStateStore::new(config.state_path());
            let snapshot = store
                .load()
                .with_context(|| format!("Failed to read state from {}", store.path().display()))?;
            let state = AgentState::from_snapshot(snapshot, config.limits.ledger_capacity);
            println!("{}", render_state(&state, store.path(), chrono::Utc::now()));
            Ok(())
        }
    }
}

fn build_agent(config: &Config) -> Result<ReplyAgent> {
    config.validate_for_run()?;

    let registry = config.registry()?;
    let mailbox = ImapSmtpMailbox::new(config.mailbox_settings())
        .context("Failed to configure SMTP transport")?;
    let completion = OpenAiCompatibleClient::new(
        "deepseek",
        &config.completion.base_url,
        config.completion.api_key.as_deref(),
        &config.completion.model,
        Duration::from_secs(config.completion.timeout_secs),
    );
    let store = JsonFileStateStore::new(config.state_path());

    Ok(ReplyAgent::new(
        Box::new(mailbox),
        Arc::new(completion),
        Box::new(store),
        registry,
        config.agent_settings(),
    ))
}

async fn run_agent(config: &Config, once: bool) -> Result<()> {
    let mut agent = build_agent(config)?;

    info!(
        account = %config.account,
        imap = %config.mailbox.imap_host,
        personas = agent.registry().len(),
        state = %config.state_path().display(),
        "reply agent starting"
    );

    if once {
        let report = agent.run_cycle().await?;
        info!(
            unseen = report.unseen,
            replied = report.replied,
            skipped = report.skipped,
            deferred = report.deferred,
            failed = report.failed,
            "cycle complete"
        );
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current cycle");
        }
        signal_token.cancel();
    });

    agent.run_forever(shutdown).await;
    Ok(())
}
