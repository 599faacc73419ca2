use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::clock::{Clock, SystemClock};
use super::content::{ContentPolicy, decline_text, truncate_chars, unavailable_text};
use super::dedup::DEFAULT_LEDGER_CAPACITY;
use super::filter::{FilterChain, SkipReason, resolve_persona};
use super::rate_limit::{RateDecision, RateLimiter};
use super::state::{AgentState, DEFAULT_RECORD_RETENTION_HOURS};
use super::store::StateStore;
use crate::completion::{
    CompletionRequest, CompletionService, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::error::MailerError;
use crate::mail::{InboundMessage, OutboundReply, recipient_mailbox};
use crate::mailbox::{Mailbox, MessageHandle};
use crate::persona::{Persona, PersonaRegistry};

/// Consecutive failed cycles after which mailbox trouble is logged at `error`.
const FAILURE_ESCALATION_THRESHOLD: u32 = 5;

fn is_escalated(consecutive_failures: u32) -> bool {
    consecutive_failures >= FAILURE_ESCALATION_THRESHOLD
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Mailbox address the agent itself reads; never answered.
    pub account: String,
    pub global_per_hour: u32,
    pub per_sender_per_hour: u32,
    pub banned_keywords: Vec<String>,
    pub max_body_chars: usize,
    pub ledger_capacity: usize,
    pub record_retention: chrono::Duration,
    pub poll_interval: Duration,
    pub send_pause: Duration,
    pub completion_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Overrides the persona address domain in fresh `Message-ID`s.
    pub message_id_domain: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            account: String::new(),
            global_per_hour: super::rate_limit::DEFAULT_GLOBAL_PER_HOUR,
            per_sender_per_hour: super::rate_limit::DEFAULT_PER_SENDER_PER_HOUR,
            banned_keywords: super::content::DEFAULT_BANNED_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_body_chars: 2000,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            record_retention: chrono::Duration::hours(DEFAULT_RECORD_RETENTION_HOURS),
            poll_interval: Duration::from_secs(30),
            send_pause: Duration::from_secs(2),
            completion_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            message_id_domain: None,
        }
    }
}

/// Where the body of a sent reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Generated,
    /// Content check rejected the letter.
    Declined,
    /// Completion failed, timed out or returned nothing.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Replied { persona: String, kind: ReplyKind },
    Skipped(SkipReason),
    Deferred(RateDecision),
    FetchFailed,
    Unparseable,
    SendFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub unseen: usize,
    pub replied: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub failed: usize,
    pub state_saved: bool,
}

impl CycleReport {
    fn tally(&mut self, outcome: &MessageOutcome) {
        match outcome {
            MessageOutcome::Replied { .. } => self.replied += 1,
            MessageOutcome::Skipped(_) | MessageOutcome::Unparseable => self.skipped += 1,
            MessageOutcome::Deferred(_) => self.deferred += 1,
            MessageOutcome::FetchFailed | MessageOutcome::SendFailed => self.failed += 1,
        }
    }
}

/// Fetch, filter, rate-check, generate, send and record, one message at a
/// time. No per-message failure ends a cycle.
pub struct ReplyAgent {
    mailbox: Box<dyn Mailbox>,
    completion: Arc<dyn CompletionService>,
    store: Box<dyn StateStore>,
    registry: PersonaRegistry,
    filter: FilterChain,
    limiter: RateLimiter,
    content: ContentPolicy,
    settings: AgentSettings,
    clock: Arc<dyn Clock>,
    sends_this_cycle: usize,
}

impl ReplyAgent {
    pub fn new(
        mailbox: Box<dyn Mailbox>,
        completion: Arc<dyn CompletionService>,
        store: Box<dyn StateStore>,
        registry: PersonaRegistry,
        settings: AgentSettings,
    ) -> Self {
        Self {
            filter: FilterChain::for_registry(&settings.account, &registry),
            limiter: RateLimiter::new(settings.global_per_hour, settings.per_sender_per_hour),
            content: ContentPolicy::new(&settings.banned_keywords),
            mailbox,
            completion,
            store,
            registry,
            settings,
            clock: Arc::new(SystemClock),
            sends_this_cycle: 0,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// One full cycle. State is loaded first and, once loaded, saved on every
    /// path. A load failure aborts before anything is overwritten.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, MailerError> {
        let snapshot = self.store.load()?;
        let mut state = AgentState::from_snapshot(snapshot, self.settings.ledger_capacity);
        self.sends_this_cycle = 0;

        let result = self.process_batch(&mut state).await;
        self.mailbox.close().await;

        state.prune(self.clock.now(), self.settings.record_retention);
        let saved = match self.store.save(&state.snapshot()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist agent state");
                false
            }
        };

        result.map(|mut report| {
            report.state_saved = saved;
            report
        })
    }

    /// Poll until `shutdown` fires. Cancellation is observed only while
    /// sleeping between cycles.
    pub async fn run_forever(&mut self, shutdown: CancellationToken) {
        let mut consecutive_failures: u32 = 0;

        while !shutdown.is_cancelled() {
            match self.run_cycle().await {
                Ok(report) => {
                    consecutive_failures = 0;
                    if report.unseen > 0 {
                        tracing::info!(
                            unseen = report.unseen,
                            replied = report.replied,
                            skipped = report.skipped,
                            deferred = report.deferred,
                            failed = report.failed,
                            "cycle complete"
                        );
                    } else {
                        tracing::debug!("no unseen messages");
                    }
                }
                Err(MailerError::Mailbox(e)) => {
                    consecutive_failures += 1;
                    if is_escalated(consecutive_failures) {
                        tracing::error!(
                            failures = consecutive_failures,
                            error = %e,
                            "mailbox unreachable for consecutive cycles"
                        );
                    } else {
                        tracing::warn!(error = %e, "cycle aborted, retrying after poll interval");
                    }
                }
                Err(e) => tracing::error!(error = %e, "cycle aborted"),
            }

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        tracing::info!("reply agent stopped");
    }

    async fn process_batch(&mut self, state: &mut AgentState) -> Result<CycleReport, MailerError> {
        let handles = self.mailbox.search_unseen().await?;
        let mut report = CycleReport {
            unseen: handles.len(),
            ..CycleReport::default()
        };

        for handle in &handles {
            let outcome = self.process_one(state, handle).await;
            report.tally(&outcome);
        }

        Ok(report)
    }

    async fn process_one(&mut self, state: &mut AgentState, handle: &MessageHandle) -> MessageOutcome {
        let raw = match self.mailbox.fetch(handle).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(uid = %handle, error = %e, "failed to fetch message");
                return MessageOutcome::FetchFailed;
            }
        };

        let message = match InboundMessage::parse(&raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(uid = %handle, error = %e, "unparseable message");
                self.mark_seen(handle).await;
                return MessageOutcome::Unparseable;
            }
        };

        if let Some(reason) = self.filter.should_skip(&message, &state.ledger) {
            tracing::info!(uid = %handle, sender = %message.sender, reason = %reason, "skipping message");
            self.mark_seen(handle).await;
            return MessageOutcome::Skipped(reason);
        }

        let decision = self
            .limiter
            .allow(&state.reply_log, &message.sender, self.clock.now());
        if !decision.is_allowed() {
            tracing::warn!(uid = %handle, sender = %message.sender, decision = ?decision, "rate limit reached, deferring");
            return MessageOutcome::Deferred(decision);
        }

        let persona = resolve_persona(&self.registry, &message).clone();

        if message.body.trim().is_empty() {
            tracing::info!(uid = %handle, sender = %message.sender, "skipping message with empty body");
            self.mark_seen(handle).await;
            return MessageOutcome::Skipped(SkipReason::EmptyBody);
        }

        if let Err(e) = recipient_mailbox(&message.sender) {
            tracing::warn!(uid = %handle, error = %e, "sender cannot receive a reply");
            self.mark_seen(handle).await;
            return MessageOutcome::Skipped(SkipReason::UndeliverableSender(message.sender));
        }

        tracing::info!(
            sender = %message.sender,
            subject = message.subject.as_deref().unwrap_or(""),
            persona = %persona.key,
            "processing message"
        );

        let (body, kind) = self.compose(&persona, &message).await;
        let domain = self
            .settings
            .message_id_domain
            .as_deref()
            .unwrap_or_else(|| persona.domain());
        let reply = OutboundReply::for_message(&message, &persona, body, domain);

        if self.sends_this_cycle > 0 && !self.settings.send_pause.is_zero() {
            tokio::time::sleep(self.settings.send_pause).await;
        }
        self.sends_this_cycle += 1;

        if let Err(e) = self.mailbox.send(&reply).await {
            tracing::error!(uid = %handle, to = %reply.to, error = %e, "failed to send reply");
            return MessageOutcome::SendFailed;
        }

        state.record_reply(
            &message.sender,
            &reply.message_id,
            message.message_id.as_deref(),
            self.clock.now(),
        );
        self.mark_seen(handle).await;
        tracing::info!(to = %reply.to, persona = %persona.key, kind = ?kind, "reply sent");

        MessageOutcome::Replied {
            persona: persona.key,
            kind,
        }
    }

    async fn compose(&self, persona: &Persona, message: &InboundMessage) -> (String, ReplyKind) {
        if let Some(keyword) = self.content.violation(&message.body) {
            tracing::warn!(sender = %message.sender, keyword, "content check rejected message");
            return (decline_text(persona), ReplyKind::Declined);
        }

        let body = truncate_chars(&message.body, self.settings.max_body_chars);
        let request = CompletionRequest::letter_reply(
            persona,
            body,
            self.settings.max_tokens,
            self.settings.temperature,
        );

        let timeout = self.settings.completion_timeout;
        match tokio::time::timeout(timeout, self.completion.complete(&request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => (text, ReplyKind::Generated),
            Ok(Ok(_)) => {
                tracing::warn!(provider = self.completion.name(), "completion returned no text");
                (unavailable_text(persona), ReplyKind::Unavailable)
            }
            Ok(Err(e)) => {
                tracing::error!(provider = self.completion.name(), error = %e, "completion failed");
                (unavailable_text(persona), ReplyKind::Unavailable)
            }
            Err(_) => {
                tracing::error!(provider = self.completion.name(), ?timeout, "completion timed out");
                (unavailable_text(persona), ReplyKind::Unavailable)
            }
        }
    }

    async fn mark_seen(&mut self, handle: &MessageHandle) {
        if let Err(e) = self.mailbox.mark_seen(handle).await {
            tracing::warn!(uid = %handle, error = %e, "failed to flag message as seen");
        }
    }
}
