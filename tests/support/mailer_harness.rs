#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use persona_mailer::agent::{
    AgentSettings, ManualClock, ReplyAgent, StateSnapshot, StateStore,
};
use persona_mailer::completion::{CompletionRequest, CompletionService};
use persona_mailer::error::{CompletionError, MailboxError, StateError};
use persona_mailer::mail::OutboundReply;
use persona_mailer::mailbox::{Mailbox, MessageHandle};
use persona_mailer::persona::{DEFAULT_PERSONA_KEY, PersonaRegistry};

pub const ACCOUNT: &str = "agent@askian.net";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Mailbox ─────────────────────────────────────────────────────────────────

struct StoredMessage {
    uid: String,
    raw: Vec<u8>,
    seen: bool,
}

#[derive(Default)]
struct MailboxLog {
    messages: Vec<StoredMessage>,
    sent: Vec<OutboundReply>,
    next_uid: u32,
    fail_search: bool,
    fail_send: bool,
    fail_fetch: HashSet<String>,
    searches: usize,
    closes: usize,
}

/// In-memory mail store. Clones share one inbox so tests can inspect it
/// after handing a copy to the agent.
#[derive(Clone, Default)]
pub struct FakeMailbox {
    inner: Arc<Mutex<MailboxLog>>,
}

impl FakeMailbox {
    /// Drop a raw message into the inbox, returning its uid.
    pub fn deliver(&self, raw: impl Into<Vec<u8>>) -> String {
        let mut log = lock(&self.inner);
        log.next_uid += 1;
        let uid = log.next_uid.to_string();
        log.messages.push(StoredMessage {
            uid: uid.clone(),
            raw: raw.into(),
            seen: false,
        });
        uid
    }

    pub fn sent(&self) -> Vec<OutboundReply> {
        lock(&self.inner).sent.clone()
    }

    pub fn unseen(&self) -> Vec<String> {
        lock(&self.inner)
            .messages
            .iter()
            .filter(|m| !m.seen)
            .map(|m| m.uid.clone())
            .collect()
    }

    pub fn is_seen(&self, uid: &str) -> bool {
        lock(&self.inner)
            .messages
            .iter()
            .any(|m| m.uid == uid && m.seen)
    }

    pub fn searches(&self) -> usize {
        lock(&self.inner).searches
    }

    pub fn closes(&self) -> usize {
        lock(&self.inner).closes
    }

    pub fn fail_search(&self, fail: bool) {
        lock(&self.inner).fail_search = fail;
    }

    pub fn fail_send(&self, fail: bool) {
        lock(&self.inner).fail_send = fail;
    }

    pub fn fail_fetch(&self, uid: &str) {
        lock(&self.inner).fail_fetch.insert(uid.to_string());
    }
}

type MailboxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MailboxError>> + Send + 'a>>;

impl Mailbox for FakeMailbox {
    fn search_unseen(&mut self) -> MailboxFuture<'_, Vec<MessageHandle>> {
        let result = {
            let mut log = lock(&self.inner);
            log.searches += 1;
            if log.fail_search {
                Err(MailboxError::Connection {
                    endpoint: "imap.test:993".into(),
                    message: "connection refused".into(),
                })
            } else {
                Ok(log
                    .messages
                    .iter()
                    .filter(|m| !m.seen)
                    .map(|m| MessageHandle(m.uid.clone()))
                    .collect())
            }
        };
        Box::pin(async move { result })
    }

    fn fetch<'a>(&'a mut self, handle: &'a MessageHandle) -> MailboxFuture<'a, Vec<u8>> {
        let result = {
            let log = lock(&self.inner);
            if log.fail_fetch.contains(handle.as_str()) {
                Err(MailboxError::Protocol("fetch failed".into()))
            } else {
                log.messages
                    .iter()
                    .find(|m| m.uid == handle.as_str())
                    .map(|m| m.raw.clone())
                    .ok_or_else(|| MailboxError::MissingMessage(handle.to_string()))
            }
        };
        Box::pin(async move { result })
    }

    fn mark_seen<'a>(&'a mut self, handle: &'a MessageHandle) -> MailboxFuture<'a, ()> {
        if let Some(message) = lock(&self.inner)
            .messages
            .iter_mut()
            .find(|m| m.uid == handle.as_str())
        {
            message.seen = true;
        }
        Box::pin(async { Ok(()) })
    }

    fn send<'a>(&'a mut self, reply: &'a OutboundReply) -> MailboxFuture<'a, ()> {
        // Render exactly as the SMTP path would, so header problems surface.
        let result = reply.to_message().and_then(|_| {
            let mut log = lock(&self.inner);
            if log.fail_send {
                return Err(MailboxError::Send("relay refused".into()));
            }
            log.sent.push(reply.clone());
            Ok(())
        });
        Box::pin(async move { result })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        lock(&self.inner).closes += 1;
        Box::pin(async {})
    }
}

// ── Completion ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Fail,
    Hang,
}

/// Completion service that plays back one fixed behaviour and records requests.
pub struct ScriptedCompletion {
    script: Mutex<Script>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            script: Mutex::new(Script::Reply(text.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, script: Script) {
        *lock(&self.script) = script;
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }
}

impl CompletionService for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        lock(&self.requests).push(request.clone());
        let script = lock(&self.script).clone();
        Box::pin(async move {
            match script {
                Script::Reply(text) => Ok(text),
                Script::Fail => Err(CompletionError::Status {
                    provider: "scripted".into(),
                    status: 503,
                    message: "overloaded".into(),
                }),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".into())
                }
            }
        })
    }
}

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryStateStore {
    snapshot: Arc<Mutex<StateSnapshot>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStateStore {
    pub fn snapshot(&self) -> StateSnapshot {
        lock(&self.snapshot).clone()
    }

    pub fn saves(&self) -> usize {
        *lock(&self.saves)
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<StateSnapshot, StateError> {
        Ok(lock(&self.snapshot).clone())
    }

    fn save(&self, snapshot: &StateSnapshot) -> Result<(), StateError> {
        *lock(&self.snapshot) = snapshot.clone();
        *lock(&self.saves) += 1;
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

pub struct Harness {
    pub mailbox: FakeMailbox,
    pub completion: Arc<ScriptedCompletion>,
    pub store: MemoryStateStore,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            mailbox: FakeMailbox::default(),
            completion: Arc::new(ScriptedCompletion::replying("Generated reply.")),
            store: MemoryStateStore::default(),
            clock: Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).unwrap(),
            )),
        }
    }

    pub fn settings() -> AgentSettings {
        AgentSettings {
            account: ACCOUNT.into(),
            send_pause: Duration::ZERO,
            completion_timeout: Duration::from_millis(200),
            ..AgentSettings::default()
        }
    }

    pub fn agent(&self) -> ReplyAgent {
        self.agent_with(Self::settings())
    }

    pub fn agent_with(&self, settings: AgentSettings) -> ReplyAgent {
        self.agent_with_store(settings, Box::new(self.store.clone()))
    }

    pub fn agent_with_store(&self, settings: AgentSettings, store: Box<dyn StateStore>) -> ReplyAgent {
        let registry = PersonaRegistry::with_overrides(Vec::new(), DEFAULT_PERSONA_KEY).unwrap();
        ReplyAgent::new(
            Box::new(self.mailbox.clone()),
            self.completion.clone(),
            store,
            registry,
            settings,
        )
        .with_clock(self.clock.clone())
    }
}

// ── Messages ────────────────────────────────────────────────────────────────

/// A plain-text letter with optional extra header lines.
pub fn letter(from: &str, to: &str, id: &str, body: &str, extra: &[(&str, &str)]) -> Vec<u8> {
    let mut raw = format!(
        "From: {from}\r\nTo: {to}\r\nSubject: A question\r\nMessage-ID: <{id}>\r\n"
    );
    for (name, value) in extra {
        raw.push_str(&format!("{name}: {value}\r\n"));
    }
    raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    raw.push_str(body);
    raw.push_str("\r\n");
    raw.into_bytes()
}

pub fn simple(from: &str, to: &str, id: &str) -> Vec<u8> {
    letter(from, to, id, "Do you still play real tennis?", &[])
}
