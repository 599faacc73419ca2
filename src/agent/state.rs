use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::dedup::DedupLedger;

/// How long reply records are kept for rate-limit queries.
pub const DEFAULT_RECORD_RETENTION_HOURS: i64 = 24;

/// One sent reply, used only for rate-window queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub time: DateTime<Utc>,
    /// Correspondent the reply went to.
    pub sender: String,
    /// `Message-ID` of the outbound reply.
    #[serde(default)]
    pub message_id: Option<String>,
    /// `Message-ID` of the message being answered.
    #[serde(default)]
    pub in_reply_to: Option<String>,
}

/// Persisted form of [`AgentState`]. Unknown fields are ignored and missing
/// fields default, so older and newer files both load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub replied_ids: Vec<String>,
    #[serde(default)]
    pub reply_log: Vec<ReplyRecord>,
}

/// Cycle-scoped agent state: dedup ledger plus reply log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentState {
    pub ledger: DedupLedger,
    pub reply_log: Vec<ReplyRecord>,
}

impl AgentState {
    pub fn new(ledger_capacity: usize) -> Self {
        Self {
            ledger: DedupLedger::new(ledger_capacity),
            reply_log: Vec::new(),
        }
    }

    pub fn from_snapshot(snapshot: StateSnapshot, ledger_capacity: usize) -> Self {
        let mut reply_log = snapshot.reply_log;
        reply_log.sort_by_key(|record| record.time);
        Self {
            ledger: DedupLedger::from_ids(snapshot.replied_ids, ledger_capacity),
            reply_log,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            replied_ids: self.ledger.ids().map(str::to_string).collect(),
            reply_log: self.reply_log.clone(),
        }
    }

    /// Record a delivered reply. Timestamps never go backwards in the log.
    pub fn record_reply(
        &mut self,
        correspondent: &str,
        outbound_id: &str,
        original_id: Option<&str>,
        now: DateTime<Utc>,
    ) {
        let time = self
            .reply_log
            .last()
            .map_or(now, |last| last.time.max(now));
        self.reply_log.push(ReplyRecord {
            time,
            sender: correspondent.to_ascii_lowercase(),
            message_id: Some(outbound_id.to_string()),
            in_reply_to: original_id.map(str::to_string),
        });
        if let Some(id) = original_id {
            self.ledger.record(id);
        }
    }

    /// Drop records older than `retention`. `retention` is never shorter
    /// than the rate window, so the current window stays intact.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) {
        let retention = retention.max(super::rate_limit::RATE_WINDOW);
        let cutoff = now - retention;
        self.reply_log.retain(|record| record.time > cutoff);
    }

    /// Replies sent within `window` before `now`.
    pub fn replies_within(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = now - window;
        self.reply_log
            .iter()
            .filter(|record| record.time > cutoff)
            .count()
    }
}
