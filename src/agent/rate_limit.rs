use chrono::{DateTime, Duration, Utc};

use super::state::ReplyRecord;

/// Sliding window both caps are measured over.
pub const RATE_WINDOW: Duration = Duration::hours(1);

pub const DEFAULT_GLOBAL_PER_HOUR: u32 = 10;
pub const DEFAULT_PER_SENDER_PER_HOUR: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    GlobalExhausted { count: usize },
    SenderExhausted { sender: String, count: usize },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Two-tier cap over the reply log: everyone, then one correspondent.
///
/// Holds no history of its own. The reply log in `AgentState` is the single
/// source of truth, so a decision depends only on the log and `now`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    global_max: u32,
    per_sender_max: u32,
}

impl RateLimiter {
    pub fn new(global_max: u32, per_sender_max: u32) -> Self {
        Self {
            global_max: global_max.max(1),
            per_sender_max: per_sender_max.max(1),
        }
    }

    pub fn allow(&self, log: &[ReplyRecord], correspondent: &str, now: DateTime<Utc>) -> RateDecision {
        let cutoff = now - RATE_WINDOW;
        let recent: Vec<&ReplyRecord> = log.iter().filter(|r| r.time > cutoff).collect();

        if recent.len() >= usize::try_from(self.global_max).unwrap_or(usize::MAX) {
            return RateDecision::GlobalExhausted {
                count: recent.len(),
            };
        }

        let from_sender = recent
            .iter()
            .filter(|r| r.sender.eq_ignore_ascii_case(correspondent))
            .count();
        if from_sender >= usize::try_from(self.per_sender_max).unwrap_or(usize::MAX) {
            return RateDecision::SenderExhausted {
                sender: correspondent.to_ascii_lowercase(),
                count: from_sender,
            };
        }

        RateDecision::Allow
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_PER_HOUR, DEFAULT_PER_SENDER_PER_HOUR)
    }
}
