use std::fmt;

use super::dedup::DedupLedger;
use crate::mail::InboundMessage;
use crate::persona::{Persona, PersonaRegistry};

/// Sender fragments that mark bounce handlers and unattended senders.
const AUTOMATED_SENDERS: [&str; 4] = ["mailer-daemon", "postmaster", "noreply", "no-reply"];

/// `Precedence` values that mark mailing-list or bulk traffic.
const BULK_PRECEDENCE: [&str; 3] = ["bulk", "junk", "list"];

/// Why a message was passed over without a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    OwnEmail,
    AutomatedSender(String),
    AlreadyReplied(String),
    AutoSubmitted(String),
    Precedence(String),
    AutoResponseSuppress,
    EmptyBody,
    /// Sender address cannot be used as an SMTP recipient.
    UndeliverableSender(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnEmail => f.write_str("own email"),
            Self::AutomatedSender(marker) => write!(f, "automated sender ({marker})"),
            Self::AlreadyReplied(id) => write!(f, "already replied ({id})"),
            Self::AutoSubmitted(value) => write!(f, "auto-submitted ({value})"),
            Self::Precedence(value) => write!(f, "precedence {value}"),
            Self::AutoResponseSuppress => f.write_str("auto-response suppressed"),
            Self::EmptyBody => f.write_str("empty body"),
            Self::UndeliverableSender(address) => write!(f, "undeliverable sender ({address})"),
        }
    }
}

/// Skip-or-process decision over the agent's own identities.
#[derive(Debug, Clone)]
pub struct FilterChain {
    own_addresses: Vec<String>,
}

impl FilterChain {
    /// `account` plus every persona reply address count as the agent itself.
    /// Blank entries are dropped, since an empty fragment would match anyone.
    pub fn new<'a>(account: &'a str, persona_addresses: impl IntoIterator<Item = &'a str>) -> Self {
        let mut own_addresses: Vec<String> = std::iter::once(account)
            .chain(persona_addresses)
            .map(|addr| addr.trim().to_ascii_lowercase())
            .filter(|addr| !addr.is_empty())
            .collect();
        own_addresses.sort();
        own_addresses.dedup();
        Self { own_addresses }
    }

    pub fn for_registry(account: &str, registry: &PersonaRegistry) -> Self {
        Self::new(account, registry.addresses())
    }

    /// First matching rule wins; `None` means the message should be answered.
    pub fn should_skip(&self, message: &InboundMessage, ledger: &DedupLedger) -> Option<SkipReason> {
        let sender = message.sender.to_ascii_lowercase();

        if self.own_addresses.iter().any(|own| sender.contains(own.as_str())) {
            return Some(SkipReason::OwnEmail);
        }

        if let Some(marker) = AUTOMATED_SENDERS.iter().find(|m| sender.contains(*m)) {
            return Some(SkipReason::AutomatedSender((*marker).to_string()));
        }

        if let Some(id) = &message.message_id
            && ledger.has(id)
        {
            return Some(SkipReason::AlreadyReplied(id.clone()));
        }

        if let Some(value) = &message.markers.auto_submitted
            && !value.trim().eq_ignore_ascii_case("no")
        {
            return Some(SkipReason::AutoSubmitted(value.trim().to_string()));
        }

        if let Some(value) = &message.markers.precedence {
            let value = value.trim();
            if BULK_PRECEDENCE.iter().any(|b| value.eq_ignore_ascii_case(b)) {
                return Some(SkipReason::Precedence(value.to_ascii_lowercase()));
            }
        }

        if message.markers.auto_response_suppress.is_some() {
            return Some(SkipReason::AutoResponseSuppress);
        }

        None
    }
}

/// First alias candidate whose local part names a registered persona, else
/// the default.
pub fn resolve_persona<'r>(registry: &'r PersonaRegistry, message: &InboundMessage) -> &'r Persona {
    message
        .alias_candidates()
        .find_map(|addr| registry.for_address(addr))
        .unwrap_or_else(|| registry.default_persona())
}
