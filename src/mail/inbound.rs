use mail_parser::{HeaderValue, Message, MessageParser};

use crate::error::MailboxError;

/// Loop-prevention headers carried by an inbound message, raw values as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopMarkers {
    pub auto_submitted: Option<String>,
    pub precedence: Option<String>,
    pub auto_response_suppress: Option<String>,
}

/// One unseen message as read from the mailbox. Never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// `Message-ID` without angle brackets.
    pub message_id: Option<String>,
    /// Lowercased sender address.
    pub sender: String,
    /// Addresses from the primary `To` header, in header order.
    pub recipients: Vec<String>,
    /// `Delivered-To` addresses followed by `X-Original-To` addresses.
    pub delivered_to: Vec<String>,
    pub subject: Option<String>,
    pub body: String,
    pub markers: LoopMarkers,
}

impl InboundMessage {
    /// Parse a raw RFC 5322 message.
    pub fn parse(raw: &[u8]) -> Result<Self, MailboxError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| MailboxError::Protocol("message could not be parsed".into()))?;

        let sender = message
            .from()
            .and_then(|from| from.first())
            .and_then(|addr| addr.address())
            .map(|addr| addr.trim().to_ascii_lowercase())
            .filter(|addr| !addr.is_empty())
            .ok_or_else(|| MailboxError::Protocol("message has no sender address".into()))?;

        let recipients = message
            .to()
            .map(|to| {
                to.iter()
                    .filter_map(|addr| addr.address())
                    .map(|addr| addr.trim().to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        let delivered_to = message
            .header_values("Delivered-To")
            .chain(message.header_values("X-Original-To"))
            .filter_map(HeaderValue::as_text)
            .filter_map(extract_address)
            .collect();

        Ok(Self {
            message_id: message
                .message_id()
                .map(|id| id.trim().trim_matches(['<', '>']).to_string())
                .filter(|id| !id.is_empty()),
            sender,
            recipients,
            delivered_to,
            subject: message.subject().map(str::to_string),
            body: message
                .body_text(0)
                .map(|text| text.into_owned())
                .unwrap_or_default(),
            markers: LoopMarkers {
                auto_submitted: raw_header(&message, "Auto-Submitted"),
                precedence: raw_header(&message, "Precedence"),
                auto_response_suppress: raw_header(&message, "X-Auto-Response-Suppress"),
            },
        })
    }

    /// Candidate alias addresses in resolution order: `To`, then delivery headers.
    pub fn alias_candidates(&self) -> impl Iterator<Item = &str> {
        self.recipients
            .iter()
            .chain(self.delivered_to.iter())
            .map(String::as_str)
    }
}

/// Unparsed header value, folding whitespace trimmed. Blank counts as absent.
fn raw_header(message: &Message<'_>, name: &str) -> Option<String> {
    message
        .header_raw(name)
        .map(|value| value.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|value| !value.is_empty())
}

/// `Name <user@host>` or bare `user@host` to lowercase `user@host`.
fn extract_address(value: &str) -> Option<String> {
    let candidate = match (value.find('<'), value.rfind('>')) {
        (Some(start), Some(end)) if start < end => &value[start + 1..end],
        _ => value,
    };
    let candidate = candidate.trim();
    candidate
        .contains('@')
        .then(|| candidate.to_ascii_lowercase())
}
