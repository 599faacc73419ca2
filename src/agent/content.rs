use crate::persona::Persona;

pub const DEFAULT_BANNED_KEYWORDS: [&str; 2] = ["inappropriate", "offensive"];

/// Local pre-check run before any text leaves for the completion service.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    banned: Vec<String>,
}

impl ContentPolicy {
    pub fn new<I, S>(banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned: banned
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// The first banned keyword found in `text`, case-insensitively.
    pub fn violation(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.banned
            .iter()
            .find(|keyword| haystack.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_KEYWORDS)
    }
}

/// Sent instead of a generated reply when the content check rejects a letter.
pub fn decline_text(persona: &Persona) -> String {
    format!(
        "Thank you for your email. Unfortunately, I'm unable to respond to this particular message.\n\n{}",
        persona.sign_off
    )
}

/// Sent when the completion service fails, times out or returns nothing.
pub fn unavailable_text(persona: &Persona) -> String {
    format!(
        "My apologies, I am temporarily indisposed and unable to compose a proper reply. Please try again shortly.\n\n{}",
        persona.sign_off
    )
}

/// Cut `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
