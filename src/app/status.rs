use std::path::Path;

use chrono::{DateTime, Utc};
use persona_mailer::agent::AgentState;
use persona_mailer::agent::rate_limit::RATE_WINDOW;
use persona_mailer::persona::PersonaRegistry;

pub fn render_personas(registry: &PersonaRegistry) -> String {
    let default_key = registry.default_persona().key.as_str();
    let width = registry.iter().map(|p| p.key.len()).max().unwrap_or(0);

    let mut lines = vec![format!("◆ Personas ({})", registry.len()), String::new()];
    for persona in registry.iter() {
        let marker = if persona.key == default_key { "*" } else { " " };
        lines.push(format!(
            " {marker} {:<width$}  {} <{}>",
            persona.key, persona.display_name, persona.address
        ));
    }
    lines.push(String::new());
    lines.push("  * default for unmatched recipients".to_string());
    lines.join("\n")
}

pub fn render_state(state: &AgentState, path: &Path, now: DateTime<Utc>) -> String {
    let last_reply = state
        .reply_log
        .last()
        .map_or_else(|| "never".to_string(), |r| r.time.to_rfc3339());

    [
        "◆ Agent state".to_string(),
        String::new(),
        format!("  File             {}", path.display()),
        format!(
            "  Replied ids      {} / {}",
            state.ledger.len(),
            state.ledger.capacity()
        ),
        format!("  Reply records    {}", state.reply_log.len()),
        format!("  Replies (1h)     {}", state.replies_within(now, RATE_WINDOW)),
        format!("  Last reply       {last_reply}"),
    ]
    .join("\n")
}
