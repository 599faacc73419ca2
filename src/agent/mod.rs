pub mod clock;
pub mod content;
pub mod dedup;
pub mod filter;
pub mod orchestrator;
pub mod rate_limit;
pub mod state;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::ContentPolicy;
pub use dedup::DedupLedger;
pub use filter::{FilterChain, SkipReason, resolve_persona};
pub use orchestrator::{AgentSettings, CycleReport, MessageOutcome, ReplyAgent, ReplyKind};
pub use rate_limit::{RateDecision, RateLimiter};
pub use state::{AgentState, ReplyRecord, StateSnapshot};
pub use store::{JsonFileStateStore, StateStore};
