//! Simulated AI voice agent for outbound lead calls.

pub mod agent;
pub mod scheduler;
pub mod script;
pub mod session;

pub use agent::{AgentEvent, AgentStatus, CallError, SkipReason, VoiceAgent};
pub use scheduler::{Scheduler, TaskId};
pub use script::{CallScript, ScriptLine};
pub use session::{
    format_call_duration, CallOutcome, CallSession, CallStatus, Speaker, TranscriptLine,
    QUOTE_REQUESTED,
};
