use serde::{Deserialize, Serialize};

use crate::models::{string_enum, Sentiment};

/// Outcome tag reported for every call that runs its full script.
pub const QUOTE_REQUESTED: &str = "quote_requested";

string_enum! {
    /// States of one simulated call.
    ///
    /// `Dialing -> Connected -> (Talking | Listening)* -> Completed`. `Failed`
    /// is only reached through [`crate::voice::VoiceAgent::force_failure`].
    CallStatus, "call status" {
        Dialing => "dialing",
        Connected => "connected",
        Talking => "talking",
        Listening => "listening",
        Completed => "completed",
        Failed => "failed",
    }
}

impl CallStatus {
    /// Connected, talking or listening: the states in which the line is open
    /// and the duration counter runs.
    pub fn is_on_line(&self) -> bool {
        matches!(
            self,
            CallStatus::Connected | CallStatus::Talking | CallStatus::Listening
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }
}

string_enum! {
    Speaker, "speaker" {
        Ai => "ai",
        Customer => "customer",
    }
}

impl Speaker {
    /// Label used in transcript text.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Ai => "AI",
            Speaker::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub message: String,
}

impl std::fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.speaker.label(), self.message)
    }
}

/// One simulated outbound call. Lives in memory only: it is either discarded
/// or moved into the agent's history when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub id: String,
    pub lead_id: String,
    pub status: CallStatus,
    /// Elapsed seconds on the line.
    pub duration: u64,
    pub transcript: Vec<TranscriptLine>,
    pub sentiment: Sentiment,
    pub key_points: Vec<String>,
    pub next_action: String,
}

impl CallSession {
    pub fn new(id: String, lead_id: String) -> Self {
        Self {
            id,
            lead_id,
            status: CallStatus::Dialing,
            duration: 0,
            transcript: Vec::new(),
            sentiment: Sentiment::Neutral,
            key_points: Vec::new(),
            next_action: String::new(),
        }
    }

    /// Transcript lines joined with newlines, "Speaker: message" each.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Fixed wrap-up applied when the script runs to the end. The values are
    /// not derived from what was said.
    pub(crate) fn complete(&mut self) {
        self.status = CallStatus::Completed;
        self.sentiment = Sentiment::Positive;
        self.key_points = vec![
            "Anniversary celebration".to_string(),
            "Confirmed budget and dates".to_string(),
            "Interested in sunset views".to_string(),
            "Requested detailed quote".to_string(),
        ];
        self.next_action = "Send detailed quote via email".to_string();
    }
}

/// Reported once for every session that reaches `Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub lead_id: String,
    pub transcript: String,
    pub outcome: String,
}

/// "m:ss" as shown next to a live call.
pub fn format_call_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
