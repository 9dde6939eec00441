use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum;

string_enum! {
    LeadStatus, "lead status" {
        Hot => "hot",
        Warm => "warm",
        Cold => "cold",
        Booked => "booked",
        Lost => "lost",
    }
}

string_enum! {
    Sentiment, "sentiment" {
        Positive => "positive",
        Neutral => "neutral",
        Negative => "negative",
    }
}

string_enum! {
    AgentType, "agent type" {
        Ai => "ai",
        Human => "human",
    }
}

string_enum! {
    InteractionKind, "interaction type" {
        Call => "call",
        Whatsapp => "whatsapp",
        Email => "email",
        Form => "form",
    }
}

string_enum! {
    Direction, "direction" {
        Inbound => "inbound",
        Outbound => "outbound",
    }
}

string_enum! {
    AgentRole, "agent role" {
        Admin => "admin",
        Agent => "agent",
        Manager => "manager",
    }
}

string_enum! {
    AgentPresence, "agent presence" {
        Online => "online",
        Offline => "offline",
        Busy => "busy",
    }
}

/// A prospective guest tracked by the CRM. `score` and `status` are set by
/// hand; nothing in the crate derives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub villa_interest: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub budget: u64,
    pub status: LeadStatus,
    pub score: u8,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub last_contact: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub call_transcripts: Vec<CallTranscript>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTranscript {
    pub id: String,
    pub lead_id: String,
    pub duration: u64,
    pub transcript: String,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub agent_type: AgentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub lead_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub content: String,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub count: u32,
}

/// Headline CRM numbers shown on the analytics tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_leads: u32,
    pub conversion_rate: f64,
    pub avg_response_time: f64,
    pub hot_leads: u32,
    pub revenue_pipeline: u64,
    #[serde(default)]
    pub drop_off_reasons: Vec<ReasonCount>,
    #[serde(default)]
    pub intent_funnel: Vec<StageCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AgentRole,
    pub status: AgentPresence,
    pub avatar: String,
}
