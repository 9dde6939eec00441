use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{InteractionKind, Lead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    FormSubmission,
    AiCall,
    Whatsapp,
    Email,
    Call,
    FollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub kind: TimelineKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

fn event(
    kind: TimelineKind,
    title: &str,
    description: String,
    timestamp: DateTime<Utc>,
) -> TimelineEvent {
    TimelineEvent {
        kind,
        title: title.to_string(),
        description,
        timestamp,
    }
}

/// Activity history for the lead detail view: the standard follow-up
/// sequence anchored on `created_at`, plus every recorded call transcript and
/// interaction, oldest first.
pub fn lead_timeline(lead: &Lead) -> Vec<TimelineEvent> {
    let mut events = vec![
        event(
            TimelineKind::FormSubmission,
            "Lead Form Submitted",
            "Initial inquiry submitted via website".to_string(),
            lead.created_at,
        ),
        event(
            TimelineKind::AiCall,
            "AI Assistant Call",
            "Automated call initiated within 30 seconds".to_string(),
            lead.created_at + Duration::seconds(30),
        ),
        event(
            TimelineKind::Whatsapp,
            "WhatsApp Message Sent",
            "Villa details and pricing sent via WhatsApp".to_string(),
            lead.created_at + Duration::minutes(5),
        ),
        event(
            TimelineKind::FollowUp,
            "Follow-up Required",
            "AI recommends human agent follow-up".to_string(),
            lead.last_contact,
        ),
    ];

    for t in &lead.call_transcripts {
        events.push(event(
            TimelineKind::AiCall,
            "Call Transcript",
            format!(
                "{} call, {}s, {} sentiment",
                t.agent_type, t.duration, t.sentiment
            ),
            t.created_at,
        ));
    }

    for i in &lead.interactions {
        let kind = match i.kind {
            InteractionKind::Call => TimelineKind::Call,
            InteractionKind::Whatsapp => TimelineKind::Whatsapp,
            InteractionKind::Email => TimelineKind::Email,
            InteractionKind::Form => TimelineKind::FormSubmission,
        };
        events.push(event(
            kind,
            &format!("{} {}", i.direction, i.kind),
            i.content.clone(),
            i.created_at,
        ));
    }

    // Stable: ties keep the order above.
    events.sort_by_key(|e| e.timestamp);
    events
}
