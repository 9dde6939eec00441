//! The in-memory dataset every view works against.
//!
//! There is no storage layer: the dataset is either the built-in mock data or
//! a file given on the command line, and it lives for one process.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::*;
use crate::voice::CallSession;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot determine dataset format for {0} (use .json, .yaml, .yml or .toml)")]
    UnknownFormat(PathBuf),

    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("lead not found: {0}")]
    UnknownLead(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    pub fn detect_from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yaml" | "yml") => Some(Format::Yaml),
            Some("toml") => Some(Format::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub villas: Vec<Villa>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub leads: Vec<Lead>,
    pub analytics: Option<Analytics>,
}

impl Dataset {
    /// Load a dataset file, picking the parser from the extension.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let format = Format::detect_from_extension(path)
            .ok_or_else(|| DatasetError::UnknownFormat(path.to_path_buf()))?;

        let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::parse(&content, format).map_err(|message| DatasetError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        info!(
            "Loaded dataset {}: {} villas, {} bookings, {} leads",
            path.display(),
            dataset.villas.len(),
            dataset.bookings.len(),
            dataset.leads.len()
        );
        Ok(dataset)
    }

    pub fn parse(content: &str, format: Format) -> Result<Self, String> {
        match format {
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// The built-in data the dashboards ship with.
    pub fn mock() -> Self {
        Dataset {
            villas: mock_villas(),
            bookings: mock_bookings(),
            leads: mock_leads(),
            analytics: Some(mock_analytics()),
        }
    }

    pub fn villa(&self, id: &str) -> Option<&Villa> {
        self.villas.iter().find(|v| v.id == id)
    }

    pub fn villa_mut(&mut self, id: &str) -> Option<&mut Villa> {
        self.villas.iter_mut().find(|v| v.id == id)
    }

    pub fn booking(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn booking_mut(&mut self, id: &str) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| b.id == id)
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn lead_mut(&mut self, id: &str) -> Option<&mut Lead> {
        self.leads.iter_mut().find(|l| l.id == id)
    }

    /// Attach a finished call to its lead as a transcript plus an outbound
    /// call interaction. Score and status are left alone.
    pub fn record_call(
        &mut self,
        session: &CallSession,
        at: DateTime<Utc>,
    ) -> Result<(), DatasetError> {
        let lead = self
            .lead_mut(&session.lead_id)
            .ok_or_else(|| DatasetError::UnknownLead(session.lead_id.clone()))?;

        lead.call_transcripts.push(CallTranscript {
            id: session.id.clone(),
            lead_id: lead.id.clone(),
            duration: session.duration,
            transcript: session.transcript_text(),
            sentiment: session.sentiment,
            key_points: session.key_points.clone(),
            created_at: at,
            agent_type: AgentType::Ai,
        });
        lead.interactions.push(Interaction {
            id: format!("int_{}", uuid::Uuid::new_v4().simple()),
            lead_id: lead.id.clone(),
            kind: InteractionKind::Call,
            content: if session.next_action.is_empty() {
                format!("AI call {}", session.status)
            } else {
                format!("AI call {}: {}", session.status, session.next_action)
            },
            direction: Direction::Outbound,
            created_at: at,
            agent_id: None,
        });
        lead.last_contact = at;

        debug!("Recorded call {} on lead {}", session.id, lead.id);
        Ok(())
    }
}

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mock_villas() -> Vec<Villa> {
    vec![
        Villa {
            id: "villa_1".to_string(),
            name: "Luxury Beachfront Villa".to_string(),
            description: "Stunning oceanfront villa with private beach access".to_string(),
            location: "Seminyak Beach".to_string(),
            city: "Seminyak".to_string(),
            country: "Indonesia".to_string(),
            price_per_night: 850,
            max_guests: 8,
            bedrooms: 4,
            bathrooms: 4,
            amenities: strings(&["Private Pool", "Beach Access", "WiFi", "Air Conditioning"]),
            images: strings(&["https://images.unsplash.com/photo-1571896349842-33c89424de2d"]),
            owner_id: "owner_1".to_string(),
            status: VillaStatus::Active,
            created_at: ts(2024, 1, 1, 0, 0),
            updated_at: ts(2024, 1, 15, 0, 0),
        },
        Villa {
            id: "villa_2".to_string(),
            name: "Mountain Retreat Chalet".to_string(),
            description: "Cozy mountain chalet with panoramic views".to_string(),
            location: "Aspen Highlands".to_string(),
            city: "Aspen".to_string(),
            country: "USA".to_string(),
            price_per_night: 1200,
            max_guests: 10,
            bedrooms: 5,
            bathrooms: 4,
            amenities: strings(&["Ski Access", "Fireplace", "Hot Tub", "WiFi"]),
            images: strings(&["https://images.unsplash.com/photo-1449824913935-59a10b8d2000"]),
            owner_id: "owner_2".to_string(),
            status: VillaStatus::Active,
            created_at: ts(2024, 1, 1, 0, 0),
            updated_at: ts(2024, 1, 15, 0, 0),
        },
    ]
}

fn mock_bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: "booking_1".to_string(),
            villa_id: "villa_1".to_string(),
            user_id: "guest_1".to_string(),
            guest_name: "John Smith".to_string(),
            guest_email: "john.smith@email.com".to_string(),
            guest_phone: Some("+1 (555) 111-2222".to_string()),
            check_in: date(2024, 6, 15),
            check_out: date(2024, 6, 22),
            guests: 4,
            total_amount: 5950,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            special_requests: None,
            created_at: ts(2024, 1, 10, 0, 0),
            updated_at: ts(2024, 1, 10, 0, 0),
        },
        Booking {
            id: "booking_2".to_string(),
            villa_id: "villa_2".to_string(),
            user_id: "guest_2".to_string(),
            guest_name: "Lisa Johnson".to_string(),
            guest_email: "lisa.j@email.com".to_string(),
            guest_phone: None,
            check_in: date(2024, 7, 1),
            check_out: date(2024, 7, 8),
            guests: 6,
            total_amount: 8400,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            special_requests: None,
            created_at: ts(2024, 1, 12, 0, 0),
            updated_at: ts(2024, 1, 12, 0, 0),
        },
    ]
}

fn mock_leads() -> Vec<Lead> {
    vec![
        Lead {
            id: "1".to_string(),
            name: "Sarah Chen".to_string(),
            email: "sarah.chen@email.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            villa_interest: "Luxury Beachfront Villa, Bali".to_string(),
            check_in: date(2024, 8, 15),
            check_out: date(2024, 8, 22),
            guests: 4,
            budget: 15000,
            status: LeadStatus::Hot,
            score: 92,
            source: "Google Ads".to_string(),
            created_at: ts(2024, 1, 15, 10, 30),
            last_contact: ts(2024, 1, 15, 14, 20),
            notes: "Very interested, mentioned anniversary celebration".to_string(),
            ai_summary: "High-intent lead looking for luxury accommodation for anniversary. \
                         Budget confirmed, dates flexible."
                .to_string(),
            call_transcripts: Vec::new(),
            interactions: Vec::new(),
        },
        Lead {
            id: "2".to_string(),
            name: "Marcus Rodriguez".to_string(),
            email: "marcus.r@company.com".to_string(),
            phone: "+1 (555) 987-6543".to_string(),
            villa_interest: "Mountain Retreat, Aspen".to_string(),
            check_in: date(2024, 9, 10),
            check_out: date(2024, 9, 17),
            guests: 8,
            budget: 25000,
            status: LeadStatus::Warm,
            score: 78,
            source: "Referral".to_string(),
            created_at: ts(2024, 1, 14, 16, 45),
            last_contact: ts(2024, 1, 15, 9, 15),
            notes: "Corporate retreat, needs confirmation from team".to_string(),
            ai_summary: "Corporate booking for team retreat. Decision maker identified, \
                         waiting on final approval."
                .to_string(),
            call_transcripts: Vec::new(),
            interactions: Vec::new(),
        },
        Lead {
            id: "3".to_string(),
            name: "Emma Thompson".to_string(),
            email: "emma.thompson@gmail.com".to_string(),
            phone: "+44 20 7946 0958".to_string(),
            villa_interest: "Tuscan Villa, Italy".to_string(),
            check_in: date(2024, 7, 20),
            check_out: date(2024, 7, 27),
            guests: 6,
            budget: 12000,
            status: LeadStatus::Cold,
            score: 45,
            source: "Social Media".to_string(),
            created_at: ts(2024, 1, 13, 11, 20),
            last_contact: ts(2024, 1, 13, 11, 20),
            notes: "Price sensitive, looking for alternatives".to_string(),
            ai_summary: "Budget-conscious traveler. Interested but concerned about pricing. \
                         Needs value proposition."
                .to_string(),
            call_transcripts: Vec::new(),
            interactions: Vec::new(),
        },
    ]
}

fn mock_analytics() -> Analytics {
    let reason = |reason: &str, count| ReasonCount {
        reason: reason.to_string(),
        count,
    };
    let stage = |stage: &str, count| StageCount {
        stage: stage.to_string(),
        count,
    };
    Analytics {
        total_leads: 156,
        conversion_rate: 24.5,
        avg_response_time: 2.3,
        hot_leads: 23,
        revenue_pipeline: 450_000,
        drop_off_reasons: vec![
            reason("Price too high", 45),
            reason("Dates unavailable", 32),
            reason("Location not suitable", 28),
        ],
        intent_funnel: vec![
            stage("Form Submitted", 156),
            stage("AI Call Answered", 134),
            stage("Interest Confirmed", 89),
            stage("Quote Sent", 67),
            stage("Booking Completed", 38),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{CallStatus, Speaker, TranscriptLine};

    #[test]
    fn mock_dataset_matches_dashboard_seed() {
        let ds = Dataset::mock();
        assert_eq!(ds.villas.len(), 2);
        assert_eq!(ds.bookings.len(), 2);
        assert_eq!(ds.leads.len(), 3);
        assert_eq!(ds.villa("villa_2").unwrap().price_per_night, 1200);
        assert_eq!(ds.lead("1").unwrap().status, LeadStatus::Hot);
        assert_eq!(ds.analytics.as_ref().unwrap().intent_funnel.len(), 5);
    }

    #[test]
    fn format_detection_by_extension() {
        assert_eq!(Format::detect_from_extension(Path::new("a.json")), Some(Format::Json));
        assert_eq!(Format::detect_from_extension(Path::new("a.yml")), Some(Format::Yaml));
        assert_eq!(Format::detect_from_extension(Path::new("a.yaml")), Some(Format::Yaml));
        assert_eq!(Format::detect_from_extension(Path::new("a.toml")), Some(Format::Toml));
        assert_eq!(Format::detect_from_extension(Path::new("a.csv")), None);
    }

    #[test]
    fn json_round_trip_preserves_mock_data() {
        let ds = Dataset::mock();
        let json = serde_json::to_string(&ds).unwrap();
        let back = Dataset::parse(&json, Format::Json).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn record_call_appends_transcript_and_interaction() {
        let mut ds = Dataset::mock();
        let mut session = CallSession::new("call_x".to_string(), "1".to_string());
        session.status = CallStatus::Completed;
        session.duration = 31;
        session.sentiment = Sentiment::Positive;
        session.next_action = "Send detailed quote via email".to_string();
        session.transcript.push(TranscriptLine {
            speaker: Speaker::Ai,
            message: "Hello".to_string(),
        });

        let at = ts(2024, 2, 1, 9, 0);
        ds.record_call(&session, at).unwrap();

        let lead = ds.lead("1").unwrap();
        assert_eq!(lead.call_transcripts.len(), 1);
        assert_eq!(lead.call_transcripts[0].transcript, "AI: Hello");
        assert_eq!(lead.call_transcripts[0].duration, 31);
        assert_eq!(lead.interactions[0].kind, InteractionKind::Call);
        assert_eq!(lead.interactions[0].direction, Direction::Outbound);
        assert_eq!(lead.last_contact, at);
        assert_eq!(lead.score, 92);
    }

    #[test]
    fn record_call_for_unknown_lead_fails() {
        let mut ds = Dataset::mock();
        let session = CallSession::new("call_y".to_string(), "404".to_string());
        let err = ds.record_call(&session, Utc::now()).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownLead(id) if id == "404"));
    }
}
