pub mod insights;
pub mod timeline;

pub use insights::{AnalyticsReport, Insights};
pub use timeline::{lead_timeline, TimelineEvent, TimelineKind};

use serde::Serialize;

/// Coarse bucket used to colour lead scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 60 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

/// "Sarah Chen" -> "SC"
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}
