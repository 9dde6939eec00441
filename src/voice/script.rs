use std::time::Duration;

use crate::config::VoiceSettings;
use crate::models::Lead;

use super::session::Speaker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub speaker: Speaker,
    pub message: String,
    /// How long the line takes before the next one starts.
    pub duration: Duration,
}

/// The fixed five-line conversation played on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallScript {
    lines: Vec<ScriptLine>,
}

impl CallScript {
    pub fn for_lead(lead: &Lead, settings: &VoiceSettings) -> Self {
        let line = |speaker, message: String, secs| ScriptLine {
            speaker,
            message,
            duration: Duration::from_secs(secs),
        };

        let lines = vec![
            line(
                Speaker::Ai,
                format!(
                    "Hello {}, this is {} from {}. I'm calling regarding your inquiry about {}. \
                     Is this a good time to chat?",
                    lead.name, settings.agent_name, settings.company, lead.villa_interest
                ),
                5,
            ),
            line(
                Speaker::Customer,
                "Yes, I was just looking at your website. I'm interested in booking for my \
                 anniversary."
                    .to_string(),
                3,
            ),
            line(
                Speaker::Ai,
                format!(
                    "That's wonderful! Congratulations on your anniversary. I see you're looking \
                     at dates from {} to {} for {} guests. The villa has amazing sunset views \
                     perfect for celebrations.",
                    lead.check_in, lead.check_out, lead.guests
                ),
                6,
            ),
            line(
                Speaker::Customer,
                "That sounds perfect. What's included in the booking? And is there availability?"
                    .to_string(),
                4,
            ),
            line(
                Speaker::Ai,
                format!(
                    "Great question! The villa includes private pool, daily housekeeping, and \
                     concierge service. I'm checking availability now... Yes, those dates are \
                     available. The total would be ${} for your stay. Would you like me to send \
                     you a detailed quote?",
                    lead.budget
                ),
                8,
            ),
        ];

        Self { lines }
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line durations.
    pub fn total_duration(&self) -> Duration {
        self.lines.iter().map(|l| l.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn script_alternates_speakers_with_fixed_durations() {
        let ds = Dataset::mock();
        let script = CallScript::for_lead(ds.lead("1").unwrap(), &VoiceSettings::default());

        let speakers: Vec<_> = script.lines().iter().map(|l| l.speaker).collect();
        assert_eq!(
            speakers,
            vec![Speaker::Ai, Speaker::Customer, Speaker::Ai, Speaker::Customer, Speaker::Ai]
        );
        let secs: Vec<_> = script.lines().iter().map(|l| l.duration.as_secs()).collect();
        assert_eq!(secs, vec![5, 3, 6, 4, 8]);
        assert_eq!(script.total_duration(), Duration::from_secs(26));
    }

    #[test]
    fn lead_details_are_interpolated() {
        let ds = Dataset::mock();
        let settings = VoiceSettings {
            agent_name: "Noah".to_string(),
            ..VoiceSettings::default()
        };
        let script = CallScript::for_lead(ds.lead("1").unwrap(), &settings);

        let opening = &script.get(0).unwrap().message;
        assert!(opening.starts_with("Hello Sarah Chen, this is Noah from VillaLux."));
        assert!(opening.contains("Luxury Beachfront Villa, Bali"));

        let dates = &script.get(2).unwrap().message;
        assert!(dates.contains("from 2024-08-15 to 2024-08-22 for 4 guests"));

        assert!(script.get(4).unwrap().message.contains("$15000"));
        assert!(script.get(5).is_none());
    }
}
