//! AI insights and analytics tabs.
//!
//! Only the lead counts and the average score come from data. Drop-off
//! reasons, funnel, predictions and every time series are fixed figures; no
//! model or analysis sits behind them.

use serde::Serialize;

use crate::models::{Analytics, Lead, LeadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropOffReason {
    pub reason: &'static str,
    pub count: u32,
    pub percentage: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub count: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub title: &'static str,
    pub description: &'static str,
    pub confidence: u32,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_leads: usize,
    pub hot_leads: usize,
    /// Mean lead score, 0 when there are no leads.
    pub avg_score: f64,
    pub drop_off_reasons: Vec<DropOffReason>,
    pub conversion_funnel: Vec<FunnelStage>,
    pub predictions: Vec<Prediction>,
}

impl Insights {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let total_leads = leads.len();
        let hot_leads = leads.iter().filter(|l| l.status == LeadStatus::Hot).count();
        let avg_score = if total_leads == 0 {
            0.0
        } else {
            leads.iter().map(|l| f64::from(l.score)).sum::<f64>() / total_leads as f64
        };

        Self {
            total_leads,
            hot_leads,
            avg_score,
            drop_off_reasons: drop_off_reasons(),
            conversion_funnel: conversion_funnel(),
            predictions: predictions(),
        }
    }
}

fn drop_off_reasons() -> Vec<DropOffReason> {
    let r = |reason, count, percentage, trend| DropOffReason {
        reason,
        count,
        percentage,
        trend,
    };
    vec![
        r("Price too high", 45, 32, Trend::Up),
        r("Dates unavailable", 32, 23, Trend::Down),
        r("Location not suitable", 28, 20, Trend::Stable),
        r("Amenities mismatch", 18, 13, Trend::Up),
        r("Response time slow", 12, 8, Trend::Down),
        r("Other", 6, 4, Trend::Stable),
    ]
}

fn conversion_funnel() -> Vec<FunnelStage> {
    let s = |stage, count, percentage| FunnelStage {
        stage,
        count,
        percentage,
    };
    vec![
        s("Form Submitted", 156, 100),
        s("AI Call Answered", 134, 86),
        s("Interest Confirmed", 89, 57),
        s("Quote Sent", 67, 43),
        s("Booking Completed", 38, 24),
    ]
}

fn predictions() -> Vec<Prediction> {
    vec![
        Prediction {
            title: "High Conversion Probability",
            description:
                "Leads with luxury villa interest and budget >$20k have 78% conversion rate",
            confidence: 94,
            impact: Impact::High,
        },
        Prediction {
            title: "Optimal Contact Time",
            description: "Calls between 2-4 PM show 45% higher answer rates",
            confidence: 87,
            impact: Impact::Medium,
        },
        Prediction {
            title: "Price Sensitivity Pattern",
            description: "Leads from social media are 60% more price-sensitive",
            confidence: 82,
            impact: Impact::Medium,
        },
        Prediction {
            title: "Follow-up Timing",
            description: "Second follow-up after 48 hours increases conversion by 23%",
            confidence: 91,
            impact: Impact::High,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyConversion {
    pub month: &'static str,
    pub rate: f64,
    pub leads: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyResponse {
    pub hour: &'static str,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub channel: &'static str,
    pub leads: u32,
    pub conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceShare {
    pub name: &'static str,
    pub percent: u32,
}

/// Everything the analytics tab renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub summary: Option<Analytics>,
    pub conversion_trend: Vec<MonthlyConversion>,
    pub response_times: Vec<HourlyResponse>,
    pub channels: Vec<ChannelPerformance>,
    pub lead_sources: Vec<SourceShare>,
}

impl AnalyticsReport {
    pub fn new(summary: Option<&Analytics>) -> Self {
        let month = |month, rate, leads| MonthlyConversion { month, rate, leads };
        let hour = |hour, minutes| HourlyResponse { hour, minutes };
        let channel = |channel, leads, conversion| ChannelPerformance {
            channel,
            leads,
            conversion,
        };
        let source = |name, percent| SourceShare { name, percent };

        Self {
            summary: summary.cloned(),
            conversion_trend: vec![
                month("Jan", 18.2, 120),
                month("Feb", 21.5, 145),
                month("Mar", 19.8, 132),
                month("Apr", 23.1, 167),
                month("May", 24.5, 156),
                month("Jun", 26.3, 189),
            ],
            response_times: vec![
                hour("9AM", 3.2),
                hour("10AM", 2.8),
                hour("11AM", 2.1),
                hour("12PM", 1.9),
                hour("1PM", 1.7),
                hour("2PM", 1.5),
                hour("3PM", 1.8),
                hour("4PM", 2.3),
                hour("5PM", 2.9),
            ],
            channels: vec![
                channel("AI Voice", 89, 28.5),
                channel("WhatsApp", 67, 22.1),
                channel("Email", 45, 18.7),
                channel("Human Call", 34, 31.2),
            ],
            lead_sources: vec![
                source("Google Ads", 35),
                source("Social Media", 28),
                source("Referral", 22),
                source("Direct", 15),
            ],
        }
    }

    /// Hour with the shortest average response time.
    pub fn fastest_response_hour(&self) -> Option<&HourlyResponse> {
        self.response_times
            .iter()
            .min_by(|a, b| a.minutes.total_cmp(&b.minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn counts_and_average_come_from_leads() {
        let ds = Dataset::mock();
        let insights = Insights::from_leads(&ds.leads);
        assert_eq!(insights.total_leads, 3);
        assert_eq!(insights.hot_leads, 1);
        assert!((insights.avg_score - (92.0 + 78.0 + 45.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_leads_means_zero_average() {
        let insights = Insights::from_leads(&[]);
        assert_eq!(insights.total_leads, 0);
        assert_eq!(insights.avg_score, 0.0);
        assert_eq!(insights.conversion_funnel[0].percentage, 100);
    }

    #[test]
    fn drop_off_percentages_cover_everything() {
        let total: u32 = drop_off_reasons().iter().map(|r| r.percentage).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn report_keeps_dataset_summary() {
        let ds = Dataset::mock();
        let report = AnalyticsReport::new(ds.analytics.as_ref());
        assert_eq!(report.summary.as_ref().unwrap().total_leads, 156);
        let lead_share: u32 = report.lead_sources.iter().map(|s| s.percent).sum();
        assert_eq!(lead_share, 100);
        assert_eq!(report.fastest_response_hour().unwrap().hour, "2PM");
    }
}
