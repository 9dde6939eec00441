use std::time::Duration;

use villalux::config::VoiceSettings;
use villalux::dataset::Dataset;
use villalux::models::{Lead, LeadStatus};
use villalux::voice::{
    AgentEvent, AgentStatus, CallError, CallScript, CallStatus, SkipReason, TranscriptLine,
    VoiceAgent, QUOTE_REQUESTED,
};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn hot_lead(id: &str, name: &str) -> Lead {
    let mut lead = Dataset::mock().leads[0].clone();
    lead.id = id.to_string();
    lead.name = name.to_string();
    lead.status = LeadStatus::Hot;
    lead
}

fn two_hot_leads() -> VoiceAgent {
    VoiceAgent::new(
        VoiceSettings::default(),
        vec![hot_lead("A", "Alice Park"), hot_lead("B", "Bruno Diaz")],
    )
}

fn completions(events: &[AgentEvent]) -> Vec<&villalux::voice::CallOutcome> {
    events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Completed(outcome) => Some(outcome),
            _ => None,
        })
        .collect()
}

fn started(events: &[AgentEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Started { lead_id, .. } => Some(lead_id.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn auto_mode_completes_first_lead_then_dials_the_next() {
    let mut agent = two_hot_leads();
    assert_eq!(agent.queue(), ["A", "B"]);

    agent.set_auto_mode(true);
    agent.start_call("A").unwrap();

    let events = agent.advance(secs(35));
    let done = completions(&events);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].lead_id, "A");
    assert_eq!(done[0].outcome, QUOTE_REQUESTED);
    assert_eq!(done[0].transcript.lines().count(), 5);
    assert!(done[0].transcript.starts_with("AI: "));
    assert!(events.contains(&AgentEvent::AutoDialScheduled {
        lead_id: "B".to_string(),
        delay: secs(5),
    }));
    assert_eq!(started(&events), ["A"]);
    assert_eq!(agent.queue(), ["B"]);
    assert_eq!(agent.status(), AgentStatus::Idle);

    // Auto-dial fires five seconds after completion (t = 36s).
    let events = agent.advance(secs(1));
    assert_eq!(started(&events), ["B"]);
    assert_eq!(agent.active().unwrap().lead_id, "B");
    assert!(completions(&events).is_empty());

    let events = agent.run_until_idle(secs(600));
    let done = completions(&events);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].lead_id, "B");
    assert!(agent.queue().is_empty());
    assert_eq!(agent.history().len(), 2);
    assert!(agent.next_due().is_none());
}

#[test]
fn full_call_runs_on_schedule() {
    let mut agent = two_hot_leads();
    agent.start_call("A").unwrap();

    let events = agent.advance(secs(2));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AgentEvent::StatusChanged { .. })));
    assert_eq!(agent.active().unwrap().status, CallStatus::Dialing);

    agent.advance(secs(1));
    assert_eq!(agent.active().unwrap().status, CallStatus::Connected);

    let events = agent.run_until_idle(secs(600));
    let lines = events
        .iter()
        .filter(|e| matches!(e, AgentEvent::Line { .. }))
        .count();
    assert_eq!(lines, 5);
    assert_eq!(completions(&events).len(), 1);

    let session = agent.history().last().unwrap();
    assert_eq!(session.status, CallStatus::Completed);
    assert_eq!(session.duration, 27);
    assert_eq!(agent.now(), secs(31));
}

#[test]
fn ticks_increase_by_one_while_on_the_line() {
    let mut agent = two_hot_leads();
    agent.start_call("A").unwrap();
    let events = agent.run_until_idle(secs(600));

    let ticks: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Tick { duration, .. } => Some(*duration),
            _ => None,
        })
        .collect();
    assert_eq!(ticks.first(), Some(&1));
    assert!(ticks.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(ticks.last(), Some(&27));
}

#[test]
fn ended_call_produces_nothing_further() {
    let mut agent = two_hot_leads();
    agent.set_auto_mode(true);
    agent.start_call("A").unwrap();
    agent.advance(secs(12));
    let partial = agent.active().unwrap().transcript.len();
    assert_eq!(partial, 2);

    let session = agent.end_call().unwrap();
    assert_eq!(session.transcript.len(), partial);
    let events = agent.take_events();
    assert!(matches!(events.as_slice(), [AgentEvent::Ended { .. }]));

    let later = agent.advance(secs(120));
    assert!(later.is_empty());
    assert!(agent.history().is_empty());
    assert_eq!(agent.status(), AgentStatus::Idle);
    // Never completed, so the lead stays callable.
    assert_eq!(agent.queue(), ["A", "B"]);
}

#[test]
fn second_call_is_rejected_while_busy() {
    let mut agent = two_hot_leads();
    let first = agent.start_call("A").unwrap();
    assert_eq!(agent.status(), AgentStatus::Busy);

    let err = agent.start_call("B").unwrap_err();
    assert_eq!(
        err,
        CallError::Busy {
            session_id: first.clone(),
            lead_id: "A".to_string(),
        }
    );
    assert_eq!(agent.active().unwrap().id, first);
}

#[test]
fn no_auto_dial_when_auto_mode_is_off() {
    let mut agent = two_hot_leads();
    agent.start_call("A").unwrap();

    let events = agent.advance(secs(120));
    assert_eq!(completions(&events).len(), 1);
    assert_eq!(started(&events), ["A"]);
    assert!(!events
        .iter()
        .any(|e| matches!(e, AgentEvent::AutoDialScheduled { .. })));
    assert!(agent.active().is_none());
}

#[test]
fn turning_auto_mode_off_cancels_pending_dial() {
    let mut agent = two_hot_leads();
    agent.set_auto_mode(true);
    agent.start_call("A").unwrap();
    agent.advance(secs(32));

    agent.set_auto_mode(false);
    let events = agent.advance(secs(60));
    assert!(started(&events).is_empty());
    assert!(agent.next_due().is_none());
}

#[test]
fn manual_call_replaces_pending_auto_dial() {
    let mut agent = two_hot_leads();
    agent.set_auto_mode(true);
    agent.start_call("A").unwrap();
    agent.advance(secs(32));

    agent.start_call("B").unwrap();
    let events = agent.advance(secs(8));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AgentEvent::AutoDialSkipped(SkipReason::Busy))));
    assert_eq!(started(&events), ["B"]);
}

#[test]
fn completed_call_is_recorded_on_the_lead() {
    let mut ds = Dataset::mock();
    let mut agent = VoiceAgent::new(VoiceSettings::default(), ds.leads.clone());
    agent.start_call("1").unwrap();
    agent.run_until_idle(secs(600));

    let session = agent.history().last().unwrap();
    let before = ds.lead("1").unwrap().interactions.len();
    ds.record_call(session, chrono::Utc::now()).unwrap();

    let lead = ds.lead("1").unwrap();
    assert_eq!(lead.interactions.len(), before + 1);
    let transcript = lead.call_transcripts.last().unwrap();
    assert_eq!(transcript.duration, 27);
    assert_eq!(transcript.transcript.lines().count(), 5);
}

#[test]
fn call_follows_the_script_in_order() {
    let lead = hot_lead("A", "Alice Park");
    let settings = VoiceSettings::default();
    let script = CallScript::for_lead(&lead, &settings);
    let mut agent = VoiceAgent::new(settings, vec![lead]);

    agent.start_call("A").unwrap();
    let events = agent.run_until_idle(secs(600));

    let statuses: Vec<CallStatus> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::StatusChanged { status, .. } => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        [
            CallStatus::Connected,
            CallStatus::Talking,
            CallStatus::Listening,
            CallStatus::Talking,
            CallStatus::Listening,
            CallStatus::Talking,
            CallStatus::Completed,
        ]
    );

    let spoken: Vec<&TranscriptLine> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::Line { line, .. } => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(spoken.len(), script.lines().len());
    for (line, expected) in spoken.iter().zip(script.lines()) {
        assert_eq!(line.speaker, expected.speaker);
        assert_eq!(line.message, expected.message);
    }

    let expected_transcript = script
        .lines()
        .iter()
        .map(|l| format!("{}: {}", l.speaker.label(), l.message))
        .collect::<Vec<_>>()
        .join("\n");
    let done = completions(&events);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].transcript, expected_transcript);
    assert_eq!(script.lines().len(), 5);
}
