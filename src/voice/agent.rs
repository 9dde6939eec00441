//! The voice agent: one call at a time, a queue of hot leads, and an
//! optional auto mode that dials the next lead after each completed call.
//!
//! Every delayed transition is a task on the agent's [`Scheduler`] keyed by
//! the session it belongs to. Ending or failing a session cancels all of its
//! tasks, so nothing scheduled for it can touch a later session.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::VoiceSettings;
use crate::models::{string_enum, Lead, LeadStatus};

use super::scheduler::Scheduler;
use super::script::CallScript;
use super::session::{
    CallOutcome, CallSession, CallStatus, Speaker, TranscriptLine, QUOTE_REQUESTED,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("agent is busy with call {session_id} (lead {lead_id})")]
    Busy { session_id: String, lead_id: String },

    #[error("lead not found: {0}")]
    UnknownLead(String),

    #[error("no active call")]
    NoActiveCall,
}

string_enum! {
    AgentStatus, "agent status" {
        Idle => "idle",
        Busy => "busy",
    }
}

/// Why a scheduled auto-dial did not start a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Busy,
    QueueEmpty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    Started { session_id: String, lead_id: String },
    StatusChanged { session_id: String, status: CallStatus },
    Line { session_id: String, line: TranscriptLine },
    Tick { session_id: String, duration: u64 },
    Completed(CallOutcome),
    Ended { session_id: String, lead_id: String },
    Failed { session_id: String, lead_id: String },
    AutoDialScheduled { lead_id: String, delay: Duration },
    AutoDialSkipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TaskKey {
    Session(String),
    AutoDial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Connect,
    Play(usize),
    Finish,
    Tick,
    Dial,
}

struct ActiveCall {
    session: CallSession,
    script: CallScript,
}

pub struct VoiceAgent {
    settings: VoiceSettings,
    scheduler: Scheduler<TaskKey, Step>,
    leads: Vec<Lead>,
    active: Option<ActiveCall>,
    history: Vec<CallSession>,
    queue: Vec<String>,
    auto_mode: bool,
    events: Vec<AgentEvent>,
}

impl VoiceAgent {
    /// A `tick_secs` of zero is raised to one so the counter always moves the
    /// clock forward.
    pub fn new(mut settings: VoiceSettings, leads: Vec<Lead>) -> Self {
        settings.tick_secs = settings.tick_secs.max(1);
        let mut agent = Self {
            settings,
            scheduler: Scheduler::new(),
            leads,
            active: None,
            history: Vec::new(),
            queue: Vec::new(),
            auto_mode: false,
            events: Vec::new(),
        };
        agent.refresh_queue();
        agent
    }

    /// Virtual time since the agent was created.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn status(&self) -> AgentStatus {
        if self.active.is_some() {
            AgentStatus::Busy
        } else {
            AgentStatus::Idle
        }
    }

    pub fn active(&self) -> Option<&CallSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Finished sessions (completed or failed), oldest first.
    pub fn history(&self) -> &[CallSession] {
        &self.history
    }

    /// Lead ids eligible for the next call, in dialing order.
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Turning auto mode off drops a pending auto-dial.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.auto_mode = enabled;
        if !enabled && self.scheduler.cancel_key(&TaskKey::AutoDial) > 0 {
            debug!("Auto mode off: cancelled pending auto-dial");
        }
    }

    /// Replace the lead list and rebuild the queue.
    pub fn set_leads(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
        self.refresh_queue();
    }

    /// Hot leads not yet in the history, capped at `queue_limit`.
    pub fn refresh_queue(&mut self) {
        let history = &self.history;
        self.queue = self
            .leads
            .iter()
            .filter(|l| l.status == LeadStatus::Hot)
            .filter(|l| !history.iter().any(|s| s.lead_id == l.id))
            .take(self.settings.queue_limit)
            .map(|l| l.id.clone())
            .collect();
    }

    /// Start a call with `lead_id`. Rejected while another call is active;
    /// the active call is never replaced or queued behind.
    pub fn start_call(&mut self, lead_id: &str) -> Result<String, CallError> {
        if let Some(active) = &self.active {
            return Err(CallError::Busy {
                session_id: active.session.id.clone(),
                lead_id: active.session.lead_id.clone(),
            });
        }
        let lead = self
            .lead(lead_id)
            .ok_or_else(|| CallError::UnknownLead(lead_id.to_string()))?;
        let script = CallScript::for_lead(lead, &self.settings);

        self.scheduler.cancel_key(&TaskKey::AutoDial);

        let session_id = format!("call_{}", uuid::Uuid::new_v4().simple());
        let session = CallSession::new(session_id.clone(), lead_id.to_string());
        self.scheduler.schedule(
            TaskKey::Session(session_id.clone()),
            secs(self.settings.dial_delay_secs),
            Step::Connect,
        );
        self.active = Some(ActiveCall { session, script });

        info!("Dialing lead {} ({})", lead_id, session_id);
        self.events.push(AgentEvent::Started {
            session_id: session_id.clone(),
            lead_id: lead_id.to_string(),
        });
        Ok(session_id)
    }

    /// Hang up the active call. The session is discarded without a
    /// completion and without entering the history.
    pub fn end_call(&mut self) -> Result<CallSession, CallError> {
        let active = self.active.take().ok_or(CallError::NoActiveCall)?;
        let session = active.session;
        let cancelled = self
            .scheduler
            .cancel_key(&TaskKey::Session(session.id.clone()));

        info!(
            "Ended call {} with lead {} ({} pending steps cancelled)",
            session.id, session.lead_id, cancelled
        );
        self.events.push(AgentEvent::Ended {
            session_id: session.id.clone(),
            lead_id: session.lead_id.clone(),
        });
        Ok(session)
    }

    /// Test hook: move the active call to `Failed`. The scripted flow never
    /// fails on its own.
    pub fn force_failure(&mut self) -> Result<(), CallError> {
        let active = self.active.take().ok_or(CallError::NoActiveCall)?;
        let mut session = active.session;
        self.scheduler
            .cancel_key(&TaskKey::Session(session.id.clone()));
        session.status = CallStatus::Failed;

        warn!("Call {} with lead {} failed", session.id, session.lead_id);
        self.events.push(AgentEvent::StatusChanged {
            session_id: session.id.clone(),
            status: CallStatus::Failed,
        });
        self.events.push(AgentEvent::Failed {
            session_id: session.id.clone(),
            lead_id: session.lead_id.clone(),
        });
        self.history.push(session);
        self.refresh_queue();
        Ok(())
    }

    /// Due time of the next scheduled step, if any.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Take events produced by calls made outside [`VoiceAgent::advance`].
    pub fn take_events(&mut self) -> Vec<AgentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run every step due within `dt` of virtual time and return the events
    /// produced, including any buffered since the last call.
    pub fn advance(&mut self, dt: Duration) -> Vec<AgentEvent> {
        let deadline = self.scheduler.now() + dt;
        while let Some((key, step)) = self.scheduler.pop_due(deadline) {
            self.handle(key, step);
        }
        self.scheduler.advance_to(deadline);
        self.take_events()
    }

    /// Run steps until nothing is scheduled or `limit` of virtual time has
    /// passed. With auto mode on this keeps dialing down the queue.
    pub fn run_until_idle(&mut self, limit: Duration) -> Vec<AgentEvent> {
        let deadline = self.scheduler.now() + limit;
        while let Some((key, step)) = self.scheduler.pop_due(deadline) {
            self.handle(key, step);
        }
        self.take_events()
    }

    fn handle(&mut self, key: TaskKey, step: Step) {
        match (key, step) {
            (TaskKey::AutoDial, Step::Dial) => self.auto_dial(),
            (TaskKey::AutoDial, step) => {
                warn!("Dropping {:?} scheduled under the auto-dial key", step);
            }
            (TaskKey::Session(id), step) => {
                let live = self
                    .active
                    .as_ref()
                    .is_some_and(|a| a.session.id == id);
                if !live {
                    // Cancellation should have removed it.
                    debug!("Dropping {:?} for stale session {}", step, id);
                    return;
                }
                match step {
                    Step::Connect => self.connect(),
                    Step::Play(index) => self.play(index),
                    Step::Tick => self.tick(),
                    Step::Finish => self.finish(),
                    Step::Dial => warn!("Dropping dial step scheduled under session {}", id),
                }
            }
        }
    }

    fn connect(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.session.status = CallStatus::Connected;
        let id = active.session.id.clone();
        debug!("Call {} connected", id);

        self.events.push(AgentEvent::StatusChanged {
            session_id: id.clone(),
            status: CallStatus::Connected,
        });
        let key = TaskKey::Session(id);
        self.scheduler
            .schedule(key.clone(), secs(self.settings.tick_secs), Step::Tick);
        self.scheduler
            .schedule(key, secs(self.settings.answer_delay_secs), Step::Play(0));
    }

    fn play(&mut self, index: usize) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(line) = active.script.get(index).cloned() else {
            return;
        };
        let id = active.session.id.clone();
        let status = match line.speaker {
            Speaker::Ai => CallStatus::Talking,
            Speaker::Customer => CallStatus::Listening,
        };
        let transcript_line = TranscriptLine {
            speaker: line.speaker,
            message: line.message,
        };

        if active.session.status != status {
            active.session.status = status;
            self.events.push(AgentEvent::StatusChanged {
                session_id: id.clone(),
                status,
            });
        }
        active.session.transcript.push(transcript_line.clone());
        let next = if index + 1 < active.script.len() {
            Step::Play(index + 1)
        } else {
            Step::Finish
        };

        self.events.push(AgentEvent::Line {
            session_id: id.clone(),
            line: transcript_line,
        });
        self.scheduler
            .schedule(TaskKey::Session(id), line.duration, next);
    }

    fn tick(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.session.status.is_on_line() {
            return;
        }
        active.session.duration += self.settings.tick_secs;
        let id = active.session.id.clone();
        self.events.push(AgentEvent::Tick {
            session_id: id.clone(),
            duration: active.session.duration,
        });
        self.scheduler.schedule(
            TaskKey::Session(id),
            secs(self.settings.tick_secs),
            Step::Tick,
        );
    }

    fn finish(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let mut session = active.session;
        self.scheduler
            .cancel_key(&TaskKey::Session(session.id.clone()));
        session.complete();

        let outcome = CallOutcome {
            lead_id: session.lead_id.clone(),
            transcript: session.transcript_text(),
            outcome: QUOTE_REQUESTED.to_string(),
        };
        info!(
            "Call {} with lead {} completed after {}s: {}",
            session.id, session.lead_id, session.duration, outcome.outcome
        );
        self.events.push(AgentEvent::StatusChanged {
            session_id: session.id.clone(),
            status: CallStatus::Completed,
        });
        self.events.push(AgentEvent::Completed(outcome));
        self.history.push(session);
        self.refresh_queue();

        if self.auto_mode {
            if let Some(next) = self.queue.first().cloned() {
                let delay = secs(self.settings.auto_dial_delay_secs);
                self.scheduler.schedule(TaskKey::AutoDial, delay, Step::Dial);
                debug!("Auto-dial of lead {} in {:?}", next, delay);
                self.events.push(AgentEvent::AutoDialScheduled {
                    lead_id: next,
                    delay,
                });
            }
        }
    }

    fn auto_dial(&mut self) {
        if self.active.is_some() {
            self.events.push(AgentEvent::AutoDialSkipped(SkipReason::Busy));
            return;
        }
        self.refresh_queue();
        let Some(next) = self.queue.first().cloned() else {
            self.events
                .push(AgentEvent::AutoDialSkipped(SkipReason::QueueEmpty));
            return;
        };
        if let Err(e) = self.start_call(&next) {
            warn!("Auto-dial of lead {} failed: {}", next, e);
        }
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
