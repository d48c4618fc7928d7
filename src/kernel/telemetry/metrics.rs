use uuid::Uuid;

use super::event::SessionEvent;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub session: Uuid,
    /// Offset of the newest event from session start.
    pub last_event_ms: u64,
    pub transitions: u64,
    pub questions_shown: u64,
    pub answers: AnswerStats,
    pub pauses: PauseStats,
    pub follow_ups: u64,
    pub completed: bool,
    pub disposed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStats {
    pub submitted: u64,
    pub correct: u64,
    pub ignored: u64,
    /// correct / submitted, 0.0 when nothing was submitted.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauseStats {
    pub count: u64,
    pub total_paused_ms: u64,
}

pub fn compute_snapshot<'a>(events: impl IntoIterator<Item = &'a SessionEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            SessionEvent::StateTransition { .. } => snap.transitions += 1,
            SessionEvent::QuestionShown { .. } => snap.questions_shown += 1,
            SessionEvent::AnswerSubmitted { correct, .. } => {
                snap.answers.submitted += 1;
                if *correct {
                    snap.answers.correct += 1;
                }
            }
            SessionEvent::AnswerIgnored => snap.answers.ignored += 1,
            SessionEvent::Paused => snap.pauses.count += 1,
            SessionEvent::Resumed { paused_ms } => snap.pauses.total_paused_ms += paused_ms,
            SessionEvent::FollowUpAnswered => snap.follow_ups += 1,
            SessionEvent::Completed { .. } => snap.completed = true,
            SessionEvent::Disposed => snap.disposed = true,
        }
    }

    if snap.answers.submitted > 0 {
        snap.answers.accuracy = snap.answers.correct as f64 / snap.answers.submitted as f64;
    }

    snap
}
