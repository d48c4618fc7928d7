use serde::{Deserialize, Serialize};

use super::state::{EngineState, Mode};

/// Events that request a state transition.
/// These are REQUESTS: the graph decides whether they are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    SessionStart,
    /// Reading delay after the intro elapsed.
    IntroRead,
    /// Reading delay after the explanation elapsed.
    ExplanationRead,
    /// Reading delay after the worked example elapsed.
    ExampleRead,
    /// Learner asked to begin the revision questions.
    StartRapidFire,
    AnswerSelected,
    /// Reading delay after feedback elapsed.
    FeedbackRead { more_questions: bool },
}

/// The lesson transition table.
pub struct StepGraph;

impl StepGraph {
    /// Pure function: (Mode, Current State, Trigger) -> New State.
    /// Returns None when the table has no such edge.
    pub fn transition(mode: Mode, current: EngineState, trigger: Trigger) -> Option<EngineState> {
        use EngineState::*;
        use Trigger::*;

        match (mode, current, trigger) {
            // --- Teach ---
            (Mode::Teach, Idle, SessionStart) => Some(Explaining),
            (Mode::Teach, Explaining, IntroRead) => Some(Explaining),
            (Mode::Teach, Explaining, ExplanationRead) => Some(Example),
            (Mode::Teach, Example, ExampleRead) => Some(AskingQuestion),
            (Mode::Teach, Feedback, FeedbackRead { .. }) => Some(Completed),

            // --- Quiz ---
            (Mode::Quiz, Idle, SessionStart) => Some(AskingQuestion),

            // --- Revision ---
            (Mode::Revision, Idle, SessionStart) => Some(Explaining),
            (Mode::Revision, Explaining, StartRapidFire) => Some(AskingQuestion),

            // --- Shared question loop ---
            (_, AskingQuestion, AnswerSelected) => Some(Feedback),
            (Mode::Quiz | Mode::Revision, Feedback, FeedbackRead { more_questions: true }) => {
                Some(AskingQuestion)
            }
            (Mode::Quiz | Mode::Revision, Feedback, FeedbackRead { more_questions: false }) => {
                Some(Completed)
            }

            // Completed is terminal; everything else is rejected.
            _ => None,
        }
    }
}
