use serde::{Deserialize, Serialize};

use crate::kernel::state::EngineState;
use crate::kernel::transition::Trigger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    StateTransition {
        from: EngineState,
        to: EngineState,
        trigger: Trigger,
    },

    QuestionShown {
        index: usize,
    },

    AnswerSubmitted {
        index: usize,
        correct: bool,
    },

    /// An answer that arrived out of phase or after the question was answered.
    AnswerIgnored,

    Paused,

    Resumed {
        paused_ms: u64,
    },

    FollowUpAnswered,

    Completed {
        score: usize,
        total_questions: usize,
    },

    Disposed,
}
