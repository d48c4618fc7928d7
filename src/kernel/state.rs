use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::event::{AiResponse, SessionResult};

/// Session mode, fixed at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Teach,
    Quiz,
    Revision,
}

impl Mode {
    /// Questions per session in this mode.
    pub fn question_total(&self) -> usize {
        match self {
            Mode::Teach => 1,
            Mode::Quiz | Mode::Revision => 3,
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teach" => Ok(Mode::Teach),
            "quiz" => Ok(Mode::Quiz),
            "revision" | "revise" => Ok(Mode::Revision),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Teach => "teach",
            Mode::Quiz => "quiz",
            Mode::Revision => "revision",
        };
        f.write_str(name)
    }
}

/// Phase of the lesson state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Idle,
    Explaining,
    Example,
    AskingQuestion,
    Feedback,
    Completed,
}

/// Revision sessions show their bullet points first, then run rapid-fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPhase {
    Points,
    Questions,
}

/// Scoring and progress for one run of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    pub current_question_index: usize,
    pub total_questions: usize,
    pub score: usize,
    /// Issued question responses, indexed by question number.
    pub responses: Vec<AiResponse>,
    pub selected_answer_index: Option<usize>,
}

impl QuizState {
    pub fn new(total_questions: usize) -> Self {
        Self {
            current_question_index: 0,
            total_questions,
            score: 0,
            responses: Vec::with_capacity(total_questions),
            selected_answer_index: None,
        }
    }

    /// Records the question shown at the current index and clears the pick.
    pub fn show_question(&mut self, question: AiResponse) {
        let index = self.current_question_index;
        if index < self.responses.len() {
            self.responses[index] = question;
        } else {
            self.responses.push(question);
        }
        self.selected_answer_index = None;
    }

    pub fn current_question(&self) -> Option<&AiResponse> {
        self.responses.get(self.current_question_index)
    }

    /// Sets the pick for the current question. Returns false if it was
    /// already answered; the first pick stands.
    pub fn select(&mut self, index: usize) -> bool {
        if self.selected_answer_index.is_some() {
            return false;
        }
        self.selected_answer_index = Some(index);
        true
    }

    pub fn record_correct(&mut self) {
        self.score = (self.score + 1).min(self.total_questions);
    }

    pub fn has_more(&self) -> bool {
        self.current_question_index + 1 < self.total_questions
    }

    /// Moves to the next question. Never moves backwards or past the end.
    pub fn advance(&mut self) {
        if self.has_more() {
            self.current_question_index += 1;
        }
    }

    pub fn result(&self) -> SessionResult {
        SessionResult {
            score: self.score,
            total_questions: self.total_questions,
        }
    }
}

/// Everything the presentation layer reads, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: EngineState,
    pub mode: Mode,
    pub response: Option<AiResponse>,
    /// Quiz track; teach sessions use it for their single question.
    pub quiz: QuizState,
    /// Revision rapid-fire track, independent of `quiz`.
    pub revision: QuizState,
    pub revision_phase: Option<RevisionPhase>,
    pub paused: bool,
    pub follow_up: Option<AiResponse>,
    pub result: Option<SessionResult>,
}

impl EngineSnapshot {
    pub fn new(mode: Mode) -> Self {
        let (quiz_total, revision_total) = match mode {
            Mode::Revision => (0, mode.question_total()),
            _ => (mode.question_total(), 0),
        };
        Self {
            state: EngineState::Idle,
            mode,
            response: None,
            quiz: QuizState::new(quiz_total),
            revision: QuizState::new(revision_total),
            revision_phase: None,
            paused: false,
            follow_up: None,
            result: None,
        }
    }

    /// The track whose question is on screen.
    pub fn active_quiz(&self) -> &QuizState {
        match self.mode {
            Mode::Revision => &self.revision,
            _ => &self.quiz,
        }
    }
}
