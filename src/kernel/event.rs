use serde::{Deserialize, Serialize};

/// Which UI treatment a response gets, and which optional fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Intro,
    Explanation,
    Example,
    Question,
    Feedback,
    Revision,
    Followup,
    Completed,
    Score,
}

/// The unit of content shown to the learner at any instant.
/// Never mutated: the next step supersedes it with a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub kind: ResponseKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
}

impl AiResponse {
    pub fn new(kind: ResponseKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            options: None,
            correct_index: None,
        }
    }

    pub fn question(
        title: impl Into<String>,
        content: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            kind: ResponseKind::Question,
            title: title.into(),
            content: content.into(),
            options: Some(options),
            correct_index: Some(correct_index),
        }
    }

    /// Text handed to narration: title and body, as read aloud.
    pub fn spoken_text(&self) -> String {
        match &self.options {
            Some(options) => format!("{}. {} Options: {}.", self.title, self.content, options.join(", ")),
            None => format!("{}. {}", self.title, self.content),
        }
    }
}

/// Final result reported once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub score: usize,
    pub total_questions: usize,
}

/// Inputs accepted by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Answer(usize),
    StartRapidFire,
    Pause,
    Resume,
    FollowUp(String),
}
