use serde::{Deserialize, Serialize};

use super::follow_up::{FollowUpPolicy, SeededChoice, FOLLOW_UP_RESPONSES};
use super::library::{self, ConceptEntry, QUESTIONS_PER_SUBJECT};
use super::subject::Subject;
use crate::kernel::event::{AiResponse, ResponseKind};
use crate::kernel::scoring;

pub use crate::kernel::scoring::Evaluation;

pub const DEFAULT_FOLLOW_UP_SEED: u64 = 0x5eed_c1a5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub subject: Subject,
    pub topic: String,
    pub definition: String,
    pub rules: Vec<String>,
    pub worked_example: String,
    pub common_mistakes: Vec<String>,
}

/// Source of lesson material. Lookups never fail: gaps resolve through
/// topic → subject default → global default.
pub trait ContentProvider: Send + Sync {
    fn lesson_intro(&self, subject: &str, topic: &str) -> AiResponse;
    fn explanation(&self, subject: &str, topic: &str) -> AiResponse;
    fn example(&self, subject: &str, topic: &str) -> AiResponse;
    /// Number of questions available for a subject.
    fn question_count(&self, subject: &str) -> usize;
    /// `index` wraps around the subject's question bank.
    fn question(&self, subject: &str, topic: &str, index: usize) -> AiResponse;
    fn evaluate_answer(&self, subject: &str, question_index: usize, selected: usize) -> Evaluation;
    /// Bullet points joined with newlines.
    fn revision_points(&self, subject: &str, topic: &str) -> AiResponse;
    fn follow_up(&self, question: &str) -> AiResponse;
    fn concept_summary(&self, subject: &str, topic: &str) -> ConceptSummary;
}

/// Built-in tables from [`library`].
pub struct Library {
    follow_up: Box<dyn FollowUpPolicy>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::with_policy(SeededChoice::new(DEFAULT_FOLLOW_UP_SEED))
    }

    pub fn with_policy(policy: impl FollowUpPolicy + 'static) -> Self {
        Self {
            follow_up: Box::new(policy),
        }
    }

    fn question_entry(subject: Subject, index: usize) -> &'static library::QuestionEntry {
        let lesson = library::lesson(subject);
        &lesson.questions[index % QUESTIONS_PER_SUBJECT]
    }
}

impl ContentProvider for Library {
    fn lesson_intro(&self, subject: &str, topic: &str) -> AiResponse {
        let subject = Subject::resolve(subject);
        let lesson = library::lesson(subject);
        AiResponse::new(
            ResponseKind::Intro,
            format!("Welcome to {}: {}", subject, topic),
            lesson.intro,
        )
    }

    fn explanation(&self, subject: &str, _topic: &str) -> AiResponse {
        let lesson = library::lesson(Subject::resolve(subject));
        AiResponse::new(ResponseKind::Explanation, "Let's understand the idea", lesson.explanation)
    }

    fn example(&self, subject: &str, _topic: &str) -> AiResponse {
        let lesson = library::lesson(Subject::resolve(subject));
        AiResponse::new(ResponseKind::Example, "Worked example", lesson.example)
    }

    fn question_count(&self, _subject: &str) -> usize {
        QUESTIONS_PER_SUBJECT
    }

    fn question(&self, subject: &str, _topic: &str, index: usize) -> AiResponse {
        let entry = Self::question_entry(Subject::resolve(subject), index);
        AiResponse::question(
            format!("Question {}", index + 1),
            entry.prompt,
            entry.options.iter().map(|o| o.to_string()).collect(),
            entry.correct_index,
        )
    }

    fn evaluate_answer(&self, subject: &str, question_index: usize, selected: usize) -> Evaluation {
        let entry = Self::question_entry(Subject::resolve(subject), question_index);
        let question = self.question(subject, "", question_index);
        scoring::evaluate(&question, selected, entry.explanation)
    }

    fn revision_points(&self, subject: &str, topic: &str) -> AiResponse {
        let subject = Subject::resolve(subject);
        let points = library::topic(subject, topic)
            .and_then(|entry| entry.revision_points)
            .unwrap_or(library::lesson(subject).revision_points);
        AiResponse::new(
            ResponseKind::Revision,
            format!("Key points: {}", topic),
            points.join("\n"),
        )
    }

    fn follow_up(&self, question: &str) -> AiResponse {
        let index = self.follow_up.choose(question, FOLLOW_UP_RESPONSES.len());
        let reply = FOLLOW_UP_RESPONSES[index % FOLLOW_UP_RESPONSES.len()];
        AiResponse::new(ResponseKind::Followup, "Follow-up", reply)
    }

    fn concept_summary(&self, subject: &str, topic: &str) -> ConceptSummary {
        let subject = Subject::resolve(subject);
        let concept: ConceptEntry = library::topic(subject, topic)
            .and_then(|entry| entry.concept)
            .unwrap_or(library::lesson(subject).concept);

        ConceptSummary {
            subject,
            topic: topic.to_string(),
            definition: concept.definition.to_string(),
            rules: concept.rules.iter().map(|r| r.to_string()).collect(),
            worked_example: concept.worked_example.to_string(),
            common_mistakes: concept.common_mistakes.iter().map(|m| m.to_string()).collect(),
        }
    }
}
