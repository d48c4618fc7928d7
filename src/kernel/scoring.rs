use super::event::{AiResponse, ResponseKind, SessionResult};
use super::state::Mode;

pub const CORRECT_TITLE: &str = "Correct!";
pub const INCORRECT_TITLE: &str = "Not quite.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    pub response: AiResponse,
}

/// PURE: correctness of a pick against an issued question.
/// A response without a correct index never scores.
pub fn is_correct(question: &AiResponse, selected: usize) -> bool {
    question.correct_index == Some(selected)
}

/// PURE: builds the feedback response for a pick.
pub fn evaluate(question: &AiResponse, selected: usize, explanation: &str) -> Evaluation {
    let correct = is_correct(question, selected);

    let response = if correct {
        AiResponse::new(ResponseKind::Feedback, CORRECT_TITLE, explanation)
    } else {
        let answer = question
            .correct_index
            .and_then(|i| question.options.as_ref().and_then(|opts| opts.get(i)))
            .map(String::as_str)
            .unwrap_or("not available");
        AiResponse::new(
            ResponseKind::Feedback,
            INCORRECT_TITLE,
            format!("The correct answer is: {}. {}", answer, explanation),
        )
    };

    Evaluation { correct, response }
}

/// Wording tier for an aggregate score. Teach mode has no tiers.
pub fn score_message(mode: Mode, score: usize, total: usize) -> &'static str {
    match mode {
        Mode::Revision => {
            if score == total {
                "Outstanding — perfect revision score!"
            } else {
                "Great effort. Keep reviewing these key points regularly."
            }
        }
        Mode::Quiz | Mode::Teach => {
            if score == total {
                "Excellent work — full marks!"
            } else if score >= 2 {
                "Good effort! Review the questions you missed..."
            } else {
                "Keep practising. Revisiting the lesson material will help..."
            }
        }
    }
}

/// Aggregate response shown at the end of quiz and revision sessions.
pub fn score_response(mode: Mode, result: SessionResult) -> AiResponse {
    let title = match mode {
        Mode::Revision => "Revision Complete",
        _ => "Quiz Complete",
    };
    AiResponse::new(
        ResponseKind::Score,
        title,
        format!(
            "You scored {} out of {}. {}",
            result.score,
            result.total_questions,
            score_message(mode, result.score, result.total_questions)
        ),
    )
}

/// Closing response for a teach session.
pub fn completion_response(topic: &str, result: SessionResult) -> AiResponse {
    AiResponse::new(
        ResponseKind::Completed,
        "Lesson Complete!",
        format!(
            "You have finished the lesson on {}. You answered {} of {} correctly.",
            topic, result.score, result.total_questions
        ),
    )
}
