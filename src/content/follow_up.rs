use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Generic replies for free-text questions asked during a lesson.
pub const FOLLOW_UP_RESPONSES: [&str; 5] = [
    "That's a great question! The key idea is to connect it back to the main concept we just covered. Try applying the rule step by step.",
    "Good thinking. Look again at the worked example: the same method applies here, just with different numbers.",
    "I'm glad you asked. Many learners find this tricky at first. Break the problem into smaller parts and tackle one at a time.",
    "Let's think about it together. What do you already know, and what are you trying to find? Writing both down usually shows the next step.",
    "Excellent curiosity! Review the key points from this lesson and see which one fits your question best.",
];

/// Picks which canned reply answers a follow-up question.
pub trait FollowUpPolicy: Send + Sync {
    fn choose(&self, question: &str, candidates: usize) -> usize;
}

/// Reply chosen by the question's character count modulo the reply count.
#[derive(Debug, Default, Clone, Copy)]
pub struct LengthModulo;

impl FollowUpPolicy for LengthModulo {
    fn choose(&self, question: &str, candidates: usize) -> usize {
        if candidates == 0 {
            return 0;
        }
        question.chars().count() % candidates
    }
}

/// Seeded pseudo-random choice. Two policies built from the same seed
/// produce the same sequence of picks.
#[derive(Debug)]
pub struct SeededChoice {
    rng: Mutex<StdRng>,
}

impl SeededChoice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FollowUpPolicy for SeededChoice {
    fn choose(&self, _question: &str, candidates: usize) -> usize {
        if candidates == 0 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..candidates)
    }
}
