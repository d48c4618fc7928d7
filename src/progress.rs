use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::SystemTime;
use uuid::Uuid;

use crate::kernel::engine::SessionSpec;
use crate::kernel::event::SessionResult;
use crate::kernel::state::Mode;

/// One completed lesson session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub subject: String,
    pub topic: String,
    pub mode: Mode,
    pub score: usize,
    pub total_questions: usize,
    pub recorded_at: SystemTime,
}

impl SessionRecord {
    pub fn new(id: Uuid, spec: &SessionSpec, result: SessionResult) -> Self {
        Self {
            id,
            subject: spec.subject.clone(),
            topic: spec.topic.clone(),
            mode: spec.mode,
            score: result.score,
            total_questions: result.total_questions,
            recorded_at: SystemTime::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub sessions: usize,
    pub questions_answered: usize,
    pub correct: usize,
    /// correct / questions_answered, 0.0 before any answer.
    pub accuracy: f64,
}

/// Learner progress across sessions.
pub trait ProgressStore: Send + Sync {
    fn record(&self, record: SessionRecord);
    fn history(&self, subject: &str) -> Vec<SessionRecord>;
    fn all(&self) -> Vec<SessionRecord>;

    /// Per-subject totals, keyed by subject name as recorded.
    fn summary(&self) -> BTreeMap<String, SubjectProgress> {
        let mut summary: BTreeMap<String, SubjectProgress> = BTreeMap::new();
        for record in self.all() {
            let entry = summary.entry(record.subject.clone()).or_default();
            entry.sessions += 1;
            entry.questions_answered += record.total_questions;
            entry.correct += record.score;
        }
        for progress in summary.values_mut() {
            if progress.questions_answered > 0 {
                progress.accuracy = progress.correct as f64 / progress.questions_answered as f64;
            }
        }
        summary
    }
}

/// Instance-owned store: each value has its own records.
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.all())?)
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn record(&self, record: SessionRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    fn history(&self, subject: &str) -> Vec<SessionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.subject.eq_ignore_ascii_case(subject))
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<SessionRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
