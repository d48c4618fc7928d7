use serde::{Deserialize, Serialize};
use std::fmt;

/// Subjects with a dedicated content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    English,
}

/// Used when a subject name has no table of its own.
pub const DEFAULT_SUBJECT: Subject = Subject::Mathematics;

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Mathematics,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::English,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::English => "English",
        }
    }

    /// Case-insensitive lookup. Accepts a few common short forms.
    pub fn from_name(name: &str) -> Option<Subject> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mathematics" | "maths" | "math" => Some(Subject::Mathematics),
            "physics" => Some(Subject::Physics),
            "chemistry" => Some(Subject::Chemistry),
            "biology" => Some(Subject::Biology),
            "english" | "english language" => Some(Subject::English),
            _ => None,
        }
    }

    /// Explicit get-or-default accessor for the content tables.
    pub fn resolve(name: &str) -> Subject {
        match Subject::from_name(name) {
            Some(subject) => subject,
            None => {
                tracing::debug!("no content table for subject {:?}, using {}", name, DEFAULT_SUBJECT);
                DEFAULT_SUBJECT
            }
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
