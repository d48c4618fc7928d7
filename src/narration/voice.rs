use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `en-GB`.
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    pub fn is_english(&self) -> bool {
        self.lang.to_ascii_lowercase().starts_with("en")
    }
}

/// PURE: preferred named English voice, else first English voice,
/// else first voice at all.
pub fn select_voice(voices: &[Voice], preferred: &[String]) -> Option<Voice> {
    for name in preferred {
        if let Some(voice) = voices.iter().find(|v| v.is_english() && v.name.contains(name.as_str())) {
            return Some(voice.clone());
        }
    }

    voices
        .iter()
        .find(|v| v.is_english())
        .or_else(|| voices.first())
        .cloned()
}
