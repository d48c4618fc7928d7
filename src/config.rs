use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

pub const CONFIG_ENV: &str = "CLASSROOM_CONFIG";

/// Step timings for the lesson engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum reading time after intro, explanation and example.
    pub step_delay_ms: u64,
    /// Reading time after feedback before the next question or the result.
    pub feedback_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 4_000,
            feedback_delay_ms: 3_000,
        }
    }
}

impl EngineConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Simulated speaking time per word when muted or without a backend.
    pub ms_per_word: u64,
    /// Floor for simulated speaking time.
    pub min_duration_ms: u64,
    /// Voice names tried first, in order, among English voices.
    pub preferred_voices: Vec<String>,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            ms_per_word: 150,
            min_duration_ms: 1_000,
            preferred_voices: vec![
                "Google UK English Female".to_string(),
                "Microsoft Zira".to_string(),
                "Samantha".to_string(),
                "Daniel".to_string(),
            ],
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl NarrationConfig {
    /// `max(words × ms_per_word, min_duration)`.
    pub fn simulated_duration(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count() as u64;
        Duration::from_millis((words * self.ms_per_word).max(self.min_duration_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    pub engine: EngineConfig,
    pub narration: NarrationConfig,
    pub follow_up_seed: u64,
    /// Where mute and theme flags persist. None keeps them in memory.
    pub preferences_path: Option<PathBuf>,
    /// Text-to-speech program for the process backend, e.g. `say` or `espeak`.
    pub speech_program: Option<String>,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            narration: NarrationConfig::default(),
            follow_up_seed: crate::content::provider::DEFAULT_FOLLOW_UP_SEED,
            preferences_path: None,
            speech_program: None,
        }
    }
}

impl ClassroomConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reads the file named by `CLASSROOM_CONFIG`, or returns defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
