use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use super::voice::Voice;
use crate::error::{ClassroomError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    Cancelled,
    Failed(String),
}

/// Platform speech synthesis.
///
/// `speak` starts an utterance and returns a receiver that resolves when it
/// ends. A dropped sender counts as an interrupted utterance.
pub trait SpeechBackend: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, request: SpeechRequest) -> Result<oneshot::Receiver<PlaybackEnd>>;
    fn cancel(&self);
    /// Returns false if the backend cannot pause mid-utterance.
    fn pause(&self) -> bool;
    fn resume(&self);
}

/// Speaks by spawning an OS text-to-speech program (`say`, `espeak`) with the
/// text as its argument. The child is killed on cancel.
pub struct ProcessBackend {
    program: String,
    voices: Vec<Voice>,
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_voices(program, vec![Voice::new("default", "en")])
    }

    pub fn with_voices(program: impl Into<String>, voices: Vec<Voice>) -> Self {
        Self {
            program: program.into(),
            voices,
            current: Mutex::new(None),
        }
    }
}

impl SpeechBackend for ProcessBackend {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, request: SpeechRequest) -> Result<oneshot::Receiver<PlaybackEnd>> {
        self.cancel();

        let mut command = tokio::process::Command::new(&self.program);
        if let Some(voice) = request.voice.as_ref().filter(|v| v.name != "default") {
            command.arg("-v").arg(&voice.name);
        }
        command.arg(&request.text).kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| ClassroomError::Speech(format!("failed to spawn '{}': {}", self.program, e)))?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(stop_tx);

        tokio::spawn(async move {
            let end = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => PlaybackEnd::Finished,
                    Ok(status) => PlaybackEnd::Failed(format!("speech program exited with {}", status)),
                    Err(e) => PlaybackEnd::Failed(e.to_string()),
                },
                _ = &mut stop_rx => {
                    let _ = child.kill().await;
                    PlaybackEnd::Cancelled
                }
            };
            let _ = done_tx.send(end);
        });

        Ok(done_rx)
    }

    fn cancel(&self) {
        if let Some(stop) = self.current.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = stop.send(());
        }
    }

    fn pause(&self) -> bool {
        debug!("{} cannot pause mid-utterance; ignoring", self.program);
        false
    }

    fn resume(&self) {
        debug!("{} cannot resume mid-utterance; ignoring", self.program);
    }
}
