use std::sync::Mutex;
use tokio::sync::oneshot;

use super::backend::{PlaybackEnd, SpeechBackend, SpeechRequest};
use super::voice::Voice;
use crate::error::{ClassroomError, Result};

/// In-process backend: records every request and ends utterances only when
/// told to. Suited to tests and headless hosts.
#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    inner: Mutex<ScriptedInner>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    voices: Vec<Voice>,
    requests: Vec<SpeechRequest>,
    pending: Option<oneshot::Sender<PlaybackEnd>>,
    refuse: bool,
    unpausable: bool,
    cancels: usize,
    pauses: usize,
    resumes: usize,
}

impl ScriptedSpeech {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            inner: Mutex::new(ScriptedInner {
                voices,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every following `speak` fail to start.
    pub fn refuse_speech(&self) {
        self.lock().refuse = true;
    }

    /// Makes `pause` report that utterances cannot be paused.
    pub fn refuse_pause(&self) {
        self.lock().unpausable = true;
    }

    pub fn spoken(&self) -> Vec<String> {
        self.lock().requests.iter().map(|r| r.text.clone()).collect()
    }

    pub fn last_request(&self) -> Option<SpeechRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Ends the current utterance normally. False if nothing was playing.
    pub fn finish(&self) -> bool {
        self.end(PlaybackEnd::Finished)
    }

    /// Ends the current utterance with an error.
    pub fn fail(&self, reason: &str) -> bool {
        self.end(PlaybackEnd::Failed(reason.to_string()))
    }

    fn end(&self, end: PlaybackEnd) -> bool {
        match self.lock().pending.take() {
            Some(done) => done.send(end).is_ok(),
            None => false,
        }
    }

    pub fn cancel_count(&self) -> usize {
        self.lock().cancels
    }

    pub fn pause_count(&self) -> usize {
        self.lock().pauses
    }

    pub fn resume_count(&self) -> usize {
        self.lock().resumes
    }
}

impl SpeechBackend for ScriptedSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.lock().voices.clone()
    }

    fn speak(&self, request: SpeechRequest) -> Result<oneshot::Receiver<PlaybackEnd>> {
        let mut inner = self.lock();
        if inner.refuse {
            return Err(ClassroomError::Speech("speech refused".to_string()));
        }
        let (done_tx, done_rx) = oneshot::channel();
        inner.requests.push(request);
        inner.pending = Some(done_tx);
        Ok(done_rx)
    }

    fn cancel(&self) {
        let mut inner = self.lock();
        inner.cancels += 1;
        if let Some(done) = inner.pending.take() {
            let _ = done.send(PlaybackEnd::Cancelled);
        }
    }

    fn pause(&self) -> bool {
        let mut inner = self.lock();
        inner.pauses += 1;
        !inner.unpausable
    }

    fn resume(&self) {
        self.lock().resumes += 1;
    }
}
