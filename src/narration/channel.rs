use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::backend::{PlaybackEnd, SpeechBackend, SpeechRequest};
use super::voice::{select_voice, Voice};
use crate::config::NarrationConfig;
use crate::kernel::time::pausable_sleep;
use crate::preferences::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NarrationState {
    pub is_speaking: bool,
    pub is_muted: bool,
    pub is_paused: bool,
}

enum LivePath {
    Platform,
    /// Sender drives the simulated timer's pause flag.
    Simulated(watch::Sender<bool>),
}

#[derive(Default)]
struct Live {
    /// Bumped on every speak/stop; a finishing task only counts if it still matches.
    generation: u64,
    task: Option<JoinHandle<()>>,
    path: Option<LivePath>,
}

struct Inner {
    backend: Option<Arc<dyn SpeechBackend>>,
    voice: Option<Voice>,
    config: NarrationConfig,
    preferences: Preferences,
    state: watch::Sender<NarrationState>,
    live: Mutex<Live>,
}

impl Inner {
    fn lock_live(&self) -> MutexGuard<'_, Live> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_speaking(&self, speaking: bool) {
        self.state.send_modify(|s| {
            s.is_speaking = speaking;
            s.is_paused = false;
        });
    }

    /// Cancels whatever is live. Caller holds the lock.
    fn halt(&self, live: &mut Live) {
        live.generation += 1;
        if let Some(task) = live.task.take() {
            task.abort();
        }
        if let Some(LivePath::Platform) = live.path.take() {
            if let Some(backend) = &self.backend {
                backend.cancel();
            }
        }
        self.set_speaking(false);
    }

    fn finish(&self, generation: u64) {
        let mut live = self.lock_live();
        if live.generation != generation {
            // Superseded: the newer utterance owns the state now.
            return;
        }
        live.task = None;
        live.path = None;
        self.set_speaking(false);
    }
}

/// Speaks responses aloud, or simulates the same timing without audio.
///
/// Exactly one utterance or simulated timer is live at a time. Starting a new
/// one supersedes the previous, whose completion is then never reported.
///
/// `speak` spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct NarrationChannel {
    inner: Arc<Inner>,
}

impl NarrationChannel {
    pub fn new(
        config: NarrationConfig,
        backend: Option<Arc<dyn SpeechBackend>>,
        preferences: Preferences,
    ) -> Self {
        let voice = backend
            .as_ref()
            .and_then(|b| select_voice(&b.voices(), &config.preferred_voices));
        let (state, _) = watch::channel(NarrationState {
            is_muted: preferences.muted(),
            ..Default::default()
        });

        if backend.is_none() {
            debug!("no speech backend; narration will be simulated");
        }

        Self {
            inner: Arc::new(Inner {
                backend,
                voice,
                config,
                preferences,
                state,
                live: Mutex::new(Live::default()),
            }),
        }
    }

    /// A channel without platform speech: every utterance is simulated.
    pub fn simulated(config: NarrationConfig, preferences: Preferences) -> Self {
        Self::new(config, None, preferences)
    }

    pub fn state(&self) -> NarrationState {
        *self.inner.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NarrationState> {
        self.inner.state.subscribe()
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.inner.voice.as_ref()
    }

    pub fn is_supported(&self) -> bool {
        self.inner.backend.is_some()
    }

    pub fn speak(&self, text: &str) {
        let inner = &self.inner;
        let mut live = inner.lock_live();
        inner.halt(&mut live);
        let generation = live.generation;

        let backend = if inner.state.borrow().is_muted {
            None
        } else {
            inner.backend.clone()
        };

        if let Some(backend) = backend {
            let request = SpeechRequest {
                text: text.to_string(),
                voice: inner.voice.clone(),
                rate: inner.config.rate,
                pitch: inner.config.pitch,
            };
            match backend.speak(request) {
                Ok(done) => {
                    live.path = Some(LivePath::Platform);
                    inner.set_speaking(true);
                    let owner = Arc::clone(&self.inner);
                    live.task = Some(tokio::spawn(async move {
                        match done.await {
                            Ok(PlaybackEnd::Failed(reason)) => warn!("speech failed: {}", reason),
                            Ok(_) => {}
                            Err(_) => debug!("utterance dropped by backend"),
                        }
                        owner.finish(generation);
                    }));
                    return;
                }
                Err(e) => warn!("speech backend unavailable ({}); simulating", e),
            }
        }

        let duration = inner.config.simulated_duration(text);
        let (pause_tx, pause_rx) = watch::channel(false);
        live.path = Some(LivePath::Simulated(pause_tx));
        inner.set_speaking(true);
        let owner = Arc::clone(&self.inner);
        live.task = Some(tokio::spawn(async move {
            pausable_sleep(duration, pause_rx).await;
            owner.finish(generation);
        }));
    }

    pub fn stop(&self) {
        let mut live = self.inner.lock_live();
        self.inner.halt(&mut live);
    }

    /// Pauses the live utterance. The simulated timer freezes too.
    /// A backend that cannot pause keeps talking and `is_paused` stays false.
    pub fn pause(&self) {
        let live = self.inner.lock_live();
        let state = self.state();
        if !state.is_speaking || state.is_paused {
            return;
        }
        let paused = match &live.path {
            Some(LivePath::Platform) => self
                .inner
                .backend
                .as_ref()
                .map_or(false, |backend| backend.pause()),
            Some(LivePath::Simulated(flag)) => {
                flag.send_replace(true);
                true
            }
            None => false,
        };
        if paused {
            self.inner.state.send_modify(|s| s.is_paused = true);
        } else {
            debug!("speech backend cannot pause; utterance continues");
        }
    }

    pub fn resume(&self) {
        let live = self.inner.lock_live();
        if !self.state().is_paused {
            return;
        }
        match &live.path {
            Some(LivePath::Platform) => {
                if let Some(backend) = &self.inner.backend {
                    backend.resume();
                }
            }
            Some(LivePath::Simulated(flag)) => {
                flag.send_replace(false);
            }
            None => {}
        }
        self.inner.state.send_modify(|s| s.is_paused = false);
    }

    /// Flips and persists the mute flag. Muting while speaking stops at once.
    /// Returns the new value.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.state().is_muted;
        self.set_muted(muted);
        muted
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.state.send_modify(|s| s.is_muted = muted);
        if let Err(e) = self.inner.preferences.set_muted(muted) {
            warn!("could not persist mute preference: {}", e);
        }
        if muted && self.state().is_speaking {
            self.stop();
        }
    }
}
