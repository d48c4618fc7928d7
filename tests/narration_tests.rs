use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use classroom::config::NarrationConfig;
use classroom::narration::{
    select_voice, NarrationChannel, NarrationState, ProcessBackend, ScriptedSpeech,
    SpeechBackend, SpeechRequest, Voice,
};
use classroom::ClassroomError;
use classroom::preferences::Preferences;

fn simulated() -> NarrationChannel {
    NarrationChannel::simulated(NarrationConfig::default(), Preferences::in_memory())
}

fn with_backend(backend: &Arc<ScriptedSpeech>, preferences: Preferences) -> NarrationChannel {
    let backend: Arc<dyn SpeechBackend> = backend.clone();
    NarrationChannel::new(NarrationConfig::default(), Some(backend), preferences)
}

fn voices() -> Vec<Voice> {
    vec![
        Voice::new("Alex", "en-US"),
        Voice::new("Samantha", "en-US"),
        Voice::new("Thomas", "fr-FR"),
    ]
}

async fn until_silent(narration: &NarrationChannel) {
    narration
        .subscribe()
        .wait_for(|s: &NarrationState| !s.is_speaking)
        .await
        .expect("narration state dropped");
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[test]
fn test_simulated_duration_bounds() {
    let config = NarrationConfig::default();
    assert_eq!(config.simulated_duration(""), Duration::from_millis(1000));
    assert_eq!(config.simulated_duration("short one"), Duration::from_millis(1000));
    assert_eq!(config.simulated_duration(&words(6)), Duration::from_millis(1000));
    assert_eq!(config.simulated_duration(&words(7)), Duration::from_millis(1050));
    assert_eq!(config.simulated_duration(&words(20)), Duration::from_millis(3000));
}

#[test]
fn test_voice_selection_order() {
    let preferred = NarrationConfig::default().preferred_voices;

    let picked = select_voice(&voices(), &preferred).unwrap();
    assert_eq!(picked.name, "Samantha");

    let no_preferred = vec![Voice::new("Thomas", "fr-FR"), Voice::new("Alex", "en-GB")];
    assert_eq!(select_voice(&no_preferred, &preferred).unwrap().name, "Alex");

    let no_english = vec![Voice::new("Thomas", "fr-FR"), Voice::new("Anna", "de-DE")];
    assert_eq!(select_voice(&no_english, &preferred).unwrap().name, "Thomas");

    assert!(select_voice(&[], &preferred).is_none());
}

#[test]
fn test_preferred_voice_must_be_english() {
    let preferred = vec!["Daniel".to_string()];
    let voices = vec![Voice::new("Daniel", "de-DE"), Voice::new("Karen", "en-AU")];
    assert_eq!(select_voice(&voices, &preferred).unwrap().name, "Karen");
}

#[tokio::test(start_paused = true)]
async fn test_simulated_speech_runs_for_word_count() {
    let narration = simulated();
    assert!(!narration.is_supported());

    let start = Instant::now();
    narration.speak(&words(10));
    assert!(narration.state().is_speaking);

    until_silent(&narration).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1550), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_utterance_never_reports_completion() {
    let narration = simulated();

    // 1. Short utterance, replaced halfway through by a long one
    narration.speak("first");
    tokio::time::sleep(Duration::from_millis(500)).await;
    let second_started = Instant::now();
    narration.speak(&words(20));

    // 2. Past the first utterance's end, still speaking the second
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(narration.state().is_speaking, "First timer must not end the second utterance");

    until_silent(&narration).await;
    assert!(second_started.elapsed() >= Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_stop_silences_immediately() {
    let narration = simulated();
    narration.speak(&words(12));
    assert!(narration.state().is_speaking);

    narration.stop();
    assert!(!narration.state().is_speaking);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(narration.state(), NarrationState::default());
}

#[tokio::test(start_paused = true)]
async fn test_simulated_pause_freezes_remaining_time() {
    let narration = simulated();
    narration.speak("pause me");

    // 1. Pause 400ms in, hold for a while
    tokio::time::sleep(Duration::from_millis(400)).await;
    narration.pause();
    assert!(narration.state().is_paused);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let held = narration.state();
    assert!(held.is_speaking && held.is_paused);

    // 2. Resume: only the remaining 600ms is left
    let resumed_at = Instant::now();
    narration.resume();
    assert!(!narration.state().is_paused);

    until_silent(&narration).await;
    let remaining = resumed_at.elapsed();
    assert!(remaining >= Duration::from_millis(600), "remaining {:?}", remaining);
    assert!(remaining < Duration::from_millis(650), "remaining {:?}", remaining);
}

#[tokio::test(start_paused = true)]
async fn test_pause_without_speech_is_noop() {
    let narration = simulated();
    narration.pause();
    assert!(!narration.state().is_paused);
    narration.resume();
    assert_eq!(narration.state(), NarrationState::default());
}

#[tokio::test(start_paused = true)]
async fn test_mute_while_speaking_stops_and_persists() {
    let preferences = Preferences::in_memory();
    let narration = NarrationChannel::simulated(NarrationConfig::default(), preferences.clone());

    narration.speak(&words(10));
    assert!(narration.toggle_mute());

    let state = narration.state();
    assert!(state.is_muted);
    assert!(!state.is_speaking, "Muting stops the live utterance");
    assert!(preferences.muted());

    assert!(!narration.toggle_mute());
    assert!(!preferences.muted());
}

#[tokio::test(start_paused = true)]
async fn test_initial_mute_comes_from_preferences() {
    let preferences = Preferences::in_memory();
    preferences.set_muted(true).unwrap();

    let narration = NarrationChannel::simulated(NarrationConfig::default(), preferences);
    assert!(narration.state().is_muted);
}

#[tokio::test(start_paused = true)]
async fn test_platform_speech_uses_selected_voice() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    let narration = with_backend(&backend, Preferences::in_memory());
    assert!(narration.is_supported());
    assert_eq!(narration.voice().map(|v| v.name.as_str()), Some("Samantha"));

    narration.speak("Welcome to Physics");
    assert!(narration.state().is_speaking);
    assert_eq!(backend.spoken(), vec!["Welcome to Physics".to_string()]);

    let request = backend.last_request().unwrap();
    assert_eq!(request.voice.unwrap().name, "Samantha");
    assert_eq!(request.rate, 1.0);

    // Platform speech only ends when the backend says so
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(narration.state().is_speaking);

    assert!(backend.finish());
    until_silent(&narration).await;
    assert!(!backend.finish(), "Nothing left to finish");
}

#[tokio::test(start_paused = true)]
async fn test_platform_supersession_cancels_previous_utterance() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    let narration = with_backend(&backend, Preferences::in_memory());

    narration.speak("one");
    narration.speak("two");
    assert_eq!(backend.cancel_count(), 1);
    assert_eq!(backend.spoken(), vec!["one".to_string(), "two".to_string()]);

    tokio::task::yield_now().await;
    assert!(narration.state().is_speaking, "Cancelled utterance does not end the new one");

    assert!(backend.finish());
    until_silent(&narration).await;
}

#[tokio::test(start_paused = true)]
async fn test_platform_failure_ends_speaking() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    let narration = with_backend(&backend, Preferences::in_memory());

    narration.speak("this will break");
    assert!(backend.fail("audio device lost"));
    until_silent(&narration).await;
}

#[tokio::test(start_paused = true)]
async fn test_platform_pause_and_resume_forward_to_backend() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    let narration = with_backend(&backend, Preferences::in_memory());

    narration.speak("long sentence");
    narration.pause();
    narration.pause();
    assert_eq!(backend.pause_count(), 1);
    assert!(narration.state().is_paused);

    narration.resume();
    assert_eq!(backend.resume_count(), 1);
    assert!(!narration.state().is_paused);

    narration.stop();
    assert_eq!(backend.cancel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_muted_channel_never_reaches_backend() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    let preferences = Preferences::in_memory();
    preferences.set_muted(true).unwrap();
    let narration = with_backend(&backend, preferences);

    let start = Instant::now();
    narration.speak("quiet please");
    assert!(narration.state().is_speaking, "Muted speech is still simulated");
    assert!(backend.spoken().is_empty());

    until_silent(&narration).await;
    assert!(start.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_refused_speech_falls_back_to_simulation() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    backend.refuse_speech();
    let narration = with_backend(&backend, Preferences::in_memory());

    let start = Instant::now();
    narration.speak(&words(10));
    assert!(narration.state().is_speaking);
    assert!(backend.spoken().is_empty());

    until_silent(&narration).await;
    assert!(start.elapsed() >= Duration::from_millis(1500));
}

#[tokio::test]
async fn test_missing_speech_program_is_reported() {
    let backend = ProcessBackend::new("classroom-no-such-tts-program");
    assert_eq!(backend.voices(), vec![Voice::new("default", "en")]);

    let request = SpeechRequest {
        text: "hello".to_string(),
        voice: None,
        rate: 1.0,
        pitch: 1.0,
    };
    assert!(matches!(backend.speak(request), Err(ClassroomError::Speech(_))));
}

#[tokio::test(start_paused = true)]
async fn test_missing_speech_program_falls_back_to_simulation() {
    let backend: Arc<dyn SpeechBackend> = Arc::new(ProcessBackend::new("classroom-no-such-tts-program"));
    let narration = NarrationChannel::new(NarrationConfig::default(), Some(backend), Preferences::in_memory());

    narration.speak("still heard");
    assert!(narration.state().is_speaking);
    until_silent(&narration).await;
}

#[tokio::test(start_paused = true)]
async fn test_unpausable_backend_is_not_reported_paused() {
    let backend = Arc::new(ScriptedSpeech::new(voices()));
    backend.refuse_pause();
    let narration = with_backend(&backend, Preferences::in_memory());

    narration.speak("keeps talking");
    narration.pause();
    assert_eq!(backend.pause_count(), 1);
    let state = narration.state();
    assert!(state.is_speaking);
    assert!(!state.is_paused, "Backend could not pause");

    narration.resume();
    assert_eq!(backend.resume_count(), 0, "Nothing to resume");

    assert!(backend.finish());
    until_silent(&narration).await;
}
