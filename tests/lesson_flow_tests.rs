use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use classroom::config::{EngineConfig, NarrationConfig};
use classroom::content::{Library, LengthModulo, FOLLOW_UP_RESPONSES};
use classroom::kernel::{
    EngineSnapshot, EngineState, Mode, ResponseKind, RevisionPhase, SessionResult,
};
use classroom::narration::NarrationChannel;
use classroom::preferences::Preferences;
use classroom::{ClassroomError, LessonEngine, LessonHandle, SessionSpec};

type Completions = Arc<Mutex<Vec<SessionResult>>>;

fn narration() -> NarrationChannel {
    NarrationChannel::simulated(NarrationConfig::default(), Preferences::in_memory())
}

fn launch(
    subject: &str,
    topic: &str,
    mode: Mode,
    narration: &NarrationChannel,
) -> (LessonHandle, Completions) {
    let completions: Completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    let handle = LessonEngine::new(
        SessionSpec::new(subject, topic, mode),
        EngineConfig::default(),
        Arc::new(Library::with_policy(LengthModulo)),
        narration.clone(),
    )
    .on_complete(move |result| sink.lock().unwrap().push(result))
    .spawn();
    (handle, completions)
}

async fn until(
    rx: &mut watch::Receiver<EngineSnapshot>,
    predicate: impl FnMut(&EngineSnapshot) -> bool,
) -> EngineSnapshot {
    rx.wait_for(predicate).await.expect("session ended early").clone()
}

async fn at_question(rx: &mut watch::Receiver<EngineSnapshot>, index: usize) -> EngineSnapshot {
    until(rx, |s| {
        s.state == EngineState::AskingQuestion && s.active_quiz().current_question_index == index
    })
    .await
}

#[tokio::test(start_paused = true)]
async fn test_teach_mode_sequence_and_completion() {
    let narration = narration();
    let (mut handle, completions) = launch("Mathematics", "Algebra", Mode::Teach, &narration);
    let mut rx = handle.subscribe();

    // 1. Observe responses up to the question
    let mut kinds = Vec::new();
    loop {
        let snap = rx.borrow_and_update().clone();
        if let Some(response) = &snap.response {
            if kinds.last() != Some(&response.kind) {
                kinds.push(response.kind);
            }
        }
        if snap.state == EngineState::AskingQuestion {
            break;
        }
        rx.changed().await.unwrap();
    }
    assert_eq!(
        kinds,
        vec![
            ResponseKind::Intro,
            ResponseKind::Explanation,
            ResponseKind::Example,
            ResponseKind::Question
        ]
    );

    let snap = handle.snapshot();
    assert_eq!(snap.quiz.total_questions, 1);
    assert_eq!(snap.response.as_ref().unwrap().correct_index, Some(1));
    assert_eq!(snap.response.as_ref().unwrap().options.as_ref().unwrap().len(), 4);

    // 2. Answer correctly
    handle.answer(1).unwrap();
    let feedback = until(&mut rx, |s| s.state == EngineState::Feedback).await;
    assert_eq!(feedback.response.unwrap().title, "Correct!");
    assert!(completions.lock().unwrap().is_empty(), "No completion before the delay");

    // 3. Completion after the delay
    let done = until(&mut rx, |s| s.result.is_some()).await;
    assert_eq!(done.state, EngineState::Completed);
    assert_eq!(done.response.unwrap().kind, ResponseKind::Completed);
    assert_eq!(
        *completions.lock().unwrap(),
        vec![SessionResult { score: 1, total_questions: 1 }]
    );

    handle.dispose().await;
    assert_eq!(completions.lock().unwrap().len(), 1, "Completion fires exactly once");
}

#[tokio::test(start_paused = true)]
async fn test_quiz_mode_good_effort_tier() {
    let narration = narration();
    let (mut handle, completions) = launch("Physics", "Forces", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    // Physics answers: 1, 2, 1. Learner: right, wrong, right.
    let picks = [1, 0, 1];
    let mut seen_indices = Vec::new();
    for (i, pick) in picks.iter().enumerate() {
        let snap = at_question(&mut rx, i).await;
        seen_indices.push(snap.quiz.current_question_index);
        assert_eq!(snap.quiz.selected_answer_index, None, "Selection cleared for new question");
        handle.answer(*pick).unwrap();
        until(&mut rx, |s| s.state == EngineState::Feedback && s.quiz.current_question_index == i).await;
    }
    assert_eq!(seen_indices, vec![0, 1, 2]);

    let done = until(&mut rx, |s| s.result.is_some()).await;
    let response = done.response.unwrap();
    assert_eq!(response.kind, ResponseKind::Score);
    assert!(response.content.contains("Good effort!"), "got {}", response.content);
    assert_eq!(done.quiz.score, 2);
    assert_eq!(
        *completions.lock().unwrap(),
        vec![SessionResult { score: 2, total_questions: 3 }]
    );

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_quiz_incorrect_feedback_names_correct_option() {
    let narration = narration();
    let (mut handle, _completions) = launch("Physics", "Forces", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    at_question(&mut rx, 0).await;
    handle.answer(0).unwrap();
    let feedback = until(&mut rx, |s| s.state == EngineState::Feedback).await;
    let response = feedback.response.unwrap();
    assert_eq!(response.title, "Not quite.");
    assert!(response.content.contains("Newton"));

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_quiz_all_wrong_keeps_practising() {
    let narration = narration();
    let (mut handle, completions) = launch("Chemistry", "Atoms", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    // Chemistry answers: 2, 1, 0. Pick 3 every time.
    for i in 0..3 {
        at_question(&mut rx, i).await;
        handle.answer(3).unwrap();
    }

    let done = until(&mut rx, |s| s.result.is_some()).await;
    assert!(done.response.unwrap().content.contains("Keep practising."));
    assert_eq!(done.quiz.score, 0);
    assert_eq!(
        *completions.lock().unwrap(),
        vec![SessionResult { score: 0, total_questions: 3 }]
    );

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_double_answer_is_ignored() {
    let narration = narration();
    let (mut handle, _completions) = launch("Physics", "Forces", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    at_question(&mut rx, 0).await;
    handle.answer(1).unwrap();
    handle.answer(0).unwrap();

    let feedback = until(&mut rx, |s| s.state == EngineState::Feedback).await;
    assert_eq!(feedback.quiz.selected_answer_index, Some(1), "First pick stands");
    assert_eq!(feedback.quiz.score, 1);

    let next = at_question(&mut rx, 1).await;
    assert_eq!(next.quiz.score, 1, "Second click changed nothing");

    let telemetry = handle.telemetry();
    assert_eq!(telemetry.answers.submitted, 1);
    assert_eq!(telemetry.answers.ignored, 1);

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_answer_outside_question_phase_is_ignored() {
    let narration = narration();
    let (mut handle, _completions) = launch("Mathematics", "Algebra", Mode::Teach, &narration);
    let mut rx = handle.subscribe();

    until(&mut rx, |s| s.state == EngineState::Explaining).await;
    handle.answer(1).unwrap();

    let snap = at_question(&mut rx, 0).await;
    assert_eq!(snap.quiz.selected_answer_index, None);
    assert_eq!(snap.quiz.score, 0);
    assert_eq!(handle.telemetry().answers.ignored, 1);

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_revision_flow_is_tracked_separately() {
    let narration = narration();
    let (mut handle, completions) = launch("Chemistry", "Periodic Table", Mode::Revision, &narration);
    let mut rx = handle.subscribe();

    // 1. Points shown and held until the learner asks for questions
    let points = until(&mut rx, |s| s.response.is_some()).await;
    assert_eq!(points.state, EngineState::Explaining);
    assert_eq!(points.revision_phase, Some(RevisionPhase::Points));
    assert_eq!(points.response.as_ref().unwrap().kind, ResponseKind::Revision);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(handle.snapshot().state, EngineState::Explaining, "Points wait for the learner");

    // 2. Rapid-fire, all correct (Chemistry answers: 2, 1, 0)
    handle.start_rapid_fire().unwrap();
    for (i, pick) in [2, 1, 0].iter().enumerate() {
        let snap = at_question(&mut rx, i).await;
        assert_eq!(snap.revision_phase, Some(RevisionPhase::Questions));
        handle.answer(*pick).unwrap();
    }

    let done = until(&mut rx, |s| s.result.is_some()).await;
    assert!(done
        .response
        .unwrap()
        .content
        .contains("Outstanding — perfect revision score!"));
    assert_eq!(done.revision.score, 3);
    assert_eq!(done.revision.total_questions, 3);
    assert_eq!(done.quiz.score, 0, "Quiz track untouched");
    assert_eq!(
        *completions.lock().unwrap(),
        vec![SessionResult { score: 3, total_questions: 3 }]
    );

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_revision_imperfect_score_wording() {
    let narration = narration();
    let (mut handle, _completions) = launch("Biology", "Cells", Mode::Revision, &narration);
    let mut rx = handle.subscribe();

    until(&mut rx, |s| s.response.is_some()).await;
    handle.start_rapid_fire().unwrap();
    for i in 0..3 {
        at_question(&mut rx, i).await;
        handle.answer(3).unwrap();
    }

    let done = until(&mut rx, |s| s.result.is_some()).await;
    assert!(done
        .response
        .unwrap()
        .content
        .contains("Great effort. Keep reviewing these key points regularly."));

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_pause_holds_delay_transition() {
    let narration = narration();
    let (mut handle, _completions) = launch("Mathematics", "Algebra", Mode::Teach, &narration);
    let mut rx = handle.subscribe();

    // 1. Pause while the intro is up
    until(&mut rx, |s| s.state == EngineState::Explaining).await;
    assert!(narration.state().is_speaking);
    handle.pause().unwrap();
    until(&mut rx, |s| s.paused).await;
    assert!(narration.state().is_paused, "Narration paused with the lesson");

    // 2. Nothing advances while paused
    tokio::time::sleep(Duration::from_secs(60)).await;
    let held = handle.snapshot();
    assert_eq!(held.state, EngineState::Explaining);
    assert_eq!(held.response.unwrap().kind, ResponseKind::Intro);

    // 3. Resume: the sequence carries on, narration not auto-resumed
    handle.resume().unwrap();
    until(&mut rx, |s| !s.paused).await;
    assert!(narration.state().is_paused, "Engine does not resume narration");

    let example = until(&mut rx, |s| s.state == EngineState::Example).await;
    assert_eq!(example.response.unwrap().kind, ResponseKind::Example);

    let telemetry = handle.telemetry();
    assert_eq!(telemetry.pauses.count, 1);
    assert!(telemetry.pauses.total_paused_ms >= 60_000);

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_follow_up_does_not_touch_state() {
    let narration = narration();
    let (mut handle, _completions) = launch("Physics", "Forces", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    let before = at_question(&mut rx, 0).await;
    handle.ask("why?").unwrap();

    let after = until(&mut rx, |s| s.follow_up.is_some()).await;
    let reply = after.follow_up.clone().unwrap();
    assert_eq!(reply.kind, ResponseKind::Followup);
    assert_eq!(reply.content, FOLLOW_UP_RESPONSES["why?".len() % FOLLOW_UP_RESPONSES.len()]);
    assert_eq!(after.state, before.state);
    assert_eq!(after.response, before.response, "Question still on screen");
    assert_eq!(after.quiz, before.quiz);

    // Still answerable
    handle.answer(1).unwrap();
    let feedback = until(&mut rx, |s| s.state == EngineState::Feedback).await;
    assert_eq!(feedback.quiz.score, 1);

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_everything_without_completion() {
    let narration = narration();
    let (mut handle, completions) = launch("Mathematics", "Algebra", Mode::Teach, &narration);
    let mut rx = handle.subscribe();

    until(&mut rx, |s| s.state == EngineState::Explaining).await;
    assert!(narration.state().is_speaking);

    handle.dispose().await;

    assert!(handle.is_finished());
    assert!(!narration.state().is_speaking, "Narration stopped on dispose");
    assert!(completions.lock().unwrap().is_empty(), "Disposed sessions never complete");
    assert!(matches!(handle.answer(0), Err(ClassroomError::SessionEnded)));
    assert!(handle.telemetry().disposed);
}

#[tokio::test(start_paused = true)]
async fn test_completed_session_still_answers_follow_ups() {
    let narration = narration();
    let (mut handle, completions) = launch("English", "Sentences", Mode::Teach, &narration);
    let mut rx = handle.subscribe();

    at_question(&mut rx, 0).await;
    handle.answer(2).unwrap();
    until(&mut rx, |s| s.result.is_some()).await;

    handle.ask("what next?").unwrap();
    let after = until(&mut rx, |s| s.follow_up.is_some()).await;
    assert_eq!(after.state, EngineState::Completed);
    assert_eq!(completions.lock().unwrap().len(), 1);

    handle.dispose().await;
}

#[tokio::test(start_paused = true)]
async fn test_narration_started_while_paused_stays_paused() {
    let narration = narration();
    let (mut handle, _completions) = launch("Physics", "Forces", Mode::Quiz, &narration);
    let mut rx = handle.subscribe();

    // 1. Pause with the first question up
    at_question(&mut rx, 0).await;
    handle.pause().unwrap();
    until(&mut rx, |s| s.paused).await;

    // 2. Answering while paused still shows feedback, but its narration is held
    handle.answer(1).unwrap();
    let feedback = until(&mut rx, |s| s.state == EngineState::Feedback).await;
    assert!(feedback.paused);
    let state = narration.state();
    assert!(state.is_speaking && state.is_paused, "got {:?}", state);

    // 3. Same for a follow-up reply
    handle.ask("why?").unwrap();
    let after = until(&mut rx, |s| s.follow_up.is_some()).await;
    assert!(after.paused);
    let state = narration.state();
    assert!(state.is_speaking && state.is_paused, "got {:?}", state);

    // 4. The feedback delay is frozen too
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.snapshot().state, EngineState::Feedback);

    handle.resume().unwrap();
    narration.resume();
    at_question(&mut rx, 1).await;

    handle.dispose().await;
}
