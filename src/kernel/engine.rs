use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::event::{AiResponse, EngineCommand, SessionResult};
use super::scoring;
use super::state::{EngineSnapshot, EngineState, Mode, QuizState, RevisionPhase};
use super::telemetry::event::SessionEvent;
use super::telemetry::metrics::TelemetrySnapshot;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::StepTimer;
use super::transition::{StepGraph, Trigger};
use crate::config::EngineConfig;
use crate::content::ContentProvider;
use crate::error::{ClassroomError, Result};
use crate::narration::NarrationChannel;

/// Called once, when a session reaches `completed`.
pub type OnComplete = Box<dyn FnOnce(SessionResult) + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpec {
    pub subject: String,
    pub topic: String,
    pub mode: Mode,
}

impl SessionSpec {
    pub fn new(subject: impl Into<String>, topic: impl Into<String>, mode: Mode) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
            mode,
        }
    }
}

/// Builds and launches one lesson session.
pub struct LessonEngine {
    spec: SessionSpec,
    config: EngineConfig,
    content: Arc<dyn ContentProvider>,
    narration: NarrationChannel,
    on_complete: Option<OnComplete>,
}

impl LessonEngine {
    pub fn new(
        spec: SessionSpec,
        config: EngineConfig,
        content: Arc<dyn ContentProvider>,
        narration: NarrationChannel,
    ) -> Self {
        Self {
            spec,
            config,
            content,
            narration,
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, callback: impl FnOnce(SessionResult) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Starts the session on the current tokio runtime.
    pub fn spawn(self) -> LessonHandle {
        let id = Uuid::new_v4();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(EngineSnapshot::new(self.spec.mode));
        let telemetry = Arc::new(Mutex::new(TelemetryRecorder::new(id)));
        let cancel = CancellationToken::new();

        let session = Session {
            id,
            snapshot: EngineSnapshot::new(self.spec.mode),
            spec: self.spec,
            config: self.config,
            content: self.content,
            narration: self.narration,
            on_complete: self.on_complete,
            commands: commands_rx,
            view: view_tx,
            telemetry: Arc::clone(&telemetry),
            cancel: cancel.clone(),
            paused_at: None,
        };

        let task = tokio::spawn(session.run());

        LessonHandle {
            id,
            commands: commands_tx,
            view: view_rx,
            telemetry,
            cancel,
            task: Some(task),
        }
    }
}

/// Host-side control of a running session.
///
/// The host must call [`LessonHandle::dispose`] when the lesson view closes.
/// Dropping the handle also cancels the session, but without waiting for it.
pub struct LessonHandle {
    id: Uuid,
    commands: mpsc::UnboundedSender<EngineCommand>,
    view: watch::Receiver<EngineSnapshot>,
    telemetry: Arc<Mutex<TelemetryRecorder>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LessonHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn answer(&self, index: usize) -> Result<()> {
        self.send(EngineCommand::Answer(index))
    }

    pub fn start_rapid_fire(&self) -> Result<()> {
        self.send(EngineCommand::StartRapidFire)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(EngineCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(EngineCommand::Resume)
    }

    /// Free-text follow-up question. Never affects state or score.
    pub fn ask(&self, question: impl Into<String>) -> Result<()> {
        self.send(EngineCommand::FollowUp(question.into()))
    }

    pub fn send(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ClassroomError::SessionEnded)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.view.clone()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Cancels the session and returns once its task has exited: narration
    /// is stopped and no engine timer is left running.
    pub async fn dispose(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!(session = %self.id, "lesson task panicked");
                }
            }
        }
    }
}

impl Drop for LessonHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Quiz,
    Revision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Delay(Duration),
    Answer,
    RapidFire,
    Disposal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Elapsed,
    Answer(usize),
    RapidFire,
}

/// The session actor. Owns the snapshot; the handle only sees published copies.
struct Session {
    id: Uuid,
    spec: SessionSpec,
    config: EngineConfig,
    content: Arc<dyn ContentProvider>,
    narration: NarrationChannel,
    on_complete: Option<OnComplete>,
    commands: mpsc::UnboundedReceiver<EngineCommand>,
    view: watch::Sender<EngineSnapshot>,
    snapshot: EngineSnapshot,
    telemetry: Arc<Mutex<TelemetryRecorder>>,
    cancel: CancellationToken,
    paused_at: Option<Instant>,
}

impl Session {
    async fn run(mut self) {
        info!(
            session = %self.id,
            mode = %self.spec.mode,
            subject = %self.spec.subject,
            topic = %self.spec.topic,
            "lesson session started"
        );

        let outcome = match self.spec.mode {
            Mode::Teach => self.run_teach().await,
            Mode::Quiz => self.run_quiz().await,
            Mode::Revision => self.run_revision().await,
        };

        // Completed sessions stay up for follow-ups until disposed.
        let outcome = match outcome {
            Ok(()) => self.wait(Until::Disposal).await.map(|_| ()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) | Err(ClassroomError::Disposed) => {
                info!(session = %self.id, state = ?self.snapshot.state, "lesson session closed")
            }
            Err(e) => error!(session = %self.id, "lesson session aborted: {}", e),
        }

        self.narration.stop();
        self.record(SessionEvent::Disposed);
    }

    async fn run_teach(&mut self) -> Result<()> {
        let (subject, topic) = (self.spec.subject.clone(), self.spec.topic.clone());

        self.enter(Trigger::SessionStart)?;
        let intro = self.content.lesson_intro(&subject, &topic);
        self.show(intro);
        self.pause_for(self.config.step_delay()).await?;

        self.enter(Trigger::IntroRead)?;
        let explanation = self.content.explanation(&subject, &topic);
        self.show(explanation);
        self.pause_for(self.config.step_delay()).await?;

        self.enter(Trigger::ExplanationRead)?;
        let example = self.content.example(&subject, &topic);
        self.show(example);
        self.pause_for(self.config.step_delay()).await?;

        self.enter(Trigger::ExampleRead)?;
        self.run_questions(Track::Quiz).await?;

        let result = self.snapshot.quiz.result();
        self.show(scoring::completion_response(&topic, result));
        self.complete(result);
        Ok(())
    }

    async fn run_quiz(&mut self) -> Result<()> {
        self.enter(Trigger::SessionStart)?;
        self.run_questions(Track::Quiz).await?;

        let result = self.snapshot.quiz.result();
        self.show(scoring::score_response(Mode::Quiz, result));
        self.complete(result);
        Ok(())
    }

    async fn run_revision(&mut self) -> Result<()> {
        let (subject, topic) = (self.spec.subject.clone(), self.spec.topic.clone());

        self.enter(Trigger::SessionStart)?;
        self.snapshot.revision_phase = Some(RevisionPhase::Points);
        let points = self.content.revision_points(&subject, &topic);
        self.show(points);

        while self.wait(Until::RapidFire).await? != Wake::RapidFire {}

        self.enter(Trigger::StartRapidFire)?;
        self.snapshot.revision = QuizState::new(Mode::Revision.question_total());
        self.snapshot.revision_phase = Some(RevisionPhase::Questions);
        self.run_questions(Track::Revision).await?;

        let result = self.snapshot.revision.result();
        self.show(scoring::score_response(Mode::Revision, result));
        self.complete(result);
        Ok(())
    }

    /// Question → answer → feedback, until the track runs out.
    /// Leaves the engine in `completed`.
    async fn run_questions(&mut self, track: Track) -> Result<()> {
        loop {
            self.ask(track);
            self.take_answer(track).await?;
            self.pause_for(self.config.feedback_delay()).await?;

            let more_questions = self.quiz(track).has_more();
            self.enter(Trigger::FeedbackRead { more_questions })?;
            if !more_questions {
                return Ok(());
            }
            self.quiz_mut(track).advance();
        }
    }

    fn ask(&mut self, track: Track) {
        let index = self.quiz(track).current_question_index;
        let question = self
            .content
            .question(&self.spec.subject, &self.spec.topic, index);
        self.quiz_mut(track).show_question(question.clone());
        self.record(SessionEvent::QuestionShown { index });
        self.show(question);
    }

    async fn take_answer(&mut self, track: Track) -> Result<()> {
        let selected = loop {
            if let Wake::Answer(index) = self.wait(Until::Answer).await? {
                if self.quiz_mut(track).select(index) {
                    break index;
                }
            }
        };

        let quiz = self.quiz(track);
        let index = quiz.current_question_index;
        let correct = quiz
            .current_question()
            .map_or(false, |question| scoring::is_correct(question, selected));
        if correct {
            self.quiz_mut(track).record_correct();
        }

        self.enter(Trigger::AnswerSelected)?;
        let evaluation = self
            .content
            .evaluate_answer(&self.spec.subject, index, selected);
        self.record(SessionEvent::AnswerSubmitted { index, correct });
        debug!(session = %self.id, question = index, selected, correct, "answer evaluated");
        self.show(evaluation.response);
        Ok(())
    }

    /// The callback runs before the result is published, so any observer
    /// that sees `result` can rely on the callback having fired.
    fn complete(&mut self, result: SessionResult) {
        self.snapshot.result = Some(result);
        self.record(SessionEvent::Completed {
            score: result.score,
            total_questions: result.total_questions,
        });
        info!(
            session = %self.id,
            score = result.score,
            total = result.total_questions,
            "lesson session completed"
        );
        if let Some(callback) = self.on_complete.take() {
            callback(result);
        }
        self.publish();
    }

    fn enter(&mut self, trigger: Trigger) -> Result<()> {
        let from = self.snapshot.state;
        let to = StepGraph::transition(self.spec.mode, from, trigger)
            .ok_or(ClassroomError::InvalidTransition { from, trigger })?;
        debug!(session = %self.id, ?from, ?to, ?trigger, "transition");
        self.snapshot.state = to;
        self.record(SessionEvent::StateTransition { from, to, trigger });
        Ok(())
    }

    /// Replaces the current response and narrates it. The previous
    /// utterance is always stopped first.
    fn show(&mut self, response: AiResponse) {
        self.narrate(&response.spoken_text());
        self.snapshot.response = Some(response);
        self.publish();
    }

    /// Speech started while the lesson is paused starts out paused too.
    fn narrate(&self, text: &str) {
        self.narration.stop();
        self.narration.speak(text);
        if self.snapshot.paused {
            self.narration.pause();
        }
    }

    async fn pause_for(&mut self, delay: Duration) -> Result<()> {
        while self.wait(Until::Delay(delay)).await? != Wake::Elapsed {}
        Ok(())
    }

    /// The single suspension point. Services pause, resume and follow-ups
    /// while waiting for the delay, an answer, or rapid-fire start.
    async fn wait(&mut self, until: Until) -> Result<Wake> {
        let mut timer = match until {
            Until::Delay(delay) => Some(StepTimer::start(delay)),
            _ => None,
        };
        if self.snapshot.paused {
            if let Some(timer) = timer.as_mut() {
                timer.pause(Instant::now());
            }
        }

        let cancel = self.cancel.clone();
        loop {
            let deadline = timer.as_ref().and_then(|t| t.deadline());
            let command = tokio::select! {
                _ = cancel.cancelled() => return Err(ClassroomError::Disposed),
                _ = sleep_or_pending(deadline) => return Ok(Wake::Elapsed),
                command = self.commands.recv() => command,
            };
            let Some(command) = command else {
                return Err(ClassroomError::Disposed);
            };

            match command {
                EngineCommand::Pause => self.pause(timer.as_mut()),
                EngineCommand::Resume => self.resume(timer.as_mut()),
                EngineCommand::FollowUp(question) => self.follow_up(&question),
                EngineCommand::Answer(index) => {
                    let open = self.snapshot.state == EngineState::AskingQuestion
                        && self.snapshot.active_quiz().selected_answer_index.is_none();
                    if until == Until::Answer && open {
                        return Ok(Wake::Answer(index));
                    }
                    debug!(session = %self.id, index, state = ?self.snapshot.state, "answer ignored");
                    self.record(SessionEvent::AnswerIgnored);
                }
                EngineCommand::StartRapidFire => {
                    if until == Until::RapidFire {
                        return Ok(Wake::RapidFire);
                    }
                    debug!(session = %self.id, state = ?self.snapshot.state, "rapid-fire request ignored");
                }
            }
        }
    }

    fn pause(&mut self, timer: Option<&mut StepTimer>) {
        if self.snapshot.paused {
            return;
        }
        let now = Instant::now();
        if let Some(timer) = timer {
            timer.pause(now);
        }
        self.paused_at = Some(now);
        self.snapshot.paused = true;
        self.narration.pause();
        self.record(SessionEvent::Paused);
        self.publish();
    }

    /// Lets the clock run again. Narration is left as the learner paused it.
    fn resume(&mut self, timer: Option<&mut StepTimer>) {
        if !self.snapshot.paused {
            return;
        }
        let now = Instant::now();
        if let Some(timer) = timer {
            timer.resume(now);
        }
        let paused_ms = self
            .paused_at
            .take()
            .map_or(0, |at| now.saturating_duration_since(at).as_millis() as u64);
        self.snapshot.paused = false;
        self.record(SessionEvent::Resumed { paused_ms });
        self.publish();
    }

    fn follow_up(&mut self, question: &str) {
        let reply = self.content.follow_up(question);
        self.narrate(&reply.content);
        self.snapshot.follow_up = Some(reply);
        self.record(SessionEvent::FollowUpAnswered);
        self.publish();
    }

    fn quiz(&self, track: Track) -> &QuizState {
        match track {
            Track::Quiz => &self.snapshot.quiz,
            Track::Revision => &self.snapshot.revision,
        }
    }

    fn quiz_mut(&mut self, track: Track) -> &mut QuizState {
        match track {
            Track::Quiz => &mut self.snapshot.quiz,
            Track::Revision => &mut self.snapshot.revision,
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.snapshot.clone());
    }

    fn record(&self, event: SessionEvent) {
        match self.telemetry.lock() {
            Ok(mut recorder) => recorder.record(event),
            Err(poisoned) => {
                warn!(session = %self.id, "telemetry lock poisoned");
                poisoned.into_inner().record(event);
            }
        }
    }
}

async fn sleep_or_pending(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
