use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use classroom::config::ClassroomConfig;
use classroom::content::{Library, SeededChoice};
use classroom::kernel::{EngineSnapshot, EngineState, Mode, ResponseKind, SessionResult};
use classroom::narration::{NarrationChannel, ProcessBackend, SpeechBackend};
use classroom::preferences::{FilePreferences, Preferences, Theme};
use classroom::progress::{InMemoryProgressStore, ProgressStore, SessionRecord};
use classroom::{LessonEngine, LessonHandle, SessionSpec};

const HELP: &str = "commands: 1-4 answer | go start rapid-fire | p pause | r resume | m mute | t theme | ? <question> | q quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let subject = args.next().unwrap_or_else(|| "Mathematics".to_string());
    let topic = args.next().unwrap_or_else(|| "Algebra".to_string());
    let mode: Mode = match args.next() {
        Some(mode) => mode.parse().map_err(|e: String| anyhow!(e))?,
        None => Mode::Teach,
    };

    let config = ClassroomConfig::from_env().context("loading classroom config")?;

    let preferences = match &config.preferences_path {
        Some(path) => Preferences::new(Arc::new(
            FilePreferences::open(path)
                .with_context(|| format!("opening preferences at {}", path.display()))?,
        )),
        None => Preferences::in_memory(),
    };

    let backend: Option<Arc<dyn SpeechBackend>> = config
        .speech_program
        .as_ref()
        .map(|program| Arc::new(ProcessBackend::new(program.clone())) as Arc<dyn SpeechBackend>);
    let narration = NarrationChannel::new(config.narration.clone(), backend, preferences.clone());
    let content = Arc::new(Library::with_policy(SeededChoice::new(config.follow_up_seed)));
    let progress = Arc::new(InMemoryProgressStore::new());

    tracing::info!("Classroom booting: {} / {} ({})", subject, topic, mode);

    let spec = SessionSpec::new(subject, topic, mode);
    let (done_tx, mut done_rx) = oneshot::channel::<SessionResult>();
    let record_spec = spec.clone();
    let record_store = Arc::clone(&progress);

    let mut handle = LessonEngine::new(spec, config.engine.clone(), content, narration.clone())
        .on_complete(move |result| {
            record_store.record(SessionRecord::new(Uuid::new_v4(), &record_spec, result));
            let _ = done_tx.send(result);
        })
        .spawn();

    println!("{}", HELP);

    let mut view = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let started = Instant::now();
    let mut cadence = interval(Duration::from_secs(1));
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shell = Shell::new(preferences.theme());
    let mut finished = false;

    shell.render(&view.borrow_and_update().clone());

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = view.borrow_and_update().clone();
                shell.render(&snapshot);
            }
            _ = cadence.tick() => {
                if !finished {
                    shell.status_line(started.elapsed(), narration.state().is_speaking);
                }
            }
            result = &mut done_rx, if !finished => {
                finished = true;
                if let Ok(result) = result {
                    println!("\nSession finished: {}/{}. Ask follow-ups with '?', or 'q' to quit.", result.score, result.total_questions);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                if !dispatch(line.trim(), &handle, &narration, &preferences, &mut shell)? {
                    break;
                }
            }
        }
    }

    handle.dispose().await;

    for (subject, summary) in progress.summary() {
        println!(
            "{}: {} session(s), {}/{} correct ({:.0}%)",
            subject,
            summary.sessions,
            summary.correct,
            summary.questions_answered,
            summary.accuracy * 100.0
        );
    }

    Ok(())
}

/// Maps one line of input to a control. Returns false to quit.
fn dispatch(
    line: &str,
    handle: &LessonHandle,
    narration: &NarrationChannel,
    preferences: &Preferences,
    shell: &mut Shell,
) -> Result<bool> {
    match line {
        "" => {}
        "q" | "quit" => return Ok(false),
        "go" => handle.start_rapid_fire()?,
        "p" => handle.pause()?,
        "r" => {
            handle.resume()?;
            narration.resume();
        }
        "m" => {
            let muted = narration.toggle_mute();
            println!("{}", if muted { "muted" } else { "unmuted" });
        }
        "t" => {
            shell.theme = preferences.toggle_theme().context("saving theme")?;
            println!("theme: {}", shell.theme.as_str());
        }
        "h" | "help" => println!("{}", HELP),
        other => {
            if let Some(question) = other.strip_prefix('?') {
                handle.ask(question.trim())?;
            } else if let Ok(choice) = other.parse::<usize>() {
                if choice == 0 {
                    println!("answers start at 1");
                } else {
                    handle.answer(choice - 1)?;
                }
            } else {
                println!("{}", HELP);
            }
        }
    }
    Ok(true)
}

/// Terminal rendering of engine snapshots.
struct Shell {
    theme: Theme,
    last: Option<EngineSnapshot>,
}

impl Shell {
    fn new(theme: Theme) -> Self {
        Self { theme, last: None }
    }

    fn heading(&self, text: &str) -> String {
        match self.theme {
            Theme::Dark => format!("\x1b[1;36m{}\x1b[0m", text),
            Theme::Light => format!("\x1b[1m{}\x1b[0m", text),
        }
    }

    fn render(&mut self, snapshot: &EngineSnapshot) {
        let previous = self.last.replace(snapshot.clone());
        let previous = previous.as_ref();

        if previous.map(|p| p.paused) != Some(snapshot.paused) && previous.is_some() {
            println!("{}", if snapshot.paused { "[paused]" } else { "[resumed]" });
        }

        if previous.map(|p| &p.response) != Some(&snapshot.response) {
            if let Some(response) = &snapshot.response {
                println!("\n{}", self.heading(&response.title));
                println!("{}", response.content);
                if let Some(options) = &response.options {
                    for (i, option) in options.iter().enumerate() {
                        println!("  {}. {}", i + 1, option);
                    }
                }
                if response.kind == ResponseKind::Revision && snapshot.state == EngineState::Explaining {
                    println!("(type 'go' to start rapid-fire questions)");
                }
            }
        }

        if previous.map(|p| &p.follow_up) != Some(&snapshot.follow_up) {
            if let Some(reply) = &snapshot.follow_up {
                println!("\n{} {}", self.heading(&reply.title), reply.content);
            }
        }
    }

    fn status_line(&self, elapsed: Duration, speaking: bool) {
        let secs = elapsed.as_secs();
        let state = self.last.as_ref().map(|s| s.state).unwrap_or_default();
        eprint!(
            "\r[{:02}:{:02}] {:?}{}   ",
            secs / 60,
            secs % 60,
            state,
            if speaking { " (speaking)" } else { "" }
        );
        let _ = std::io::stderr().flush();
    }
}
