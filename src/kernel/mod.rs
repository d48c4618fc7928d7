pub mod engine;
pub mod event;
pub mod scoring;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod transition;

pub use engine::{LessonEngine, LessonHandle, OnComplete, SessionSpec};
pub use event::{AiResponse, EngineCommand, ResponseKind, SessionResult};
pub use state::{EngineSnapshot, EngineState, Mode, QuizState, RevisionPhase};
pub use transition::{StepGraph, Trigger};
