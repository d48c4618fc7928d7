pub mod config;
pub mod content;
pub mod error;
pub mod kernel;
pub mod narration;
pub mod preferences;
pub mod progress;

pub use error::{ClassroomError, Result};
pub use kernel::engine::{LessonEngine, LessonHandle, SessionSpec};
