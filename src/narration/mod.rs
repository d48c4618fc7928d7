pub mod backend;
pub mod channel;
pub mod scripted;
pub mod voice;

pub use backend::{PlaybackEnd, ProcessBackend, SpeechBackend, SpeechRequest};
pub use channel::{NarrationChannel, NarrationState};
pub use scripted::ScriptedSpeech;
pub use voice::{select_voice, Voice};
