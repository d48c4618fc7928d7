pub mod follow_up;
pub mod library;
pub mod provider;
pub mod subject;

pub use follow_up::{FollowUpPolicy, LengthModulo, SeededChoice, FOLLOW_UP_RESPONSES};
pub use provider::{ConceptSummary, ContentProvider, Evaluation, Library};
pub use subject::{Subject, DEFAULT_SUBJECT};
