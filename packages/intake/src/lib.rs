// ABOUTME: Requirements intake for Reqflow
// ABOUTME: Assembles one requirements document from files, typed text, and dictation, then analyzes it

pub mod combine;
pub mod dictation;
pub mod error;
pub mod files;
pub mod service;
pub mod session;
pub mod source;

pub use combine::combine_requirements;
pub use dictation::{Dictation, DictationState};
pub use error::{IntakeError, IntakeResult};
pub use files::{FileOrigin, FileState, IntakeFile};
pub use service::{IntakeService, IntakeSnapshot};
pub use session::{IntakeSession, IntakeState};
pub use source::{DocumentSource, FileReader, ManualText, SourceContent, TextFileReader};
