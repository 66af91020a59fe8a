// ABOUTME: In-memory intake session: files, manual text, dictation, and analysis status
// ABOUTME: Derives the session state and the combined document from its channels

use serde::Serialize;

use crate::combine::combine_requirements;
use crate::dictation::Dictation;
use crate::error::{IntakeError, IntakeResult};
use crate::files::IntakeFile;
use crate::source::{DocumentSource, ManualText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IntakeState {
    Empty,
    Assembling,
    AnalysisPending,
    AnalysisComplete,
}

#[derive(Debug, Default)]
pub struct IntakeSession {
    pub(crate) files: Vec<IntakeFile>,
    pub(crate) manual_text: ManualText,
    pub(crate) dictation: Dictation,
    analysis_pending: bool,
    analysis_complete: bool,
    /// Bumped on every channel change
    revision: u64,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IntakeState {
        if self.analysis_pending {
            IntakeState::AnalysisPending
        } else if self.analysis_complete {
            IntakeState::AnalysisComplete
        } else if self.files.is_empty()
            && self.manual_text.0.trim().is_empty()
            && !self.dictation.has_content()
        {
            IntakeState::Empty
        } else {
            IntakeState::Assembling
        }
    }

    pub fn files(&self) -> &[IntakeFile] {
        &self.files
    }

    pub fn manual_text(&self) -> &str {
        &self.manual_text.0
    }

    pub fn dictation(&self) -> &Dictation {
        &self.dictation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ready files in upload order, then the manual text
    pub fn combined_document(&self) -> String {
        let mut sources: Vec<&dyn DocumentSource> =
            self.files.iter().map(|f| f as &dyn DocumentSource).collect();
        sources.push(&self.manual_text);
        combine_requirements(&sources)
    }

    pub fn can_analyze(&self) -> bool {
        self.files.iter().all(IntakeFile::is_ready) && !self.combined_document().trim().is_empty()
    }

    pub fn add_file(&mut self, file: IntakeFile) -> String {
        let id = file.id.clone();
        self.files.push(file);
        self.touch();
        id
    }

    pub fn remove_file(&mut self, file_id: &str) -> IntakeResult<IntakeFile> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == file_id)
            .ok_or_else(|| IntakeError::FileNotFound(file_id.to_string()))?;
        self.touch();
        Ok(self.files.remove(index))
    }

    pub fn file_mut(&mut self, file_id: &str) -> Option<&mut IntakeFile> {
        self.files.iter_mut().find(|f| f.id == file_id)
    }

    pub fn set_manual_text(&mut self, text: String) {
        if self.manual_text.0 != text {
            self.manual_text = ManualText(text);
            self.touch();
        }
    }

    /// Run a dictation transition; any successful one counts as a change
    pub fn with_dictation<T>(
        &mut self,
        transition: impl FnOnce(&mut Dictation) -> IntakeResult<T>,
    ) -> IntakeResult<T> {
        let result = transition(&mut self.dictation)?;
        self.touch();
        Ok(result)
    }

    /// Claim the analysis slot and return the document to analyze with its revision
    pub fn begin_analysis(&mut self) -> IntakeResult<(String, u64)> {
        if self.analysis_pending {
            return Err(IntakeError::AnalysisInProgress);
        }
        if !self.files.iter().all(IntakeFile::is_ready) {
            return Err(IntakeError::FilesNotReady);
        }
        let document = self.combined_document();
        if document.trim().is_empty() {
            return Err(IntakeError::NothingToAnalyze);
        }
        self.analysis_pending = true;
        Ok((document, self.revision))
    }

    /// Release the analysis slot. Completion only sticks when nothing changed meanwhile.
    pub fn finish_analysis(&mut self, succeeded: bool, started_at_revision: u64) {
        self.analysis_pending = false;
        self.analysis_complete = succeeded && started_at_revision == self.revision;
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.analysis_complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_follows_channels() {
        let mut session = IntakeSession::new();
        assert_eq!(session.state(), IntakeState::Empty);

        session.set_manual_text("Patients can book appointments".to_string());
        assert_eq!(session.state(), IntakeState::Assembling);

        session.set_manual_text("   ".to_string());
        assert_eq!(session.state(), IntakeState::Empty);
    }

    #[test]
    fn test_queued_files_block_analysis() {
        let mut session = IntakeSession::new();
        let id = session.add_file(IntakeFile::upload("a.txt", None, b"A".to_vec()).unwrap());
        session.set_manual_text("B".to_string());

        assert!(!session.can_analyze());
        assert!(matches!(session.begin_analysis(), Err(IntakeError::FilesNotReady)));

        session.file_mut(&id).unwrap().mark_ready("A".to_string());
        assert!(session.can_analyze());
        assert_eq!(session.combined_document(), "A\n\nB");
    }

    #[test]
    fn test_analysis_lifecycle() {
        let mut session = IntakeSession::new();
        assert!(matches!(session.begin_analysis(), Err(IntakeError::NothingToAnalyze)));

        session.set_manual_text("Store vitals".to_string());
        let (document, revision) = session.begin_analysis().unwrap();
        assert_eq!(document, "Store vitals");
        assert_eq!(session.state(), IntakeState::AnalysisPending);
        assert!(matches!(
            session.begin_analysis(),
            Err(IntakeError::AnalysisInProgress)
        ));

        session.finish_analysis(true, revision);
        assert_eq!(session.state(), IntakeState::AnalysisComplete);

        session.set_manual_text("Store vitals hourly".to_string());
        assert_eq!(session.state(), IntakeState::Assembling);
    }

    #[test]
    fn test_change_during_analysis_keeps_assembling() {
        let mut session = IntakeSession::new();
        session.set_manual_text("v1".to_string());
        let (_, revision) = session.begin_analysis().unwrap();
        session.set_manual_text("v2".to_string());
        session.finish_analysis(true, revision);
        assert_eq!(session.state(), IntakeState::Assembling);
    }

    #[test]
    fn test_remove_file_by_id_keeps_same_named_files() {
        let mut session = IntakeSession::new();
        let first = session.add_file(IntakeFile::upload("req.txt", None, b"1".to_vec()).unwrap());
        session.add_file(IntakeFile::upload("req.txt", None, b"2".to_vec()).unwrap());

        let removed = session.remove_file(&first).unwrap();
        assert_eq!(removed.id, first);
        assert_eq!(session.files().len(), 1);
        assert!(matches!(
            session.remove_file(&first),
            Err(IntakeError::FileNotFound(_))
        ));
    }
}
