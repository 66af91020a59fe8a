// ABOUTME: Shared intake service driving the session from API and CLI callers
// ABOUTME: Reads queued files, runs dictation transitions, and orchestrates the validation + compliance analysis

use std::sync::Arc;

use reqflow_core::{AnalysisHandoff, ProjectDetails, DEFAULT_COMPLIANCE_STANDARDS};
use reqflow_flows::actions::{run_compliance_check, run_parse_project_details, run_validation};
use reqflow_flows::PromptFlows;
use reqflow_storage::{HandoffStorage, ProjectDetailsStorage};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::dictation::Dictation;
use crate::error::{IntakeError, IntakeResult};
use crate::files::{FileState, IntakeFile};
use crate::session::{IntakeSession, IntakeState};
use crate::source::{FileReader, TextFileReader};

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSnapshot {
    pub state: IntakeState,
    pub files: Vec<IntakeFile>,
    pub manual_text: String,
    pub dictation: Dictation,
    pub combined_document: String,
    pub can_analyze: bool,
}

#[derive(Clone)]
pub struct IntakeService {
    session: Arc<Mutex<IntakeSession>>,
    flows: Arc<dyn PromptFlows>,
    reader: Arc<dyn FileReader>,
    handoffs: Option<HandoffStorage>,
    project_details: Option<ProjectDetailsStorage>,
    compliance_standards: String,
}

impl IntakeService {
    pub fn new(flows: Arc<dyn PromptFlows>) -> Self {
        Self {
            session: Arc::new(Mutex::new(IntakeSession::new())),
            flows,
            reader: Arc::new(TextFileReader),
            handoffs: None,
            project_details: None,
            compliance_standards: DEFAULT_COMPLIANCE_STANDARDS.to_string(),
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn FileReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_storage(
        mut self,
        handoffs: HandoffStorage,
        project_details: ProjectDetailsStorage,
    ) -> Self {
        self.handoffs = Some(handoffs);
        self.project_details = Some(project_details);
        self
    }

    pub fn with_compliance_standards(mut self, standards: impl Into<String>) -> Self {
        self.compliance_standards = standards.into();
        self
    }

    pub async fn snapshot(&self) -> IntakeSnapshot {
        let session = self.session.lock().await;
        IntakeSnapshot {
            state: session.state(),
            files: session.files().to_vec(),
            manual_text: session.manual_text().to_string(),
            dictation: session.dictation().clone(),
            combined_document: session.combined_document(),
            can_analyze: session.can_analyze(),
        }
    }

    pub async fn combined_document(&self) -> String {
        self.session.lock().await.combined_document()
    }

    /// Queue an upload; it stays `Queued` until [`Self::read_queued_files`] runs
    pub async fn enqueue_file(
        &self,
        name: &str,
        mime_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> IntakeResult<String> {
        let file = IntakeFile::upload(name, mime_type, bytes)?;
        info!("Queued requirements file {} ({} bytes)", file.name, file.size);
        Ok(self.session.lock().await.add_file(file))
    }

    /// Read every queued file. Returns how many became ready.
    pub async fn read_queued_files(&self) -> usize {
        let queued: Vec<(String, String, Vec<u8>)> = {
            let mut session = self.session.lock().await;
            session
                .files
                .iter_mut()
                .filter(|f| f.state == FileState::Queued)
                .map(|f| {
                    f.state = FileState::Reading;
                    (f.id.clone(), f.name.clone(), std::mem::take(&mut f.bytes))
                })
                .collect()
        };

        let mut ready = 0;
        for (id, name, bytes) in queued {
            let result = self.reader.read_text(&name, &bytes).await;

            let mut session = self.session.lock().await;
            let Some(file) = session.file_mut(&id) else {
                // Removed while it was being read
                continue;
            };
            match result {
                Ok(text) => {
                    file.mark_ready(text);
                    ready += 1;
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", name, e);
                    file.mark_failed(e.to_string());
                }
            }
        }
        ready
    }

    pub async fn remove_file(&self, file_id: &str) -> IntakeResult<()> {
        let removed = self.session.lock().await.remove_file(file_id)?;
        info!("Removed requirements file {} ({})", removed.name, removed.id);
        Ok(())
    }

    pub async fn set_manual_text(&self, text: String) {
        self.session.lock().await.set_manual_text(text);
    }

    pub async fn start_dictation(&self) -> IntakeResult<()> {
        self.session.lock().await.with_dictation(Dictation::start)
    }

    pub async fn push_transcript(&self, fragment: &str) -> IntakeResult<()> {
        self.session
            .lock()
            .await
            .with_dictation(|d| d.push(fragment))
    }

    pub async fn stop_dictation(&self) -> IntakeResult<()> {
        self.session.lock().await.with_dictation(Dictation::stop)
    }

    pub async fn cancel_dictation(&self) -> IntakeResult<()> {
        self.session.lock().await.with_dictation(Dictation::cancel)
    }

    /// Accept the reviewed transcript as a ready pseudo-file and return its id
    pub async fn accept_dictation(&self) -> IntakeResult<String> {
        let mut session = self.session.lock().await;
        let (name, transcript) = session.with_dictation(Dictation::accept)?;
        info!("Accepted dictation as {}", name);
        Ok(session.add_file(IntakeFile::speech(name, transcript)))
    }

    pub async fn discard_dictation(&self) -> IntakeResult<()> {
        self.session.lock().await.with_dictation(Dictation::discard)
    }

    /// Extract project details for the user to confirm before analysis
    pub async fn prepare_project_details(&self) -> IntakeResult<ProjectDetails> {
        let document = self.combined_document().await;
        if document.trim().is_empty() {
            return Err(IntakeError::NothingToAnalyze);
        }
        run_parse_project_details(self.flows.as_ref(), &document)
            .await
            .map_err(|e| {
                warn!("Project details extraction failed: {}", e);
                IntakeError::from(e)
            })
    }

    /// Run validation and compliance over the combined document.
    ///
    /// The work runs on its own task so the session is released even if the
    /// caller goes away mid-analysis.
    pub async fn analyze(
        &self,
        confirmed_details: Option<ProjectDetails>,
    ) -> IntakeResult<AnalysisHandoff> {
        let (document, revision) = self.session.lock().await.begin_analysis()?;
        info!("Starting requirements analysis ({} chars)", document.len());

        let service = self.clone();
        let task = tokio::spawn(async move {
            let result = service.run_analysis(document, confirmed_details).await;
            service
                .session
                .lock()
                .await
                .finish_analysis(result.is_ok(), revision);
            result
        });

        task.await
            .map_err(|e| IntakeError::Internal(format!("analysis task failed: {}", e)))?
    }

    async fn run_analysis(
        &self,
        document: String,
        confirmed_details: Option<ProjectDetails>,
    ) -> IntakeResult<AnalysisHandoff> {
        let flows = self.flows.as_ref();
        let (validation, compliance) = futures::try_join!(
            run_validation(flows, &document),
            run_compliance_check(flows, &document, &self.compliance_standards),
        )
        .map_err(|e| {
            error!("Requirements analysis failed: {}", e);
            IntakeError::from(e)
        })?;

        let handoff = AnalysisHandoff {
            validation,
            compliance,
            requirements: document,
        };

        if let Some(handoffs) = &self.handoffs {
            handoffs.store(&handoff).await?;
        }
        if let (Some(details), Some(storage)) = (confirmed_details, &self.project_details) {
            let stored = storage.save(&details).await?;
            info!("Persisted confirmed project details {}", stored.id);
        }

        info!(
            "Requirements analysis complete (valid: {})",
            handoff.validation.completeness_validation.is_valid
        );
        Ok(handoff)
    }
}
