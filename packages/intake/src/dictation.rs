// ABOUTME: Dictation channel state machine
// ABOUTME: Transcript fragments are collected while recording, reviewed, then accepted as a pseudo-file or discarded

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{IntakeError, IntakeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DictationState {
    #[default]
    Idle,
    Recording,
    Reviewing,
    Accepted,
    Discarded,
}

impl DictationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DictationState::Idle => "idle",
            DictationState::Recording => "recording",
            DictationState::Reviewing => "reviewing",
            DictationState::Accepted => "accepted",
            DictationState::Discarded => "discarded",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dictation {
    state: DictationState,
    transcript: String,
}

impl Dictation {
    pub fn state(&self) -> DictationState {
        self.state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Starting again while reviewing drops the unreviewed transcript
    pub fn start(&mut self) -> IntakeResult<()> {
        if self.state == DictationState::Recording {
            return Err(self.invalid("start"));
        }
        self.transcript.clear();
        self.state = DictationState::Recording;
        Ok(())
    }

    pub fn push(&mut self, fragment: &str) -> IntakeResult<()> {
        if self.state != DictationState::Recording {
            return Err(self.invalid("append to"));
        }
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(());
        }
        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(fragment);
        Ok(())
    }

    pub fn stop(&mut self) -> IntakeResult<()> {
        if self.state != DictationState::Recording {
            return Err(self.invalid("stop"));
        }
        self.state = DictationState::Reviewing;
        Ok(())
    }

    pub fn cancel(&mut self) -> IntakeResult<()> {
        if self.state != DictationState::Recording {
            return Err(self.invalid("cancel"));
        }
        self.transcript.clear();
        self.state = DictationState::Idle;
        Ok(())
    }

    /// Accept the reviewed transcript, returning the pseudo-file name and its text
    pub fn accept(&mut self) -> IntakeResult<(String, String)> {
        if self.state != DictationState::Reviewing {
            return Err(self.invalid("accept"));
        }
        if self.transcript.trim().is_empty() {
            return Err(IntakeError::EmptyTranscript);
        }
        self.state = DictationState::Accepted;
        Ok((speech_file_name(), std::mem::take(&mut self.transcript)))
    }

    pub fn discard(&mut self) -> IntakeResult<()> {
        if self.state != DictationState::Reviewing {
            return Err(self.invalid("discard"));
        }
        self.transcript.clear();
        self.state = DictationState::Discarded;
        Ok(())
    }

    pub fn has_content(&self) -> bool {
        !self.transcript.trim().is_empty()
    }

    fn invalid(&self, action: &'static str) -> IntakeError {
        IntakeError::InvalidTransition {
            action,
            state: self.state.as_str(),
        }
    }
}

/// `speech-recognition-<ISO timestamp>.txt`
pub fn speech_file_name() -> String {
    format!(
        "speech-recognition-{}.txt",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
