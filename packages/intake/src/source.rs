// ABOUTME: Document sources that contribute text to the combined requirements document
// ABOUTME: The readiness contract shared by channels, and the injectable file reader

use async_trait::async_trait;

use crate::error::IntakeResult;

/// What a channel can contribute right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    Pending,
    Ready(String),
    Failed(String),
}

/// A channel contributing text to the requirements document
pub trait DocumentSource {
    fn content_ready(&self) -> SourceContent;
}

/// Turns raw uploaded bytes into text.
///
/// Implementations may be slow (document extraction), so reading happens
/// outside the session lock.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_text(&self, name: &str, bytes: &[u8]) -> IntakeResult<String>;
}

/// Raw text read of any accepted file, lossy on invalid UTF-8
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileReader;

#[async_trait]
impl FileReader for TextFileReader {
    async fn read_text(&self, _name: &str, bytes: &[u8]) -> IntakeResult<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// The free-text channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualText(pub String);

impl DocumentSource for ManualText {
    fn content_ready(&self) -> SourceContent {
        SourceContent::Ready(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_reader_is_lossy() {
        let reader = TextFileReader;
        let text = reader
            .read_text("notes.txt", b"Login \xFF screen")
            .await
            .unwrap();
        assert_eq!(text, "Login \u{FFFD} screen");
    }

    #[test]
    fn test_manual_text_is_always_ready() {
        assert_eq!(
            ManualText("Patients log in".to_string()).content_ready(),
            SourceContent::Ready("Patients log in".to_string())
        );
    }
}
