//! Debug capture of raw exchanges.
//!
//! When a capture directory is configured, every call writes two files:
//!
//! ```text
//! <dir>/20261018143005123_ccgConsGTIN_request.txt    headers + envelope
//! <dir>/20261018143005123_ccgConsGTIN_response.txt   headers + body
//! ```
//!
//! Capture is best effort: a failed write is logged and the lookup goes on.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

/// Writes request/response pairs to a directory.
#[derive(Debug, Clone)]
pub struct DebugRecorder {
    dir: Option<PathBuf>,
}

impl DebugRecorder {
    /// Recorder writing into `dir`, or a no-op when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        DebugRecorder { dir }
    }

    /// Capture directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Stores one exchange. Returns the paths written, empty when disabled or
    /// when the writes failed.
    pub async fn record(&self, operation: &str, request: &str, response: &str) -> Vec<PathBuf> {
        let Some(dir) = &self.dir else {
            return Vec::new();
        };

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "Cannot create debug directory");
            return Vec::new();
        }

        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        let mut written = Vec::with_capacity(2);

        for (kind, contents) in [("request", request), ("response", response)] {
            let path = dir.join(format!("{stamp}_{operation}_{kind}.txt"));
            match tokio::fs::write(&path, contents).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Debug capture written");
                    written.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Debug capture failed"),
            }
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_writes_nothing() {
        let recorder = DebugRecorder::new(None);
        assert!(recorder.dir().is_none());
        assert!(recorder.record("ccgConsGTIN", "req", "resp").await.is_empty());
    }

    #[tokio::test]
    async fn test_writes_request_and_response() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = DebugRecorder::new(Some(dir.path().join("captures")));
        assert_eq!(recorder.dir(), Some(dir.path().join("captures").as_path()));

        let written = recorder
            .record("ccgConsGTIN", "Content-Type: x\n<req/>", "HTTP/1.1 200 OK\n<resp/>")
            .await;
        assert_eq!(written.len(), 2);

        let request_name = written[0].file_name().unwrap().to_string_lossy().into_owned();
        let response_name = written[1].file_name().unwrap().to_string_lossy().into_owned();
        assert!(request_name.ends_with("_ccgConsGTIN_request.txt"));
        assert!(response_name.ends_with("_ccgConsGTIN_response.txt"));

        let request = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(request, "Content-Type: x\n<req/>");
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_not_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // a regular file cannot act as a directory
        let recorder = DebugRecorder::new(Some(file.path().join("sub")));
        assert!(recorder.record("ccgConsGTIN", "a", "b").await.is_empty());
    }
}
