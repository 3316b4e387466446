//! CSV export read from the local filesystem.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::source::FeedSource;

/// Reads the feed from a file on every fetch.
#[derive(Debug, Clone)]
pub struct LocalFeedSource {
    path: PathBuf,
}

impl LocalFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for LocalFeedSource {
    async fn fetch_text(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "style_code,name\nRG-01,Ring").unwrap();

        let source = LocalFeedSource::new(file.path());
        assert_eq!(source.fetch_text().await.unwrap(), "style_code,name\nRG-01,Ring");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFeedSource::new(dir.path().join("missing.csv"));

        let err = source.fetch_text().await.unwrap_err();
        assert!(err.is_fetch_error());
    }
}
