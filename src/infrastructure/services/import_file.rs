use std::path::Path;

use bytes::Bytes;

use crate::domain::DomainError;

/// A spreadsheet or CSV upload for the import endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub file_name: String,
    pub mime: String,
    pub content: Bytes,
}

impl ImportFile {
    /// Wrap in-memory content; the MIME type is guessed from the file name
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();

        Self {
            file_name,
            mime,
            content: content.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(file_name, content))
    }
}
