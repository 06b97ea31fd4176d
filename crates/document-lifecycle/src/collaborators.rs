//! External services the lifecycle manager depends on
//!
//! Every call takes the caller's credential explicitly. Implementations must
//! reject an empty credential with [`DocError::Unauthorized`] before doing
//! any I/O.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{
    Credential, DocError, DocResult, Document, DocumentKind, DocumentStatus, DownloadFormat,
    StoredFile,
};

/// Filters for listing documents; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Case-insensitive match on name and description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DocumentQuery {
    pub fn matches(&self, document: &Document) -> bool {
        if self.status.is_some_and(|s| s != document.status) {
            return false;
        }
        if self.kind.is_some_and(|k| k != document.kind) {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if document.category.as_deref() != Some(category) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                document.name.to_lowercase().contains(&term)
                    || document.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// A file as submitted for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Downloaded file contents with the name and type to present them under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Persistence for document records
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn create(&self, credential: &Credential, document: &Document) -> DocResult<Document>;
    async fn get(&self, credential: &Credential, id: &str) -> DocResult<Document>;
    /// Replaces the stored record; last write wins
    async fn update(&self, credential: &Credential, document: &Document) -> DocResult<Document>;
    async fn delete(&self, credential: &Credential, id: &str) -> DocResult<()>;
    async fn list(&self, credential: &Credential, query: &DocumentQuery)
        -> DocResult<Vec<Document>>;
}

/// Binary storage for uploaded files
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, credential: &Credential, upload: &FileUpload) -> DocResult<StoredFile>;
    /// Original bytes, unmodified
    async fn fetch(&self, credential: &Credential, file: &StoredFile) -> DocResult<Vec<u8>>;
    async fn delete(&self, credential: &Credential, file: &StoredFile) -> DocResult<()>;
}

/// Renders a generated document's stored content into a binary format
#[async_trait]
pub trait FormatConverter: Send + Sync {
    async fn convert(
        &self,
        credential: &Credential,
        document_id: &str,
        format: DownloadFormat,
    ) -> DocResult<Vec<u8>>;
}

pub(crate) fn require(credential: &Credential) -> DocResult<()> {
    if credential.is_present() {
        Ok(())
    } else {
        Err(DocError::Unauthorized)
    }
}
