//! In-process collaborators
//!
//! Backed by mutex-guarded maps. Used for tests and for running the manager
//! without a server.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use shared_types::{Credential, DocError, DocResult, Document, DownloadFormat, StoredFile};
use tracing::debug;

use crate::collaborators::{
    require, DocumentApi, DocumentQuery, FileStorage, FileUpload, FormatConverter,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct InMemoryDocuments {
    documents: Mutex<BTreeMap<String, Document>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.documents).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored copy, bypassing credentials
    pub fn snapshot(&self, id: &str) -> Option<Document> {
        lock(&self.documents).get(id).cloned()
    }
}

#[async_trait]
impl DocumentApi for InMemoryDocuments {
    async fn create(&self, credential: &Credential, document: &Document) -> DocResult<Document> {
        require(credential)?;
        lock(&self.documents).insert(document.id.clone(), document.clone());
        Ok(document.clone())
    }

    async fn get(&self, credential: &Credential, id: &str) -> DocResult<Document> {
        require(credential)?;
        lock(&self.documents)
            .get(id)
            .cloned()
            .ok_or_else(|| DocError::not_found("Document", id))
    }

    async fn update(&self, credential: &Credential, document: &Document) -> DocResult<Document> {
        require(credential)?;
        let mut documents = lock(&self.documents);
        match documents.get_mut(&document.id) {
            Some(stored) => {
                *stored = document.clone();
                Ok(document.clone())
            }
            None => Err(DocError::not_found("Document", &document.id)),
        }
    }

    async fn delete(&self, credential: &Credential, id: &str) -> DocResult<()> {
        require(credential)?;
        lock(&self.documents)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DocError::not_found("Document", id))
    }

    async fn list(
        &self,
        credential: &Credential,
        query: &DocumentQuery,
    ) -> DocResult<Vec<Document>> {
        require(credential)?;
        let mut matching: Vec<Document> = lock(&self.documents)
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFiles {
    files: Mutex<HashMap<String, Vec<u8>>>,
    next_id: AtomicU64,
}

impl InMemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.files).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStorage for InMemoryFiles {
    async fn store(&self, credential: &Credential, upload: &FileUpload) -> DocResult<StoredFile> {
        require(credential)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let key = format!("memory://files/{}/{}", id, upload.file_name);
        lock(&self.files).insert(key.clone(), upload.bytes.clone());
        debug!(url = %key, size = upload.bytes.len(), "Stored file");
        Ok(StoredFile {
            url: key,
            file_name: upload.file_name.clone(),
            mime_type: upload.mime_type.clone(),
            size_bytes: upload.bytes.len() as u64,
        })
    }

    async fn fetch(&self, credential: &Credential, file: &StoredFile) -> DocResult<Vec<u8>> {
        require(credential)?;
        lock(&self.files)
            .get(&file.url)
            .cloned()
            .ok_or_else(|| DocError::not_found("File", &file.url))
    }

    async fn delete(&self, credential: &Credential, file: &StoredFile) -> DocResult<()> {
        require(credential)?;
        lock(&self.files)
            .remove(&file.url)
            .map(|_| debug!(url = %file.url, "Deleted file"))
            .ok_or_else(|| DocError::not_found("File", &file.url))
    }
}

/// Converter that records every request and answers with fixed bytes
#[derive(Debug, Default)]
pub struct RecordingConverter {
    requests: Mutex<Vec<(String, DownloadFormat)>>,
}

impl RecordingConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(document_id, format)` pairs in call order
    pub fn requests(&self) -> Vec<(String, DownloadFormat)> {
        lock(&self.requests).clone()
    }

    /// Bytes returned for a conversion request
    pub fn rendered(document_id: &str, format: DownloadFormat) -> Vec<u8> {
        format!("{}:{}", format, document_id).into_bytes()
    }
}

#[async_trait]
impl FormatConverter for RecordingConverter {
    async fn convert(
        &self,
        credential: &Credential,
        document_id: &str,
        format: DownloadFormat,
    ) -> DocResult<Vec<u8>> {
        require(credential)?;
        lock(&self.requests).push((document_id.to_string(), format));
        Ok(Self::rendered(document_id, format))
    }
}
