//! HTTP collaborators backed by the docs-api server
//!
//! One [`HttpBackend`] implements [`DocumentApi`], [`FileStorage`] and
//! [`FormatConverter`]. Non-success responses are mapped back onto
//! [`DocError`], keeping the server's message when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use shared_types::{Credential, DocError, DocResult, Document, DownloadFormat, StoredFile};
use tracing::{debug, warn};

use crate::collaborators::{
    require, DocumentApi, DocumentQuery, FileStorage, FileUpload, FormatConverter,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON error body returned by the server
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    field: Option<String>,
}

/// Upload body: file bytes travel base64-encoded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub data: String,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> DocResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to build HTTP client");
                DocError::transport(None)
            })?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Resolve a server path, or a full URL on this server, to a request URL.
    /// Anything pointing at another host is refused so the credential never
    /// leaves the configured server.
    fn url(&self, path: &str) -> DocResult<String> {
        if path.starts_with('/') && !path.starts_with("//") {
            return Ok(format!("{}{}", self.base_url, path));
        }
        if path
            .strip_prefix(self.base_url.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
        {
            return Ok(path.to_string());
        }
        warn!(url = %path, base_url = %self.base_url, "Refusing request to a foreign URL");
        Err(DocError::validation(
            "file",
            format!("'{}' is not served by {}", path, self.base_url),
        ))
    }

    /// Attach the credential, send, and turn non-success statuses into errors
    async fn send(
        &self,
        credential: &Credential,
        request: RequestBuilder,
        entity: &str,
        id: &str,
    ) -> DocResult<Response> {
        require(credential)?;
        let response = request
            .header(reqwest::header::AUTHORIZATION, credential.authorization_header())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Request to docs-api failed");
                DocError::transport(None)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        debug!(%status, error = ?body.error, "docs-api returned an error");
        Err(map_status(status, body, entity, id))
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> DocResult<T> {
        response.json().await.map_err(|e| {
            warn!(error = %e, "Malformed docs-api response");
            DocError::transport(None)
        })
    }

    async fn bytes(response: Response) -> DocResult<Vec<u8>> {
        response.bytes().await.map(|b| b.to_vec()).map_err(|e| {
            warn!(error = %e, "Failed to read docs-api response body");
            DocError::transport(None)
        })
    }
}

fn map_status(status: StatusCode, body: ErrorBody, entity: &str, id: &str) -> DocError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DocError::Unauthorized,
        StatusCode::NOT_FOUND => DocError::not_found(entity, id),
        StatusCode::BAD_REQUEST
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PAYLOAD_TOO_LARGE => DocError::validation(
            body.field.unwrap_or_else(|| "request".to_string()),
            body.error.unwrap_or_else(|| status.to_string()),
        ),
        _ => DocError::transport(body.error),
    }
}

#[async_trait]
impl DocumentApi for HttpBackend {
    async fn create(&self, credential: &Credential, document: &Document) -> DocResult<Document> {
        let request = self.http.post(self.url("/api/documents")?).json(document);
        let response = self.send(credential, request, "Document", &document.id).await?;
        Self::json(response).await
    }

    async fn get(&self, credential: &Credential, id: &str) -> DocResult<Document> {
        let request = self.http.get(self.url(&format!("/api/documents/{}", id))?);
        let response = self.send(credential, request, "Document", id).await?;
        Self::json(response).await
    }

    async fn update(&self, credential: &Credential, document: &Document) -> DocResult<Document> {
        let request = self
            .http
            .put(self.url(&format!("/api/documents/{}", document.id))?)
            .json(document);
        let response = self.send(credential, request, "Document", &document.id).await?;
        Self::json(response).await
    }

    async fn delete(&self, credential: &Credential, id: &str) -> DocResult<()> {
        let request = self.http.delete(self.url(&format!("/api/documents/{}", id))?);
        self.send(credential, request, "Document", id).await?;
        Ok(())
    }

    async fn list(
        &self,
        credential: &Credential,
        query: &DocumentQuery,
    ) -> DocResult<Vec<Document>> {
        let request = self.http.get(self.url("/api/documents")?).query(query);
        let response = self.send(credential, request, "Document", "*").await?;
        Self::json(response).await
    }
}

#[async_trait]
impl FileStorage for HttpBackend {
    async fn store(&self, credential: &Credential, upload: &FileUpload) -> DocResult<StoredFile> {
        let payload = FilePayload {
            file_name: &upload.file_name,
            mime_type: &upload.mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(&upload.bytes),
        };
        let request = self.http.post(self.url("/api/files")?).json(&payload);
        let response = self
            .send(credential, request, "File", &upload.file_name)
            .await?;
        Self::json(response).await
    }

    async fn fetch(&self, credential: &Credential, file: &StoredFile) -> DocResult<Vec<u8>> {
        let request = self.http.get(self.url(&file.url)?);
        let response = self.send(credential, request, "File", &file.url).await?;
        Self::bytes(response).await
    }

    async fn delete(&self, credential: &Credential, file: &StoredFile) -> DocResult<()> {
        let request = self.http.delete(self.url(&file.url)?);
        self.send(credential, request, "File", &file.url).await?;
        Ok(())
    }
}

#[async_trait]
impl FormatConverter for HttpBackend {
    async fn convert(
        &self,
        credential: &Credential,
        document_id: &str,
        format: DownloadFormat,
    ) -> DocResult<Vec<u8>> {
        let request = self
            .http
            .get(self.url(&format!("/api/documents/{}/convert", document_id))?)
            .query(&[("format", format.to_string())]);
        let response = self.send(credential, request, "Document", document_id).await?;
        Self::bytes(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::GENERIC_FAILURE;

    fn body(error: Option<&str>, field: Option<&str>) -> ErrorBody {
        ErrorBody {
            error: error.map(str::to_string),
            field: field.map(str::to_string),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_status(StatusCode::UNAUTHORIZED, body(None, None), "Document", "d1"),
            DocError::Unauthorized
        );
        assert_eq!(
            map_status(StatusCode::NOT_FOUND, body(None, None), "Document", "d1"),
            DocError::not_found("Document", "d1")
        );
        assert_eq!(
            map_status(
                StatusCode::BAD_REQUEST,
                body(Some("name is required"), Some("name")),
                "Document",
                "d1"
            ),
            DocError::validation("name", "name is required")
        );
    }

    #[test]
    fn test_server_message_preferred_over_generic() {
        assert_eq!(
            map_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                body(Some("database is locked"), None),
                "Document",
                "d1"
            ),
            DocError::Transport("database is locked".into())
        );
        assert_eq!(
            map_status(StatusCode::BAD_GATEWAY, body(None, None), "Document", "d1"),
            DocError::Transport(GENERIC_FAILURE.into())
        );
    }

    #[test]
    fn test_url_joins_relative_and_keeps_same_server() {
        let backend = HttpBackend::with_client(Client::new(), "http://localhost:3000/");
        assert_eq!(
            backend.url("/api/files/abc").unwrap(),
            "http://localhost:3000/api/files/abc"
        );
        assert_eq!(
            backend.url("http://localhost:3000/api/files/abc").unwrap(),
            "http://localhost:3000/api/files/abc"
        );
    }

    #[test]
    fn test_url_refuses_other_hosts() {
        let backend = HttpBackend::with_client(Client::new(), "http://localhost:3000");
        for url in [
            "https://cdn.example.com/f.pdf",
            "//cdn.example.com/f.pdf",
            "http://localhost:3000.evil.test/api/files/abc",
            "memory://files/abc",
        ] {
            assert!(
                matches!(backend.url(url), Err(DocError::Validation { ref field, .. }) if field == "file"),
                "{} was accepted",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_foreign_file_url_is_never_fetched() {
        let backend = HttpBackend::with_client(Client::new(), "http://127.0.0.1:9");
        let file = StoredFile {
            url: "https://files.example.com/lease.pdf".into(),
            file_name: "lease.pdf".into(),
            mime_type: "application/pdf".into(),
            size_bytes: 4,
        };
        let err = backend
            .fetch(&Credential::bearer("token"), &file)
            .await
            .unwrap_err();
        assert!(matches!(err, DocError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_blank_credential_fails_before_any_request() {
        // Nothing listens on this port; reaching the network would be a transport error
        let backend = HttpBackend::with_client(Client::new(), "http://127.0.0.1:9");
        let err = backend
            .get(&Credential::bearer(""), "d1")
            .await
            .unwrap_err();
        assert_eq!(err, DocError::Unauthorized);
    }
}
