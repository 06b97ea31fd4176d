//! Document lifecycle operations
//!
//! [`DocumentManager`] ties the status state machine to the persistence,
//! file storage and conversion collaborators. Every operation checks the
//! caller's credential before touching a collaborator, and every change is
//! appended to the document's audit chain before it is written back.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared_types::{
    hash_document, Associations, AuditAction, Clock, ContractKind, Credential, DocError,
    DocResult, Document, DocumentKind, DocumentStatus, DownloadFormat,
};
use template_engine::contract::agreement_name;
use template_engine::{render_template, ContractForm, ContractGenerator, TemplateStore, TemplateType};
use tracing::{debug, info, warn};

use crate::collaborators::{
    require, Download, DocumentApi, DocumentQuery, FileStorage, FileUpload, FormatConverter,
};
use crate::epoch::RequestEpoch;
use crate::status::{
    check_editable, check_shareable, toggle_action, LifecycleAction, SigningOutcome,
};

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted for upload: PDF, DOC, DOCX
pub const ALLOWED_UPLOAD_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Metadata key listing placeholders a template render left unfilled
pub const MISSING_VARIABLES_KEY: &str = "missingVariables";

/// Status given to directly uploaded documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPolicy {
    #[default]
    Active,
    Draft,
}

impl UploadPolicy {
    pub fn initial_status(self) -> DocumentStatus {
        match self {
            UploadPolicy::Active => DocumentStatus::Active,
            UploadPolicy::Draft => DocumentStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub max_upload_bytes: u64,
    pub upload_policy: UploadPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_policy: UploadPolicy::default(),
        }
    }
}

/// Who is acting: the credential passed to collaborators and the user id
/// recorded in metadata and the audit trail
#[derive(Debug, Clone)]
pub struct Caller {
    pub credential: Credential,
    pub user_id: String,
}

impl Caller {
    pub fn new(credential: Credential, user_id: impl Into<String>) -> Self {
        Self {
            credential,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub kind: DocumentKind,
    pub category: Option<String>,
    pub description: String,
    pub associations: Associations,
    pub expires_at: Option<DateTime<Utc>>,
    pub file: FileUpload,
}

impl UploadRequest {
    pub fn new(name: impl Into<String>, kind: DocumentKind, file: FileUpload) -> Self {
        Self {
            name: name.into(),
            kind,
            category: None,
            description: String::new(),
            associations: Associations::default(),
            expires_at: None,
            file,
        }
    }
}

pub struct DocumentManager {
    documents: Arc<dyn DocumentApi>,
    files: Arc<dyn FileStorage>,
    converter: Arc<dyn FormatConverter>,
    generator: ContractGenerator,
    clock: Arc<dyn Clock>,
    config: ManagerConfig,
    list_epoch: RequestEpoch,
}

impl DocumentManager {
    pub fn new(
        documents: Arc<dyn DocumentApi>,
        files: Arc<dyn FileStorage>,
        converter: Arc<dyn FormatConverter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            files,
            converter,
            generator: ContractGenerator::new(Arc::clone(&clock)),
            clock,
            config: ManagerConfig::default(),
            list_epoch: RequestEpoch::new(),
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Store an uploaded file and create its document record. The stored
    /// file is removed again if the record cannot be created.
    pub async fn upload(&self, caller: &Caller, request: UploadRequest) -> DocResult<Document> {
        require(&caller.credential)?;
        validate_upload(&request, self.config.max_upload_bytes)?;

        let stored = self.files.store(&caller.credential, &request.file).await?;
        let now = self.clock.now();
        let mut document = Document::new(
            request.name.trim(),
            request.kind,
            self.config.upload_policy.initial_status(),
            now,
        );
        document.category = request.category;
        document.description = request.description;
        document.associations = request.associations;
        document.expires_at = request.expires_at;
        document.file = Some(stored);
        document.history.append(
            AuditAction::Uploaded,
            &caller.user_id,
            &hash_document(&request.file.bytes),
            now,
            Some(request.file.file_name.clone()),
        );

        let created = match self.documents.create(&caller.credential, &document).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(file) = &document.file {
                    if let Err(cleanup) = self.files.delete(&caller.credential, file).await {
                        warn!(url = %file.url, error = %cleanup, "Failed to remove orphaned upload");
                    }
                }
                return Err(e);
            }
        };
        info!(
            document_id = %created.id,
            status = %created.status,
            size = request.file.bytes.len(),
            "Uploaded document"
        );
        Ok(created)
    }

    /// Generate contract text from a form and save it as a draft
    pub async fn generate_contract(
        &self,
        caller: &Caller,
        form: &ContractForm,
        name: Option<&str>,
    ) -> DocResult<Document> {
        require(&caller.credential)?;
        let kind = form.kind();
        let counterpart = form.counterpart();
        let property = form.property();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} - {}", agreement_name(kind), counterpart.name),
        };

        let now = self.clock.now();
        let mut document = Document::new(name, DocumentKind::Contract, DocumentStatus::Draft, now);
        document.description = format!("{} for {}", agreement_name(kind), property.name);
        document.metadata.content = Some(self.generator.generate(form));
        document.metadata.contract_type = Some(kind);
        document.associations.property_id = non_empty(&property.id);
        match kind {
            ContractKind::Manager => document.associations.manager_id = non_empty(&counterpart.id),
            ContractKind::Tenant => document.associations.tenant_id = non_empty(&counterpart.id),
        }
        let fingerprint = document.content_fingerprint();
        document.history.append(
            AuditAction::Generated { template_id: None },
            &caller.user_id,
            &fingerprint,
            now,
            None,
        );

        let created = self.documents.create(&caller.credential, &document).await?;
        info!(document_id = %created.id, contract_type = %kind, "Generated contract draft");
        Ok(created)
    }

    /// Fill a stored template with `values` and save the result as a draft
    ///
    /// Placeholders without a value stay in the content verbatim and are
    /// listed under [`MISSING_VARIABLES_KEY`] in the metadata. The template's
    /// usage count goes up once the document has been created.
    pub async fn create_from_template(
        &self,
        caller: &Caller,
        templates: &mut TemplateStore,
        template_id: &str,
        values: &BTreeMap<String, String>,
    ) -> DocResult<Document> {
        require(&caller.credential)?;
        let template = templates.get(template_id)?;
        if !template.is_active {
            return Err(DocError::validation(
                "template",
                format!("template '{}' is inactive", template.name),
            ));
        }

        let rendered = render_template(template.body(), values);
        let now = self.clock.now();
        let mut document = Document::new(
            template.name.clone(),
            kind_for_template(&template.template_type),
            DocumentStatus::Draft,
            now,
        );
        document.description = template.description.clone();
        document.metadata.template_id = Some(template.id.clone());
        if !rendered.missing.is_empty() {
            warn!(
                template_id = %template.id,
                missing = ?rendered.missing,
                "Template rendered with unfilled placeholders"
            );
            document.metadata.extra.insert(
                MISSING_VARIABLES_KEY.to_string(),
                serde_json::json!(rendered.missing),
            );
        }
        document.metadata.content = Some(rendered.content);
        let fingerprint = document.content_fingerprint();
        document.history.append(
            AuditAction::Generated {
                template_id: Some(template.id.clone()),
            },
            &caller.user_id,
            &fingerprint,
            now,
            None,
        );

        let created = self.documents.create(&caller.credential, &document).await?;
        let template = templates.record_usage(template_id)?;
        info!(
            document_id = %created.id,
            template_id = %template.id,
            usage_count = template.usage_count(),
            "Created document from template"
        );
        Ok(created)
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> DocResult<Document> {
        require(&caller.credential)?;
        self.documents.get(&caller.credential, id).await
    }

    /// Replace the content of a draft contract
    pub async fn edit_content(
        &self,
        caller: &Caller,
        id: &str,
        content: String,
    ) -> DocResult<Document> {
        let mut document = self.get(caller, id).await?;
        if let Err(e) = check_editable(&document) {
            warn!(document_id = %id, error = %e, "Edit rejected");
            return Err(e);
        }

        let now = self.clock.now();
        document.metadata.content = Some(content);
        document.metadata.last_edited = Some(now);
        document.metadata.last_edited_by = Some(caller.user_id.clone());
        document.updated_at = now;
        let fingerprint = document.content_fingerprint();
        document
            .history
            .append(AuditAction::Edited, &caller.user_id, &fingerprint, now, None);

        let saved = self.documents.update(&caller.credential, &document).await?;
        debug!(document_id = %id, "Saved edited content");
        Ok(saved)
    }

    /// draft -> pending, recording who sent it and when
    pub async fn send_for_signature(&self, caller: &Caller, id: &str) -> DocResult<Document> {
        let mut document = self.get(caller, id).await?;
        let now = self.transition(caller, &mut document, LifecycleAction::Send)?;
        document.metadata.sent_at = Some(now);
        document.metadata.sent_by = Some(caller.user_id.clone());
        self.documents.update(&caller.credential, &document).await
    }

    /// Apply the external signing result to a pending document
    pub async fn record_signing_outcome(
        &self,
        caller: &Caller,
        id: &str,
        outcome: SigningOutcome,
    ) -> DocResult<Document> {
        let mut document = self.get(caller, id).await?;
        self.transition(caller, &mut document, LifecycleAction::Signed(outcome))?;
        self.documents.update(&caller.credential, &document).await
    }

    /// active <-> inactive
    pub async fn toggle_active(&self, caller: &Caller, id: &str) -> DocResult<Document> {
        let mut document = self.get(caller, id).await?;
        let action = toggle_action(document.status).map_err(|e| {
            warn!(document_id = %id, error = %e, "Toggle rejected");
            e
        })?;
        self.transition(caller, &mut document, action)?;
        self.documents.update(&caller.credential, &document).await
    }

    /// Grant access to more users. Existing grantees are kept; repeats and
    /// blank ids are ignored.
    pub async fn share(
        &self,
        caller: &Caller,
        id: &str,
        grantees: &[String],
    ) -> DocResult<Document> {
        let requested: Vec<&str> = grantees
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();
        if requested.is_empty() {
            return Err(DocError::validation(
                "sharedWith",
                "at least one user to share with is required",
            ));
        }

        let mut document = self.get(caller, id).await?;
        if let Err(e) = check_shareable(&document) {
            warn!(document_id = %id, error = %e, "Share rejected");
            return Err(e);
        }

        let mut seen: HashSet<String> = document.shared_with.iter().cloned().collect();
        let added: Vec<String> = requested
            .into_iter()
            .filter(|g| seen.insert(g.to_string()))
            .map(str::to_string)
            .collect();
        if added.is_empty() {
            return Ok(document);
        }

        let now = self.clock.now();
        document.shared_with.extend(added.iter().cloned());
        document.is_shared = true;
        document.updated_at = now;
        let fingerprint = document.content_fingerprint();
        document.history.append(
            AuditAction::Shared {
                grantees: added.clone(),
            },
            &caller.user_id,
            &fingerprint,
            now,
            None,
        );
        let saved = self.documents.update(&caller.credential, &document).await?;
        info!(document_id = %id, added = added.len(), "Shared document");
        Ok(saved)
    }

    /// Revoke one grantee; unknown grantees leave the document unchanged
    pub async fn unshare(&self, caller: &Caller, id: &str, grantee: &str) -> DocResult<Document> {
        let mut document = self.get(caller, id).await?;
        let grantee = grantee.trim();
        let Some(index) = document.shared_with.iter().position(|g| g == grantee) else {
            return Ok(document);
        };

        let now = self.clock.now();
        document.shared_with.remove(index);
        document.is_shared = !document.shared_with.is_empty();
        document.updated_at = now;
        let fingerprint = document.content_fingerprint();
        document.history.append(
            AuditAction::Unshared {
                grantee: grantee.to_string(),
            },
            &caller.user_id,
            &fingerprint,
            now,
            None,
        );
        self.documents.update(&caller.credential, &document).await
    }

    /// Uploaded documents return their original bytes whatever `format`
    /// says; generated documents are converted to exactly `format`.
    pub async fn download(
        &self,
        caller: &Caller,
        id: &str,
        format: DownloadFormat,
    ) -> DocResult<Download> {
        let document = self.get(caller, id).await?;
        let download = match &document.file {
            Some(file) => Download {
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
                bytes: self.files.fetch(&caller.credential, file).await?,
            },
            None => Download {
                file_name: format!("{}.{}", file_stem(&document.name), format.extension()),
                mime_type: format.mime_type().to_string(),
                bytes: self
                    .converter
                    .convert(&caller.credential, &document.id, format)
                    .await?,
            },
        };

        // Audit write failures do not fail the download
        if let Err(e) = self.record_download(caller, id, format, &download).await {
            warn!(document_id = %id, error = %e, "Failed to record download");
        }
        Ok(download)
    }

    /// Append the download to the current record, re-read so changes made
    /// while the bytes were fetched are kept
    async fn record_download(
        &self,
        caller: &Caller,
        id: &str,
        format: DownloadFormat,
        download: &Download,
    ) -> DocResult<Document> {
        let mut latest = self.documents.get(&caller.credential, id).await?;
        latest.history.append(
            AuditAction::Downloaded { format },
            &caller.user_id,
            &hash_document(&download.bytes),
            self.clock.now(),
            None,
        );
        self.documents.update(&caller.credential, &latest).await
    }

    /// Permanent; the originating template's usage count is untouched
    pub async fn delete(&self, caller: &Caller, id: &str) -> DocResult<()> {
        require(&caller.credential)?;
        self.documents.delete(&caller.credential, id).await?;
        info!(document_id = %id, "Deleted document");
        Ok(())
    }

    /// `Ok(None)` means a newer `list` call started while this one was in
    /// flight, and this response was dropped.
    pub async fn list(
        &self,
        caller: &Caller,
        query: &DocumentQuery,
    ) -> DocResult<Option<Vec<Document>>> {
        require(&caller.credential)?;
        let ticket = self.list_epoch.begin();
        let result = self.documents.list(&caller.credential, query).await;
        if !self.list_epoch.is_current(ticket) {
            debug!(?ticket, "Discarding stale document list");
            return Ok(None);
        }
        result.map(Some)
    }

    /// Move `document` through `action`, stamping the audit chain.
    /// Returns the transition time.
    fn transition(
        &self,
        caller: &Caller,
        document: &mut Document,
        action: LifecycleAction,
    ) -> DocResult<DateTime<Utc>> {
        let from = document.status;
        let to = match action.apply(from) {
            Ok(to) => to,
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "Transition rejected");
                return Err(e);
            }
        };

        let now = self.clock.now();
        document.status = to;
        document.updated_at = now;
        let audit = match action {
            LifecycleAction::Send => AuditAction::Sent,
            LifecycleAction::Signed(outcome) => AuditAction::Signed {
                accepted: outcome == SigningOutcome::Accepted,
            },
            LifecycleAction::Activate | LifecycleAction::Deactivate => {
                AuditAction::StatusChanged { from, to }
            }
        };
        let fingerprint = document.content_fingerprint();
        document.history.append(
            audit,
            &caller.user_id,
            &fingerprint,
            now,
            Some(format!("{} -> {}", from, to)),
        );
        info!(document_id = %document.id, %from, %to, "Document status changed");
        Ok(now)
    }
}

fn validate_upload(request: &UploadRequest, max_bytes: u64) -> DocResult<()> {
    if request.name.trim().is_empty() {
        return Err(DocError::validation("name", "document name is required"));
    }
    let file = &request.file;
    if file.bytes.is_empty() {
        return Err(DocError::validation("file", "file is empty"));
    }
    if file.bytes.len() as u64 > max_bytes {
        return Err(DocError::validation(
            "file",
            format!(
                "file is {} bytes, larger than the {} byte limit",
                file.bytes.len(),
                max_bytes
            ),
        ));
    }
    let mime = file.mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_UPLOAD_TYPES.contains(&mime.as_str()) {
        return Err(DocError::validation(
            "file",
            format!(
                "unsupported file type '{}'; upload a PDF, DOC or DOCX file",
                file.mime_type
            ),
        ));
    }
    Ok(())
}

fn kind_for_template(template_type: &TemplateType) -> DocumentKind {
    match template_type {
        TemplateType::Lease => DocumentKind::Lease,
        TemplateType::Receipt => DocumentKind::Receipt,
        TemplateType::Report => DocumentKind::Inspection,
        TemplateType::Notice | TemplateType::Other(_) => DocumentKind::Other,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// File-system safe base name for a converted download
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: &str, bytes: &[u8]) -> UploadRequest {
        UploadRequest::new(
            name,
            DocumentKind::Lease,
            FileUpload {
                file_name: "lease.pdf".into(),
                mime_type: mime.into(),
                bytes: bytes.to_vec(),
            },
        )
    }

    #[test]
    fn test_upload_validation() {
        assert!(validate_upload(&upload("Lease", "application/pdf", b"%PDF"), 10).is_ok());
        assert!(validate_upload(&upload(" ", "application/pdf", b"%PDF"), 10).is_err());
        assert!(validate_upload(&upload("Lease", "application/pdf", b""), 10).is_err());
        assert!(validate_upload(&upload("Lease", "application/pdf", b"12345678901"), 10).is_err());
        assert!(validate_upload(&upload("Lease", "image/png", b"png"), 10).is_err());
        assert!(validate_upload(&upload("Lease", "Application/MSWord", b"doc"), 10).is_ok());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Lease Agreement - Ngozi"), "Lease Agreement - Ngozi");
        assert_eq!(file_stem("a/b:c"), "a_b_c");
        assert_eq!(file_stem("   "), "document");
    }

    #[test]
    fn test_template_kinds() {
        assert_eq!(kind_for_template(&TemplateType::Lease), DocumentKind::Lease);
        assert_eq!(kind_for_template(&TemplateType::Report), DocumentKind::Inspection);
        assert_eq!(
            kind_for_template(&TemplateType::Other("memo".into())),
            DocumentKind::Other
        );
    }

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.upload_policy.initial_status(), DocumentStatus::Active);
        assert_eq!(UploadPolicy::Draft.initial_status(), DocumentStatus::Draft);
    }
}
