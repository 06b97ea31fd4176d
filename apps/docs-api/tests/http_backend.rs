//! The lifecycle manager driving a live server through `HttpBackend`

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use docs_api::{router, AppState};
use document_lifecycle::{
    Caller, DocumentManager, DocumentQuery, FileStorage, FileUpload, HttpBackend, UploadRequest,
};
use pretty_assertions::assert_eq;
use shared_types::{
    ContractKind, Credential, DocError, DocumentKind, DocumentStatus, DownloadFormat, FixedClock,
};
use sqlx::sqlite::SqlitePoolOptions;
use template_engine::{Compensation, ContractForm, Counterpart, PropertyInfo};

const TOKEN: &str = "lifecycle-token";

/// Serve on an ephemeral port and return its base URL
async fn spawn_server() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ));
    let state = AppState::from_pool(pool, TOKEN.to_string(), 1024 * 1024, clock)
        .await
        .unwrap();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn manager(base_url: &str) -> DocumentManager {
    let backend = Arc::new(HttpBackend::new(base_url).unwrap());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap(),
    ));
    DocumentManager::new(backend.clone(), backend.clone(), backend, clock)
}

fn caller(token: &str) -> Caller {
    Caller::new(Credential::bearer(token), "user-ada")
}

fn tenant_form() -> ContractForm {
    ContractForm::new(
        ContractKind::Tenant,
        Counterpart::new("tenant-7", "Chidi Okafor").unwrap(),
        PropertyInfo::new("prop-2", "Lekki Gardens"),
        Compensation::fixed("250000").unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_generated_contract_full_lifecycle_over_http() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url);
    let caller = caller(TOKEN);

    let draft = manager
        .generate_contract(&caller, &tenant_form(), None)
        .await
        .unwrap();
    assert_eq!(draft.status, DocumentStatus::Draft);

    let fetched = manager.get(&caller, &draft.id).await.unwrap();
    assert_eq!(fetched, draft);

    let sent = manager.send_for_signature(&caller, &draft.id).await.unwrap();
    assert_eq!(sent.status, DocumentStatus::Pending);

    let err = manager
        .edit_content(&caller, &draft.id, "rewritten".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DocError::InvalidState { .. }));

    let download = manager
        .download(&caller, &draft.id, DownloadFormat::Pdf)
        .await
        .unwrap();
    assert!(download.bytes.starts_with(b"%PDF"));
    assert_eq!(download.mime_type, "application/pdf");

    let err = manager
        .download(&caller, &draft.id, DownloadFormat::Docx)
        .await
        .unwrap_err();
    assert!(matches!(err, DocError::Transport(_)));

    let listed = manager
        .list(
            &caller,
            &DocumentQuery {
                status: Some(DocumentStatus::Pending),
                ..DocumentQuery::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, draft.id);

    manager.delete(&caller, &draft.id).await.unwrap();
    assert_eq!(
        manager.get(&caller, &draft.id).await.unwrap_err(),
        DocError::not_found("Document", draft.id.as_str())
    );
}

#[tokio::test]
async fn test_uploaded_file_downloads_original_bytes_over_http() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url);
    let caller = caller(TOKEN);
    let original = b"%PDF-1.4 scanned and signed".to_vec();

    let uploaded = manager
        .upload(
            &caller,
            UploadRequest::new(
                "Signed lease",
                DocumentKind::Lease,
                FileUpload {
                    file_name: "signed.pdf".into(),
                    mime_type: "application/pdf".into(),
                    bytes: original.clone(),
                },
            ),
        )
        .await
        .unwrap();
    assert!(uploaded.file.as_ref().unwrap().url.starts_with("/api/files/"));

    for format in [DownloadFormat::Pdf, DownloadFormat::Docx] {
        let download = manager.download(&caller, &uploaded.id, format).await.unwrap();
        assert_eq!(download.bytes, original);
        assert_eq!(download.file_name, "signed.pdf");
    }
}

#[tokio::test]
async fn test_wrong_token_maps_to_unauthorized() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url);

    let err = manager
        .generate_contract(&caller("not-the-token"), &tenant_form(), None)
        .await
        .unwrap_err();
    assert_eq!(err, DocError::Unauthorized);
}

#[tokio::test]
async fn test_stored_file_can_be_deleted_over_http() {
    let base_url = spawn_server().await;
    let backend = HttpBackend::new(base_url.as_str()).unwrap();
    let credential = Credential::bearer(TOKEN);
    let upload = FileUpload {
        file_name: "draft.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.4 draft".to_vec(),
    };

    let stored = backend.store(&credential, &upload).await.unwrap();
    backend.delete(&credential, &stored).await.unwrap();

    assert!(matches!(
        backend.fetch(&credential, &stored).await,
        Err(DocError::NotFound { .. })
    ));
    assert!(matches!(
        backend.delete(&credential, &stored).await,
        Err(DocError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_absolute_url_on_the_server_is_fetched() {
    let base_url = spawn_server().await;
    let backend = HttpBackend::new(base_url.as_str()).unwrap();
    let credential = Credential::bearer(TOKEN);
    let upload = FileUpload {
        file_name: "scan.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: b"%PDF-1.4 scan".to_vec(),
    };

    let mut stored = backend.store(&credential, &upload).await.unwrap();
    stored.url = format!("{}{}", base_url, stored.url);
    assert_eq!(backend.fetch(&credential, &stored).await.unwrap(), upload.bytes);
}
