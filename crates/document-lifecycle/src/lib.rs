//! Document lifecycle management
//!
//! Persists generated, uploaded and edited documents through pluggable
//! collaborators and moves them through the status state machine in
//! [`status`]. [`memory`] holds in-process collaborators; [`http`] talks to
//! the docs-api server.

pub mod collaborators;
pub mod epoch;
pub mod http;
pub mod manager;
pub mod memory;
pub mod status;

pub use collaborators::{
    Download, DocumentApi, DocumentQuery, FileStorage, FileUpload, FormatConverter,
};
pub use epoch::{EpochTicket, RequestEpoch};
pub use http::HttpBackend;
pub use manager::{
    Caller, DocumentManager, ManagerConfig, UploadPolicy, UploadRequest, ALLOWED_UPLOAD_TYPES,
    DEFAULT_MAX_UPLOAD_BYTES, MISSING_VARIABLES_KEY,
};
pub use memory::{InMemoryDocuments, InMemoryFiles, RecordingConverter};
pub use status::{check_editable, check_shareable, toggle_action, LifecycleAction, SigningOutcome};
