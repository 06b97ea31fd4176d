pub mod audit;
pub mod clock;
pub mod error;
pub mod types;

pub use audit::{hash_document, AuditAction, AuditChain, AuditEvent, ChainBroken};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DocError, DocResult, GENERIC_FAILURE};
pub use types::{
    Associations, ContractKind, Credential, Document, DocumentKind, DocumentMetadata,
    DocumentStatus, DownloadFormat, StoredFile,
};
