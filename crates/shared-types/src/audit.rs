//! Tamper-evident audit trail for document lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{DocumentStatus, DownloadFormat};

/// Types of auditable events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Uploaded,
    Generated {
        template_id: Option<String>,
    },
    Edited,
    Sent,
    Signed {
        accepted: bool,
    },
    StatusChanged {
        from: DocumentStatus,
        to: DocumentStatus,
    },
    Shared {
        grantees: Vec<String>,
    },
    Unshared {
        grantee: String,
    },
    Downloaded {
        format: DownloadFormat,
    },
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: AuditAction,
    pub actor: String,
    pub content_hash: String,
    pub previous_hash: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        actor: &str,
        content_hash: &str,
        at: DateTime<Utc>,
        previous_hash: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: at.to_rfc3339(),
            action,
            actor: actor.to_string(),
            content_hash: content_hash.to_string(),
            previous_hash,
            details,
        }
    }

    /// Compute the hash of this event (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.event_id.as_bytes());
        hasher.update(self.timestamp.as_bytes());
        hasher.update(format!("{:?}", self.action).as_bytes());
        hasher.update(self.actor.as_bytes());
        hasher.update(self.content_hash.as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        if let Some(ref details) = self.details {
            hasher.update(details.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Audit chain broken at event {index}")]
pub struct ChainBroken {
    pub index: usize,
}

/// Chain of audit events with hash linking
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
    pub document_id: String,
    pub created_at: String,
}

impl AuditChain {
    pub fn new(document_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            events: Vec::new(),
            document_id: document_id.to_string(),
            created_at: at.to_rfc3339(),
        }
    }

    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, linking it to the previous one
    pub fn append(
        &mut self,
        action: AuditAction,
        actor: &str,
        content_hash: &str,
        at: DateTime<Utc>,
        details: Option<String>,
    ) -> &AuditEvent {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor, content_hash, at, previous_hash, details);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn verify(&self) -> Result<(), ChainBroken> {
        let mut expected_prev: Option<String> = None;

        for (index, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(ChainBroken { index });
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }

    /// One line per event, oldest first
    pub fn summary(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| {
                format!(
                    "[{}] {} - {:?}",
                    e.timestamp.split('T').next().unwrap_or(&e.timestamp),
                    e.actor,
                    e.action
                )
            })
            .collect()
    }
}

/// Compute SHA-256 hash of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
