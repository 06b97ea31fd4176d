//! Document status state machine
//!
//! ```text
//! draft --Send--> pending --Signed(Accepted)--> active <--Activate/Deactivate--> inactive
//!                        \--Signed(Rejected)--> rejected
//! ```
//!
//! Deletion is allowed from every status and is not modelled as a transition.

use serde::{Deserialize, Serialize};
use shared_types::{DocError, DocResult, Document, DocumentKind, DocumentStatus};

/// Result of the external signing process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningOutcome {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Send,
    Signed(SigningOutcome),
    Activate,
    Deactivate,
}

impl LifecycleAction {
    /// Verb used in `InvalidState` messages
    pub fn verb(&self) -> &'static str {
        match self {
            LifecycleAction::Send => "send",
            LifecycleAction::Signed(_) => "record a signature for",
            LifecycleAction::Activate => "activate",
            LifecycleAction::Deactivate => "deactivate",
        }
    }

    /// Status reached by applying this action, or `InvalidState`
    pub fn apply(self, from: DocumentStatus) -> DocResult<DocumentStatus> {
        use DocumentStatus::*;
        let to = match (from, self) {
            (Draft, LifecycleAction::Send) => Pending,
            (Pending, LifecycleAction::Signed(SigningOutcome::Accepted)) => Active,
            (Pending, LifecycleAction::Signed(SigningOutcome::Rejected)) => Rejected,
            (Inactive, LifecycleAction::Activate) => Active,
            (Active, LifecycleAction::Deactivate) => Inactive,
            _ => return Err(DocError::invalid_state(self.verb(), from)),
        };
        Ok(to)
    }
}

/// The action a manual active/inactive toggle performs from `status`
pub fn toggle_action(status: DocumentStatus) -> DocResult<LifecycleAction> {
    match status {
        DocumentStatus::Active => Ok(LifecycleAction::Deactivate),
        DocumentStatus::Inactive => Ok(LifecycleAction::Activate),
        other => Err(DocError::invalid_state("toggle", other)),
    }
}

/// Content may be edited in place only on draft contracts
pub fn check_editable(document: &Document) -> DocResult<()> {
    if document.status != DocumentStatus::Draft {
        return Err(DocError::invalid_state("edit", document.status));
    }
    if document.kind != DocumentKind::Contract {
        return Err(DocError::validation(
            "type",
            format!("only contracts can be edited in place, not '{}'", document.kind),
        ));
    }
    Ok(())
}

pub fn check_shareable(document: &Document) -> DocResult<()> {
    if document.status == DocumentStatus::Draft {
        return Err(DocError::invalid_state("share", document.status));
    }
    Ok(())
}
