//! Contract body rendering
//!
//! Sections are emitted in a fixed order: title, parties, property, term,
//! compensation, responsibilities, standard terms, signatures, footer. Only
//! the footer depends on the clock.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Clock, ContractKind};
use tracing::debug;

use super::clauses::standard_clauses;
use super::currency::currency_symbol;
use super::form::{Compensation, ContractForm};

pub const DRAFT_MARKER: &str = "Draft — Not yet sent for signature";
pub const OWNER_PLACEHOLDER: &str = "{{OWNER_NAME}}";
pub const TBD: &str = "TBD";

const SIGNATURE_LINE: &str = "______________________________";
const DATE_LINE: &str = "______________";

lazy_static! {
    /// One leading bullet (•, -, *) or list number ("1.") plus trailing spaces
    static ref LIST_MARKER: Regex = Regex::new(r"^(?:[•\-*]|\d+\.)\s*").unwrap();
}

/// Role labels for the two signing parties
struct Parties {
    owner: &'static str,
    counterpart: &'static str,
}

fn parties(kind: ContractKind) -> Parties {
    match kind {
        ContractKind::Manager => Parties {
            owner: "Property Owner",
            counterpart: "Property Manager",
        },
        ContractKind::Tenant => Parties {
            owner: "Landlord",
            counterpart: "Tenant",
        },
    }
}

pub fn contract_title(kind: ContractKind) -> &'static str {
    match kind {
        ContractKind::Manager => "PROPERTY MANAGEMENT AGREEMENT",
        ContractKind::Tenant => "LEASE AGREEMENT",
    }
}

/// Title-case agreement name, also used to name generated documents
pub fn agreement_name(kind: ContractKind) -> &'static str {
    match kind {
        ContractKind::Manager => "Property Management Agreement",
        ContractKind::Tenant => "Lease Agreement",
    }
}

/// Split free text into list items, dropping blank lines and list markers
pub fn normalize_responsibilities(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub struct ContractGenerator {
    clock: Arc<dyn Clock>,
}

impl ContractGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn generate(&self, form: &ContractForm) -> String {
        let kind = form.kind();
        let roles = parties(kind);
        let property = form.property();
        let symbol = currency_symbol(property.currency.as_deref());
        let mut lines: Vec<String> = Vec::new();

        lines.push(contract_title(kind).to_string());
        lines.push(String::new());
        lines.push(format!(
            "This {} (\"Agreement\") is entered into between the parties named below.",
            agreement_name(kind)
        ));
        lines.push(String::new());

        lines.push("1. PARTIES".to_string());
        lines.push(format!(
            "{}: {}",
            roles.owner,
            form.owner_name().unwrap_or(OWNER_PLACEHOLDER)
        ));
        lines.push(format!("{}: {}", roles.counterpart, form.counterpart().name));
        lines.push(String::new());

        lines.push("2. PROPERTY".to_string());
        lines.push(format!("Property: {}", property.name));
        let address = property.full_address();
        lines.push(format!(
            "Address: {}",
            if address.is_empty() {
                "Not specified"
            } else {
                address.as_str()
            }
        ));
        lines.push(String::new());

        lines.push("3. TERM".to_string());
        lines.push(format!("Start Date: {}", format_date(form.start_date())));
        lines.push(format!("End Date: {}", format_date(form.end_date())));
        lines.push(String::new());

        match (kind, form.compensation()) {
            (ContractKind::Manager, Compensation::Fixed { amount }) => {
                lines.push("4. COMPENSATION".to_string());
                lines.push(format!(
                    "The Property Manager shall receive {}{} per month for the services described in this Agreement.",
                    symbol, amount
                ));
            }
            (ContractKind::Manager, Compensation::Percentage { percent }) => {
                lines.push("4. COMPENSATION".to_string());
                lines.push(format!(
                    "The Property Manager shall receive {}% of monthly property revenue.",
                    percent
                ));
                lines.push(
                    "This percentage shall be calculated on the gross rental income collected from the property each month."
                        .to_string(),
                );
            }
            (ContractKind::Tenant, Compensation::Fixed { amount }) => {
                lines.push("4. RENT".to_string());
                lines.push(format!(
                    "The Tenant shall pay rent of {}{} per month, payable in advance on the first day of each month.",
                    symbol, amount
                ));
            }
            (ContractKind::Tenant, Compensation::Percentage { .. }) => {
                unreachable!("ContractForm rejects percentage rent for tenant contracts")
            }
        }
        lines.push(String::new());

        lines.push(match kind {
            ContractKind::Manager => "5. RESPONSIBILITIES".to_string(),
            ContractKind::Tenant => "5. TENANT OBLIGATIONS".to_string(),
        });
        let items = normalize_responsibilities(form.responsibilities());
        if items.is_empty() {
            lines.push("None specified.".to_string());
        } else {
            lines.extend(items.into_iter().map(|item| format!("• {}", item)));
        }
        lines.push(String::new());

        lines.push("6. TERMS AND CONDITIONS".to_string());
        lines.extend(
            standard_clauses(kind)
                .iter()
                .enumerate()
                .map(|(i, clause)| format!("{}. {}", i + 1, clause)),
        );
        lines.push(String::new());

        lines.push("7. SIGNATURES".to_string());
        lines.push(String::new());
        lines.push(format!(
            "{}: {}  Date: {}",
            roles.owner, SIGNATURE_LINE, DATE_LINE
        ));
        lines.push(String::new());
        lines.push(format!(
            "{}: {}  Date: {}",
            roles.counterpart, SIGNATURE_LINE, DATE_LINE
        ));
        lines.push(String::new());

        lines.push("---".to_string());
        lines.push(format!(
            "Generated on {} UTC",
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(DRAFT_MARKER.to_string());

        debug!(
            "Generated {} contract for {} ({} lines)",
            kind,
            form.counterpart().name,
            lines.len()
        );
        lines.join("\n")
    }
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => TBD.to_string(),
    }
}
