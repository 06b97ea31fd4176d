//! Standard terms and conditions per contract kind

use shared_types::ContractKind;

const MANAGEMENT_CLAUSES: &[&str] = &[
    "The Property Manager shall act in the best interest of the Property Owner at all times.",
    "The Property Manager shall collect rent and remit collected funds to the Property Owner by the 10th day of each month.",
    "The Property Manager shall arrange routine maintenance and obtain the Property Owner's approval before any single repair expense exceeding the agreed limit.",
    "The Property Manager shall screen prospective tenants and keep accurate records of all leases, payments and expenses.",
    "The Property Manager shall provide the Property Owner with a monthly statement of income and expenses.",
    "Either party may terminate this Agreement with thirty (30) days written notice.",
    "This Agreement shall be governed by the laws of the jurisdiction in which the property is located.",
];

const TENANCY_CLAUSES: &[&str] = &[
    "The Tenant shall pay rent in full on or before the first day of each month.",
    "The Tenant shall keep the premises clean and in good condition and shall be responsible for damage beyond normal wear and tear.",
    "The Tenant shall not sublet the premises or assign this lease without the Landlord's written consent.",
    "The Tenant shall not make alterations to the premises without the Landlord's written consent.",
    "The Tenant shall allow the Landlord reasonable access for inspection and repairs upon at least twenty-four (24) hours notice.",
    "The Tenant shall comply with all applicable laws, regulations and estate rules.",
    "Either party may terminate this lease as provided by law or upon thirty (30) days written notice at the end of the term.",
];

pub fn standard_clauses(kind: ContractKind) -> &'static [&'static str] {
    match kind {
        ContractKind::Manager => MANAGEMENT_CLAUSES,
        ContractKind::Tenant => TENANCY_CLAUSES,
    }
}
