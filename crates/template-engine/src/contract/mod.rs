//! Contract document generation for manager and tenant agreements

pub mod clauses;
pub mod currency;
pub mod form;
pub mod generator;

pub use currency::currency_symbol;
pub use form::{Compensation, ContractForm, Counterpart, PropertyInfo};
pub use generator::{
    agreement_name, contract_title, normalize_responsibilities, ContractGenerator, DRAFT_MARKER,
    OWNER_PLACEHOLDER,
};
