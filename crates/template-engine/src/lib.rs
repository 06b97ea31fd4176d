//! Template and contract rendering
//!
//! This crate provides the text side of document generation:
//! - Placeholder extraction and substitution (`{{VARIABLE_NAME}}` tokens)
//! - An in-memory template store with a built-in registry
//! - Manager and tenant contract generation from validated form values

pub mod contract;
pub mod registry;
pub mod store;
pub mod template;
pub mod variables;

pub use contract::{Compensation, ContractForm, ContractGenerator, Counterpart, PropertyInfo};
pub use store::{Retired, TemplateFilter, TemplateStore};
pub use template::{NewTemplate, Template, TemplateType, TemplateUpdate};
pub use variables::{extract_variables, render_template, RenderedTemplate};
