//! Template entity and its input shapes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::DocError;

use crate::variables::extract_variables;

/// Template category; the four built-ins plus an open extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TemplateType {
    Lease,
    Notice,
    Receipt,
    Report,
    Other(String),
}

impl TemplateType {
    pub fn as_str(&self) -> &str {
        match self {
            TemplateType::Lease => "lease",
            TemplateType::Notice => "notice",
            TemplateType::Receipt => "receipt",
            TemplateType::Report => "report",
            TemplateType::Other(name) => name,
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" => Err(DocError::validation("type", "template type is required")),
            "lease" => Ok(TemplateType::Lease),
            "notice" => Ok(TemplateType::Notice),
            "receipt" => Ok(TemplateType::Receipt),
            "report" => Ok(TemplateType::Report),
            _ => Ok(TemplateType::Other(normalized)),
        }
    }
}

impl TryFrom<String> for TemplateType {
    type Error = DocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TemplateType> for String {
    fn from(value: TemplateType) -> Self {
        value.as_str().to_string()
    }
}

/// A stored document skeleton.
///
/// `variables` always equals `extract_variables(body)`; the body can only be
/// changed through [`Template::set_body`], and deserialization recomputes the
/// variable list from the body it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TemplateRecord")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    pub description: String,
    body: String,
    variables: Vec<String>,
    pub is_active: bool,
    usage_count: u64,
    pub created_date: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Wire shape accepted when deserializing a [`Template`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    template_type: TemplateType,
    #[serde(default)]
    description: String,
    body: String,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    usage_count: u64,
    created_date: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        let variables = extract_variables(&record.body);
        Template {
            id: record.id,
            name: record.name,
            template_type: record.template_type,
            description: record.description,
            body: record.body,
            variables,
            is_active: record.is_active,
            usage_count: record.usage_count,
            created_date: record.created_date,
            last_modified: record.last_modified,
        }
    }
}

impl Template {
    pub(crate) fn new(id: String, input: NewTemplate, now: DateTime<Utc>) -> Self {
        let variables = extract_variables(&input.body);
        Template {
            id,
            name: input.name,
            template_type: input.template_type,
            description: input.description,
            body: input.body,
            variables,
            is_active: input.is_active,
            usage_count: 0,
            created_date: now,
            last_modified: now,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Replace the body and recompute the variable list
    pub fn set_body(&mut self, body: String) {
        self.variables = extract_variables(&body);
        self.body = body;
    }

    pub(crate) fn increment_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
    }

    pub(crate) fn matches_search(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

/// Input for creating a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewTemplate {
    pub fn new(
        name: impl Into<String>,
        template_type: TemplateType,
        description: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template_type,
            description: description.into(),
            body: body.into(),
            is_active: true,
        }
    }
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub template_type: Option<TemplateType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_template_type_accepts_extension_names() {
        assert_eq!("Lease".parse::<TemplateType>().unwrap(), TemplateType::Lease);
        assert_eq!(
            "move_in_checklist".parse::<TemplateType>().unwrap(),
            TemplateType::Other("move_in_checklist".into())
        );
        assert!("  ".parse::<TemplateType>().is_err());
    }

    #[test]
    fn test_deserialize_recomputes_variables() {
        let json = serde_json::json!({
            "id": "t-1",
            "name": "Notice",
            "type": "notice",
            "description": "Late rent",
            "body": "Dear {{TENANT_NAME}}, {{AMOUNT}} is overdue",
            "variables": ["BOGUS"],
            "isActive": true,
            "usageCount": 3,
            "createdDate": "2025-01-01T00:00:00Z",
            "lastModified": "2025-01-01T00:00:00Z"
        });

        let template: Template = serde_json::from_value(json).unwrap();
        assert_eq!(template.variables(), ["TENANT_NAME", "AMOUNT"]);
        assert_eq!(template.usage_count(), 3);
    }

    #[test]
    fn test_set_body_keeps_variables_in_sync() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut template = Template::new(
            "t-1".into(),
            NewTemplate::new("Receipt", TemplateType::Receipt, "Rent receipt", "{{AMOUNT}}"),
            now,
        );
        template.set_body("Received {{AMOUNT}} from {{TENANT_NAME}}".into());
        assert_eq!(template.variables(), ["AMOUNT", "TENANT_NAME"]);
    }
}
