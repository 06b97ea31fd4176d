//! Validated contract form values
//!
//! Every constructor and `with_*` transition validates its input, so a
//! `ContractForm` that exists is always renderable. Deserialization goes
//! through the same constructors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{ContractKind, DocError, DocResult};

/// The party the contract addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterpart {
    pub id: String,
    pub name: String,
}

impl Counterpart {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> DocResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DocError::validation("counterpart", "counterpart name is required"));
        }
        Ok(Self {
            id: id.into(),
            name,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// ISO 4217 code, e.g. "NGN"
    #[serde(default)]
    pub currency: Option<String>,
}

impl PropertyInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_address(
        mut self,
        address: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Self {
        self.address = address.map(str::to_string);
        self.city = city.map(str::to_string);
        self.state = state.map(str::to_string);
        self.country = country.map(str::to_string);
        self
    }

    pub fn with_currency(mut self, code: &str) -> Self {
        self.currency = Some(code.to_string());
        self
    }

    /// Non-empty address parts joined with ", "
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// How the counterpart is paid (manager) or pays (tenant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "CompensationRecord")]
pub enum Compensation {
    Fixed { amount: String },
    Percentage { percent: String },
}

/// Wire shape of [`Compensation`] before validation
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CompensationRecord {
    Fixed { amount: String },
    Percentage { percent: String },
}

impl TryFrom<CompensationRecord> for Compensation {
    type Error = DocError;

    fn try_from(record: CompensationRecord) -> DocResult<Self> {
        match record {
            CompensationRecord::Fixed { amount } => Compensation::fixed(&amount),
            CompensationRecord::Percentage { percent } => Compensation::percentage(&percent),
        }
    }
}

impl Compensation {
    /// A fixed monthly amount; must be a non-negative number
    pub fn fixed(amount: &str) -> DocResult<Self> {
        let amount = amount.trim();
        match amount.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(Compensation::Fixed {
                amount: amount.to_string(),
            }),
            _ => Err(DocError::validation(
                "compensation",
                format!("'{}' is not a valid amount", amount),
            )),
        }
    }

    /// A share of monthly revenue; must be a number in [0, 100]
    pub fn percentage(percent: &str) -> DocResult<Self> {
        let percent = percent.trim();
        match percent.parse::<f64>() {
            Ok(value) if (0.0..=100.0).contains(&value) => Ok(Compensation::Percentage {
                percent: percent.to_string(),
            }),
            _ => Err(DocError::validation(
                "compensation",
                format!("percentage must be between 0 and 100, got '{}'", percent),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ContractFormRecord")]
pub struct ContractForm {
    kind: ContractKind,
    counterpart: Counterpart,
    property: PropertyInfo,
    compensation: Compensation,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    responsibilities: String,
    owner_name: Option<String>,
}

impl ContractForm {
    pub fn new(
        kind: ContractKind,
        counterpart: Counterpart,
        property: PropertyInfo,
        compensation: Compensation,
    ) -> DocResult<Self> {
        if property.name.trim().is_empty() {
            return Err(DocError::validation("property", "property name is required"));
        }
        check_compensation(kind, &compensation)?;
        Ok(Self {
            kind,
            counterpart,
            property,
            compensation,
            start_date: None,
            end_date: None,
            responsibilities: String::new(),
            owner_name: None,
        })
    }

    pub fn with_term(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DocResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(DocError::validation(
                    "endDate",
                    "end date cannot be before start date",
                ));
            }
        }
        Ok(Self {
            start_date: start,
            end_date: end,
            ..self
        })
    }

    pub fn with_compensation(self, compensation: Compensation) -> DocResult<Self> {
        check_compensation(self.kind, &compensation)?;
        Ok(Self {
            compensation,
            ..self
        })
    }

    pub fn with_responsibilities(self, text: impl Into<String>) -> Self {
        Self {
            responsibilities: text.into(),
            ..self
        }
    }

    pub fn with_owner_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let owner_name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        Self { owner_name, ..self }
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn counterpart(&self) -> &Counterpart {
        &self.counterpart
    }

    pub fn property(&self) -> &PropertyInfo {
        &self.property
    }

    pub fn compensation(&self) -> &Compensation {
        &self.compensation
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn responsibilities(&self) -> &str {
        &self.responsibilities
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractFormRecord {
    kind: ContractKind,
    counterpart: Counterpart,
    property: PropertyInfo,
    compensation: Compensation,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    responsibilities: String,
    #[serde(default)]
    owner_name: Option<String>,
}

impl TryFrom<ContractFormRecord> for ContractForm {
    type Error = DocError;

    fn try_from(record: ContractFormRecord) -> DocResult<Self> {
        let counterpart = Counterpart::new(record.counterpart.id, record.counterpart.name)?;
        let form = ContractForm::new(record.kind, counterpart, record.property, record.compensation)?
            .with_term(record.start_date, record.end_date)?
            .with_responsibilities(record.responsibilities);
        Ok(match record.owner_name {
            Some(name) => form.with_owner_name(name),
            None => form,
        })
    }
}

fn check_compensation(kind: ContractKind, compensation: &Compensation) -> DocResult<()> {
    match (kind, compensation) {
        (ContractKind::Tenant, Compensation::Percentage { .. }) => Err(DocError::validation(
            "compensation",
            "tenant contracts take a fixed monthly rent",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_form(compensation: Compensation) -> DocResult<ContractForm> {
        ContractForm::new(
            ContractKind::Manager,
            Counterpart::new("m-1", "Bola Ade").unwrap(),
            PropertyInfo::new("p-1", "Palm Court"),
            compensation,
        )
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Compensation::percentage("0").is_ok());
        assert!(Compensation::percentage("100").is_ok());
        assert!(Compensation::percentage("12.5").is_ok());
        assert!(Compensation::percentage("100.5").is_err());
        assert!(Compensation::percentage("-1").is_err());
        assert!(Compensation::percentage("ten").is_err());
    }

    #[test]
    fn test_fixed_amount_must_be_non_negative_number() {
        assert!(Compensation::fixed(" 5000 ").is_ok());
        assert!(Compensation::fixed("-10").is_err());
        assert!(Compensation::fixed("").is_err());
        assert!(Compensation::fixed("NaN").is_err());
    }

    #[test]
    fn test_tenant_rejects_percentage() {
        let result = ContractForm::new(
            ContractKind::Tenant,
            Counterpart::new("t-1", "Ngozi").unwrap(),
            PropertyInfo::new("p-1", "Palm Court"),
            Compensation::percentage("10").unwrap(),
        );
        assert!(matches!(result, Err(DocError::Validation { .. })));
    }

    #[test]
    fn test_term_rejects_end_before_start() {
        let form = manager_form(Compensation::fixed("100").unwrap()).unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 6, 1);
        let end = NaiveDate::from_ymd_opt(2025, 5, 1);
        assert!(form.clone().with_term(start, end).is_err());
        assert!(form.with_term(end, start).is_ok());
    }

    #[test]
    fn test_transitions_leave_other_fields_intact() {
        let form = manager_form(Compensation::fixed("100").unwrap())
            .unwrap()
            .with_responsibilities("Collect rent")
            .with_owner_name("Mrs. Eze");
        let form = form
            .with_compensation(Compensation::percentage("8").unwrap())
            .unwrap();

        assert_eq!(form.responsibilities(), "Collect rent");
        assert_eq!(form.owner_name(), Some("Mrs. Eze"));
        assert_eq!(
            form.compensation(),
            &Compensation::Percentage {
                percent: "8".into()
            }
        );
    }

    #[test]
    fn test_empty_names_are_rejected() {
        assert!(Counterpart::new("x", "  ").is_err());
        assert!(manager_form(Compensation::fixed("1").unwrap()).is_ok());
        let result = ContractForm::new(
            ContractKind::Manager,
            Counterpart::new("m-1", "Bola").unwrap(),
            PropertyInfo::new("p-1", ""),
            Compensation::fixed("1").unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialized_forms_are_validated() {
        let valid = serde_json::json!({
            "kind": "manager",
            "counterpart": { "id": "m-1", "name": "Bola Ade" },
            "property": { "id": "p-1", "name": "Palm Court" },
            "compensation": { "type": "percentage", "percent": "8" },
            "startDate": "2025-01-01",
            "endDate": "2025-12-31"
        });
        let form: ContractForm = serde_json::from_value(valid.clone()).unwrap();
        assert_eq!(form.compensation(), &Compensation::percentage("8").unwrap());
        assert_eq!(form.responsibilities(), "");

        let mut tenant_percentage = valid.clone();
        tenant_percentage["kind"] = "tenant".into();
        let mut out_of_range = valid.clone();
        out_of_range["compensation"]["percent"] = "250".into();
        let mut negative_rent = valid.clone();
        negative_rent["compensation"] = serde_json::json!({ "type": "fixed", "amount": "-5" });
        let mut reversed_term = valid.clone();
        reversed_term["endDate"] = "2024-12-31".into();
        let mut blank_counterpart = valid;
        blank_counterpart["counterpart"]["name"] = " ".into();

        for bad in [
            tenant_percentage,
            out_of_range,
            negative_rent,
            reversed_term,
            blank_counterpart,
        ] {
            assert!(
                serde_json::from_value::<ContractForm>(bad.clone()).is_err(),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_full_address_skips_blank_parts() {
        let property = PropertyInfo::new("p-1", "Palm Court").with_address(
            Some("12 Marina Rd"),
            Some(" "),
            Some("Lagos"),
            None,
        );
        assert_eq!(property.full_address(), "12 Marina Rd, Lagos");
    }
}
