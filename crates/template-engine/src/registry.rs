//! Built-in templates offered to every new workspace

use crate::template::{NewTemplate, TemplateType};

const RESIDENTIAL_LEASE: &str = "\
RESIDENTIAL LEASE AGREEMENT

This lease is made on {{LEASE_DATE}} between {{LANDLORD_NAME}} (\"Landlord\") and {{TENANT_NAME}} (\"Tenant\").

PREMISES
{{PROPERTY_ADDRESS}}, Unit {{UNIT_NUMBER}}

TERM
The lease begins on {{START_DATE}} and ends on {{END_DATE}}.

RENT
Tenant shall pay {{CURRENCY}}{{RENT_AMOUNT}} per month, due on the first day of each month.

SECURITY DEPOSIT
Tenant has paid a security deposit of {{CURRENCY}}{{DEPOSIT_AMOUNT}}.

Landlord: ______________________    Tenant: ______________________
";

const LATE_RENT_NOTICE: &str = "\
NOTICE OF LATE RENT

Date: {{NOTICE_DATE}}

To: {{TENANT_NAME}}
Property: {{PROPERTY_ADDRESS}}, Unit {{UNIT_NUMBER}}

Our records show that rent of {{CURRENCY}}{{AMOUNT_DUE}} due on {{DUE_DATE}} has not been received.
Please pay the outstanding balance within {{GRACE_DAYS}} days of this notice.

{{MANAGER_NAME}}
";

const RENT_RECEIPT: &str = "\
RENT RECEIPT

Receipt No: {{RECEIPT_NUMBER}}
Date: {{PAYMENT_DATE}}

Received from {{TENANT_NAME}} the sum of {{CURRENCY}}{{AMOUNT_PAID}} for rent of
{{PROPERTY_ADDRESS}}, Unit {{UNIT_NUMBER}}, covering the period {{PERIOD_START}} to {{PERIOD_END}}.

Payment method: {{PAYMENT_METHOD}}
Received by: {{MANAGER_NAME}}
";

const INSPECTION_REPORT: &str = "\
PROPERTY INSPECTION REPORT

Property: {{PROPERTY_NAME}} ({{PROPERTY_ADDRESS}})
Unit: {{UNIT_NUMBER}}
Inspection date: {{INSPECTION_DATE}}
Inspector: {{INSPECTOR_NAME}}

CONDITION SUMMARY
{{CONDITION_NOTES}}

FOLLOW-UP ACTIONS
{{FOLLOW_UP_ACTIONS}}
";

/// The templates a fresh store is seeded with
pub fn builtin_templates() -> Vec<NewTemplate> {
    vec![
        NewTemplate::new(
            "Standard Residential Lease",
            TemplateType::Lease,
            "Fixed-term residential lease with rent and deposit terms",
            RESIDENTIAL_LEASE,
        ),
        NewTemplate::new(
            "Late Rent Notice",
            TemplateType::Notice,
            "Reminder sent to tenants with overdue rent",
            LATE_RENT_NOTICE,
        ),
        NewTemplate::new(
            "Rent Receipt",
            TemplateType::Receipt,
            "Acknowledgement of a rent payment",
            RENT_RECEIPT,
        ),
        NewTemplate::new(
            "Property Inspection Report",
            TemplateType::Report,
            "Move-in, move-out or periodic inspection findings",
            INSPECTION_REPORT,
        ),
    ]
}
