//! Lead payloads and the mapping from custom Apex responses to Lead fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SObject name of a Lead.
pub const OBJECT_NAME: &str = "Lead";

/// `FirstName` used when the Apex response has none.
pub const DEFAULT_FIRST_NAME: &str = "Unknown";

/// `LastName` used when the Apex response has none. `LastName` is required by Salesforce.
pub const DEFAULT_LAST_NAME: &str = "Unknown";

/// `Company` used when the Apex response has none. `Company` is required by Salesforce.
pub const DEFAULT_COMPANY: &str = "Unknown Company";

/// `LeadSource` stamped on every Lead built from an Apex response.
pub const APEX_LEAD_SOURCE: &str = "Web";

/// A Lead record as sent to `/sobjects/Lead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lead {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_source: Option<String>,
}

impl Lead {
    /// Creates a Lead with the three fields every Lead needs.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            company: company.into(),
            email: None,
            phone: None,
            title: None,
            lead_source: None,
        }
    }
}

/// Builds a Lead from the body returned by a custom Apex REST resource.
///
/// | Apex key    | Lead field   | Default                  |
/// |-------------|--------------|--------------------------|
/// | `firstName` | `FirstName`  | [`DEFAULT_FIRST_NAME`]   |
/// | `lastName`  | `LastName`   | [`DEFAULT_LAST_NAME`]    |
/// | `company`   | `Company`    | [`DEFAULT_COMPANY`]      |
/// | `email`     | `Email`      | omitted                  |
/// | `phone`     | `Phone`      | omitted                  |
/// | `title`     | `Title`      | omitted                  |
/// | (none)      | `LeadSource` | [`APEX_LEAD_SOURCE`]     |
///
/// Values that are missing, empty or not strings count as absent.
pub fn from_apex(response: &Value) -> Lead {
    let field = |key: &str| {
        response
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Lead {
        first_name: field("firstName").unwrap_or_else(|| DEFAULT_FIRST_NAME.to_string()),
        last_name: field("lastName").unwrap_or_else(|| DEFAULT_LAST_NAME.to_string()),
        company: field("company").unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
        email: field("email"),
        phone: field("phone"),
        title: field("title"),
        lead_source: Some(APEX_LEAD_SOURCE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_salesforce_field_names() {
        let lead = Lead::new("John", "Doe", "Doe Enterprises");
        assert_eq!(
            serde_json::to_value(&lead).unwrap(),
            json!({"FirstName": "John", "LastName": "Doe", "Company": "Doe Enterprises"})
        );
    }

    #[test]
    fn test_from_apex_full_response() {
        let lead = from_apex(&json!({
            "firstName": "Jane",
            "lastName": "Roe",
            "company": "Roe Inc",
            "email": "jane@roe.example",
            "phone": "555-0100",
            "title": "CTO"
        }));
        assert_eq!(lead.first_name, "Jane");
        assert_eq!(lead.last_name, "Roe");
        assert_eq!(lead.company, "Roe Inc");
        assert_eq!(lead.email.as_deref(), Some("jane@roe.example"));
        assert_eq!(lead.phone.as_deref(), Some("555-0100"));
        assert_eq!(lead.title.as_deref(), Some("CTO"));
        assert_eq!(lead.lead_source.as_deref(), Some(APEX_LEAD_SOURCE));
    }

    #[test]
    fn test_from_apex_defaults() {
        let lead = from_apex(&json!({"firstName": "", "lastName": 42, "email": null}));
        assert_eq!(lead.first_name, DEFAULT_FIRST_NAME);
        assert_eq!(lead.last_name, DEFAULT_LAST_NAME);
        assert_eq!(lead.company, DEFAULT_COMPANY);
        assert_eq!(lead.email, None);
        assert_eq!(lead.phone, None);
    }

    #[test]
    fn test_from_apex_non_object() {
        let lead = from_apex(&json!("ok"));
        assert_eq!(lead.company, DEFAULT_COMPANY);
        let value = serde_json::to_value(&lead).unwrap();
        assert!(value.get("Email").is_none());
        assert_eq!(value["LeadSource"], "Web");
    }
}
