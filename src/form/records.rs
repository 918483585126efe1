//! User records consumed by the submission workflow.
//!
//! The real record store is external; this module models it as an ordered,
//! finite supplier and ships a static implementation backed by the
//! configuration file.

use std::fmt;

/// The e-resource platform a user requests an access code for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Legimi,
    EmpikGo,
}

impl ResourceType {
    /// Canonical value the form's selector carries in its `data-value`
    /// attribute. Note the site abbreviates EmpikGo to "empik".
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::Legimi => "legimi",
            Self::EmpikGo => "empik",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_value())
    }
}

/// One user's form input. Immutable for the duration of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub library_card_number: String,
    pub email: String,
    pub resource_type: ResourceType,
}

/// An ordered, finite source of user records.
///
/// The batch consumes it exhaustively, once per invocation, in the order
/// returned; there is no resumption across invocations.
pub trait RecordSource: Send + Sync {
    fn records(&self) -> Vec<UserRecord>;
}

/// Static in-memory record list (the shipped configuration-backed source).
pub struct StaticRecords {
    records: Vec<UserRecord>,
}

impl StaticRecords {
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticRecords {
    fn records(&self) -> Vec<UserRecord> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_values_match_site_attributes() {
        assert_eq!(ResourceType::Legimi.form_value(), "legimi");
        assert_eq!(ResourceType::EmpikGo.form_value(), "empik");
    }

    #[test]
    fn test_record_deserializes_from_camel_case() {
        let record: UserRecord = serde_json::from_str(
            r#"{
                "name": "Anna",
                "libraryCardNumber": "213721",
                "email": "example@gmail.com",
                "resourceType": "empikgo"
            }"#,
        )
        .unwrap();

        assert_eq!(record.resource_type, ResourceType::EmpikGo);
        assert_eq!(record.library_card_number, "213721");
    }

    #[test]
    fn test_static_records_preserve_order() {
        let records = vec![
            UserRecord {
                name: "a".into(),
                library_card_number: "1".into(),
                email: "a@example.com".into(),
                resource_type: ResourceType::Legimi,
            },
            UserRecord {
                name: "b".into(),
                library_card_number: "2".into(),
                email: "b@example.com".into(),
                resource_type: ResourceType::EmpikGo,
            },
        ];

        let source = StaticRecords::new(records.clone());
        assert_eq!(source.records(), records);
    }
}
