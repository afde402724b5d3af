use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user record as returned by the remote store.
///
/// Two upstream schemas are tolerated: stores that expose the identifier as
/// `id` and stores that expose it as `_id`. Both keys are kept as received and
/// read through [`resolve_id`]. Fields this client does not know about are
/// carried in `extra` and serialized back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(
        default,
        deserialize_with = "deserialize_loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "deserialize_loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_loose_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_loose_text")]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_loose_text")]
    pub city: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    pub fn resolved_id(&self) -> Option<RecordId> {
        resolve_id(self)
    }
}

/// Normalized identifier of `record`: a non-empty `id`, otherwise a non-empty `_id`.
pub fn resolve_id(record: &UserRecord) -> Option<RecordId> {
    [record.id.as_deref(), record.legacy_id.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .map(RecordId::new)
}

// Identifiers show up as strings (document stores) or integers (relational ones).
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

// Stores that serialize unset fields as `null` still yield a row; scalars keep their text.
fn deserialize_loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Number(number)) => number.to_string(),
        Some(serde_json::Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Email,
    City,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::Email, DraftField::City];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::Email => "Email",
            DraftField::City => "City",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(DraftField::Name),
            "email" => Ok(DraftField::Email),
            "city" => Ok(DraftField::City),
            other => Err(format!("unknown field '{other}' (expected name, email or city)")),
        }
    }
}

/// In-progress input for a record that has not been created yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub city: String,
}

impl Draft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            city: city.into(),
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Email => &self.email,
            DraftField::City => &self.city,
        }
    }

    /// Fields that are empty once surrounding whitespace is ignored.
    pub fn blank_fields(&self) -> Vec<DraftField> {
        DraftField::ALL
            .into_iter()
            .filter(|field| self.field(*field).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.blank_fields().is_empty()
    }
}

pub fn update_field(draft: &Draft, field: DraftField, value: impl Into<String>) -> Draft {
    let mut next = draft.clone();
    let value = value.into();
    match field {
        DraftField::Name => next.name = value,
        DraftField::Email => next.email = value,
        DraftField::City => next.city = value,
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_id_prefers_id_over_legacy_key() {
        let record: UserRecord =
            serde_json::from_str(r#"{"id":"a1","_id":"b2","name":"A","email":"a@x.com","city":"X"}"#)
                .expect("record");
        assert_eq!(resolve_id(&record), Some(RecordId::new("a1")));
    }

    #[test]
    fn resolve_id_falls_back_to_legacy_key() {
        let record: UserRecord =
            serde_json::from_str(r#"{"_id":"65f0c0ffee","name":"A"}"#).expect("record");
        assert_eq!(resolve_id(&record), Some(RecordId::new("65f0c0ffee")));

        let empty_primary: UserRecord =
            serde_json::from_str(r#"{"id":"","_id":"b2"}"#).expect("record");
        assert_eq!(resolve_id(&empty_primary), Some(RecordId::new("b2")));
    }

    #[test]
    fn resolve_id_accepts_numeric_ids_and_missing_ids() {
        let numeric: UserRecord = serde_json::from_str(r#"{"id":42}"#).expect("record");
        assert_eq!(numeric.resolved_id(), Some(RecordId::new("42")));

        let anonymous: UserRecord = serde_json::from_str(r#"{"name":"A"}"#).expect("record");
        assert_eq!(anonymous.resolved_id(), None);
    }

    #[test]
    fn null_and_scalar_text_fields_are_tolerated() {
        let record: UserRecord =
            serde_json::from_str(r#"{"id":"1","name":null,"email":true,"city":42}"#)
                .expect("record");
        assert_eq!(record.name, "");
        assert_eq!(record.email, "true");
        assert_eq!(record.city, "42");
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = r#"{"_id":"b2","name":"A","email":"a@x.com","city":"X","createdAt":"2024-01-01"}"#;
        let record: UserRecord = serde_json::from_str(raw).expect("record");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["createdAt"], "2024-01-01");
        assert_eq!(value["_id"], "b2");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn update_field_changes_only_the_named_field() {
        let draft = Draft::new("Senthil", "", "Ayodhya");
        let next = update_field(&draft, DraftField::Email, "senthil@gmail.com");

        assert_eq!(next, Draft::new("Senthil", "senthil@gmail.com", "Ayodhya"));
        assert_eq!(draft.email, "");
    }

    #[test]
    fn blank_fields_ignore_whitespace_only_values() {
        let draft = Draft::new("  ", "a@x.com", "\t");
        assert_eq!(draft.blank_fields(), vec![DraftField::Name, DraftField::City]);
        assert!(!draft.is_complete());
        assert!(Draft::new("A", "a@x.com", "X").is_complete());
    }

    #[test]
    fn draft_field_parses_case_insensitively() {
        assert_eq!("EMAIL".parse::<DraftField>(), Ok(DraftField::Email));
        assert!("phone".parse::<DraftField>().is_err());
    }
}
