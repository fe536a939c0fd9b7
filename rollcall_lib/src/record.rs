//! Record types shared by the resolver, the loaders and the report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque person identifier. Sources use either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonId {
    Number(i64),
    Text(String),
}

impl PersonId {
    /// Read an identifier from a JSON value. `null` and other shapes give `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(PersonId::Number),
            serde_json::Value::String(s) => Some(PersonId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PersonId::Number(n) => serde_json::Value::from(*n),
            PersonId::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonId::Number(n) => write!(f, "{}", n),
            PersonId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PersonId {
    fn from(n: i64) -> Self {
        PersonId::Number(n)
    }
}

impl From<i32> for PersonId {
    fn from(n: i32) -> Self {
        PersonId::Number(i64::from(n))
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        PersonId::Text(s.to_string())
    }
}

/// A record from the canonical roster (the "old" identifier space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub person_id: Option<PersonId>,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, person_id: impl Into<PersonId>) -> Self {
        Self {
            name: name.into(),
            person_id: Some(person_id.into()),
        }
    }

    /// A record with no identifier; the resolver drops these.
    pub fn without_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            person_id: None,
        }
    }
}

/// A record from the statistics collection (the target identifier space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub name: String,
    #[serde(default)]
    pub person_id: Option<PersonId>,
}

impl StatEntry {
    pub fn new(name: impl Into<String>, person_id: impl Into<PersonId>) -> Self {
        Self {
            name: name.into(),
            person_id: Some(person_id.into()),
        }
    }

    pub fn without_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            person_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_id_from_json() {
        assert_eq!(PersonId::from_json(&json!(25288)), Some(PersonId::Number(25288)));
        assert_eq!(
            PersonId::from_json(&json!("uk.org.publicwhip/person/10001")),
            Some(PersonId::Text("uk.org.publicwhip/person/10001".to_string()))
        );
        assert_eq!(PersonId::from_json(&json!(null)), None);
        assert_eq!(PersonId::from_json(&json!(1.5)), None);
    }

    #[test]
    fn test_person_id_json_round_trip_keeps_kind() {
        assert_eq!(PersonId::Number(7).to_json(), json!(7));
        assert_eq!(PersonId::from("7").to_json(), json!("7"));
    }

    #[test]
    fn test_roster_entry_missing_id_deserializes() {
        let entry: RosterEntry = serde_json::from_value(json!({"name": "Jane Doe"})).unwrap();
        assert_eq!(entry, RosterEntry::without_id("Jane Doe"));

        let entry: RosterEntry =
            serde_json::from_value(json!({"name": "Jane Doe", "person_id": null})).unwrap();
        assert!(entry.person_id.is_none());
    }

    #[test]
    fn test_person_id_display() {
        assert_eq!(PersonId::Number(42).to_string(), "42");
        assert_eq!(PersonId::from("abc").to_string(), "abc");
    }
}
