//! Property beans exchanged with integration daemons.
//!
//! Every bean uses `#[serde(default)]` so that a missing qualified name surfaces as a
//! parameter error from the handler rather than a deserialization failure.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Free-form string properties attached to an element.
pub type StringMap = BTreeMap<String, String>;

/// Describes the software server capability an integration daemon registers as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseManagerProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// e.g. "PostgreSQL Server"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Governance zones the asset belongs to (None = service defaults).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_membership: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_import_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSchemaProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_membership: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseTableProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseViewProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
    /// The query that populates the view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseColumnProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Set for derived columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cardinality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cardinality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allows_duplicate_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significant_digits: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_properties: Option<StringMap>,
}

/// How the values of a primary key are managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPattern {
    #[default]
    LocalKey,
    RecycledKey,
    NaturalKey,
    MirrorKey,
    AggregateKey,
    CallersKey,
    StableKey,
    Other,
}

impl KeyPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPattern::LocalKey => "local_key",
            KeyPattern::RecycledKey => "recycled_key",
            KeyPattern::NaturalKey => "natural_key",
            KeyPattern::MirrorKey => "mirror_key",
            KeyPattern::AggregateKey => "aggregate_key",
            KeyPattern::CallersKey => "callers_key",
            KeyPattern::StableKey => "stable_key",
            KeyPattern::Other => "other",
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "local_key" => Ok(KeyPattern::LocalKey),
            "recycled_key" => Ok(KeyPattern::RecycledKey),
            "natural_key" => Ok(KeyPattern::NaturalKey),
            "mirror_key" => Ok(KeyPattern::MirrorKey),
            "aggregate_key" => Ok(KeyPattern::AggregateKey),
            "callers_key" => Ok(KeyPattern::CallersKey),
            "stable_key" => Ok(KeyPattern::StableKey),
            "other" => Ok(KeyPattern::Other),
            _ => Err(format!("Unknown key pattern: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePrimaryKeyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub key_pattern: KeyPattern,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseForeignKeyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Percentage confidence that the relationship is correct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Overrides applied when copying an element from a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateProperties {
    pub qualified_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_qualified_name_deserializes_empty() {
        let props: DatabaseProperties = serde_json::from_str(r#"{"display_name": "HR"}"#).unwrap();
        assert!(props.qualified_name.is_empty());
        assert_eq!(props.display_name.as_deref(), Some("HR"));
    }

    #[test]
    fn test_none_fields_are_omitted() {
        let props = DatabaseTableProperties {
            qualified_name: "hr.employee".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json, serde_json::json!({"qualified_name": "hr.employee"}));
    }

    #[test]
    fn test_key_pattern_parse() {
        assert_eq!("natural-key".parse::<KeyPattern>().unwrap(), KeyPattern::NaturalKey);
        assert_eq!("LOCAL_KEY".parse::<KeyPattern>().unwrap(), KeyPattern::LocalKey);
        assert!("surrogate".parse::<KeyPattern>().is_err());
        assert_eq!(KeyPattern::default().to_string(), "local_key");
    }
}
