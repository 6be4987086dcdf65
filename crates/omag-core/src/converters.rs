//! Copies property beans to and from repository instance properties.

use serde_json::Value;

use crate::elements::{ElementHeader, MetadataElement};
use crate::instances::{EntityDetail, InstanceProperties, type_names};
use crate::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabaseManagerProperties,
    DatabasePrimaryKeyProperties, DatabaseProperties, DatabaseSchemaProperties,
    DatabaseTableProperties, DatabaseViewProperties, StringMap, TemplateProperties,
};

pub const QUALIFIED_NAME: &str = "qualifiedName";
pub const NAME: &str = "name";
pub const DISPLAY_NAME: &str = "displayName";
pub const DESCRIPTION: &str = "description";
pub const ZONE_MEMBERSHIP: &str = "zoneMembership";

/// A bean stored as the properties of one entity type.
pub trait ElementProperties: Sized {
    /// Type the bean's entity is created as.
    const TYPE_NAME: &'static str;

    fn qualified_name(&self) -> &str;

    fn to_instance_properties(&self) -> InstanceProperties;

    fn from_instance_properties(properties: &InstanceProperties) -> Self;

    /// Property holding the human-readable name.
    fn display_name_property() -> &'static str {
        NAME
    }
}

pub fn to_element<P: ElementProperties>(entity: &EntityDetail) -> MetadataElement<P> {
    MetadataElement {
        header: ElementHeader::from(entity),
        properties: P::from_instance_properties(&entity.properties),
    }
}

/// Overlay `update` onto `existing` (merge) or swap it in (replace).
pub fn merge_properties(
    existing: &InstanceProperties,
    update: InstanceProperties,
    is_merge_update: bool,
) -> InstanceProperties {
    if !is_merge_update {
        return update;
    }
    let mut merged = existing.clone();
    merged.extend(update);
    merged
}

/// Copy a template's properties, replacing its identity with `template`.
pub fn apply_template<P: ElementProperties>(
    source: &InstanceProperties,
    template: &TemplateProperties,
) -> InstanceProperties {
    let mut properties = source.clone();
    properties.insert(QUALIFIED_NAME.into(), Value::from(template.qualified_name.clone()));
    let display_name = P::display_name_property();
    match &template.display_name {
        Some(name) => {
            properties.insert(display_name.into(), Value::from(name.clone()));
        }
        None => {
            properties.remove(display_name);
        }
    }
    match &template.description {
        Some(description) => {
            properties.insert(DESCRIPTION.into(), Value::from(description.clone()));
        }
        None => {
            properties.remove(DESCRIPTION);
        }
    }
    properties
}

// ---------------------------------------------------------------------------
// Property helpers
// ---------------------------------------------------------------------------

fn put_str(properties: &mut InstanceProperties, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        properties.insert(key.into(), Value::from(v.clone()));
    }
}

fn put_bool(properties: &mut InstanceProperties, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        properties.insert(key.into(), Value::from(v));
    }
}

fn put_int(properties: &mut InstanceProperties, key: &str, value: Option<i32>) {
    if let Some(v) = value {
        properties.insert(key.into(), Value::from(v));
    }
}

fn put_list(properties: &mut InstanceProperties, key: &str, values: &[String]) {
    if !values.is_empty() {
        properties.insert(key.into(), Value::from(values.to_vec()));
    }
}

fn put_opt_list(properties: &mut InstanceProperties, key: &str, values: &Option<Vec<String>>) {
    if let Some(v) = values {
        properties.insert(key.into(), Value::from(v.clone()));
    }
}

fn put_map(properties: &mut InstanceProperties, key: &str, value: &Option<StringMap>) {
    if let Some(map) = value {
        let object: serde_json::Map<String, Value> = map
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect();
        properties.insert(key.into(), Value::Object(object));
    }
}

fn get_str(properties: &InstanceProperties, key: &str) -> Option<String> {
    properties.get(key).and_then(Value::as_str).map(str::to_string)
}

fn get_bool(properties: &InstanceProperties, key: &str) -> Option<bool> {
    properties.get(key).and_then(Value::as_bool)
}

fn get_int(properties: &InstanceProperties, key: &str) -> Option<i32> {
    properties
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

fn get_opt_list(properties: &InstanceProperties, key: &str) -> Option<Vec<String>> {
    properties.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

fn get_list(properties: &InstanceProperties, key: &str) -> Vec<String> {
    get_opt_list(properties, key).unwrap_or_default()
}

fn get_map(properties: &InstanceProperties, key: &str) -> Option<StringMap> {
    properties.get(key).and_then(Value::as_object).map(|object| {
        object
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    })
}

fn base_properties(qualified_name: &str) -> InstanceProperties {
    let mut properties = InstanceProperties::new();
    properties.insert(QUALIFIED_NAME.into(), Value::from(qualified_name));
    properties
}

/// Every string value held by an entity, used for search-string matching.
pub fn searchable_values(properties: &InstanceProperties) -> Vec<&str> {
    let mut values = Vec::new();
    for value in properties.values() {
        match value {
            Value::String(s) => values.push(s.as_str()),
            Value::Array(items) => values.extend(items.iter().filter_map(Value::as_str)),
            _ => {}
        }
    }
    values
}

// ---------------------------------------------------------------------------
// Entity beans
// ---------------------------------------------------------------------------

impl ElementProperties for DatabaseManagerProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE_MANAGER;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_str(&mut p, "deployedImplementationType", &self.type_description);
        put_str(&mut p, "capabilityVersion", &self.version);
        put_str(&mut p, "patchLevel", &self.patch_level);
        put_str(&mut p, "source", &self.source);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, NAME),
            description: get_str(p, DESCRIPTION),
            type_description: get_str(p, "deployedImplementationType"),
            version: get_str(p, "capabilityVersion"),
            patch_level: get_str(p, "patchLevel"),
            source: get_str(p, "source"),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

impl ElementProperties for DatabaseProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_str(&mut p, "owner", &self.owner);
        put_opt_list(&mut p, ZONE_MEMBERSHIP, &self.zone_membership);
        put_str(&mut p, "deployedImplementationType", &self.database_type);
        put_str(&mut p, "databaseVersion", &self.database_version);
        put_str(&mut p, "instance", &self.database_instance);
        put_str(&mut p, "importedFrom", &self.database_import_source);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, NAME),
            description: get_str(p, DESCRIPTION),
            owner: get_str(p, "owner"),
            zone_membership: get_opt_list(p, ZONE_MEMBERSHIP),
            database_type: get_str(p, "deployedImplementationType"),
            database_version: get_str(p, "databaseVersion"),
            database_instance: get_str(p, "instance"),
            database_import_source: get_str(p, "importedFrom"),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

impl ElementProperties for DatabaseSchemaProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE_SCHEMA;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_str(&mut p, "owner", &self.owner);
        put_opt_list(&mut p, ZONE_MEMBERSHIP, &self.zone_membership);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, NAME),
            description: get_str(p, DESCRIPTION),
            owner: get_str(p, "owner"),
            zone_membership: get_opt_list(p, ZONE_MEMBERSHIP),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

impl ElementProperties for DatabaseTableProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE_TABLE;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn display_name_property() -> &'static str {
        DISPLAY_NAME
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, DISPLAY_NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_list(&mut p, "aliases", &self.aliases);
        put_bool(&mut p, "isDeprecated", self.is_deprecated);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, DISPLAY_NAME),
            description: get_str(p, DESCRIPTION),
            aliases: get_list(p, "aliases"),
            is_deprecated: get_bool(p, "isDeprecated"),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

impl ElementProperties for DatabaseViewProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE_VIEW;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn display_name_property() -> &'static str {
        DISPLAY_NAME
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, DISPLAY_NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_list(&mut p, "aliases", &self.aliases);
        put_bool(&mut p, "isDeprecated", self.is_deprecated);
        put_str(&mut p, "expression", &self.expression);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, DISPLAY_NAME),
            description: get_str(p, DESCRIPTION),
            aliases: get_list(p, "aliases"),
            is_deprecated: get_bool(p, "isDeprecated"),
            expression: get_str(p, "expression"),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

impl ElementProperties for DatabaseColumnProperties {
    const TYPE_NAME: &'static str = type_names::DATABASE_COLUMN;

    fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    fn display_name_property() -> &'static str {
        DISPLAY_NAME
    }

    fn to_instance_properties(&self) -> InstanceProperties {
        let mut p = base_properties(&self.qualified_name);
        put_str(&mut p, DISPLAY_NAME, &self.display_name);
        put_str(&mut p, DESCRIPTION, &self.description);
        put_list(&mut p, "aliases", &self.aliases);
        put_bool(&mut p, "isDeprecated", self.is_deprecated);
        put_str(&mut p, "dataType", &self.data_type);
        put_str(&mut p, "defaultValue", &self.default_value);
        put_str(&mut p, "formula", &self.formula);
        put_int(&mut p, "position", self.position);
        put_int(&mut p, "minCardinality", self.min_cardinality);
        put_int(&mut p, "maxCardinality", self.max_cardinality);
        put_bool(&mut p, "allowsDuplicateValues", self.allows_duplicate_values);
        put_bool(&mut p, "orderedValues", self.ordered_values);
        put_bool(&mut p, "isNullable", self.is_nullable);
        put_int(&mut p, "minimumLength", self.min_length);
        put_int(&mut p, "length", self.length);
        put_int(&mut p, "precision", self.precision);
        put_int(&mut p, "significantDigits", self.significant_digits);
        put_str(&mut p, "nativeClass", &self.native_class);
        put_map(&mut p, "additionalProperties", &self.additional_properties);
        put_map(&mut p, "vendorProperties", &self.vendor_properties);
        p
    }

    fn from_instance_properties(p: &InstanceProperties) -> Self {
        Self {
            qualified_name: get_str(p, QUALIFIED_NAME).unwrap_or_default(),
            display_name: get_str(p, DISPLAY_NAME),
            description: get_str(p, DESCRIPTION),
            aliases: get_list(p, "aliases"),
            is_deprecated: get_bool(p, "isDeprecated"),
            data_type: get_str(p, "dataType"),
            default_value: get_str(p, "defaultValue"),
            formula: get_str(p, "formula"),
            position: get_int(p, "position"),
            min_cardinality: get_int(p, "minCardinality"),
            max_cardinality: get_int(p, "maxCardinality"),
            allows_duplicate_values: get_bool(p, "allowsDuplicateValues"),
            ordered_values: get_bool(p, "orderedValues"),
            is_nullable: get_bool(p, "isNullable"),
            min_length: get_int(p, "minimumLength"),
            length: get_int(p, "length"),
            precision: get_int(p, "precision"),
            significant_digits: get_int(p, "significantDigits"),
            native_class: get_str(p, "nativeClass"),
            additional_properties: get_map(p, "additionalProperties"),
            vendor_properties: get_map(p, "vendorProperties"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification and relationship beans
// ---------------------------------------------------------------------------

pub fn primary_key_to_properties(key: &DatabasePrimaryKeyProperties) -> InstanceProperties {
    let mut p = InstanceProperties::new();
    put_str(&mut p, NAME, &key.name);
    p.insert("keyPattern".into(), Value::from(key.key_pattern.as_str()));
    p
}

pub fn primary_key_from_properties(p: &InstanceProperties) -> DatabasePrimaryKeyProperties {
    DatabasePrimaryKeyProperties {
        name: get_str(p, NAME),
        key_pattern: get_str(p, "keyPattern")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
    }
}

pub fn foreign_key_to_properties(key: &DatabaseForeignKeyProperties) -> InstanceProperties {
    let mut p = InstanceProperties::new();
    put_str(&mut p, NAME, &key.name);
    put_str(&mut p, DESCRIPTION, &key.description);
    put_int(&mut p, "confidence", key.confidence);
    put_str(&mut p, "steward", &key.steward);
    put_str(&mut p, "source", &key.source);
    p
}

pub fn foreign_key_from_properties(p: &InstanceProperties) -> DatabaseForeignKeyProperties {
    DatabaseForeignKeyProperties {
        name: get_str(p, NAME),
        description: get_str(p, DESCRIPTION),
        confidence: get_int(p, "confidence"),
        steward: get_str(p, "steward"),
        source: get_str(p, "source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyPattern;

    fn full_column() -> DatabaseColumnProperties {
        DatabaseColumnProperties {
            qualified_name: "hr.public.employee.id".into(),
            display_name: Some("id".into()),
            description: Some("Employee number".into()),
            aliases: vec!["emp_no".into()],
            is_deprecated: Some(false),
            data_type: Some("INTEGER".into()),
            default_value: Some("0".into()),
            formula: None,
            position: Some(1),
            min_cardinality: Some(1),
            max_cardinality: Some(1),
            allows_duplicate_values: Some(false),
            ordered_values: Some(true),
            is_nullable: Some(false),
            min_length: None,
            length: Some(4),
            precision: Some(32),
            significant_digits: None,
            native_class: Some("java.lang.Integer".into()),
            additional_properties: Some(StringMap::from([("pii".into(), "no".into())])),
            vendor_properties: None,
        }
    }

    #[test]
    fn test_column_uses_open_metadata_property_names() {
        let props = full_column().to_instance_properties();
        assert_eq!(props["qualifiedName"], "hr.public.employee.id");
        assert_eq!(props["displayName"], "id");
        assert_eq!(props["dataType"], "INTEGER");
        assert_eq!(props["position"], 1);
        assert_eq!(props["isNullable"], false);
        assert_eq!(props["additionalProperties"]["pii"], "no");
        assert!(!props.contains_key("formula"));
    }

    #[test]
    fn test_column_properties_copied_back_verbatim() {
        let column = full_column();
        let copied = DatabaseColumnProperties::from_instance_properties(
            &column.to_instance_properties(),
        );
        assert_eq!(copied, column);
    }

    #[test]
    fn test_database_maps_type_to_deployed_implementation_type() {
        let db = DatabaseProperties {
            qualified_name: "hr".into(),
            database_type: Some("PostgreSQL".into()),
            zone_membership: Some(vec!["quarantine".into()]),
            ..Default::default()
        };
        let props = db.to_instance_properties();
        assert_eq!(props["deployedImplementationType"], "PostgreSQL");
        assert_eq!(props["zoneMembership"], serde_json::json!(["quarantine"]));
        assert_eq!(DatabaseProperties::from_instance_properties(&props), db);
    }

    #[test]
    fn test_merge_update_keeps_unspecified_properties() {
        let existing = DatabaseProperties {
            qualified_name: "hr".into(),
            description: Some("old".into()),
            owner: Some("faith".into()),
            ..Default::default()
        }
        .to_instance_properties();
        let update = DatabaseProperties {
            qualified_name: "hr".into(),
            description: Some("new".into()),
            ..Default::default()
        }
        .to_instance_properties();

        let merged = merge_properties(&existing, update.clone(), true);
        assert_eq!(merged["description"], "new");
        assert_eq!(merged["owner"], "faith");

        let replaced = merge_properties(&existing, update, false);
        assert_eq!(replaced["description"], "new");
        assert!(!replaced.contains_key("owner"));
    }

    #[test]
    fn test_apply_template_overrides_identity() {
        let source = DatabaseTableProperties {
            qualified_name: "template.table".into(),
            display_name: Some("template".into()),
            description: Some("template description".into()),
            aliases: vec!["t".into()],
            ..Default::default()
        }
        .to_instance_properties();
        let template = TemplateProperties {
            qualified_name: "hr.public.new_table".into(),
            display_name: Some("new_table".into()),
            description: None,
        };

        let copied = DatabaseTableProperties::from_instance_properties(&apply_template::<
            DatabaseTableProperties,
        >(&source, &template));
        assert_eq!(copied.qualified_name, "hr.public.new_table");
        assert_eq!(copied.display_name.as_deref(), Some("new_table"));
        assert_eq!(copied.description, None);
        assert_eq!(copied.aliases, vec!["t".to_string()]);
    }

    #[test]
    fn test_primary_key_defaults_pattern() {
        let key = primary_key_from_properties(&InstanceProperties::new());
        assert_eq!(key.key_pattern, KeyPattern::LocalKey);

        let key = DatabasePrimaryKeyProperties {
            name: Some("pk_employee".into()),
            key_pattern: KeyPattern::NaturalKey,
        };
        assert_eq!(
            primary_key_from_properties(&primary_key_to_properties(&key)),
            key
        );
    }

    #[test]
    fn test_searchable_values_include_lists() {
        let props = DatabaseTableProperties {
            qualified_name: "hr.employee".into(),
            aliases: vec!["staff".into()],
            is_deprecated: Some(true),
            ..Default::default()
        }
        .to_instance_properties();
        let mut values = searchable_values(&props);
        values.sort();
        assert_eq!(values, vec!["hr.employee", "staff"]);
    }
}
