use uuid::Uuid;

use super::{DatabaseHandler, Paging};
use crate::converters::{
    ElementProperties, foreign_key_from_properties, foreign_key_to_properties,
    primary_key_from_properties, primary_key_to_properties,
};
use crate::elements::{DatabaseColumnElement, ElementHeader, ForeignKeyElement};
use crate::error::OmagError;
use crate::instances::{
    Classification, EntityDetail, ExternalSource, NewRelationship, Relationship, type_names,
};
use crate::models::{
    DatabaseColumnProperties, DatabaseForeignKeyProperties, DatabasePrimaryKeyProperties,
    TemplateProperties,
};
use crate::validation::validate_user_id;

impl DatabaseHandler {
    async fn column_element(
        &self,
        entity: &EntityDetail,
    ) -> Result<DatabaseColumnElement, OmagError> {
        let foreign_keys = self
            .repository
            .get_relationships(entity.guid, Some(type_names::FOREIGN_KEY))
            .await?
            .into_iter()
            .filter(|r| r.end2_guid == entity.guid)
            .map(|r| ForeignKeyElement {
                relationship_guid: r.guid,
                primary_key_column_guid: r.end1_guid,
                properties: foreign_key_from_properties(&r.properties),
            })
            .collect();

        Ok(DatabaseColumnElement {
            header: ElementHeader::from(entity),
            properties: DatabaseColumnProperties::from_instance_properties(&entity.properties),
            primary_key: entity
                .classification(type_names::PRIMARY_KEY)
                .map(|c| primary_key_from_properties(&c.properties)),
            foreign_keys,
        })
    }

    async fn column_elements(
        &self,
        entities: &[EntityDetail],
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        let mut elements = Vec::with_capacity(entities.len());
        for entity in entities {
            elements.push(self.column_element(entity).await?);
        }
        Ok(elements)
    }

    async fn parent_table(&self, table_guid: Uuid) -> Result<EntityDetail, OmagError> {
        self.load(
            table_guid,
            "database_table_guid",
            &[type_names::DATABASE_TABLE],
        )
        .await
    }

    async fn load_column(&self, guid: Uuid, parameter: &str) -> Result<EntityDetail, OmagError> {
        self.load(guid, parameter, &[type_names::DATABASE_COLUMN])
            .await
    }

    /// The foreign key between two columns, if one exists.
    async fn foreign_key_between(
        &self,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
    ) -> Result<Option<Relationship>, OmagError> {
        Ok(self
            .repository
            .get_relationships(foreign_key_column_guid, Some(type_names::FOREIGN_KEY))
            .await?
            .into_iter()
            .find(|r| {
                r.end1_guid == primary_key_column_guid && r.end2_guid == foreign_key_column_guid
            }))
    }

    fn check_confidence(properties: &DatabaseForeignKeyProperties) -> Result<(), OmagError> {
        match properties.confidence {
            Some(c) if !(0..=100).contains(&c) => Err(OmagError::invalid_parameter(
                "confidence",
                format!("confidence {c} must be between 0 and 100"),
            )),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    /// Create a column in a table or view. Columns share the anchor of their table.
    pub async fn create_database_column(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        table_guid: Uuid,
        properties: &DatabaseColumnProperties,
    ) -> Result<Uuid, OmagError> {
        let table = self.parent_table(table_guid).await?;
        let entity = self
            .create_element(
                user_id,
                source,
                properties,
                type_names::DATABASE_COLUMN,
                Some(table.anchor_guid.unwrap_or(table.guid)),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::NESTED_SCHEMA_ATTRIBUTE,
            table.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn create_database_column_from_template(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        table_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        let table = self.parent_table(table_guid).await?;
        let entity = self
            .create_from_template::<DatabaseColumnProperties>(
                user_id,
                source,
                template_guid,
                template,
                type_names::DATABASE_COLUMN,
                Some(table.anchor_guid.unwrap_or(table.guid)),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::NESTED_SCHEMA_ATTRIBUTE,
            table.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn update_database_column(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        column_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseColumnProperties,
    ) -> Result<(), OmagError> {
        self.update_element(
            user_id,
            source,
            column_guid,
            "database_column_guid",
            type_names::DATABASE_COLUMN,
            is_merge_update,
            properties,
        )
        .await?;
        Ok(())
    }

    /// Remove a column and the foreign keys attached to it.
    pub async fn remove_database_column(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        column_guid: Uuid,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let column = self
            .load_column(column_guid, "database_column_guid")
            .await?;
        Self::check_owner(&column, "external_source_guid", source)?;
        self.repository.delete_entity(column_guid).await?;
        tracing::debug!(%column_guid, "Column removed");
        Ok(())
    }

    pub async fn find_database_columns(
        &self,
        user_id: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        let found = self
            .find_elements(
                user_id,
                search_string,
                &[type_names::DATABASE_COLUMN],
                paging,
            )
            .await?;
        self.column_elements(&found).await
    }

    pub async fn get_database_columns_by_name(
        &self,
        user_id: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        let found = self
            .elements_by_name(user_id, name, &[type_names::DATABASE_COLUMN], paging)
            .await?;
        self.column_elements(&found).await
    }

    /// Columns of a table or view, ordered by position. Unpositioned columns come last.
    pub async fn get_columns_for_database_table(
        &self,
        user_id: &str,
        table_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseColumnElement>, OmagError> {
        validate_user_id(user_id)?;
        let paging = self.check_paging(paging)?;
        self.parent_table(table_guid).await?;
        let mut columns = self
            .children(
                table_guid,
                type_names::NESTED_SCHEMA_ATTRIBUTE,
                &[type_names::DATABASE_COLUMN],
            )
            .await?;
        columns.sort_by_key(|c| {
            c.properties
                .get("position")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(i64::MAX)
        });
        self.column_elements(&paging.apply(columns)).await
    }

    pub async fn get_database_column_by_guid(
        &self,
        user_id: &str,
        column_guid: Uuid,
    ) -> Result<DatabaseColumnElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .load_column(column_guid, "database_column_guid")
            .await?;
        self.column_element(&entity).await
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    /// Classify the column as (part of) its table's primary key.
    pub async fn set_primary_key(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        column_guid: Uuid,
        properties: &DatabasePrimaryKeyProperties,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let mut column = self
            .load_column(column_guid, "database_column_guid")
            .await?;
        Self::check_owner(&column, "external_source_guid", source)?;
        column.set_classification(Classification {
            name: type_names::PRIMARY_KEY.to_string(),
            properties: primary_key_to_properties(properties),
        });
        self.repository.update_entity(user_id, &column).await?;
        Ok(())
    }

    pub async fn remove_primary_key(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        column_guid: Uuid,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let mut column = self
            .load_column(column_guid, "database_column_guid")
            .await?;
        Self::check_owner(&column, "external_source_guid", source)?;
        if column.remove_classification(type_names::PRIMARY_KEY) {
            self.repository.update_entity(user_id, &column).await?;
        }
        Ok(())
    }

    /// Link a foreign-key column to the primary-key column it refers to.
    pub async fn add_foreign_key(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
        properties: &DatabaseForeignKeyProperties,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        Self::check_confidence(properties)?;
        if primary_key_column_guid == foreign_key_column_guid {
            return Err(OmagError::invalid_parameter(
                "foreign_key_column_guid",
                "a column cannot be a foreign key to itself",
            ));
        }
        let primary = self
            .load_column(primary_key_column_guid, "primary_key_column_guid")
            .await?;
        let foreign = self
            .load_column(foreign_key_column_guid, "foreign_key_column_guid")
            .await?;
        if primary.classification(type_names::PRIMARY_KEY).is_none() {
            return Err(OmagError::invalid_parameter(
                "primary_key_column_guid",
                format!("column {primary_key_column_guid} is not part of a primary key"),
            ));
        }
        Self::check_owner(&foreign, "external_source_guid", source)?;
        if self
            .foreign_key_between(primary.guid, foreign.guid)
            .await?
            .is_some()
        {
            return Err(OmagError::invalid_parameter(
                "foreign_key_column_guid",
                "the columns are already linked by a foreign key",
            ));
        }

        self.repository
            .add_relationship(
                user_id,
                NewRelationship {
                    type_name: type_names::FOREIGN_KEY.to_string(),
                    end1_guid: primary.guid,
                    end2_guid: foreign.guid,
                    external_source: source.cloned(),
                    properties: foreign_key_to_properties(properties),
                },
            )
            .await?;
        Ok(())
    }

    pub async fn update_foreign_key(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
        properties: &DatabaseForeignKeyProperties,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        Self::check_confidence(properties)?;
        let foreign = self
            .load_column(foreign_key_column_guid, "foreign_key_column_guid")
            .await?;
        Self::check_owner(&foreign, "external_source_guid", source)?;
        let mut relationship = self
            .foreign_key_between(primary_key_column_guid, foreign_key_column_guid)
            .await?
            .ok_or_else(|| {
                OmagError::invalid_parameter(
                    "primary_key_column_guid",
                    "no foreign key links these columns",
                )
            })?;
        relationship.properties = foreign_key_to_properties(properties);
        self.repository
            .update_relationship(user_id, &relationship)
            .await?;
        Ok(())
    }

    pub async fn remove_foreign_key(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        primary_key_column_guid: Uuid,
        foreign_key_column_guid: Uuid,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let foreign = self
            .load_column(foreign_key_column_guid, "foreign_key_column_guid")
            .await?;
        Self::check_owner(&foreign, "external_source_guid", source)?;
        let relationship = self
            .foreign_key_between(primary_key_column_guid, foreign_key_column_guid)
            .await?
            .ok_or_else(|| {
                OmagError::invalid_parameter(
                    "primary_key_column_guid",
                    "no foreign key links these columns",
                )
            })?;
        self.repository
            .delete_relationship(relationship.guid)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{database, handler, source};
    use super::*;
    use crate::models::{DatabaseTableProperties, KeyPattern};

    struct Fixture {
        handler: DatabaseHandler,
        employee: Uuid,
        department: Uuid,
    }

    async fn fixture() -> Fixture {
        let handler = handler();
        let db = handler.create_database("u", None, &database("hr")).await.unwrap();
        let mut tables = Vec::new();
        for name in ["hr.employee", "hr.department"] {
            tables.push(
                handler
                    .create_database_table(
                        "u",
                        None,
                        db,
                        &DatabaseTableProperties {
                            qualified_name: name.into(),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap(),
            );
        }
        Fixture {
            handler,
            employee: tables[0],
            department: tables[1],
        }
    }

    fn column(qualified_name: &str, position: Option<i32>) -> DatabaseColumnProperties {
        DatabaseColumnProperties {
            qualified_name: qualified_name.to_string(),
            data_type: Some("INTEGER".into()),
            position,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_columns_ordered_by_position() {
        let f = fixture().await;
        for (name, position) in [
            ("hr.employee.b", Some(2)),
            ("hr.employee.x", None),
            ("hr.employee.a", Some(1)),
        ] {
            f.handler
                .create_database_column("u", None, f.employee, &column(name, position))
                .await
                .unwrap();
        }

        let columns = f
            .handler
            .get_columns_for_database_table("u", f.employee, Paging::default())
            .await
            .unwrap();
        let names: Vec<_> = columns
            .iter()
            .map(|c| c.properties.qualified_name.as_str())
            .collect();
        assert_eq!(names, vec!["hr.employee.a", "hr.employee.b", "hr.employee.x"]);
    }

    #[tokio::test]
    async fn test_primary_key_set_and_removed() {
        let f = fixture().await;
        let id = f
            .handler
            .create_database_column("u", None, f.employee, &column("hr.employee.id", Some(1)))
            .await
            .unwrap();

        f.handler
            .set_primary_key(
                "u",
                None,
                id,
                &DatabasePrimaryKeyProperties {
                    name: Some("pk_employee".into()),
                    key_pattern: KeyPattern::NaturalKey,
                },
            )
            .await
            .unwrap();
        let element = f.handler.get_database_column_by_guid("u", id).await.unwrap();
        let key = element.primary_key.unwrap();
        assert_eq!(key.name.as_deref(), Some("pk_employee"));
        assert_eq!(key.key_pattern, KeyPattern::NaturalKey);

        f.handler.remove_primary_key("u", None, id).await.unwrap();
        let element = f.handler.get_database_column_by_guid("u", id).await.unwrap();
        assert!(element.primary_key.is_none());
    }

    #[tokio::test]
    async fn test_foreign_key_lifecycle() {
        let f = fixture().await;
        let dept_id = f
            .handler
            .create_database_column("u", None, f.department, &column("hr.department.id", Some(1)))
            .await
            .unwrap();
        let emp_dept = f
            .handler
            .create_database_column("u", None, f.employee, &column("hr.employee.dept", Some(2)))
            .await
            .unwrap();
        let props = DatabaseForeignKeyProperties {
            name: Some("fk_dept".into()),
            confidence: Some(90),
            ..Default::default()
        };

        // Target column must carry a primary key
        let err = f
            .handler
            .add_foreign_key("u", None, dept_id, emp_dept, &props)
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("primary_key_column_guid"));

        f.handler
            .set_primary_key("u", None, dept_id, &DatabasePrimaryKeyProperties::default())
            .await
            .unwrap();
        f.handler
            .add_foreign_key("u", None, dept_id, emp_dept, &props)
            .await
            .unwrap();
        assert!(f
            .handler
            .add_foreign_key("u", None, dept_id, emp_dept, &props)
            .await
            .is_err());

        let element = f.handler.get_database_column_by_guid("u", emp_dept).await.unwrap();
        assert_eq!(element.foreign_keys.len(), 1);
        assert_eq!(element.foreign_keys[0].primary_key_column_guid, dept_id);
        assert_eq!(element.foreign_keys[0].properties.confidence, Some(90));

        f.handler
            .update_foreign_key(
                "u",
                None,
                dept_id,
                emp_dept,
                &DatabaseForeignKeyProperties {
                    confidence: Some(100),
                    ..props.clone()
                },
            )
            .await
            .unwrap();
        let element = f.handler.get_database_column_by_guid("u", emp_dept).await.unwrap();
        assert_eq!(element.foreign_keys[0].properties.confidence, Some(100));

        f.handler
            .remove_foreign_key("u", None, dept_id, emp_dept)
            .await
            .unwrap();
        let element = f.handler.get_database_column_by_guid("u", emp_dept).await.unwrap();
        assert!(element.foreign_keys.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_key_validation() {
        let f = fixture().await;
        let id = f
            .handler
            .create_database_column("u", None, f.employee, &column("hr.employee.id", Some(1)))
            .await
            .unwrap();

        let err = f
            .handler
            .add_foreign_key("u", None, id, id, &DatabaseForeignKeyProperties::default())
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("foreign_key_column_guid"));

        let err = f
            .handler
            .add_foreign_key(
                "u",
                None,
                id,
                Uuid::new_v4(),
                &DatabaseForeignKeyProperties {
                    confidence: Some(101),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("confidence"));
    }

    #[tokio::test]
    async fn test_removing_column_drops_its_foreign_keys() {
        let f = fixture().await;
        let daemon = source("daemon");
        let dept_id = f
            .handler
            .create_database_column(
                "u",
                Some(&daemon),
                f.department,
                &column("hr.department.id", Some(1)),
            )
            .await
            .unwrap();
        let emp_dept = f
            .handler
            .create_database_column(
                "u",
                Some(&daemon),
                f.employee,
                &column("hr.employee.dept", Some(1)),
            )
            .await
            .unwrap();
        f.handler
            .set_primary_key("u", Some(&daemon), dept_id, &DatabasePrimaryKeyProperties::default())
            .await
            .unwrap();
        f.handler
            .add_foreign_key(
                "u",
                Some(&daemon),
                dept_id,
                emp_dept,
                &DatabaseForeignKeyProperties::default(),
            )
            .await
            .unwrap();

        // Columns belong to the daemon
        assert!(f.handler.remove_database_column("u", None, dept_id).await.is_err());

        f.handler
            .remove_database_column("u", Some(&daemon), dept_id)
            .await
            .unwrap();
        let element = f.handler.get_database_column_by_guid("u", emp_dept).await.unwrap();
        assert!(element.foreign_keys.is_empty());
    }

    #[tokio::test]
    async fn test_find_columns_by_regex() {
        let f = fixture().await;
        for name in ["hr.employee.id", "hr.employee.name", "hr.department.id"] {
            let table = if name.starts_with("hr.employee") {
                f.employee
            } else {
                f.department
            };
            f.handler
                .create_database_column("u", None, table, &column(name, None))
                .await
                .unwrap();
        }
        let found = f
            .handler
            .find_database_columns("u", r"\.id$", Paging::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let by_name = f
            .handler
            .get_database_columns_by_name("u", "hr.employee.name", Paging::default())
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
    }
}
