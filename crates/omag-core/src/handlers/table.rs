use uuid::Uuid;

use super::{DatabaseHandler, Paging};
use crate::converters::to_element;
use crate::elements::{DatabaseTableElement, DatabaseViewElement};
use crate::error::OmagError;
use crate::instances::{EntityDetail, ExternalSource, type_names};
use crate::models::{DatabaseTableProperties, DatabaseViewProperties, TemplateProperties};
use crate::validation::validate_user_id;

/// Tables and views may hang off a database or one of its schemas.
const DATABASE_ASSET_TYPES: &[&str] = &[type_names::DATABASE, type_names::DATABASE_SCHEMA];

impl DatabaseHandler {
    async fn database_asset(&self, database_asset_guid: Uuid) -> Result<EntityDetail, OmagError> {
        self.load(
            database_asset_guid,
            "database_asset_guid",
            DATABASE_ASSET_TYPES,
        )
        .await
    }

    /// Remove a table or view together with its columns.
    async fn remove_table_like(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        guid: Uuid,
        parameter: &str,
        type_name: &str,
    ) -> Result<(), OmagError> {
        validate_user_id(user_id)?;
        let table = self.load(guid, parameter, &[type_name]).await?;
        Self::check_owner(&table, "external_source_guid", source)?;

        let columns = self
            .children(
                guid,
                type_names::NESTED_SCHEMA_ATTRIBUTE,
                &[type_names::DATABASE_COLUMN],
            )
            .await?;
        for column in &columns {
            self.repository.delete_entity(column.guid).await?;
        }
        self.repository.delete_entity(guid).await?;
        tracing::info!(%guid, columns = columns.len(), "Table removed");
        Ok(())
    }

    async fn tables_under(
        &self,
        user_id: &str,
        database_asset_guid: Uuid,
        type_name: &str,
        paging: Paging,
    ) -> Result<Vec<EntityDetail>, OmagError> {
        validate_user_id(user_id)?;
        let paging = self.check_paging(paging)?;
        self.database_asset(database_asset_guid).await?;
        let tables = self
            .children(
                database_asset_guid,
                type_names::ATTRIBUTE_FOR_SCHEMA,
                &[type_name],
            )
            .await?;
        Ok(paging.apply(tables))
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    pub async fn create_database_table(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_asset_guid: Uuid,
        properties: &DatabaseTableProperties,
    ) -> Result<Uuid, OmagError> {
        let parent = self.database_asset(database_asset_guid).await?;
        let entity = self
            .create_element(
                user_id,
                source,
                properties,
                type_names::DATABASE_TABLE,
                Some(parent.guid),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::ATTRIBUTE_FOR_SCHEMA,
            parent.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn create_database_table_from_template(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_asset_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        let parent = self.database_asset(database_asset_guid).await?;
        let entity = self
            .create_from_template::<DatabaseTableProperties>(
                user_id,
                source,
                template_guid,
                template,
                type_names::DATABASE_TABLE,
                Some(parent.guid),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::ATTRIBUTE_FOR_SCHEMA,
            parent.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn update_database_table(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        table_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseTableProperties,
    ) -> Result<(), OmagError> {
        self.update_element(
            user_id,
            source,
            table_guid,
            "database_table_guid",
            type_names::DATABASE_TABLE,
            is_merge_update,
            properties,
        )
        .await?;
        Ok(())
    }

    pub async fn remove_database_table(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        table_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.remove_table_like(
            user_id,
            source,
            table_guid,
            "database_table_guid",
            type_names::DATABASE_TABLE,
        )
        .await
    }

    pub async fn find_database_tables(
        &self,
        user_id: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        let found = self
            .find_elements(user_id, search_string, &[type_names::DATABASE_TABLE], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_database_tables_by_name(
        &self,
        user_id: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        let found = self
            .elements_by_name(user_id, name, &[type_names::DATABASE_TABLE], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_tables_for_database_asset(
        &self,
        user_id: &str,
        database_asset_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseTableElement>, OmagError> {
        let tables = self
            .tables_under(
                user_id,
                database_asset_guid,
                type_names::DATABASE_TABLE,
                paging,
            )
            .await?;
        Ok(tables.iter().map(to_element).collect())
    }

    pub async fn get_database_table_by_guid(
        &self,
        user_id: &str,
        table_guid: Uuid,
    ) -> Result<DatabaseTableElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .load(
                table_guid,
                "database_table_guid",
                &[type_names::DATABASE_TABLE],
            )
            .await?;
        Ok(to_element(&entity))
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub async fn create_database_view(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_asset_guid: Uuid,
        properties: &DatabaseViewProperties,
    ) -> Result<Uuid, OmagError> {
        let parent = self.database_asset(database_asset_guid).await?;
        let entity = self
            .create_element(
                user_id,
                source,
                properties,
                type_names::DATABASE_TABLE,
                Some(parent.guid),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::ATTRIBUTE_FOR_SCHEMA,
            parent.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn create_database_view_from_template(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        database_asset_guid: Uuid,
        template_guid: Uuid,
        template: &TemplateProperties,
    ) -> Result<Uuid, OmagError> {
        let parent = self.database_asset(database_asset_guid).await?;
        let entity = self
            .create_from_template::<DatabaseViewProperties>(
                user_id,
                source,
                template_guid,
                template,
                type_names::DATABASE_TABLE,
                Some(parent.guid),
            )
            .await?;
        self.link(
            user_id,
            source,
            type_names::ATTRIBUTE_FOR_SCHEMA,
            parent.guid,
            entity.guid,
        )
        .await?;
        Ok(entity.guid)
    }

    pub async fn update_database_view(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        view_guid: Uuid,
        is_merge_update: bool,
        properties: &DatabaseViewProperties,
    ) -> Result<(), OmagError> {
        self.update_element(
            user_id,
            source,
            view_guid,
            "database_view_guid",
            type_names::DATABASE_TABLE,
            is_merge_update,
            properties,
        )
        .await?;
        Ok(())
    }

    pub async fn remove_database_view(
        &self,
        user_id: &str,
        source: Option<&ExternalSource>,
        view_guid: Uuid,
    ) -> Result<(), OmagError> {
        self.remove_table_like(
            user_id,
            source,
            view_guid,
            "database_view_guid",
            type_names::DATABASE_VIEW,
        )
        .await
    }

    pub async fn find_database_views(
        &self,
        user_id: &str,
        search_string: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        let found = self
            .find_elements(user_id, search_string, &[type_names::DATABASE_VIEW], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_database_views_by_name(
        &self,
        user_id: &str,
        name: &str,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        let found = self
            .elements_by_name(user_id, name, &[type_names::DATABASE_VIEW], paging)
            .await?;
        Ok(found.iter().map(to_element).collect())
    }

    pub async fn get_views_for_database_asset(
        &self,
        user_id: &str,
        database_asset_guid: Uuid,
        paging: Paging,
    ) -> Result<Vec<DatabaseViewElement>, OmagError> {
        let views = self
            .tables_under(
                user_id,
                database_asset_guid,
                type_names::DATABASE_VIEW,
                paging,
            )
            .await?;
        Ok(views.iter().map(to_element).collect())
    }

    pub async fn get_database_view_by_guid(
        &self,
        user_id: &str,
        view_guid: Uuid,
    ) -> Result<DatabaseViewElement, OmagError> {
        validate_user_id(user_id)?;
        let entity = self
            .load(view_guid, "database_view_guid", &[type_names::DATABASE_VIEW])
            .await?;
        Ok(to_element(&entity))
    }
}
