use omag_core::OmagError;
use omag_core::instances::{
    Classification, ExternalSource, InstanceProperties, NewEntity, NewRelationship, type_names,
};
use omag_core::repository::{EntityQuery, MetadataCollection};
use omag_db::PgMetadataCollection;
use serde_json::json;
use uuid::Uuid;

use crate::common::setup_test_db;

fn properties(qualified_name: &str) -> InstanceProperties {
    let mut properties = InstanceProperties::new();
    properties.insert("qualifiedName".into(), json!(qualified_name));
    properties
}

fn entity(type_name: &str, qualified_name: &str) -> NewEntity {
    NewEntity {
        type_name: type_name.into(),
        external_source: None,
        anchor_guid: None,
        properties: properties(qualified_name),
        classifications: vec![],
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn entities_round_trip_and_filter() {
    let (database, _container) = setup_test_db().await;
    let repo = database.metadata_collection(Uuid::new_v4());

    let source = ExternalSource {
        guid: Uuid::new_v4(),
        name: "Coco.DBMS".into(),
    };
    let database = repo
        .add_entity(
            "erinoverview",
            NewEntity {
                external_source: Some(source.clone()),
                ..entity(type_names::DATABASE, "Coco.Clinical")
            },
        )
        .await
        .unwrap();
    let table = repo
        .add_entity(
            "erinoverview",
            NewEntity {
                anchor_guid: Some(database.guid),
                ..entity(type_names::DATABASE_TABLE, "Coco.Clinical.Patients")
            },
        )
        .await
        .unwrap();
    repo.add_entity(
        "erinoverview",
        NewEntity {
            anchor_guid: Some(database.guid),
            ..entity(type_names::DATABASE_VIEW, "Coco.Clinical.Recent")
        },
    )
    .await
    .unwrap();

    let fetched = repo.get_entity(database.guid).await.unwrap().unwrap();
    assert_eq!(fetched, database);

    let tables = repo
        .find_entities(&EntityQuery::of_types(vec![
            type_names::DATABASE_TABLE.into(),
            type_names::DATABASE_VIEW.into(),
        ]))
        .await
        .unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].guid, table.guid);

    let by_name = repo
        .find_entities(
            &EntityQuery::default().with_property("qualifiedName", json!("Coco.Clinical.Patients")),
        )
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let anchored = repo
        .find_entities(&EntityQuery::default().with_anchor(database.guid))
        .await
        .unwrap();
    assert_eq!(anchored.len(), 2);

    let owned = repo
        .find_entities(&EntityQuery::default().with_external_source(source.guid))
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].external_source.as_ref(), Some(&source));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn update_checks_version() {
    let (database, _container) = setup_test_db().await;
    let repo = database.metadata_collection(Uuid::new_v4());

    let mut column = repo
        .add_entity("u", entity(type_names::DATABASE_COLUMN, "Coco.Clinical.Patients.id"))
        .await
        .unwrap();
    column.set_classification(Classification {
        name: type_names::PRIMARY_KEY.into(),
        properties: InstanceProperties::new(),
    });

    let updated = repo.update_entity("peterprofile", &column).await.unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.updated_by.as_deref(), Some("peterprofile"));
    assert!(updated.classification(type_names::PRIMARY_KEY).is_some());

    let stale = repo.update_entity("u", &column).await.unwrap_err();
    assert!(matches!(stale, OmagError::PropertyServer(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn deleting_entity_removes_relationships() {
    let (database, _container) = setup_test_db().await;
    let repo = PgMetadataCollection::new(database.pool().clone(), Uuid::new_v4());

    let table = repo
        .add_entity("u", entity(type_names::DATABASE_TABLE, "t"))
        .await
        .unwrap();
    let column = repo
        .add_entity("u", entity(type_names::DATABASE_COLUMN, "t.c"))
        .await
        .unwrap();
    let link = repo
        .add_relationship(
            "u",
            NewRelationship {
                type_name: type_names::NESTED_SCHEMA_ATTRIBUTE.into(),
                end1_guid: table.guid,
                end2_guid: column.guid,
                external_source: None,
                properties: InstanceProperties::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        repo.get_relationships(table.guid, Some(type_names::NESTED_SCHEMA_ATTRIBUTE))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(repo
        .get_relationships(table.guid, Some(type_names::FOREIGN_KEY))
        .await
        .unwrap()
        .is_empty());

    repo.delete_entity(column.guid).await.unwrap();
    assert!(repo.get_relationship(link.guid).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_entity(column.guid).await,
        Err(OmagError::ElementNotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn collections_are_isolated() {
    let (database, _container) = setup_test_db().await;
    let first = database.metadata_collection(Uuid::new_v4());
    let second = database.metadata_collection(Uuid::new_v4());

    let stored = first
        .add_entity("u", entity(type_names::DATABASE, "Coco.Clinical"))
        .await
        .unwrap();
    assert!(second.get_entity(stored.guid).await.unwrap().is_none());
    assert!(second
        .find_entities(&EntityQuery::of_types(vec![type_names::DATABASE.into()]))
        .await
        .unwrap()
        .is_empty());
}
