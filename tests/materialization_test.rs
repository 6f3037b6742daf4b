//! End-to-end materialization: entities, owned references, headers and
//! relationships read back from a populated graph

use metagraph::graph::{GraphStore, InstanceWriter, VertexId};
use metagraph::model::{EntityStatus, ExtendedInfo, ObjectId, PropagateTags, Scalar, TypedValue};
use metagraph::typesys::{
    AttributeDef, AttributeType, Cardinality, ClassificationTypeDef, EntityTypeDef, EnumTypeDef, PrimitiveKind,
    RelationshipEndDef, RelationshipTypeDef, StructTypeDef, TypeRegistry,
};
use metagraph::{EntityRetriever, MaterializationConfig, RepositoryError};

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register_entity(
        EntityTypeDef::new("Referenceable")
            .with_attribute(AttributeDef::primitive("qualifiedName", PrimitiveKind::String).unique()),
    );
    types.register_entity(
        EntityTypeDef::new("Asset")
            .with_super_type("Referenceable")
            .with_attribute(AttributeDef::primitive("name", PrimitiveKind::String))
            .with_attribute(AttributeDef::primitive("description", PrimitiveKind::String)),
    );
    types.register_entity(EntityTypeDef::new("Database").with_super_type("Asset"));
    types.register_entity(
        EntityTypeDef::new("Column")
            .with_super_type("Asset")
            .with_attribute(AttributeDef::primitive("position", PrimitiveKind::Int)),
    );
    types.register_enum(EnumTypeDef {
        name: "Tier".to_string(),
        elements: vec!["GOLD".to_string(), "SILVER".to_string()],
    });
    types.register_struct(
        StructTypeDef::new("StorageDesc")
            .with_attribute(AttributeDef::primitive("location", PrimitiveKind::String))
            .with_attribute(AttributeDef::primitive("compressed", PrimitiveKind::Boolean)),
    );
    types.register_entity(
        EntityTypeDef::new("Table")
            .with_super_type("Asset")
            .with_attribute(AttributeDef::primitive("rows", PrimitiveKind::Long))
            .with_attribute(AttributeDef::new(
                "tags",
                AttributeType::array(AttributeType::Primitive(PrimitiveKind::String)),
            ))
            .with_attribute(AttributeDef::new(
                "params",
                AttributeType::map(AttributeType::Primitive(PrimitiveKind::String)),
            ))
            .with_attribute(AttributeDef::new("tier", AttributeType::Enum("Tier".to_string())))
            .with_attribute(AttributeDef::new("storage", AttributeType::Struct("StorageDesc".to_string())))
            .with_attribute(AttributeDef::new("db", AttributeType::ObjectId("Database".to_string())))
            .with_attribute(
                AttributeDef::new(
                    "columns",
                    AttributeType::array(AttributeType::ObjectId("Column".to_string())),
                )
                .owned(),
            ),
    );
    types.register_entity(
        EntityTypeDef::new("Node")
            .with_super_type("Referenceable")
            .with_attribute(AttributeDef::new("peer", AttributeType::ObjectId("Node".to_string())).owned()),
    );
    types.register_relationship(RelationshipTypeDef::new(
        "TableDb",
        RelationshipEndDef::new("Table", "database", Cardinality::Single),
        RelationshipEndDef::new("Database", "tables", Cardinality::Set),
    ));
    types.register_classification(ClassificationTypeDef::new("PII"));
    types
}

struct Fixture {
    store: GraphStore,
    table: VertexId,
    columns: Vec<VertexId>,
}

fn populated() -> Fixture {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);

    let db = writer.create_entity_with_guid("Database", "db-1").unwrap();
    writer.set_attribute(db, "Referenceable.qualifiedName", "sales@prod").unwrap();
    writer.set_attribute(db, "Asset.name", "sales").unwrap();

    let table = writer.create_entity_with_guid("Table", "tbl-1").unwrap();
    writer.set_attribute(table, "Referenceable.qualifiedName", "sales.orders@prod").unwrap();
    writer.set_attribute(table, "Asset.name", "orders").unwrap();
    writer.set_attribute(table, "Table.rows", 42i64).unwrap();
    writer.set_attribute(table, "Table.tier", "GOLD").unwrap();
    writer
        .set_primitive_array(table, "Table.tags", vec!["finance".into(), "daily".into()])
        .unwrap();
    writer
        .set_primitive_map(table, "Table.params", vec![("owner", "ops".into()), ("format", "orc".into())])
        .unwrap();
    writer
        .set_struct(
            table,
            "Table.storage",
            "StorageDesc",
            vec![
                ("StorageDesc.location", "s3://sales/orders".into()),
                ("StorageDesc.compressed", true.into()),
            ],
        )
        .unwrap();
    writer.set_reference(table, "Table.db", db).unwrap();

    let mut columns = Vec::new();
    for (i, name) in ["id", "amount"].iter().enumerate() {
        let column = writer.create_entity_with_guid("Column", &format!("col-{}", name)).unwrap();
        writer
            .set_attribute(column, "Referenceable.qualifiedName", format!("sales.orders.{}@prod", name))
            .unwrap();
        writer.set_attribute(column, "Asset.name", *name).unwrap();
        writer.set_attribute(column, "Column.position", i as i64).unwrap();
        columns.push(column);
    }
    writer.set_reference_array(table, "Table.columns", &columns).unwrap();

    let rel = writer.add_relationship("TableDb", table, db, PropagateTags::None).unwrap();
    writer.set_relationship_attribute(rel, "TableDb.note", "primary").unwrap();
    writer.add_classification(table, "PII", true).unwrap();

    Fixture { store, table, columns }
}

#[test]
fn test_entity_attributes() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let entity = retriever.to_entity_by_guid("tbl-1").unwrap();
    assert_eq!(entity.type_name, "Table");
    assert_eq!(entity.status, EntityStatus::Active);
    assert_eq!(entity.version, 1);
    assert_eq!(entity.created_by.as_deref(), Some("admin"));

    let attributes = &entity.attributes;
    assert_eq!(attributes.get("name").and_then(TypedValue::as_str), Some("orders"));
    assert_eq!(attributes.get("rows").and_then(TypedValue::as_scalar), Some(&Scalar::Long(42)));
    assert_eq!(attributes.get("tier").and_then(TypedValue::as_str), Some("GOLD"));
    // never written
    assert!(!attributes.contains_key("description"));

    let tags: Vec<_> = attributes["tags"].as_list().unwrap().iter().filter_map(TypedValue::as_str).collect();
    assert_eq!(tags, vec!["finance", "daily"]);

    let params = attributes["params"].as_map().unwrap();
    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["owner", "format"]);
    assert_eq!(params["format"].as_str(), Some("orc"));

    let storage = attributes["storage"].as_struct().unwrap();
    assert_eq!(storage.type_name, "StorageDesc");
    assert_eq!(storage.attributes["compressed"].as_scalar(), Some(&Scalar::Boolean(true)));

    let db = attributes["db"].as_object_id().unwrap();
    assert_eq!(db.guid.as_deref(), Some("db-1"));
    assert_eq!(db.type_name, "Database");
    assert!(db.unique_attributes.is_empty());

    // without an accumulator owned references stay bare
    let columns = attributes["columns"].as_list().unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[1].as_object_id().unwrap().guid.as_deref(), Some("col-amount"));

    assert_eq!(entity.classifications.len(), 1);
    assert_eq!(entity.classifications[0].type_name, "PII");
    assert_eq!(entity.classifications[0].entity_guid.as_deref(), Some("tbl-1"));
}

#[test]
fn test_materialization_is_idempotent() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let first = retriever.to_entity_with_ext_info_by_guid("tbl-1").unwrap();
    let second = retriever.to_entity_with_ext_info_by_guid("tbl-1").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_owned_references_land_in_referred_entities() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let result = retriever.to_entity_with_ext_info_by_guid("tbl-1").unwrap();
    assert_eq!(result.referred_entities.len(), 2);
    assert!(result.referred_entity("col-id").is_some());
    assert!(result.referred_entity("db-1").is_none());

    // owned references carry unique attributes
    let columns = result.entity.attributes["columns"].as_list().unwrap();
    let first = columns[0].as_object_id().unwrap();
    assert_eq!(
        first.unique_attributes.get("qualifiedName").and_then(TypedValue::as_str),
        Some("sales.orders.id@prod")
    );
}

#[test]
fn test_owned_cycle_terminates() {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    let a = writer.create_entity_with_guid("Node", "a").unwrap();
    let b = writer.create_entity_with_guid("Node", "b").unwrap();
    writer.set_reference(a, "Node.peer", b).unwrap();
    writer.set_reference(b, "Node.peer", a).unwrap();

    let types = types();
    let retriever = EntityRetriever::new(&store, &types);

    let mut ext = ExtendedInfo::new();
    let vertex = retriever.entity_vertex("a").unwrap();
    let entity = retriever.to_entity_with_accumulator(vertex, &mut ext).unwrap();
    assert_eq!(entity.guid, "a");
    assert_eq!(ext.len(), 2);
    assert!(ext.get("a").is_some());
    assert!(ext.get("b").is_some());

    let b_entity = ext.get("b").unwrap();
    assert_eq!(b_entity.attributes["peer"].as_object_id().unwrap().guid.as_deref(), Some("a"));

    let compacted = retriever.to_entity_with_ext_info_by_guid("a").unwrap();
    assert_eq!(compacted.referred_entities.keys().collect::<Vec<_>>(), vec!["b"]);
}

#[test]
fn test_batch_shares_referred_entities() {
    let mut fixture = populated();
    let shared = fixture.columns[1];
    {
        let mut writer = InstanceWriter::new(&mut fixture.store);
        let other = writer.create_entity_with_guid("Table", "tbl-2").unwrap();
        writer.set_attribute(other, "Referenceable.qualifiedName", "sales.returns@prod").unwrap();
        writer.set_reference_array(other, "Table.columns", &[shared]).unwrap();
    }

    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let batch = retriever.to_entities_with_ext_info(&["tbl-1", "tbl-2"]).unwrap();
    assert_eq!(batch.entities.len(), 2);
    assert_eq!(batch.referred_entities.len(), 2);

    // a requested entity is never also a referred one
    let batch = retriever.to_entities_with_ext_info(&["tbl-1", "col-id"]).unwrap();
    assert_eq!(batch.referred_entities.keys().collect::<Vec<_>>(), vec!["col-amount"]);
}

#[test]
fn test_empty_collections_read_as_absent() {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    writer.create_entity_with_guid("Table", "unset").unwrap();
    let empty = writer.create_entity_with_guid("Table", "empty").unwrap();
    writer.set_primitive_array(empty, "Table.tags", Vec::new()).unwrap();
    writer.set_primitive_map(empty, "Table.params", Vec::new()).unwrap();

    let types = types();
    let retriever = EntityRetriever::new(&store, &types);

    let unset = retriever.to_entity_by_guid("unset").unwrap();
    let empty = retriever.to_entity_by_guid("empty").unwrap();
    assert_eq!(unset.attributes, empty.attributes);
    assert!(!empty.attributes.contains_key("tags"));
    assert!(!empty.attributes.contains_key("params"));
}

#[test]
fn test_wrong_stored_type_is_reported() {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    let table = writer.create_entity_with_guid("Table", "bad").unwrap();
    writer.set_attribute(table, "Table.rows", "many").unwrap();

    let types = types();
    let retriever = EntityRetriever::new(&store, &types);
    let err = retriever.to_entity_by_guid("bad").unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidType { ref type_name, .. } if type_name == "long"));
}

#[test]
fn test_unknown_entity_type() {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    writer.create_entity_with_guid("Retired", "old").unwrap();

    let types = types();
    let retriever = EntityRetriever::new(&store, &types);
    assert!(matches!(
        retriever.to_entity_by_guid("old"),
        Err(RepositoryError::InvalidType { .. })
    ));

    // headers are lenient
    let header = retriever.to_entity_header_by_guid("old").unwrap();
    assert_eq!(header.type_name, "Retired");
    assert!(header.attributes.is_empty());
    assert!(matches!(
        retriever.to_entity_by_guid("missing"),
        Err(RepositoryError::NotFound(_))
    ));
}

#[test]
fn test_headers() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let header = retriever.to_entity_header_by_guid("tbl-1").unwrap();
    assert_eq!(header.guid, "tbl-1");
    assert_eq!(header.display_text.as_deref(), Some("orders"));
    assert_eq!(header.classification_names, vec!["PII"]);
    assert!(header.classifications.is_empty());
    assert!(header.attributes.contains_key("qualifiedName"));
    assert!(!header.attributes.contains_key("rows"));

    let vertex = retriever.entity_vertex("tbl-1").unwrap();
    let header = retriever
        .to_entity_header_with_attributes(vertex, &["Table.rows", "missing"])
        .unwrap();
    assert_eq!(header.attributes["rows"].as_scalar(), Some(&Scalar::Long(42)));
    assert!(!header.attributes.contains_key("missing"));

    let header = retriever.to_entity_header_with_classifications_by_guid("tbl-1").unwrap();
    assert_eq!(header.classifications.len(), 1);

    let entity = retriever.to_entity(vertex).unwrap();
    let derived = retriever.header_from_entity(&entity).unwrap();
    assert_eq!(derived.display_text.as_deref(), Some("orders"));
    assert_eq!(derived.classification_names, vec!["PII"]);
}

#[test]
fn test_display_text_falls_back_to_qualified_name() {
    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    let db = writer.create_entity_with_guid("Database", "db").unwrap();
    writer.set_attribute(db, "Referenceable.qualifiedName", "hr@prod").unwrap();

    let types = types();
    let config = MaterializationConfig {
        header_attributes: Vec::new(),
        ..MaterializationConfig::default()
    };
    let retriever = EntityRetriever::with_config(&store, &types, config);
    let header = retriever.to_entity_header_by_guid("db").unwrap();
    assert_eq!(header.display_text.as_deref(), Some("hr@prod"));
}

#[test]
fn test_display_text_ignores_requested_attributes() {
    let mut types = types();
    types.register_entity(
        EntityTypeDef::new("Dashboard")
            .with_attribute(AttributeDef::primitive("qualifiedName", PrimitiveKind::String)),
    );

    let mut store = GraphStore::new();
    let mut writer = InstanceWriter::new(&mut store);
    let dashboard = writer.create_entity_with_guid("Dashboard", "dash").unwrap();
    writer.set_attribute(dashboard, "Dashboard.qualifiedName", "kpis@prod").unwrap();
    let db = writer.create_entity_with_guid("Database", "db").unwrap();
    writer.set_attribute(db, "Asset.name", "hr").unwrap();

    let config = MaterializationConfig {
        header_attributes: Vec::new(),
        ..MaterializationConfig::default()
    };
    let retriever = EntityRetriever::with_config(&store, &types, config);

    // not unique here, so only shows up as a requested attribute
    let vertex = retriever.entity_vertex("dash").unwrap();
    let header = retriever.to_entity_header_with_attributes(vertex, &["qualifiedName"]).unwrap();
    assert_eq!(header.attributes["qualifiedName"].as_str(), Some("kpis@prod"));
    assert_eq!(header.display_text, None);

    // name counts even when not configured as a header attribute
    let header = retriever.to_entity_header_by_guid("db").unwrap();
    assert_eq!(header.display_text.as_deref(), Some("hr"));
    assert!(!header.attributes.contains_key("name"));
}

#[test]
fn test_relationship_attributes() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let table = retriever.to_entity_by_guid("tbl-1").unwrap();
    let database = table.relationship_attributes["database"].as_related().unwrap();
    assert_eq!(database.guid.as_deref(), Some("db-1"));
    assert_eq!(database.relationship_type, "TableDb");
    assert_eq!(database.display_text.as_deref(), Some("sales"));
    assert!(database.relationship_guid.is_some());

    let db = retriever.to_entity_by_guid("db-1").unwrap();
    let tables = db.relationship_attributes["tables"].as_list().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].as_related().unwrap().guid.as_deref(), Some("tbl-1"));

    // a table with no relationship edges has no relationship attributes
    let mut store = GraphStore::new();
    InstanceWriter::new(&mut store).create_entity_with_guid("Database", "lonely").unwrap();
    let retriever = EntityRetriever::new(&store, &types);
    assert!(retriever.to_entity_by_guid("lonely").unwrap().relationship_attributes.is_empty());
}

#[test]
fn test_to_relationship() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let edge = fixture
        .store
        .get_outgoing_edges(fixture.table)
        .into_iter()
        .find(|e| e.label.as_str() == "r:TableDb")
        .map(|e| e.id)
        .unwrap();
    let relationship = retriever.to_relationship(edge).unwrap();

    assert_eq!(relationship.type_name, "TableDb");
    assert_eq!(relationship.label, "r:TableDb");
    assert_eq!(relationship.propagate_tags, PropagateTags::None);
    assert_eq!(relationship.end1.guid.as_deref(), Some("tbl-1"));
    assert_eq!(relationship.end2.guid.as_deref(), Some("db-1"));
    assert_eq!(relationship.version, 1);
    // not a declared attribute of TableDb
    assert!(relationship.attributes.is_empty());
}

#[test]
fn test_invalid_relationship_definition() {
    let mut types = types();
    types.bind_relationship_attribute("Column", "owningTable", "TableDb");

    let fixture = populated();
    let lenient = EntityRetriever::new(&fixture.store, &types);
    let column = lenient.to_entity_by_guid("col-id").unwrap();
    assert!(!column.relationship_attributes.contains_key("owningTable"));

    let config = MaterializationConfig {
        strict_relationship_attributes: true,
        ..MaterializationConfig::default()
    };
    let strict = EntityRetriever::with_config(&fixture.store, &types, config);
    let err = strict.to_entity_by_guid("col-id").unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::InvalidRelationshipDefinition { ref attribute, .. } if attribute == "owningTable"
    ));
}

#[test]
fn test_resolve_object_id() {
    let fixture = populated();
    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);

    let by_guid = retriever.resolve_object_id(&ObjectId::new("db-1", "Database")).unwrap();
    assert_eq!(by_guid.id, retriever.entity_vertex("db-1").unwrap().id);

    let mut unique = metagraph::model::AttributeMap::new();
    unique.insert("qualifiedName".to_string(), "sales.orders@prod".into());
    let by_unique = retriever
        .resolve_object_id(&ObjectId::by_unique_attributes("Asset", unique))
        .unwrap();
    assert_eq!(by_unique.id, fixture.table);

    let object_id = retriever.to_object_id(by_unique).unwrap();
    assert_eq!(object_id.guid.as_deref(), Some("tbl-1"));
    assert_eq!(
        object_id.unique_attributes.get("qualifiedName").and_then(TypedValue::as_str),
        Some("sales.orders@prod")
    );

    let mut unique = metagraph::model::AttributeMap::new();
    unique.insert("qualifiedName".to_string(), "nowhere".into());
    assert!(matches!(
        retriever.resolve_object_id(&ObjectId::by_unique_attributes("Table", unique)),
        Err(RepositoryError::NotFound(_))
    ));
}

#[test]
fn test_deleted_entity_status() {
    let mut fixture = populated();
    InstanceWriter::new(&mut fixture.store).mark_deleted(fixture.columns[0]).unwrap();

    let types = types();
    let retriever = EntityRetriever::new(&fixture.store, &types);
    let column = retriever.to_entity_by_guid("col-id").unwrap();
    assert_eq!(column.status, EntityStatus::Deleted);
}
