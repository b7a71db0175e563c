use dbscaffold::config;
use dbscaffold::introspect::{build_tables, CatalogSnapshot, CatalogTable, ColumnRow, ConstraintRow};
use dbscaffold::ir::{ColumnType, Table};
use dbscaffold::types::{GoScalar, TypeMap};
use dbscaffold::GenerateError;
use std::collections::HashMap;
use std::fs;
use tempfile::tempdir;

fn entity(name: &str) -> CatalogTable {
    CatalogTable::new(name)
        .with_constraint(ConstraintRow::primary_key("id"))
        .with_column(ColumnRow {
            extra: "auto_increment".into(),
            ..ColumnRow::new("id", "int")
        })
}

fn build(raw: Vec<CatalogTable>) -> Vec<Table> {
    build_tables(&CatalogSnapshot { tables: raw }, &TypeMap::default()).unwrap()
}

#[test]
fn primary_key_becomes_id() {
    let ts = build(vec![entity("user")]);
    let id = ts[0].column("Id").unwrap();
    assert_eq!(id.ty, ColumnType::Scalar(GoScalar::Int));
    assert!(id.tag.pk && id.tag.auto);
    assert_eq!(id.to_string(), "Id int `orm:\"column(id);auto;pk\"`");
    assert_eq!(ts[0].pk, "id");
}

#[test]
fn non_key_id_column_is_renamed() {
    let ts = build(vec![CatalogTable::new("coupon")
        .with_constraint(ConstraintRow::primary_key("code"))
        .with_column(ColumnRow {
            column_type: "varchar(16)".into(),
            ..ColumnRow::new("code", "varchar")
        })
        .with_column(ColumnRow::new("id", "int"))]);
    let names: Vec<&str> = ts[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Id", "Id_RENAME"]);
}

#[test]
fn unsigned_integers_map_to_uint() {
    let ts = build(vec![entity("stock")
        .with_column(ColumnRow {
            column_type: "int(10) unsigned".into(),
            ..ColumnRow::new("amount", "int")
        })
        .with_column(ColumnRow {
            column_type: "bigint unsigned".into(),
            ..ColumnRow::new("total", "bigint")
        })
        .with_column(ColumnRow {
            column_type: "tinyint(4)".into(),
            ..ColumnRow::new("level", "tinyint")
        })]);
    let t = &ts[0];
    assert_eq!(t.column("Amount").unwrap().ty, ColumnType::Scalar(GoScalar::Uint));
    assert_eq!(t.column("Total").unwrap().ty, ColumnType::Scalar(GoScalar::Uint64));
    assert_eq!(t.column("Level").unwrap().ty, ColumnType::Scalar(GoScalar::Int8));
}

#[test]
fn string_size_and_nullability() {
    let ts = build(vec![entity("user").with_column(ColumnRow {
        column_type: "varchar(64)".into(),
        nullable: true,
        default: "guest".into(),
        comment: "login \"name\"".into(),
        ..ColumnRow::new("user_name", "varchar")
    })]);
    let col = ts[0].column("UserName").unwrap();
    assert_eq!(col.tag.size, "64");
    assert!(col.tag.null);
    assert_eq!(
        col.to_string(),
        "UserName string `orm:\"column(user_name);size(64);null;default(guest)\" description:\"login \\\"name\\\"\"`"
    );
}

#[test]
fn timestamps_pull_in_time() {
    let ts = build(vec![entity("post")
        .with_column(ColumnRow {
            default: "CURRENT_TIMESTAMP".into(),
            ..ColumnRow::new("created", "datetime")
        })
        .with_column(ColumnRow {
            default: "CURRENT_TIMESTAMP".into(),
            extra: "on update CURRENT_TIMESTAMP".into(),
            ..ColumnRow::new("updated", "timestamp")
        })]);
    let t = &ts[0];
    assert!(t.import_time_pkg);
    let created = t.column("Created").unwrap();
    assert!(created.tag.auto_now_add && !created.tag.auto_now);
    assert_eq!(created.tag.sql_type, "datetime");
    let updated = t.column("Updated").unwrap();
    assert!(updated.tag.auto_now && !updated.tag.auto_now_add);
    assert_eq!(updated.ty, ColumnType::Scalar(GoScalar::Time));
}

#[test]
fn decimal_digits() {
    let ts = build(vec![entity("item").with_column(ColumnRow {
        column_type: "decimal(10,2)".into(),
        ..ColumnRow::new("price", "decimal")
    })]);
    let price = ts[0].column("Price").unwrap();
    assert_eq!((price.tag.digits.as_str(), price.tag.decimals.as_str()), ("10", "2"));
    assert!(price.tag.options().contains(&"digits(10);decimals(2)".to_string()));
    assert!(!ts[0].import_time_pkg);
}

#[test]
fn unmapped_type_is_fatal() {
    let snapshot = CatalogSnapshot {
        tables: vec![entity("place").with_column(ColumnRow::new("area", "geometry"))],
    };
    let err = build_tables(&snapshot, &TypeMap::default()).unwrap_err();
    match err.downcast_ref::<GenerateError>() {
        Some(GenerateError::UnmappedType(ty)) => assert_eq!(ty, "geometry"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn foreign_key_to_weak_table_stays_scalar() {
    let ts = build(vec![
        CatalogTable::new("pair")
            .with_constraint(ConstraintRow::primary_key("a"))
            .with_constraint(ConstraintRow {
                ordinal: 2,
                ..ConstraintRow::primary_key("b")
            })
            .with_column(ColumnRow::new("a", "int"))
            .with_column(ColumnRow::new("b", "int")),
        entity("user"),
        entity("note")
            .with_constraint(ConstraintRow::foreign_key("pair_ref", "pair", "a"))
            .with_constraint(ConstraintRow::foreign_key("owner", "user", "id"))
            .with_column(ColumnRow::new("pair_ref", "int"))
            .with_column(ColumnRow::new("owner", "int")),
    ]);

    assert!(ts[0].pk.is_empty());
    assert!(ts[0].is_degenerate());

    let note = &ts[2];
    assert_eq!(note.column("PairRef").unwrap().ty, ColumnType::Scalar(GoScalar::Int));
    let owner = note.column("Owner").unwrap();
    assert_eq!(owner.ty, ColumnType::Ref("User".into()));
    assert!(owner.tag.rel_fk);
    assert_eq!(note.fk["owner"].ref_table, "user");
}

#[test]
fn type_map_overrides() {
    let mut extra = HashMap::new();
    extra.insert("GEOMETRY".to_string(), "string".to_string());
    extra.insert("int".to_string(), "int64".to_string());
    let map = TypeMap::with_overrides(&extra).unwrap();
    assert_eq!(map.lookup("geometry").unwrap(), GoScalar::String);
    assert_eq!(map.lookup("int").unwrap(), GoScalar::Int64);

    extra.insert("json".to_string(), "map".to_string());
    match TypeMap::with_overrides(&extra) {
        Err(GenerateError::UnknownTargetType { native, target }) => {
            assert_eq!((native.as_str(), target.as_str()), ("json", "map"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn type_map_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("type_map.toml");
    assert_eq!(
        config::load_type_map(&path).unwrap().lookup("varchar").unwrap(),
        GoScalar::String
    );

    fs::write(&path, "[db_types]\njson = \"string\"\nyear = \"int\"\n").unwrap();
    let map = config::load_type_map(&path).unwrap();
    assert_eq!(map.lookup("json").unwrap(), GoScalar::String);
    assert_eq!(map.lookup("year").unwrap(), GoScalar::Int);

    fs::write(&path, "[db_types]\njson = \"object\"\n").unwrap();
    assert!(config::load_type_map(&path).is_err());
}

#[test]
fn explicit_connection_wins() {
    assert_eq!(
        config::resolve_conn(Some("mysql://app@db:3306/shop".into())),
        "mysql://app@db:3306/shop"
    );
}
