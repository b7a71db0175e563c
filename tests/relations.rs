use dbscaffold::analyze;
use dbscaffold::introspect::{build_tables, CatalogSnapshot, CatalogTable, ColumnRow, ConstraintRow};
use dbscaffold::ir::{ColumnType, Table};
use dbscaffold::relation::{infer_relations, InferenceEngine, RelationKind};
use dbscaffold::types::TypeMap;

fn entity(name: &str) -> CatalogTable {
    CatalogTable::new(name)
        .with_constraint(ConstraintRow::primary_key("id"))
        .with_column(ColumnRow {
            extra: "auto_increment".into(),
            ..ColumnRow::new("id", "int")
        })
}

fn tables(raw: Vec<CatalogTable>) -> Vec<Table> {
    let snapshot = CatalogSnapshot { tables: raw };
    analyze(&snapshot, &TypeMap::default()).unwrap().0
}

fn find<'a>(tables: &'a [Table], name: &str) -> &'a Table {
    tables.iter().find(|t| t.name == name).unwrap()
}

fn retained(table: &Table) -> Vec<String> {
    table.retained().map(|c| c.name.clone()).collect()
}

#[test]
fn one_suffix_builds_one_to_one() {
    let ts = tables(vec![
        entity("user").with_column(ColumnRow::new("name", "varchar")),
        entity("profile")
            .with_column(ColumnRow::new("user_one", "int"))
            .with_column(ColumnRow::new("bio", "text")),
    ]);

    let profile = find(&ts, "profile");
    let user_ref = profile.column("User").unwrap();
    assert_eq!(user_ref.ty, ColumnType::Ref("User".into()));
    assert!(user_ref.tag.rel_one);
    assert_eq!(retained(profile), vec!["Id", "Bio", "User"]);
    assert!(!profile.column("UserOne").unwrap().is_need);

    let user = find(&ts, "user");
    let back = user.column("Profile").unwrap();
    assert_eq!(back.ty, ColumnType::Ref("Profile".into()));
    assert!(back.tag.reverse_one);
    assert_eq!(user.relation, vec!["Profile".to_string()]);
}

#[test]
fn id_suffix_builds_one_to_many() {
    let ts = tables(vec![
        entity("user"),
        entity("order").with_column(ColumnRow::new("user_id", "int")),
    ]);

    let order = find(&ts, "order");
    let user_ref = order.column("User").unwrap();
    assert_eq!(user_ref.ty, ColumnType::Ref("User".into()));
    assert!(user_ref.tag.rel_fk);
    assert_eq!(retained(order), vec!["Id", "User"]);

    let user = find(&ts, "user");
    let orders = user.column("Orders").unwrap();
    assert_eq!(orders.ty, ColumnType::RefList("Order".into()));
    assert!(orders.tag.reverse_many);
    assert!(!orders.tag.m2m);
}

#[test]
fn join_table_builds_many_to_many() {
    let ts = tables(vec![
        entity("student"),
        entity("course"),
        entity("student_has_course")
            .with_column(ColumnRow::new("student_id", "int"))
            .with_column(ColumnRow::new("course_id", "int")),
    ]);

    let student = find(&ts, "student");
    let courses = student.column("Courses").unwrap();
    assert_eq!(courses.ty, ColumnType::RefList("Course".into()));
    assert!(courses.tag.reverse_many && courses.tag.m2m);
    assert_eq!(courses.tag.m2m_through, "student_has_course");

    let course = find(&ts, "course");
    let students = course.column("Students").unwrap();
    assert_eq!(students.ty, ColumnType::RefList("Student".into()));
    assert!(students.tag.rel_m2m && students.tag.m2m);
    assert!(students.to_string().contains("rel(m2m);rel_table(student_has_course)"));

    let join = find(&ts, "student_has_course");
    assert!(join.is_degenerate());
    assert!(!join.column("StudentId").unwrap().is_need);
    assert!(!join.column("CourseId").unwrap().is_need);
    assert_eq!(retained(join), vec!["Id", "Student", "Course"]);
    assert!(join
        .column("Student")
        .unwrap()
        .tag
        .comment
        .contains("join table link column"));
}

#[test]
fn one_to_many_wins_duplicate() {
    let ts = tables(vec![
        entity("user"),
        entity("account")
            .with_column(ColumnRow::new("user_one", "int"))
            .with_column(ColumnRow::new("user_id", "int")),
    ]);

    let account = find(&ts, "account");
    let user_ref = account.column("User").unwrap();
    assert!(user_ref.tag.rel_fk);
    assert!(!user_ref.tag.rel_one);
    assert_eq!(retained(account), vec!["Id", "User"]);

    let user = find(&ts, "user");
    assert!(user.column("Accounts").is_some());
    assert!(user.column("Account").is_none());
}

#[test]
fn dangling_reference_stays_scalar() {
    let ts = tables(vec![entity("order").with_column(ColumnRow::new("customer_id", "int"))]);
    let order = find(&ts, "order");
    assert_eq!(retained(order), vec!["Id", "CustomerId"]);
    assert!(order.relation.is_empty());
}

#[test]
fn degenerate_target_is_not_linked() {
    let ts = tables(vec![
        CatalogTable::new("audit").with_column(ColumnRow::new("note", "varchar")),
        entity("entry").with_column(ColumnRow::new("audit_id", "int")),
    ]);
    let entry = find(&ts, "entry");
    assert_eq!(retained(entry), vec!["Id", "AuditId"]);
    assert!(find(&ts, "audit").relation.is_empty());
}

#[test]
fn self_reference() {
    let ts = tables(vec![entity("category").with_column(ColumnRow::new("category_id", "int"))]);
    let category = find(&ts, "category");
    assert_eq!(retained(category), vec!["Id", "Categorys", "Category"]);
    assert_eq!(
        category.column("Categorys").unwrap().ty,
        ColumnType::RefList("Category".into())
    );
}

#[test]
fn primary_key_never_names_a_relation() {
    let ts = tables(vec![
        entity("user"),
        CatalogTable::new("profile")
            .with_constraint(ConstraintRow::primary_key("user_id"))
            .with_column(ColumnRow::new("user_id", "int")),
    ]);
    let profile = find(&ts, "profile");
    assert_eq!(retained(profile), vec!["Id"]);
    assert!(find(&ts, "user").relation.is_empty());
}

#[test]
fn engine_reports_each_phase() {
    let snapshot = CatalogSnapshot {
        tables: vec![
            entity("user"),
            entity("account")
                .with_column(ColumnRow::new("user_one", "int"))
                .with_column(ColumnRow::new("user_id", "int"))
                .with_column(ColumnRow::new("ghost_id", "int")),
        ],
    };
    let mut ts = build_tables(&snapshot, &TypeMap::default()).unwrap();
    let mut engine = InferenceEngine::new();
    let summary = engine.run(&mut ts);

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.unique, 2);
    assert_eq!(engine.discovered().len(), 3);
    assert_eq!(engine.unique().count(), 2);
    assert_eq!(engine.confirmed().len(), 1);
    let confirmed = &summary.confirmed[0];
    assert_eq!(confirmed.kind, RelationKind::OneToMany);
    assert_eq!((confirmed.source.as_str(), confirmed.target.as_str()), ("account", "user"));
    assert!(confirmed.correct);
}

#[test]
fn fresh_engine_per_run() {
    let first = CatalogSnapshot {
        tables: vec![entity("user"), entity("order").with_column(ColumnRow::new("user_id", "int"))],
    };
    let second = CatalogSnapshot {
        tables: vec![entity("tag")],
    };
    let mut a = build_tables(&first, &TypeMap::default()).unwrap();
    let mut b = build_tables(&second, &TypeMap::default()).unwrap();

    assert_eq!(infer_relations(&mut a).confirmed.len(), 1);
    let summary = infer_relations(&mut b);
    assert_eq!(summary.discovered, 0);
    assert!(summary.confirmed.is_empty());
    assert!(b[0].relation.is_empty());
}

#[test]
fn dangling_one_marker_is_hidden() {
    let ts = tables(vec![entity("profile")
        .with_column(ColumnRow::new("ghost_one", "int"))
        .with_column(ColumnRow::new("ghost_id", "int"))]);
    let profile = find(&ts, "profile");
    assert!(!profile.column("GhostOne").unwrap().is_need);
    assert_eq!(retained(profile), vec!["Id", "GhostId"]);
    assert!(profile.relation.is_empty());
}
