//! Integration tests for the query helpers sharing the schema contract.

use quern::{
    build_pagination, build_select, build_sort, Compiler, Dialect, FieldDef, FieldType, Operator,
    PageRequest, PaginationOptions, PlaceholderStyle, Schema, SelectOptions, SortSpec, Value,
};
use serde_json::json;

fn schema() -> Schema {
    Schema::builder()
        .field("id", FieldDef::new(FieldType::Integer, [Operator::Eq]))
        .field(
            "status",
            FieldDef::new(FieldType::String, [Operator::Eq, Operator::In]),
        )
        .field(
            "total",
            FieldDef::new(FieldType::Number, [Operator::Gt]).with_expression("price * quantity"),
        )
        .field(
            "priority",
            FieldDef::new(FieldType::Integer, [Operator::Gte]).with_json_path("meta->>'priority'"),
        )
        .build()
        .unwrap()
}

#[test]
fn select_all_fields() {
    let sql = build_select(&schema(), &SelectOptions::default()).unwrap();
    assert_eq!(
        sql,
        "\"id\", \"status\", (price * quantity) AS \"total\", meta->>'priority' AS \"priority\""
    );
}

#[test]
fn select_subset_preserves_request_order() {
    let options = SelectOptions::default().fields(["status", "id"]);
    let sql = build_select(&schema(), &options).unwrap();
    assert_eq!(sql, "\"status\", \"id\"");
}

#[test]
fn sort_with_computed_expansion() {
    let sql = build_sort(
        &[SortSpec::desc("total"), SortSpec::asc("id")],
        &schema(),
        Dialect::Postgres,
    )
    .unwrap();
    assert_eq!(sql, "ORDER BY (price * quantity) DESC, \"id\" ASC");
}

#[test]
fn pagination_page_form() {
    let page = build_pagination(
        &PageRequest::Page {
            page: 2,
            page_size: 25,
        },
        &PaginationOptions::default(),
    );
    assert_eq!(page.sql, "LIMIT $1 OFFSET $2");
    assert_eq!(page.params.get("p1"), Some(&Value::Int(25)));
    assert_eq!(page.params.get("p2"), Some(&Value::Int(25)));
    assert_eq!(page.next_param_index, 3);
}

#[test]
fn full_query_composition() {
    // WHERE + ORDER BY + LIMIT/OFFSET built from one schema, with pagination
    // parameters numbered after the filter's.
    let schema = schema();
    let compiled = Compiler::new(&schema)
        .compile(&json!({"in": [{"var": "status"}, ["open", "pending"]]}))
        .unwrap();
    assert_eq!(compiled.sql, "\"status\" IN ($1, $2)");

    let order = build_sort(&[SortSpec::asc("id")], &schema, Dialect::Postgres).unwrap();

    let page = build_pagination(
        &PageRequest::Page {
            page: 1,
            page_size: 50,
        },
        &PaginationOptions {
            start_index: compiled.params_array.len() + 1,
            placeholder_style: PlaceholderStyle::Dollar,
            ..Default::default()
        },
    );
    assert_eq!(page.sql, "LIMIT $3 OFFSET $4");

    let statement = format!(
        "SELECT {} FROM orders WHERE {} {} {}",
        build_select(&schema, &SelectOptions::default()).unwrap(),
        compiled.sql,
        order,
        page.sql
    );
    assert!(statement.contains("WHERE \"status\" IN ($1, $2) ORDER BY \"id\" ASC LIMIT $3 OFFSET $4"));

    // Combined parameter map stays contiguous.
    let mut params = compiled.params.clone();
    params.extend(page.params.clone());
    for (i, key) in params.keys().enumerate() {
        assert_eq!(key, &format!("p{}", i + 1));
    }
}
