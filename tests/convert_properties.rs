//! Conversion properties over the public API.

use json_typespec::{convert, parse, Descriptions, Error, FieldSpec, TypeExpr};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ============================================================================
// Helpers
// ============================================================================

fn schema(expr: &TypeExpr) -> Value {
    convert(expr, &Descriptions::new()).unwrap().to_json()
}

fn field_schema(ty: TypeExpr) -> Value {
    schema(&TypeExpr::object([FieldSpec::field("f", ty)]))
}

fn is_required(doc: &Value, name: &str) -> bool {
    doc.get("required")
        .and_then(Value::as_array)
        .is_some_and(|names| names.iter().any(|n| n == name))
}

// ============================================================================
// Determinism and arrays
// ============================================================================

#[test]
fn conversion_is_deterministic() {
    let expr = parse("{id!: pos_integer, role: :a | :b | null, tags?: [string], meta: any}").unwrap();
    let first = convert(&expr, &Descriptions::new()).unwrap();
    let second = convert(&expr, &Descriptions::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json().to_string(), second.to_json().to_string());
}

#[test]
fn arrays_nest_to_any_depth() {
    let mut expr = TypeExpr::neg_integer();
    let mut expected = json!({"type": "integer", "maximum": -1});
    for _ in 0..10 {
        expr = TypeExpr::array(expr);
        expected = json!({"type": "array", "items": expected});
    }
    assert_eq!(schema(&expr), expected);
}

// ============================================================================
// Object requiredness
// ============================================================================

#[test]
fn default_fields_are_required_in_declaration_order() {
    let expr = parse("{zeta: string, alpha: integer, mid: boolean, last: [number]}").unwrap();
    let doc = schema(&expr);
    assert_eq!(doc["required"], json!(["zeta", "alpha", "mid", "last"]));
    let keys: Vec<&String> = doc["properties"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["zeta", "alpha", "mid", "last"]);
    assert_eq!(doc["additionalProperties"], json!(false));
}

#[test]
fn required_is_omitted_when_nothing_is_required() {
    let doc = schema(&parse("{a?: string, b: integer | null}").unwrap());
    assert!(doc.get("required").is_none());
    assert_eq!(
        doc,
        json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
            "additionalProperties": false
        })
    );
}

#[test]
fn empty_object_literal() {
    assert_eq!(
        schema(&parse("{}").unwrap()),
        json!({"type": "object", "properties": {}, "additionalProperties": false})
    );
}

// ============================================================================
// Union classification
// ============================================================================

#[test]
fn symbol_union_is_enum_in_first_occurrence_order_with_duplicates() {
    let doc = field_schema(parse(":c | (:a | :c) | :b").unwrap());
    assert_eq!(doc["properties"]["f"], json!({"type": "string", "enum": ["c", "a", "c", "b"]}));
    assert!(is_required(&doc, "f"));
}

#[test]
fn nulled_symbol_union_is_optional_enum() {
    let doc = field_schema(parse(":draft | null | :published").unwrap());
    assert_eq!(doc["properties"]["f"], json!({"type": "string", "enum": ["draft", "published"]}));
    assert!(!is_required(&doc, "f"));
}

#[test]
fn type_or_null_is_inner_schema_and_optional() {
    let doc = field_schema(TypeExpr::array(TypeExpr::string()) | TypeExpr::Null);
    assert_eq!(doc["properties"]["f"], json!({"type": "array", "items": {"type": "string"}}));
    assert!(!is_required(&doc, "f"));
}

/// One symbol with null collapses to a plain string; two symbols with null stay an enum.
#[test]
fn lone_symbol_with_null_is_a_nullable_string_not_an_enum() {
    let one = field_schema(parse(":only | null").unwrap());
    assert_eq!(one["properties"]["f"], json!({"type": "string"}));
    assert!(!is_required(&one, "f"));

    let two = field_schema(parse(":one | :two | null").unwrap());
    assert_eq!(two["properties"]["f"], json!({"type": "string", "enum": ["one", "two"]}));
}

#[test]
fn single_symbol_union_member_without_null_is_a_one_value_enum() {
    let doc = schema(&TypeExpr::union([TypeExpr::symbol("solo")]));
    assert_eq!(doc, json!({"type": "string", "enum": ["solo"]}));
}

#[test]
fn rendered_one_member_union_converts_the_same_after_parsing() {
    let expr = TypeExpr::object([FieldSpec::field("only", TypeExpr::union([TypeExpr::symbol("solo")]))]);
    let reparsed = parse(&expr.to_string()).unwrap();
    assert_eq!(reparsed, expr);
    assert_eq!(schema(&reparsed), schema(&expr));
}

#[test]
fn mixed_symbol_and_type_union_is_unsupported() {
    for src in [":a | string", "{f: :a | integer}", "{f: string | integer | null}", "[:a | :b | boolean]"] {
        let expr = parse(src).unwrap();
        match convert(&expr, &Descriptions::new()) {
            Err(Error::UnsupportedTypeExpression(_)) => {}
            other => panic!("`{src}` should be unsupported, got {other:?}"),
        }
    }
}

#[test]
fn unknown_names_are_unsupported_with_the_offending_expression() {
    let expr = parse("{when: [datetime]}").unwrap();
    let err = convert(&expr, &Descriptions::new()).unwrap_err();
    assert!(matches!(&err, Error::UnsupportedTypeExpression(found) if **found == TypeExpr::named("datetime")));
    assert_eq!(err.to_string(), "unsupported type expression `datetime`");
}

// ============================================================================
// Descriptions
// ============================================================================

#[test]
fn descriptions_attach_to_matching_fields_only() {
    let expr = parse("{id!: integer, role: :a | :b, tags: [string], misc: any}").unwrap();
    let descriptions =
        Descriptions::from_json(&json!({"role": "Access level", "tags": "Labels", "misc": null, "absent": "x"}))
            .unwrap();
    let doc = convert(&expr, &descriptions).unwrap().to_json();
    assert_eq!(doc["properties"]["id"], json!({"type": "integer"}));
    assert_eq!(
        doc["properties"]["role"],
        json!({"type": "string", "enum": ["a", "b"], "description": "Access level"})
    );
    assert_eq!(
        doc["properties"]["tags"],
        json!({"type": "array", "items": {"type": "string"}, "description": "Labels"})
    );
    assert_eq!(doc["properties"]["misc"], json!({}));
}
