//! TypeExpr → SchemaNode.
//!
//! Pure and all-or-nothing: the first unsupported sub-expression aborts the
//! whole conversion, there is never a partial schema.
use indexmap::IndexMap;
use serde_json::Value;

use crate::descriptions::Descriptions;
use crate::error::{Error, Result};
use crate::expr::{FieldSpec, PrimitiveKind, Requiredness, TypeExpr};
use crate::schema::{ScalarType, SchemaNode};
use crate::union::{self, Shape};

pub fn convert(expr: &TypeExpr, descriptions: &Descriptions) -> Result<SchemaNode> {
    match expr {
        TypeExpr::Primitive(kind) => Ok(convert_primitive(*kind)),
        TypeExpr::ArrayOf(element) => Ok(SchemaNode::array(convert(element, descriptions)?)),
        TypeExpr::Object(fields) => convert_object(expr, fields, descriptions),
        // outside a field the nullable flag has nothing to act on
        TypeExpr::Union(_) => {
            let classification = union::classify(expr)?;
            render_shape(classification.shape, descriptions)
        }
        TypeExpr::Symbol(_) | TypeExpr::Null | TypeExpr::Named(_) => Err(Error::unsupported(expr)),
    }
}

/// Validates the raw description option first, then converts.
pub fn convert_with_options(expr: &TypeExpr, descriptions: &Value) -> Result<SchemaNode> {
    let descriptions = Descriptions::from_json(descriptions)?;
    convert(expr, &descriptions)
}

fn convert_primitive(kind: PrimitiveKind) -> SchemaNode {
    let bounded = |minimum, maximum| SchemaNode::Scalar {
        ty: ScalarType::Integer,
        minimum,
        maximum,
        description: None,
    };
    match kind {
        PrimitiveKind::String | PrimitiveKind::Symbol => SchemaNode::scalar(ScalarType::String),
        PrimitiveKind::Integer => SchemaNode::scalar(ScalarType::Integer),
        PrimitiveKind::PosInteger => bounded(Some(1), None),
        PrimitiveKind::NonNegInteger => bounded(Some(0), None),
        PrimitiveKind::NegInteger => bounded(None, Some(-1)),
        PrimitiveKind::Float | PrimitiveKind::Number => SchemaNode::scalar(ScalarType::Number),
        PrimitiveKind::Boolean => SchemaNode::scalar(ScalarType::Boolean),
        PrimitiveKind::Object => SchemaNode::scalar(ScalarType::Object),
        PrimitiveKind::Any => SchemaNode::empty(),
    }
}

fn convert_object(
    expr: &TypeExpr,
    fields: &[FieldSpec],
    descriptions: &Descriptions,
) -> Result<SchemaNode> {
    let mut properties: IndexMap<String, SchemaNode> = IndexMap::with_capacity(fields.len());
    let mut required = Vec::new();

    for field in fields {
        if properties.contains_key(&field.key) {
            return Err(Error::unsupported(expr));
        }
        let (node, is_required) = match field.requiredness {
            Requiredness::Optional => (convert(&field.ty, descriptions)?, false),
            Requiredness::Required => (convert(&field.ty, descriptions)?, true),
            Requiredness::Default => {
                let classification = union::classify(&field.ty)?;
                let nullable = classification.nullable;
                (render_shape(classification.shape, descriptions)?, !nullable)
            }
        };
        tracing::trace!(field = %field.key, required = is_required, "converted field");

        let node = node.with_description(descriptions.get(&field.key));
        if is_required {
            required.push(field.key.clone());
        }
        properties.insert(field.key.clone(), node);
    }

    Ok(SchemaNode::object(properties, required))
}

fn render_shape(shape: Shape<'_>, descriptions: &Descriptions) -> Result<SchemaNode> {
    match shape {
        Shape::Enum(values) => Ok(SchemaNode::enumeration(values)),
        Shape::SymbolString => Ok(SchemaNode::scalar(ScalarType::String)),
        Shape::Single(member) => convert(member, descriptions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(expr: &TypeExpr) -> Value {
        convert(expr, &Descriptions::new()).unwrap().to_json()
    }

    #[test]
    fn primitives() {
        let cases = [
            (TypeExpr::string(), json!({"type": "string"})),
            (TypeExpr::integer(), json!({"type": "integer"})),
            (TypeExpr::pos_integer(), json!({"type": "integer", "minimum": 1})),
            (TypeExpr::non_neg_integer(), json!({"type": "integer", "minimum": 0})),
            (TypeExpr::neg_integer(), json!({"type": "integer", "maximum": -1})),
            (TypeExpr::float(), json!({"type": "number"})),
            (TypeExpr::number(), json!({"type": "number"})),
            (TypeExpr::boolean(), json!({"type": "boolean"})),
            (TypeExpr::untyped_object(), json!({"type": "object"})),
            (TypeExpr::any_symbol(), json!({"type": "string"})),
            (TypeExpr::any(), json!({})),
        ];
        for (expr, expected) in cases {
            assert_eq!(schema(&expr), expected, "{expr}");
        }
    }

    #[test]
    fn deep_arrays() {
        let expr = TypeExpr::array(TypeExpr::array(TypeExpr::array(TypeExpr::boolean())));
        assert_eq!(
            schema(&expr),
            json!({"type": "array", "items": {"type": "array", "items": {"type": "array", "items": {"type": "boolean"}}}})
        );
    }

    #[test]
    fn bare_symbol_and_null_are_unsupported() {
        for expr in [TypeExpr::symbol("a"), TypeExpr::Null, TypeExpr::named("date")] {
            assert!(matches!(
                convert(&expr, &Descriptions::new()),
                Err(Error::UnsupportedTypeExpression(_))
            ));
        }
    }

    #[test]
    fn top_level_union_ignores_nullability() {
        assert_eq!(schema(&(TypeExpr::integer() | TypeExpr::Null)), json!({"type": "integer"}));
        assert_eq!(
            schema(&(TypeExpr::symbol("a") | TypeExpr::symbol("b") | TypeExpr::Null)),
            json!({"type": "string", "enum": ["a", "b"]})
        );
    }

    #[test]
    fn optional_field_keeps_union_conversion() {
        let expr = TypeExpr::object([FieldSpec::optional("n", TypeExpr::integer() | TypeExpr::Null)]);
        assert_eq!(
            schema(&expr),
            json!({"type": "object", "properties": {"n": {"type": "integer"}}, "additionalProperties": false})
        );
    }

    #[test]
    fn required_field_with_nullable_type_stays_required() {
        let expr = TypeExpr::object([FieldSpec::required("n", TypeExpr::Null | TypeExpr::integer())]);
        assert_eq!(
            schema(&expr),
            json!({
                "type": "object",
                "properties": {"n": {"type": "integer"}},
                "required": ["n"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn failing_field_fails_the_object() {
        let expr = TypeExpr::object([
            FieldSpec::field("ok", TypeExpr::string()),
            FieldSpec::field("bad", TypeExpr::symbol("a") | TypeExpr::string()),
        ]);
        match convert(&expr, &Descriptions::new()) {
            Err(Error::UnsupportedTypeExpression(found)) => {
                assert_eq!(found.to_string(), ":a | string");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn duplicate_field_keys_are_unsupported() {
        let expr = TypeExpr::object([
            FieldSpec::field("a", TypeExpr::string()),
            FieldSpec::optional("a", TypeExpr::integer()),
        ]);
        assert!(matches!(
            convert(&expr, &Descriptions::new()),
            Err(Error::UnsupportedTypeExpression(found)) if *found == expr
        ));
    }

    #[test]
    fn descriptions_attach_by_field_name_at_any_depth() {
        let expr = TypeExpr::object([
            FieldSpec::field("id", TypeExpr::pos_integer()),
            FieldSpec::field(
                "owner",
                TypeExpr::object([FieldSpec::field("name", TypeExpr::string())]),
            ),
            FieldSpec::field("untouched", TypeExpr::boolean()),
        ]);
        let descriptions = Descriptions::from_pairs([
            ("id", "Primary key"),
            ("name", "Display name"),
            ("owner", "Who owns it"),
        ])
        .unwrap();
        let node = convert(&expr, &descriptions).unwrap().to_json();
        assert_eq!(node["properties"]["id"], json!({"type": "integer", "minimum": 1, "description": "Primary key"}));
        assert_eq!(node["properties"]["owner"]["description"], json!("Who owns it"));
        assert_eq!(
            node["properties"]["owner"]["properties"]["name"],
            json!({"type": "string", "description": "Display name"})
        );
        assert_eq!(node["properties"]["untouched"], json!({"type": "boolean"}));
    }

    #[test]
    fn bad_description_option_fails_before_walking() {
        // the expression is unsupported too, but the option error wins
        let err = convert_with_options(&TypeExpr::Null, &json!(["not", "a", "map"])).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptionOption(_)));
    }
}
