//! Union flattening and classification.
//!
//! A union resolves to one of three shapes (enum, symbol-as-string, a single
//! member) plus a nullable flag. Anything else is rejected outright; there is no
//! best-effort guess for mixed unions.
use crate::error::{Error, Result};
use crate::expr::TypeExpr;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape<'a> {
    /// Symbol values in first-occurrence order, duplicates kept.
    Enum(Vec<&'a str>),
    /// One symbol unioned with null renders as a plain string, not a one-value enum.
    SymbolString,
    Single(&'a TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Classification<'a> {
    pub shape: Shape<'a>,
    pub nullable: bool,
}

/// Left-to-right, depth-first. A non-union is a singleton.
pub(crate) fn flatten(expr: &TypeExpr) -> Vec<&TypeExpr> {
    fn go<'a>(expr: &'a TypeExpr, out: &mut Vec<&'a TypeExpr>) {
        match expr {
            TypeExpr::Union(members) => {
                for member in members {
                    go(member, out);
                }
            }
            other => out.push(other),
        }
    }
    let mut out = Vec::new();
    go(expr, &mut out);
    out
}

pub(crate) fn classify(expr: &TypeExpr) -> Result<Classification<'_>> {
    if !matches!(expr, TypeExpr::Union(_)) {
        return Ok(Classification { shape: Shape::Single(expr), nullable: false });
    }

    let members = flatten(expr);
    let has_null = members.iter().any(|m| matches!(m, TypeExpr::Null));
    let rest: Vec<&TypeExpr> = members
        .into_iter()
        .filter(|m| !matches!(m, TypeExpr::Null))
        .collect();

    let symbols: Option<Vec<&str>> = rest
        .iter()
        .map(|&m| match m {
            TypeExpr::Symbol(value) => Some(value.as_str()),
            _ => None,
        })
        .collect();

    let classification = match symbols {
        Some(values) if values.len() == 1 && has_null => Classification {
            shape: Shape::SymbolString,
            nullable: true,
        },
        Some(values) => {
            // a nulled enum is only nullable once there are at least two symbols
            let nullable = has_null && values.len() >= 2;
            Classification { shape: Shape::Enum(values), nullable }
        }
        None if rest.len() == 1 => Classification {
            shape: Shape::Single(rest[0]),
            nullable: has_null,
        },
        None => return Err(Error::unsupported(expr)),
    };

    tracing::debug!(
        expr = %expr,
        shape = ?classification.shape,
        nullable = classification.nullable,
        "classified union"
    );
    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(s: &str) -> TypeExpr {
        TypeExpr::symbol(s)
    }

    #[test]
    fn flattens_nested_unions_in_order() {
        let expr = TypeExpr::union([
            sym("a"),
            TypeExpr::union([sym("b"), TypeExpr::union([sym("c"), TypeExpr::Null])]),
            sym("d"),
        ]);
        assert_eq!(
            flatten(&expr),
            vec![&sym("a"), &sym("b"), &sym("c"), &TypeExpr::Null, &sym("d")]
        );
    }

    #[test]
    fn non_union_is_single_and_required() {
        let expr = TypeExpr::integer();
        let c = classify(&expr).unwrap();
        assert_eq!(c, Classification { shape: Shape::Single(&expr), nullable: false });
    }

    #[test]
    fn symbols_without_null_are_required_enum() {
        let expr = sym("a") | sym("b") | sym("a");
        let c = classify(&expr).unwrap();
        assert_eq!(c.shape, Shape::Enum(vec!["a", "b", "a"]));
        assert!(!c.nullable);
    }

    #[test]
    fn symbols_with_null_are_nullable_enum() {
        let expr = sym("x") | TypeExpr::Null | sym("y");
        let c = classify(&expr).unwrap();
        assert_eq!(c.shape, Shape::Enum(vec!["x", "y"]));
        assert!(c.nullable);
    }

    #[test]
    fn lone_symbol_with_null_is_string() {
        let u = sym("only") | TypeExpr::Null;
        let c = classify(&u).unwrap();
        assert_eq!(c, Classification { shape: Shape::SymbolString, nullable: true });
    }

    #[test]
    fn type_or_null_is_nullable_single() {
        let inner = TypeExpr::array(TypeExpr::string());
        let expr = TypeExpr::Null | inner.clone();
        let c = classify(&expr).unwrap();
        assert_eq!(c, Classification { shape: Shape::Single(&inner), nullable: true });
    }

    #[test]
    fn mixed_unions_are_rejected() {
        for expr in [
            sym("a") | TypeExpr::integer(),
            TypeExpr::integer() | TypeExpr::string(),
            TypeExpr::integer() | TypeExpr::string() | TypeExpr::Null,
        ] {
            match classify(&expr) {
                Err(Error::UnsupportedTypeExpression(found)) => assert_eq!(*found, expr),
                other => panic!("expected rejection of `{expr}`, got {other:?}"),
            }
        }
    }
}
