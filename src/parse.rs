//! Textual type expressions.
//!
//! ```text
//! {
//!   id!: pos_integer,               # required
//!   name: string,                   # required unless nullable
//!   nickname?: string,              # optional
//!   role: :admin | :user | null,    # nullable enum
//!   tags: [string],
//! }
//! ```
//!
//! Unknown names parse to [`TypeExpr::Named`] and are rejected later by the converter.
use std::str::FromStr;

use pest::error::ErrorVariant;
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Position, Span};
use pest_derive::Parser;

use crate::error::{Error, Result};
use crate::expr::{FieldSpec, PrimitiveKind, Requiredness, TypeExpr};

#[derive(Parser)]
#[grammar = "typespec.pest"]
struct TypeSpecParser;

const MAX_DEPTH: usize = 128;

type PestResult<T> = std::result::Result<T, pest::error::Error<Rule>>;

pub fn parse(src: &str) -> Result<TypeExpr> {
    parse_document(src).map_err(|e| Error::Parse(Box::new(e)))
}

impl FromStr for TypeExpr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

fn parse_document(src: &str) -> PestResult<TypeExpr> {
    let mut pairs = TypeSpecParser::parse(Rule::document, src)?;
    let Some(document) = pairs.next() else {
        return Err(pest::error::Error::new_from_pos(
            ErrorVariant::CustomError { message: "empty document".into() },
            Position::from_start(src),
        ));
    };
    let span = document.as_span();
    let mut inner = document.into_inner();
    let root = next_pair(&mut inner, span)?;
    Builder { depth: 0 }.type_expr(root)
}

struct Builder {
    depth: usize,
}

impl Builder {
    /// `a | b` is a union; a lone term is just that term.
    fn type_expr(&mut self, pair: Pair<'_, Rule>) -> PestResult<TypeExpr> {
        let span = pair.as_span();
        let mut members = self.members(pair)?;
        match members.len() {
            0 => Err(custom(span, "empty type expression")),
            1 => Ok(members.remove(0)),
            _ => Ok(TypeExpr::Union(members)),
        }
    }

    fn members(&mut self, pair: Pair<'_, Rule>) -> PestResult<Vec<TypeExpr>> {
        if self.depth >= MAX_DEPTH {
            return Err(custom(
                pair.as_span(),
                format!("type expression nesting exceeds {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let members = pair
            .into_inner()
            .map(|term| self.term(term))
            .collect::<PestResult<Vec<_>>>();
        self.depth -= 1;
        members
    }

    fn term(&mut self, pair: Pair<'_, Rule>) -> PestResult<TypeExpr> {
        let span = pair.as_span();
        match pair.as_rule() {
            Rule::object => self.object(pair),
            Rule::array => {
                let element = next_pair(&mut pair.into_inner(), span)?;
                Ok(TypeExpr::array(self.type_expr(element)?))
            }
            Rule::symbol => {
                let value = next_pair(&mut pair.into_inner(), span)?;
                Ok(TypeExpr::Symbol(name_of(value)?))
            }
            Rule::null_lit => Ok(TypeExpr::Null),
            Rule::name => Ok(match PrimitiveKind::from_name(pair.as_str()) {
                Some(kind) => TypeExpr::Primitive(kind),
                None => TypeExpr::named(pair.as_str()),
            }),
            // parentheses always make a union, so `(x)` and `()` survive rendering
            Rule::group => match pair.into_inner().next() {
                Some(inner) => Ok(TypeExpr::Union(self.members(inner)?)),
                None => Ok(TypeExpr::Union(Vec::new())),
            },
            other => Err(custom(span, format!("unexpected {other:?}"))),
        }
    }

    fn object(&mut self, pair: Pair<'_, Rule>) -> PestResult<TypeExpr> {
        let mut fields: Vec<FieldSpec> = Vec::new();
        for field in pair.into_inner() {
            let span = field.as_span();
            let mut inner = field.into_inner();
            let key = name_of(next_pair(&mut inner, span)?)?;
            if fields.iter().any(|f| f.key == key) {
                return Err(custom(span, format!("duplicate field `{key}`")));
            }

            let mut next = next_pair(&mut inner, span)?;
            let requiredness = if next.as_rule() == Rule::marker {
                let requiredness = match next.as_str() {
                    "!" => Requiredness::Required,
                    _ => Requiredness::Optional,
                };
                next = next_pair(&mut inner, span)?;
                requiredness
            } else {
                Requiredness::Default
            };

            let ty = self.type_expr(next)?;
            fields.push(FieldSpec::new(key, requiredness, ty));
        }
        Ok(TypeExpr::Object(fields))
    }
}

fn name_of(pair: Pair<'_, Rule>) -> PestResult<String> {
    let span = pair.as_span();
    match pair.as_rule() {
        Rule::ident => Ok(pair.as_str().to_owned()),
        Rule::string => {
            let raw = next_pair(&mut pair.into_inner(), span)?;
            Ok(unescape(raw.as_str()))
        }
        other => Err(custom(span, format!("expected a name, found {other:?}"))),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, parent: Span<'i>) -> PestResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| custom(parent, "unexpected end of type expression"))
}

fn custom(span: Span<'_>, message: impl Into<String>) -> pest::error::Error<Rule> {
    pest::error::Error::new_from_span(
        ErrorVariant::CustomError { message: message.into() },
        span,
    )
}
