//! Type expressions: the input side of the converter.
//!
//! A `TypeExpr` is a plain tree. Build one with the constructors below, with `|`
//! for unions, or parse the textual form (see [`crate::parse`]).
use std::fmt;
use std::ops::BitOr;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Integer,
    PosInteger,
    NonNegInteger,
    NegInteger,
    Float,
    Number,
    Boolean,
    /// An object with no declared fields.
    Object,
    Symbol,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    ArrayOf(Box<TypeExpr>),
    Object(Vec<FieldSpec>),
    /// Members in declaration order; may contain further unions.
    Union(Vec<TypeExpr>),
    /// A bare symbolic constant, only meaningful as a union member.
    Symbol(String),
    /// Only meaningful as a union member.
    Null,
    /// A type name nothing recognised. Always rejected by the converter.
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requiredness {
    Required,
    Optional,
    /// Not stated; derived from the field type's nullability.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub key: String,
    pub requiredness: Requiredness,
    pub ty: TypeExpr,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDERS
// ————————————————————————————————————————————————————————————————————————————

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 11] = [
        PrimitiveKind::String,
        PrimitiveKind::Integer,
        PrimitiveKind::PosInteger,
        PrimitiveKind::NonNegInteger,
        PrimitiveKind::NegInteger,
        PrimitiveKind::Float,
        PrimitiveKind::Number,
        PrimitiveKind::Boolean,
        PrimitiveKind::Object,
        PrimitiveKind::Symbol,
        PrimitiveKind::Any,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::PosInteger => "pos_integer",
            PrimitiveKind::NonNegInteger => "non_neg_integer",
            PrimitiveKind::NegInteger => "neg_integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Symbol => "symbol",
            PrimitiveKind::Any => "any",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl TypeExpr {
    pub fn string() -> Self { TypeExpr::Primitive(PrimitiveKind::String) }
    pub fn integer() -> Self { TypeExpr::Primitive(PrimitiveKind::Integer) }
    pub fn pos_integer() -> Self { TypeExpr::Primitive(PrimitiveKind::PosInteger) }
    pub fn non_neg_integer() -> Self { TypeExpr::Primitive(PrimitiveKind::NonNegInteger) }
    pub fn neg_integer() -> Self { TypeExpr::Primitive(PrimitiveKind::NegInteger) }
    pub fn float() -> Self { TypeExpr::Primitive(PrimitiveKind::Float) }
    pub fn number() -> Self { TypeExpr::Primitive(PrimitiveKind::Number) }
    pub fn boolean() -> Self { TypeExpr::Primitive(PrimitiveKind::Boolean) }
    pub fn untyped_object() -> Self { TypeExpr::Primitive(PrimitiveKind::Object) }
    pub fn any_symbol() -> Self { TypeExpr::Primitive(PrimitiveKind::Symbol) }
    pub fn any() -> Self { TypeExpr::Primitive(PrimitiveKind::Any) }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::ArrayOf(Box::new(element))
    }

    pub fn object(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        TypeExpr::Object(fields.into_iter().collect())
    }

    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Union(members.into_iter().collect())
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        TypeExpr::Symbol(value.into())
    }

    pub fn null() -> Self {
        TypeExpr::Null
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }
}

/// `a | b` always nests, so `a | b | c` is `Union[Union[a, b], c]`. The
/// classifier flattens it again.
impl BitOr for TypeExpr {
    type Output = TypeExpr;

    fn bitor(self, rhs: TypeExpr) -> TypeExpr {
        TypeExpr::Union(vec![self, rhs])
    }
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, requiredness: Requiredness, ty: TypeExpr) -> Self {
        FieldSpec { key: key.into(), requiredness, ty }
    }

    pub fn required(key: impl Into<String>, ty: TypeExpr) -> Self {
        Self::new(key, Requiredness::Required, ty)
    }

    pub fn optional(key: impl Into<String>, ty: TypeExpr) -> Self {
        Self::new(key, Requiredness::Optional, ty)
    }

    /// Requiredness is derived from the type: nullable types become optional.
    pub fn field(key: impl Into<String>, ty: TypeExpr) -> Self {
        Self::new(key, Requiredness::Default, ty)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TEXTUAL RENDERING
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(kind) => write!(f, "{kind}"),
            TypeExpr::ArrayOf(element) => write!(f, "[{element}]"),
            TypeExpr::Object(fields) => {
                f.write_str("{")?;
                for (ix, field) in fields.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str("}")
            }
            // `()` and `(x)` keep short unions distinct from a bare term
            TypeExpr::Union(members) if members.len() < 2 => {
                f.write_str("(")?;
                if let Some(member) = members.first() {
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            TypeExpr::Union(members) => {
                for (ix, member) in members.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(" | ")?;
                    }
                    // keep nesting visible so the rendering parses back to the same tree
                    match member {
                        TypeExpr::Union(inner) if inner.len() >= 2 => write!(f, "({member})")?,
                        _ => write!(f, "{member}")?,
                    }
                }
                Ok(())
            }
            TypeExpr::Symbol(value) => {
                f.write_str(":")?;
                write_name(f, value)
            }
            TypeExpr::Null => f.write_str("null"),
            TypeExpr::Named(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.key)?;
        match self.requiredness {
            Requiredness::Required => f.write_str("!")?,
            Requiredness::Optional => f.write_str("?")?,
            Requiredness::Default => {}
        }
        write!(f, ": {}", self.ty)
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bare when identifier-like, quoted otherwise.
fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_identifier(name) {
        return f.write_str(name);
    }
    f.write_str("\"")?;
    for c in name.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}
