use crate::expr::TypeExpr;
use crate::parse::Rule;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The converter has no rule for this shape; carries the offending sub-expression.
    #[error("unsupported type expression `{0}`")]
    UnsupportedTypeExpression(Box<TypeExpr>),

    /// The description mapping is not a name → string mapping.
    #[error("invalid description option: {0}")]
    InvalidDescriptionOption(String),

    #[error("failed to parse type expression:\n{0}")]
    Parse(#[from] Box<pest::error::Error<Rule>>),

    #[error("invalid schema document at {path}: {reason}")]
    InvalidSchemaDocument { path: String, reason: String },
}

impl Error {
    pub(crate) fn unsupported(expr: &TypeExpr) -> Self {
        Error::UnsupportedTypeExpression(Box::new(expr.clone()))
    }

    pub(crate) fn schema_document(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSchemaDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
