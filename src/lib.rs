//! Type expressions → JSON Schema, and schema-driven re-keying of decoded JSON.
//!
//! ```
//! use json_typespec::{atomize, convert, parse, Atomized, Descriptions};
//! use serde_json::json;
//!
//! let expr = parse("{name!: string, age?: integer, role: :admin | :user}").unwrap();
//! let schema = convert(&expr, &Descriptions::new()).unwrap();
//! assert_eq!(schema.required(), ["name", "role"]);
//!
//! let data = atomize(&schema, &json!({"name": "Alice", "role": "admin"}));
//! assert_eq!(data.get("role"), Some(&Atomized::symbol("admin")));
//! ```
pub mod atomize;
pub mod convert;
pub mod descriptions;
pub mod error;
pub mod expr;
pub mod parse;
pub mod schema;
mod union;

pub use atomize::{atomize, atomize_value, Atomized, Key, Symbol};
pub use convert::{convert, convert_with_options};
pub use descriptions::Descriptions;
pub use error::{Error, Result};
pub use expr::{FieldSpec, PrimitiveKind, Requiredness, TypeExpr};
pub use parse::parse;
pub use schema::{ScalarType, SchemaNode};

/// Parse the textual form and convert it in one step.
pub fn schema_from_source(src: &str, descriptions: &Descriptions) -> Result<SchemaNode> {
    let expr = parse(src)?;
    convert(&expr, descriptions)
}
