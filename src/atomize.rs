//! Re-key decoded JSON using a schema as the authority.
//!
//! Recognised property names become [`Symbol`] keys, enum-typed string values
//! become [`Symbol`] values. Everything else, unknown keys included, passes
//! through unchanged. Atomization never fails.
use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::schema::SchemaNode;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A symbolic name. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Symbol(Symbol),
    /// A key the schema did not recognise, kept verbatim.
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Atomized {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Symbol(Symbol),
    Array(Vec<Atomized>),
    Object(IndexMap<Key, Atomized>),
}

// ————————————————————————————————————————————————————————————————————————————
// ATOMIZE
// ————————————————————————————————————————————————————————————————————————————

/// Non-object schemas (and non-mapping data) come back unchanged.
pub fn atomize(schema: &SchemaNode, data: &Value) -> Atomized {
    let (Some(properties), Value::Object(map)) = (schema.properties(), data) else {
        return Atomized::from(data);
    };

    let mut out = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        match properties.get(key) {
            Some(property) => {
                out.insert(Key::Symbol(Symbol::new(key.as_str())), atomize_value(property, value));
            }
            None => {
                tracing::trace!(key = %key, "unrecognised key kept as string");
                out.insert(Key::String(key.clone()), Atomized::from(value));
            }
        }
    }
    Atomized::Object(out)
}

/// Transform one property value according to its schema node.
pub fn atomize_value(schema: &SchemaNode, value: &Value) -> Atomized {
    match (schema, value) {
        (SchemaNode::Object { .. }, _) => atomize(schema, value),
        (SchemaNode::Array { items, .. }, Value::Array(xs)) => {
            Atomized::Array(xs.iter().map(|x| atomize_value(items, x)).collect())
        }
        (SchemaNode::Enum { .. }, Value::String(s)) => Atomized::Symbol(Symbol::new(s.as_str())),
        _ => Atomized::from(value),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Key {
    pub fn symbol(name: impl Into<String>) -> Self {
        Key::Symbol(Symbol::new(name))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Key::String(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Key::Symbol(symbol) => symbol.as_str(),
            Key::String(s) => s,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Key::Symbol(_))
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Atomized {
    pub fn object(entries: impl IntoIterator<Item = (Key, Atomized)>) -> Self {
        Atomized::Object(entries.into_iter().collect())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Atomized::Symbol(Symbol::new(name))
    }

    /// Looks up the symbolic key first, then the verbatim string key.
    pub fn get(&self, name: &str) -> Option<&Atomized> {
        let Atomized::Object(map) = self else { return None };
        map.get(&Key::symbol(name)).or_else(|| map.get(&Key::string(name)))
    }

    /// Plain JSON again; symbols turn back into strings.
    pub fn to_json(&self) -> Value {
        match self {
            Atomized::Null => Value::Null,
            Atomized::Bool(b) => Value::Bool(*b),
            Atomized::Number(n) => Value::Number(n.clone()),
            Atomized::String(s) => Value::String(s.clone()),
            Atomized::Symbol(symbol) => Value::String(symbol.0.clone()),
            Atomized::Array(xs) => Value::Array(xs.iter().map(Atomized::to_json).collect()),
            Atomized::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.as_str().to_owned(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Atomized {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Atomized::Null,
            Value::Bool(b) => Atomized::Bool(*b),
            Value::Number(n) => Atomized::Number(n.clone()),
            Value::String(s) => Atomized::String(s.clone()),
            Value::Array(xs) => Atomized::Array(xs.iter().map(Atomized::from).collect()),
            Value::Object(map) => Atomized::Object(
                map.iter()
                    .map(|(k, v)| (Key::String(k.clone()), Atomized::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Atomized {
    fn from(value: Value) -> Self {
        Atomized::from(&value)
    }
}

impl From<&str> for Atomized {
    fn from(s: &str) -> Self {
        Atomized::String(s.to_owned())
    }
}

impl From<i64> for Atomized {
    fn from(n: i64) -> Self {
        Atomized::Number(n.into())
    }
}

impl From<bool> for Atomized {
    fn from(b: bool) -> Self {
        Atomized::Bool(b)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TERM RENDERING
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if crate::expr::is_identifier(&self.0) {
            write!(f, ":{}", self.0)
        } else {
            write!(f, ":{}", Value::from(self.0.as_str()))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(symbol) => write!(f, "{symbol}"),
            Key::String(s) => write!(f, "{}", Value::from(s.as_str())),
        }
    }
}

/// `{:name => "Alice", "extra" => 1, :role => :admin}`
impl fmt::Display for Atomized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atomized::Null => f.write_str("null"),
            Atomized::Bool(b) => write!(f, "{b}"),
            Atomized::Number(n) => write!(f, "{n}"),
            Atomized::String(s) => write!(f, "{}", Value::from(s.as_str())),
            Atomized::Symbol(symbol) => write!(f, "{symbol}"),
            Atomized::Array(xs) => {
                f.write_str("[")?;
                for (ix, x) in xs.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
            Atomized::Object(map) => {
                f.write_str("{")?;
                for (ix, (k, v)) in map.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} => {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
