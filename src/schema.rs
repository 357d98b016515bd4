//! JSON-Schema-shaped output tree.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
}

/// One node of a produced schema.
///
/// Immutable once built; share it by reference (or behind an `Arc`) across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Scalar {
        ty: ScalarType,
        minimum: Option<i64>,
        maximum: Option<i64>,
        description: Option<String>,
    },
    /// No constraints at all.
    Empty { description: Option<String> },
    /// Always `"type": "string"`.
    Enum {
        values: Vec<String>,
        description: Option<String>,
    },
    Array {
        items: Box<SchemaNode>,
        description: Option<String>,
    },
    /// `additionalProperties` is always false.
    Object {
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
        description: Option<String>,
    },
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
            ScalarType::Object => "object",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ScalarType::String),
            "integer" => Some(ScalarType::Integer),
            "number" => Some(ScalarType::Number),
            "boolean" => Some(ScalarType::Boolean),
            "object" => Some(ScalarType::Object),
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    pub fn scalar(ty: ScalarType) -> Self {
        SchemaNode::Scalar { ty, minimum: None, maximum: None, description: None }
    }

    pub fn empty() -> Self {
        SchemaNode::Empty { description: None }
    }

    pub fn enumeration(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SchemaNode::Enum {
            values: values.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array { items: Box::new(items), description: None }
    }

    pub fn object(properties: IndexMap<String, SchemaNode>, required: Vec<String>) -> Self {
        SchemaNode::Object { properties, required, description: None }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar { description, .. }
            | SchemaNode::Empty { description }
            | SchemaNode::Enum { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Object { description, .. } => description.as_deref(),
        }
    }

    /// Replaces the description. `None` leaves the node untouched.
    pub fn with_description(mut self, text: Option<&str>) -> Self {
        let Some(text) = text else { return self };
        match &mut self {
            SchemaNode::Scalar { description, .. }
            | SchemaNode::Empty { description }
            | SchemaNode::Enum { description, .. }
            | SchemaNode::Array { description, .. }
            | SchemaNode::Object { description, .. } => *description = Some(text.to_owned()),
        }
        self
    }

    /// `Some` for every object node, even one with no properties; `None` otherwise.
    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match self {
            SchemaNode::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    pub fn required(&self) -> &[String] {
        match self {
            SchemaNode::Object { required, .. } => required,
            _ => &[],
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON SCHEMA DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    /// Render as a JSON Schema document. Key order is stable: `type` first,
    /// `description` last.
    pub fn to_json(&self) -> Value {
        let mut o = match self {
            SchemaNode::Scalar { ty, minimum, maximum, .. } => {
                let mut o = json!({ "type": ty.name() });
                if let Some(m) = *minimum {
                    o["minimum"] = Value::from(m);
                }
                if let Some(m) = *maximum {
                    o["maximum"] = Value::from(m);
                }
                o
            }
            SchemaNode::Empty { .. } => json!({}),
            SchemaNode::Enum { values, .. } => json!({
                "type": "string",
                "enum": values,
            }),
            SchemaNode::Array { items, .. } => json!({
                "type": "array",
                "items": items.to_json(),
            }),
            SchemaNode::Object { properties, required, .. } => {
                let mut map = Map::new();
                map.insert("type".into(), Value::from("object"));
                let props_map = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>();
                map.insert("properties".into(), Value::Object(props_map));
                if !required.is_empty() {
                    map.insert(
                        "required".into(),
                        Value::Array(required.iter().cloned().map(Value::from).collect()),
                    );
                }
                map.insert("additionalProperties".into(), Value::Bool(false));
                Value::Object(map)
            }
        };
        if let Some(text) = self.description() {
            o["description"] = Value::from(text);
        }
        o
    }

    /// Read back a document produced by [`SchemaNode::to_json`].
    pub fn from_json(value: &Value) -> Result<Self> {
        read_node(value, "#")
    }
}

fn read_node(value: &Value, path: &str) -> Result<SchemaNode> {
    let Value::Object(obj) = value else {
        return Err(Error::schema_document(path, "expected a schema object"));
    };

    let description = match obj.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => return Err(Error::schema_document(path, "`description` must be a string")),
    };
    let declared_type = match obj.get("type") {
        None => None,
        Some(Value::String(name)) => Some(name.as_str()),
        Some(_) => return Err(Error::schema_document(path, "`type` must be a string")),
    };

    let node = if let Some(values) = obj.get("enum") {
        if !matches!(declared_type, None | Some("string")) {
            return Err(Error::schema_document(path, "`enum` is only supported on strings"));
        }
        let Value::Array(values) = values else {
            return Err(Error::schema_document(path, "`enum` must be an array"));
        };
        let values = values
            .iter()
            .enumerate()
            .map(|(ix, v)| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| Error::schema_document(format!("{path}/enum/{ix}"), "expected a string"))
            })
            .collect::<Result<Vec<_>>>()?;
        SchemaNode::Enum { values, description }
    } else if let Some(items) = obj.get("items") {
        let items = read_node(items, &format!("{path}/items"))?;
        SchemaNode::Array { items: Box::new(items), description }
    } else if let Some(props) = obj.get("properties") {
        let Value::Object(props) = props else {
            return Err(Error::schema_document(path, "`properties` must be an object"));
        };
        let mut properties = IndexMap::with_capacity(props.len());
        for (name, sub) in props {
            let sub_path = format!("{path}/properties/{}", escape_pointer(name));
            properties.insert(name.clone(), read_node(sub, &sub_path)?);
        }
        let required = match obj.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .enumerate()
                .map(|(ix, v)| {
                    v.as_str().map(str::to_owned).ok_or_else(|| {
                        Error::schema_document(format!("{path}/required/{ix}"), "expected a string")
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::schema_document(path, "`required` must be an array")),
        };
        if !matches!(obj.get("additionalProperties"), None | Some(Value::Bool(false))) {
            return Err(Error::schema_document(path, "`additionalProperties` must be false"));
        }
        SchemaNode::Object { properties, required, description }
    } else {
        match declared_type {
            None => SchemaNode::Empty { description },
            Some("array") => return Err(Error::schema_document(path, "array schema without `items`")),
            Some(name) => {
                let ty = ScalarType::from_name(name).ok_or_else(|| {
                    Error::schema_document(path, format!("unsupported type `{name}`"))
                })?;
                SchemaNode::Scalar {
                    ty,
                    minimum: read_bound(obj, "minimum", path)?,
                    maximum: read_bound(obj, "maximum", path)?,
                    description,
                }
            }
        }
    };
    Ok(node)
}

fn read_bound(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<i64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| Error::schema_document(format!("{path}/{key}"), "expected an integer")),
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaNode::from_json(&value).map_err(serde::de::Error::custom)
    }
}
