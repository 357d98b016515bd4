//! Field-name → description lookup used by the converter.
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};

/// Validated before any conversion starts; lookups are by field name at every depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptions(IndexMap<String, String>);

impl Descriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accepts an object of name → string. `null` entries count as absent.
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw = serde_path_to_error::deserialize::<_, IndexMap<String, Option<String>>>(value)
            .map_err(with_path)?;
        Self::from_raw(raw)
    }

    /// Same as [`Descriptions::from_json`], from source text.
    pub fn from_json_str(src: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let raw = serde_path_to_error::deserialize::<_, IndexMap<String, Option<String>>>(&mut *de)
            .map_err(with_path)?;
        de.end()
            .map_err(|e| Error::InvalidDescriptionOption(format!("trailing input → {e}")))?;
        Self::from_raw(raw)
    }

    /// Builds from name/text pairs, with the same checks as [`Descriptions::from_json`].
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_raw(pairs.into_iter().map(|(k, v)| (k.into(), Some(v.into()))).collect())
    }

    fn from_raw(raw: IndexMap<String, Option<String>>) -> Result<Self> {
        let mut out = IndexMap::with_capacity(raw.len());
        for (name, text) in raw {
            if name.trim().is_empty() {
                return Err(Error::InvalidDescriptionOption(
                    "field names must not be empty".to_owned(),
                ));
            }
            if let Some(text) = text {
                out.insert(name, text);
            }
        }
        Ok(Descriptions(out))
    }
}

fn with_path<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> Error {
    let path = err.path().to_string();
    Error::InvalidDescriptionOption(format!("at {path} → {}", err.into_inner()))
}
