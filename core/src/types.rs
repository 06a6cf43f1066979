//! Catalog records as the core sees them.
//!
//! # Design
//! The core never validates individual records, so `DrinkRecord` is a loose
//! string map rather than a rigid struct. Fields the catalog omits or sends as
//! `null` simply read back as `None`; unfamiliar fields are carried through to
//! the presentation untouched, in the order the catalog sent them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "idDrink";
pub const NAME_FIELD: &str = "strDrink";
pub const THUMBNAIL_FIELD: &str = "strDrinkThumb";
pub const CATEGORY_FIELD: &str = "strCategory";

/// One catalog entry, keyed by the catalog's own field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct DrinkRecord {
    fields: IndexMap<String, Option<String>>,
}

impl DrinkRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD)
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.get(THUMBNAIL_FIELD)
    }

    /// The catalog serves a downscaled image under `<thumbnail>/preview`.
    pub fn preview_url(&self) -> Option<String> {
        self.thumbnail_url().map(|thumb| format!("{thumb}/preview"))
    }

    /// The record's category, if it has a non-empty one.
    ///
    /// The coordinator only filters by categories that appeared in results
    /// it committed; see `Coordinator::begin_category_filter`.
    pub fn category(&self) -> Option<Category> {
        self.get(CATEGORY_FIELD)
            .filter(|c| !c.is_empty())
            .map(|c| Category(c.to_string()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl From<Map<String, Value>> for DrinkRecord {
    fn from(map: Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                };
                (key, value)
            })
            .collect();
        Self { fields }
    }
}

impl Serialize for DrinkRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A drink category taken from a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
