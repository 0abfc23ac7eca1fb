//! Case-insensitive metadata multimap

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to one or more string values.
///
/// Lookups ignore case. The spelling of the first insert of a field is kept
/// for iteration and serialization; iteration order is by lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, FieldValues>", into = "BTreeMap<String, Vec<String>>")]
pub struct Metadata {
    fields: BTreeMap<String, MetadataField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MetadataField {
    name: String,
    values: Vec<String>,
}

/// Serialized form of a field: a single value or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValues {
    One(String),
    Many(Vec<String>),
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a field
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.fields
            .entry(name.to_lowercase())
            .or_insert_with(|| MetadataField {
                name,
                values: Vec::new(),
            })
            .values
            .push(value.into());
    }

    /// Append several values to a field
    pub fn put_all<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.into();
        for value in values {
            self.add(name.clone(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields
            .get(&name.to_lowercase())
            .map(|field| field.values.as_slice())
    }

    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Remove a field, returning its values
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.fields
            .remove(&name.to_lowercase())
            .map(|field| field.values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_lowercase())
    }

    /// Number of distinct fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .values()
            .map(|field| (field.name.as_str(), field.values.as_slice()))
    }
}

impl From<BTreeMap<String, FieldValues>> for Metadata {
    fn from(map: BTreeMap<String, FieldValues>) -> Self {
        let mut metadata = Metadata::new();
        for (name, values) in map {
            match values {
                FieldValues::One(value) => metadata.add(name, value),
                FieldValues::Many(values) => metadata.put_all(name, values),
            }
        }
        metadata
    }
}

impl From<Metadata> for BTreeMap<String, Vec<String>> {
    fn from(metadata: Metadata) -> Self {
        metadata
            .fields
            .into_values()
            .map(|field| (field.name, field.values))
            .collect()
    }
}
