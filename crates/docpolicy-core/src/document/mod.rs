//! Documents under classification
//!
//! A [`Document`] is a reference string, a case-insensitive multimap of
//! metadata fields, optional content streams and nested child documents.
//! For one evaluation pass a document is flattened into a [`DocumentTree`]
//! arena whose nodes carry the exclusion flag and the per-condition result
//! cache.

mod metadata;
mod tree;

pub use metadata::Metadata;
pub use tree::{DocumentId, DocumentTree, DocumentUnderEvaluation};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::borrow::Cow;

/// A named content stream attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStream {
    pub name: String,

    /// Raw content, base64 in serialized form
    #[serde(serialize_with = "serialize_content", deserialize_with = "deserialize_content")]
    pub content: Vec<u8>,
}

impl ContentStream {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

fn serialize_content<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(content))
}

fn deserialize_content<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

/// A document with metadata, streams and child documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub reference: String,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<ContentStream>,

    /// Child documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
}

impl Document {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Add a metadata value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.add(name, value);
        self
    }

    pub fn with_stream(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.streams.push(ContentStream::new(name, content));
        self
    }

    pub fn with_child(mut self, child: Document) -> Self {
        self.documents.push(child);
        self
    }

    /// Find a stream by name, case-insensitively
    pub fn stream(&self, name: &str) -> Option<&ContentStream> {
        self.streams
            .iter()
            .find(|stream| stream.name.eq_ignore_ascii_case(name))
    }

    /// SHA-256 digest of the document content and its children, ignoring the
    /// given metadata fields
    pub fn fingerprint(&self, ignored_fields: &[&str]) -> String {
        let mut hasher = Sha256::new();
        self.hash_into(&mut hasher, ignored_fields);
        format!("{:x}", hasher.finalize())
    }

    fn hash_into(&self, hasher: &mut Sha256, ignored_fields: &[&str]) {
        hash_part(hasher, self.reference.as_bytes());

        for (name, values) in self.metadata.iter() {
            if ignored_fields.iter().any(|f| f.eq_ignore_ascii_case(name)) {
                continue;
            }
            hash_part(hasher, name.to_lowercase().as_bytes());
            for value in values {
                hash_part(hasher, value.as_bytes());
            }
        }

        for stream in &self.streams {
            hash_part(hasher, stream.name.as_bytes());
            hash_part(hasher, &stream.content);
        }

        hasher.update((self.documents.len() as u64).to_le_bytes());
        for child in &self.documents {
            child.hash_into(hasher, ignored_fields);
        }
    }
}

fn hash_part(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
