//! Per-pass document tree
//!
//! The document hierarchy is flattened into an arena addressed by
//! [`DocumentId`]. Nodes own the exclusion flag and the per-condition result
//! cache, so a tree lives exactly as long as one evaluation pass.

use super::{ContentStream, Document, Metadata};
use crate::error::{CoreError, Result};
use crate::result::ConditionEvaluationResult;
use crate::ConditionId;
use std::borrow::Cow;
use std::collections::HashMap;

/// Handle of a node in a [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(usize);

impl DocumentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A document wrapped for one evaluation pass
#[derive(Debug)]
pub struct DocumentUnderEvaluation {
    reference: String,
    metadata: Metadata,
    streams: Vec<ContentStream>,
    parent: Option<DocumentId>,
    children: Vec<DocumentId>,
    depth: usize,
    excluded: bool,
    results: HashMap<ConditionId, ConditionEvaluationResult>,
}

impl DocumentUnderEvaluation {
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn streams(&self) -> &[ContentStream] {
        &self.streams
    }

    pub fn stream(&self, name: &str) -> Option<&ContentStream> {
        self.streams
            .iter()
            .find(|stream| stream.name.eq_ignore_ascii_case(name))
    }

    /// Metadata values of a field plus the text of a stream with the same name
    pub fn field_values(&self, name: &str) -> Vec<Cow<'_, str>> {
        let mut values: Vec<Cow<'_, str>> = self
            .metadata
            .get(name)
            .map(|values| values.iter().map(|v| Cow::Borrowed(v.as_str())).collect())
            .unwrap_or_default();

        if let Some(stream) = self.stream(name) {
            values.push(stream.text());
        }
        values
    }

    pub fn parent(&self) -> Option<DocumentId> {
        self.parent
    }

    pub fn children(&self) -> &[DocumentId] {
        &self.children
    }

    /// Depth below the root (the root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn set_excluded(&mut self, excluded: bool) {
        self.excluded = excluded;
    }

    /// Cached result of a condition on this document, if evaluated in this pass
    pub fn condition_evaluation_result(
        &self,
        condition_id: ConditionId,
    ) -> Option<&ConditionEvaluationResult> {
        self.results.get(&condition_id)
    }

    pub fn cache_condition_evaluation_result(
        &mut self,
        condition_id: ConditionId,
        result: ConditionEvaluationResult,
    ) {
        self.results.insert(condition_id, result);
    }

    pub fn cached_result_count(&self) -> usize {
        self.results.len()
    }
}

/// Arena of the documents of one evaluation pass
#[derive(Debug)]
pub struct DocumentTree {
    nodes: Vec<DocumentUnderEvaluation>,
}

impl DocumentTree {
    /// Flatten a document and all of its descendants. The root is `DocumentId(0)`.
    pub fn from_document(document: Document) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(document, None, 0);
        tree
    }

    fn push(&mut self, document: Document, parent: Option<DocumentId>, depth: usize) -> DocumentId {
        let id = DocumentId(self.nodes.len());
        let Document {
            reference,
            metadata,
            streams,
            documents,
        } = document;

        self.nodes.push(DocumentUnderEvaluation {
            reference,
            metadata,
            streams,
            parent,
            children: Vec::with_capacity(documents.len()),
            depth,
            excluded: false,
            results: HashMap::new(),
        });

        for child in documents {
            let child_id = self.push(child, Some(id), depth + 1);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> DocumentId {
        DocumentId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    ///
    /// Ids are only created by this tree, so an unknown id is a caller bug and
    /// panics like slice indexing does. Use [`DocumentTree::get`] to check.
    pub fn node(&self, id: DocumentId) -> &DocumentUnderEvaluation {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: DocumentId) -> &mut DocumentUnderEvaluation {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: DocumentId) -> Result<&DocumentUnderEvaluation> {
        self.nodes.get(id.0).ok_or(CoreError::UnknownDocument(id.0))
    }

    pub fn children(&self, id: DocumentId) -> &[DocumentId] {
        &self.nodes[id.0].children
    }

    /// Every descendant of a document at every depth, in pre-order
    pub fn descendants(&self, id: DocumentId) -> Vec<DocumentId> {
        let mut result = Vec::new();
        let mut stack: Vec<DocumentId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        result
    }

    pub fn is_excluded(&self, id: DocumentId) -> bool {
        self.nodes[id.0].excluded
    }

    /// Exclude a document and all of its descendants
    pub fn exclude_subtree(&mut self, id: DocumentId) {
        self.nodes[id.0].excluded = true;
        for descendant in self.descendants(id) {
            self.nodes[descendant.0].excluded = true;
        }
    }

    /// Drop every cached condition result
    pub fn clear_results(&mut self) {
        for node in &mut self.nodes {
            node.results.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &DocumentUnderEvaluation)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (DocumentId(index), node))
    }
}
