//! Search index generation.
//!
//! Flattens every block of every page into one record list for the
//! client-side search, plus an id → position lookup table because the
//! search library only hands back ids.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::html::strip_tags;
use crate::types::DocBlock;

/// Separator between the page pathname and the block index in a record id.
pub const ID_SEPARATOR: &str = "--gearsdoc--";

/// A flattened, tag-stripped block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub body: String,
}

/// Insert-only record list. Positions never change once assigned.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<SearchRecord>,
    lookup: HashMap<String, usize>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record per block of `relative_pathname` that has any content.
    pub fn index(&mut self, relative_pathname: &str, blocks: &[DocBlock]) {
        for (idx, block) in blocks.iter().enumerate() {
            let body = strip_tags(&block.html);
            if block.title.is_none() && block.signature.is_none() && body.trim().is_empty() {
                continue;
            }
            let id = record_id(relative_pathname, idx);
            if self.lookup.contains_key(&id) {
                tracing::debug!(%id, "duplicate search record id ignored");
                continue;
            }
            self.lookup.insert(id.clone(), self.records.len());
            self.records.push(SearchRecord {
                id,
                title: block.title.clone(),
                signature: block.signature.clone(),
                body,
            });
        }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn lookup(&self) -> &HashMap<String, usize> {
        &self.lookup
    }

    pub fn get(&self, id: &str) -> Option<&SearchRecord> {
        self.lookup.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record array as JSON.
    pub fn records_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }

    /// The id → position object as JSON, keys sorted for stable output.
    pub fn lookup_json(&self) -> String {
        let sorted: BTreeMap<&str, usize> =
            self.lookup.iter().map(|(id, &pos)| (id.as_str(), pos)).collect();
        serde_json::to_string(&sorted).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Build the id for block `index` of page `relative_pathname`.
pub fn record_id(relative_pathname: &str, index: usize) -> String {
    format!("{relative_pathname}{ID_SEPARATOR}{index}")
}
