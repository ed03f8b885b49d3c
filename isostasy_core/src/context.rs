// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-shape translator bookkeeping.
//!
//! [`TranslatorContext`] records, for every prim a translator has imported,
//! which host nodes the translator created, which translator identity did
//! the work, and a *unique key* — a hash of the prim's externally visible
//! content taken at import time. On the next resync the key answers "did
//! this prim actually change?" without re-reading host state, and the
//! translator identity answers "is this still the same kind of thing?" — a
//! mismatch there means removed-then-new, never update-in-place.
//!
//! The context lives and dies with the owning shape. On save it serializes
//! to a JSON blob held in a host string attribute; on load the blob's host
//! paths are re-resolved and records whose nodes no longer exist are
//! silently dropped.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::host::{HostGraph, HostNodeId};
use crate::path::PrimPath;

/// Bookkeeping for one imported prim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextEntry {
    /// Identity string of the translator that imported this prim.
    pub translator_id: String,
    /// Content hash of the prim at the time of the last import/update.
    pub unique_key: u64,
    /// Host nodes the translator created for this prim.
    pub nodes: Vec<HostNodeId>,
}

/// Serialized form of one entry; host nodes are stored as path strings and
/// re-resolved on load.
#[derive(Debug, Serialize, Deserialize)]
struct ContextRecord {
    prim_path: String,
    translator_id: String,
    unique_key: u64,
    host_paths: Vec<String>,
}

/// Map from imported prim path to translator bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslatorContext {
    entries: BTreeMap<PrimPath, ContextEntry>,
}

impl TranslatorContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether an entry exists for `path` imported by
    /// `translator_id`. An entry held by a different translator does not
    /// count — the prim's type changed out from under it.
    #[must_use]
    pub fn has_entry(&self, path: &PrimPath, translator_id: &str) -> bool {
        self.entries
            .get(path)
            .is_some_and(|e| e.translator_id == translator_id)
    }

    /// Returns the entry for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &PrimPath) -> Option<&ContextEntry> {
        self.entries.get(path)
    }

    /// Returns the host nodes created for `path` (empty if not imported).
    #[must_use]
    pub fn nodes(&self, path: &PrimPath) -> &[HostNodeId] {
        self.entries.get(path).map_or(&[], |e| e.nodes.as_slice())
    }

    /// Returns whether the stored unique key for `path` equals `key`.
    ///
    /// `false` when no entry exists.
    #[must_use]
    pub fn matches_key(&self, path: &PrimPath, key: u64) -> bool {
        self.entries.get(path).is_some_and(|e| e.unique_key == key)
    }

    /// Registers (or replaces) the entry for `path`.
    pub fn insert(
        &mut self,
        path: PrimPath,
        translator_id: impl Into<String>,
        unique_key: u64,
        nodes: Vec<HostNodeId>,
    ) {
        self.entries.insert(
            path,
            ContextEntry {
                translator_id: translator_id.into(),
                unique_key,
                nodes,
            },
        );
    }

    /// Adds a host node to an existing entry (translators call this when an
    /// import emits more than one node).
    pub fn append_node(&mut self, path: &PrimPath, node: HostNodeId) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.nodes.push(node);
        }
    }

    /// Refreshes the stored unique key for `path` after an update.
    pub fn update_unique_key(&mut self, path: &PrimPath, key: u64) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.unique_key = key;
        }
    }

    /// Returns every context path at or beneath `path`, deepest-first.
    ///
    /// This is the set of entries a teardown of `path` takes with it;
    /// callers remove them (and their chains) before the entry for `path`
    /// itself is gone.
    #[must_use]
    pub fn pre_remove_entry(&self, path: &PrimPath) -> Vec<PrimPath> {
        let mut affected: Vec<PrimPath> = self
            .entries
            .keys()
            .filter(|p| p.has_prefix(path))
            .cloned()
            .collect();
        affected.reverse();
        affected
    }

    /// Removes the entry for `path`, returning it if present.
    pub fn remove(&mut self, path: &PrimPath) -> Option<ContextEntry> {
        self.entries.remove(path)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrimPath, &ContextEntry)> {
        self.entries.iter()
    }

    /// Serializes the context to its JSON blob. Entries whose nodes have all
    /// gone stale are skipped.
    #[must_use]
    pub fn serialize(&self, host: &dyn HostGraph) -> String {
        let records: Vec<ContextRecord> = self
            .entries
            .iter()
            .filter_map(|(path, entry)| {
                let host_paths: Vec<String> = entry
                    .nodes
                    .iter()
                    .filter_map(|&n| host.node_path(n))
                    .collect();
                if host_paths.is_empty() && !entry.nodes.is_empty() {
                    return None;
                }
                Some(ContextRecord {
                    prim_path: path.as_str().into(),
                    translator_id: entry.translator_id.clone(),
                    unique_key: entry.unique_key,
                    host_paths,
                })
            })
            .collect();
        serde_json::to_string(&records).unwrap_or_default()
    }

    /// Restores a context from its JSON blob.
    ///
    /// Host paths that no longer resolve are dropped per node; a record
    /// whose nodes are all gone is dropped entirely. A malformed blob
    /// restores as empty — stale bookkeeping must never crash a scene open.
    #[must_use]
    pub fn deserialize(blob: &str, host: &dyn HostGraph) -> Self {
        let Ok(records) = serde_json::from_str::<Vec<ContextRecord>>(blob) else {
            return Self::default();
        };
        let mut entries = BTreeMap::new();
        for record in records {
            if !record.prim_path.starts_with('/') {
                continue;
            }
            let nodes: Vec<HostNodeId> = record
                .host_paths
                .iter()
                .filter_map(|p| host.find_node(p))
                .collect();
            if nodes.is_empty() && !record.host_paths.is_empty() {
                continue;
            }
            entries.insert(
                PrimPath::new(&record.prim_path),
                ContextEntry {
                    translator_id: record.translator_id,
                    unique_key: record.unique_key,
                    nodes,
                },
            );
        }
        Self { entries }
    }
}
