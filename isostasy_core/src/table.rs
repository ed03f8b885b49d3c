// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted transform table.
//!
//! The table maps stage paths to host transform nodes together with three
//! independent reasons the node might need to exist:
//!
//! - **Required** — the path is an ancestor of an imported prim.
//! - **Selection** — the prim is selected in the host UI.
//! - **Requested** — the path was explicitly asked for by name through the
//!   public API; this one is a saturating counter, not a flag, because the
//!   same path can be requested from several call sites.
//!
//! Invariant: an entry exists in the table iff at least one of the three
//! counts is nonzero. Entries whose counts have all dropped to zero are
//! erased (and their host nodes destroyed) by [`cleanup`], never inline, so
//! a batch of releases produces one destruction pass instead of per-level
//! churn.
//!
//! The table never controls the host node's lifetime directly; it holds a
//! generational handle and re-checks liveness through
//! [`HostGraph::is_alive`] before every dereference, so nodes deleted
//! out-of-band read as "entry absent" instead of crashing.
//!
//! [`cleanup`]: TransformTable::cleanup

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use crate::host::{HostGraph, HostNodeId};
use crate::path::PrimPath;

/// Why a transform node is being acquired or released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformReason {
    /// The prim is selected in the host UI.
    Selection,
    /// The path is required as ancestry for an imported prim.
    Required,
    /// The path was explicitly requested by name.
    Requested,
}

/// One table entry: a host node handle plus the three usage counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformReference {
    /// Handle of the backing host transform node.
    pub node: HostNodeId,
    required: bool,
    selected: bool,
    requested: u32,
}

impl TransformReference {
    /// Returns whether any reason still holds this entry.
    #[must_use]
    pub fn is_referenced(&self) -> bool {
        self.required || self.selected || self.requested > 0
    }

    /// Returns the required flag.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns the selected flag.
    #[must_use]
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Returns the requested refcount.
    #[must_use]
    pub fn requested(&self) -> u32 {
        self.requested
    }

    fn count(&mut self, reason: TransformReason, up: bool) {
        match reason {
            TransformReason::Selection => self.selected = up,
            TransformReason::Required => self.required = up,
            TransformReason::Requested => {
                self.requested = if up {
                    self.requested.saturating_add(1)
                } else {
                    self.requested.saturating_sub(1)
                };
            }
        }
    }
}

/// Map from stage path to reference-counted host transform node.
#[derive(Debug, Default)]
pub struct TransformTable {
    entries: BTreeMap<PrimPath, TransformReference>,
}

impl TransformTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `path`, if present.
    #[must_use]
    pub fn get(&self, path: &PrimPath) -> Option<&TransformReference> {
        self.entries.get(path)
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in path order (ancestors before descendants).
    pub fn iter(&self) -> impl Iterator<Item = (&PrimPath, &TransformReference)> {
        self.entries.iter()
    }

    /// Increments `reason` on an existing entry and returns its node handle.
    ///
    /// Returns `None` if no entry exists for `path` *or* the entry's node is
    /// stale — the stale entry is dropped on the spot, and the caller is
    /// expected to create a fresh node and [`insert`](Self::insert) it.
    pub fn acquire(
        &mut self,
        path: &PrimPath,
        reason: TransformReason,
        host: &dyn HostGraph,
    ) -> Option<HostNodeId> {
        if let Some(entry) = self.entries.get_mut(path) {
            if host.is_alive(entry.node) {
                entry.count(reason, true);
                return Some(entry.node);
            }
            // Node deleted out-of-band; stale bookkeeping reads as absent.
            self.entries.remove(path);
        }
        None
    }

    /// Registers a freshly created node under `path` with `reason` held.
    ///
    /// # Panics
    ///
    /// Panics if an entry already exists for `path` (callers must go through
    /// [`acquire`](Self::acquire) first).
    pub fn insert(&mut self, path: PrimPath, node: HostNodeId, reason: TransformReason) {
        let mut entry = TransformReference {
            node,
            required: false,
            selected: false,
            requested: 0,
        };
        entry.count(reason, true);
        let previous = self.entries.insert(path.clone(), entry);
        assert!(previous.is_none(), "duplicate table entry for {path}");
    }

    /// Decrements `reason` for `path`.
    ///
    /// Releasing an absent path, or a reason already at zero, is a no-op —
    /// callers routinely race with out-of-band deletion. The entry is kept
    /// even at all-zero counts; [`cleanup`](Self::cleanup) erases it.
    pub fn release(&mut self, path: &PrimPath, reason: TransformReason) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.count(reason, false);
        }
    }

    /// Erases every entry whose three counts are all zero, destroying the
    /// backing host node when it is still alive.
    ///
    /// Idempotent: a second call with no intervening releases removes
    /// nothing. Entries are visited deepest-first so children are destroyed
    /// before their parents. Returns the number of entries erased.
    pub fn cleanup(&mut self, host: &mut dyn HostGraph) -> usize {
        let dead: Vec<PrimPath> = self
            .entries
            .iter()
            .rev()
            .filter(|(_, e)| !e.is_referenced())
            .map(|(p, _)| p.clone())
            .collect();
        for path in &dead {
            if let Some(entry) = self.entries.remove(path) {
                // Fail-safe guard; unreachable unless the refcount check
                // above is broken.
                if entry.is_referenced() {
                    log::warn!("refusing to destroy {path}: still referenced");
                    self.entries.insert(path.clone(), entry);
                    continue;
                }
                if host.is_alive(entry.node) {
                    host.delete_node(entry.node);
                }
            }
        }
        dead.len()
    }

    /// Serializes the table into the persisted string blob.
    ///
    /// One record per live entry, `;`-delimited:
    /// `hostNodePath primPath requiredFlag selectedFlag requestedCount`.
    /// Entries whose node is stale are skipped.
    #[must_use]
    pub fn serialize(&self, host: &dyn HostGraph) -> String {
        let mut blob = String::new();
        for (path, entry) in &self.entries {
            let Some(host_path) = host.node_path(entry.node) else {
                continue;
            };
            if !blob.is_empty() {
                blob.push(';');
            }
            let _ = write!(
                blob,
                "{host_path} {path} {} {} {}",
                u8::from(entry.required),
                u8::from(entry.selected),
                entry.requested
            );
        }
        blob
    }

    /// Restores a table from a persisted blob.
    ///
    /// Each record's host path is re-resolved through the host's
    /// lookup-by-name facility; records that no longer resolve — the node
    /// was deleted while the file was closed — are silently dropped, as are
    /// malformed records. Stale bookkeeping must never crash a restore.
    #[must_use]
    pub fn deserialize(blob: &str, host: &dyn HostGraph) -> Self {
        let mut entries = BTreeMap::new();
        for record in blob.split(';') {
            let mut fields = record.split_whitespace();
            let (Some(host_path), Some(prim_path), Some(req), Some(sel), Some(count)) = (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) else {
                continue;
            };
            let Some(node) = host.find_node(host_path) else {
                continue;
            };
            let (Ok(required), Ok(selected), Ok(requested)) =
                (req.parse::<u8>(), sel.parse::<u8>(), count.parse::<u32>())
            else {
                continue;
            };
            if !prim_path.starts_with('/') {
                continue;
            }
            entries.insert(
                PrimPath::new(prim_path),
                TransformReference {
                    node,
                    required: required != 0,
                    selected: selected != 0,
                    requested,
                },
            );
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;
    use crate::transform::Matrix4;

    /// Minimal host double: nodes are never really created, handles are
    /// alive unless explicitly killed.
    #[derive(Debug, Default)]
    struct FlatHost {
        next: u32,
        dead: alloc::vec::Vec<HostNodeId>,
        deleted: alloc::vec::Vec<HostNodeId>,
    }

    impl FlatHost {
        fn kill(&mut self, id: HostNodeId) {
            self.dead.push(id);
        }
    }

    impl HostGraph for FlatHost {
        fn create_transform(&mut self, _name: &str, _parent: Option<HostNodeId>) -> HostNodeId {
            let id = HostNodeId::from_raw(self.next, 0);
            self.next += 1;
            id
        }
        fn delete_node(&mut self, id: HostNodeId) {
            if self.is_alive(id) {
                self.deleted.push(id);
                self.dead.push(id);
            }
        }
        fn reparent(&mut self, _node: HostNodeId, _new_parent: Option<HostNodeId>) {}
        fn is_alive(&self, id: HostNodeId) -> bool {
            id.index() < self.next && !self.dead.contains(&id)
        }
        fn node_path(&self, id: HostNodeId) -> Option<String> {
            self.is_alive(id).then(|| format!("|n{}", id.index()))
        }
        fn find_node(&self, host_path: &str) -> Option<HostNodeId> {
            let idx: u32 = host_path.strip_prefix("|n")?.parse().ok()?;
            let id = HostNodeId::from_raw(idx, 0);
            self.is_alive(id).then_some(id)
        }
        fn set_string_attr(&mut self, _id: HostNodeId, _name: &str, _value: &str) {}
        fn string_attr(&self, _id: HostNodeId, _name: &str) -> Option<String> {
            None
        }
        fn set_local_matrix(&mut self, _id: HostNodeId, _matrix: Matrix4) {}
        fn local_matrix(&self, _id: HostNodeId) -> Option<Matrix4> {
            None
        }
    }

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s)
    }

    #[test]
    fn entry_exists_iff_some_reason_held() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let node = host.create_transform("a", None);

        table.insert(path("/a"), node, TransformReason::Required);
        table.acquire(&path("/a"), TransformReason::Selection, &host);
        table.acquire(&path("/a"), TransformReason::Requested, &host);

        table.release(&path("/a"), TransformReason::Required);
        table.cleanup(&mut host);
        assert!(table.get(&path("/a")).is_some(), "selection still holds");

        table.release(&path("/a"), TransformReason::Selection);
        table.cleanup(&mut host);
        assert!(table.get(&path("/a")).is_some(), "request still holds");

        table.release(&path("/a"), TransformReason::Requested);
        let removed = table.cleanup(&mut host);
        assert_eq!(removed, 1);
        assert!(table.get(&path("/a")).is_none());
        assert!(host.deleted.contains(&node), "node should be destroyed");
    }

    #[test]
    fn requested_is_a_counter() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let node = host.create_transform("a", None);

        table.insert(path("/a"), node, TransformReason::Requested);
        table.acquire(&path("/a"), TransformReason::Requested, &host);
        assert_eq!(table.get(&path("/a")).unwrap().requested(), 2);

        table.release(&path("/a"), TransformReason::Requested);
        table.cleanup(&mut host);
        assert!(table.get(&path("/a")).is_some(), "one request remains");

        table.release(&path("/a"), TransformReason::Requested);
        // Saturating: extra releases never underflow.
        table.release(&path("/a"), TransformReason::Requested);
        table.cleanup(&mut host);
        assert!(table.get(&path("/a")).is_none());
    }

    #[test]
    fn release_absent_path_is_noop() {
        let mut table = TransformTable::new();
        table.release(&path("/missing"), TransformReason::Required);
        assert!(table.is_empty());
    }

    #[test]
    fn release_zero_reason_is_noop() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let node = host.create_transform("a", None);
        table.insert(path("/a"), node, TransformReason::Required);

        // Selection was never acquired; releasing it changes nothing.
        table.release(&path("/a"), TransformReason::Selection);
        assert!(table.get(&path("/a")).unwrap().required());
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let node = host.create_transform("a", None);
        table.insert(path("/a"), node, TransformReason::Required);
        table.release(&path("/a"), TransformReason::Required);

        assert_eq!(table.cleanup(&mut host), 1);
        assert_eq!(table.cleanup(&mut host), 0);
        assert_eq!(host.deleted.len(), 1, "node destroyed exactly once");
    }

    #[test]
    fn cleanup_destroys_children_before_parents() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let a = host.create_transform("a", None);
        let b = host.create_transform("b", None);
        table.insert(path("/a"), a, TransformReason::Required);
        table.insert(path("/a/b"), b, TransformReason::Required);
        table.release(&path("/a"), TransformReason::Required);
        table.release(&path("/a/b"), TransformReason::Required);

        table.cleanup(&mut host);
        assert_eq!(host.deleted, alloc::vec![b, a]);
    }

    #[test]
    fn acquire_stale_entry_reads_as_absent() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let node = host.create_transform("a", None);
        table.insert(path("/a"), node, TransformReason::Required);

        host.kill(node);
        assert_eq!(
            table.acquire(&path("/a"), TransformReason::Required, &host),
            None
        );
        assert!(table.get(&path("/a")).is_none(), "stale entry dropped");
    }

    #[test]
    fn serialize_round_trips() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let a = host.create_transform("a", None);
        let b = host.create_transform("b", None);
        table.insert(path("/a"), a, TransformReason::Required);
        table.insert(path("/a/b"), b, TransformReason::Selection);
        table.acquire(&path("/a/b"), TransformReason::Requested, &host);
        table.acquire(&path("/a/b"), TransformReason::Requested, &host);

        let blob = table.serialize(&host);
        let restored = TransformTable::deserialize(&blob, &host);

        assert_eq!(restored.len(), 2);
        let ea = restored.get(&path("/a")).unwrap();
        assert!(ea.required() && !ea.selected());
        assert_eq!(ea.requested(), 0);
        let eb = restored.get(&path("/a/b")).unwrap();
        assert!(eb.selected() && !eb.required());
        assert_eq!(eb.requested(), 2);
        assert_eq!(eb.node, b);
    }

    #[test]
    fn deserialize_drops_unresolvable_records() {
        let mut host = FlatHost::default();
        let mut table = TransformTable::new();
        let a = host.create_transform("a", None);
        let b = host.create_transform("b", None);
        table.insert(path("/a"), a, TransformReason::Required);
        table.insert(path("/b"), b, TransformReason::Required);

        let blob = table.serialize(&host);
        host.kill(b);

        let restored = TransformTable::deserialize(&blob, &host);
        assert_eq!(restored.len(), 1);
        assert!(restored.get(&path("/a")).is_some());
        assert!(restored.get(&path("/b")).is_none());
    }

    #[test]
    fn deserialize_tolerates_garbage() {
        let host = FlatHost::default();
        let restored = TransformTable::deserialize("not a record;;|n0", &host);
        assert!(restored.is_empty());

        let restored = TransformTable::deserialize("", &host);
        assert!(restored.is_empty());
    }
}
