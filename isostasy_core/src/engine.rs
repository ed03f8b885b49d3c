// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The resync orchestrator.
//!
//! [`SyncEngine`] owns everything one shape instance needs to keep its slice
//! of the host graph consistent with the composed stage: the transform
//! table, the translator context and registry, the pending-resync state, and
//! the persisted-session plumbing. It runs entirely on the host's main
//! thread, driven by explicit event values — [`StageNotice`] from the stage,
//! [`HostEvent`] from the host — so every transition is testable without a
//! real event loop.
//!
//! # State machine
//!
//! ```text
//!   Idle ──structural notice──► CompositionChangePending
//!     ▲                                   │ flush()
//!     │                                   ▼
//!     └──────────────────────────── Processing
//! ```
//!
//! Structural notices are *coalesced*, not queued: the first changed path in
//! a cycle owns the resync, and later paths in the same cycle only
//! contribute teardown candidates. A scripted batch of variant switches thus
//! resolves once against the final composition instead of replaying
//! intermediate states that would create and immediately destroy host
//! nodes. (When two unrelated subtrees vary in one transaction the second
//! subtree's rebuild waits for its own notice cycle; see the project design
//! notes.)
//!
//! Info-only changes bypass the machine entirely and go straight to the
//! owning translator's value-refresh path; an edit to the transform-op-order
//! property additionally drops the cached bounding box.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::chain::{build_transform_chain, remove_transform_chain};
use crate::context::TranslatorContext;
use crate::error::SyncError;
use crate::filter::classify;
use crate::host::{HostEvent, HostGraph, HostNodeId};
use crate::path::PrimPath;
use crate::registry::{TranslatorRegistry, XFORM_TRANSLATOR, XformTranslator};
use crate::stage::{InfoChange, Prim, Stage, StageNotice, TRANSFORM_OP_ORDER_PROPERTY};
use crate::table::{TransformReason, TransformTable};
use crate::trace::{ClassifiedEvent, DispatchKind, SyncSink, Tracer};

/// Name of the host string attribute holding the serialized transform table.
pub const TABLE_STATE_ATTR: &str = "isostasyTransformRefs";

/// Name of the host string attribute holding the serialized translator
/// context.
pub const CONTEXT_STATE_ATTR: &str = "isostasyTranslatorContext";

/// Orchestrator state. See the module docs for the transition diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing pending.
    Idle,
    /// A structural notice arrived; the next flush runs a resync.
    CompositionChangePending,
    /// A resync is running to completion.
    Processing,
}

/// Stage-space axis-aligned bounding box over tracked prims.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl Bounds {
    const EMPTY: Self = Self {
        min: [f64::INFINITY; 3],
        max: [f64::NEG_INFINITY; 3],
    };

    fn expand(&mut self, p: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    /// Returns whether no point has been folded in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }
}

/// Per-shape synchronization engine.
#[derive(Debug)]
pub struct SyncEngine {
    anchor: HostNodeId,
    table: TransformTable,
    ctx: TranslatorContext,
    registry: TranslatorRegistry,
    state: SyncState,
    pending_resync: Option<PrimPath>,
    pending_teardown: BTreeSet<PrimPath>,
    tracked: BTreeSet<PrimPath>,
    chain_only: BTreeSet<PrimPath>,
    selected: BTreeSet<PrimPath>,
    excluded: BTreeSet<PrimPath>,
    cached_bounds: Option<Bounds>,
    tracer: Tracer,
}

impl SyncEngine {
    /// Creates an engine anchored at `anchor`, the host transform node all
    /// imported chains hang under.
    #[must_use]
    pub fn new(anchor: HostNodeId) -> Self {
        Self {
            anchor,
            table: TransformTable::new(),
            ctx: TranslatorContext::new(),
            registry: TranslatorRegistry::new(),
            state: SyncState::Idle,
            pending_resync: None,
            pending_teardown: BTreeSet::new(),
            tracked: BTreeSet::new(),
            chain_only: BTreeSet::new(),
            selected: BTreeSet::new(),
            excluded: BTreeSet::new(),
            cached_bounds: None,
            tracer: Tracer::disabled(),
        }
    }

    // -- Accessors --

    /// Returns the current orchestrator state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Returns the path owning the pending resync cycle, if any.
    #[must_use]
    pub fn pending_resync(&self) -> Option<&PrimPath> {
        self.pending_resync.as_ref()
    }

    /// Returns the reference-counted transform table.
    #[must_use]
    pub fn table(&self) -> &TransformTable {
        &self.table
    }

    /// Returns the translator context.
    #[must_use]
    pub fn context(&self) -> &TranslatorContext {
        &self.ctx
    }

    /// Returns the translator registry for registering translators.
    pub fn registry_mut(&mut self) -> &mut TranslatorRegistry {
        &mut self.registry
    }

    /// Returns the paths of currently imported prims, in path order.
    pub fn tracked(&self) -> impl Iterator<Item = &PrimPath> {
        self.tracked.iter()
    }

    /// Attaches a trace sink (requires the `trace` feature to observe
    /// anything).
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn SyncSink>>) {
        self.tracer.set_sink(sink);
    }

    /// Replaces the excluded-prim set. Excluded subtrees read as absent from
    /// the stage; the change schedules a full resync for the next flush.
    pub fn set_excluded_paths(&mut self, paths: impl IntoIterator<Item = PrimPath>) {
        self.excluded = paths.into_iter().collect();
        self.note_structural(PrimPath::absolute_root());
    }

    // -- Stage lifecycle --

    /// Runs the initial import after a stage open.
    ///
    /// A load failure is surfaced once as a warning and leaves the engine
    /// valid but empty; nothing is torn down that a later successful load
    /// could not rebuild.
    pub fn load(&mut self, stage: Result<&dyn Stage, SyncError>, host: &mut dyn HostGraph) {
        match stage {
            Ok(stage) => {
                self.state = SyncState::Processing;
                host.begin_undo_batch();
                self.resync_subtree(&PrimPath::absolute_root(), stage, host);
                host.end_undo_batch();
                self.state = SyncState::Idle;
            }
            Err(err) => {
                log::warn!("stage load failed, shape left empty: {err}");
            }
        }
    }

    // -- Notice handling --

    /// Consumes one objects-changed notice.
    ///
    /// Structural (resynced) paths arm the state machine; info-only changes
    /// are forwarded immediately to the owning translator's value-refresh
    /// path.
    pub fn on_objects_changed(
        &mut self,
        notice: &StageNotice,
        stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) {
        self.tracer
            .notice(notice.resynced.len(), notice.changed_info_only.len());
        for path in &notice.resynced {
            self.note_structural(path.clone());
        }
        for change in &notice.changed_info_only {
            self.on_info_change(change, stage, host);
        }
    }

    /// Services the pending resync, if any. Returns whether a resync ran.
    ///
    /// Hosts call this from their notice-flush callback; the engine is
    /// synchronous and runs the whole pass to completion before returning.
    pub fn flush(&mut self, stage: &dyn Stage, host: &mut dyn HostGraph) -> bool {
        if self.state != SyncState::CompositionChangePending {
            return false;
        }
        let Some(root) = self.pending_resync.take() else {
            self.state = SyncState::Idle;
            return false;
        };
        self.state = SyncState::Processing;
        host.begin_undo_batch();

        // Later structural paths from the same cycle: only teardown of
        // prims that vanished under them, never a rebuild.
        let candidates: Vec<PrimPath> = self
            .pending_teardown
            .iter()
            .filter(|c| !c.has_prefix(&root))
            .cloned()
            .collect();
        for candidate in candidates {
            let gone: Vec<PrimPath> = self
                .tracked
                .iter()
                .filter(|p| {
                    p.has_prefix(&candidate)
                        && stage.prim_at_path(p).is_none_or(|prim| !prim.active)
                })
                .cloned()
                .collect();
            for path in gone.iter().rev() {
                self.teardown_prim(path, host);
            }
        }
        self.pending_teardown.clear();

        self.resync_subtree(&root, stage, host);

        host.end_undo_batch();
        self.state = SyncState::Idle;
        true
    }

    fn note_structural(&mut self, path: PrimPath) {
        match self.state {
            SyncState::Idle => {
                self.state = SyncState::CompositionChangePending;
                self.pending_resync = Some(path);
            }
            SyncState::CompositionChangePending => {
                // First changed path wins the cycle.
                if let Some(kept) = &self.pending_resync {
                    if *kept != path {
                        self.tracer.coalesced(kept, &path);
                        self.pending_teardown.insert(path);
                    }
                }
            }
            // The stage does not mutate during notice dispatch, so this is
            // unreachable in a well-behaved host.
            SyncState::Processing => {
                log::warn!("structural notice for {path} ignored mid-resync");
            }
        }
    }

    fn on_info_change(&mut self, change: &InfoChange, stage: &dyn Stage, host: &mut dyn HostGraph) {
        if change.property == TRANSFORM_OP_ORDER_PROPERTY {
            self.cached_bounds = None;
        }
        let Some(prim) = stage.prim_at_path(&change.path) else {
            return;
        };

        if let Some(entry) = self.ctx.get(&change.path) {
            let id = entry.translator_id.clone();
            self.refresh_prim(&id, &prim, host);
        } else if let Some(node) = self.table.get(&change.path).map(|e| e.node) {
            // Chain-backed hierarchy prim: re-stamp its static transform.
            if host.is_alive(node) {
                XformTranslator::stamp(&prim, node, host);
            }
        }
    }

    // -- Resync pass --

    fn resync_subtree(&mut self, root: &PrimPath, stage: &dyn Stage, host: &mut dyn HostGraph) {
        self.tracer.resync_begin(root);
        self.cached_bounds = None;

        let current = stage.prims_under(root);
        let previous: BTreeSet<PrimPath> = self
            .tracked
            .iter()
            .filter(|p| p.has_prefix(root))
            .cloned()
            .collect();

        // Required is a flag per level, not a count. Drop it wholesale under
        // the root and re-acquire below for everything that survives the
        // pass, so holders that vanished from the stage (chain-only prims
        // included) sweep cleanly at the end.
        let held: Vec<PrimPath> = self
            .table
            .iter()
            .filter(|(path, entry)| entry.required() && path.has_prefix(root))
            .map(|(path, _)| path.clone())
            .collect();
        for path in &held {
            self.table.release(path, TransformReason::Required);
        }
        self.chain_only.retain(|p| !p.has_prefix(root));

        let classification = classify(
            &previous,
            &current,
            &self.excluded,
            &self.ctx,
            &self.registry,
            &self.table,
            host,
        );
        self.tracer.classified(&ClassifiedEvent {
            new: classification.new_prims.len(),
            updatable: classification.updatable_prims.len(),
            removed: classification.removed.len(),
            transform_only: classification.transforms_to_create.len(),
        });

        // Teardown strictly before create: a prim re-created at a torn-down
        // path must never collide with the node being destroyed.
        for path in &classification.removed {
            self.teardown_prim(path, host);
        }

        for path in &classification.transforms_to_create {
            if self.build_chain(path, TransformReason::Required, stage, host).is_some() {
                self.tracer.chain_built(path);
            }
        }
        for path in &classification.chain_only {
            self.chain_only.insert(path.clone());
        }

        let mut batch: Vec<(String, Prim)> = Vec::new();
        for prim in &classification.new_prims {
            if let Some(done) = self.import_prim(prim, stage, host) {
                batch.push(done);
            }
        }
        for prim in &classification.updatable_prims {
            if let Some(done) = self.update_prim(prim, stage, host) {
                batch.push(done);
            }
        }

        // Cross-prim connections only after every prim in the batch exists.
        for (id, prim) in &batch {
            if let Some(translator) = self.registry.get_mut(id) {
                translator.post_import(prim, host, &mut self.ctx);
                self.tracer.dispatched(id, &prim.path, DispatchKind::PostImport);
            }
        }

        // Teardowns above released shared ancestors; surviving prims take
        // them back before the sweep decides what is actually dead.
        self.reassert_required(host);
        let erased = self.table.cleanup(host);
        self.tracer.cleanup(erased);

        self.tracer.resync_end(root);
    }

    fn teardown_prim(&mut self, path: &PrimPath, host: &mut dyn HostGraph) {
        if self.ctx.get(path).is_none() && !self.tracked.contains(path) {
            return;
        }
        for affected in self.ctx.pre_remove_entry(path) {
            let id = self
                .ctx
                .get(&affected)
                .map(|e| e.translator_id.clone())
                .unwrap_or_default();
            self.tracer
                .dispatched(&id, &affected, DispatchKind::Teardown);
            if let Some(translator) = self.registry.get_mut(&id) {
                translator.teardown(&affected, host, &mut self.ctx);
            } else if let Some(entry) = self.ctx.remove(&affected) {
                // Translator deregistered since import; fall back to
                // deleting the nodes it recorded.
                for node in entry.nodes {
                    if host.is_alive(node) {
                        host.delete_node(node);
                    }
                }
            }
            self.release_chain(&affected);
            self.tracked.remove(&affected);
        }
        self.release_chain(path);
        self.tracked.remove(path);
    }

    fn import_prim(
        &mut self,
        prim: &Prim,
        stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) -> Option<(String, Prim)> {
        let id = self.registry.resolve_prim(prim)?.to_owned();
        let parent = self.build_chain(&prim.path, TransformReason::Required, stage, host)?;
        self.tracer.chain_built(&prim.path);

        if id == XFORM_TRANSLATOR {
            // The chain build above *is* the import for plain transforms.
            self.ctx
                .insert(prim.path.clone(), id.clone(), prim.unique_key(), Vec::new());
        } else {
            let translator = self.registry.get_mut(&id)?;
            match translator.import(prim, parent, host, &mut self.ctx) {
                Ok(nodes) => {
                    self.ctx
                        .insert(prim.path.clone(), id.clone(), prim.unique_key(), nodes);
                    self.tracer.dispatched(&id, &prim.path, DispatchKind::Import);
                }
                Err(err) => {
                    // One bad prim never aborts the batch.
                    log::warn!("import of {} failed: {err}", prim.path);
                    return None;
                }
            }
        }
        self.tracked.insert(prim.path.clone());
        Some((id, prim.clone()))
    }

    fn update_prim(
        &mut self,
        prim: &Prim,
        _stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) -> Option<(String, Prim)> {
        let id = self.ctx.get(&prim.path)?.translator_id.clone();
        let key = prim.unique_key();
        if !self.ctx.matches_key(&prim.path, key) {
            self.refresh_prim(&id, prim, host);
        }
        self.tracked.insert(prim.path.clone());
        Some((id, prim.clone()))
    }

    /// Value-refresh path shared by info-only changes and updatable prims.
    fn refresh_prim(&mut self, id: &str, prim: &Prim, host: &mut dyn HostGraph) {
        if id == XFORM_TRANSLATOR {
            if let Some(node) = self.table.get(&prim.path).map(|e| e.node) {
                if host.is_alive(node) {
                    XformTranslator::stamp(prim, node, host);
                    self.ctx.update_unique_key(&prim.path, prim.unique_key());
                }
            }
            return;
        }
        let Some(translator) = self.registry.get_mut(id) else {
            return;
        };
        if !translator.supports_update() {
            log::warn!(
                "{}",
                SyncError::UnsupportedUpdate {
                    translator: id.to_owned()
                }
            );
            return;
        }
        match translator.update(prim, host, &mut self.ctx) {
            Ok(()) => {
                self.ctx.update_unique_key(&prim.path, prim.unique_key());
                self.tracer.dispatched(id, &prim.path, DispatchKind::Update);
            }
            Err(err) => {
                log::warn!("update of {} failed: {err}", prim.path);
            }
        }
    }

    fn build_chain(
        &mut self,
        path: &PrimPath,
        reason: TransformReason,
        stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) -> Option<HostNodeId> {
        build_transform_chain(
            path,
            reason,
            self.anchor,
            stage,
            host,
            &mut self.table,
            &mut self.registry,
            &mut self.ctx,
        )
    }

    /// Releases `Required` on every level of `path`'s chain, without a
    /// cleanup pass; the resync sweeps once at the end.
    fn release_chain(&mut self, path: &PrimPath) {
        for level in path.chain_from_root() {
            self.table.release(&level, TransformReason::Required);
        }
    }

    /// Re-acquires `Required` on every chain level of every surviving
    /// holder — imported prims and chain-only hierarchy prims alike. The
    /// required flag is a flag, not a count, so teardown of one prim can
    /// momentarily strip ancestors that siblings still need; this pass
    /// restores them before cleanup runs.
    fn reassert_required(&mut self, host: &mut dyn HostGraph) {
        let holders: Vec<PrimPath> = self
            .tracked
            .iter()
            .chain(self.chain_only.iter())
            .cloned()
            .collect();
        for path in holders {
            for level in path.chain_from_root() {
                let _ = self.table.acquire(&level, TransformReason::Required, host);
            }
        }
    }

    // -- Public transform requests --

    /// Ensures a transform chain for `path` under the `Requested` reason,
    /// returning the node for `path`. Each call increments the request
    /// count; balance with
    /// [`discard_transform_request`](Self::discard_transform_request).
    ///
    /// Returns `None` (acquiring nothing) when `path` has no prim.
    pub fn request_transform(
        &mut self,
        path: &PrimPath,
        stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) -> Option<HostNodeId> {
        self.build_chain(path, TransformReason::Requested, stage, host)
    }

    /// Releases one `Requested` count on `path`'s chain and sweeps.
    pub fn discard_transform_request(&mut self, path: &PrimPath, host: &mut dyn HostGraph) {
        remove_transform_chain(path, TransformReason::Requested, host, &mut self.table);
    }

    // -- Host events --

    /// Consumes one host session event.
    pub fn on_host_event(&mut self, event: &HostEvent, stage: &dyn Stage, host: &mut dyn HostGraph) {
        match event {
            HostEvent::PreSave => self.save_session(host),
            HostEvent::PostOpen => self.restore_session(host),
            HostEvent::SelectionChanged(paths) => {
                self.mirror_selection(paths.iter().cloned().collect(), stage, host);
            }
        }
    }

    fn mirror_selection(
        &mut self,
        selection: BTreeSet<PrimPath>,
        stage: &dyn Stage,
        host: &mut dyn HostGraph,
    ) {
        let deselected: Vec<PrimPath> = self.selected.difference(&selection).cloned().collect();
        for path in &deselected {
            for level in path.chain_from_root() {
                self.table.release(&level, TransformReason::Selection);
            }
        }
        // Selection is a flag per level; re-acquire for everything still
        // selected before sweeping, mirroring the required-flag dance.
        for path in &selection {
            let _ = self.build_chain(path, TransformReason::Selection, stage, host);
        }
        self.selected = selection;
        let erased = self.table.cleanup(host);
        self.tracer.cleanup(erased);
    }

    // -- Persisted session state --

    /// Writes the table and context blobs onto the anchor node's string
    /// attributes. Runs during the host's pre-save callback.
    pub fn save_session(&mut self, host: &mut dyn HostGraph) {
        let table_blob = self.table.serialize(host);
        let ctx_blob = self.ctx.serialize(host);
        host.set_string_attr(self.anchor, TABLE_STATE_ATTR, &table_blob);
        host.set_string_attr(self.anchor, CONTEXT_STATE_ATTR, &ctx_blob);
    }

    /// Restores the table and context from the anchor node's string
    /// attributes. Records whose host nodes no longer resolve are silently
    /// dropped. Runs during the host's post-open callback.
    pub fn restore_session(&mut self, host: &mut dyn HostGraph) {
        if let Some(blob) = host.string_attr(self.anchor, TABLE_STATE_ATTR) {
            self.table = TransformTable::deserialize(&blob, host);
        }
        if let Some(blob) = host.string_attr(self.anchor, CONTEXT_STATE_ATTR) {
            self.ctx = TranslatorContext::deserialize(&blob, host);
        }
        self.tracked = self.ctx.iter().map(|(p, _)| p.clone()).collect();
        self.chain_only.clear();
        self.selected.clear();
        self.pending_resync = None;
        self.pending_teardown.clear();
        self.state = SyncState::Idle;
        self.cached_bounds = None;
    }

    // -- Bounds cache --

    /// Returns the stage-space bounding box over tracked prims, computed
    /// lazily and cached until the next resync or transform-op-order edit.
    pub fn bounding_box(&mut self, stage: &dyn Stage) -> Bounds {
        if let Some(bounds) = self.cached_bounds {
            return bounds;
        }
        let mut bounds = Bounds::EMPTY;
        for path in &self.tracked {
            if let Some(prim) = stage.prim_at_path(path) {
                bounds.expand(crate::transform::compose(&prim.transform_ops).translation());
            }
        }
        self.cached_bounds = Some(bounds);
        bounds
    }

    /// Returns whether the bounding box cache is currently valid.
    #[must_use]
    pub fn bounds_cached(&self) -> bool {
        self.cached_bounds.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct EmptyStage;

    impl Stage for EmptyStage {
        fn prim_at_path(&self, _path: &PrimPath) -> Option<Prim> {
            None
        }
        fn prims_under(&self, _root: &PrimPath) -> Vec<Prim> {
            Vec::new()
        }
    }

    #[derive(Debug, Default)]
    struct NullHost;

    impl HostGraph for NullHost {
        fn create_transform(&mut self, _name: &str, _parent: Option<HostNodeId>) -> HostNodeId {
            HostNodeId::from_raw(0, 0)
        }
        fn delete_node(&mut self, _id: HostNodeId) {}
        fn reparent(&mut self, _node: HostNodeId, _new_parent: Option<HostNodeId>) {}
        fn is_alive(&self, _id: HostNodeId) -> bool {
            true
        }
        fn node_path(&self, _id: HostNodeId) -> Option<String> {
            None
        }
        fn find_node(&self, _host_path: &str) -> Option<HostNodeId> {
            None
        }
        fn set_string_attr(&mut self, _id: HostNodeId, _name: &str, _value: &str) {}
        fn string_attr(&self, _id: HostNodeId, _name: &str) -> Option<String> {
            None
        }
        fn set_local_matrix(&mut self, _id: HostNodeId, _matrix: crate::transform::Matrix4) {}
        fn local_matrix(&self, _id: HostNodeId) -> Option<crate::transform::Matrix4> {
            None
        }
    }

    fn notice(paths: &[&str]) -> StageNotice {
        StageNotice {
            resynced: paths.iter().map(|p| PrimPath::new(p)).collect(),
            changed_info_only: Vec::new(),
        }
    }

    #[test]
    fn first_structural_path_wins_the_cycle() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        let stage = EmptyStage;
        let mut host = NullHost;

        engine.on_objects_changed(&notice(&["/a"]), &stage, &mut host);
        engine.on_objects_changed(&notice(&["/b"]), &stage, &mut host);
        engine.on_objects_changed(&notice(&["/c"]), &stage, &mut host);

        assert_eq!(engine.state(), SyncState::CompositionChangePending);
        assert_eq!(engine.pending_resync(), Some(&PrimPath::new("/a")));
    }

    #[test]
    fn flush_returns_to_idle() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        let stage = EmptyStage;
        let mut host = NullHost;

        engine.on_objects_changed(&notice(&["/a"]), &stage, &mut host);
        assert!(engine.flush(&stage, &mut host));
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.pending_resync(), None);
    }

    #[test]
    fn flush_without_pending_is_noop() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        assert!(!engine.flush(&EmptyStage, &mut NullHost));
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn info_only_changes_bypass_the_state_machine() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        let stage = EmptyStage;
        let mut host = NullHost;

        let n = StageNotice {
            resynced: Vec::new(),
            changed_info_only: alloc::vec![InfoChange {
                path: PrimPath::new("/a"),
                property: "radius".to_owned(),
            }],
        };
        engine.on_objects_changed(&n, &stage, &mut host);
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn transform_op_order_edit_drops_bounds_cache() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        let stage = EmptyStage;
        let mut host = NullHost;

        let _ = engine.bounding_box(&stage);
        assert!(engine.bounds_cached());

        let n = StageNotice {
            resynced: Vec::new(),
            changed_info_only: alloc::vec![InfoChange {
                path: PrimPath::new("/a"),
                property: TRANSFORM_OP_ORDER_PROPERTY.to_owned(),
            }],
        };
        engine.on_objects_changed(&n, &stage, &mut host);
        assert!(!engine.bounds_cached());
    }

    #[test]
    fn duplicate_structural_path_is_not_a_teardown_candidate() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        let stage = EmptyStage;
        let mut host = NullHost;

        engine.on_objects_changed(&notice(&["/a", "/a"]), &stage, &mut host);
        assert!(engine.pending_teardown.is_empty());
    }

    #[test]
    fn load_failure_leaves_engine_empty_and_idle() {
        let mut engine = SyncEngine::new(HostNodeId::from_raw(0, 0));
        engine.load(
            Err(SyncError::StageLoad {
                uri: "bad.usda".to_owned(),
            }),
            &mut NullHost,
        );
        assert_eq!(engine.state(), SyncState::Idle);
        assert!(engine.table().is_empty());
        assert!(engine.context().is_empty());
    }
}
