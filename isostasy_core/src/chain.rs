// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform chain construction and removal.
//!
//! A *transform chain* is the run of host transform nodes mirroring a prim's
//! ancestor path, rooted at the shape's own anchor node. Chains are built
//! root-downward: each level reuses the table's live entry when one exists,
//! otherwise a fresh host transform is created under the previous level,
//! stamped with its source prim path, given the ancestor's composed static
//! transform through the built-in transform translator, and registered in
//! the table under the caller's reason.
//!
//! Merged prims contribute no level of their own — their transform folds
//! into the parent's node — so the walk skips them and their children attach
//! one level up.
//!
//! Removal releases the caller's reason at every level and runs a single
//! trailing cleanup pass, so releasing a deep chain produces one destruction
//! sweep instead of per-level churn.

use crate::context::TranslatorContext;
use crate::host::{HostGraph, HostNodeId, SOURCE_PATH_ATTR};
use crate::path::PrimPath;
use crate::registry::{TranslatorRegistry, XFORM_TRANSLATOR};
use crate::stage::Stage;
use crate::table::{TransformReason, TransformTable};

/// Ensures host transforms exist for `target` and all its ancestors,
/// returning the node children of `target` should attach under.
///
/// Returns `None` — without touching anything — when `target` does not
/// resolve to a prim: resync processing routinely asks for chains of paths
/// whose prims were just removed, and that must never be an error.
///
/// When `target` itself is merged, no node is created for it and the
/// effective parent (its nearest unmerged ancestor's node) is returned.
pub fn build_transform_chain(
    target: &PrimPath,
    reason: TransformReason,
    anchor: HostNodeId,
    stage: &dyn Stage,
    host: &mut dyn HostGraph,
    table: &mut TransformTable,
    registry: &mut TranslatorRegistry,
    ctx: &mut TranslatorContext,
) -> Option<HostNodeId> {
    stage.prim_at_path(target)?;

    let mut parent = anchor;
    for level in target.chain_from_root() {
        let prim = stage.prim_at_path(&level);

        // Merged levels fold into the parent's node: no level of their own.
        if prim.as_ref().is_some_and(|p| p.merged) {
            continue;
        }

        if let Some(node) = table.acquire(&level, reason, host) {
            parent = node;
            continue;
        }

        let imported = match (registry.get_mut(XFORM_TRANSLATOR), prim.as_ref()) {
            (Some(translator), Some(p)) => translator
                .import(p, parent, host, ctx)
                .ok()
                .and_then(|nodes| nodes.first().copied()),
            _ => None,
        };
        let node = imported.unwrap_or_else(|| {
            // No snapshot for this level (or no transform translator):
            // create a bare node so the chain stays connected.
            let node = host.create_transform(level.name(), Some(parent));
            host.set_string_attr(node, SOURCE_PATH_ATTR, level.as_str());
            node
        });

        table.insert(level.clone(), node, reason);
        parent = node;
    }
    Some(parent)
}

/// Releases `reason` at every level of `target`'s chain, then runs one
/// cleanup pass.
///
/// Levels without a table entry (merged prims, already-released paths) are
/// silently skipped; releasing the chain of a prim that no longer exists is
/// a valid way to let its transforms go.
pub fn remove_transform_chain(
    target: &PrimPath,
    reason: TransformReason,
    host: &mut dyn HostGraph,
    table: &mut TransformTable,
) -> usize {
    for level in target.chain_from_root() {
        table.release(&level, reason);
    }
    table.cleanup(host)
}
