// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prim classification for one resync.
//!
//! Given the set of previously tracked paths and a fresh enumeration of the
//! stage subtree, [`classify`] buckets every prim into exactly one of:
//!
//! - **new** — needs a full translator import;
//! - **updatable** — same path, same translator identity; needs a re-sync;
//! - **transform-only** — no translator resolves for its type; it only needs
//!   a host transform chain;
//!
//! plus the **removed** set of previously tracked paths with no surviving
//! counterpart. A prim whose translator identity changed since the last sync
//! (schema type edited) appears in *both* removed and new — the old content
//! must be torn down before the new identity imports, never updated in
//! place. Callers therefore process removals strictly before imports.
//!
//! `transforms_to_create` collects, root-downward, every ancestor path the
//! imports will need that is not already backed by a live host transform.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::context::TranslatorContext;
use crate::host::HostGraph;
use crate::path::PrimPath;
use crate::registry::TranslatorRegistry;
use crate::stage::Prim;
use crate::table::TransformTable;

/// The four classification sets produced once per resync.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    /// Prims needing a full translator import, ancestors first.
    pub new_prims: Vec<Prim>,
    /// Prims with a surviving identity needing a re-sync, ancestors first.
    pub updatable_prims: Vec<Prim>,
    /// Previously tracked paths to tear down, deepest-first.
    pub removed: Vec<PrimPath>,
    /// Ancestor paths needing a host transform, root-first, deduplicated.
    pub transforms_to_create: Vec<PrimPath>,
    /// Visible prims with no registered translator, in pre-order. They hold
    /// a transform chain but never a context entry.
    pub chain_only: Vec<PrimPath>,
}

/// Classifies the current stage subtree against the previously tracked set.
///
/// `current` must be in pre-order (ancestors before descendants), as
/// [`Stage::prims_under`](crate::stage::Stage::prims_under) yields it.
/// Inactive prims and prims at or beneath an excluded path are treated as
/// absent from the "after" snapshot, so previously tracked prims there fall
/// into `removed`.
#[must_use]
pub fn classify(
    previous: &BTreeSet<PrimPath>,
    current: &[Prim],
    excluded: &BTreeSet<PrimPath>,
    ctx: &TranslatorContext,
    registry: &TranslatorRegistry,
    table: &TransformTable,
    host: &dyn HostGraph,
) -> Classification {
    let mut out = Classification::default();

    let visible: Vec<&Prim> = current
        .iter()
        .filter(|p| p.active && !excluded.iter().any(|ex| p.path.has_prefix(ex)))
        .collect();
    let visible_paths: BTreeSet<&PrimPath> = visible.iter().map(|p| &p.path).collect();

    let mut removed: BTreeSet<PrimPath> = previous
        .iter()
        .filter(|p| !visible_paths.contains(*p))
        .cloned()
        .collect();

    let mut chain_paths: BTreeSet<PrimPath> = BTreeSet::new();
    let mut need_ancestors = |path: &PrimPath, include_self: bool| {
        let chain = path.chain_from_root();
        let levels = if include_self {
            &chain[..]
        } else {
            &chain[..chain.len().saturating_sub(1)]
        };
        for level in levels {
            let backed = table
                .get(level)
                .is_some_and(|entry| host.is_alive(entry.node));
            if !backed {
                chain_paths.insert(level.clone());
            }
        }
    };

    for prim in visible {
        match registry.resolve_prim(prim) {
            Some(id) => {
                if ctx.has_entry(&prim.path, id) {
                    out.updatable_prims.push(prim.clone());
                } else {
                    // An entry under a different translator identity means
                    // the schema type changed: removed-then-new, not update.
                    if ctx.get(&prim.path).is_some() {
                        removed.insert(prim.path.clone());
                    }
                    out.new_prims.push(prim.clone());
                }
                need_ancestors(&prim.path, false);
            }
            None => {
                // No translator: hierarchy-only prim, chain but no content.
                // A leftover context entry means the type changed from a
                // translatable one; the old content still comes down.
                if ctx.get(&prim.path).is_some() {
                    removed.insert(prim.path.clone());
                }
                out.chain_only.push(prim.path.clone());
                need_ancestors(&prim.path, true);
            }
        }
    }

    // Teardown runs deepest-first so children never outlive their parents.
    out.removed = removed.into_iter().rev().collect();
    out.transforms_to_create = chain_paths.into_iter().collect();
    out
}
