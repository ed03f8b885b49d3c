// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translator registration and dispatch.
//!
//! A *translator* copies one prim type's content between the composed stage
//! and the host graph. Translators register under an identity string — the
//! prim's declared type — and the engine resolves prims to translators
//! through [`TranslatorRegistry::resolve`] without ever branching on where
//! the translator came from: statically compiled and dynamically scripted
//! translators share the same table, distinguished only by a
//! [`TranslatorOrigin`] tag recorded at registration time.
//!
//! The registry does not dedupe imports; callers are expected to consult the
//! [`TranslatorContext`] first. `update` is only dispatched to translators
//! whose [`supports_update`](Translator::supports_update) returns `true`;
//! `post_import` runs once per prim after *every* import/update in the same
//! batch has completed, so cross-prim connections can assume all siblings
//! exist.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::context::TranslatorContext;
use crate::error::SyncError;
use crate::host::{HostGraph, HostNodeId, SOURCE_PATH_ATTR};
use crate::path::PrimPath;
use crate::stage::Prim;
use crate::transform::compose;

/// The identity string of the built-in transform translator.
///
/// It matches the stage's plain-transform prim type, and the chain builder
/// uses it to copy static transform values onto the nodes it creates.
pub const XFORM_TRANSLATOR: &str = "Xform";

/// Where a translator was registered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslatorOrigin {
    /// Compiled into the plugin.
    Static,
    /// Registered at runtime from a scripting layer.
    Scripted,
}

/// Per-prim-type import/update/teardown capability set.
pub trait Translator {
    /// Constructs host-side content for `prim` under `parent`, returning the
    /// created nodes (primary node first).
    ///
    /// Not idempotent on its own: the caller checks the context for an
    /// existing entry before dispatching.
    fn import(
        &mut self,
        prim: &Prim,
        parent: HostNodeId,
        host: &mut dyn HostGraph,
        ctx: &mut TranslatorContext,
    ) -> Result<Vec<HostNodeId>, SyncError>;

    /// Whether this translator supports incremental update.
    fn supports_update(&self) -> bool {
        false
    }

    /// Re-syncs existing host content from `prim` without recreating nodes.
    ///
    /// Only dispatched when [`supports_update`](Self::supports_update) is
    /// `true`.
    fn update(
        &mut self,
        prim: &Prim,
        host: &mut dyn HostGraph,
        ctx: &mut TranslatorContext,
    ) -> Result<(), SyncError> {
        let _ = (prim, host, ctx);
        Err(SyncError::UnsupportedUpdate {
            translator: String::new(),
        })
    }

    /// Tears down the host content previously imported for `path`.
    ///
    /// The default removes the context entry and deletes every still-live
    /// node it recorded.
    fn teardown(&mut self, path: &PrimPath, host: &mut dyn HostGraph, ctx: &mut TranslatorContext) {
        if let Some(entry) = ctx.remove(path) {
            for node in entry.nodes {
                if host.is_alive(node) {
                    host.delete_node(node);
                }
            }
        }
    }

    /// Called once per prim after all prims in the batch have been
    /// imported/updated, for cross-prim connections.
    fn post_import(&mut self, prim: &Prim, host: &mut dyn HostGraph, ctx: &mut TranslatorContext) {
        let _ = (prim, host, ctx);
    }

    /// Authoring-direction hook: reads host content for `path` back into a
    /// prim snapshot. Translators that only import can leave the default.
    fn export_object(&self, path: &PrimPath, host: &dyn HostGraph) -> Option<Prim> {
        let _ = (path, host);
        None
    }
}

struct Registered {
    origin: TranslatorOrigin,
    translator: Box<dyn Translator>,
}

/// Table of translators keyed by identity string.
pub struct TranslatorRegistry {
    by_id: BTreeMap<String, Registered>,
}

impl fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("ids", &self.by_id.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslatorRegistry {
    /// Creates a registry with the built-in transform translator registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            by_id: BTreeMap::new(),
        };
        registry.register(
            XFORM_TRANSLATOR,
            TranslatorOrigin::Static,
            Box::new(XformTranslator),
        );
        registry
    }

    /// Registers `translator` under `id`, replacing any previous
    /// registration for the same identity.
    pub fn register(&mut self, id: &str, origin: TranslatorOrigin, translator: Box<dyn Translator>) {
        self.by_id
            .insert(id.to_owned(), Registered { origin, translator });
    }

    /// Removes the registration for `id`.
    pub fn deregister(&mut self, id: &str) {
        self.by_id.remove(id);
    }

    /// Resolves a declared type string to a registered identity.
    ///
    /// Tries the full type first, then — for namespaced types like
    /// `render:Camera` — the bare suffix after the final `:`.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<&str> {
        if let Some((id, _)) = self.by_id.get_key_value(type_name) {
            return Some(id);
        }
        let suffix = type_name.rsplit(':').next()?;
        self.by_id.get_key_value(suffix).map(|(id, _)| id.as_str())
    }

    /// Resolves the translator for `prim`, if one is registered.
    #[must_use]
    pub fn resolve_prim(&self, prim: &Prim) -> Option<&str> {
        self.resolve(&prim.type_name)
    }

    /// Returns the translator registered under `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Translator + 'static)> {
        self.by_id.get_mut(id).map(|r| r.translator.as_mut())
    }

    /// Returns the origin tag recorded for `id`.
    #[must_use]
    pub fn origin(&self, id: &str) -> Option<TranslatorOrigin> {
        self.by_id.get(id).map(|r| r.origin)
    }

    /// Returns whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }
}

/// Built-in translator for plain transform prims.
///
/// Creates one host transform node per prim, stamps the source-path
/// attribute, and copies the prim's composed static transform ops into the
/// node's local matrix. Supports incremental update.
#[derive(Debug, Default)]
pub struct XformTranslator;

impl XformTranslator {
    /// Copies `prim`'s composed static transform and source path onto
    /// `node`.
    pub fn stamp(prim: &Prim, node: HostNodeId, host: &mut dyn HostGraph) {
        host.set_string_attr(node, SOURCE_PATH_ATTR, prim.path.as_str());
        host.set_local_matrix(node, compose(&prim.transform_ops));
    }
}

impl Translator for XformTranslator {
    fn import(
        &mut self,
        prim: &Prim,
        parent: HostNodeId,
        host: &mut dyn HostGraph,
        _ctx: &mut TranslatorContext,
    ) -> Result<Vec<HostNodeId>, SyncError> {
        let node = host.create_transform(prim.path.name(), Some(parent));
        Self::stamp(prim, node, host);
        Ok(vec![node])
    }

    fn supports_update(&self) -> bool {
        true
    }

    fn update(
        &mut self,
        prim: &Prim,
        host: &mut dyn HostGraph,
        ctx: &mut TranslatorContext,
    ) -> Result<(), SyncError> {
        let Some(&node) = ctx.nodes(&prim.path).first() else {
            return Err(SyncError::StaleReference {
                path: prim.path.clone(),
            });
        };
        if !host.is_alive(node) {
            return Err(SyncError::StaleReference {
                path: prim.path.clone(),
            });
        }
        Self::stamp(prim, node, host);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;
    impl Translator for Inert {
        fn import(
            &mut self,
            _prim: &Prim,
            _parent: HostNodeId,
            _host: &mut dyn HostGraph,
            _ctx: &mut TranslatorContext,
        ) -> Result<Vec<HostNodeId>, SyncError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn new_registry_has_xform_translator() {
        let registry = TranslatorRegistry::new();
        assert!(registry.contains(XFORM_TRANSLATOR));
        assert_eq!(
            registry.origin(XFORM_TRANSLATOR),
            Some(TranslatorOrigin::Static)
        );
    }

    #[test]
    fn resolve_falls_back_to_namespace_suffix() {
        let mut registry = TranslatorRegistry::new();
        registry.register("Camera", TranslatorOrigin::Scripted, Box::new(Inert));

        assert_eq!(registry.resolve("Camera"), Some("Camera"));
        assert_eq!(registry.resolve("render:Camera"), Some("Camera"));
        assert_eq!(registry.resolve("Mesh"), None);
    }

    #[test]
    fn static_and_scripted_share_one_lookup() {
        let mut registry = TranslatorRegistry::new();
        registry.register("Mesh", TranslatorOrigin::Scripted, Box::new(Inert));

        // Both resolve the same way; only the origin tag differs.
        assert!(registry.get_mut("Mesh").is_some());
        assert!(registry.get_mut(XFORM_TRANSLATOR).is_some());
        assert_eq!(registry.origin("Mesh"), Some(TranslatorOrigin::Scripted));
    }

    #[test]
    fn reregistration_replaces() {
        let mut registry = TranslatorRegistry::new();
        registry.register("Mesh", TranslatorOrigin::Static, Box::new(Inert));
        registry.register("Mesh", TranslatorOrigin::Scripted, Box::new(Inert));
        assert_eq!(registry.origin("Mesh"), Some(TranslatorOrigin::Scripted));
    }

    #[test]
    fn default_update_is_unsupported() {
        let mut t = Inert;
        assert!(!t.supports_update());
        let prim = Prim {
            path: PrimPath::new("/a"),
            type_name: "Inert".into(),
            active: true,
            merged: false,
            transform_ops: Vec::new(),
        };
        // Exercised through a throwaway context/host pair.
        struct NoHost;
        impl HostGraph for NoHost {
            fn create_transform(
                &mut self,
                _name: &str,
                _parent: Option<HostNodeId>,
            ) -> HostNodeId {
                HostNodeId::from_raw(0, 0)
            }
            fn delete_node(&mut self, _id: HostNodeId) {}
            fn reparent(&mut self, _node: HostNodeId, _new_parent: Option<HostNodeId>) {}
            fn is_alive(&self, _id: HostNodeId) -> bool {
                false
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
        let mut host = NoHost;
        let mut ctx = TranslatorContext::new();
        assert!(matches!(
            t.update(&prim, &mut host, &mut ctx),
            Err(SyncError::UnsupportedUpdate { .. })
        ));
    }
}
