// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine error taxonomy.
//!
//! Most conditions in the engine are *tolerated*, not propagated: a stale
//! host handle reads as "entry absent", an invalid prim turns the operation
//! into a no-op, and an unsupported incremental update is surfaced as a
//! warning while the rest of the batch continues. [`SyncError`] exists for
//! the places where a caller still needs a value to report or log, and for
//! translator implementations to signal failure for a single prim without
//! aborting the batch.

use alloc::string::String;

use thiserror::Error;

use crate::path::PrimPath;

/// Errors produced by the synchronization engine and by translators.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A table or context entry whose host node no longer resolves.
    ///
    /// Tolerated everywhere; callers treat the entry as absent.
    #[error("host node for {path} no longer resolves")]
    StaleReference {
        /// The stage path whose backing node went away.
        path: PrimPath,
    },

    /// A stage path that no longer resolves to a prim.
    #[error("no prim at {path} in the composed stage")]
    InvalidPrim {
        /// The path that failed to resolve.
        path: PrimPath,
    },

    /// `update` was dispatched to a translator that does not support
    /// incremental update. Surfaced as a warning; the batch continues.
    #[error("translator `{translator}` does not support incremental update")]
    UnsupportedUpdate {
        /// Identity string of the offending translator.
        translator: String,
    },

    /// No translator is registered for a prim's declared type.
    #[error("no translator registered for type `{type_name}`")]
    NoTranslator {
        /// The declared type that failed to resolve.
        type_name: String,
    },

    /// A destroy was requested for a node still held by a live reason.
    ///
    /// Guarded by the refcount check in the transform table and therefore
    /// expected to be unreachable; when detected, the destroy is skipped.
    #[error("refusing to destroy {path}: still referenced")]
    StillReferenced {
        /// The path whose entry is still referenced.
        path: PrimPath,
    },

    /// The composed stage failed to load. Surfaced once at the shape-load
    /// boundary; the engine stays valid but empty.
    #[error("failed to load composed stage from `{uri}`")]
    StageLoad {
        /// Identifier of the stage that failed to open.
        uri: String,
    },

    /// A translator failed while processing one prim. The resync isolates
    /// this per prim and continues with the remainder of the batch.
    #[error("translator `{translator}` failed for {path}: {message}")]
    TranslatorFailed {
        /// Identity string of the failing translator.
        translator: String,
        /// The prim being processed.
        path: PrimPath,
        /// Translator-supplied detail.
        message: String,
    },
}
