// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory stage and host doubles for engine tests and demos.
//!
//! [`MemoryStage`] is an editable prim store that accumulates the same
//! change notices a composition library would emit; [`MemoryHost`] is a
//! generational-slot node graph with an activity log. Together they let
//! scenario tests drive a [`SyncEngine`](isostasy_core::engine::SyncEngine)
//! through author-edit → notice → flush cycles and assert on exactly which
//! host nodes were created, updated, and deleted.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod host;
mod stage;

pub use host::MemoryHost;
pub use stage::MemoryStage;
