// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core engine for synchronizing a composed scene stage into a host graph.
//!
//! `isostasy_core` keeps a host application's retained node graph consistent
//! with a composed prim stage: prims import as host nodes through pluggable
//! translators, the host-side transform hierarchy is shared and
//! reference-counted, and composition changes resolve incrementally instead
//! of through teardown-and-reimport. It is `no_std` compatible (with
//! `alloc`); the host and stage are reached only through traits, so the
//! engine runs against in-memory doubles in tests exactly as it runs against
//! a real application.
//!
//! # Architecture
//!
//! The crate is organized around a resync pass that turns stage change
//! notices into incremental host-graph edits:
//!
//! ```text
//!   Stage (change notices)
//!       │
//!       ▼
//!   StageNotice ──► SyncEngine (coalesce) ──► flush()
//!                                                │
//!                  ┌─────────────────────────────┘
//!                  ▼
//!   filter::classify() ──► teardown ▸ chains ▸ import/update ▸ post-import
//!                                                │
//!                  ┌─────────────────────────────┘
//!                  ▼
//!   TransformTable::cleanup() ──► HostGraph edits
//! ```
//!
//! **[`path`]** — Absolute prim paths whose lexicographic order puts
//! ancestors before descendants, so ordered maps double as hierarchies.
//!
//! **[`table`]** — The reference-counted transform table: one entry per
//! stage path backed by a host transform node, held for up to three reasons
//! (selection, required, requested).
//!
//! **[`chain`]** — Builds and releases transform chains level by level,
//! skipping merged prims and reusing live table entries.
//!
//! **[`registry`]** — Translator registration and dispatch; static and
//! scripted translators share one table.
//!
//! **[`context`]** — Per-prim import records (translator identity, unique
//! key, created nodes) with serialization for session round-trips.
//!
//! **[`filter`]** — Classifies each resync's prims into new, updatable,
//! removed, and transform-only.
//!
//! **[`engine`]** — The [`SyncEngine`](engine::SyncEngine) orchestrator:
//! notice coalescing, the resync state machine, selection mirroring, and
//! persisted session state.
//!
//! **[`stage`]** / **[`host`]** — The two boundary traits: a read-only view
//! of the composed stage, and the mutable host node graph.
//!
//! **[`transform`]** — Static transform ops and 4×4 matrix composition.
//!
//! **[`trace`]** — [`SyncSink`](trace::SyncSink) trait and event types for
//! resync instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod chain;
pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod host;
pub mod path;
pub mod registry;
pub mod stage;
pub mod table;
pub mod trace;
pub mod transform;
