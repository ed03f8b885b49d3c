// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and pretty-printing for isostasy sync diagnostics.
//!
//! This crate provides [`SyncSink`](isostasy_core::trace::SyncSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — structured session recording with JSON
//!   dump/[`recorder::decode`] for playback.

pub mod pretty;
pub mod recorder;
