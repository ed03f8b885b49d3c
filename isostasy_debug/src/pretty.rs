// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`SyncSink`] and writes one line per
//! engine event to a [`Write`](std::io::Write) destination (default:
//! stderr).

use std::io::Write;

use isostasy_core::path::PrimPath;
use isostasy_core::trace::{ClassifiedEvent, DispatchKind, SyncSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

fn kind_name(kind: DispatchKind) -> &'static str {
    match kind {
        DispatchKind::Import => "import",
        DispatchKind::Update => "update",
        DispatchKind::Teardown => "teardown",
        DispatchKind::PostImport => "post-import",
    }
}

impl<W: Write> SyncSink for PrettyPrintSink<W> {
    fn notice(&mut self, resynced: usize, info_only: usize) {
        let _ = writeln!(
            self.writer,
            "[notice] resynced={resynced} info-only={info_only}"
        );
    }

    fn coalesced(&mut self, kept: &PrimPath, dropped: &PrimPath) {
        let _ = writeln!(self.writer, "[coalesce] kept={kept} dropped={dropped}");
    }

    fn resync_begin(&mut self, root: &PrimPath) {
        let _ = writeln!(self.writer, "[resync:begin] root={root}");
    }

    fn classified(&mut self, event: &ClassifiedEvent) {
        let _ = writeln!(
            self.writer,
            "[classified] new={} updatable={} removed={} transform-only={}",
            event.new, event.updatable, event.removed, event.transform_only,
        );
    }

    fn chain_built(&mut self, path: &PrimPath) {
        let _ = writeln!(self.writer, "[chain] {path}");
    }

    fn dispatched(&mut self, translator: &str, path: &PrimPath, kind: DispatchKind) {
        let _ = writeln!(
            self.writer,
            "[{}] {path} via `{translator}`",
            kind_name(kind)
        );
    }

    fn cleanup(&mut self, erased: usize) {
        let _ = writeln!(self.writer, "[cleanup] erased={erased}");
    }

    fn resync_end(&mut self, root: &PrimPath) {
        let _ = writeln!(self.writer, "[resync:end] root={root}");
    }
}
