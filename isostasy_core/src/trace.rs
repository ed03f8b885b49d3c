// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resync instrumentation.
//!
//! [`SyncSink`] is a trait with one method per engine lifecycle event. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine. [`Tracer`] wraps an optional boxed sink: when the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing; when
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Warnings meant for users go through `log`; this sink is for structured
//! per-resync diagnostics (recorders, pretty-printers, test probes).

use alloc::boxed::Box;
use core::fmt;

use crate::path::PrimPath;

/// Which translator operation was dispatched for a prim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    /// Full content import.
    Import,
    /// Incremental update.
    Update,
    /// Content teardown.
    Teardown,
    /// Cross-prim connection pass.
    PostImport,
}

/// Classification counts for one resync batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedEvent {
    /// Prims needing full import.
    pub new: usize,
    /// Prims needing incremental re-sync.
    pub updatable: usize,
    /// Paths being torn down.
    pub removed: usize,
    /// Ancestor transforms to create.
    pub transform_only: usize,
}

/// Receives engine lifecycle events.
///
/// All methods default to no-ops.
pub trait SyncSink {
    /// An objects-changed notice arrived.
    fn notice(&mut self, resynced: usize, info_only: usize) {
        let _ = (resynced, info_only);
    }

    /// A structural path was coalesced away (an earlier path already owns
    /// this resync cycle).
    fn coalesced(&mut self, kept: &PrimPath, dropped: &PrimPath) {
        let _ = (kept, dropped);
    }

    /// A resync pass started for the subtree at `root`.
    fn resync_begin(&mut self, root: &PrimPath) {
        let _ = root;
    }

    /// Classification finished for the current resync.
    fn classified(&mut self, event: &ClassifiedEvent) {
        let _ = event;
    }

    /// A transform chain was ensured for `path`.
    fn chain_built(&mut self, path: &PrimPath) {
        let _ = path;
    }

    /// A translator operation was dispatched.
    fn dispatched(&mut self, translator: &str, path: &PrimPath, kind: DispatchKind) {
        let _ = (translator, path, kind);
    }

    /// A table cleanup pass erased `erased` entries.
    fn cleanup(&mut self, erased: usize) {
        let _ = erased;
    }

    /// The resync pass for `root` finished.
    fn resync_end(&mut self, root: &PrimPath) {
        let _ = root;
    }
}

/// Zero-overhead wrapper around an optional [`SyncSink`].
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn SyncSink>>,
    #[cfg(not(feature = "trace"))]
    _noop: core::marker::PhantomData<()>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! forward {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {{
        #[cfg(feature = "trace")]
        if let Some(sink) = $self.sink.as_mut() {
            sink.$method($($arg),*);
        }
        #[cfg(not(feature = "trace"))]
        {
            $(let _ = $arg;)*
        }
    }};
}

impl Tracer {
    /// Creates a tracer with no sink attached.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Attaches a sink. Without the `trace` feature this drops the sink and
    /// stays inert.
    pub fn set_sink(&mut self, sink: Option<Box<dyn SyncSink>>) {
        #[cfg(feature = "trace")]
        {
            self.sink = sink;
        }
        #[cfg(not(feature = "trace"))]
        {
            let _ = sink;
        }
    }

    /// See [`SyncSink::notice`].
    #[inline]
    pub fn notice(&mut self, resynced: usize, info_only: usize) {
        forward!(self, notice(resynced, info_only));
    }

    /// See [`SyncSink::coalesced`].
    #[inline]
    pub fn coalesced(&mut self, kept: &PrimPath, dropped: &PrimPath) {
        forward!(self, coalesced(kept, dropped));
    }

    /// See [`SyncSink::resync_begin`].
    #[inline]
    pub fn resync_begin(&mut self, root: &PrimPath) {
        forward!(self, resync_begin(root));
    }

    /// See [`SyncSink::classified`].
    #[inline]
    pub fn classified(&mut self, event: &ClassifiedEvent) {
        forward!(self, classified(event));
    }

    /// See [`SyncSink::chain_built`].
    #[inline]
    pub fn chain_built(&mut self, path: &PrimPath) {
        forward!(self, chain_built(path));
    }

    /// See [`SyncSink::dispatched`].
    #[inline]
    pub fn dispatched(&mut self, translator: &str, path: &PrimPath, kind: DispatchKind) {
        forward!(self, dispatched(translator, path, kind));
    }

    /// See [`SyncSink::cleanup`].
    #[inline]
    pub fn cleanup(&mut self, erased: usize) {
        forward!(self, cleanup(erased));
    }

    /// See [`SyncSink::resync_end`].
    #[inline]
    pub fn resync_end(&mut self, root: &PrimPath) {
        forward!(self, resync_end(root));
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Counting {
        events: Vec<&'static str>,
    }

    impl SyncSink for Counting {
        fn resync_begin(&mut self, _root: &PrimPath) {
            self.events.push("begin");
        }
        fn resync_end(&mut self, _root: &PrimPath) {
            self.events.push("end");
        }
    }

    #[test]
    fn tracer_without_sink_is_inert() {
        let mut tracer = Tracer::disabled();
        tracer.resync_begin(&PrimPath::new("/a"));
        tracer.cleanup(3);
    }

    #[test]
    fn unimplemented_events_default_to_noop() {
        let mut sink = Counting::default();
        sink.notice(1, 2);
        sink.cleanup(0);
        sink.resync_begin(&PrimPath::new("/a"));
        assert_eq!(sink.events, ["begin"]);
    }
}
