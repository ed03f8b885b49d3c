// Copyright 2026 the Isostasy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured session recording.
//!
//! [`RecorderSink`] implements [`SyncSink`] and accumulates events as
//! [`RecordedEvent`] values. [`RecorderSink::to_json`] serializes the whole
//! session through `serde_json` for post-mortem diffing, and [`decode`]
//! reads a dump back.

use serde::{Deserialize, Serialize};

use isostasy_core::path::PrimPath;
use isostasy_core::trace::{ClassifiedEvent, DispatchKind, SyncSink};

/// One recorded engine event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RecordedEvent {
    /// An objects-changed notice arrived.
    Notice {
        /// Structural path count.
        resynced: usize,
        /// Info-only change count.
        info_only: usize,
    },
    /// A structural path was coalesced away.
    Coalesced {
        /// Path owning the cycle.
        kept: PrimPath,
        /// Path reduced to a teardown candidate.
        dropped: PrimPath,
    },
    /// A resync pass started.
    ResyncBegin {
        /// Subtree root.
        root: PrimPath,
    },
    /// Classification counts for the batch.
    Classified {
        /// Full-import prims.
        new: usize,
        /// Re-sync prims.
        updatable: usize,
        /// Torn-down paths.
        removed: usize,
        /// Ancestor transforms created.
        transform_only: usize,
    },
    /// A transform chain was ensured.
    ChainBuilt {
        /// Chain target.
        path: PrimPath,
    },
    /// A translator operation ran.
    Dispatched {
        /// Translator identity.
        translator: String,
        /// Prim path.
        path: PrimPath,
        /// Operation name (`import`, `update`, `teardown`, `post-import`).
        kind: String,
    },
    /// A table cleanup pass finished.
    Cleanup {
        /// Entries erased.
        erased: usize,
    },
    /// The resync pass finished.
    ResyncEnd {
        /// Subtree root.
        root: PrimPath,
    },
}

fn kind_str(kind: DispatchKind) -> &'static str {
    match kind {
        DispatchKind::Import => "import",
        DispatchKind::Update => "update",
        DispatchKind::Teardown => "teardown",
        DispatchKind::PostImport => "post-import",
    }
}

/// A [`SyncSink`] that accumulates events for later inspection.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Serializes the session as a JSON array.
    ///
    /// # Panics
    ///
    /// Never panics: every [`RecordedEvent`] serializes infallibly.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.events).expect("recorded events serialize")
    }
}

/// Decodes a session dump produced by [`RecorderSink::to_json`].
#[must_use]
pub fn decode(json: &str) -> Vec<RecordedEvent> {
    serde_json::from_str(json).unwrap_or_default()
}

impl SyncSink for RecorderSink {
    fn notice(&mut self, resynced: usize, info_only: usize) {
        self.events.push(RecordedEvent::Notice {
            resynced,
            info_only,
        });
    }

    fn coalesced(&mut self, kept: &PrimPath, dropped: &PrimPath) {
        self.events.push(RecordedEvent::Coalesced {
            kept: kept.clone(),
            dropped: dropped.clone(),
        });
    }

    fn resync_begin(&mut self, root: &PrimPath) {
        self.events
            .push(RecordedEvent::ResyncBegin { root: root.clone() });
    }

    fn classified(&mut self, event: &ClassifiedEvent) {
        self.events.push(RecordedEvent::Classified {
            new: event.new,
            updatable: event.updatable,
            removed: event.removed,
            transform_only: event.transform_only,
        });
    }

    fn chain_built(&mut self, path: &PrimPath) {
        self.events
            .push(RecordedEvent::ChainBuilt { path: path.clone() });
    }

    fn dispatched(&mut self, translator: &str, path: &PrimPath, kind: DispatchKind) {
        self.events.push(RecordedEvent::Dispatched {
            translator: translator.to_owned(),
            path: path.clone(),
            kind: kind_str(kind).to_owned(),
        });
    }

    fn cleanup(&mut self, erased: usize) {
        self.events.push(RecordedEvent::Cleanup { erased });
    }

    fn resync_end(&mut self, root: &PrimPath) {
        self.events
            .push(RecordedEvent::ResyncEnd { root: root.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_json() {
        let mut sink = RecorderSink::new();
        sink.notice(2, 0);
        sink.resync_begin(&PrimPath::new("/grp"));
        sink.dispatched("Mesh", &PrimPath::new("/grp/obj"), DispatchKind::Update);
        sink.cleanup(1);
        sink.resync_end(&PrimPath::new("/grp"));

        let json = sink.to_json();
        let decoded = decode(&json);
        assert_eq!(decoded, sink.events());
    }

    #[test]
    fn decode_tolerates_garbage() {
        assert!(decode("not json").is_empty());
        assert!(decode("").is_empty());
    }
}
