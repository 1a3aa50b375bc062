// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Groups serialized events into size-bounded bulk payloads.
//!
//! The threshold is a trigger rather than a hard cap: an event is always
//! appended to the open bin first, and the bin is sealed once its running
//! size reaches the threshold. A sealed bin therefore holds at least one
//! event and exceeds the threshold by at most the size of its last event.

use crate::DEFAULT_BULK_THRESHOLD_BYTES;

/// An ordered, non-empty group of serialized events shipped in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPayload {
    events: Vec<String>,
    size_bytes: usize,
}

impl BulkPayload {
    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of the serialized event sizes, separators excluded.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Newline-delimited request body.
    pub fn body(&self) -> String {
        self.events.join("\n")
    }

    fn push(&mut self, event: String) {
        self.size_bytes += event.len();
        self.events.push(event);
    }
}

#[derive(Debug, Clone)]
pub struct BulkBatcher {
    threshold_bytes: usize,
    current: BulkPayload,
    sealed: usize,
}

impl Default for BulkBatcher {
    fn default() -> Self {
        BulkBatcher::new(DEFAULT_BULK_THRESHOLD_BYTES)
    }
}

impl BulkBatcher {
    pub fn new(threshold_bytes: usize) -> Self {
        BulkBatcher {
            threshold_bytes,
            current: BulkPayload::default(),
            sealed: 0,
        }
    }

    /// Appends `event`, returning the bin it sealed, if any.
    #[must_use]
    pub fn add(&mut self, event: String) -> Option<BulkPayload> {
        self.current.push(event);
        if self.current.size_bytes >= self.threshold_bytes {
            self.sealed += 1;
            return Some(std::mem::take(&mut self.current));
        }
        None
    }

    /// Seals whatever is left, regardless of size. Returns `None` when the
    /// open bin is empty.
    #[must_use]
    pub fn finalize(&mut self) -> Option<BulkPayload> {
        if self.current.is_empty() {
            return None;
        }
        self.sealed += 1;
        Some(std::mem::take(&mut self.current))
    }

    /// Number of bins sealed so far.
    pub fn sealed_bins(&self) -> usize {
        self.sealed
    }

    /// Bytes accumulated in the open bin.
    pub fn pending_bytes(&self) -> usize {
        self.current.size_bytes
    }
}
