use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::unit::{CompleteUnit, PendingUnit, UnitMetadata};

/// Outcome of offering one half of a unit to the buffer.
#[derive(Debug)]
pub enum Offer {
    /// Half stored; still waiting for the other half.
    Pending,
    /// Both halves present. The unit has been removed from the buffer and
    /// must now be committed (or restored on failure).
    Ready(CompleteUnit),
    /// The index already has a committed record. Idempotent no-op.
    Duplicate,
}

/// Per-stream reconciliation buffer for one session.
///
/// Keys partial arrivals by sequence index and merges the two halves
/// regardless of arrival order. Exactly one complete unit per index is ever
/// handed out for commit; arrivals after the commit report `Duplicate`.
///
/// Not internally synchronized: the owning session serializes access.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    pending: HashMap<u32, Slot>,
    committed: HashSet<u32>,
}

#[derive(Debug)]
struct Slot {
    unit: PendingUnit,
    attempts: u32,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the metadata half for an index.
    pub fn offer_metadata(&mut self, index: u32, metadata: UnitMetadata) -> Offer {
        if self.committed.contains(&index) {
            return Offer::Duplicate;
        }

        let slot = match self.pending.remove(&index) {
            None => Slot {
                unit: PendingUnit::MetadataOnly(metadata),
                attempts: 0,
            },
            Some(slot) => Slot {
                unit: slot.unit.merge_metadata(metadata),
                attempts: slot.attempts,
            },
        };

        self.settle(index, slot)
    }

    /// Offer the blob half for an index.
    pub fn offer_blob(&mut self, index: u32, blob: Vec<u8>) -> Offer {
        if self.committed.contains(&index) {
            return Offer::Duplicate;
        }

        let slot = match self.pending.remove(&index) {
            None => Slot {
                unit: PendingUnit::BlobOnly(blob),
                attempts: 0,
            },
            Some(slot) => Slot {
                unit: slot.unit.merge_blob(blob),
                attempts: slot.attempts,
            },
        };

        self.settle(index, slot)
    }

    fn settle(&mut self, index: u32, slot: Slot) -> Offer {
        match slot.unit {
            PendingUnit::Complete(metadata, blob) => Offer::Ready(CompleteUnit {
                index,
                metadata,
                blob,
                attempts: slot.attempts,
            }),
            unit => {
                self.pending.insert(index, Slot {
                    unit,
                    attempts: slot.attempts,
                });
                Offer::Pending
            }
        }
    }

    /// Record a successful commit for an index. Later arrivals for it are
    /// reported as duplicates.
    pub fn mark_committed(&mut self, index: u32) {
        self.committed.insert(index);
    }

    pub fn is_committed(&self, index: u32) -> bool {
        self.committed.contains(&index)
    }

    /// Put a complete unit back after a failed commit, with its attempt
    /// count bumped. The next arrival for the index triggers a retry.
    pub fn restore(&mut self, unit: CompleteUnit) {
        self.pending.insert(unit.index, Slot {
            unit: PendingUnit::Complete(unit.metadata, unit.blob),
            attempts: unit.attempts + 1,
        });
    }

    /// Pull any complete units still sitting in the buffer (failed commits
    /// awaiting retry). Used for the best-effort flush at session end.
    pub fn take_retryable(&mut self) -> Vec<CompleteUnit> {
        let ready: Vec<u32> = self
            .pending
            .iter()
            .filter(|(_, slot)| slot.unit.is_complete())
            .map(|(&index, _)| index)
            .collect();

        ready
            .into_iter()
            .filter_map(|index| {
                let slot = self.pending.remove(&index)?;
                match slot.unit {
                    PendingUnit::Complete(metadata, blob) => Some(CompleteUnit {
                        index,
                        metadata,
                        blob,
                        attempts: slot.attempts,
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    /// Drop all partial entries. Returns how many were discarded.
    pub fn drain(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 {
            debug!("Draining {} partial unit(s) from buffer", dropped);
        }
        self.pending.clear();
        dropped
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
