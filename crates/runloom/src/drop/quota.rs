// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation bookkeeping for drop quotas.
//!
//! A slot is reserved before an item is moved, released if the move or drop
//! fails, and committed once the item is confirmed on the ground. Reserved
//! plus committed never exceeds the quota, so retries cannot overshoot it.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Slot {
    quota: u32,
    reserved: u32,
    committed: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropQuotaTracker {
    slots: BTreeMap<String, Slot>,
}

impl DropQuotaTracker {
    pub fn new(quotas: &BTreeMap<String, u32>) -> Self {
        let slots = quotas
            .iter()
            .map(|(name, quota)| {
                (
                    name.clone(),
                    Slot {
                        quota: *quota,
                        ..Slot::default()
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// Whether `name` has a quota at all.
    pub fn tracks(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Reserve one slot for `name`. False when the quota is used up.
    pub fn try_reserve(&mut self, name: &str) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) if slot.reserved + slot.committed < slot.quota => {
                slot.reserved += 1;
                true
            }
            _ => false,
        }
    }

    /// Give back a reservation after a failed attempt.
    pub fn release(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.reserved = slot.reserved.saturating_sub(1);
        }
    }

    /// Turn a reservation into a confirmed drop. False without a reservation.
    pub fn commit(&mut self, name: &str) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) if slot.reserved > 0 => {
                slot.reserved -= 1;
                slot.committed += 1;
                true
            }
            _ => false,
        }
    }

    /// Slots neither reserved nor committed.
    pub fn remaining(&self, name: &str) -> u32 {
        self.slots
            .get(name)
            .map(|s| s.quota - s.reserved - s.committed)
            .unwrap_or(0)
    }

    pub fn committed(&self, name: &str) -> u32 {
        self.slots.get(name).map(|s| s.committed).unwrap_or(0)
    }

    /// Reservations not yet committed or released, across all items.
    pub fn outstanding(&self) -> u64 {
        self.slots.values().map(|s| u64::from(s.reserved)).sum()
    }

    pub fn total_committed(&self) -> u64 {
        self.slots.values().map(|s| u64::from(s.committed)).sum()
    }

    /// Every quota fully committed.
    pub fn is_satisfied(&self) -> bool {
        self.slots.values().all(|s| s.committed == s.quota)
    }

    /// Committed drops per item name, omitting items never dropped.
    pub fn committed_counts(&self) -> BTreeMap<String, u32> {
        self.slots
            .iter()
            .filter(|(_, s)| s.committed > 0)
            .map(|(name, s)| (name.clone(), s.committed))
            .collect()
    }
}

#[cfg(test)]
#[path = "quota_tests.rs"]
mod tests;
