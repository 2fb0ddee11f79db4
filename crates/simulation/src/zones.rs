//! Storage and resolution of volatility zones.
//!
//! Zones live in a slot arena addressed by generational [`ZoneId`]s. Expired
//! zones are evicted by an explicit [`ZoneArena::sweep`], which the session
//! runs once per tick, so the arena never grows past the number of zones
//! that can be simultaneously active.

use serde::{Deserialize, Serialize};
use tracing::debug;
use volsim_domain::enums::Severity;
use volsim_domain::value_objects::VolatilityZone;

/// How overlapping active zones combine into one multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneResolution {
    /// Strongest severity among all active zones.
    #[default]
    MaxSeverity,
    /// Oldest active zone, regardless of severity.
    FirstMatch,
}

/// Handle to a zone stored in a [`ZoneArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<(u64, VolatilityZone)>,
}

/// Slot arena of volatility zones.
#[derive(Debug, Clone, Default)]
pub struct ZoneArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_seq: u64,
    live: usize,
}

impl ZoneArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a zone, reusing an evicted slot when one is free.
    pub fn insert(&mut self, zone: VolatilityZone) -> ZoneId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some((seq, zone));
            return ZoneId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some((seq, zone)),
        });
        ZoneId {
            index,
            generation: 0,
        }
    }

    /// Returns the zone behind `id` if it has not been evicted.
    #[must_use]
    pub fn get(&self, id: ZoneId) -> Option<&VolatilityZone> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .map(|(_, zone)| zone)
    }

    /// Evicts every zone that is no longer active at `now`.
    ///
    /// Returns the number of evicted zones.
    pub fn sweep(&mut self, now: i64) -> usize {
        let mut evicted = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let expired = slot
                .entry
                .is_some_and(|(_, zone)| !zone.is_active(now));
            if expired {
                slot.entry = None;
                self.free.push(index as u32);
                evicted += 1;
            }
        }
        self.live -= evicted;
        if evicted > 0 {
            debug!(evicted, remaining = self.live, "Swept expired volatility zones");
        }
        evicted
    }

    /// Active zones at `now`, oldest first.
    #[must_use]
    pub fn active(&self, now: i64) -> Vec<VolatilityZone> {
        let mut active: Vec<(u64, VolatilityZone)> = self
            .slots
            .iter()
            .filter_map(|slot| slot.entry)
            .filter(|(_, zone)| zone.is_active(now))
            .collect();
        active.sort_by_key(|(seq, _)| *seq);
        active.into_iter().map(|(_, zone)| zone).collect()
    }

    /// Severity in force at `now` under `policy`, if any zone is active.
    #[must_use]
    pub fn resolve(&self, now: i64, policy: ZoneResolution) -> Option<Severity> {
        let active = self
            .slots
            .iter()
            .filter_map(|slot| slot.entry)
            .filter(|(_, zone)| zone.is_active(now));

        match policy {
            ZoneResolution::MaxSeverity => active.map(|(_, zone)| zone.severity).max(),
            ZoneResolution::FirstMatch => active
                .min_by_key(|(seq, _)| *seq)
                .map(|(_, zone)| zone.severity),
        }
    }

    /// Volatility multiplier at `now`: 5 for extreme, 2 for high, else 1.
    #[must_use]
    pub fn multiplier(&self, now: i64, policy: ZoneResolution) -> f64 {
        self.resolve(now, policy)
            .map_or(1.0, Severity::multiplier)
    }

    /// Number of stored (not yet swept) zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drops every zone and invalidates all outstanding ids.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}

/// Base volatility scaled by the zone multiplier in force at `now`.
#[must_use]
pub fn effective_volatility(
    base_volatility: f64,
    zones: &ZoneArena,
    now: i64,
    policy: ZoneResolution,
) -> f64 {
    base_volatility * zones.multiplier(now, policy)
}
