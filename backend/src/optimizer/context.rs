//! Search state for the greedy swap optimizer
//!
//! `StationCostCache` is an arena of per-station entries indexed by registry
//! position. Each entry holds the station's current level trajectory, cost,
//! and the cost change of adding or removing one bike. Because a station's
//! cost depends only on its own count, a swap refreshes exactly the donor
//! and receiver entries; every other entry stays valid.
//!
//! `SearchContext` owns the candidate allocation, the cache and the move log
//! for one optimization run. Nothing is shared between runs, so independent
//! runs (e.g. a parameter sweep) can execute concurrently.

use crate::costs::CostModel;
use crate::flows::NetFlowSeries;
use crate::models::allocation::Allocation;
use crate::models::station::StationRegistry;
use serde::Serialize;

/// Combined cost change a swap must beat to count as a strict improvement
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Cached evaluation of one station at its current midnight count
#[derive(Debug, Clone, PartialEq)]
pub struct StationEntry {
    pub bikes: u32,
    pub capacity: u32,
    /// Clamped level per bucket at the current count
    pub levels: Vec<f64>,
    pub cost: f64,
    /// cost(bikes + 1) - cost(bikes); None when full
    pub add_delta: Option<f64>,
    /// cost(bikes - 1) - cost(bikes); None when empty
    pub remove_delta: Option<f64>,
}

impl StationEntry {
    fn evaluate(model: &CostModel, bikes: u32, capacity: u32, deltas: &[f64]) -> Self {
        let levels = CostModel::station_levels(bikes, capacity, deltas);
        let cost = model
            .score_levels(capacity, levels.iter().copied())
            .total();
        let add_delta =
            (bikes < capacity).then(|| model.station_cost(bikes + 1, capacity, deltas) - cost);
        let remove_delta =
            (bikes > 0).then(|| model.station_cost(bikes - 1, capacity, deltas) - cost);
        Self {
            bikes,
            capacity,
            levels,
            cost,
            add_delta,
            remove_delta,
        }
    }
}

/// Per-station trajectory and marginal-cost cache
#[derive(Debug, Clone, PartialEq)]
pub struct StationCostCache {
    entries: Vec<StationEntry>,
}

impl StationCostCache {
    /// Evaluate every station at its allocated count
    pub fn build(
        model: &CostModel,
        registry: &StationRegistry,
        allocation: &Allocation,
        flows: &NetFlowSeries,
    ) -> Self {
        let entries = registry
            .iter()
            .enumerate()
            .map(|(index, station)| {
                StationEntry::evaluate(
                    model,
                    allocation.get(index),
                    station.capacity(),
                    flows.station(index),
                )
            })
            .collect();
        Self { entries }
    }

    /// Re-evaluate one station after its count changed
    pub fn refresh(&mut self, model: &CostModel, index: usize, bikes: u32, flows: &NetFlowSeries) {
        let capacity = self.entries[index].capacity;
        self.entries[index] = StationEntry::evaluate(model, bikes, capacity, flows.station(index));
    }

    pub fn entry(&self, index: usize) -> &StationEntry {
        &self.entries[index]
    }

    pub fn entries(&self) -> &[StationEntry] {
        &self.entries
    }

    /// Sum of cached station costs in registry order
    pub fn total_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.cost).sum()
    }
}

/// One accepted donor → receiver move, by arena index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Swap {
    pub donor: usize,
    pub receiver: usize,
    /// remove_delta(donor) + add_delta(receiver); negative when improving
    pub cost_change: f64,
}

/// Mutable state of one optimization run
#[derive(Debug, Clone)]
pub struct SearchContext {
    allocation: Allocation,
    cache: StationCostCache,
    swaps: Vec<Swap>,
}

impl SearchContext {
    pub fn new(
        model: &CostModel,
        registry: &StationRegistry,
        flows: &NetFlowSeries,
        allocation: Allocation,
    ) -> Self {
        let cache = StationCostCache::build(model, registry, &allocation, flows);
        Self {
            allocation,
            cache,
            swaps: Vec::new(),
        }
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn cache(&self) -> &StationCostCache {
        &self.cache
    }

    /// Accepted swaps, in order
    pub fn swaps(&self) -> &[Swap] {
        &self.swaps
    }

    pub fn total_cost(&self) -> f64 {
        self.cache.total_cost()
    }

    /// Best donor/receiver pair with distinct stations
    ///
    /// Minimizes `remove_delta(donor) + add_delta(receiver)`. Among equal
    /// sums the lowest donor id wins, then the lowest receiver id.
    pub fn best_swap(&self) -> Option<Swap> {
        let donors = lowest_two(self.cache.entries.iter().map(|e| e.remove_delta));
        let receivers = lowest_two(self.cache.entries.iter().map(|e| e.add_delta));

        let (donor, donor_delta) = donors[0]?;
        let (receiver, receiver_delta) = receivers[0]?;

        if donor != receiver {
            return Some(Swap {
                donor,
                receiver,
                cost_change: donor_delta + receiver_delta,
            });
        }

        // Same station is best at both: pair it with the runner-up on the other side
        let keep_donor = receivers[1].map(|(r, rd)| Swap {
            donor,
            receiver: r,
            cost_change: donor_delta + rd,
        });
        let keep_receiver = donors[1].map(|(d, dd)| Swap {
            donor: d,
            receiver,
            cost_change: dd + receiver_delta,
        });

        match (keep_donor, keep_receiver) {
            (Some(a), Some(b)) => {
                let b_first = (b.donor, b.receiver) < (a.donor, a.receiver);
                if b.cost_change < a.cost_change || (b.cost_change == a.cost_change && b_first) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, b) => a.or(b),
        }
    }

    /// Apply the best swap if it strictly lowers total cost
    ///
    /// Returns the applied swap, or None when no improving swap exists.
    pub fn step(&mut self, model: &CostModel, flows: &NetFlowSeries) -> Option<Swap> {
        let swap = self.best_swap()?;
        if swap.cost_change >= -IMPROVEMENT_EPSILON {
            return None;
        }

        self.allocation.transfer_one(swap.donor, swap.receiver);
        self.cache
            .refresh(model, swap.donor, self.allocation.get(swap.donor), flows);
        self.cache
            .refresh(model, swap.receiver, self.allocation.get(swap.receiver), flows);
        self.swaps.push(swap);
        Some(swap)
    }

    pub(crate) fn into_parts(self) -> (Allocation, StationCostCache, Vec<Swap>) {
        (self.allocation, self.cache, self.swaps)
    }
}

/// Two lowest values with their indices, lowest index first on ties
fn lowest_two(values: impl Iterator<Item = Option<f64>>) -> [Option<(usize, f64)>; 2] {
    let mut best: [Option<(usize, f64)>; 2] = [None, None];
    for (index, value) in values.enumerate() {
        let Some(value) = value else { continue };
        match (best[0], best[1]) {
            (None, _) => best[0] = Some((index, value)),
            (Some((_, first)), _) if value < first => {
                best[1] = best[0];
                best[0] = Some((index, value));
            }
            (_, None) => best[1] = Some((index, value)),
            (_, Some((_, second))) if value < second => best[1] = Some((index, value)),
            _ => {}
        }
    }
    best
}
