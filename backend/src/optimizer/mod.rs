//! Midnight allocation optimizer
//!
//! - `context`: per-station cost cache and the mutable search state
//! - `greedy`: the swap loop, convergence and audit result

pub mod context;
pub mod greedy;

pub use context::{SearchContext, StationCostCache, StationEntry, Swap, IMPROVEMENT_EPSILON};
pub use greedy::{MidnightOptimizer, OptimizationResult, SwapMove, DEFAULT_MIN_MOVE_CAP};
