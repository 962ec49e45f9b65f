//! Tests for the greedy midnight optimizer

use midnight_rebalance_core_rs::optimizer::{SearchContext, DEFAULT_MIN_MOVE_CAP};
use midnight_rebalance_core_rs::{
    Allocation, CostModel, CostParameters, MidnightOptimizer, NetFlowSeries, ScenarioConfig,
    Station, StationRegistry, TimeBucketer,
};

const EPS: f64 = 1e-9;

fn params() -> CostParameters {
    CostParameters {
        empty_thr: 0.2,
        full_thr: 0.8,
        w_empty: 1.0,
        w_full: 1.0,
    }
}

fn registry(ids: &[&str], capacity: i64) -> StationRegistry {
    StationRegistry::new(
        ids.iter()
            .map(|id| Station::new(*id, capacity).unwrap())
            .collect(),
    )
}

/// Four morning buckets of one bike each, as a 24-bucket hourly series
fn morning(sign: f64) -> Vec<f64> {
    let mut deltas = vec![0.0; 24];
    for bucket in 6..10 {
        deltas[bucket] = sign;
    }
    deltas
}

// ============================================================================
// Concrete two-station scenario
// ============================================================================

#[test]
fn test_bikes_move_from_filling_to_emptying_station() {
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0)), ("B", morning(1.0))],
    );

    let optimizer = MidnightOptimizer::new(params()).unwrap();
    let result = optimizer.optimize(&registry, &flows, 10);

    // Proportional start is [5, 5]: A bottoms out at 1, B tops out at 9
    assert!((result.initial_cost - 30.0).abs() < EPS);

    assert_eq!(result.allocation.bikes(), &[6, 4]);
    assert_eq!(result.move_count(), 1);
    assert_eq!(result.moves[0].donor, "B");
    assert_eq!(result.moves[0].receiver, "A");
    assert!(result.moves[0].cost_change < 0.0);
    assert!(result.final_cost.abs() < EPS);
    assert!(result.converged);
    assert!((result.improvement() - 30.0).abs() < EPS);
}

#[test]
fn test_result_records_run_parameters() {
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::zeros(&registry, TimeBucketer::new(15).unwrap());

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 10);

    assert_eq!(result.params, params());
    assert_eq!(result.bucket_minutes, 15);
    assert_eq!(result.total_bikes, 10);
    assert_eq!(result.max_moves, DEFAULT_MIN_MOVE_CAP);

    let by_station = result.bikes_by_station(&registry);
    assert_eq!(by_station.get("A"), Some(&5));
    assert_eq!(by_station.get("B"), Some(&5));
}

// ============================================================================
// Tie-breaking
// ============================================================================

#[test]
fn test_ties_break_towards_lowest_station_id() {
    // A and B drain identically, C and D fill identically
    let registry = registry(&["A", "B", "C", "D"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [
            ("A", morning(-1.0)),
            ("B", morning(-1.0)),
            ("C", morning(1.0)),
            ("D", morning(1.0)),
        ],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 20);

    let moves: Vec<(&str, &str)> = result
        .moves
        .iter()
        .map(|m| (m.donor.as_str(), m.receiver.as_str()))
        .collect();
    assert_eq!(moves, vec![("C", "A"), ("D", "B")]);
    assert_eq!(result.allocation.bikes(), &[6, 6, 4, 4]);
}

#[test]
fn test_best_swap_never_pairs_station_with_itself() {
    // A is the only possible donor and also the best receiver
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0)), ("B", morning(1.0))],
    );
    let model = CostModel::new(params()).unwrap();
    let allocation = Allocation::from_counts(&registry, [("A", 5), ("B", 0)]);

    let context = SearchContext::new(&model, &registry, &flows, allocation);
    assert!(context.cache().entry(1).remove_delta.is_none());

    let swap = context.best_swap().unwrap();
    assert_eq!((swap.donor, swap.receiver), (0, 1));
    // Not an improvement, so a step leaves the allocation alone
    assert!(swap.cost_change > 0.0);
}

// ============================================================================
// Degenerate inputs
// ============================================================================

#[test]
fn test_zero_flows_leave_allocation_unchanged() {
    let registry = registry(&["A", "B", "C"], 12);
    let flows = NetFlowSeries::zeros(&registry, TimeBucketer::new(60).unwrap());

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 18);

    assert_eq!(result.allocation.bikes(), &[6, 6, 6]);
    assert!(result.moves.is_empty());
    assert!(result.converged);
}

#[test]
fn test_full_network_has_no_receivers() {
    let registry = registry(&["A", "B"], 5);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0)), ("B", morning(1.0))],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 10);

    assert_eq!(result.allocation.bikes(), &[5, 5]);
    assert!(result.moves.is_empty());
    assert!(result.converged);
}

#[test]
fn test_empty_fleet_has_no_donors() {
    let registry = registry(&["A", "B"], 5);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(1.0))],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 0);

    assert_eq!(result.allocation.total(), 0);
    assert!(result.moves.is_empty());
}

#[test]
fn test_single_station_cannot_swap() {
    let registry = registry(&["A"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0))],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize(&registry, &flows, 5);

    assert_eq!(result.allocation.bikes(), &[5]);
    assert!(result.converged);
}

// ============================================================================
// Move cap
// ============================================================================

#[test]
fn test_zero_move_cap_reports_not_converged() {
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0)), ("B", morning(1.0))],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .with_max_moves(Some(0))
        .optimize(&registry, &flows, 10);

    assert!(result.moves.is_empty());
    assert!(!result.converged);
    assert_eq!(result.allocation.bikes(), &[5, 5]);
    assert_eq!(result.initial_cost, result.final_cost);
}

#[test]
fn test_cap_reached_at_optimum_counts_as_converged() {
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::from_station_deltas(
        &registry,
        TimeBucketer::new(60).unwrap(),
        [("A", morning(-1.0)), ("B", morning(1.0))],
    );

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .with_max_moves(Some(1))
        .optimize(&registry, &flows, 10);

    assert_eq!(result.move_count(), 1);
    assert!(result.converged);
}

#[test]
fn test_from_config_uses_config_cap_and_params() {
    let config = ScenarioConfig {
        cost: params(),
        max_moves: Some(7),
        ..Default::default()
    };
    let optimizer = MidnightOptimizer::from_config(&config).unwrap();
    assert_eq!(optimizer.model().params(), &params());

    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::zeros(&registry, TimeBucketer::new(60).unwrap());
    assert_eq!(optimizer.optimize(&registry, &flows, 4).max_moves, 7);
}

#[test]
fn test_optimize_from_explicit_start() {
    let registry = registry(&["A", "B"], 10);
    let flows = NetFlowSeries::zeros(&registry, TimeBucketer::new(60).unwrap());
    let start = Allocation::from_counts(&registry, [("A", 0), ("B", 10)]);

    let result = MidnightOptimizer::new(params())
        .unwrap()
        .optimize_from(&registry, &flows, start);

    // Both ends start outside the comfort band; the search pulls them in
    assert_eq!(result.allocation.total(), 10);
    assert!(result.allocation.get(0) >= 2);
    assert!(result.allocation.get(1) <= 8);
    assert!(result.final_cost.abs() < EPS);
}
