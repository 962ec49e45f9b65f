//! Tests for station registry construction and allocations over it

use midnight_rebalance_core_rs::{
    Allocation, ConfigError, Station, StationRecord, StationRegistry,
};

fn records() -> Vec<StationRecord> {
    vec![
        StationRecord::new("7002", Some(20)),
        StationRecord::new("7000", Some(15)),
        StationRecord::new("7001", None),
        StationRecord::new("7003", Some(0)),
        StationRecord::new("7004", Some(-5)),
        StationRecord::new("7000", Some(99)),
    ]
}

// ============================================================================
// Registry construction
// ============================================================================

#[test]
fn test_station_rejects_non_positive_capacity() {
    assert!(matches!(
        Station::new("X", 0),
        Err(ConfigError::NonPositiveCapacity { capacity: 0, .. })
    ));
    assert!(Station::new("X", -3).is_err());
    assert!(Station::new("X", 1).is_ok());
}

#[test]
fn test_from_records_excludes_invalid_capacity() {
    let registry = StationRegistry::from_records(records());

    assert_eq!(registry.len(), 2);
    assert!(registry.get("7001").is_none(), "missing capacity is excluded");
    assert!(registry.get("7003").is_none(), "zero capacity is excluded");
    assert!(registry.get("7004").is_none(), "negative capacity is excluded");

    let diagnostics = registry.diagnostics();
    assert_eq!(diagnostics.accepted, 2);
    assert_eq!(diagnostics.missing_capacity, 1);
    assert_eq!(diagnostics.non_positive_capacity, 2);
    assert_eq!(diagnostics.duplicates, 1);
    assert_eq!(diagnostics.excluded(), 4);
}

#[test]
fn test_first_duplicate_wins() {
    let registry = StationRegistry::from_records(records());
    assert_eq!(registry.get("7000").unwrap().capacity(), 15);
}

#[test]
fn test_stations_are_ordered_by_id() {
    let registry = StationRegistry::new(vec![
        Station::new("C", 5).unwrap(),
        Station::new("A", 5).unwrap(),
        Station::new("B", 5).unwrap(),
    ]);

    let ids: Vec<&str> = registry.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(registry.index_of("A"), Some(0));
    assert_eq!(registry.index_of("C"), Some(2));
    assert_eq!(registry.index_of("Z"), None);
}

#[test]
fn test_total_capacity() {
    let registry = StationRegistry::from_records(records());
    assert_eq!(registry.total_capacity(), 35);
    assert_eq!(StationRegistry::default().total_capacity(), 0);
}

// ============================================================================
// Allocations
// ============================================================================

#[test]
fn test_proportional_allocation_sums_exactly() {
    let registry = StationRegistry::new(vec![
        Station::new("A", 7).unwrap(),
        Station::new("B", 11).unwrap(),
        Station::new("C", 13).unwrap(),
    ]);

    for total in 0..=31 {
        let allocation = Allocation::proportional(&registry, total);
        assert_eq!(allocation.total(), total);
        for (index, station) in registry.iter().enumerate() {
            assert!(allocation.get(index) <= station.capacity());
        }
    }
}

#[test]
fn test_proportional_allocation_clamps_to_capacity() {
    let registry = StationRegistry::new(vec![
        Station::new("A", 4).unwrap(),
        Station::new("B", 6).unwrap(),
    ]);

    let allocation = Allocation::proportional(&registry, 50);
    assert_eq!(allocation.bikes(), &[4, 6]);
}

#[test]
fn test_from_ratio_sixty_percent() {
    let registry = StationRegistry::new(vec![
        Station::new("A", 10).unwrap(),
        Station::new("B", 20).unwrap(),
    ]);

    let allocation = Allocation::from_ratio(&registry, 0.6).unwrap();
    assert_eq!(allocation.bikes(), &[6, 12]);
}

#[test]
fn test_from_ratio_rounds_half_fleet_to_even() {
    let registry = StationRegistry::new(vec![
        Station::new("A", 10).unwrap(),
        Station::new("B", 10).unwrap(),
        Station::new("C", 5).unwrap(),
    ]);

    // 25 docks at 0.5 is 12.5 bikes
    let allocation = Allocation::from_ratio(&registry, 0.5).unwrap();
    assert_eq!(allocation.total(), 12);
    assert_eq!(allocation.bikes(), &[5, 5, 2]);
}

#[test]
fn test_from_ratio_rejects_out_of_range() {
    let registry = StationRegistry::new(vec![Station::new("A", 10).unwrap()]);
    assert_eq!(
        Allocation::from_ratio(&registry, 1.5),
        Err(ConfigError::RatioOutOfRange(1.5))
    );
    assert!(Allocation::from_ratio(&registry, -0.1).is_err());
}

#[test]
fn test_from_counts_clamps_and_ignores_unknown() {
    let registry = StationRegistry::new(vec![
        Station::new("A", 10).unwrap(),
        Station::new("B", 10).unwrap(),
        Station::new("C", 10).unwrap(),
    ]);

    let allocation = Allocation::from_counts(&registry, [("A", 25), ("B", -4), ("Z", 3)]);
    assert_eq!(allocation.bikes(), &[10, 0, 0]);

    let map = allocation.to_map(&registry);
    assert_eq!(map.get("A"), Some(&10));
    assert_eq!(map.get("C"), Some(&0));
    assert_eq!(map.len(), 3);
}
