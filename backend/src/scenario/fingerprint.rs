//! Input fingerprints for scenario audit
//!
//! A scenario's metadata carries a SHA-256 digest of its canonicalized
//! inputs (configuration, mode, midnight allocation, averaged days), so two
//! exported scenarios can be checked for identical provenance.

use crate::scenario::ScenarioError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the canonical JSON form of `value`
///
/// The value is routed through `serde_json::Value`, whose object maps keep
/// keys sorted, so struct field order never changes the digest.
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String, ScenarioError> {
    let canonical = serde_json::to_value(value)
        .and_then(|tree| serde_json::to_vec(&tree))
        .map_err(|e| ScenarioError::Serialization(format!("Digest input encoding failed: {}", e)))?;

    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Forward {
        station: &'static str,
        bikes: u32,
    }

    #[derive(Serialize)]
    struct Reversed {
        bikes: u32,
        station: &'static str,
    }

    #[test]
    fn test_field_order_does_not_change_digest() {
        let a = canonical_digest(&Forward { station: "A", bikes: 4 }).unwrap();
        let b = canonical_digest(&Reversed { bikes: 4, station: "A" }).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_nested_key_order_does_not_change_digest() {
        let a = canonical_digest(&json!({"cost": {"w_full": 1, "w_empty": 2}, "mode": "midnight"}))
            .unwrap();
        let b = canonical_digest(&json!({"mode": "midnight", "cost": {"w_empty": 2, "w_full": 1}}))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_differ() {
        let a = canonical_digest(&json!({"a": 1})).unwrap();
        let b = canonical_digest(&json!({"a": 2})).unwrap();
        assert_ne!(a, b);
    }
}
