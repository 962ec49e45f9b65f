//! PyO3 bindings
//!
//! Exposes the two scenario runs to Python. Requests and responses cross the
//! boundary as JSON strings (see `scenario::request`).
//!
//! ```python
//! from midnight_rebalance_core_rs import run_midnight_scenario
//!
//! request = {
//!     "config": {"bucket_minutes": 15, "total_bikes_ratio": 0.6},
//!     "stations": [{"station_id": "A", "capacity": 10}],
//!     "trips": [],
//! }
//! response = json.loads(run_midnight_scenario(json.dumps(request)))
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::scenario::{run_json, ScenarioError, ScenarioMode};

fn to_py_err(err: ScenarioError) -> PyErr {
    PyErr::new::<PyValueError, _>(err.to_string())
}

/// Replay the proportional baseline allocation
#[pyfunction]
pub fn run_baseline_scenario(request_json: &str) -> PyResult<String> {
    run_json(request_json, ScenarioMode::Baseline).map_err(to_py_err)
}

/// Optimize the midnight allocation, then replay it
#[pyfunction]
pub fn run_midnight_scenario(request_json: &str) -> PyResult<String> {
    run_json(request_json, ScenarioMode::Midnight).map_err(to_py_err)
}
