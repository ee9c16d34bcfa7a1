//! Rust implementation of the homeschool planner's weekly timetable allocator.
//!
//! Given children, recurring subjects, fixed commitments and a daily time
//! window, the allocator fills a day x child x slot grid without double
//! booking and reports the sessions it could not fit. The same crate builds
//! the Python extension the planner front-end calls.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

pub mod allocator;
mod config;
pub mod export;
mod interner;
pub mod logging;
mod models;

pub use allocator::{allocate, AllocationError, ErrorKind, WeeklyAllocator};
pub use config::{default_subjects, AllocatorConfig};
pub use export::{child_agenda, grid_rows, AgendaEntry, GridRow};
pub use interner::{ChildId, ChildInterner};
pub use models::{
    AllocationRequest, AllocationResult, ConfigIssue, DayColumn, FixedCommitment, Occupant,
    SubjectSpec, TimeWindow, UnscheduledEntry,
};

/// Allocate a week from a JSON request, returning the JSON result.
///
/// Only malformed JSON is an error; configuration problems are reported inside
/// the result's `errors` list like any other call.
pub fn allocate_json(
    request_json: &str,
    config: &AllocatorConfig,
) -> Result<String, serde_json::Error> {
    let request: AllocationRequest = serde_json::from_str(request_json)?;
    serde_json::to_string(&allocate(&request, config))
}

/// Fill the weekly grid for a request.
///
/// # Arguments
/// * `request` - Children, active days, time window, subjects and commitments
/// * `config` - Allocator configuration (defaults to silent)
///
/// # Returns
/// * AllocationResult with the grid, unscheduled sessions and configuration errors
#[pyfunction]
#[pyo3(name = "allocate", signature = (request, config=None))]
fn py_allocate(request: AllocationRequest, config: Option<AllocatorConfig>) -> AllocationResult {
    allocate(&request, &config.unwrap_or_default())
}

/// Same as `allocate`, over JSON strings in the camelCase request shape.
///
/// # Raises
/// * ValueError if the request is not valid JSON for an AllocationRequest
#[pyfunction]
#[pyo3(name = "allocate_json", signature = (request_json, verbosity=0))]
fn py_allocate_json(request_json: &str, verbosity: u8) -> PyResult<String> {
    allocate_json(request_json, &AllocatorConfig::with_verbosity(verbosity))
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Starter subject checklist for a new child.
#[pyfunction]
#[pyo3(name = "default_subjects")]
fn py_default_subjects() -> Vec<String> {
    default_subjects()
}

/// Occupied cells as flat rows (day, time, child, label, flags).
#[pyfunction]
#[pyo3(name = "grid_rows")]
fn py_grid_rows(result: AllocationResult) -> Vec<GridRow> {
    grid_rows(&result)
}

/// Placed blocks for one child on one day.
#[pyfunction]
#[pyo3(name = "child_agenda")]
fn py_child_agenda(result: AllocationResult, child: &str, day: &str) -> Vec<AgendaEntry> {
    child_agenda(&result, child, day)
}

/// The homeplan.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Request and result types
    m.add_class::<TimeWindow>()?;
    m.add_class::<SubjectSpec>()?;
    m.add_class::<FixedCommitment>()?;
    m.add_class::<AllocationRequest>()?;
    m.add_class::<Occupant>()?;
    m.add_class::<UnscheduledEntry>()?;
    m.add_class::<ConfigIssue>()?;
    m.add_class::<AllocationResult>()?;
    m.add_class::<GridRow>()?;
    m.add_class::<AgendaEntry>()?;

    // Config types
    m.add_class::<AllocatorConfig>()?;

    // Algorithms and views
    m.add_function(wrap_pyfunction!(py_allocate, m)?)?;
    m.add_function(wrap_pyfunction!(py_allocate_json, m)?)?;
    m.add_function(wrap_pyfunction!(py_default_subjects, m)?)?;
    m.add_function(wrap_pyfunction!(py_grid_rows, m)?)?;
    m.add_function(wrap_pyfunction!(py_child_agenda, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_json_round_trip() {
        let json = r#"{
            "children": ["A"],
            "daySet": ["Monday", "Tuesday"],
            "window": {"startTime": "08:00:00", "endTime": "09:00:00", "blockMinutes": 30},
            "subjects": [{"name": "Math", "durationMinutes": 30, "sessionsPerWeek": 2,
                          "participants": ["A"]}]
        }"#;

        let output = allocate_json(json, &AllocatorConfig::default()).unwrap();
        let result: AllocationResult = serde_json::from_str(&output).unwrap();

        assert!(result.errors.is_empty());
        assert!(result.unscheduled.is_empty());
        assert_eq!(result.cell("Monday", "A", 0).unwrap().label, "Math");
        assert_eq!(result.cell("Tuesday", "A", 0).unwrap().label, "Math");
        assert!(output.contains("\"isSessionStart\":true"));
    }

    #[test]
    fn test_allocate_json_reports_config_errors_in_result() {
        let json = r#"{"children": ["A"], "daySet": []}"#;
        let output = allocate_json(json, &AllocatorConfig::default()).unwrap();
        let result: AllocationResult = serde_json::from_str(&output).unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, "EmptyDaySet");
        assert!(result.grid.is_empty());
    }

    #[test]
    fn test_allocate_json_rejects_malformed_input() {
        assert!(allocate_json("{not json", &AllocatorConfig::default()).is_err());
        assert!(allocate_json(r#"{"daySet": ["Monday"]}"#, &AllocatorConfig::default()).is_err());
    }
}
