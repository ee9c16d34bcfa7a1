//! Configuration types for the weekly allocator.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

/// Starter checklist of subjects offered for every child.
const DEFAULT_SUBJECTS: [&str; 8] = [
    "Math",
    "English",
    "Science",
    "Art",
    "Music",
    "PE",
    "History",
    "Geography",
];

/// Runtime knobs for one allocation call.
///
/// The allocation itself is fully determined by the request; the config only
/// controls diagnostics.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    #[serde(default)]
    pub verbosity: u8,
}

impl AllocatorConfig {
    pub fn with_verbosity(verbosity: u8) -> Self {
        Self { verbosity }
    }
}

#[pymethods]
impl AllocatorConfig {
    #[new]
    #[pyo3(signature = (verbosity=0))]
    fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    fn __repr__(&self) -> String {
        format!("AllocatorConfig(verbosity={})", self.verbosity)
    }
}

/// Subject names pre-ticked for a newly added child.
pub fn default_subjects() -> Vec<String> {
    DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect()
}
