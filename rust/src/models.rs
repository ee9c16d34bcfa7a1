//! Request and result records exchanged with the front-end.
//!
//! These are plain data: the allocator validates them on the way in and never
//! keeps references to them after a call returns.

use chrono::NaiveTime;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Note: We use BTreeMap for the grid so both the Python dict and the JSON
// output come out in a stable order.

/// Per-day time window cut into fixed-size blocks.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[pyo3(get, set)]
    pub start_time: NaiveTime,
    #[pyo3(get, set)]
    pub end_time: NaiveTime,
    #[pyo3(get, set)]
    pub block_minutes: i64,
}

impl Default for TimeWindow {
    /// School day of 07:00 to 17:00 in one-hour blocks.
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            block_minutes: 60,
        }
    }
}

#[pymethods]
impl TimeWindow {
    #[new]
    #[pyo3(signature = (start_time, end_time, block_minutes=60))]
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, block_minutes: i64) -> Self {
        Self {
            start_time,
            end_time,
            block_minutes,
        }
    }

    /// Length of the window in minutes (negative when end precedes start).
    pub fn span_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    fn __repr__(&self) -> String {
        format!(
            "TimeWindow(start={}, end={}, block_minutes={})",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            self.block_minutes
        )
    }
}

/// A recurring subject to spread over the week.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSpec {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration_minutes: i64,
    #[pyo3(get, set)]
    pub sessions_per_week: u32,
    /// Empty means every known child.
    #[pyo3(get, set)]
    #[serde(default)]
    pub participants: Vec<String>,
    /// Overrides the participant-count rule for shared sessions.
    #[pyo3(get, set)]
    #[serde(default)]
    pub shared: Option<bool>,
}

#[pymethods]
impl SubjectSpec {
    #[new]
    #[pyo3(signature = (name, duration_minutes, sessions_per_week, participants=None, shared=None))]
    pub fn new(
        name: String,
        duration_minutes: i64,
        sessions_per_week: u32,
        participants: Option<Vec<String>>,
        shared: Option<bool>,
    ) -> Self {
        Self {
            name,
            duration_minutes,
            sessions_per_week,
            participants: participants.unwrap_or_default(),
            shared,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SubjectSpec(name={:?}, duration_minutes={}, sessions_per_week={}, participants={:?})",
            self.name, self.duration_minutes, self.sessions_per_week, self.participants
        )
    }
}

/// A pinned, non-negotiable reservation such as a weekly club or appointment.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCommitment {
    #[pyo3(get, set)]
    pub day: String,
    #[pyo3(get, set)]
    #[serde(alias = "startSlotTime")]
    pub start_time: NaiveTime,
    #[pyo3(get, set)]
    pub duration_minutes: i64,
    #[pyo3(get, set)]
    pub label: String,
    /// Empty means every known child.
    #[pyo3(get, set)]
    #[serde(default)]
    pub participants: Vec<String>,
}

#[pymethods]
impl FixedCommitment {
    #[new]
    #[pyo3(signature = (day, start_time, duration_minutes, label, participants=None))]
    pub fn new(
        day: String,
        start_time: NaiveTime,
        duration_minutes: i64,
        label: String,
        participants: Option<Vec<String>>,
    ) -> Self {
        Self {
            day,
            start_time,
            duration_minutes,
            label,
            participants: participants.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "FixedCommitment(label={:?}, day={}, start={}, duration_minutes={})",
            self.label,
            self.day,
            self.start_time.format("%H:%M"),
            self.duration_minutes
        )
    }
}

/// Everything one allocation call needs.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    #[pyo3(get, set)]
    pub children: Vec<String>,
    #[pyo3(get, set)]
    pub day_set: Vec<String>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub window: TimeWindow,
    #[pyo3(get, set)]
    #[serde(default)]
    pub subjects: Vec<SubjectSpec>,
    #[pyo3(get, set)]
    #[serde(default)]
    pub commitments: Vec<FixedCommitment>,
}

#[pymethods]
impl AllocationRequest {
    #[new]
    #[pyo3(signature = (children, day_set, window=None, subjects=None, commitments=None))]
    pub fn new(
        children: Vec<String>,
        day_set: Vec<String>,
        window: Option<TimeWindow>,
        subjects: Option<Vec<SubjectSpec>>,
        commitments: Option<Vec<FixedCommitment>>,
    ) -> Self {
        Self {
            children,
            day_set,
            window: window.unwrap_or_default(),
            subjects: subjects.unwrap_or_default(),
            commitments: commitments.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AllocationRequest(children={}, days={}, subjects={}, commitments={})",
            self.children.len(),
            self.day_set.len(),
            self.subjects.len(),
            self.commitments.len()
        )
    }
}

/// Content of one occupied grid cell.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupant {
    #[pyo3(get)]
    pub source_id: String,
    #[pyo3(get)]
    pub label: String,
    /// True only on the first slot of a placed block.
    #[pyo3(get)]
    pub is_session_start: bool,
    #[pyo3(get)]
    pub shared: bool,
    #[pyo3(get)]
    pub fixed: bool,
}

#[pymethods]
impl Occupant {
    fn __repr__(&self) -> String {
        format!(
            "Occupant(label={:?}, source_id={:?}, start={}, shared={}, fixed={})",
            self.label, self.source_id, self.is_session_start, self.shared, self.fixed
        )
    }
}

/// A session that found no feasible slot anywhere in the week.
///
/// `child` is `None` for shared sessions, which fail for all participants at once.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledEntry {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub child: Option<String>,
}

#[pymethods]
impl UnscheduledEntry {
    fn __repr__(&self) -> String {
        format!("UnscheduledEntry(name={:?}, child={:?})", self.name, self.child)
    }
}

/// A configuration problem found while reading the request.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub detail: String,
}

#[pymethods]
impl ConfigIssue {
    fn __repr__(&self) -> String {
        format!("ConfigIssue(kind={}, detail={:?})", self.kind, self.detail)
    }
}

/// Grid cells of one child for one day, indexed by slot.
pub type DayColumn = Vec<Option<Occupant>>;

/// Output of one allocation call.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// day -> child -> slot index -> occupant
    #[pyo3(get)]
    pub grid: BTreeMap<String, BTreeMap<String, DayColumn>>,
    #[pyo3(get)]
    pub unscheduled: Vec<UnscheduledEntry>,
    #[pyo3(get)]
    pub errors: Vec<ConfigIssue>,
    /// Day labels in day-set order.
    #[pyo3(get)]
    pub days: Vec<String>,
    /// Child names in request order.
    #[pyo3(get)]
    pub children: Vec<String>,
    /// Start time of every slot.
    #[pyo3(get)]
    pub slot_times: Vec<NaiveTime>,
    #[pyo3(get)]
    pub block_minutes: i64,
}

impl AllocationResult {
    /// Occupant at a cell, `None` when empty or out of range.
    pub fn cell(&self, day: &str, child: &str, slot: usize) -> Option<&Occupant> {
        self.grid
            .get(day)
            .and_then(|children| children.get(child))
            .and_then(|column| column.get(slot))
            .and_then(|cell| cell.as_ref())
    }
}

#[pymethods]
impl AllocationResult {
    /// True when no configuration errors were reported.
    fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "AllocationResult(days={}, children={}, unscheduled={}, errors={})",
            self.days.len(),
            self.children.len(),
            self.unscheduled.len(),
            self.errors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_default_window_is_school_day() {
        let window = TimeWindow::default();
        assert_eq!(window.start_time, t(7, 0));
        assert_eq!(window.end_time, t(17, 0));
        assert_eq!(window.block_minutes, 60);
        assert_eq!(window.span_minutes(), 600);
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let json = r#"{
            "children": ["A", "B"],
            "daySet": ["Monday", "Wednesday"],
            "window": {"startTime": "08:00:00", "endTime": "12:00:00", "blockMinutes": 30},
            "subjects": [{"name": "Math", "durationMinutes": 45, "sessionsPerWeek": 2}],
            "commitments": [{"day": "Monday", "startSlotTime": "09:00:00",
                             "durationMinutes": 60, "label": "Swim", "participants": ["B"]}]
        }"#;

        let request: AllocationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.day_set, vec!["Monday", "Wednesday"]);
        assert_eq!(request.window.block_minutes, 30);
        assert!(request.subjects[0].participants.is_empty());
        assert_eq!(request.subjects[0].shared, None);
        assert_eq!(request.commitments[0].start_time, t(9, 0));
        assert_eq!(request.commitments[0].participants, vec!["B"]);
    }

    #[test]
    fn test_result_cell_lookup() {
        let mut column: DayColumn = vec![None, None];
        column[1] = Some(Occupant {
            source_id: "subject:0:0".to_string(),
            label: "Math".to_string(),
            is_session_start: true,
            shared: false,
            fixed: false,
        });
        let mut children = BTreeMap::new();
        children.insert("A".to_string(), column);
        let mut result = AllocationResult::default();
        result.grid.insert("Monday".to_string(), children);

        assert!(result.cell("Monday", "A", 0).is_none());
        assert_eq!(result.cell("Monday", "A", 1).unwrap().label, "Math");
        assert!(result.cell("Tuesday", "A", 1).is_none());
        assert!(result.cell("Monday", "A", 9).is_none());
    }
}
