//! Flattened views of an allocation for renderers.
//!
//! The grid itself is the source of truth; these helpers just walk it in
//! day-set, child and slot order so a table, timeline or CSV writer does not
//! have to.

use chrono::{Duration, NaiveTime};
use pyo3::prelude::*;
use serde::Serialize;

use crate::models::AllocationResult;

/// One occupied cell.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridRow {
    #[pyo3(get)]
    pub day: String,
    #[pyo3(get)]
    pub time: NaiveTime,
    #[pyo3(get)]
    pub child: String,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub is_session_start: bool,
    #[pyo3(get)]
    pub shared: bool,
    #[pyo3(get)]
    pub fixed: bool,
}

/// One contiguous block in a child's day.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgendaEntry {
    #[pyo3(get)]
    pub start: NaiveTime,
    #[pyo3(get)]
    pub end: NaiveTime,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub shared: bool,
    #[pyo3(get)]
    pub fixed: bool,
}

#[pymethods]
impl AgendaEntry {
    fn __repr__(&self) -> String {
        format!(
            "{} - {} {}{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.label,
            if self.shared { " (Shared)" } else { "" }
        )
    }
}

/// Every occupied cell as a row, ordered by day, then child, then slot.
pub fn grid_rows(result: &AllocationResult) -> Vec<GridRow> {
    let mut rows = Vec::new();
    for day in &result.days {
        let Some(per_child) = result.grid.get(day) else {
            continue;
        };
        for child in &result.children {
            let Some(column) = per_child.get(child) else {
                continue;
            };
            for (slot, cell) in column.iter().enumerate() {
                let (Some(occupant), Some(time)) = (cell, result.slot_times.get(slot)) else {
                    continue;
                };
                rows.push(GridRow {
                    day: day.clone(),
                    time: *time,
                    child: child.clone(),
                    label: occupant.label.clone(),
                    is_session_start: occupant.is_session_start,
                    shared: occupant.shared,
                    fixed: occupant.fixed,
                });
            }
        }
    }
    rows
}

/// Blocks placed for one child on one day, in time order.
///
/// Continuation cells are folded into the block that starts them.
pub fn child_agenda(result: &AllocationResult, child: &str, day: &str) -> Vec<AgendaEntry> {
    let Some(column) = result.grid.get(day).and_then(|per_child| per_child.get(child)) else {
        return Vec::new();
    };
    let block = Duration::minutes(result.block_minutes);

    let mut agenda: Vec<AgendaEntry> = Vec::new();
    let mut current_source: Option<&str> = None;
    for (slot, cell) in column.iter().enumerate() {
        let Some(time) = result.slot_times.get(slot) else {
            break;
        };
        match cell {
            Some(occupant)
                if !occupant.is_session_start
                    && current_source == Some(occupant.source_id.as_str()) =>
            {
                if let Some(last) = agenda.last_mut() {
                    last.end = block_end(*time, block);
                }
            }
            Some(occupant) => {
                current_source = Some(occupant.source_id.as_str());
                agenda.push(AgendaEntry {
                    start: *time,
                    end: block_end(*time, block),
                    label: occupant.label.clone(),
                    shared: occupant.shared,
                    fixed: occupant.fixed,
                });
            }
            None => current_source = None,
        }
    }
    agenda
}

/// End of a block starting at `start`, held at the last second of the day
/// when the block would run past midnight.
fn block_end(start: NaiveTime, block: Duration) -> NaiveTime {
    match start.overflowing_add_signed(block) {
        (end, 0) => end,
        _ => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::allocate;
    use crate::config::AllocatorConfig;
    use crate::models::{AllocationRequest, FixedCommitment, SubjectSpec, TimeWindow};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn sample() -> AllocationResult {
        let request = AllocationRequest::new(
            vec!["A".to_string(), "B".to_string()],
            vec!["Tuesday".to_string(), "Monday".to_string()],
            Some(TimeWindow::new(t(9, 0), t(11, 0), 30)),
            Some(vec![SubjectSpec::new(
                "Math".to_string(),
                60,
                1,
                Some(vec!["A".to_string(), "B".to_string()]),
                None,
            )]),
            Some(vec![FixedCommitment::new(
                "Tuesday".to_string(),
                t(9, 0),
                30,
                "Piano".to_string(),
                Some(vec!["B".to_string()]),
            )]),
        );
        allocate(&request, &AllocatorConfig::default())
    }

    #[test]
    fn test_rows_follow_day_set_order() {
        let rows = grid_rows(&sample());

        // Tuesday comes first because the day set lists it first
        let summary: Vec<(&str, NaiveTime, &str, &str)> = rows
            .iter()
            .map(|r| (r.day.as_str(), r.time, r.child.as_str(), r.label.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Tuesday", t(9, 30), "A", "Math"),
                ("Tuesday", t(10, 0), "A", "Math"),
                ("Tuesday", t(9, 0), "B", "Piano"),
                ("Tuesday", t(9, 30), "B", "Math"),
                ("Tuesday", t(10, 0), "B", "Math"),
            ]
        );
        assert!(rows[0].is_session_start && !rows[1].is_session_start);
        assert!(rows[2].fixed);
    }

    #[test]
    fn test_child_agenda_merges_continuations() {
        let result = sample();

        let agenda = child_agenda(&result, "B", "Tuesday");
        assert_eq!(agenda.len(), 2);
        assert_eq!((agenda[0].start, agenda[0].end), (t(9, 0), t(9, 30)));
        assert_eq!(agenda[0].label, "Piano");
        assert!(agenda[0].fixed);
        assert_eq!((agenda[1].start, agenda[1].end), (t(9, 30), t(10, 30)));
        assert!(agenda[1].shared);

        assert!(child_agenda(&result, "A", "Monday").is_empty());
        assert!(child_agenda(&result, "Z", "Tuesday").is_empty());
    }

    #[test]
    fn test_agenda_end_does_not_wrap_past_midnight() {
        let request = AllocationRequest::new(
            vec!["A".to_string()],
            vec!["Friday".to_string()],
            Some(TimeWindow::new(t(23, 0), t(23, 59), 30)),
            Some(vec![SubjectSpec::new(
                "Stargazing".to_string(),
                60,
                1,
                Some(vec!["A".to_string()]),
                None,
            )]),
            None,
        );
        let result = allocate(&request, &AllocatorConfig::default());
        assert!(result.errors.is_empty());

        let agenda = child_agenda(&result, "A", "Friday");
        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda[0].start, t(23, 0));
        assert_eq!(agenda[0].end, NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert!(agenda[0].end > agenda[0].start);
    }
}
