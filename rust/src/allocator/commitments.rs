//! Places fixed commitments as hard reservations before any subject.

use chrono::Weekday;

use crate::interner::ChildInterner;
use crate::models::{FixedCommitment, Occupant};
use crate::{log_changes, log_checks};

use super::core::AllocationError;
use super::days::{weekday_name, DaySet};
use super::grid::Grid;
use super::window::SlotWindow;

/// Source ID recorded on every cell of a commitment.
pub fn commitment_source_id(index: usize) -> String {
    format!("commitment:{}", index)
}

/// Write every commitment into the grid, in input order.
///
/// A commitment that is malformed, outside the window, or overlaps an earlier
/// commitment for any participant is not placed at all; the problem is
/// returned and the remaining commitments are still processed.
pub fn place_commitments(
    grid: &mut Grid,
    commitments: &[FixedCommitment],
    days: &DaySet,
    children: &ChildInterner,
    window: &SlotWindow,
    verbosity: u8,
) -> Vec<AllocationError> {
    let mut errors = Vec::new();

    for (index, commitment) in commitments.iter().enumerate() {
        match place_commitment(grid, index, commitment, days, children, window) {
            Ok(()) => {
                log_changes!(
                    verbosity,
                    "Fixed {} on {} at {}",
                    commitment.label,
                    commitment.day,
                    commitment.start_time.format("%H:%M")
                );
            }
            Err(err) => {
                log_checks!(verbosity, "  Rejected commitment {}: {}", commitment.label, err);
                errors.push(err);
            }
        }
    }

    errors
}

fn place_commitment(
    grid: &mut Grid,
    index: usize,
    commitment: &FixedCommitment,
    days: &DaySet,
    children: &ChildInterner,
    window: &SlotWindow,
) -> Result<(), AllocationError> {
    let label = &commitment.label;

    if commitment.duration_minutes <= 0 {
        return Err(AllocationError::InvalidRequest(format!(
            "commitment {:?} has non-positive duration {}",
            label, commitment.duration_minutes
        )));
    }

    let weekday: Weekday = commitment.day.trim().parse().map_err(|_| {
        AllocationError::InvalidRequest(format!(
            "commitment {:?} has unknown day {:?}",
            label, commitment.day
        ))
    })?;

    let participants = children
        .resolve_participants(&commitment.participants)
        .map_err(|name| {
            AllocationError::InvalidRequest(format!(
                "commitment {:?} names unknown child {:?}",
                label, name
            ))
        })?;

    let day = days
        .position(weekday)
        .ok_or_else(|| AllocationError::CommitmentOutOfWindow {
            label: label.clone(),
            reason: format!("{} is not an active day", weekday_name(weekday)),
        })?;

    let start = window.slot_at(commitment.start_time).ok_or_else(|| {
        AllocationError::CommitmentOutOfWindow {
            label: label.clone(),
            reason: format!(
                "{} is not a slot boundary inside the window",
                commitment.start_time.format("%H:%M:%S")
            ),
        }
    })?;

    let blocks = window.blocks_for(commitment.duration_minutes);
    if blocks > window.slot_count() - start {
        return Err(AllocationError::CommitmentOutOfWindow {
            label: label.clone(),
            reason: format!(
                "{} minutes from {} runs past the end of the day",
                commitment.duration_minutes,
                commitment.start_time.format("%H:%M")
            ),
        });
    }

    let occupant = Occupant {
        source_id: commitment_source_id(index),
        label: label.clone(),
        is_session_start: true,
        shared: participants.len() > 1,
        fixed: true,
    };

    grid.reserve(day, &participants, start, blocks, &occupant)
        .map_err(|taken| AllocationError::CommitmentCollision {
            label: label.clone(),
            child: children.resolve(taken.child).unwrap_or_default().to_string(),
            day: weekday_name(weekday).to_string(),
            time: window.slot_start(taken.slot).format("%H:%M").to_string(),
            holder: taken.holder,
        })
}
