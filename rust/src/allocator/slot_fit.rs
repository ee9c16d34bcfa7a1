//! Search for the earliest contiguous run free for every participant.

use crate::interner::ChildId;
use crate::log_debug;

use super::distributor::fallback_order;
use super::grid::Grid;

/// Lowest start index where `blocks` slots are free for all `participants`.
///
/// Intersects each participant's free-start mask for the day; a single
/// participant degenerates to that child's own mask.
pub fn earliest_common_start(
    grid: &Grid,
    day: usize,
    participants: &[ChildId],
    blocks: usize,
) -> Option<usize> {
    let mut common: Option<Vec<bool>> = None;
    for &child in participants {
        let starts = grid.free_starts(day, child, blocks);
        common = Some(match common {
            None => starts,
            Some(acc) => acc.iter().zip(&starts).map(|(a, b)| *a && *b).collect(),
        });
    }
    common?.iter().position(|free| *free)
}

/// Find `(day, start)` for one session, trying the preferred day first and
/// then each following day in set order, wrapping once.
pub fn find_slot(
    grid: &Grid,
    participants: &[ChildId],
    blocks: usize,
    preferred_day: usize,
    verbosity: u8,
) -> Option<(usize, usize)> {
    if participants.is_empty() || blocks == 0 {
        return None;
    }
    for day in fallback_order(grid.day_count(), preferred_day) {
        match earliest_common_start(grid, day, participants, blocks) {
            Some(start) => return Some((day, start)),
            None => {
                log_debug!(
                    verbosity,
                    "      day #{} has no common run of {} block(s)",
                    day,
                    blocks
                );
            }
        }
    }
    None
}
