//! Weekly timetable allocator.
//!
//! One deterministic, single-pass placement over a fresh grid, in four stages:
//! grid initialization, fixed commitments, session distribution over days, and
//! slot-fit search (with simultaneous availability for shared subjects). There
//! is no backtracking: once a block is written it stays.

mod commitments;
mod core;
mod days;
mod distributor;
mod grid;
mod slot_fit;
mod window;

pub use self::core::{
    allocate, Allocation, AllocationError, ErrorKind, Unscheduled, WeeklyAllocator,
};
pub use commitments::place_commitments;
pub use days::{weekday_name, DaySet};
pub use distributor::{fallback_order, target_days, MAX_SESSIONS_PER_WEEK};
pub use grid::{CellTaken, Grid};
pub use slot_fit::{earliest_common_start, find_slot};
pub use window::{SlotWindow, MINUTES_PER_DAY};
