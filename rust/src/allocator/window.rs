//! Discrete slot layout of one day.

use chrono::{Duration, NaiveTime};

use crate::models::TimeWindow;

use super::core::AllocationError;

/// Longest span any window can cover.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A validated [`TimeWindow`] with its slot count precomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotWindow {
    start: NaiveTime,
    block_minutes: i64,
    slot_count: usize,
}

impl SlotWindow {
    /// Validate a window: end after start, and a block size in `1..=span`.
    ///
    /// The span is measured in seconds so a window ending off the minute still
    /// gets its partial last slot.
    pub fn new(window: &TimeWindow) -> Result<Self, AllocationError> {
        let span_seconds = (window.end_time - window.start_time).num_seconds();
        if span_seconds <= 0 {
            return Err(AllocationError::InvalidWindow(format!(
                "end {} is not after start {}",
                window.end_time.format("%H:%M"),
                window.start_time.format("%H:%M")
            )));
        }
        if window.block_minutes <= 0 {
            return Err(AllocationError::InvalidWindow(format!(
                "block size must be positive, got {} minutes",
                window.block_minutes
            )));
        }
        if window.block_minutes > MINUTES_PER_DAY || window.block_minutes * 60 > span_seconds {
            return Err(AllocationError::InvalidWindow(format!(
                "block of {} minutes exceeds the {}-minute window",
                window.block_minutes,
                window.span_minutes()
            )));
        }

        Ok(Self {
            start: window.start_time,
            block_minutes: window.block_minutes,
            slot_count: ceil_div(span_seconds, window.block_minutes * 60),
        })
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[inline]
    pub fn block_minutes(&self) -> i64 {
        self.block_minutes
    }

    /// Number of slots a duration occupies, rounded up so nothing is truncated.
    pub fn blocks_for(&self, duration_minutes: i64) -> usize {
        if duration_minutes <= 0 {
            return 0;
        }
        ceil_div(duration_minutes, self.block_minutes)
    }

    /// Slot index starting exactly at `time`.
    ///
    /// `None` if the time is before the window, after its last slot, or not on
    /// a block boundary.
    pub fn slot_at(&self, time: NaiveTime) -> Option<usize> {
        let offset = time - self.start;
        let seconds = offset.num_seconds();
        let block_seconds = self.block_minutes * 60;
        if offset != Duration::seconds(seconds) || seconds < 0 || seconds % block_seconds != 0 {
            return None;
        }
        let slot = usize::try_from(seconds / block_seconds).ok()?;
        (slot < self.slot_count).then_some(slot)
    }

    /// Start time of a slot.
    pub fn slot_start(&self, slot: usize) -> NaiveTime {
        self.start + Duration::minutes(self.block_minutes * slot as i64)
    }

    /// Start times of every slot, in order.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        (0..self.slot_count).map(|s| self.slot_start(s)).collect()
    }
}

/// Ceiling division for a positive `value`; saturates instead of wrapping.
fn ceil_div(value: i64, divisor: i64) -> usize {
    if value <= 0 {
        return 0;
    }
    usize::try_from((value - 1) / divisor + 1).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn window(start: NaiveTime, end: NaiveTime, block: i64) -> TimeWindow {
        TimeWindow::new(start, end, block)
    }

    #[test]
    fn test_slot_count_rounds_up() {
        let w = SlotWindow::new(&window(t(8, 0), t(9, 0), 30)).unwrap();
        assert_eq!(w.slot_count(), 2);

        // 100 minutes in 45-minute blocks leaves a partial last slot
        let w = SlotWindow::new(&window(t(8, 0), t(9, 40), 45)).unwrap();
        assert_eq!(w.slot_count(), 3);
    }

    #[test]
    fn test_invalid_windows() {
        for bad in [
            window(t(9, 0), t(9, 0), 30),
            window(t(10, 0), t(9, 0), 30),
            window(t(8, 0), t(9, 0), 0),
            window(t(8, 0), t(9, 0), -15),
            window(t(8, 0), t(9, 0), 90),
        ] {
            assert!(matches!(
                SlotWindow::new(&bad),
                Err(AllocationError::InvalidWindow(_))
            ));
        }
    }

    #[test]
    fn test_blocks_for_uses_ceiling() {
        let w = SlotWindow::new(&window(t(8, 0), t(12, 0), 30)).unwrap();
        assert_eq!(w.blocks_for(30), 1);
        assert_eq!(w.blocks_for(31), 2);
        assert_eq!(w.blocks_for(45), 2);
        assert_eq!(w.blocks_for(60), 2);
        assert_eq!(w.blocks_for(0), 0);
    }

    #[test]
    fn test_blocks_for_huge_duration_does_not_overflow() {
        let w = SlotWindow::new(&window(t(8, 0), t(9, 0), 30)).unwrap();
        let blocks = w.blocks_for(i64::MAX);
        assert!(blocks > w.slot_count());
        assert_eq!(blocks as u64, (i64::MAX as u64 - 1) / 30 + 1);
    }

    #[test]
    fn test_huge_block_size_is_invalid() {
        assert!(matches!(
            SlotWindow::new(&window(t(8, 0), t(9, 0), i64::MAX)),
            Err(AllocationError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_slot_at_requires_alignment() {
        let w = SlotWindow::new(&window(t(8, 0), t(10, 0), 30)).unwrap();
        assert_eq!(w.slot_at(t(8, 0)), Some(0));
        assert_eq!(w.slot_at(t(9, 30)), Some(3));
        assert_eq!(w.slot_at(t(8, 15)), None);
        assert_eq!(w.slot_at(t(7, 30)), None);
        assert_eq!(w.slot_at(t(10, 0)), None);
    }

    #[test]
    fn test_slot_at_rejects_sub_minute_offsets() {
        let w = SlotWindow::new(&window(t(8, 0), t(10, 0), 30)).unwrap();
        let at = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        assert_eq!(w.slot_at(at(8, 0, 30)), None);
        assert_eq!(w.slot_at(at(7, 59, 30)), None);
        assert_eq!(w.slot_at(at(8, 29, 59)), None);
        assert_eq!(w.slot_at(NaiveTime::from_hms_milli_opt(8, 30, 0, 500).unwrap()), None);
        assert_eq!(w.slot_at(at(8, 30, 0)), Some(1));
    }

    #[test]
    fn test_span_counts_seconds() {
        // 60 minutes and 30 seconds leaves a third, partial slot
        let end = NaiveTime::from_hms_opt(9, 0, 30).unwrap();
        let w = SlotWindow::new(&window(t(8, 0), end, 30)).unwrap();
        assert_eq!(w.slot_count(), 3);

        // Under one block once the seconds are counted
        let end = NaiveTime::from_hms_opt(8, 29, 30).unwrap();
        assert!(SlotWindow::new(&window(t(8, 0), end, 30)).is_err());
    }

    #[test]
    fn test_slot_times() {
        let w = SlotWindow::new(&window(t(7, 0), t(9, 0), 40)).unwrap();
        assert_eq!(w.slot_times(), vec![t(7, 0), t(7, 40), t(8, 20)]);
    }
}
