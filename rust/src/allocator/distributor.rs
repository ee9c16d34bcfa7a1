//! Spreads a subject's weekly sessions across the active days.

/// Upper bound on sessions a subject may ask for: one per minute of a
/// seven-day week. No window can hold more, so larger counts are rejected
/// before any targets are built.
pub const MAX_SESSIONS_PER_WEEK: u32 = 7 * 24 * 60;

/// Preferred day index for each of `sessions` sessions.
///
/// Sessions step through the day set at `max(1, days / sessions)` so they are
/// spread out rather than clustered at the start of the week. With more
/// sessions than days the list cycles and days repeat. The result is only a
/// preference: the slot search may still move a session to a later day.
pub fn target_days(day_count: usize, sessions: u32) -> Vec<usize> {
    if day_count == 0 || sessions == 0 {
        return Vec::new();
    }
    let sessions = sessions as usize;
    let interval = (day_count / sessions).max(1);
    (0..sessions)
        .map(|i| (i * interval) % day_count)
        .collect()
}

/// Day indices to try for a session, starting at the preferred day and
/// wrapping once through the whole set.
pub fn fallback_order(day_count: usize, preferred: usize) -> impl Iterator<Item = usize> {
    (0..day_count).map(move |offset| (preferred + offset) % day_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_spread_evenly() {
        // 5 days, 2 sessions: interval 2 -> Mon, Wed
        assert_eq!(target_days(5, 2), vec![0, 2]);
        // 5 days, 3 sessions: interval 1
        assert_eq!(target_days(5, 3), vec![0, 1, 2]);
        // 6 days, 3 sessions: interval 2
        assert_eq!(target_days(6, 3), vec![0, 2, 4]);
        assert_eq!(target_days(5, 1), vec![0]);
    }

    #[test]
    fn test_more_sessions_than_days_cycles() {
        assert_eq!(target_days(2, 5), vec![0, 1, 0, 1, 0]);
        assert_eq!(target_days(1, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_no_targets_for_zero_inputs() {
        assert!(target_days(0, 3).is_empty());
        assert!(target_days(5, 0).is_empty());
    }

    #[test]
    fn test_fallback_order_wraps_once() {
        assert_eq!(fallback_order(4, 2).collect::<Vec<_>>(), vec![2, 3, 0, 1]);
        assert_eq!(fallback_order(3, 0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(fallback_order(0, 0).count(), 0);
    }
}
