//! Ordered set of active weekdays.

use chrono::Weekday;

use super::core::AllocationError;

/// Canonical display name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Caller-selected weekdays in caller order.
///
/// Order matters: it drives both session spreading and the next-day fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySet {
    days: Vec<Weekday>,
}

impl DaySet {
    /// Parse day labels ("Monday", "mon", ...), rejecting unknown and repeated days.
    pub fn parse(labels: &[String]) -> Result<Self, AllocationError> {
        if labels.is_empty() {
            return Err(AllocationError::EmptyDaySet);
        }

        let mut days: Vec<Weekday> = Vec::with_capacity(labels.len());
        for label in labels {
            let day: Weekday = label
                .trim()
                .parse()
                .map_err(|_| AllocationError::InvalidRequest(format!("unknown day {:?}", label)))?;
            if days.contains(&day) {
                return Err(AllocationError::InvalidRequest(format!(
                    "day {} listed more than once",
                    weekday_name(day)
                )));
            }
            days.push(day);
        }

        Ok(Self { days })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Weekday at a position in the set.
    #[inline]
    pub fn day(&self, index: usize) -> Weekday {
        self.days[index]
    }

    /// Position of a weekday in the set, if it is active.
    pub fn position(&self, day: Weekday) -> Option<usize> {
        self.days.iter().position(|d| *d == day)
    }

    /// Canonical names in set order.
    pub fn names(&self) -> Vec<String> {
        self.days.iter().map(|d| weekday_name(*d).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_preserves_order() {
        let days = DaySet::parse(&labels(&["Friday", "monday", "Wed"])).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days.day(0), Weekday::Fri);
        assert_eq!(days.day(1), Weekday::Mon);
        assert_eq!(days.position(Weekday::Wed), Some(2));
        assert_eq!(days.position(Weekday::Sun), None);
        assert_eq!(days.names(), vec!["Friday", "Monday", "Wednesday"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DaySet::parse(&[]),
            Err(AllocationError::EmptyDaySet)
        ));
        assert!(matches!(
            DaySet::parse(&labels(&["Funday"])),
            Err(AllocationError::InvalidRequest(_))
        ));
        assert!(matches!(
            DaySet::parse(&labels(&["Monday", "Mon"])),
            Err(AllocationError::InvalidRequest(_))
        ));
    }
}
