use crate::error::{CoreError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-day range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawWindow> for DateWindow {
    type Error = CoreError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        DateWindow::try_new(raw.start, raw.end)
    }
}

/// The 2024 calendar year.
impl Default for DateWindow {
    fn default() -> Self {
        match (
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 12, 31),
        ) {
            (Some(start), Some(end)) => Self { start, end },
            _ => Self {
                start: NaiveDate::MIN,
                end: NaiveDate::MAX,
            },
        }
    }
}

impl DateWindow {
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CoreError::invalid_argument(format!(
                "date window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::try_new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window, both ends included (always >= 1).
    pub fn num_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// The `offset`-th day counting from `start`, or `None` past `end`.
    pub fn nth_day(&self, offset: u64) -> Option<NaiveDate> {
        if offset >= self.num_days() {
            return None;
        }
        self.start.checked_add_signed(Duration::days(offset as i64))
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
        CoreError::invalid_argument(format!("invalid date `{s}` (expected YYYY-MM-DD): {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_days_inclusively() {
        let w = DateWindow::try_new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        // 2024 is a leap year.
        assert_eq!(w.num_days(), 366);
        assert_eq!(DateWindow::parse("2024-03-01", "2024-03-01").unwrap().num_days(), 1);
        assert_eq!(DateWindow::default(), w);
    }

    #[test]
    fn nth_day_stops_at_end() {
        let w = DateWindow::parse("2024-02-27", "2024-03-01").unwrap();
        assert_eq!(w.nth_day(0), Some(d(2024, 2, 27)));
        assert_eq!(w.nth_day(2), Some(d(2024, 2, 29)));
        assert_eq!(w.nth_day(3), Some(d(2024, 3, 1)));
        assert_eq!(w.nth_day(4), None);
    }

    #[test]
    fn contains_both_ends() {
        let w = DateWindow::parse("2024-01-10", "2024-01-20").unwrap();
        assert!(w.contains(d(2024, 1, 10)));
        assert!(w.contains(d(2024, 1, 20)));
        assert!(!w.contains(d(2024, 1, 9)));
        assert!(!w.contains(d(2024, 1, 21)));
    }

    #[test]
    fn rejects_inverted_and_malformed_windows() {
        assert!(matches!(
            DateWindow::parse("2024-02-01", "2024-01-01"),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            DateWindow::parse("01/02/2024", "2024-03-01"),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let ok: DateWindow =
            serde_json::from_value(json!({"start": "2024-01-01", "end": "2024-01-31"})).unwrap();
        assert_eq!(ok.num_days(), 31);

        let bad = serde_json::from_value::<DateWindow>(
            json!({"start": "2024-02-01", "end": "2024-01-31"}),
        );
        assert!(bad.is_err());
    }
}
