use chrono::NaiveDate;

/// Date format attached to query descriptors: "YYYY-MM-DD".
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Inclusive start/end date pair attached to every query descriptor.
///
/// Map refreshes are single-day pulls, so `start == end` in practice; the
/// pair form is kept because trend sub-queries address the range end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start_string(&self) -> String {
        self.start.format(DAY_FORMAT).to_string()
    }

    pub fn end_string(&self) -> String {
        self.end.format(DAY_FORMAT).to_string()
    }
}
