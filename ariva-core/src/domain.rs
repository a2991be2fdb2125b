//! Date-range bounds shared by the fetcher and the façade.

use chrono::NaiveDate;

/// Inclusive date window. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const UNBOUNDED: DateRange = DateRange {
        begin: None,
        end: None,
    };

    pub fn new(begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { begin, end }
    }

    pub fn between(begin: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(begin), Some(end))
    }

    /// Window covering exactly one calendar day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin.map_or(true, |begin| date >= begin) && self.end.map_or(true, |end| date <= end)
    }
}
