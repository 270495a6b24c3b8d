use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Lifecycle state of a class section
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ClassStatus {
    #[default]
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// The end date of a section did not come strictly after its start date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Display for InvalidDateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "end date {} must be after start date {}",
            self.end, self.start
        )
    }
}

impl std::error::Error for InvalidDateRange {}

/// Period during which a section runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new `DateRange` if `start` is before `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn validate(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        Self::new(start, end).ok_or(InvalidDateRange { start, end })
    }

    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_new() {
        assert!(DateRange::new(date(2025, 1, 1), date(2025, 2, 1)).is_some());

        // End before start
        assert!(DateRange::new(date(2025, 2, 1), date(2025, 1, 1)).is_none());

        // Same day is not a valid range
        assert!(DateRange::new(date(2025, 1, 1), date(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_date_range_validate_reports_both_dates() {
        let err = DateRange::validate(date(2025, 2, 1), date(2025, 1, 1)).unwrap_err();
        assert_eq!(err.start, date(2025, 2, 1));
        assert_eq!(err.end, date(2025, 1, 1));
        assert_eq!(
            err.to_string(),
            "end date 2025-01-01 must be after start date 2025-02-01"
        );
    }

    #[test]
    fn test_duration_days() {
        let range = DateRange::new(date(2025, 2, 1), date(2025, 3, 1)).unwrap();
        assert_eq!(range.duration_days(), 28);
    }
}
