use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a single class session for one enrollment
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AttendanceStatus {
    #[default]
    #[sea_orm(string_value = "Present")]
    Present,
    #[sea_orm(string_value = "Absent")]
    Absent,
    /// Absence with a justification; still counts against the percentage
    #[sea_orm(string_value = "Excused")]
    Excused,
}

impl AttendanceStatus {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Rounds to two decimal places, ties to even (1/160 gives 0.62)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Cumulative attendance percentage for `present` sessions out of `total`.
///
/// Defined as `0` when no sessions were recorded.
pub fn attendance_percentage(present: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    round2(100.0 * present as f64 / total as f64)
}

/// Percentage over an iterator of statuses
pub fn percentage_of<I>(statuses: I) -> f64
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let (present, total) = statuses
        .into_iter()
        .fold((0u64, 0u64), |(present, total), status| {
            (present + u64::from(status.is_present()), total + 1)
        });

    attendance_percentage(present, total)
}

/// Mean of a set of enrollment percentages, rounded to two decimals
pub fn mean_percentage(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    round2(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_percentage_without_records_is_zero() {
        assert_eq!(attendance_percentage(0, 0), 0.0);
        assert_eq!(percentage_of([]), 0.0);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(attendance_percentage(10, 11), 90.91);
        assert_eq!(attendance_percentage(1, 3), 33.33);
        assert_eq!(attendance_percentage(2, 3), 66.67);
        assert_eq!(attendance_percentage(4, 4), 100.0);
    }

    #[test]
    fn test_ties_round_to_even() {
        assert_eq!(attendance_percentage(1, 160), 0.62);
        assert_eq!(attendance_percentage(3, 160), 1.88);
        assert_eq!(round2(0.125), 0.12);
    }

    #[test]
    fn test_only_present_counts() {
        let statuses = [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Excused,
            AttendanceStatus::Present,
        ];
        assert_eq!(percentage_of(statuses), 50.0);
    }

    #[test]
    fn test_mean_percentage() {
        assert_eq!(mean_percentage(&[]), 0.0);
        assert_eq!(mean_percentage(&[100.0, 50.0, 0.0]), 50.0);
        assert_eq!(mean_percentage(&[90.91, 33.33]), 62.12);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&AttendanceStatus::Excused).unwrap();
        assert_eq!(json, "\"Excused\"");
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Present);
    }
}
