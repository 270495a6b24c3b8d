use chrono::{Datelike, NaiveDate};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// Placeholder used for department and course on auto-provisioned profiles
pub const UNASSIGNED: &str = "unassigned";

/// Birth date stored on auto-provisioned students until they fill it in
pub fn placeholder_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Enrollment code assigned to students provisioned from an account
pub fn placeholder_enrollment_code(account_id: Uuid) -> String {
    let simple = account_id.simple().to_string().to_uppercase();
    format!("MAT{}", &simple[..8])
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Gender {
    #[serde(rename = "M")]
    #[sea_orm(string_value = "M")]
    Male,
    #[serde(rename = "F")]
    #[sea_orm(string_value = "F")]
    Female,
    #[serde(rename = "O")]
    #[sea_orm(string_value = "O")]
    Other,
    #[default]
    #[serde(rename = "N")]
    #[sea_orm(string_value = "N")]
    NotInformed,
}

/// The kind of profile an account is linked to
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProfileRole {
    Professor,
    #[default]
    Student,
}

impl ProfileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professor => "professor",
            Self::Student => "student",
        }
    }

    /// The group every account with this role must belong to
    pub fn group(self) -> RoleGroup {
        match self {
            Self::Professor => RoleGroup::Professor,
            Self::Student => RoleGroup::Student,
        }
    }

    /// The group an account with this role must never belong to
    pub fn opposing_group(self) -> RoleGroup {
        match self {
            Self::Professor => RoleGroup::Student,
            Self::Student => RoleGroup::Professor,
        }
    }
}

/// Named account groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay, AsRefStr, EnumString)]
pub enum RoleGroup {
    Professor,
    Student,
    Coordinator,
}

impl RoleGroup {
    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

/// Splits a full name into first name and remaining names.
///
/// Single-word names yield two empty strings.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    match (parts.next(), parts.clone().next()) {
        (Some(first), Some(_)) => (first.to_string(), parts.collect::<Vec<_>>().join(" ")),
        _ => (String::new(), String::new()),
    }
}

/// Age in whole years on `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let had_birthday =
        (today.month(), today.day()) >= (birth_date.month(), birth_date.day());
    today.year() - birth_date.year() - i32::from(!had_birthday)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_parsing() {
        assert_eq!(ProfileRole::from_str("professor"), Ok(ProfileRole::Professor));
        assert_eq!(ProfileRole::from_str("Student"), Ok(ProfileRole::Student));
        assert!(ProfileRole::from_str("janitor").is_err());
        assert_eq!(ProfileRole::default(), ProfileRole::Student);

        for role in [ProfileRole::Professor, ProfileRole::Student] {
            assert_eq!(ProfileRole::from_str(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn test_role_groups_are_opposed() {
        for role in [ProfileRole::Professor, ProfileRole::Student] {
            assert_ne!(role.group(), role.opposing_group());
        }
        assert_eq!(ProfileRole::Professor.group().name(), "Professor");
        assert_eq!(ProfileRole::Student.opposing_group().name(), "Professor");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Ada Augusta Lovelace"),
            ("Ada".to_string(), "Augusta Lovelace".to_string())
        );
        assert_eq!(split_name("Plato"), (String::new(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_age_on() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()), 24);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()), 25);
    }

    #[test]
    fn test_placeholder_enrollment_code() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(placeholder_enrollment_code(id), "MATA1B2C3D4");
    }

    #[test]
    fn test_gender_serialization() {
        assert_eq!(serde_json::to_string(&Gender::NotInformed).unwrap(), "\"N\"");
        let parsed: Gender = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }
}
