use sea_orm_migration::prelude::*;

use crate::m20250801_create_all_tables::{
    AccountGroups, AttendanceRecords, AuthTokens, ClassSections, Enrollments,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // An account belongs to a group at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_account_groups_account_group")
                    .table(AccountGroups::Table)
                    .col(AccountGroups::AccountId)
                    .col(AccountGroups::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A student is enrolled in a section at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_student_section")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::ClassSectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One attendance record per enrollment per day
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_enrollment_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::EnrollmentId)
                    .col(AttendanceRecords::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on class_sections.professor_id for ownership scoping
        manager
            .create_index(
                Index::create()
                    .name("idx_class_sections_professor_id")
                    .table(ClassSections::Table)
                    .col(ClassSections::ProfessorId)
                    .to_owned(),
            )
            .await?;

        // Index on enrollments.class_section_id for rosters and dashboards
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_class_section_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::ClassSectionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_tokens_account_id")
                    .table(AuthTokens::Table)
                    .col(AuthTokens::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        for name in [
            "idx_auth_tokens_account_id",
            "idx_enrollments_class_section_id",
            "idx_class_sections_professor_id",
            "idx_attendance_records_enrollment_date",
            "idx_enrollments_student_section",
            "idx_account_groups_account_group",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
