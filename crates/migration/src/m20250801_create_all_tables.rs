use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Email).string().not_null())
                    .col(ColumnDef::new(Accounts::FirstName).string().not_null())
                    .col(ColumnDef::new(Accounts::LastName).string().not_null())
                    .col(ColumnDef::new(Accounts::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create groups table
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Groups::Name)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create account_groups junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(AccountGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountGroups::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountGroups::AccountId).uuid().not_null())
                    .col(ColumnDef::new(AccountGroups::GroupId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_groups-account_id")
                            .from(AccountGroups::Table, AccountGroups::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_groups-group_id")
                            .from(AccountGroups::Table, AccountGroups::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create auth_tokens table
        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthTokens::Key)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthTokens::AccountId).uuid().not_null())
                    .col(ColumnDef::new(AuthTokens::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-auth_tokens-account_id")
                            .from(AuthTokens::Table, AuthTokens::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create professors table
        manager
            .create_table(
                Table::create()
                    .table(Professors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Professors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Professors::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Professors::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Professors::Department)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Professors::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Professors::AccountId).uuid().unique_key())
                    .col(ColumnDef::new(Professors::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professors-account_id")
                            .from(Professors::Table, Professors::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Students::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Students::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Students::EnrollmentCode)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Email).string().unique_key())
                    .col(ColumnDef::new(Students::Course).string_len(100).not_null())
                    .col(ColumnDef::new(Students::BirthDate).date().not_null())
                    .col(ColumnDef::new(Students::Gender).string_len(1).not_null())
                    .col(ColumnDef::new(Students::AccountId).uuid().unique_key())
                    .col(ColumnDef::new(Students::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-account_id")
                            .from(Students::Table, Students::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create class_sections table
        manager
            .create_table(
                Table::create()
                    .table(ClassSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassSections::Name)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassSections::Description).text().not_null())
                    .col(ColumnDef::new(ClassSections::ProfessorId).uuid().not_null())
                    .col(ColumnDef::new(ClassSections::StartDate).date().not_null())
                    .col(ColumnDef::new(ClassSections::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(ClassSections::Status)
                            .string_len(20)
                            .not_null()
                            .default("Active"),
                    )
                    .col(
                        ColumnDef::new(ClassSections::RepresentativeId)
                            .uuid()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ClassSections::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_sections-professor_id")
                            .from(ClassSections::Table, ClassSections::ProfessorId)
                            .to(Professors::Table, Professors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-class_sections-representative_id")
                            .from(ClassSections::Table, ClassSections::RepresentativeId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments junction table (student x class section)
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Enrollments::ClassSectionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::AttendancePercentage)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Enrollments::EnrolledAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-student_id")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-class_section_id")
                            .from(Enrollments::Table, Enrollments::ClassSectionId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendance_records table
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::EnrollmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Date).date().not_null())
                    .col(
                        ColumnDef::new(AttendanceRecords::Status)
                            .string_len(20)
                            .not_null()
                            .default("Present"),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Note).text().not_null())
                    .col(
                        ColumnDef::new(AttendanceRecords::RecordedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-attendance_records-enrollment_id")
                            .from(AttendanceRecords::Table, AttendanceRecords::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order of dependencies
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassSections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Professors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Accounts {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    IsStaff,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Groups {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub(crate) enum AccountGroups {
    Table,
    Id,
    AccountId,
    GroupId,
}

#[derive(Iden)]
pub(crate) enum AuthTokens {
    Table,
    Key,
    AccountId,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Professors {
    Table,
    Id,
    Name,
    Email,
    Department,
    Active,
    AccountId,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Students {
    Table,
    Id,
    Name,
    EnrollmentCode,
    Email,
    Course,
    BirthDate,
    Gender,
    AccountId,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum ClassSections {
    Table,
    Id,
    Name,
    Description,
    ProfessorId,
    StartDate,
    EndDate,
    Status,
    RepresentativeId,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Enrollments {
    Table,
    Id,
    StudentId,
    ClassSectionId,
    AttendancePercentage,
    EnrolledAt,
}

#[derive(Iden)]
pub(crate) enum AttendanceRecords {
    Table,
    Id,
    EnrollmentId,
    Date,
    Status,
    Note,
    RecordedAt,
}
