mod common;

use common::{create_test_db, date, enroll, professor, section, student};
use database::entities::{attendance_records, class_sections, enrollments};
use database::services::{
    ServiceError,
    attendance::{AttendanceService, NewAttendance},
    class_sections::ClassSectionService,
    enrollments::EnrollmentService,
    professors::ProfessorService,
    students::StudentService,
};
use models::{attendance::AttendanceStatus, identity::Identity};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn test_deleting_representative_keeps_section() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let alan = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, alan.id, section.id).await;

    AttendanceService::create(
        &db,
        &Identity::Admin,
        NewAttendance {
            enrollment_id: enrollment.id,
            date: date(2025, 3, 3),
            status: AttendanceStatus::Present,
            note: String::new(),
        },
    )
    .await
    .unwrap();
    ClassSectionService::set_representative(&db, &Identity::Admin, section.id, Some(alan.id))
        .await
        .unwrap();

    StudentService::delete(&db, &Identity::Admin, alan.id)
        .await
        .unwrap();

    let section = class_sections::Entity::find_by_id(section.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(section.representative_id, None);
    assert_eq!(enrollments::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(attendance_records::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_professor_with_sections_is_protected() {
    let db = create_test_db().await;
    let grace = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", grace.id).await;

    let err = ProfessorService::delete(&db, &Identity::Admin, grace.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Protected(_)));

    ClassSectionService::delete(&db, &Identity::Admin, section.id)
        .await
        .unwrap();
    ProfessorService::delete(&db, &Identity::Admin, grace.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_only_admins_delete() {
    let db = create_test_db().await;
    let grace = professor(&db, "Grace Hopper", "grace@school.test").await;

    let err = ProfessorService::delete(&db, &Identity::Coordinator, grace.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_deleting_section_cascades() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let alan = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, alan.id, section.id).await;

    AttendanceService::create(
        &db,
        &Identity::Admin,
        NewAttendance {
            enrollment_id: enrollment.id,
            date: date(2025, 3, 3),
            status: AttendanceStatus::Absent,
            note: "sick".to_string(),
        },
    )
    .await
    .unwrap();

    ClassSectionService::delete(&db, &Identity::Admin, section.id)
        .await
        .unwrap();

    assert_eq!(enrollments::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(attendance_records::Entity::find().count(&db).await.unwrap(), 0);
    assert!(StudentService::get(&db, alan.id).await.is_ok());
}

#[tokio::test]
async fn test_unenrolling_representative_clears_it() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let alan = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, alan.id, section.id).await;

    ClassSectionService::set_representative(&db, &Identity::Admin, section.id, Some(alan.id))
        .await
        .unwrap();
    EnrollmentService::delete(&db, &Identity::Admin, enrollment.id)
        .await
        .unwrap();

    let representative = ClassSectionService::representative(&db, &Identity::Admin, section.id)
        .await
        .unwrap();
    assert!(representative.is_none());
}
