mod common;

use common::{create_test_db, date, enroll, professor, section, student};
use database::entities::enrollments;
use database::services::{
    ServiceError,
    attendance::{AttendanceChanges, AttendanceFilter, AttendanceService, NewAttendance},
};
use models::{attendance::AttendanceStatus, identity::Identity};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn record(enrollment_id: Uuid, day: u32, status: AttendanceStatus) -> NewAttendance {
    NewAttendance {
        enrollment_id,
        date: date(2025, 3, day),
        status,
        note: String::new(),
    }
}

async fn percentage(db: &sea_orm::DatabaseConnection, id: Uuid) -> f64 {
    enrollments::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .attendance_percentage
}

#[tokio::test]
async fn test_percentage_follows_records() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let student = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, student.id, section.id).await;

    assert_eq!(percentage(&db, enrollment.id).await, 0.0);

    for day in 1..=9 {
        AttendanceService::create(
            &db,
            &Identity::Admin,
            record(enrollment.id, day, AttendanceStatus::Present),
        )
        .await
        .unwrap();
    }
    AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 10, AttendanceStatus::Absent),
    )
    .await
    .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 90.0);

    AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 11, AttendanceStatus::Present),
    )
    .await
    .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 90.91);
}

#[tokio::test]
async fn test_update_and_delete_recompute() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let student = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, student.id, section.id).await;

    let first = AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap();
    let second = AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 2, AttendanceStatus::Absent),
    )
    .await
    .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 50.0);

    AttendanceService::update(
        &db,
        &Identity::Admin,
        second.record.id,
        AttendanceChanges {
            status: Some(AttendanceStatus::Excused),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 50.0);

    AttendanceService::delete(&db, &Identity::Admin, second.record.id)
        .await
        .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 100.0);

    AttendanceService::delete(&db, &Identity::Admin, first.record.id)
        .await
        .unwrap();
    assert_eq!(percentage(&db, enrollment.id).await, 0.0);
}

#[tokio::test]
async fn test_duplicate_date_is_rejected() {
    let db = create_test_db().await;
    let professor = professor(&db, "Grace Hopper", "grace@school.test").await;
    let section = section(&db, "Compilers", professor.id).await;
    let student = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, student.id, section.id).await;

    AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap();

    let err = AttendanceService::create(
        &db,
        &Identity::Admin,
        record(enrollment.id, 1, AttendanceStatus::Absent),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Validation { field: "date", .. }));
    assert_eq!(percentage(&db, enrollment.id).await, 100.0);
}

#[tokio::test]
async fn test_professor_writes_only_own_sections() {
    let db = create_test_db().await;
    let owner = professor(&db, "Grace Hopper", "grace@school.test").await;
    let other = professor(&db, "Edsger Dijkstra", "edsger@school.test").await;
    let section = section(&db, "Compilers", owner.id).await;
    let student = student(&db, "Alan Turing", "MAT001").await;
    let enrollment = enroll(&db, student.id, section.id).await;

    let err = AttendanceService::create(
        &db,
        &Identity::Professor(other.id),
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let err = AttendanceService::create(
        &db,
        &Identity::Student(student.id),
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let err = AttendanceService::create(
        &db,
        &Identity::Coordinator,
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let created = AttendanceService::create(
        &db,
        &Identity::Professor(owner.id),
        record(enrollment.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap();

    let err = AttendanceService::delete(&db, &Identity::Coordinator, created.record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(percentage(&db, enrollment.id).await, 100.0);
}

#[tokio::test]
async fn test_missing_enrollment_is_a_field_error() {
    let db = create_test_db().await;

    let err = AttendanceService::create(
        &db,
        &Identity::Admin,
        record(Uuid::new_v4(), 1, AttendanceStatus::Present),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation {
            field: "enrollment",
            ..
        }
    ));
}

#[tokio::test]
async fn test_list_is_scoped_by_identity() {
    let db = create_test_db().await;
    let grace = professor(&db, "Grace Hopper", "grace@school.test").await;
    let edsger = professor(&db, "Edsger Dijkstra", "edsger@school.test").await;
    let compilers = section(&db, "Compilers", grace.id).await;
    let algorithms = section(&db, "Algorithms", edsger.id).await;
    let alan = student(&db, "Alan Turing", "MAT001").await;
    let barbara = student(&db, "Barbara Liskov", "MAT002").await;

    let alan_compilers = enroll(&db, alan.id, compilers.id).await;
    let barbara_algorithms = enroll(&db, barbara.id, algorithms.id).await;

    AttendanceService::create(
        &db,
        &Identity::Admin,
        record(alan_compilers.id, 1, AttendanceStatus::Present),
    )
    .await
    .unwrap();
    AttendanceService::create(
        &db,
        &Identity::Admin,
        record(barbara_algorithms.id, 1, AttendanceStatus::Absent),
    )
    .await
    .unwrap();

    let all = AttendanceService::list(&db, &Identity::Admin, AttendanceFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    // Coordinators manage records but hold no profile to scope attendance by
    let coordinator = AttendanceService::list(&db, &Identity::Coordinator, AttendanceFilter::default())
        .await
        .unwrap();
    assert!(coordinator.is_empty());

    let graces = AttendanceService::list(
        &db,
        &Identity::Professor(grace.id),
        AttendanceFilter::default(),
    )
    .await
    .unwrap();
    assert_eq!(graces.len(), 1);
    assert_eq!(graces[0].student.id, alan.id);
    assert_eq!(graces[0].section.id, compilers.id);

    let barbaras = AttendanceService::list(
        &db,
        &Identity::Student(barbara.id),
        AttendanceFilter::default(),
    )
    .await
    .unwrap();
    assert_eq!(barbaras.len(), 1);
    assert_eq!(barbaras[0].record.status, AttendanceStatus::Absent);

    let anonymous = AttendanceService::list(&db, &Identity::Anonymous, AttendanceFilter::default())
        .await
        .unwrap();
    assert!(anonymous.is_empty());

    let searched = AttendanceService::list(
        &db,
        &Identity::Admin,
        AttendanceFilter {
            search: Some("Liskov".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].student.id, barbara.id);

    let hidden = AttendanceService::get(&db, &Identity::Student(alan.id), barbaras[0].record.id)
        .await
        .unwrap_err();
    assert!(matches!(hidden, ServiceError::NotFound(_)));
}
