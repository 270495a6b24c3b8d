mod common;

use common::{account, create_test_db, policy};
use database::entities::{accounts, professors, students};
use database::services::{
    ServiceError,
    accounts::{AccountService, Registration},
    groups::GroupService,
    identity::IdentityService,
    professors::{NewProfessor, ProfessorService},
    provisioning::{ProvisionOutcome, ProvisioningService},
    students::{NewStudent, StudentService},
};
use models::{
    identity::Identity,
    profile::{Gender, ProfileRole, RoleGroup, placeholder_birth_date},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

#[tokio::test]
async fn test_professor_account_creates_placeholder_profile() {
    let db = create_test_db().await;
    let account = account(&db, "ada", "ada@school.test").await;

    let outcome =
        ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Professor)
            .await;
    assert_eq!(outcome, ProvisionOutcome::Created(ProfileRole::Professor));

    let professor = professors::Entity::find()
        .filter(professors::Column::AccountId.eq(account.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(professor.department, "unassigned");
    assert_eq!(professor.name, "Ada Lovelace");
    assert_eq!(professor.email, "ada@school.test");

    let groups = GroupService::group_names(&db, account.id).await.unwrap();
    assert_eq!(groups, vec!["Professor".to_string()]);

    let identity = IdentityService::resolve(&db, Some(&account)).await.unwrap();
    assert_eq!(identity, Identity::Professor(professor.id));
}

#[tokio::test]
async fn test_student_placeholder_values() {
    let db = create_test_db().await;
    let account = account(&db, "ada", "ada@school.test").await;

    let outcome =
        ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Student)
            .await;
    assert_eq!(outcome, ProvisionOutcome::Created(ProfileRole::Student));

    let student = students::Entity::find()
        .filter(students::Column::AccountId.eq(account.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.course, "unassigned");
    assert_eq!(student.gender, Gender::NotInformed);
    assert_eq!(student.birth_date, placeholder_birth_date());
    assert!(student.enrollment_code.starts_with("MAT"));
    assert_eq!(student.enrollment_code.len(), 11);
}

#[tokio::test]
async fn test_existing_profile_is_linked_by_email() {
    let db = create_test_db().await;

    // Profiles created through the service get an account, so insert directly
    let student = students::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Alan Turing".to_string()),
        enrollment_code: Set("MAT001".to_string()),
        email: Set(Some("alan@school.test".to_string())),
        course: Set("Mathematics".to_string()),
        birth_date: Set(common::date(2001, 6, 23)),
        gender: Set(Gender::Male),
        account_id: Set(None),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&db)
    .await
    .unwrap();

    let account = account(&db, "alan", "alan@school.test").await;
    let outcome =
        ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Student)
            .await;
    assert_eq!(outcome, ProvisionOutcome::Linked(ProfileRole::Student));

    let linked = students::Entity::find_by_id(student.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.account_id, Some(account.id));
    assert_eq!(linked.course, "Mathematics");
}

#[tokio::test]
async fn test_provisioning_twice_is_a_noop() {
    let db = create_test_db().await;
    let account = account(&db, "ada", "ada@school.test").await;

    ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Student)
        .await;
    let again =
        ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Professor)
            .await;

    assert_eq!(again, ProvisionOutcome::AlreadyLinked(ProfileRole::Student));
    let professors = professors::Entity::find().all(&db).await.unwrap();
    assert!(professors.is_empty());
}

#[tokio::test]
async fn test_professor_conflict_falls_back_to_student() {
    let db = create_test_db().await;

    // The professor with this e-mail belongs to another account
    ProfessorService::create(
        &db,
        &policy(),
        &Identity::Admin,
        NewProfessor {
            name: "Grace Hopper".to_string(),
            email: "grace@school.test".to_string(),
            department: "Computing".to_string(),
            active: true,
        },
    )
    .await
    .unwrap();

    let account = account(&db, "impostor", "grace@school.test").await;
    let outcome =
        ProvisioningService::provision_for_account(&db, &policy(), &account, ProfileRole::Professor)
            .await;
    assert_eq!(outcome, ProvisionOutcome::Created(ProfileRole::Student));

    let groups = GroupService::group_names(&db, account.id).await.unwrap();
    assert_eq!(groups, vec!["Student".to_string()]);

    let mut strict = policy();
    strict.fallback_to_student = false;
    let other = common::account(&db, "impostor2", "grace@school.test").await;
    let outcome =
        ProvisioningService::provision_for_account(&db, &strict, &other, ProfileRole::Professor)
            .await;
    assert_eq!(outcome, ProvisionOutcome::Failed);
    assert!(GroupService::group_names(&db, other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_without_account_gets_one() {
    let db = create_test_db().await;

    let professor = ProfessorService::create(
        &db,
        &policy(),
        &Identity::Admin,
        NewProfessor {
            name: "Grace Brewster Hopper".to_string(),
            email: "grace@school.test".to_string(),
            department: "Computing".to_string(),
            active: true,
        },
    )
    .await
    .unwrap()
    .professor;

    let account_id = professor.account_id.unwrap();
    let account = accounts::Entity::find_by_id(account_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.username, "grace");
    assert_eq!(account.first_name, "Grace");
    assert_eq!(account.last_name, "Brewster Hopper");
    assert!(!account.is_staff);
    assert!(bcrypt::verify("changeme", &account.password_hash).unwrap());
    assert!(
        GroupService::is_member(&db, account.id, RoleGroup::Professor)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_usernames_are_disambiguated() {
    let db = create_test_db().await;
    account(&db, "grace", "someone@school.test").await;
    account(&db, "grace1", "someone.else@school.test").await;

    let professor = ProfessorService::create(
        &db,
        &policy(),
        &Identity::Admin,
        NewProfessor {
            name: "Grace".to_string(),
            email: "grace@school.test".to_string(),
            department: "Computing".to_string(),
            active: true,
        },
    )
    .await
    .unwrap()
    .professor;

    let account = accounts::Entity::find_by_id(professor.account_id.unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.username, "grace2");
    assert_eq!(account.first_name, "");
    assert_eq!(account.last_name, "");
}

#[tokio::test]
async fn test_student_without_email_uses_enrollment_code() {
    let db = create_test_db().await;

    let student = StudentService::create(
        &db,
        &policy(),
        &Identity::Admin,
        NewStudent {
            name: "Alan Turing".to_string(),
            enrollment_code: "MAT2025X".to_string(),
            email: None,
            course: "Mathematics".to_string(),
            birth_date: common::date(2001, 6, 23),
            gender: Gender::Male,
        },
    )
    .await
    .unwrap();

    let account = accounts::Entity::find_by_id(student.account_id.unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.username, "mat2025x");
    assert!(
        GroupService::is_member(&db, account.id, RoleGroup::Student)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_register_issues_token_and_profile() {
    let db = create_test_db().await;

    let (account, token) = AccountService::register(
        &db,
        &policy(),
        Registration {
            username: "edsger".to_string(),
            email: "edsger@school.test".to_string(),
            password: "goto-harmful".to_string(),
            password_confirmation: "goto-harmful".to_string(),
            first_name: "Edsger".to_string(),
            last_name: "Dijkstra".to_string(),
            role: ProfileRole::Professor,
        },
    )
    .await
    .unwrap();

    let authenticated = AccountService::authenticate(&db, &token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(authenticated.id, account.id);

    let identity = IdentityService::resolve(&db, Some(&account)).await.unwrap();
    assert!(identity.professor_id().is_some());

    let err = AccountService::register(
        &db,
        &policy(),
        Registration {
            username: "edsger".to_string(),
            email: "other@school.test".to_string(),
            password: "abcdef".to_string(),
            password_confirmation: "abcdef".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation {
            field: "username",
            ..
        }
    ));
}

#[tokio::test]
async fn test_unique_username_sees_names_with_backslashes() {
    let db = create_test_db().await;
    account(&db, r"o\neil", "oneil@school.test").await;
    account(&db, "o_neil", "o_neil@school.test").await;

    let username = AccountService::unique_username(&db, r"o\neil").await.unwrap();
    assert_eq!(username, r"o\neil1");

    let username = AccountService::unique_username(&db, "o%neil").await.unwrap();
    assert_eq!(username, "o%neil");
}
