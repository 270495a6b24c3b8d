use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use database::services::{
    AccountPolicy,
    accounts::{AccountService, NewAccount},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use server::{app, state::AppState};
use tower::ServiceExt;

fn policy() -> AccountPolicy {
    AccountPolicy {
        default_password: Some("changeme".to_string()),
        fallback_to_student: true,
        password_cost: 4,
    }
}

async fn setup() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (app(AppState::new(db.clone(), policy())), db)
}

async fn admin_token(db: &DatabaseConnection) -> String {
    let admin = AccountService::create(
        db,
        &policy(),
        NewAccount {
            username: "admin".to_string(),
            email: "admin@school.test".to_string(),
            password: Some("admin-password".to_string()),
            is_staff: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    AccountService::issue_token(db, admin.id).await.unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Token {token}"));
    }

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup().await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _db) = setup().await;

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/attendance"].is_object());
}

#[tokio::test]
async fn test_register_login_and_me() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alan",
            "email": "alan@school.test",
            "password": "enigma42",
            "password_confirmation": "enigma42",
            "first_name": "Alan",
            "last_name": "Turing"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["group"], "Student");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alan", "password": "enigma42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alan");

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alan",
            "email": "alan@school.test",
            "password": "enigma42",
            "password_confirmation": "enigma43"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn test_change_password_rotates_token() {
    let (app, _db) = setup().await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "barbara",
            "email": "barbara@school.test",
            "password": "liskov01",
            "password_confirmation": "liskov01",
            "role": "professor"
        })),
    )
    .await;
    assert_eq!(body["account"]["group"], "Professor");
    let old_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&old_token),
        Some(json!({
            "old_password": "liskov01",
            "new_password": "abc",
            "confirm_password": "abc"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["new_password"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&old_token),
        Some(json!({
            "old_password": "liskov01",
            "new_password": "substitution",
            "confirm_password": "substitution"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_token = body["token"].as_str().unwrap();
    assert_ne!(new_token, old_token);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&old_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_access() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "GET", "/api/attendance", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "GET", "/api/class-sections", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        "POST",
        "/api/professors",
        None,
        Some(json!({ "name": "X", "email": "x@school.test", "department": "Y" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/class-sections/mine", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_section_workflow() {
    let (app, db) = setup().await;
    let admin = admin_token(&db).await;

    let (status, professor) = send(
        &app,
        "POST",
        "/api/professors",
        Some(&admin),
        Some(json!({
            "name": "Grace Hopper",
            "email": "grace@school.test",
            "department": "Computing"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let professor_id = professor["id"].as_str().unwrap().to_string();
    assert!(professor["account_id"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/class-sections",
        Some(&admin),
        Some(json!({
            "name": "Compilers",
            "professor_id": professor_id,
            "start_date": "2025-02-01",
            "end_date": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["end_date"].is_array());

    let (status, section) = send(
        &app,
        "POST",
        "/api/class-sections",
        Some(&admin),
        Some(json!({
            "name": "Compilers",
            "professor_id": professor_id,
            "start_date": "2025-02-01",
            "end_date": "2025-06-30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(section["status"], "Active");
    assert_eq!(section["professor_name"], "Grace Hopper");
    let section_id = section["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/api/class-sections", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], section_id.as_str());

    let (status, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(&admin),
        Some(json!({
            "name": "Alan Turing",
            "enrollment_code": "MAT001",
            "email": "alan@school.test",
            "course": "Mathematics",
            "birth_date": "2001-06-23",
            "gender": "M"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_id = student["id"].as_str().unwrap().to_string();

    let (status, enrollment) = send(
        &app,
        "POST",
        &format!("/api/class-sections/{section_id}/enroll-student"),
        Some(&admin),
        Some(json!({ "student_id": student_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let enrollment_id = enrollment["id"].as_str().unwrap().to_string();

    let (status, record) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(json!({
            "enrollment_id": enrollment_id,
            "date": "2025-03-03",
            "status": "Absent"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["student_name"], "Alan Turing");

    let (status, _) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&admin),
        Some(json!({ "enrollment_id": enrollment_id, "date": "2025-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, dashboard) = send(
        &app,
        "GET",
        &format!("/api/class-sections/{section_id}/dashboard"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_attendance_records"], 1);
    assert_eq!(dashboard["students"][0]["attendance_percentage"], 0.0);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/professors/{professor_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, public) = send(&app, "GET", "/api/public/class-sections", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public[0]["name"], "Compilers");
    assert!(public[0].get("description").is_none());
}

#[tokio::test]
async fn test_professor_cannot_record_for_other_sections() {
    let (app, db) = setup().await;
    let admin = admin_token(&db).await;

    let mut professor_ids = Vec::new();
    for (name, email) in [
        ("Grace Hopper", "grace@school.test"),
        ("Edsger Dijkstra", "edsger@school.test"),
    ] {
        let (_, professor) = send(
            &app,
            "POST",
            "/api/professors",
            Some(&admin),
            Some(json!({ "name": name, "email": email, "department": "Computing" })),
        )
        .await;
        professor_ids.push(professor["id"].as_str().unwrap().to_string());
    }

    let (_, section) = send(
        &app,
        "POST",
        "/api/class-sections",
        Some(&admin),
        Some(json!({
            "name": "Compilers",
            "professor_id": professor_ids[0],
            "start_date": "2025-02-01",
            "end_date": "2025-06-30"
        })),
    )
    .await;
    let (_, student) = send(
        &app,
        "POST",
        "/api/students",
        Some(&admin),
        Some(json!({
            "name": "Alan Turing",
            "enrollment_code": "MAT001",
            "course": "Mathematics",
            "birth_date": "2001-06-23"
        })),
    )
    .await;
    let (_, enrollment) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&admin),
        Some(json!({ "student_id": student["id"], "class_section_id": section["id"] })),
    )
    .await;

    // Provisioned professor accounts use the configured default password
    let (status, login) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "edsger", "password": "changeme" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let edsger = login["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/attendance",
        Some(&edsger),
        Some(json!({ "enrollment_id": enrollment["id"], "date": "2025-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, mine) = send(&app, "GET", "/api/class-sections/mine", Some(&edsger), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine, json!([]));
}
