//! Common test utilities for integration tests.
//!
//! Tests run against a real PostgreSQL database from `TEST_DATABASE_URL` and
//! are skipped when it is not set. Every test creates its own users and
//! courses, so tests do not need to clean up after each other.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use courses_api::{app::create_app, config::Config};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::Value;
use shared::session::SessionKeys;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

/// Session secret shared by the test config and the token helper.
pub const TEST_SESSION_SECRET: &str = "test-session-secret";

/// Connects to the test database and applies migrations.
///
/// Returns `None` when `TEST_DATABASE_URL` is not set.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn test_config() -> Config {
    Config::load_for_test(&[("server.app_base_url", "https://courses.test")])
        .expect("Failed to load test config")
}

pub fn test_app(pool: &PgPool) -> Router {
    create_app(test_config(), pool.clone()).expect("Failed to build app")
}

/// A user row plus a session token for it.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub token: String,
}

/// Inserts a user with a verified email.
pub async fn create_user(pool: &PgPool) -> TestUser {
    create_user_with(pool, &unique_email(), true).await
}

/// Inserts a user with the given email.
pub async fn create_user_with(pool: &PgPool, email: &str, verified: bool) -> TestUser {
    let name: String = Name().fake();
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (reference, email, name, email_verified_at)
        VALUES ($1, $2, $3, CASE WHEN $4 THEN NOW() ELSE NULL END)
        RETURNING id
        "#,
    )
    .bind(shared::crypto::generate_reference())
    .bind(email)
    .bind(&name)
    .bind(verified)
    .fetch_one(pool)
    .await
    .expect("Failed to create test user");

    let keys = SessionKeys::new(TEST_SESSION_SECRET, 30).unwrap();
    let (token, _) = keys.issue(id, 3600).unwrap();

    TestUser {
        id,
        email: email.to_string(),
        name,
        token,
    }
}

pub fn unique_email() -> String {
    format!("user_{}@example.edu", Uuid::new_v4().simple())
}

/// Sends a request and returns the status and JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: &Router, uri: &str, user: &TestUser) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(&user.token), None).await
}

pub async fn post(app: &Router, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(&user.token), Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, Some(&user.token), Some(body)).await
}

pub async fn put(app: &Router, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(&user.token), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, user: &TestUser) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, Some(&user.token), None).await
}

/// Creates a course through the API and returns its reference.
pub async fn create_course(app: &Router, staff: &TestUser) -> String {
    let (status, body) = post(
        app,
        "/api/v1/courses",
        staff,
        serde_json::json!({ "name": "Principles of Programming Languages", "year": "2026" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create course failed: {}", body);
    body["reference"].as_str().unwrap().to_string()
}

/// Creates a link invitation and returns its reference.
pub async fn create_link_invitation(
    app: &Router,
    staff: &TestUser,
    course: &str,
    role: &str,
) -> String {
    let (status, body) = post(
        app,
        &format!("/api/v1/courses/{}/invitations", course),
        staff,
        serde_json::json!({ "type": "link", "course_role": role }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create invitation failed: {}", body);
    body["invitation"]["reference"].as_str().unwrap().to_string()
}

/// Redeems an invitation as `user`.
pub async fn redeem(
    app: &Router,
    user: &TestUser,
    course: &str,
    invitation: &str,
) -> (StatusCode, Value) {
    post(
        app,
        &format!("/api/v1/courses/{}/invitations/{}/redeem", course, invitation),
        user,
        Value::Null,
    )
    .await
}

/// Joins `user` to `course` through a fresh link invitation.
pub async fn join_course(
    app: &Router,
    staff: &TestUser,
    user: &TestUser,
    course: &str,
    role: &str,
) -> String {
    let invitation = create_link_invitation(app, staff, course, role).await;
    let (status, body) = redeem(app, user, course, &invitation).await;
    assert_eq!(status, StatusCode::CREATED, "redeem failed: {}", body);
    body["participant_reference"].as_str().unwrap().to_string()
}

/// Lists participants and returns the array.
pub async fn participants(app: &Router, user: &TestUser, course: &str) -> Vec<Value> {
    let (status, body) = get(app, &format!("/api/v1/courses/{}/participants", course), user).await;
    assert_eq!(status, StatusCode::OK, "list participants failed: {}", body);
    body["participants"].as_array().unwrap().clone()
}

/// Reference of the participant row belonging to `user`.
pub async fn participant_reference(
    app: &Router,
    viewer: &TestUser,
    course: &str,
    user: &TestUser,
) -> String {
    participants(app, viewer, course)
        .await
        .iter()
        .find(|p| p["email"] == user.email.as_str())
        .and_then(|p| p["reference"].as_str())
        .unwrap()
        .to_string()
}

/// Number of outbox rows recorded for a course.
pub async fn notification_count(pool: &PgPool, course: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM course_notifications n
        JOIN courses c ON c.id = n.course_id
        WHERE c.reference = $1
        "#,
    )
    .bind(course)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Number of queued emails addressed to `email`.
pub async fn queued_email_count(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM send_email_jobs WHERE mail_options->>'to' = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}
