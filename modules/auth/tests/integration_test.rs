use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Extension, Router,
};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use auth::{
    contract::model::{Credentials, NewUser},
    domain::error::DomainError,
    infra::storage::migrations::Migrator,
    SeaOrmUsersRepository, Service, TokenService,
};

/// Create a fresh test database for each test
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

async fn create_test_service() -> Arc<Service> {
    let db = create_test_db().await;
    Arc::new(Service::new(Arc::new(SeaOrmUsersRepository::new(db))))
}

fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        "integration-test-secret",
        Duration::from_secs(3600),
    ))
}

/// Router wired the way the server wires it: auth routes plus the
/// token-service extension for the whole tree.
async fn create_test_router() -> Router {
    let service = create_test_service().await;
    auth::routes(service).layer(Extension(test_token_service()))
}

fn signup(name: &str, email: &str, password: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn service_register_login_roundtrip() -> Result<()> {
    let service = create_test_service().await;

    let user = service
        .register(signup("Alice", "Alice@Example.com", "secret1"))
        .await?;
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, "owner");

    let logged_in = service
        .login(Credentials {
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await?;
    assert_eq!(logged_in.id, user.id);

    let current = service.current_user(user.id).await?;
    assert_eq!(current.email, "alice@example.com");

    Ok(())
}

#[tokio::test]
async fn unique_index_rejects_duplicate_email() -> Result<()> {
    let service = create_test_service().await;

    service
        .register(signup("Alice", "alice@example.com", "secret1"))
        .await?;

    // Different case, same address once normalized. The failure comes from
    // the database unique index, not a pre-check.
    let err = service
        .register(signup("Impostor", "ALICE@EXAMPLE.COM", "secret2"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));

    Ok(())
}

#[tokio::test]
async fn rest_register_returns_user_and_token() -> Result<()> {
    let router = create_test_router().await;

    let response = router
        .oneshot(post_json(
            "/register",
            serde_json::json!({
                "name": "Alice",
                "email": "Alice@Example.com",
                "password": "secret1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "owner");
    assert!(body["user"]["createdAt"].is_string());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!body["token"].as_str().unwrap_or_default().is_empty());

    Ok(())
}

#[tokio::test]
async fn rest_register_duplicate_email_conflicts() -> Result<()> {
    let router = create_test_router().await;

    let payload = serde_json::json!({
        "name": "Alice",
        "email": "alice@example.com",
        "password": "secret1"
    });

    let first = router
        .clone()
        .oneshot(post_json("/register", payload.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router.oneshot(post_json("/register", payload)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = body_json(second).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["message"], "User already exists with this email");

    Ok(())
}

#[tokio::test]
async fn rest_register_collects_field_violations() -> Result<()> {
    let router = create_test_router().await;

    // Missing name, bad email, short password: all three reported at once.
    let response = router
        .oneshot(post_json(
            "/register",
            serde_json::json!({"email": "nope", "password": "123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_failed");
    let violations = body["violations"].as_array().expect("violations array");
    assert_eq!(violations.len(), 3);
    assert_eq!(violations[0]["field"], "name");
    assert_eq!(violations[0]["message"], "Name is required");
    assert_eq!(violations[1]["message"], "Please enter a valid email");
    assert_eq!(
        violations[2]["message"],
        "Password must be at least 6 characters"
    );

    Ok(())
}

#[tokio::test]
async fn rest_login_succeeds_and_rejects_bad_credentials() -> Result<()> {
    let router = create_test_router().await;

    let created = router
        .clone()
        .oneshot(post_json(
            "/register",
            serde_json::json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "secret1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let ok = router
        .clone()
        .oneshot(post_json(
            "/login",
            serde_json::json!({"email": "ALICE@example.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = body_json(ok).await;
    assert!(!body["token"].as_str().unwrap_or_default().is_empty());

    // Wrong password and unknown email share one message.
    for payload in [
        serde_json::json!({"email": "alice@example.com", "password": "wrong1"}),
        serde_json::json!({"email": "ghost@example.com", "password": "secret1"}),
    ] {
        let response = router
            .clone()
            .oneshot(post_json("/login", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["message"], "Invalid email or password");
    }

    Ok(())
}

#[tokio::test]
async fn rest_login_validates_input_before_auth() -> Result<()> {
    let router = create_test_router().await;

    let response = router
        .oneshot(post_json(
            "/login",
            serde_json::json!({"email": "not-an-email", "password": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_failed");
    let violations = body["violations"].as_array().expect("violations array");
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[1]["message"], "Password is required");

    Ok(())
}

#[tokio::test]
async fn rest_me_roundtrip() -> Result<()> {
    let router = create_test_router().await;

    let created = router
        .clone()
        .oneshot(post_json(
            "/register",
            serde_json::json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "secret1"
            }),
        ))
        .await
        .unwrap();
    let created_body = body_json(created).await;
    let token = created_body["token"].as_str().expect("token").to_string();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("token").is_none());

    Ok(())
}

#[tokio::test]
async fn rest_me_rejects_missing_and_broken_tokens() -> Result<()> {
    let router = create_test_router().await;

    let missing = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(missing).await;
    assert_eq!(body["message"], "Not authorized, no token");

    let garbage = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/me")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(garbage).await;
    assert_eq!(body["message"], "Not authorized, token failed");

    Ok(())
}

#[tokio::test]
async fn rest_me_rejects_token_for_vanished_user() -> Result<()> {
    let router = create_test_router().await;

    // Valid signature, but the subject was never registered.
    let token = test_token_service().issue(Uuid::new_v4()).unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "User not found");

    Ok(())
}
