//! Integration tests for sign-in, sign-out and route guards.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use pit_tracker_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_USERNAME, MEMBER_PASSWORD, TestApp,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints_need_no_session() {
    let app = TestApp::new().await;

    let live = app.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let app = TestApp::new().await;
    let response = app.get("/static/style.css", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_page_renders() {
    let app = TestApp::new().await;
    let response = app.get("/auth/login", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"action="/auth/login""#));
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_login_succeeds_and_opens_home() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;

    let home = app.get("/", Some(&cookie)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains(ADMIN_USERNAME));

    let admin = app.account(ADMIN_USERNAME).await.unwrap();
    assert!(admin.last_login.is_some());
}

#[tokio::test]
async fn test_wrong_password_twice_never_creates_session() {
    let app = TestApp::new().await;

    for _ in 0..2 {
        let response = app
            .post_form(
                "/auth/login",
                None,
                &[("email", ADMIN_EMAIL), ("password", "not-the-password")],
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Invalid email or password."));
        assert!(response.set_cookie.is_none());
    }

    let admin = app.account(ADMIN_USERNAME).await.unwrap();
    assert_eq!(admin.last_login, None);
}

#[tokio::test]
async fn test_unknown_email_looks_like_wrong_password() {
    let app = TestApp::new().await;

    let unknown = app
        .post_form(
            "/auth/login",
            None,
            &[("email", "nobody@team1234.org"), ("password", ADMIN_PASSWORD)],
        )
        .await;
    let malformed = app
        .post_form(
            "/auth/login",
            None,
            &[("email", "not an email"), ("password", ADMIN_PASSWORD)],
        )
        .await;

    for response in [unknown, malformed] {
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains("Invalid email or password."));
        assert!(response.session_cookie().is_none());
    }
}

#[tokio::test]
async fn test_failed_login_keeps_email_in_form() {
    let app = TestApp::new().await;
    let response = app
        .post_form(
            "/auth/login",
            None,
            &[("email", ADMIN_EMAIL), ("password", "nope")],
        )
        .await;

    assert!(response.body.contains(&format!(r#"value="{ADMIN_EMAIL}""#)));
}

#[tokio::test]
async fn test_login_page_redirects_when_signed_in() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;

    let response = app.get("/auth/login", Some(&cookie)).await;
    assert!(response.redirects_to("/"));
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;

    let response = app.post_form("/auth/logout", Some(&cookie), &[]).await;
    assert!(response.redirects_to("/auth/login"));

    let after = app.get("/tools", Some(&cookie)).await;
    assert!(after.redirects_to("/auth/login"));
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let app = TestApp::new().await;
    let response = app.get("/auth/logout", None).await;
    assert!(response.redirects_to("/auth/login"));
}

// =============================================================================
// Guards
// =============================================================================

#[tokio::test]
async fn test_signed_out_visitors_are_sent_to_login() {
    let app = TestApp::new().await;

    for path in ["/", "/tools", "/tools/new", "/users", "/users/new"] {
        let response = app.get(path, None).await;
        assert!(
            response.redirects_to("/auth/login"),
            "{path} should redirect: {response:?}"
        );
    }

    let response = app
        .post_form(
            "/tools/new",
            None,
            &[("team_number", "1234"), ("tool_name", "Drill")],
        )
        .await;
    assert!(response.redirects_to("/auth/login"));
    assert!(app.loans().await.is_empty());
}

#[tokio::test]
async fn test_bogus_session_cookie_is_unauthenticated() {
    let app = TestApp::new().await;
    let response = app.get("/tools", Some("pt_session=not-a-real-session")).await;
    assert!(response.redirects_to("/auth/login"));
}

#[tokio::test]
async fn test_deleted_account_loses_access_immediately() {
    let app = TestApp::new().await;
    let admin_cookie = app.login_admin().await;
    let member = app
        .create_account(&admin_cookie, "pitcrew", "crew@team1234.org", false)
        .await;
    let member_cookie = app
        .login("crew@team1234.org", MEMBER_PASSWORD)
        .await;
    assert_eq!(app.get("/tools", Some(&member_cookie)).await.status, StatusCode::OK);

    let deleted = app
        .post_form(&format!("/users/{}/delete", member.id), Some(&admin_cookie), &[])
        .await;
    assert_eq!(deleted.status, StatusCode::SEE_OTHER);

    let response = app.get("/tools", Some(&member_cookie)).await;
    assert!(response.redirects_to("/auth/login"));
}
