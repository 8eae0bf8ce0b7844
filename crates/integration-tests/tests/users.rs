//! Integration tests for admin-only account management.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use pit_tracker_core::Role;
use pit_tracker_integration_tests::{ADMIN_EMAIL, ADMIN_USERNAME, MEMBER_PASSWORD, TestApp};

#[tokio::test]
async fn test_admin_sees_user_list() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;

    let response = app.get("/users", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(ADMIN_EMAIL));
    assert!(response.body.contains(ADMIN_USERNAME));
    assert!(response.body.contains(r#"class="badge admin""#));
    // Own row has no delete button
    assert!(!response.body.contains("/delete"));
}

#[tokio::test]
async fn test_member_promotion_scenario() {
    let app = TestApp::new().await;
    let admin_cookie = app.login_admin().await;

    let member = app
        .create_account(&admin_cookie, "pitcrew", "crew@team1234.org", false)
        .await;
    assert_eq!(member.role, Role::Member);

    let member_cookie = app.login("crew@team1234.org", MEMBER_PASSWORD).await;
    let denied = app.get("/users", Some(&member_cookie)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let response = app
        .post_form(
            &format!("/users/{}/edit", member.id),
            Some(&admin_cookie),
            &[
                ("username", "pitcrew"),
                ("email", "crew@team1234.org"),
                ("is_admin", "on"),
            ],
        )
        .await;
    assert!(response.redirects_to("/users?success=updated_admin&user=pitcrew"));

    let allowed = app.get("/users", Some(&member_cookie)).await;
    assert_eq!(allowed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_demotion_takes_effect_on_next_request() {
    let app = TestApp::new().await;
    let admin_cookie = app.login_admin().await;
    let deputy = app
        .create_account(&admin_cookie, "deputy", "deputy@team1234.org", true)
        .await;
    let deputy_cookie = app.login("deputy@team1234.org", MEMBER_PASSWORD).await;
    assert_eq!(
        app.get("/users", Some(&deputy_cookie)).await.status,
        StatusCode::OK
    );

    let response = app
        .post_form(
            &format!("/users/{}/edit", deputy.id),
            Some(&admin_cookie),
            &[("username", "deputy"), ("email", "deputy@team1234.org")],
        )
        .await;
    assert!(response.redirects_to("/users?success=updated_member&user=deputy"));

    assert_eq!(
        app.get("/users", Some(&deputy_cookie)).await.status,
        StatusCode::FORBIDDEN
    );
    // Loans stay open to members
    assert_eq!(
        app.get("/tools", Some(&deputy_cookie)).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_members_cannot_mutate_accounts() {
    let app = TestApp::new().await;
    let admin_cookie = app.login_admin().await;
    app.create_account(&admin_cookie, "pitcrew", "crew@team1234.org", false)
        .await;
    let member_cookie = app.login("crew@team1234.org", MEMBER_PASSWORD).await;
    let admin = app.account(ADMIN_USERNAME).await.unwrap();
    let before = app.accounts().await;

    let create = app
        .post_form(
            "/users/new",
            Some(&member_cookie),
            &[
                ("username", "sneaky"),
                ("email", "sneaky@team1234.org"),
                ("password", MEMBER_PASSWORD),
                ("password_confirm", MEMBER_PASSWORD),
                ("is_admin", "on"),
            ],
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let delete = app
        .post_form(&format!("/users/{}/delete", admin.id), Some(&member_cookie), &[])
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    assert_eq!(app.accounts().await, before);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    let admin = app.account(ADMIN_USERNAME).await.unwrap();

    let response = app
        .post_form(&format!("/users/{}/delete", admin.id), Some(&cookie), &[])
        .await;
    assert!(response.redirects_to("/users?error=self_delete"));
    assert!(app.account_by_id(admin.id).await.is_some());

    let list = app.get("/users?error=self_delete", Some(&cookie)).await;
    assert!(list.body.contains("You cannot delete your own account!"));
}

#[tokio::test]
async fn test_admin_deletes_other_account() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    let member = app
        .create_account(&cookie, "pitcrew", "crew@team1234.org", false)
        .await;

    let response = app
        .post_form(&format!("/users/{}/delete", member.id), Some(&cookie), &[])
        .await;
    assert!(response.redirects_to("/users?success=deleted&user=pitcrew"));
    assert!(app.account_by_id(member.id).await.is_none());

    let again = app
        .post_form(&format!("/users/{}/delete", member.id), Some(&cookie), &[])
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    let before = app.accounts().await.len();

    let response = app
        .post_form(
            "/users/new",
            Some(&cookie),
            &[
                ("username", "imposter"),
                ("email", ADMIN_EMAIL),
                ("password", MEMBER_PASSWORD),
                ("password_confirm", MEMBER_PASSWORD),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("A user with that email already exists."));
    assert!(response.body.contains("imposter"));
    assert_eq!(app.accounts().await.len(), before);
}

#[tokio::test]
async fn test_edit_to_taken_email_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    let member = app
        .create_account(&cookie, "pitcrew", "crew@team1234.org", false)
        .await;

    let response = app
        .post_form(
            &format!("/users/{}/edit", member.id),
            Some(&cookie),
            &[
                ("username", "pitcrew-renamed"),
                ("email", ADMIN_EMAIL),
                ("is_admin", "on"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("A user with that email already exists."));
    assert!(response.body.contains(r#"value="pitcrew-renamed""#));
    assert_eq!(app.account_by_id(member.id).await, Some(member));
}

#[tokio::test]
async fn test_weak_or_mismatched_password_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;

    let short = app
        .post_form(
            "/users/new",
            Some(&cookie),
            &[
                ("username", "pitcrew"),
                ("email", "crew@team1234.org"),
                ("password", "short"),
                ("password_confirm", "short"),
            ],
        )
        .await;
    assert_eq!(short.status, StatusCode::OK);
    assert!(short.body.contains("This password is too short."));

    let mismatch = app
        .post_form(
            "/users/new",
            Some(&cookie),
            &[
                ("username", "pitcrew"),
                ("email", "crew@team1234.org"),
                ("password", MEMBER_PASSWORD),
                ("password_confirm", "something-else-1"),
            ],
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::OK);
    assert!(mismatch.body.contains("The two password fields didn"));

    assert!(app.account("pitcrew").await.is_none());
}

#[tokio::test]
async fn test_created_member_can_sign_in() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    app.create_account(&cookie, "pitcrew", "crew@team1234.org", false)
        .await;

    let list = app
        .get("/users?success=created&user=pitcrew", Some(&cookie))
        .await;
    assert!(list.body.contains("User pitcrew has been created successfully."));

    let member_cookie = app.login("crew@team1234.org", MEMBER_PASSWORD).await;
    let home = app.get("/", Some(&member_cookie)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(!home.body.contains(r#"href="/users""#));
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = TestApp::new().await;
    let cookie = app.login_admin().await;
    let member = app
        .create_account(&cookie, "pitcrew", "crew@team1234.org", false)
        .await;

    let form = app
        .get(&format!("/users/{}/edit", member.id), Some(&cookie))
        .await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains(r#"value="pitcrew""#));
    assert!(form.body.contains(r#"value="crew@team1234.org""#));

    let missing = app.get("/users/999/edit", Some(&cookie)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
