//! Integration tests for the tool loan ledger.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use pit_tracker_integration_tests::{MEMBER_PASSWORD, TestApp};
use pit_tracker_web::models::LoanRecord;

fn assert_stamp_matches_flag(loans: &[LoanRecord]) {
    for loan in loans {
        assert_eq!(
            loan.is_returned(),
            loan.date_returned().is_some(),
            "loan {} is inconsistent",
            loan.id
        );
    }
}

/// Count line as rendered on the loan list.
fn count(value: usize, label: &str) -> String {
    format!("<strong>{value}</strong> {label}")
}

async fn member_app() -> (TestApp, String) {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_account(&admin, "pitcrew", "crew@team1234.org", false)
        .await;
    let cookie = app.login("crew@team1234.org", MEMBER_PASSWORD).await;
    (app, cookie)
}

#[tokio::test]
async fn test_loan_lifecycle_scenario() {
    let (app, cookie) = member_app().await;

    let loan = app.record_loan(&cookie, "1234", "Socket Wrench", "").await;
    assert!(!loan.is_returned());
    assert_eq!(loan.description, "");

    let list = app.get("/tools?success=created", Some(&cookie)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.body.contains("Tool loan recorded successfully!"));
    assert!(list.body.contains("Socket Wrench"));
    assert!(list.body.contains(&count(1, "total")));
    assert!(list.body.contains(&count(1, "out")));
    assert!(list.body.contains(&count(0, "returned")));

    let response = app
        .post_form(
            &format!("/tools/{}/return", loan.id),
            Some(&cookie),
            &[("returned", "on")],
        )
        .await;
    assert!(response.redirects_to("/tools?success=returned"));
    assert!(app.loan(loan.id).await.date_returned().is_some());

    let list = app.get("/tools", Some(&cookie)).await;
    assert!(list.body.contains(&count(1, "total")));
    assert!(list.body.contains(&count(0, "out")));
    assert!(list.body.contains(&count(1, "returned")));

    let response = app
        .post_form(&format!("/tools/{}/return", loan.id), Some(&cookie), &[])
        .await;
    assert!(response.redirects_to("/tools?success=out"));

    let reopened = app.loan(loan.id).await;
    assert_eq!(reopened.date_returned(), None);
    assert_eq!(reopened, loan);

    let list = app.get("/tools", Some(&cookie)).await;
    assert!(list.body.contains(&count(1, "out")));
    assert!(list.body.contains(&count(0, "returned")));
}

#[tokio::test]
async fn test_counts_always_add_up() {
    let (app, cookie) = member_app().await;

    let first = app.record_loan(&cookie, "254", "Drill", "blue case").await;
    let second = app.record_loan(&cookie, "1678", "Zip ties", "").await;
    app.record_loan(&cookie, "118", "Multimeter", "").await;

    for (id, returned) in [(first.id, true), (second.id, true), (first.id, false)] {
        let fields: &[(&str, &str)] = if returned { &[("returned", "on")] } else { &[] };
        let response = app
            .post_form(&format!("/tools/{id}/return"), Some(&cookie), fields)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);

        let loans = app.loans().await;
        assert_stamp_matches_flag(&loans);
        let returned_count = loans.iter().filter(|loan| loan.is_returned()).count();
        let active_count = loans.len() - returned_count;
        assert_eq!(active_count + returned_count, 3);
    }

    let list = app.get("/tools", Some(&cookie)).await;
    assert!(list.body.contains(&count(3, "total")));
    assert!(list.body.contains(&count(2, "out")));
    assert!(list.body.contains(&count(1, "returned")));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let (app, cookie) = member_app().await;
    app.record_loan(&cookie, "1", "Older Tool", "").await;
    app.record_loan(&cookie, "2", "Newer Tool", "").await;

    let list = app.get("/tools", Some(&cookie)).await;
    let newer = list.body.find("Newer Tool").unwrap();
    let older = list.body.find("Older Tool").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_invalid_loan_is_rerendered_not_stored() {
    let (app, cookie) = member_app().await;

    let response = app
        .post_form(
            "/tools/new",
            Some(&cookie),
            &[
                ("team_number", "   "),
                ("tool_name", "Torque Wrench"),
                ("description", "keep me"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
    assert!(response.body.contains("Torque Wrench"));
    assert!(response.body.contains("keep me"));
    assert!(app.loans().await.is_empty());
}

#[tokio::test]
async fn test_team_number_length_limit() {
    let (app, cookie) = member_app().await;

    let response = app
        .post_form(
            "/tools/new",
            Some(&cookie),
            &[("team_number", "12345678901"), ("tool_name", "Hammer")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("at most 10 characters"));
    assert!(app.loans().await.is_empty());
}

#[tokio::test]
async fn test_edit_changes_fields_only() {
    let (app, cookie) = member_app().await;
    let loan = app.record_loan(&cookie, "1234", "Socket Wrench", "").await;
    app.post_form(
        &format!("/tools/{}/return", loan.id),
        Some(&cookie),
        &[("returned", "on")],
    )
    .await;
    let returned = app.loan(loan.id).await;

    let form = app
        .get(&format!("/tools/{}/edit", loan.id), Some(&cookie))
        .await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("Socket Wrench"));

    let response = app
        .post_form(
            &format!("/tools/{}/edit", loan.id),
            Some(&cookie),
            &[
                ("team_number", "4321"),
                ("tool_name", "Socket Wrench Set"),
                ("description", "metric"),
            ],
        )
        .await;
    assert!(response.redirects_to("/tools?success=updated"));

    let edited = app.loan(loan.id).await;
    assert_eq!(edited.team_number, "4321");
    assert_eq!(edited.tool_name, "Socket Wrench Set");
    assert_eq!(edited.description, "metric");
    assert_eq!(edited.date_loaned, returned.date_loaned);
    assert_eq!(edited.status, returned.status);
    assert_stamp_matches_flag(&[edited]);
}

#[tokio::test]
async fn test_missing_loan_is_not_found() {
    let (app, cookie) = member_app().await;

    let edit = app.get("/tools/999/edit", Some(&cookie)).await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let toggle = app
        .post_form("/tools/999/return", Some(&cookie), &[("returned", "on")])
        .await;
    assert_eq!(toggle.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_markup_in_fields_is_escaped() {
    let (app, cookie) = member_app().await;
    app.record_loan(&cookie, "1234", "<script>alert(1)</script>", "")
        .await;

    let list = app.get("/tools", Some(&cookie)).await;
    assert!(!list.body.contains("<script>alert(1)</script>"));
}
