//! Integration tests for Pit Tracker.
//!
//! The tests drive the real router in-process: in-memory repositories, an
//! in-memory session store, and requests sent with `tower::ServiceExt::oneshot`.
//! No database or running server is needed.
//!
//! ```bash
//! cargo test -p pit-tracker-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Login, logout, session handling
//! - `loans` - Tool loan lifecycle and counts
//! - `users` - Admin-only account management

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use pit_tracker_core::{AccountId, LoanId};
use pit_tracker_web::build_router;
use pit_tracker_web::config::TrackerConfig;
use pit_tracker_web::db::{AccountRepository, InMemoryStore, LoanRepository};
use pit_tracker_web::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use pit_tracker_web::models::{Account, LoanRecord};
use pit_tracker_web::state::AppState;

/// Seeded admin credentials.
pub const ADMIN_EMAIL: &str = "lead@team1234.org";
pub const ADMIN_USERNAME: &str = "lead";
pub const ADMIN_PASSWORD: &str = "pit-crew-2025";

/// Password used for accounts the tests create.
pub const MEMBER_PASSWORD: &str = "wrench-time-42";

/// A fresh application with one seeded admin.
pub struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// The `name=value` pair of a session cookie set by this response.
    ///
    /// `None` when no cookie was set or the cookie is being removed.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        let pair = self.set_cookie.as_deref()?.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| pair.to_string())
    }

    /// Whether this is a redirect to `target`.
    #[must_use]
    pub fn redirects_to(&self, target: &str) -> bool {
        self.status == StatusCode::SEE_OTHER && self.location.as_deref() == Some(target)
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let config = TrackerConfig::local();
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::from_parts(config, store.clone(), store.clone(), None);

        state
            .directory()
            .ensure_admin_seed(ADMIN_EMAIL, ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .expect("failed to seed admin");

        Self {
            router: build_router(state, session_layer),
            store,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let request = with_cookie(Request::builder().method(Method::GET).uri(path), cookie)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = with_cookie(Request::builder().method(Method::POST).uri(path), cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let status = response.status();
        let location = header_value(header::LOCATION);
        let set_cookie = header_value(header::SET_COOKIE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Sign in and return the session cookie.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/auth/login",
                None,
                &[("email", email), ("password", password)],
            )
            .await;
        assert!(
            response.redirects_to("/"),
            "login as {email} failed: {response:?}"
        );
        response
            .session_cookie()
            .expect("login should set a session cookie")
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Create an account through the admin form.
    pub async fn create_account(
        &self,
        admin_cookie: &str,
        username: &str,
        email: &str,
        is_admin: bool,
    ) -> Account {
        let mut fields = vec![
            ("username", username),
            ("email", email),
            ("password", MEMBER_PASSWORD),
            ("password_confirm", MEMBER_PASSWORD),
        ];
        if is_admin {
            fields.push(("is_admin", "on"));
        }

        let response = self.post_form("/users/new", Some(admin_cookie), &fields).await;
        assert_eq!(
            response.status,
            StatusCode::SEE_OTHER,
            "account creation failed: {response:?}"
        );
        self.account(username)
            .await
            .expect("created account should exist")
    }

    /// Record a loan through the form and return the stored record.
    pub async fn record_loan(
        &self,
        cookie: &str,
        team_number: &str,
        tool_name: &str,
        description: &str,
    ) -> LoanRecord {
        let response = self
            .post_form(
                "/tools/new",
                Some(cookie),
                &[
                    ("team_number", team_number),
                    ("tool_name", tool_name),
                    ("description", description),
                ],
            )
            .await;
        assert!(
            response.redirects_to("/tools?success=created"),
            "loan creation failed: {response:?}"
        );
        self.loans()
            .await
            .into_iter()
            .next()
            .expect("recorded loan should exist")
    }

    pub async fn account(&self, username: &str) -> Option<Account> {
        AccountRepository::get_by_username(self.store.as_ref(), username)
            .await
            .expect("in-memory lookup failed")
    }

    pub async fn account_by_id(&self, id: AccountId) -> Option<Account> {
        AccountRepository::get_by_id(self.store.as_ref(), id)
            .await
            .expect("in-memory lookup failed")
    }

    pub async fn accounts(&self) -> Vec<Account> {
        AccountRepository::list_all(self.store.as_ref())
            .await
            .expect("in-memory listing failed")
    }

    /// Stored loans, newest first.
    pub async fn loans(&self) -> Vec<LoanRecord> {
        LoanRepository::list_all(self.store.as_ref())
            .await
            .expect("in-memory listing failed")
    }

    pub async fn loan(&self, id: LoanId) -> LoanRecord {
        LoanRepository::get_by_id(self.store.as_ref(), id)
            .await
            .expect("in-memory lookup failed")
            .expect("loan should exist")
    }
}

fn with_cookie(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
) -> axum::http::request::Builder {
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}
