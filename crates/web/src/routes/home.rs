//! Home page.

use askama::Template;
use askama_web::WebTemplate;

use super::NavView;
use crate::filters;
use crate::middleware::RequireAuth;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
}

/// Landing page after sign-in.
pub async fn index(RequireAuth(account): RequireAuth) -> HomeTemplate {
    HomeTemplate {
        nav: NavView::from(&account),
    }
}
