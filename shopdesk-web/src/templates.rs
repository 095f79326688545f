//! Server-rendered pages
//!
//! The admin pages are shells; their data is loaded by the browser from the
//! commerce backend once the gateway has let the navigation through.

use crate::pages::{AdminPage, ADMIN_PAGES};
use askama::Template;
use axum::http::StatusCode;

/// Login form
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub action: String,
    pub username: String,
    pub error: Option<String>,
}

/// Shell of an admin page
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    pub path: String,
    pub username: Option<String>,
    pub logout_path: String,
    pub nav: Vec<NavLink>,
}

/// Forbidden and not-found pages
#[derive(Template)]
#[template(path = "status.html")]
pub struct StatusTemplate {
    pub title: String,
    pub status_code: u16,
    pub message: String,
    pub home_path: String,
}

/// Navigation entry
pub struct NavLink {
    pub path: String,
    pub title: String,
    pub active: bool,
}

impl LoginTemplate {
    pub fn new(action: &str, username: &str, error: Option<&str>) -> Self {
        Self {
            title: "Shopdesk - Sign in".to_string(),
            action: action.to_string(),
            username: username.to_string(),
            error: error.map(str::to_string),
        }
    }
}

impl PageTemplate {
    pub fn new(page: &AdminPage, username: Option<&str>, logout_path: &str) -> Self {
        Self {
            title: format!("Shopdesk - {}", page.title),
            path: page.path.to_string(),
            username: username.map(str::to_string),
            logout_path: logout_path.to_string(),
            nav: ADMIN_PAGES
                .iter()
                .map(|p| NavLink {
                    path: p.path.to_string(),
                    title: p.title.to_string(),
                    active: p.path == page.path,
                })
                .collect(),
        }
    }
}

impl StatusTemplate {
    pub fn new(status: StatusCode, message: &str, home_path: &str) -> Self {
        Self {
            title: format!(
                "Shopdesk - {}",
                status.canonical_reason().unwrap_or("Error")
            ),
            status_code: status.as_u16(),
            message: message.to_string(),
            home_path: home_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::DASHBOARD;

    #[test]
    fn test_login_template_escapes_username() {
        let html = LoginTemplate::new("/login", "<script>", Some("Invalid"))
            .render()
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Invalid"));
        assert!(html.contains(r#"action="/login""#));
    }

    #[test]
    fn test_page_template_marks_active_link() {
        let template = PageTemplate::new(&DASHBOARD, Some("alice"), "/logout");
        assert_eq!(template.nav.len(), ADMIN_PAGES.len());
        assert_eq!(template.nav.iter().filter(|l| l.active).count(), 1);

        let html = template.render().unwrap();
        assert!(html.contains("alice"));
        assert!(html.contains("/catalog/products"));
    }

    #[test]
    fn test_status_template() {
        let html = StatusTemplate::new(StatusCode::FORBIDDEN, "No access", "/")
            .render()
            .unwrap();
        assert!(html.contains("403"));
        assert!(html.contains("No access"));
    }
}
