use crate::dto::view_dto::{FormView, HomeView, NavLink, NotFoundView};
use crate::models::SessionState;

const TITLE: &str = "Campus Carpool";

pub struct HomeController;

impl HomeController {
    pub fn home(session: &SessionState) -> HomeView {
        let links = match session {
            SessionState::SignedIn(_) => vec![
                NavLink { label: "Find a ride", path: "/search" },
                NavLink { label: "Offer a ride", path: "/publish" },
                NavLink { label: "My requests", path: "/requests" },
            ],
            _ => vec![
                NavLink { label: "Log in", path: "/login" },
                NavLink { label: "Register", path: "/register" },
            ],
        };

        HomeView {
            title: TITLE,
            user: session.current_user().cloned(),
            links,
        }
    }

    pub fn login_form() -> FormView {
        FormView {
            form: "login",
            fields: vec!["email", "password"],
            alternate: NavLink { label: "Register", path: "/register" },
        }
    }

    pub fn register_form() -> FormView {
        FormView {
            form: "register",
            fields: vec!["email", "password"],
            alternate: NavLink { label: "Log in", path: "/login" },
        }
    }

    pub fn not_found(path: &str) -> NotFoundView {
        NotFoundView {
            title: "Page not found",
            path: path.to_string(),
            home: "/",
        }
    }
}
