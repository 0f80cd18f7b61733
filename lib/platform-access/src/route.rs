//! Routes and the guards that protect them.
//!
//! A guard looks at the session and either lets the caller through or names
//! the route to go to instead. Navigation itself happens through a
//! [`Navigator`], so the same guards serve the CLI and any other front end.

use crate::role::Role;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A place in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Accounts,
    AdminUsers,
}

impl Route {
    /// Returns the route's path.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Accounts => "/accounts",
            Self::AdminUsers => "/admin/users",
        }
    }

    /// Landing route for a signed-in user with `role`.
    #[must_use]
    pub fn default_for(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => Self::AdminUsers,
            Some(Role::Client) => Self::Accounts,
            Some(Role::Unknown) | None => Self::Dashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs route changes.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Access rule attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any signed-in user.
    Authenticated,
    /// Signed-in admins only.
    Admin,
    /// Signed-in clients only.
    Client,
    /// Only users who are not signed in (login and register views).
    Guest,
}

/// Result of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

impl GuardOutcome {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl Guard {
    /// Evaluates the guard against the session.
    #[must_use]
    pub fn check(&self, session: &Session) -> GuardOutcome {
        let authenticated = session.is_authenticated();
        let role = session.role();

        match self {
            Self::Authenticated if authenticated => GuardOutcome::Allow,
            Self::Authenticated => GuardOutcome::Redirect(Route::Login),
            Self::Admin | Self::Client if !authenticated => GuardOutcome::Redirect(Route::Login),
            Self::Admin if role == Some(Role::Admin) => GuardOutcome::Allow,
            Self::Client if role == Some(Role::Client) => GuardOutcome::Allow,
            Self::Admin | Self::Client => GuardOutcome::Redirect(Route::default_for(role)),
            Self::Guest if authenticated => GuardOutcome::Redirect(Route::default_for(role)),
            Self::Guest => GuardOutcome::Allow,
        }
    }

    /// Evaluates the guard and navigates on redirect. Returns true if allowed.
    pub fn enforce(&self, session: &Session, navigator: &dyn Navigator) -> bool {
        match self.check(session) {
            GuardOutcome::Allow => true,
            GuardOutcome::Redirect(route) => {
                tracing::debug!(guard = ?self, route = %route, "guard redirect");
                navigator.navigate(route);
                false
            }
        }
    }
}
