//! Terminal implementations of the navigation and notification seams.
//!
//! A command-line run cannot change views, so the navigator only remembers
//! the last target and `main` prints a hint naming the command that leads
//! there.

use client_balance_api::{Notice, NoticeKind, Notifier};
use client_balance_platform_access::{Navigator, Route};
use parking_lot::Mutex;

/// Records the route a run was sent to.
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    last: Mutex<Option<Route>>,
}

impl ConsoleNavigator {
    /// The most recent navigation target, if any.
    pub fn last_route(&self) -> Option<Route> {
        *self.last.lock()
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "navigate");
        *self.last.lock() = Some(route);
    }
}

/// Command that shows what `route` shows.
#[must_use]
pub fn hint(route: Route) -> &'static str {
    match route {
        Route::Login => "sign in with `client-balance login`",
        Route::Register => "create a user with `client-balance register`",
        Route::Dashboard => "see `client-balance whoami`",
        Route::Accounts => "see your accounts with `client-balance accounts list`",
        Route::AdminUsers => "manage users with `client-balance users list`",
    }
}

/// Prints notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let label = match notice.kind {
            NoticeKind::SessionExpired => "session",
            NoticeKind::AccessDenied => "denied",
            NoticeKind::RateLimited => "rate limited",
            NoticeKind::Error => "error",
        };
        eprintln!("[{label}] {}", notice.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_remembers_last_route() {
        let navigator = ConsoleNavigator::default();
        assert_eq!(navigator.last_route(), None);

        navigator.navigate(Route::Accounts);
        navigator.navigate(Route::Login);

        assert_eq!(navigator.last_route(), Some(Route::Login));
    }

    #[test]
    fn every_route_has_a_hint() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::Accounts,
            Route::AdminUsers,
        ] {
            assert!(hint(route).contains("client-balance"));
        }
    }
}
