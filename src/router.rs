//! Route authorization guard.
//!
//! DESIGN
//! ======
//! Every route carries a static `Policy`. `guard` evaluates it top-down
//! against a session snapshot:
//!
//! 1. Public routes always render.
//! 2. While the session is still loading, protected routes show a
//!    placeholder instead of redirecting.
//! 3. Without a valid session, protected routes redirect to login.
//! 4. A non-empty role set requires at least one matching role, otherwise
//!    the navigation goes to the unauthorized view.
//!
//! The guard only reads the session; purging an expired credential is the
//! store's job.

use std::fmt;

use crate::auth::{Role, token};
use crate::session::Session;

const ANY_ROLE: &[Role] = &[];
const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];
const USER_ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::CompanyAdmin];
const SUPER_ADMIN_ROLES: &[Role] = &[Role::SuperAdmin];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Unauthorized,
    Dashboard,
    Orders,
    Shipments,
    CreateShipment,
    Settings,
    Profile,
    Admin,
    AdminUsers,
    AdminCreateUser,
    AdminDashboard,
    NotFound,
}

/// Who may render a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Public,
    /// Signed-in users holding any of these roles; empty means any signed-in user.
    Authenticated(&'static [Role]),
}

/// Outcome of a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Render(Route),
    /// Session still resolving; show a loading view and decide later.
    Placeholder,
    Redirect(Route),
}

impl Route {
    /// Resolve a path such as `/admin/users?tab=2`. Leading and trailing
    /// slashes are optional; unknown paths map to `NotFound`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim().trim_matches('/');
        match trimmed {
            "" => Self::Landing,
            "login" => Self::Login,
            "register" => Self::Register,
            "unauthorized" => Self::Unauthorized,
            "dashboard" => Self::Dashboard,
            "orders" => Self::Orders,
            "shipments" => Self::Shipments,
            "create-shipment" => Self::CreateShipment,
            "settings" => Self::Settings,
            "profile" => Self::Profile,
            "admin" => Self::Admin,
            "admin/users" => Self::AdminUsers,
            "admin/create-user" => Self::AdminCreateUser,
            "admin/dashboard" => Self::AdminDashboard,
            _ => Self::NotFound,
        }
    }

    /// Canonical path. `NotFound` has none of its own and reports `/404`.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Unauthorized => "/unauthorized",
            Self::Dashboard => "/dashboard",
            Self::Orders => "/orders",
            Self::Shipments => "/shipments",
            Self::CreateShipment => "/create-shipment",
            Self::Settings => "/settings",
            Self::Profile => "/profile",
            Self::Admin => "/admin",
            Self::AdminUsers => "/admin/users",
            Self::AdminCreateUser => "/admin/create-user",
            Self::AdminDashboard => "/admin/dashboard",
            Self::NotFound => "/404",
        }
    }

    #[must_use]
    pub fn policy(self) -> Policy {
        match self {
            Self::Landing | Self::Login | Self::Register | Self::Unauthorized => Policy::Public,
            Self::Admin => Policy::Authenticated(ADMIN_ROLES),
            Self::AdminUsers | Self::AdminCreateUser => Policy::Authenticated(USER_ADMIN_ROLES),
            Self::AdminDashboard => Policy::Authenticated(SUPER_ADMIN_ROLES),
            Self::Dashboard
            | Self::Orders
            | Self::Shipments
            | Self::CreateShipment
            | Self::Settings
            | Self::Profile
            | Self::NotFound => Policy::Authenticated(ANY_ROLE),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decide whether `session` may render `route` right now.
#[must_use]
pub fn guard(session: &Session, route: Route) -> Access {
    guard_at(session, route, token::now_secs())
}

/// [`guard`] against an explicit clock.
#[must_use]
pub fn guard_at(session: &Session, route: Route, now_secs: u64) -> Access {
    let Policy::Authenticated(required) = route.policy() else {
        return Access::Render(route);
    };
    if session.loading() {
        return Access::Placeholder;
    }
    if !session.is_authenticated_at(now_secs) {
        tracing::debug!(route = %route, "not signed in; redirecting to login");
        return Access::Redirect(Route::Login);
    }
    if required.is_empty() {
        return Access::Render(route);
    }
    match &session.identity {
        Some(identity) if identity.has_any_role(required) => Access::Render(route),
        _ => {
            tracing::debug!(route = %route, "missing required role; redirecting to unauthorized");
            Access::Redirect(Route::Unauthorized)
        }
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
