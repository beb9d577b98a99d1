//! Plain-text views for the command-line front end.
//!
//! Each function renders a complete view to a `String`; the binary decides
//! where it goes. Nothing here touches the session or the network.

use crate::auth::{Company, Identity};
use crate::net::types::{Order, RoleRecord, Shipment};
use crate::router::Route;
use crate::shipping::ShipmentResponse;

// =============================================================================
// SESSION VIEWS
// =============================================================================

#[must_use]
pub fn placeholder() -> String {
    "Checking your session...".to_owned()
}

#[must_use]
pub fn login_prompt(attempted: Route) -> String {
    format!("Sign in to view {attempted}.\nRun `shiptornado login --email <EMAIL>` to continue.")
}

#[must_use]
pub fn unauthorized() -> String {
    "Access Denied\nYou don't have permission to view this page.".to_owned()
}

#[must_use]
pub fn not_found(path: &str) -> String {
    format!("404: no page at {path}")
}

#[must_use]
pub fn session_ended() -> String {
    "Your session has ended. Run `shiptornado login --email <EMAIL>` to sign in again.".to_owned()
}

#[must_use]
pub fn signed_out() -> String {
    "Signed out.".to_owned()
}

/// Profile view: name, email, roles, and company when known.
#[must_use]
pub fn profile(identity: &Identity, company: Option<&Company>) -> String {
    let roles = if identity.roles.is_empty() {
        "-".to_owned()
    } else {
        identity.roles.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    };
    let mut out = format!("{}\n  email:   {}\n  roles:   {roles}", identity.display_name(), identity.email);
    if let Some(company) = company {
        out.push_str(&format!("\n  company: {}", company.name));
    }
    out
}

/// Signed-in page for routes that have no data of their own to fetch.
#[must_use]
pub fn page(route: Route, identity: &Identity, company: Option<&Company>) -> String {
    let name = identity.display_name();
    let (title, body) = match route {
        Route::Dashboard => (
            "Dashboard",
            format!(
                "Welcome back, {name}.\n  orders:    shiptornado orders\n  shipments: shiptornado shipments\n  \
                 quote:     shiptornado rates --request <FILE>"
            ),
        ),
        Route::Settings => (
            "Settings",
            format!("Account: {}\nSign out with `shiptornado logout`.", identity.email),
        ),
        Route::Admin => (
            "Administration",
            "  users: shiptornado users\n  roles: shiptornado roles".to_owned(),
        ),
        Route::AdminDashboard => (
            "Admin Dashboard",
            format!("{name} has full administrative access.\nOpen /admin for user and role management."),
        ),
        Route::CreateShipment => (
            "Create Shipment",
            "Quote a shipment with `shiptornado rates --request <FILE>`.".to_owned(),
        ),
        Route::Landing | Route::Login | Route::Register => {
            ("Ship Tornado", format!("Already signed in as {name}. Open /dashboard to continue."))
        }
        _ => return profile(identity, company),
    };
    format!("{title}\n{}\n{body}", "=".repeat(title.len()))
}

// =============================================================================
// LIST VIEWS
// =============================================================================

/// Orders table, filtered by `search` (id or customer) when given.
#[must_use]
pub fn orders(all: &[Order], search: Option<&str>) -> String {
    let shown: Vec<&Order> = all.iter().filter(|o| search.is_none_or(|term| o.matches(term))).collect();
    if shown.is_empty() {
        return "No orders found.".to_owned();
    }
    let rows = shown
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.customer.clone(),
                o.date.clone(),
                o.items.to_string(),
                o.status_label().to_owned(),
                o.value.clone(),
            ]
        })
        .collect::<Vec<_>>();
    let mut out = table(&["Order ID", "Customer", "Date", "Items", "Status", "Value"], &rows);
    out.push_str(&format!("\nShowing {} of {} orders", shown.len(), all.len()));
    out
}

/// Shipments table, filtered by `search` (id, tracking, or carrier) when given.
#[must_use]
pub fn shipments(all: &[Shipment], search: Option<&str>) -> String {
    let shown: Vec<&Shipment> = all.iter().filter(|s| search.is_none_or(|term| s.matches(term))).collect();
    if shown.is_empty() {
        return "No shipments found.".to_owned();
    }
    let rows = shown
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.tracking.clone(),
                format!("{} {}", s.carrier, s.service),
                format!("{} -> {}", s.origin, s.destination),
                s.date.clone(),
                s.status_label().to_owned(),
            ]
        })
        .collect::<Vec<_>>();
    let mut out = table(&["Shipment ID", "Tracking", "Carrier", "Route", "Date", "Status"], &rows);
    out.push_str(&format!("\nShowing {} of {} shipments", shown.len(), all.len()));
    out
}

#[must_use]
pub fn users(all: &[Identity]) -> String {
    if all.is_empty() {
        return "No users found.".to_owned();
    }
    let rows = all
        .iter()
        .map(|u| {
            let roles = u.roles.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            vec![u.display_name(), u.email.clone(), roles]
        })
        .collect::<Vec<_>>();
    table(&["Name", "Email", "Roles"], &rows)
}

#[must_use]
pub fn roles(all: &[RoleRecord]) -> String {
    if all.is_empty() {
        return "No roles found.".to_owned();
    }
    let rows = all.iter().map(|r| vec![r.id.to_string(), r.name.clone()]).collect::<Vec<_>>();
    table(&["ID", "Name"], &rows)
}

/// Rate quote, one row per smart rate.
#[must_use]
pub fn quote(response: &ShipmentResponse) -> String {
    if response.smartrates.is_empty() {
        return format!("Shipment {}: no rates available.", response.id);
    }
    let rows = response
        .smartrates
        .iter()
        .map(|r| {
            let days = r.rate.delivery_days;
            let transit = format!("{days} business day{}", if days == 1 { "" } else { "s" });
            vec![
                r.rate.id.clone(),
                format!("{} {}", r.rate.carrier, r.rate.service),
                transit,
                r.rate.delivery_date.clone().unwrap_or_else(|| "-".to_owned()),
                r.delivery_accuracy.map_or("--", |a| a.label()).to_owned(),
                if r.delivery_date_guaranteed { "Yes" } else { "No" }.to_owned(),
                format!("${}", r.rate.rate),
            ]
        })
        .collect::<Vec<_>>();
    let mut out = format!("Shipment {} ({})\n", response.id, response.status);
    out.push_str(&table(&["Rate", "Service", "Delivery", "Est. date", "Accuracy", "Guaranteed", "Price"], &rows));
    out
}

/// Inline error for a failed data load. The rest of the view is unaffected.
#[must_use]
pub fn load_error(what: &str, message: &str) -> String {
    format!("Failed to load {what}: {message}")
}

// =============================================================================
// TABLE LAYOUT
// =============================================================================

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
