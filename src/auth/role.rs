//! Role sum type used by identities and route policies.
//!
//! The backend sends roles as display strings (`"Super Admin"`). Parsing is
//! lenient about case and `_`/`-` separators; names this client does not know
//! are kept verbatim in `Role::Other` so they round-trip but never satisfy a
//! policy, which only names the known variants.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    CompanyAdmin,
    Admin,
    Manager,
    Staff,
    Other(String),
}

impl Role {
    /// Backend display name for this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::CompanyAdmin => "Company Admin",
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Staff => "Staff",
            Self::Other(name) => name,
        }
    }

    /// True for variants this client recognizes.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "super admin" | "superadmin" => Self::SuperAdmin,
            "company admin" => Self::CompanyAdmin,
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "staff" => Self::Staff,
            _ => Self::Other(raw.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
