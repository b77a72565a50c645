//! Database models

use serde::{Deserialize, Serialize};

/// One alumni contact record, keyed by roll number
///
/// The roll number is immutable once created; re-submitting the same
/// roll updates the row in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlumniRecord {
    pub roll: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub dept: Option<String>,
    pub designation: Option<String>,
    pub year: Option<i64>,
    pub address: Option<String>,
    pub company: Option<String>,
}

/// Canonical department entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub dept_name: String,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse a role value; only "user" and "admin" are accepted
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Staff account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Stored salted digest; NULL for Google-created accounts
    pub password: Option<String>,
    pub name: String,
    pub role: String,
    pub google_id: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<i64>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_accepts_only_known_values() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse("Admin"), None);
    }
}
