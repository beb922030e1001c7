use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Normalized set of emails that are granted the admin role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList(HashSet<String>);

impl AdminAllowList {
    /// Comma separated list; entries are trimmed and lower-cased, blanks dropped.
    pub fn parse(raw: &str) -> Self {
        AdminAllowList(
            raw.split(',')
                .map(normalize_email)
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn role_for_email(&self, email: &str) -> Role {
        let normalized = normalize_email(email);
        if !normalized.is_empty() && self.0.contains(&normalized) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
