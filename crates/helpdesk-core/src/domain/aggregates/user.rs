//! User entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::value_objects::{Email, UserId};

/// An account that acts on tickets.
///
/// Only canonical fields are stored; display values such as
/// [`User::full_name`] are derived on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: Email,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            active: true,
            created_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", "") => self.email.to_string(),
            (first, "") => first.to_string(),
            ("", last) => last.to_string(),
            (first, last) => format!("{} {}", first, last),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Account role. The derived ordering is the privilege order:
/// `User < SupportAgent < Admin`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    SupportAgent,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::SupportAgent, Role::Admin];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::SupportAgent => "Support Agent",
            Self::Admin => "Administrator",
        }
    }

    /// Support agents and administrators.
    pub fn is_staff(&self) -> bool {
        *self >= Role::SupportAgent
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "user" => Ok(Self::User),
            "support_agent" | "agent" | "support" => Ok(Self::SupportAgent),
            "admin" | "administrator" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

/// Lower-cases and maps `-`/space separators to `_` so that
/// `IN_PROGRESS`, `in-progress` and `In Progress` parse alike.
pub(crate) fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
