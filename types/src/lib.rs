//! Core domain types for userdash.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the HTTP client
//! speaks these types on the wire, the engine folds them into dashboard state, and
//! the TUI renders them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod draft;
mod sanitize;
pub mod ui;

pub use draft::{Draft, DraftError, FormField};
pub use sanitize::{sanitize_single_line, sanitize_terminal_text};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Users
// ============================================================================

/// Server-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level of a user. The backend only knows these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?} (expected \"user\" or \"admin\")")]
pub struct RoleParseError(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// Parse a role from its wire name.
    ///
    /// Matching is ASCII case-insensitive and ignores surrounding whitespace;
    /// anything outside the two known values is rejected.
    pub fn parse(raw: &str) -> Result<Self, RoleParseError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(RoleParseError(raw.to_string())),
        }
    }

    /// Wire name, as sent to and received from the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Label shown in the role selector.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    /// The other role. Used by the selector to cycle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

/// A user record as stored by the backend.
///
/// Records are immutable on the client: they arrive from `GET /api/users` or as
/// the response to a create, and are never edited or removed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Request body for `POST /api/users`.
///
/// Only obtainable through [`Draft::validate`], so a `NewUser` always carries a
/// non-blank name and a well-formed email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    name: String,
    email: String,
    role: Role,
}

impl NewUser {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

// ============================================================================
// Backend status
// ============================================================================

/// Snapshot returned by `GET /api/status`. Replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub message: String,
    pub version: String,
    pub environment: String,
    /// Raw timestamp string as sent by the backend (normally RFC 3339).
    pub timestamp: String,
}
