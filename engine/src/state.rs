//! Dashboard state.
//!
//! Everything the view renders lives in [`DashboardState`]. It is owned by the
//! UI task and changed only through [`crate::update`].

use thiserror::Error;

use userdash_types::ui::FormFocus;
use userdash_types::{ApiStatus, Draft, DraftError, User};

/// User-facing failure kinds. Transport details are logged, not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// The status or the users request failed.
    #[error("Failed to fetch data from backend")]
    FetchFailed,
    #[error("Failed to create user")]
    CreateFailed,
}

impl DashboardError {
    /// Whether the banner offers a retry action. Only fetches are retried from
    /// the banner; a failed create is retried by submitting the kept draft.
    #[must_use]
    pub const fn offers_retry(self) -> bool {
        matches!(self, DashboardError::FetchFailed)
    }
}

/// Result of a successful combined load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub status: ApiStatus,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    /// True only while the combined status/users fetch is in flight.
    pub loading: bool,
    pub error: Option<DashboardError>,
    pub api_status: Option<ApiStatus>,
    /// Insertion order: load order, then locally created users appended.
    pub users: Vec<User>,
    pub draft: Draft,
    pub focus: FormFocus,
    /// True while a create request is in flight.
    pub submitting: bool,
    /// Local validation failure from the last submit attempt.
    pub validation: Option<DraftError>,
    /// Index of the first user card on screen.
    pub users_scroll: usize,
    /// User cards that fit on screen, as of the last frame. 0 before the first.
    pub users_page: usize,
}

impl DashboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest useful `users_scroll`: the last page of cards.
    #[must_use]
    pub fn max_users_scroll(&self) -> usize {
        self.users.len().saturating_sub(self.users_page.max(1))
    }
}
