//! The dashboard reducer.
//!
//! Every state transition is an [`Event`] folded into [`DashboardState`] by
//! [`update`]. Side effects are never performed here; when a transition needs
//! the network, `update` returns an [`Effect`] for the caller to run. Network
//! results come back later as events of their own.

use tracing::{debug, info, warn};

use userdash_types::ui::FormFocus;
use userdash_types::{Draft, FormField, NewUser, User};

use crate::state::{DashboardError, DashboardState, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Mount or retry: load status and users.
    LoadRequested,
    /// Joined outcome of both load requests.
    LoadFinished(Result<Snapshot, DashboardError>),
    /// Replace one draft field.
    EditField { field: FormField, value: String },
    FocusNext,
    FocusPrev,
    /// Move the user list by this many cards; negative scrolls up.
    ScrollUsers(isize),
    /// The view reports how many user cards fit on screen.
    UsersViewport(usize),
    SubmitRequested,
    CreateFinished(Result<User, DashboardError>),
}

/// Work requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load,
    Create(NewUser),
}

pub fn update(state: &mut DashboardState, event: Event) -> Option<Effect> {
    match event {
        Event::LoadRequested => {
            if state.loading {
                debug!("Load already in flight; coalescing request");
                return None;
            }
            state.loading = true;
            Some(Effect::Load)
        }
        Event::LoadFinished(Ok(Snapshot { status, users })) => {
            info!(users = users.len(), version = %status.version, "Dashboard data loaded");
            state.loading = false;
            state.api_status = Some(status);
            state.users = users;
            state.users_scroll = state.users_scroll.min(state.max_users_scroll());
            state.error = None;
            None
        }
        Event::LoadFinished(Err(err)) => {
            state.loading = false;
            state.error = Some(err);
            None
        }
        Event::EditField { field, value } => {
            if let Err(err) = state.draft.set(field, value) {
                warn!(%err, "Rejected draft edit");
                return None;
            }
            if state.validation.as_ref().is_some_and(|v| v.field() == field) {
                state.validation = None;
            }
            None
        }
        Event::FocusNext => {
            state.focus = state.focus.next();
            None
        }
        Event::FocusPrev => {
            state.focus = state.focus.prev();
            None
        }
        Event::ScrollUsers(delta) => {
            state.users_scroll = state
                .users_scroll
                .saturating_add_signed(delta)
                .min(state.max_users_scroll());
            None
        }
        Event::UsersViewport(cards) => {
            state.users_page = cards;
            state.users_scroll = state.users_scroll.min(state.max_users_scroll());
            None
        }
        Event::SubmitRequested => {
            if state.submitting {
                debug!("Create already in flight; ignoring submit");
                return None;
            }
            match state.draft.validate() {
                Ok(new_user) => {
                    state.validation = None;
                    state.submitting = true;
                    Some(Effect::Create(new_user))
                }
                Err(err) => {
                    debug!(%err, "Draft failed validation");
                    state.focus = FormFocus::from(err.field());
                    state.validation = Some(err);
                    None
                }
            }
        }
        Event::CreateFinished(Ok(user)) => {
            info!(id = %user.id, "User created");
            state.submitting = false;
            state.users.push(user);
            // Bring the new card into view.
            state.users_scroll = state.max_users_scroll();
            state.draft = Draft::default();
            state.focus = FormFocus::Name;
            None
        }
        Event::CreateFinished(Err(err)) => {
            state.submitting = false;
            state.error = Some(err);
            None
        }
    }
}
