//! Dashboard state machine and request orchestration for userdash.
//!
//! # Architecture
//!
//! ```text
//!   keys ──► App::dispatch(Event) ──► update(&mut state, event) ──► Option<Effect>
//!                 ▲                                                      │
//!                 │                                              tokio::spawn
//!                 │                                                      ▼
//!   App::process_completions ◄── mpsc ◄── CompletionGuard ◄── tasks::{load, create}
//! ```
//!
//! The UI task owns [`App`] and is the only writer of [`DashboardState`].
//! Background requests never touch state; they report one [`Event`] each,
//! which the UI task folds in on its next frame. The two load requests are
//! joined inside a single task, so status and users land in one step.
//!
//! # Lifecycle
//!
//! [`App::mount`] starts the initial load. [`App::unmount`] (and dropping the
//! `App`) aborts in-flight requests; anything they report afterwards is
//! ignored.

mod config;
mod state;
mod tasks;
mod update;

pub use config::{
    AppConfig, BACKEND_URL_ENV, BackendConfig, ConfigError, DashConfig, config_path,
    expand_env_vars,
};
pub use state::{DashboardError, DashboardState, Snapshot};
pub use update::{Effect, Event, update};

pub use userdash_client::{BackendClient, ClientError};
pub use userdash_types::ui::{FormFocus, UiOptions};
pub use userdash_types::{
    ApiStatus, Draft, DraftError, FormField, Role, User, UserId, sanitize_single_line,
    sanitize_terminal_text,
};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tasks::{Completion, CompletionGuard};

pub struct App {
    state: DashboardState,
    client: BackendClient,
    ui_options: UiOptions,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    tasks: Vec<JoinHandle<()>>,
    /// Bumped on unmount; completions from older epochs are discarded.
    epoch: u64,
    mounted: bool,
    tick: usize,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(client: BackendClient, ui_options: UiOptions) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            state: DashboardState::new(),
            client,
            ui_options,
            completion_tx,
            completion_rx,
            tasks: Vec::new(),
            epoch: 0,
            mounted: false,
            tick: 0,
            should_quit: false,
        }
    }

    /// Build an app from (optional) config: backend URL, timeout and UI options.
    pub fn from_config(config: Option<&DashConfig>) -> Result<Self, ClientError> {
        let default_config = DashConfig::default();
        let config = config.unwrap_or(&default_config);
        let base_url = config.backend_url();
        let client = BackendClient::new(&base_url, config.request_timeout())?;
        tracing::info!(backend = %client.base_url(), "Backend configured");
        Ok(Self::new(client, config.ui_options()))
    }

    /// First display: start the initial load. Later calls are no-ops until
    /// the next [`App::unmount`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.dispatch(Event::LoadRequested);
    }

    /// Tear down: abort in-flight requests and ignore whatever they report.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.epoch = self.epoch.wrapping_add(1);
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
        self.state.loading = false;
        self.state.submitting = false;
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Fold an event into state and run whatever effect it asks for.
    pub fn dispatch(&mut self, event: Event) {
        if let Some(effect) = update(&mut self.state, event) {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        self.tasks.retain(|handle| !handle.is_finished());

        let client = self.client.clone();
        let tx = self.completion_tx.clone();
        let handle = match effect {
            Effect::Load => {
                let guard = CompletionGuard::new(
                    tx,
                    self.epoch,
                    Event::LoadFinished(Err(DashboardError::FetchFailed)),
                );
                tokio::spawn(tasks::load(client, guard))
            }
            Effect::Create(new_user) => {
                let guard = CompletionGuard::new(
                    tx,
                    self.epoch,
                    Event::CreateFinished(Err(DashboardError::CreateFailed)),
                );
                tokio::spawn(tasks::create(client, new_user, guard))
            }
        };
        self.tasks.push(handle);
    }

    /// Apply every completion that has arrived, without waiting.
    pub fn process_completions(&mut self) {
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply_completion(completion);
        }
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns `false` if it was discarded as stale.
    pub async fn next_completion(&mut self) -> bool {
        // The app holds a sender, so the channel never closes while we wait.
        match self.completion_rx.recv().await {
            Some(completion) => self.apply_completion(completion),
            None => false,
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> bool {
        if !self.mounted || completion.epoch != self.epoch {
            tracing::debug!(
                epoch = completion.epoch,
                current = self.epoch,
                "Discarding completion from a torn-down dashboard"
            );
            return false;
        }
        self.dispatch(completion.event);
        true
    }

    /// Number of background requests still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|h| !h.is_finished()).count()
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Manual reload (the error banner's retry action).
    pub fn retry(&mut self) {
        self.dispatch(Event::LoadRequested);
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.dispatch(Event::EditField {
            field,
            value: value.into(),
        });
    }

    /// Type a character into the focused text field. Control characters
    /// (escapes, tabs, newlines) are dropped.
    pub fn insert_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        let Some(field) = self.text_field_in_focus() else {
            return;
        };
        let mut value = self.state.draft.value(field).to_string();
        value.push(c);
        self.set_field(field, value);
    }

    /// Delete the last character of the focused text field.
    pub fn delete_char(&mut self) {
        let Some(field) = self.text_field_in_focus() else {
            return;
        };
        let mut value = self.state.draft.value(field).to_string();
        if value.pop().is_some() {
            self.set_field(field, value);
        }
    }

    /// Flip the role selector between its two values.
    pub fn toggle_role(&mut self) {
        let next = self.state.draft.role.toggled();
        self.set_field(FormField::Role, next.as_str());
    }

    pub fn submit(&mut self) {
        self.dispatch(Event::SubmitRequested);
    }

    /// Scroll the user list by `delta` cards; negative scrolls up.
    pub fn scroll_users(&mut self, delta: isize) {
        self.dispatch(Event::ScrollUsers(delta));
    }

    /// Scroll the user list by one screenful.
    pub fn page_users(&mut self, down: bool) {
        let page = isize::try_from(self.state.users_page.max(1)).unwrap_or(isize::MAX);
        self.scroll_users(if down { page } else { -page });
    }

    /// Record how many user cards the last frame had room for.
    pub fn update_users_viewport(&mut self, cards: usize) {
        if cards != self.state.users_page {
            self.dispatch(Event::UsersViewport(cards));
        }
    }

    pub fn focus_next(&mut self) {
        self.dispatch(Event::FocusNext);
    }

    pub fn focus_prev(&mut self) {
        self.dispatch(Event::FocusPrev);
    }

    fn text_field_in_focus(&self) -> Option<FormField> {
        self.state
            .focus
            .field()
            .filter(|f| matches!(f, FormField::Name | FormField::Email))
    }

    // ------------------------------------------------------------------
    // View accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn backend_url(&self) -> &str {
        self.client.base_url().as_str()
    }

    /// Advance the animation clock (spinner).
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }
}
