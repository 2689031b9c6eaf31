// TUI application state
//
// `App` owns the store for the lifetime of the terminal session and is the
// only thing that calls store operations. Key and mouse events arrive as
// `Action`s and mouse events; collaborator results arrive as `AppEvent`s on
// an mpsc channel fed by spawned tasks. Rendering reads snapshots only.

use super::components::{
    sidebar, FormField, RegisterForm, SettingsInfo, SettingsPanel, SettingsRow, Toast, ToastKind,
};
use super::input::{route_key, Action, InputMode};
use super::layout::{columns_to_units, ShellLayout};
use crate::collab::{
    submit_registration, CollaboratorError, ComposeService, HttpComposeService,
    HttpRegistrationService, RegistrationOutcome, RegistrationService,
};
use crate::config::Config;
use crate::deferred::Deferred;
use crate::drag::DragResizeController;
use crate::hydration::{HydrationGate, LifecycleSignal};
use crate::logging::LogBuffer;
use crate::model::session::DEFAULT_SESSION_TITLE;
use crate::model::{Message, SessionId};
use crate::store::Store;
use crate::supervisor::SubtreeBoundary;
use crate::theme::{ColorScheme, HostDocument, Palette, ThemeSynchronizer};
use crate::util::first_line_excerpt;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Longest automatic session title, in characters
const AUTO_TITLE_CHARS: usize = 40;

/// Sidebar width step for the settings pane arrows
const WIDTH_STEP: f64 = 10.0;

/// Results reported back by collaborator tasks
#[derive(Debug)]
pub enum AppEvent {
    /// Next fragment of a reply that is still streaming in
    ReplyDelta { session: SessionId, text: String },
    /// The reply finished, with its complete text
    Reply {
        session: SessionId,
        result: Result<String, CollaboratorError>,
    },
    VerifyCodeSent(Result<(), CollaboratorError>),
    Registered(Result<RegistrationOutcome, CollaboratorError>),
}

/// External collaborators; either may be absent
#[derive(Clone, Default)]
pub struct Services {
    pub compose: Option<Arc<dyn ComposeService>>,
    pub registration: Option<Arc<dyn RegistrationService>>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let compose: Arc<dyn ComposeService> = Arc::new(HttpComposeService::new(
            &config.api_url,
            config.api_model.clone(),
            config.api_key.clone(),
        ));
        let registration = config
            .registration_url
            .as_deref()
            .map(|url| Arc::new(HttpRegistrationService::new(url)) as Arc<dyn RegistrationService>);
        Self {
            compose: Some(compose),
            registration,
        }
    }
}

/// One boundary per presentational subtree
#[derive(Debug)]
pub struct Boundaries {
    pub sidebar: SubtreeBoundary,
    pub chat: SubtreeBoundary,
    pub settings: SubtreeBoundary,
    pub status: SubtreeBoundary,
}

impl Default for Boundaries {
    fn default() -> Self {
        Self {
            sidebar: SubtreeBoundary::new("sidebar"),
            chat: SubtreeBoundary::new("chat"),
            settings: SubtreeBoundary::new("settings"),
            status: SubtreeBoundary::new("status bar"),
        }
    }
}

impl Boundaries {
    pub fn reset_all(&mut self) {
        self.sidebar.reset();
        self.chat.reset();
        self.settings.reset();
        self.status.reset();
    }

    pub fn any_faulted(&self) -> bool {
        self.sidebar.is_faulted()
            || self.chat.is_faulted()
            || self.settings.is_faulted()
            || self.status.is_faulted()
    }
}

/// Main application state for the TUI
pub struct App {
    pub store: Store,
    gate: HydrationGate,
    pub drag: DragResizeController,
    theme_sync: ThemeSynchronizer,
    pub document: HostDocument,
    pub palette: Palette,
    pub boundaries: Boundaries,

    pub toast: Option<Toast>,
    pub composer: String,
    pub settings: SettingsPanel,
    pub register_form: Option<RegisterForm>,
    pub settings_info: Deferred<SettingsInfo>,
    pub log_buffer: LogBuffer,

    /// Sessions with a reply in flight
    pub pending_replies: HashSet<SessionId>,

    /// Layout of the last drawn frame, for mouse hit-testing
    pub layout: Option<ShellLayout>,
    /// Scroll offset of the session list in the last drawn frame
    pub sidebar_offset: usize,

    pub should_quit: bool,

    services: Services,
    events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        store: Store,
        preference: ColorScheme,
        log_buffer: LogBuffer,
        services: Services,
        settings_info: Deferred<SettingsInfo>,
        events_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let document = HostDocument::new(preference);
        let palette = Palette::resolve(&document, store.config());
        let mut app = Self {
            store,
            gate: HydrationGate::new(),
            drag: DragResizeController::new(),
            theme_sync: ThemeSynchronizer::new(),
            document,
            palette,
            boundaries: Boundaries::default(),
            toast: None,
            composer: String::new(),
            settings: SettingsPanel::new(),
            register_form: None,
            settings_info,
            log_buffer,
            pending_replies: HashSet::new(),
            layout: None,
            sidebar_offset: 0,
            should_quit: false,
            services,
            events_tx,
        };
        app.sync_presentation();
        app
    }

    /// Surface that receives typed keys right now
    pub fn input_mode(&self) -> InputMode {
        if self.register_form.is_some() {
            InputMode::RegisterForm
        } else if self.store.settings_open() {
            InputMode::Settings
        } else {
            InputMode::Composer
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Host lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Re-apply the theme to the document and resolve the palette
    pub fn sync_presentation(&mut self) {
        let config = self.store.config().clone();
        self.theme_sync.sync(config.theme, &mut self.document);
        self.palette = Palette::resolve(&self.document, &config);
    }

    /// Called after every successfully drawn frame
    pub fn on_frame_drawn(&mut self) {
        self.gate.observe(LifecycleSignal::Mounted, &mut self.store);
    }

    pub fn on_resize(&mut self) {
        self.gate.observe(LifecycleSignal::Resized, &mut self.store);
    }

    /// Periodic housekeeping: deferred modules and toast expiry
    pub fn tick(&mut self) {
        self.settings_info.poll();
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::error(message));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        let submit_key = self.store.config().submit_key;
        if let Some(action) = route_key(key, self.input_mode(), submit_key) {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NewSession => {
                self.store.create_session();
                // A new chat is shown straight away
                self.store.set_settings_open(false);
                self.store.set_sidebar_collapsed(true);
            }
            Action::DeleteActiveSession => {
                let id = self.store.active_session().id;
                self.pending_replies.remove(&id);
                self.store.remove_active_session();
            }
            Action::SelectPrev => self.select_relative(-1),
            Action::SelectNext => self.select_relative(1),
            Action::MoveSessionUp => self.move_active(-1),
            Action::MoveSessionDown => self.move_active(1),
            Action::ToggleSidebar => {
                let collapsed = self.store.sidebar_collapsed();
                self.store.set_sidebar_collapsed(!collapsed);
            }
            Action::ToggleSettings => {
                if self.store.settings_open() {
                    self.close_settings();
                } else {
                    self.open_settings();
                }
            }
            Action::CycleTheme => {
                self.store.update_config(|c| c.theme = c.theme.next());
                let theme = self.store.config().theme;
                self.notify(format!("Theme: {}", theme.as_str()));
            }
            Action::ClearConversation => {
                let id = self.store.active_session().id;
                // A reply still in flight would land in the emptied history
                self.pending_replies.remove(&id);
                if let Err(e) = self.store.clear_messages(id) {
                    tracing::debug!("Clear skipped: {}", e);
                }
            }
            Action::ResetFaults => {
                if self.boundaries.any_faulted() {
                    self.boundaries.reset_all();
                    self.notify("Retrying failed panels");
                }
            }
            Action::CloseOverlay => {
                if self.register_form.take().is_none() && self.store.settings_open() {
                    self.close_settings();
                }
            }

            Action::Submit => self.submit_composer(),
            Action::Newline => self.type_into_composer('\n'),
            Action::Insert(c) => self.type_into_composer(c),
            Action::Backspace => {
                self.composer.pop();
            }

            Action::SettingsUp => self.settings.select_prev(),
            Action::SettingsDown => self.settings.select_next(),
            Action::SettingsActivate => self.activate_setting(0),
            Action::SettingsAdjust(step) => self.activate_setting(step),

            Action::FormNext => self.with_form(RegisterForm::next_field),
            Action::FormPrev => self.with_form(RegisterForm::prev_field),
            Action::FormInsert(c) => self.with_form(|form| form.insert(c)),
            Action::FormBackspace => self.with_form(RegisterForm::backspace),
            Action::FormSubmit => self.submit_registration(),
            Action::FormSendCode => self.send_verify_code(),
        }
    }

    /// Settings take over the main pane; the sidebar steps aside
    fn open_settings(&mut self) {
        self.store.set_settings_open(true);
        self.store.set_sidebar_collapsed(true);
    }

    fn close_settings(&mut self) {
        self.store.set_settings_open(false);
        self.store.set_sidebar_collapsed(false);
    }

    /// Browse the session list; the chosen chat replaces the settings pane
    fn select_relative(&mut self, delta: i64) {
        let target = self.store.active_index() as i64 + delta;
        // Stop at the ends rather than wrapping
        match self.store.set_active_signed(target) {
            Ok(()) => self.store.set_settings_open(false),
            Err(e) => tracing::debug!("Selection unchanged: {}", e),
        }
    }

    /// Pick a session from the list with the pointer
    fn pick_session(&mut self, index: usize) {
        if let Err(e) = self.store.set_active(index) {
            tracing::debug!("Pick ignored: {}", e);
            return;
        }
        self.store.set_settings_open(false);
        // On a narrow terminal the list gives way to the chosen chat
        if self.layout.is_some_and(|layout| layout.is_mobile()) {
            self.store.set_sidebar_collapsed(true);
        }
    }

    /// Reorder the active session; it stays active
    fn move_active(&mut self, delta: i64) {
        let from = self.store.active_index();
        let Some(to) = from.checked_add_signed(delta as isize) else {
            return;
        };
        if let Err(e) = self.store.move_session(from, to) {
            tracing::debug!("Move skipped: {}", e);
        }
    }

    /// Typing on a mobile-width terminal reveals the chat pane
    fn type_into_composer(&mut self, c: char) {
        let chat_hidden = self
            .layout
            .is_some_and(|layout| layout.is_mobile() && layout.main.is_none());
        if chat_hidden {
            self.store.set_sidebar_collapsed(true);
        }
        self.composer.push(c);
    }

    fn with_form(&mut self, edit: impl FnOnce(&mut RegisterForm)) {
        if let Some(form) = self.register_form.as_mut() {
            edit(form);
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        self.handle_mouse_at(event, Instant::now());
    }

    /// Mouse handling with an injected clock
    pub fn handle_mouse_at(&mut self, event: MouseEvent, now: Instant) {
        let x = columns_to_units(event.column);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let on_handle = self
                    .layout
                    .is_some_and(|layout| layout.on_drag_handle(event.column, event.row));
                if on_handle {
                    self.drag.begin(&self.store, x);
                } else if let Some(index) = self.session_at(event) {
                    self.pick_session(index);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag.on_move(&mut self.store, x, now);
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag.end(&self.store),
            MouseEventKind::ScrollUp if self.over_sidebar(event) => self.select_relative(-1),
            MouseEventKind::ScrollDown if self.over_sidebar(event) => self.select_relative(1),
            _ => {}
        }
    }

    fn session_at(&self, event: MouseEvent) -> Option<usize> {
        let area = self.layout.and_then(|layout| layout.sidebar)?;
        if !self.over_sidebar(event) {
            return None;
        }
        sidebar::index_at_row(
            area,
            event.row,
            self.sidebar_offset,
            self.store.sessions().len(),
        )
    }

    fn over_sidebar(&self, event: MouseEvent) -> bool {
        self.layout
            .and_then(|layout| layout.sidebar)
            .is_some_and(|area| {
                event.column >= area.x
                    && event.column < area.right()
                    && event.row >= area.y
                    && event.row < area.bottom()
            })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings pane
    // ─────────────────────────────────────────────────────────────────────

    /// Activate (step 0) or adjust (step ±1) the selected settings row
    fn activate_setting(&mut self, step: i8) {
        match self.settings.selected_row() {
            SettingsRow::Theme => {
                // Three themes: one step back is two steps forward
                let turns = if step < 0 { 2 } else { 1 };
                self.store.update_config(|c| {
                    for _ in 0..turns {
                        c.theme = c.theme.next();
                    }
                });
            }
            SettingsRow::SubmitKey => {
                let turns = if step < 0 { 3 } else { 1 };
                self.store.update_config(|c| {
                    for _ in 0..turns {
                        c.submit_key = c.submit_key.next();
                    }
                });
            }
            SettingsRow::TightBorder => {
                self.store.update_config(|c| c.tight_border = !c.tight_border);
            }
            SettingsRow::SidebarWidth => {
                if step != 0 {
                    let delta = f64::from(step) * WIDTH_STEP;
                    self.store.update_config(|c| c.sidebar_width += delta);
                }
            }
            SettingsRow::ResetSettings if step == 0 => {
                self.store.reset_config();
                self.notify("Settings restored to defaults");
            }
            SettingsRow::ClearConversations if step == 0 => {
                self.pending_replies.clear();
                self.store.clear_all_sessions();
                self.notify("All conversations cleared");
            }
            SettingsRow::Register if step == 0 => self.open_register_form(),
            SettingsRow::ResetSettings
            | SettingsRow::ClearConversations
            | SettingsRow::Register => {}
        }
    }

    fn open_register_form(&mut self) {
        if self.services.registration.is_none() {
            self.notify_error("Registration is not configured");
            return;
        }
        self.register_form = Some(RegisterForm::new());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Collaborators
    // ─────────────────────────────────────────────────────────────────────

    /// Append the composed message and request a reply
    pub fn submit_composer(&mut self) {
        let text = self.composer.trim().to_string();
        if text.is_empty() {
            return;
        }
        let session = self.store.active_session().id;
        if self.pending_replies.contains(&session) {
            self.notify("Still waiting for the previous reply");
            return;
        }
        let Some(service) = self.services.compose.clone() else {
            self.notify_error("No chat service configured");
            return;
        };

        if let Err(e) = self.store.append_message(session, Message::user(text.clone())) {
            tracing::warn!("Could not append message: {}", e);
            return;
        }
        self.composer.clear();

        if self.store.active_session().title == DEFAULT_SESSION_TITLE {
            let title = first_line_excerpt(&text, AUTO_TITLE_CHARS);
            if let Err(e) = self.store.rename_session(session, &title) {
                tracing::debug!("Auto-title skipped: {}", e);
            }
        }

        let history = self.store.active_session().messages.clone();
        self.pending_replies.insert(session);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let deltas = tx.clone();
            let on_delta = move |text: &str| {
                let _ = deltas.send(AppEvent::ReplyDelta {
                    session,
                    text: text.to_string(),
                });
            };
            let result = service.complete(&history, &on_delta).await;
            let _ = tx.send(AppEvent::Reply { session, result });
        });
    }

    fn send_verify_code(&mut self) {
        let Some(service) = self.services.registration.clone() else {
            return;
        };
        let Some(form) = self.register_form.as_mut() else {
            return;
        };
        if form.busy {
            return;
        }
        let email = form.value(FormField::Email).trim().to_string();
        if email.is_empty() {
            self.notify_error("Enter your email first");
            return;
        }
        form.busy = true;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.send_verify_code(&email).await;
            let _ = tx.send(AppEvent::VerifyCodeSent(result));
        });
    }

    fn submit_registration(&mut self) {
        let Some(service) = self.services.registration.clone() else {
            return;
        };
        let Some(form) = self.register_form.as_mut() else {
            return;
        };
        if form.busy {
            return;
        }
        let request = form.to_request();
        if let Err(e) = request.validate() {
            self.notify_error(e.to_string());
            return;
        }
        form.busy = true;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = submit_registration(service.as_ref(), &request).await;
            let _ = tx.send(AppEvent::Registered(result));
        });
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ReplyDelta { session, text } => self.apply_reply_delta(session, &text),
            AppEvent::Reply { session, result } => {
                // Closed or cleared while the reply was in flight
                if !self.pending_replies.remove(&session) {
                    tracing::debug!("Dropping reply for session {}", session);
                    return;
                }
                match result {
                    Ok(text) => self.finish_reply(session, Some(text)),
                    Err(e) => {
                        // Keep whatever arrived before the failure
                        self.finish_reply(session, None);
                        tracing::warn!("Reply failed: {}", e);
                        self.notify_error(format!("Reply failed: {}", e));
                    }
                }
            }
            AppEvent::VerifyCodeSent(result) => {
                self.with_form(|form| form.busy = false);
                match result {
                    Ok(()) => self.notify("Verification code sent"),
                    Err(e) => {
                        tracing::warn!("Verification code request failed: {}", e);
                        self.notify_error(format!("Could not send code: {}", e));
                    }
                }
            }
            AppEvent::Registered(result) => {
                self.with_form(|form| form.busy = false);
                match result {
                    Ok(outcome) if outcome.is_success() => {
                        self.register_form = None;
                        self.notify(outcome.notice());
                    }
                    Ok(outcome) => self.notify_error(outcome.notice()),
                    Err(CollaboratorError::Validation(e)) => self.notify_error(e.to_string()),
                    Err(e) => {
                        tracing::warn!("Registration failed: {}", e);
                        self.notify_error(RegistrationOutcome::GenericFailure.notice());
                    }
                }
            }
        }
    }

    fn streaming_position(&self, session: SessionId) -> Option<usize> {
        self.store
            .sessions()
            .iter()
            .find(|s| s.id == session)
            .and_then(|s| s.streaming_position())
    }

    /// The first fragment opens a streaming reply, later ones extend it
    fn apply_reply_delta(&mut self, session: SessionId, text: &str) {
        if !self.pending_replies.contains(&session) {
            return;
        }
        let result = match self.streaming_position(session) {
            Some(position) => self
                .store
                .update_message(session, position, |m| m.content.push_str(text)),
            None => self
                .store
                .append_message(session, Message::streaming_reply(text))
                .map(|_| ()),
        };
        if let Err(e) = result {
            tracing::debug!("Dropping reply fragment: {}", e);
        }
    }

    /// Settle the streaming reply; `text` replaces what has streamed so far
    fn finish_reply(&mut self, session: SessionId, text: Option<String>) {
        let result = match (self.streaming_position(session), text) {
            (Some(position), text) => self.store.update_message(session, position, |m| {
                if let Some(text) = text {
                    m.content = text;
                }
                m.streaming = false;
            }),
            // Nothing was streamed
            (None, Some(text)) => self
                .store
                .append_message(session, Message::assistant(text))
                .map(|_| ()),
            (None, None) => Ok(()),
        };
        if let Err(e) = result {
            tracing::debug!("Dropping reply: {}", e);
        }
    }

    /// Kind of the visible toast, if any
    #[cfg(test)]
    pub fn toast_kind(&self) -> Option<ToastKind> {
        self.toast.as_ref().map(|t| t.kind)
    }
}
