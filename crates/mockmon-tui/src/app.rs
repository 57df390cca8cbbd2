//! Application state and key handling for the TUI

use crate::api::{ApiClient, Backend};
use crate::components::{edit_line, EditorAction, LineEdit};
use crate::config::Config;
use crate::console::{Console, Decision};
use crate::editor::Submitted;
use crate::error::{ConsoleError, ValidationError};
use crate::event::{ctrl_key, Event};
use crate::poller::Poller;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// How long a status bar message stays visible
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Mocks,
    Editor,
    Logs,
}

impl View {
    pub const ALL: [View; 3] = [View::Mocks, View::Editor, View::Logs];

    pub fn title(self) -> &'static str {
        match self {
            View::Mocks => "Mocks",
            View::Editor => "Editor",
            View::Logs => "Request Logs",
        }
    }
}

/// Overlay (modal) state
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Help,
    Confirm {
        message: String,
        action: PendingAction,
    },
    Error {
        message: String,
    },
    Success {
        message: String,
    },
    ProxyInput {
        value: String,
    },
}

/// Actions that need confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    DeleteMock { id: String },
    ClearMocks,
    Shutdown,
}

/// Status message level
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Focusable fields of the mock editor, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Method,
    Path,
    Status,
    Delay,
    ContentType,
    Headers,
    Body,
}

impl EditorField {
    const ORDER: [EditorField; 7] = [
        EditorField::Method,
        EditorField::Path,
        EditorField::Status,
        EditorField::Delay,
        EditorField::ContentType,
        EditorField::Headers,
        EditorField::Body,
    ];

    fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
        Self::ORDER[next]
    }

    /// Field a validation error belongs to
    pub fn for_error(err: &ValidationError) -> Self {
        match err {
            ValidationError::InvalidJsonBody => EditorField::Body,
            ValidationError::StatusNotNumeric(_) | ValidationError::StatusOutOfRange(_) => {
                EditorField::Status
            }
            ValidationError::InvalidDelay(_) => EditorField::Delay,
            ValidationError::EmptyPath => EditorField::Path,
        }
    }
}

/// Which half of a header row has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderColumn {
    Name,
    Value,
}

/// Main application state
pub struct App<B: Backend = ApiClient> {
    // Navigation
    pub view: View,
    pub overlay: Overlay,

    // Data
    pub console: Console<B>,

    // UI State
    pub mock_list_state: ListState,
    /// Selected log row, tracked by entry id so it survives polls
    pub selected_log: Option<String>,
    pub status_message: Option<(String, StatusLevel, Instant)>,
    pub help_scroll: u16,
    pub help_max_scroll: u16,

    // Editor focus
    pub editor_field: EditorField,
    pub header_cursor: usize,
    pub header_column: HeaderColumn,
    pub field_error: Option<(EditorField, String)>,

    // Connection
    pub api_url: String,
    pub theme: Theme,
    pub export_dir: PathBuf,

    // Runtime
    pub should_quit: bool,
    pub is_loading: bool,
    pub auto_refresh: bool,
    pub last_poll: Option<Instant>,
    poller: Poller,
    log_fetch: Option<JoinHandle<()>>,
    events: Option<UnboundedSender<Event>>,
}

impl App<ApiClient> {
    /// Create the app against the HTTP backend named in `config`
    pub async fn new(config: &Config) -> Result<Self, ConsoleError> {
        let client = ApiClient::new(&config.api_url, config.timeout)?;
        let mut app = Self::with_backend(client, config);
        app.connect().await;
        Ok(app)
    }
}

impl<B: Backend> App<B> {
    /// Create the app around any backend without contacting it
    pub fn with_backend(backend: B, config: &Config) -> Self {
        Self {
            view: View::Mocks,
            overlay: Overlay::None,

            console: Console::new(backend),

            mock_list_state: ListState::default(),
            selected_log: None,
            status_message: None,
            help_scroll: 0,
            help_max_scroll: 0,

            editor_field: EditorField::Method,
            header_cursor: 0,
            header_column: HeaderColumn::Name,
            field_error: None,

            api_url: config.api_url.clone(),
            theme: Theme::default(),
            export_dir: config.export_dir.clone(),

            should_quit: false,
            is_loading: false,
            auto_refresh: config.auto_refresh,
            last_poll: None,
            poller: Poller::new(config.refresh_interval),
            log_fetch: None,
            events: None,
        }
    }

    /// Initial load: server info, then the first log fetch
    pub async fn connect(&mut self) {
        self.is_loading = true;
        match self.console.load_info().await {
            Ok(()) => {
                self.clamp_mock_selection();
                self.poll().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %self.api_url, "mock server unreachable");
                self.set_status(format!("Cannot reach {}: {}", self.api_url, e), StatusLevel::Error);
            }
        }
        self.is_loading = false;
    }

    /// Hand the app the event channel and start polling if enabled
    pub fn attach(&mut self, tx: UnboundedSender<Event>) {
        if self.auto_refresh {
            self.poller.start(tx.clone());
        }
        self.events = Some(tx);
    }

    /// Stop background work; called once on exit
    pub fn teardown(&mut self) {
        self.poller.stop();
        if let Some(fetch) = self.log_fetch.take() {
            fetch.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn is_connected(&self) -> bool {
        self.console.is_connected()
    }

    /// Scheduled log poll; failures only reach the diagnostic log.
    ///
    /// Once the event channel is attached the fetch runs on its own task and
    /// reports back as [`Event::Logs`], so keys keep flowing while the
    /// backend is slow. A tick that lands while a fetch is outstanding is
    /// dropped rather than queued behind it.
    pub async fn poll(&mut self) {
        let Some(tx) = self.events.clone() else {
            if self.console.poll_logs().await.is_some() {
                self.logs_updated();
            }
            return;
        };
        if self.is_fetching_logs() {
            tracing::debug!("previous log fetch still running, skipping poll");
            return;
        }

        let backend = self.console.backend_handle();
        self.log_fetch = Some(tokio::spawn(async move {
            let fetched = backend.list_logs().await;
            let _ = tx.send(Event::Logs(fetched));
        }));
    }

    /// Whether a background log fetch has not finished yet
    pub fn is_fetching_logs(&self) -> bool {
        self.log_fetch.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn logs_updated(&mut self) {
        self.last_poll = Some(Instant::now());
        self.sync_log_selection();
    }

    /// Manual refresh of everything, reporting failures
    pub async fn refresh(&mut self) {
        self.is_loading = true;
        let result = match self.console.load_info().await {
            Ok(()) => self.console.refresh_logs().await.map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.clamp_mock_selection();
                self.logs_updated();
                self.set_status("Refreshed".to_string(), StatusLevel::Info);
            }
            Err(e) => self.show_error(e),
        }
        self.is_loading = false;
    }

    /// Turn automatic log refresh on or off
    pub fn toggle_auto_refresh(&mut self) {
        self.auto_refresh = !self.auto_refresh;
        if self.auto_refresh {
            if let Some(tx) = self.events.clone() {
                self.poller.start(tx);
            }
            self.set_status("Auto-refresh on".to_string(), StatusLevel::Info);
        } else {
            self.poller.stop();
            self.set_status("Auto-refresh off".to_string(), StatusLevel::Info);
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String, level: StatusLevel) {
        self.status_message = Some((message, level, Instant::now()));
    }

    /// Clear status if expired
    pub fn clear_expired_status(&mut self) {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed() > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Blocking notification for a failed action
    pub fn show_error(&mut self, err: ConsoleError) {
        tracing::debug!(error = %err, "action failed");
        if let ConsoleError::Validation(v) = &err {
            self.field_error = Some((EditorField::for_error(v), v.to_string()));
        }
        self.overlay = Overlay::Error {
            message: err.to_string(),
        };
    }

    // ----- Mocks view -----

    pub fn selected_mock_id(&self) -> Option<String> {
        self.mock_list_state
            .selected()
            .and_then(|i| self.console.mocks().get(i))
            .map(|m| m.id.clone())
    }

    fn clamp_mock_selection(&mut self) {
        let len = self.console.mocks().len();
        match self.mock_list_state.selected() {
            _ if len == 0 => self.mock_list_state.select(None),
            None => self.mock_list_state.select(Some(0)),
            Some(i) if i >= len => self.mock_list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    fn move_mock_selection(&mut self, forward: bool) {
        let len = self.console.mocks().len();
        if len == 0 {
            return;
        }
        let next = match self.mock_list_state.selected() {
            Some(i) if forward => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.mock_list_state.select(Some(next));
    }

    pub fn start_create(&mut self) {
        self.console.editor.reset_to_create();
        self.reset_editor_focus();
        self.view = View::Editor;
    }

    pub fn start_edit(&mut self) {
        let Some(id) = self.selected_mock_id() else {
            return;
        };
        if self.console.edit_mock(&id) {
            self.reset_editor_focus();
            self.view = View::Editor;
        }
    }

    fn reset_editor_focus(&mut self) {
        self.editor_field = EditorField::Method;
        self.header_cursor = 0;
        self.header_column = HeaderColumn::Name;
        self.field_error = None;
    }

    pub fn confirm_delete_mock(&mut self) {
        let Some(id) = self.selected_mock_id() else {
            return;
        };
        let label = self
            .console
            .mock(&id)
            .map(|m| m.label())
            .unwrap_or_else(|| id.clone());
        self.overlay = Overlay::Confirm {
            message: format!("Delete mock {}?", label),
            action: PendingAction::DeleteMock { id },
        };
    }

    pub fn confirm_clear_mocks(&mut self) {
        if self.console.mocks().is_empty() {
            self.set_status("No mocks to clear".to_string(), StatusLevel::Info);
            return;
        }
        self.overlay = Overlay::Confirm {
            message: format!("Delete all {} mocks?", self.console.mocks().len()),
            action: PendingAction::ClearMocks,
        };
    }

    pub fn confirm_shutdown(&mut self) {
        self.overlay = Overlay::Confirm {
            message: "Shut down the mock server?\nIt stops shortly after acknowledging."
                .to_string(),
            action: PendingAction::Shutdown,
        };
    }

    /// Close the confirmation overlay and carry out the user's answer
    pub async fn resolve_pending_action(&mut self, decision: Decision) {
        let Overlay::Confirm { action, .. } = std::mem::replace(&mut self.overlay, Overlay::None)
        else {
            return;
        };

        match action {
            PendingAction::DeleteMock { id } => match self.console.delete_mock(&id, decision).await {
                Ok(true) => {
                    self.clamp_mock_selection();
                    self.set_status("Mock deleted".to_string(), StatusLevel::Success);
                }
                Ok(false) => {}
                Err(e) => self.show_error(e),
            },
            PendingAction::ClearMocks => match self.console.clear_mocks(decision).await {
                Ok(true) => {
                    self.clamp_mock_selection();
                    self.set_status("All mocks deleted".to_string(), StatusLevel::Success);
                }
                Ok(false) => {}
                Err(e) => self.show_error(e),
            },
            PendingAction::Shutdown => match self.console.shutdown(decision).await {
                Ok(Some(ack)) => {
                    self.poller.stop();
                    self.auto_refresh = false;
                    let message = if ack.message.is_empty() {
                        "Shutdown requested".to_string()
                    } else {
                        ack.message
                    };
                    self.overlay = Overlay::Success { message };
                }
                Ok(None) => {}
                Err(e) => self.show_error(e),
            },
        }
    }

    // ----- Editor view -----

    pub async fn submit_editor(&mut self) {
        match self.console.submit_mock().await {
            Ok(submitted) => {
                let verb = match &submitted {
                    Submitted::Created(_) => "Created",
                    Submitted::Updated(_) => "Updated",
                };
                let label = submitted.mock().label();
                self.reset_editor_focus();
                self.clamp_mock_selection();
                self.view = View::Mocks;
                self.set_status(format!("{} mock {}", verb, label), StatusLevel::Success);
            }
            Err(e) => self.show_error(e),
        }
    }

    fn toggle_json(&mut self) {
        match self.console.editor.toggle_json_mode() {
            Ok(()) => self.clear_field_error(EditorField::Body),
            Err(e) => self.show_error(e.into()),
        }
    }

    fn format_body(&mut self) {
        match self.console.editor.format_body() {
            Ok(()) => self.clear_field_error(EditorField::Body),
            Err(e) => self.show_error(e.into()),
        }
    }

    fn clear_field_error(&mut self, field: EditorField) {
        if matches!(&self.field_error, Some((f, _)) if *f == field) {
            self.field_error = None;
        }
    }

    /// Focused header row index, clamped to the current rows
    pub fn header_row(&self) -> usize {
        self.header_cursor
            .min(self.console.editor.headers.len().saturating_sub(1))
    }

    fn add_header_row(&mut self) {
        self.console.editor.headers.add_blank();
        self.editor_field = EditorField::Headers;
        self.header_cursor = self.console.editor.headers.len() - 1;
        self.header_column = HeaderColumn::Name;
    }

    fn remove_header_row(&mut self) {
        let index = self.header_row();
        if let Some(id) = self.console.editor.headers.rows().get(index).map(|r| r.id()) {
            self.console.editor.headers.remove_row(id);
        }
        self.header_cursor = self.header_row();
    }

    /// Move focus forward/backward, walking header cells one at a time
    fn step_focus(&mut self, forward: bool) {
        if self.editor_field == EditorField::Headers {
            let last = self.console.editor.headers.len().saturating_sub(1);
            let row = self.header_row();
            match (forward, self.header_column) {
                (true, HeaderColumn::Name) => {
                    self.header_column = HeaderColumn::Value;
                    return;
                }
                (true, HeaderColumn::Value) if row < last => {
                    self.header_cursor = row + 1;
                    self.header_column = HeaderColumn::Name;
                    return;
                }
                (false, HeaderColumn::Value) => {
                    self.header_column = HeaderColumn::Name;
                    return;
                }
                (false, HeaderColumn::Name) if row > 0 => {
                    self.header_cursor = row - 1;
                    self.header_column = HeaderColumn::Value;
                    return;
                }
                _ => {}
            }
        }

        self.editor_field = self.editor_field.step(forward);
        if self.editor_field == EditorField::Headers {
            if forward {
                self.header_cursor = 0;
                self.header_column = HeaderColumn::Name;
            } else {
                self.header_cursor = self.console.editor.headers.len().saturating_sub(1);
                self.header_column = HeaderColumn::Value;
            }
        }
    }

    /// Apply a single-line edit to the focused text field
    fn edit_focused_line(&mut self, key: KeyEvent) -> LineEdit {
        let editor = &mut self.console.editor;
        let result = match self.editor_field {
            EditorField::Path => edit_line(&mut editor.path, key),
            EditorField::Status => edit_line(&mut editor.status, key),
            EditorField::Delay => edit_line(&mut editor.delay, key),
            EditorField::ContentType => {
                let mut value = editor.body_mode.content_type().to_string();
                let result = edit_line(&mut value, key);
                if result == LineEdit::Changed {
                    editor.set_content_type(value);
                }
                result
            }
            EditorField::Headers => {
                let index = self.header_cursor.min(editor.headers.len().saturating_sub(1));
                let column = self.header_column;
                let Some(id) = editor.headers.rows().get(index).map(|r| r.id()) else {
                    return LineEdit::Ignored;
                };
                match editor.headers.row_mut(id) {
                    Some(row) => match column {
                        HeaderColumn::Name => edit_line(&mut row.name, key),
                        HeaderColumn::Value => edit_line(&mut row.value, key),
                    },
                    None => LineEdit::Ignored,
                }
            }
            EditorField::Method | EditorField::Body => LineEdit::Ignored,
        };
        if result == LineEdit::Changed {
            self.clear_field_error(self.editor_field);
        }
        result
    }

    async fn handle_editor_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => return self.submit_editor().await,
                KeyCode::Char('j') => return self.toggle_json(),
                KeyCode::Char('f') => return self.format_body(),
                KeyCode::Char('n') => {
                    self.console.editor.reset_to_create();
                    self.reset_editor_focus();
                    return;
                }
                KeyCode::Char('a') => return self.add_header_row(),
                KeyCode::Char('d') if self.editor_field == EditorField::Headers => {
                    return self.remove_header_row();
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                self.view = View::Mocks;
                return;
            }
            KeyCode::Tab => return self.step_focus(true),
            KeyCode::BackTab => return self.step_focus(false),
            _ => {}
        }

        match self.editor_field {
            EditorField::Method => match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.console.editor.cycle_method(false),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    self.console.editor.cycle_method(true)
                }
                _ => {}
            },
            EditorField::Body => {
                let (changed, action) = self.console.editor.body.handle_key(key);
                if let Some(EditorAction::PasteRequest) = action {
                    if let Some(text) = paste_from_clipboard() {
                        self.console.editor.body.paste(&text);
                        self.body_changed();
                    }
                } else if changed {
                    self.body_changed();
                }
            }
            EditorField::Headers => match key.code {
                KeyCode::Up => self.header_cursor = self.header_row().saturating_sub(1),
                KeyCode::Down => {
                    let last = self.console.editor.headers.len().saturating_sub(1);
                    self.header_cursor = (self.header_row() + 1).min(last);
                }
                KeyCode::Enter => self.add_header_row(),
                _ => {
                    self.edit_focused_line(key);
                }
            },
            _ => {
                if key.code == KeyCode::Enter {
                    self.step_focus(true);
                } else {
                    self.edit_focused_line(key);
                }
            }
        }
    }

    fn body_changed(&mut self) {
        self.console.editor.body_edited();
        if self.console.editor.body_mode.is_body_valid() {
            self.clear_field_error(EditorField::Body);
        }
    }

    /// Bracketed paste goes to whichever editor field has focus
    pub fn handle_paste(&mut self, text: &str) {
        if let Overlay::ProxyInput { value } = &mut self.overlay {
            value.push_str(text.lines().next().unwrap_or_default().trim());
            return;
        }
        if self.overlay != Overlay::None || self.view != View::Editor {
            return;
        }

        if self.editor_field == EditorField::Body {
            self.console.editor.body.paste(text);
            self.body_changed();
            return;
        }
        let line = text.lines().next().unwrap_or_default();
        for c in line.chars() {
            self.edit_focused_line(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    // ----- Logs view -----

    /// Index of the selected log row in display order
    pub fn selected_log_index(&self) -> Option<usize> {
        self.selected_log
            .as_deref()
            .and_then(|id| self.console.logs.position(id))
    }

    /// Keep the selection on the same entry; fall back to the first row
    fn sync_log_selection(&mut self) {
        if self.selected_log_index().is_none() {
            self.selected_log = self.console.logs.row_at(0).map(|r| r.entry.id.clone());
        }
    }

    fn move_log_selection(&mut self, forward: bool) {
        let len = self.console.logs.len();
        if len == 0 {
            return;
        }
        let next = match self.selected_log_index() {
            Some(i) if forward => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.selected_log = self.console.logs.row_at(next).map(|r| r.entry.id.clone());
    }

    fn toggle_selected_log(&mut self) {
        if let Some(id) = self.selected_log.clone() {
            self.console.logs.toggle(&id);
        }
    }

    pub fn export_logs(&mut self) {
        if self.console.logs.is_empty() {
            self.set_status("No request logs to export".to_string(), StatusLevel::Warning);
            return;
        }
        match self.console.export_logs(&self.export_dir, chrono::Utc::now()) {
            Ok(path) => self.set_status(
                format!("Exported logs to {}", path.display()),
                StatusLevel::Success,
            ),
            Err(e) => self.show_error(e),
        }
    }

    fn copy_selected_log(&mut self) {
        let Some(row) = self
            .selected_log
            .as_deref()
            .and_then(|id| self.console.logs.get(id))
        else {
            return;
        };
        match serde_json::to_string_pretty(&row.entry) {
            Ok(json) => self.copy_to_clipboard(&json),
            Err(e) => self.show_error(e.into()),
        }
    }

    /// Copy content to clipboard
    pub fn copy_to_clipboard(&mut self, content: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(content.to_string()) {
                    self.set_status(format!("Failed to copy: {}", e), StatusLevel::Error);
                } else {
                    self.set_status("Copied to clipboard".to_string(), StatusLevel::Success);
                }
            }
            Err(e) => {
                self.set_status(
                    format!("Clipboard not available: {}", e),
                    StatusLevel::Error,
                );
            }
        }
    }

    // ----- Proxy dialog -----

    /// Open the proxy dialog prefilled with the backend's current target
    pub async fn show_proxy_input(&mut self) {
        if let Err(e) = self.console.load_proxy_settings().await {
            tracing::warn!(error = %e, "failed to load proxy settings");
        }
        self.overlay = Overlay::ProxyInput {
            value: self.console.proxy().target_url.clone().unwrap_or_default(),
        };
    }

    async fn save_proxy(&mut self, value: String) {
        self.overlay = Overlay::None;
        match self.console.save_proxy_target(&value).await {
            Ok(settings) => {
                let message = match &settings.target_url {
                    Some(url) => format!("Proxying unmatched requests to {}", url),
                    None => "Proxy disabled".to_string(),
                };
                self.set_status(message, StatusLevel::Success);
            }
            Err(e) => self.show_error(e),
        }
    }

    // ----- Event dispatch -----

    /// Route one event from the event loop
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key_event(key).await,
            Event::Paste(text) => self.handle_paste(&text),
            Event::Tick => self.clear_expired_status(),
            Event::Poll => self.poll().await,
            Event::Logs(fetched) => {
                if self.console.apply_logs(fetched).is_some() {
                    self.logs_updated();
                }
            }
            Event::Resize(_, _) => {}
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) {
        // Handle overlays first
        match &mut self.overlay {
            Overlay::Help => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                        self.overlay = Overlay::None;
                        self.help_scroll = 0;
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.help_scroll = self.help_scroll.saturating_sub(1);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.help_scroll = (self.help_scroll + 1).min(self.help_max_scroll);
                    }
                    _ => {}
                }
                return;
            }
            Overlay::Confirm { .. } => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                        self.resolve_pending_action(Decision::Confirmed).await
                    }
                    KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                        self.resolve_pending_action(Decision::Declined).await
                    }
                    _ => {}
                }
                return;
            }
            Overlay::Error { .. } => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    self.overlay = Overlay::None;
                }
                return;
            }
            Overlay::Success { .. } => {
                self.overlay = Overlay::None;
                return;
            }
            Overlay::ProxyInput { value } => {
                match key.code {
                    KeyCode::Esc => self.overlay = Overlay::None,
                    KeyCode::Enter => {
                        let value = std::mem::take(value);
                        self.save_proxy(value).await;
                    }
                    _ => {
                        edit_line(value, key);
                    }
                }
                return;
            }
            Overlay::None => {}
        }

        if ctrl_key(&key, 'c') {
            self.should_quit = true;
            return;
        }

        // The editor owns every other key while it has focus
        if self.view == View::Editor {
            self.handle_editor_event(key).await;
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => {
                self.overlay = Overlay::Help;
                self.help_scroll = 0;
                self.help_max_scroll = 40;
            }
            KeyCode::Char('1') => self.view = View::Mocks,
            KeyCode::Char('2') => self.view = View::Editor,
            KeyCode::Char('3') => self.view = View::Logs,
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Mocks => View::Logs,
                    _ => View::Mocks,
                }
            }
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char('a') => self.toggle_auto_refresh(),
            KeyCode::Char('p') => self.show_proxy_input().await,
            KeyCode::Char('S') => self.confirm_shutdown(),
            _ => match self.view {
                View::Mocks => self.handle_mock_list_event(key),
                View::Logs => self.handle_logs_event(key),
                View::Editor => {}
            },
        }
    }

    fn handle_mock_list_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_mock_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_mock_selection(false),
            KeyCode::Enter | KeyCode::Char('e') => self.start_edit(),
            KeyCode::Char('n') => self.start_create(),
            KeyCode::Char('d') => self.confirm_delete_mock(),
            KeyCode::Char('D') => self.confirm_clear_mocks(),
            _ => {}
        }
    }

    fn handle_logs_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_log_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_log_selection(false),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected_log(),
            KeyCode::Char('x') => self.export_logs(),
            KeyCode::Char('y') => self.copy_selected_log(),
            _ => {}
        }
    }
}

/// Paste from clipboard, returning the text if successful
fn paste_from_clipboard() -> Option<String> {
    arboard::Clipboard::new()
        .ok()
        .and_then(|mut cb| cb.get_text().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProxySettings;
    use crate::testing::{log_entry, stored_mock, FakeBackend};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn type_text(app: &mut App<FakeBackend>, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).await;
        }
    }

    fn app_with(backend: FakeBackend) -> App<FakeBackend> {
        let config = Config {
            auto_refresh: false,
            ..Config::default()
        };
        App::with_backend(backend, &config)
    }

    #[tokio::test]
    async fn test_connect_loads_mocks_and_logs() {
        let backend = FakeBackend::with_mocks(vec![stored_mock("GET", "/a")]);
        backend.logs.lock().unwrap().push(log_entry("1", 200));
        let mut app = app_with(backend);

        app.connect().await;

        assert!(app.is_connected());
        assert_eq!(app.mock_list_state.selected(), Some(0));
        assert_eq!(app.selected_log.as_deref(), Some("1"));
        assert_eq!(app.console.backend().calls(), vec!["GET /info", "GET /logs"]);
    }

    #[tokio::test]
    async fn test_create_mock_through_keys() {
        let mut app = app_with(FakeBackend::default());
        app.handle_key_event(key(KeyCode::Char('n'))).await;
        assert_eq!(app.view, View::Editor);

        // Method -> Path
        app.handle_key_event(key(KeyCode::Tab)).await;
        type_text(&mut app, "/health").await;
        app.handle_key_event(ctrl('s')).await;

        assert_eq!(app.view, View::Mocks);
        assert_eq!(app.console.mocks().len(), 1);
        assert_eq!(app.console.mocks()[0].path, "/health");
        assert_eq!(app.console.backend().calls(), vec!["POST /mocks", "GET /mocks"]);
    }

    #[tokio::test]
    async fn test_validation_error_marks_field() {
        let mut app = app_with(FakeBackend::default());
        app.start_create();
        app.handle_key_event(ctrl('s')).await;

        assert!(matches!(app.overlay, Overlay::Error { .. }));
        assert_eq!(
            app.field_error.as_ref().map(|(f, _)| *f),
            Some(EditorField::Path)
        );
        assert!(app.console.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_header_rows_via_keys() {
        let mut app = app_with(FakeBackend::default());
        app.start_create();
        app.editor_field = EditorField::Headers;

        type_text(&mut app, "X-A").await;
        app.handle_key_event(key(KeyCode::Tab)).await;
        type_text(&mut app, "1").await;
        app.handle_key_event(ctrl('a')).await;
        assert_eq!(app.header_row(), 1);
        app.handle_key_event(ctrl('d')).await;
        app.handle_key_event(ctrl('d')).await;

        // Removing every row leaves one blank row behind
        assert_eq!(app.console.editor.headers.len(), 1);
        assert!(app.console.editor.headers.rows()[0].is_blank());
    }

    #[tokio::test]
    async fn test_delete_is_gated_by_confirmation() {
        let mut app = app_with(FakeBackend::with_mocks(vec![stored_mock("GET", "/a")]));
        app.connect().await;

        app.handle_key_event(key(KeyCode::Char('d'))).await;
        assert!(matches!(app.overlay, Overlay::Confirm { .. }));
        app.handle_key_event(key(KeyCode::Esc)).await;
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.console.mocks().len(), 1);

        app.handle_key_event(key(KeyCode::Char('d'))).await;
        app.handle_key_event(key(KeyCode::Char('y'))).await;
        assert!(app.console.mocks().is_empty());
        assert_eq!(app.mock_list_state.selected(), None);
        assert!(app
            .console
            .backend()
            .calls()
            .contains(&"DELETE GET::/a".to_string()));
    }

    #[tokio::test]
    async fn test_log_selection_and_disclosure_survive_poll() {
        let backend = FakeBackend::default();
        backend.logs.lock().unwrap().push(log_entry("1", 200));
        backend.logs.lock().unwrap().push(log_entry("2", 500));
        let mut app = app_with(backend);
        app.connect().await;
        app.view = View::Logs;

        app.handle_key_event(key(KeyCode::Down)).await;
        app.handle_key_event(key(KeyCode::Enter)).await;
        assert!(app.console.logs.is_open("2"));

        app.console
            .backend()
            .logs
            .lock()
            .unwrap()
            .insert(0, log_entry("3", 201));

        let (tx, mut rx) = mpsc::unbounded_channel();
        app.attach(tx);
        app.handle_event(Event::Poll).await;
        let fetched = rx.recv().await.unwrap();
        assert!(matches!(fetched, Event::Logs(Ok(_))));
        app.handle_event(fetched).await;

        assert_eq!(app.selected_log.as_deref(), Some("2"));
        assert_eq!(app.selected_log_index(), Some(2));
        assert!(app.console.logs.is_open("2"));
        assert!(!app.console.logs.is_open("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_handled_while_a_slow_poll_runs() {
        let backend = FakeBackend {
            logs_delay: Some(Duration::from_secs(10)),
            ..Default::default()
        };
        let config = Config {
            refresh_interval: Duration::from_secs(5),
            ..Config::default()
        };
        let mut app = App::with_backend(backend, &config);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let keys = tx.clone();
        app.attach(tx);
        assert!(app.is_polling());

        let start = tokio::time::Instant::now();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(62)).await;
            let _ = keys.send(Event::Key(key(KeyCode::Char('3'))));
        });

        // One event at a time, each handled to completion, as in the terminal loop
        while let Some(event) = rx.recv().await {
            let is_key = matches!(event, Event::Key(_));
            app.handle_event(event).await;
            if is_key {
                break;
            }
        }

        assert_eq!(app.view, View::Logs);
        assert!(start.elapsed() < Duration::from_secs(63));

        let queued_polls = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| matches!(e, Event::Poll))
            .count();
        assert_eq!(queued_polls, 0);

        // Ticks during an outstanding fetch are skipped, not stacked
        let fetches = app
            .console
            .backend()
            .calls()
            .iter()
            .filter(|c| c.as_str() == "GET /logs")
            .count();
        assert!(fetches <= 7, "{} log fetches", fetches);
        app.teardown();
    }

    #[tokio::test]
    async fn test_failed_background_fetch_keeps_rows() {
        let backend = FakeBackend::default();
        backend.logs.lock().unwrap().push(log_entry("1", 200));
        let mut app = app_with(backend);
        app.connect().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.attach(tx);

        *app.console.backend().fail_logs.lock().unwrap() = true;
        app.handle_event(Event::Poll).await;
        let fetched = rx.recv().await.unwrap();
        assert!(matches!(fetched, Event::Logs(Err(_))));
        app.handle_event(fetched).await;

        assert_eq!(app.console.logs.len(), 1);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[tokio::test]
    async fn test_shutdown_shows_ack() {
        let mut app = app_with(FakeBackend::default());
        app.handle_key_event(key(KeyCode::Char('S'))).await;
        app.handle_key_event(key(KeyCode::Enter)).await;

        assert_eq!(
            app.overlay,
            Overlay::Success {
                message: "Server shutting down".to_string()
            }
        );
        assert!(!app.auto_refresh);
    }

    #[tokio::test]
    async fn test_proxy_dialog_saves_target() {
        let mut app = app_with(FakeBackend::default());
        app.handle_key_event(key(KeyCode::Char('p'))).await;
        app.handle_paste("http://upstream:9000\nignored");
        app.handle_key_event(key(KeyCode::Enter)).await;

        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(
            app.console.proxy().target_url.as_deref(),
            Some("http://upstream:9000")
        );
    }

    #[tokio::test]
    async fn test_proxy_dialog_loads_current_target() {
        let backend = FakeBackend::default();
        *backend.proxy.lock().unwrap() = ProxySettings::from_input("http://recorded:8080");
        let mut app = app_with(backend);

        app.handle_key_event(key(KeyCode::Char('p'))).await;

        assert_eq!(
            app.overlay,
            Overlay::ProxyInput {
                value: "http://recorded:8080".to_string()
            }
        );
        assert_eq!(app.console.backend().calls(), vec!["GET /settings/proxy"]);
    }

    #[tokio::test]
    async fn test_toggle_json_with_invalid_body_alerts() {
        let mut app = app_with(FakeBackend::default());
        app.start_create();
        app.editor_field = EditorField::Body;
        type_text(&mut app, "{oops").await;
        app.handle_key_event(ctrl('j')).await;

        assert!(app.console.editor.body_mode.is_json());
        assert_eq!(
            app.overlay,
            Overlay::Error {
                message: crate::error::INVALID_JSON_BODY.to_string()
            }
        );
    }

    #[test]
    fn test_field_order_wraps() {
        assert_eq!(EditorField::Body.step(true), EditorField::Method);
        assert_eq!(EditorField::Method.step(false), EditorField::Body);
    }
}
