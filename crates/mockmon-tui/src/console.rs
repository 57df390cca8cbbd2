//! Console operations independent of the terminal
//!
//! `Console` owns the mock list, the editor, the request log rows and the
//! proxy setting, and performs every backend round trip on their behalf.
//! Destructive operations take a [`Decision`] so the caller decides how the
//! user is asked; a declined decision performs no request at all.

use crate::api::{ApiError, Backend, LogEntry, Mock, ProxySettings, ShutdownAck};
use crate::editor::{MockEditor, Submitted};
use crate::error::ConsoleError;
use crate::export;
use crate::logs::{LogReconciler, ReconcileSummary};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The user's answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Declined,
}

impl Decision {
    pub fn is_confirmed(self) -> bool {
        self == Decision::Confirmed
    }
}

impl From<bool> for Decision {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Decision::Confirmed
        } else {
            Decision::Declined
        }
    }
}

pub struct Console<B> {
    backend: Arc<B>,
    mocks: Vec<Mock>,
    pub editor: MockEditor,
    pub logs: LogReconciler,
    proxy: ProxySettings,
    connected: bool,
}

impl<B: Backend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            mocks: Vec::new(),
            editor: MockEditor::new(),
            logs: LogReconciler::new(),
            proxy: ProxySettings::default(),
            connected: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared handle for fetches that run off the event loop
    pub fn backend_handle(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn mocks(&self) -> &[Mock] {
        &self.mocks
    }

    pub fn mock(&self, id: &str) -> Option<&Mock> {
        self.mocks.iter().find(|m| m.id == id)
    }

    pub fn proxy(&self) -> &ProxySettings {
        &self.proxy
    }

    /// Whether the last connectivity check reached the backend
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Fetch proxy settings and mocks in one round trip
    pub async fn load_info(&mut self) -> Result<(), ConsoleError> {
        match self.backend.server_info().await {
            Ok(info) => {
                self.connected = true;
                self.proxy = info.proxy;
                self.mocks = info.mocks;
                tracing::info!(mocks = self.mocks.len(), "connected to mock server");
                Ok(())
            }
            Err(e) => {
                self.connected = false;
                Err(e.into())
            }
        }
    }

    /// Replace the mock list with the backend's current one
    pub async fn refresh_mocks(&mut self) -> Result<&[Mock], ConsoleError> {
        self.mocks = self.backend.list_mocks().await?;
        Ok(&self.mocks)
    }

    /// Fetch logs and reconcile the rows; an explicit refresh reports errors
    pub async fn refresh_logs(&mut self) -> Result<ReconcileSummary, ConsoleError> {
        let entries = self.backend.list_logs().await?;
        Ok(self.logs.reconcile(entries))
    }

    /// Scheduled poll: failures are logged and the rows stay as they were
    pub async fn poll_logs(&mut self) -> Option<ReconcileSummary> {
        let fetched = self.backend.list_logs().await;
        self.apply_logs(fetched)
    }

    /// Reconcile the outcome of a scheduled fetch, wherever it ran
    pub fn apply_logs(
        &mut self,
        fetched: Result<Vec<LogEntry>, ApiError>,
    ) -> Option<ReconcileSummary> {
        match fetched {
            Ok(entries) => Some(self.logs.reconcile(entries)),
            Err(e) => {
                tracing::warn!(error = %e, "log poll failed");
                None
            }
        }
    }

    /// Load a mock into the editor
    pub fn edit_mock(&mut self, id: &str) -> bool {
        match self.mocks.iter().find(|m| m.id == id) {
            Some(mock) => {
                self.editor.load_for_edit(mock);
                true
            }
            None => false,
        }
    }

    /// Submit the editor, then re-fetch the list so it shows the change
    pub async fn submit_mock(&mut self) -> Result<Submitted, ConsoleError> {
        let submitted = self.editor.submit(self.backend.as_ref()).await?;
        if let Err(e) = self.refresh_mocks().await {
            tracing::warn!(error = %e, "failed to refresh mocks after save");
        }
        Ok(submitted)
    }

    /// Delete one mock. `Ok(false)` means the user declined.
    pub async fn delete_mock(&mut self, id: &str, decision: Decision) -> Result<bool, ConsoleError> {
        if !decision.is_confirmed() {
            return Ok(false);
        }
        self.backend.delete_mock(id).await?;
        tracing::info!(id, "deleted mock");
        if self.editor.identity() == Some(id) {
            self.editor.reset_to_create();
        }
        self.refresh_mocks().await?;
        Ok(true)
    }

    /// Delete every mock. `Ok(false)` means the user declined.
    pub async fn clear_mocks(&mut self, decision: Decision) -> Result<bool, ConsoleError> {
        if !decision.is_confirmed() {
            return Ok(false);
        }
        self.backend.clear_mocks().await?;
        tracing::info!("cleared all mocks");
        if self.editor.identity().is_some() {
            self.editor.reset_to_create();
        }
        self.refresh_mocks().await?;
        Ok(true)
    }

    /// Re-read the proxy target from the backend
    pub async fn load_proxy_settings(&mut self) -> Result<&ProxySettings, ConsoleError> {
        self.proxy = self.backend.proxy_settings().await?;
        Ok(&self.proxy)
    }

    /// Save the proxy target from user input; blank input disables proxying
    pub async fn save_proxy_target(&mut self, input: &str) -> Result<&ProxySettings, ConsoleError> {
        let settings = ProxySettings::from_input(input);
        let echoed = self.backend.set_proxy_settings(&settings).await?;
        self.proxy = echoed.unwrap_or(settings);
        tracing::info!(proxy_target = ?self.proxy.target_url, "updated proxy settings");
        Ok(&self.proxy)
    }

    /// Ask the backend to stop. `Ok(None)` means the user declined.
    pub async fn shutdown(&mut self, decision: Decision) -> Result<Option<ShutdownAck>, ConsoleError> {
        if !decision.is_confirmed() {
            return Ok(None);
        }
        let ack = self.backend.shutdown().await?;
        tracing::info!(message = %ack.message, "server shutdown requested");
        self.connected = false;
        Ok(Some(ack))
    }

    /// Write the current log rows to a timestamped file in `dir`
    pub fn export_logs(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, ConsoleError> {
        export::write_logs(dir, &self.logs.entries(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::testing::{log_entry, stored_mock, FakeBackend};

    #[tokio::test]
    async fn test_create_posts_and_refetches() {
        let mut console = Console::new(FakeBackend::default());
        console.editor.path = "/users".to_string();

        let submitted = console.submit_mock().await.unwrap();

        assert!(matches!(submitted, Submitted::Created(_)));
        assert_eq!(console.backend().calls(), vec!["POST /mocks", "GET /mocks"]);
        assert_eq!(console.mocks().len(), 1);
        assert_eq!(console.editor.identity(), None);
    }

    #[tokio::test]
    async fn test_edit_puts_to_identity() {
        let backend = FakeBackend::default();
        backend.mocks.lock().unwrap().push(stored_mock("GET", "/users"));
        let mut console = Console::new(backend);
        console.refresh_mocks().await.unwrap();

        assert!(console.edit_mock("GET::/users"));
        console.editor.status = "503".to_string();
        let submitted = console.submit_mock().await.unwrap();

        assert!(matches!(submitted, Submitted::Updated(_)));
        assert!(console
            .backend()
            .calls()
            .contains(&"PUT GET::/users".to_string()));
        assert_eq!(console.mocks()[0].status_code, 503);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let mut console = Console::new(FakeBackend::default());
        console.editor.path = "/a".to_string();
        console.editor.status = "99".to_string();

        let err = console.submit_mock().await.unwrap_err();

        assert!(err.is_validation());
        assert!(console.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_body_makes_no_request() {
        let mut console = Console::new(FakeBackend::default());
        console.editor.path = "/orders".to_string();
        console.editor.set_body("{\"id\": ");
        assert!(console.editor.set_json_mode(true).is_err());

        let err = console.submit_mock().await.unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::InvalidJsonBody)
        ));
        assert!(console.backend().calls().is_empty());
        assert_eq!(console.editor.body.content(), "{\"id\": ");
    }

    #[tokio::test]
    async fn test_declined_confirmations_send_nothing() {
        let mut console = Console::new(FakeBackend::default());

        assert!(!console.delete_mock("GET::/a", Decision::Declined).await.unwrap());
        assert!(!console.clear_mocks(Decision::Declined).await.unwrap());
        assert!(console.shutdown(Decision::Declined).await.unwrap().is_none());
        assert!(console.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_refetches_list() {
        let backend = FakeBackend::default();
        backend.mocks.lock().unwrap().push(stored_mock("GET", "/a"));
        backend.mocks.lock().unwrap().push(stored_mock("POST", "/b"));
        let mut console = Console::new(backend);
        console.refresh_mocks().await.unwrap();

        assert!(console.delete_mock("GET::/a", Decision::Confirmed).await.unwrap());
        assert_eq!(console.mocks().len(), 1);
        assert_eq!(console.mocks()[0].id, "POST::/b");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list_and_reports_body() {
        let backend = FakeBackend {
            missing_on_delete: true,
            ..Default::default()
        };
        backend.mocks.lock().unwrap().push(stored_mock("GET", "/a"));
        let mut console = Console::new(backend);
        console.refresh_mocks().await.unwrap();

        let err = console
            .delete_mock("GET::/a", Decision::Confirmed)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Mock not found");
        assert_eq!(console.mocks().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_resets_editing() {
        let backend = FakeBackend::default();
        backend.mocks.lock().unwrap().push(stored_mock("GET", "/a"));
        let mut console = Console::new(backend);
        console.refresh_mocks().await.unwrap();
        console.edit_mock("GET::/a");

        assert!(console.clear_mocks(Decision::Confirmed).await.unwrap());
        assert!(console.mocks().is_empty());
        assert_eq!(console.editor.identity(), None);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_rows() {
        let backend = FakeBackend::default();
        backend.logs.lock().unwrap().push(log_entry("1", 200));
        let mut console = Console::new(backend);
        console.poll_logs().await.unwrap();
        console.logs.set_open("1", true);

        *console.backend().fail_logs.lock().unwrap() = true;
        assert!(console.poll_logs().await.is_none());
        assert!(console.refresh_logs().await.is_err());

        assert_eq!(console.logs.len(), 1);
        assert!(console.logs.is_open("1"));
    }

    #[tokio::test]
    async fn test_info_and_proxy() {
        let backend = FakeBackend::default();
        *backend.proxy.lock().unwrap() = ProxySettings::from_input("http://upstream");
        let mut console = Console::new(backend);
        console.load_info().await.unwrap();
        assert!(console.is_connected());
        assert_eq!(console.proxy().target_url.as_deref(), Some("http://upstream"));

        let proxy = console.save_proxy_target("  ").await.unwrap();
        assert_eq!(proxy.target_url, None);
    }

    #[tokio::test]
    async fn test_shutdown_returns_ack() {
        let mut console = Console::new(FakeBackend::default());
        console.load_info().await.unwrap();

        let ack = console.shutdown(Decision::Confirmed).await.unwrap().unwrap();

        assert_eq!(ack.message, "Server shutting down");
        assert!(!console.is_connected());
    }

    #[test]
    fn test_decision_from_bool() {
        assert_eq!(Decision::from(true), Decision::Confirmed);
        assert!(!Decision::from(false).is_confirmed());
    }
}
