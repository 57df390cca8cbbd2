//! In-memory backend for unit tests

use crate::api::{
    ApiError, Backend, Headers, LogEntry, Mock, MockPayload, ProxySettings, ServerInfo,
    ShutdownAck,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Records every call as `"VERB path"` and keeps mocks and logs in memory
#[derive(Default)]
pub struct FakeBackend {
    pub mocks: Mutex<Vec<Mock>>,
    pub logs: Mutex<Vec<LogEntry>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_logs: Mutex<bool>,
    pub missing_on_delete: bool,
    /// How long `list_logs` takes to answer
    pub logs_delay: Option<Duration>,
    pub proxy: Mutex<ProxySettings>,
}

impl FakeBackend {
    pub fn with_mocks(mocks: Vec<Mock>) -> Self {
        Self {
            mocks: Mutex::new(mocks),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn to_mock(payload: &MockPayload) -> Mock {
        Mock {
            id: format!("{}::{}", payload.method, payload.path),
            method: payload.method.clone(),
            path: payload.path.clone(),
            status_code: payload.status_code,
            delay_ms: payload.delay_ms,
            headers: payload.headers.clone(),
            body: payload.body.clone(),
            content_type: payload.content_type.clone(),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_mocks(&self) -> Result<Vec<Mock>, ApiError> {
        self.record("GET /mocks");
        Ok(self.mocks.lock().unwrap().clone())
    }

    async fn create_mock(&self, payload: &MockPayload) -> Result<Mock, ApiError> {
        self.record("POST /mocks");
        let mock = Self::to_mock(payload);
        self.mocks.lock().unwrap().push(mock.clone());
        Ok(mock)
    }

    async fn update_mock(&self, id: &str, payload: &MockPayload) -> Result<Mock, ApiError> {
        self.record(format!("PUT {}", id));
        let mock = Self::to_mock(payload);
        let mut mocks = self.mocks.lock().unwrap();
        match mocks.iter_mut().find(|m| m.id == id) {
            Some(slot) => *slot = mock.clone(),
            None => mocks.push(mock.clone()),
        }
        Ok(mock)
    }

    async fn delete_mock(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("DELETE {}", id));
        if self.missing_on_delete {
            return Err(ApiError::Status {
                status: 404,
                message: "Mock not found".to_string(),
            });
        }
        self.mocks.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn clear_mocks(&self) -> Result<(), ApiError> {
        self.record("DELETE /mocks");
        self.mocks.lock().unwrap().clear();
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.record("GET /logs");
        if let Some(delay) = self.logs_delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_logs.lock().unwrap() {
            return Err(ApiError::Status {
                status: 503,
                message: "Request failed with 503".to_string(),
            });
        }
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn proxy_settings(&self) -> Result<ProxySettings, ApiError> {
        self.record("GET /settings/proxy");
        Ok(self.proxy.lock().unwrap().clone())
    }

    async fn set_proxy_settings(
        &self,
        settings: &ProxySettings,
    ) -> Result<Option<ProxySettings>, ApiError> {
        self.record("POST /settings/proxy");
        *self.proxy.lock().unwrap() = settings.clone();
        Ok(None)
    }

    async fn server_info(&self) -> Result<ServerInfo, ApiError> {
        self.record("GET /info");
        Ok(ServerInfo {
            proxy: self.proxy.lock().unwrap().clone(),
            mocks: self.mocks.lock().unwrap().clone(),
        })
    }

    async fn shutdown(&self) -> Result<ShutdownAck, ApiError> {
        self.record("POST /server/shutdown");
        Ok(ShutdownAck {
            message: "Server shutting down".to_string(),
        })
    }
}

pub fn stored_mock(method: &str, path: &str) -> Mock {
    Mock {
        id: format!("{}::{}", method, path),
        method: method.to_string(),
        path: path.to_string(),
        status_code: 200,
        delay_ms: 0,
        headers: Headers::new(),
        body: String::new(),
        content_type: None,
    }
}

pub fn log_entry(id: &str, status_code: u16) -> LogEntry {
    LogEntry {
        id: id.to_string(),
        timestamp: "2024-05-01T10:00:00.250".to_string(),
        method: "GET".to_string(),
        path: format!("/items/{}", id),
        status_code,
        source: "mock".to_string(),
        request_headers: Headers::new(),
        request_body: None,
        response_headers: Headers::new(),
        response_body: None,
    }
}
