//! Mock create/edit form
//!
//! `MockEditor` holds every field of the form, converts a stored [`Mock`]
//! into editable state and back into a [`MockPayload`], and submits through
//! a [`Backend`]. Header rows and the raw/JSON body mode are delegated to
//! [`HeaderListEditor`] and [`BodyModeController`].

use crate::api::{Backend, Mock, MockPayload, HTTP_METHODS};
use crate::body_mode::{pretty_json, BodyModeController, Validation};
use crate::components::TextArea;
use crate::error::{ConsoleError, ValidationError};
use crate::headers::HeaderListEditor;

/// Whether the form creates a new mock or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Creating,
    Editing { id: String, label: String },
}

/// What a successful submit did
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created(Mock),
    Updated(Mock),
}

impl Submitted {
    pub fn mock(&self) -> &Mock {
        match self {
            Submitted::Created(mock) | Submitted::Updated(mock) => mock,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockEditor {
    mode: EditorMode,
    pub method: String,
    pub path: String,
    pub status: String,
    pub delay: String,
    pub headers: HeaderListEditor,
    pub body_mode: BodyModeController,
    pub body: TextArea,
}

impl Default for MockEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEditor {
    pub fn new() -> Self {
        Self {
            mode: EditorMode::Creating,
            method: HTTP_METHODS[0].to_string(),
            path: String::new(),
            status: "200".to_string(),
            delay: "0".to_string(),
            headers: HeaderListEditor::new(),
            body_mode: BodyModeController::new(),
            body: TextArea::default(),
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    /// Identity of the mock being edited, `None` when creating
    pub fn identity(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::Creating => None,
            EditorMode::Editing { id, .. } => Some(id),
        }
    }

    /// Form title
    pub fn caption(&self) -> String {
        match &self.mode {
            EditorMode::Creating => "Create mock".to_string(),
            EditorMode::Editing { label, .. } => format!("Edit mock {}", label),
        }
    }

    /// Clear every field back to a blank "create" form
    pub fn reset_to_create(&mut self) {
        *self = Self::new();
    }

    /// Fill the form from a stored mock and switch to editing it
    pub fn load_for_edit(&mut self, mock: &Mock) {
        self.method = mock.method.to_ascii_uppercase();
        self.path = mock.path.clone();
        self.status = mock.status_code.to_string();
        self.delay = mock.delay_ms.to_string();
        self.headers.load(&mock.headers);

        let mut body = mock.body.clone();
        self.body_mode.load(mock.content_type.as_deref(), &mut body);
        self.body.set_content(&body);

        self.mode = EditorMode::Editing {
            id: mock.id.clone(),
            label: format!("{} {}", self.method, mock.path),
        };
    }

    /// Step through the verb list
    pub fn cycle_method(&mut self, forward: bool) {
        let len = HTTP_METHODS.len();
        let next = match HTTP_METHODS.iter().position(|m| *m == self.method) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.method = HTTP_METHODS[next].to_string();
    }

    /// The user typed into the content-type field
    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.body_mode.set_content_type(value);
    }

    pub fn set_body(&mut self, text: &str) {
        self.body.set_content(text);
        self.body_edited();
    }

    /// Re-validate after the body text changed
    pub fn body_edited(&mut self) {
        self.body_mode.body_edited(&self.body.content());
    }

    /// Turn JSON mode on or off as the user asked; invalid JSON is reported
    pub fn set_json_mode(&mut self, enabled: bool) -> Result<(), ValidationError> {
        if enabled {
            self.apply_to_body(|ctl, body| ctl.enable_json(body, Validation::Alert))
        } else {
            self.body_mode.disable_json();
            Ok(())
        }
    }

    pub fn toggle_json_mode(&mut self) -> Result<(), ValidationError> {
        let enabled = !self.body_mode.is_json();
        self.set_json_mode(enabled)
    }

    /// Explicit "format as JSON": pretty-prints and enters JSON mode
    pub fn format_body(&mut self) -> Result<(), ValidationError> {
        self.set_json_mode(true)
    }

    fn apply_to_body<F>(&mut self, f: F) -> Result<(), ValidationError>
    where
        F: FnOnce(&mut BodyModeController, &mut String) -> Result<(), ValidationError>,
    {
        let original = self.body.content();
        let mut body = original.clone();
        let result = f(&mut self.body_mode, &mut body);
        if body != original {
            self.body.set_content(&body);
        }
        result
    }

    /// Build the wire payload from the current fields.
    ///
    /// In JSON mode a non-blank body is re-serialized, and the formatted
    /// text is written back into the form.
    pub fn build_payload(&mut self) -> Result<MockPayload, ValidationError> {
        let mut body = self.body.content();
        if self.body_mode.is_json() {
            if let Some(formatted) =
                pretty_json(&body).map_err(|_| ValidationError::InvalidJsonBody)?
            {
                self.body.set_content(&formatted);
                body = formatted;
            }
        }

        let path = self.path.trim();
        if path.is_empty() {
            return Err(ValidationError::EmptyPath);
        }

        let status_code: u16 = self
            .status
            .trim()
            .parse()
            .map_err(|_| ValidationError::StatusNotNumeric(self.status.clone()))?;
        if !(100..=599).contains(&status_code) {
            return Err(ValidationError::StatusOutOfRange(status_code));
        }

        let delay = self.delay.trim();
        let delay_ms = if delay.is_empty() {
            0
        } else {
            delay
                .parse()
                .map_err(|_| ValidationError::InvalidDelay(self.delay.clone()))?
        };

        let content_type = self.body_mode.content_type();
        Ok(MockPayload {
            method: self.method.clone(),
            path: path.to_string(),
            status_code,
            delay_ms,
            headers: self.headers.collect(),
            body,
            content_type: (!content_type.is_empty()).then(|| content_type.to_string()),
        })
    }

    /// Validate and send the form: POST when creating, PUT when editing.
    ///
    /// On success the form resets to "create". On any failure the form is
    /// left as it was so the user can correct it.
    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<Submitted, ConsoleError> {
        let payload = self.build_payload()?;

        let submitted = match self.identity() {
            Some(id) => {
                let mock = backend.update_mock(id, &payload).await?;
                tracing::info!(id, method = %mock.method, path = %mock.path, "updated mock");
                Submitted::Updated(mock)
            }
            None => {
                let mock = backend.create_mock(&payload).await?;
                tracing::info!(id = %mock.id, method = %mock.method, path = %mock.path, "created mock");
                Submitted::Created(mock)
            }
        };

        self.reset_to_create();
        Ok(submitted)
    }
}
