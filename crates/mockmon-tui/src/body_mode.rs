//! Raw/JSON body mode for the mock editor
//!
//! Owns the content-type field because JSON mode derives it: enabling JSON
//! fills an empty content type with `application/json` and remembers that
//! the value was machine-set, so turning JSON off can take it back without
//! touching anything the user typed.

use crate::error::{ValidationError, INVALID_JSON_BODY};

/// Content type filled in when JSON mode is switched on
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    #[default]
    Raw,
    Json,
}

/// How a failed JSON parse is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Return an error for the caller to show to the user
    Alert,
    /// Only mark the field invalid (passive inference)
    Silent,
}

/// Who set the current content-type value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ContentTypeOrigin {
    #[default]
    User,
    Autofilled,
}

/// Pretty-print `text` as JSON. `Ok(None)` means the text is blank.
pub fn pretty_json(text: &str) -> Result<Option<String>, serde_json::Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    serde_json::to_string_pretty(&value).map(Some)
}

#[derive(Debug, Clone, Default)]
pub struct BodyModeController {
    mode: BodyMode,
    content_type: String,
    origin: ContentTypeOrigin,
    body_error: Option<String>,
}

impl BodyModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    pub fn is_json(&self) -> bool {
        self.mode == BodyMode::Json
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_autofilled(&self) -> bool {
        self.origin == ContentTypeOrigin::Autofilled
    }

    /// Field-level validation message for the body, if any
    pub fn body_error(&self) -> Option<&str> {
        self.body_error.as_deref()
    }

    pub fn is_body_valid(&self) -> bool {
        self.body_error.is_none()
    }

    /// The user typed into the content-type field; the value is theirs now
    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.content_type = value.into();
        self.origin = ContentTypeOrigin::User;
    }

    /// Switch to JSON mode, pretty-printing `body` in place when it parses.
    ///
    /// JSON mode is entered even when the body is invalid so the user can
    /// fix it; `Validation::Alert` additionally returns the error.
    pub fn enable_json(
        &mut self,
        body: &mut String,
        validation: Validation,
    ) -> Result<(), ValidationError> {
        self.mode = BodyMode::Json;
        if self.content_type.trim().is_empty() {
            self.content_type = JSON_CONTENT_TYPE.to_string();
            self.origin = ContentTypeOrigin::Autofilled;
        }

        match pretty_json(body) {
            Ok(formatted) => {
                if let Some(formatted) = formatted {
                    *body = formatted;
                }
                self.body_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "body is not valid JSON");
                self.body_error = Some(INVALID_JSON_BODY.to_string());
                match validation {
                    Validation::Alert => Err(ValidationError::InvalidJsonBody),
                    Validation::Silent => Ok(()),
                }
            }
        }
    }

    /// Switch to raw mode, withdrawing an autofilled content type
    pub fn disable_json(&mut self) {
        self.mode = BodyMode::Raw;
        if self.is_autofilled() {
            self.content_type.clear();
            self.origin = ContentTypeOrigin::User;
        }
        self.body_error = None;
    }

    /// Flip between raw and JSON mode
    pub fn toggle(
        &mut self,
        body: &mut String,
        validation: Validation,
    ) -> Result<(), ValidationError> {
        match self.mode {
            BodyMode::Raw => self.enable_json(body, validation),
            BodyMode::Json => {
                self.disable_json();
                Ok(())
            }
        }
    }

    /// Re-check the body after an edit. Blank text is always valid.
    pub fn body_edited(&mut self, body: &str) {
        if self.mode == BodyMode::Raw || body.trim().is_empty() {
            self.body_error = None;
            return;
        }
        self.body_error = match serde_json::from_str::<serde_json::Value>(body.trim()) {
            Ok(_) => None,
            Err(_) => Some(INVALID_JSON_BODY.to_string()),
        };
    }

    /// Whether a stored mock's body should open in JSON mode
    pub fn infer_json(content_type: Option<&str>, body: &str) -> bool {
        if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json")) {
            return true;
        }
        !body.is_empty() && serde_json::from_str::<serde_json::Value>(body).is_ok()
    }

    /// Load a stored mock's content type and body, inferring the mode silently
    pub fn load(&mut self, content_type: Option<&str>, body: &mut String) {
        self.content_type = content_type.unwrap_or_default().to_string();
        self.origin = ContentTypeOrigin::User;
        self.body_error = None;

        if Self::infer_json(content_type, body) {
            // Silent validation never errors
            let _ = self.enable_json(body, Validation::Silent);
        } else {
            self.disable_json();
        }
    }

    /// Back to raw mode with an empty, user-owned content type
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
