//! Error reporting
//!
//! Maps an [`ApiError`] to the fixed user-facing message table used by every
//! operation.

use super::console::Console;
use crate::gcp::ApiError;
use crate::resource::OpResult;
use std::io::Write;

/// Messages an operation shows for each error kind
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    action: String,
    permission: Option<String>,
    not_found: Option<String>,
    already_exists: Option<String>,
}

impl ErrorReport {
    /// `action` completes "Error <action>: <message>", e.g. "creating topic"
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }

    /// IAM permission named in the permission-denied hint
    pub fn permission(mut self, permission: &str) -> Self {
        self.permission = Some(permission.to_string());
        self
    }

    /// Resource reported when the service answers NotFound
    pub fn not_found(mut self, label: &str, name: &str) -> Self {
        self.not_found = Some(format!("{} '{}' not found", label, name));
        self
    }

    /// Resource reported when the service answers AlreadyExists
    pub fn already_exists(mut self, label: &str, name: &str) -> Self {
        self.already_exists = Some(format!("{} '{}' already exists", label, name));
        self
    }

    pub fn render<W: Write>(&self, console: &mut Console<W>, error: &ApiError) {
        tracing::warn!("Error {}: {:?}", self.action, error);

        match error {
            ApiError::PermissionDenied(message) => {
                console.failure(format!("Permission Denied: {}", message));
                if let Some(permission) = &self.permission {
                    console.line(format!(
                        "Make sure your service account has '{}' permission",
                        permission
                    ));
                }
            }
            ApiError::NotFound(message) => match &self.not_found {
                Some(resource) => console.failure(resource),
                None => self.generic(console, message),
            },
            ApiError::AlreadyExists(message) => match &self.already_exists {
                Some(resource) => console.failure(resource),
                None => self.generic(console, message),
            },
            ApiError::Unknown(message) => self.generic(console, message),
        }
    }

    /// Render `error` and hand it back as the operation's result
    pub fn fail<T, W: Write>(&self, console: &mut Console<W>, error: ApiError) -> OpResult<T> {
        self.render(console, &error);
        Err(error.into())
    }

    fn generic<W: Write>(&self, console: &mut Console<W>, message: &str) {
        console.failure(format!("Error {}: {}", self.action, message));
    }
}
