//! User-facing alerts raised by router actions and view loads.

use serde::Serialize;
use shared::error::ErrorCode;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Info,
    Auth,
    Transport,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertContext {
    Session,
    Login,
    Register,
    Logout,
    LoadView,
    CreateAssignment,
    DeleteAssignment,
    GradeSubmission,
    Submit,
}

impl AlertContext {
    fn failure_prefix(self) -> &'static str {
        match self {
            AlertContext::Session => "Session check failed",
            AlertContext::Login => "Login failed",
            AlertContext::Register => "Registration failed",
            AlertContext::Logout => "Logout failed",
            AlertContext::LoadView => "Failed to load data",
            AlertContext::CreateAssignment => "Failed to create assignment",
            AlertContext::DeleteAssignment => "Failed to delete",
            AlertContext::GradeSubmission => "Failed to save grade",
            AlertContext::Submit => "Submission failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    category: AlertCategory,
    context: AlertContext,
    message: String,
}

impl Alert {
    pub fn info(context: AlertContext, message: impl Into<String>) -> Self {
        Self {
            category: AlertCategory::Info,
            context,
            message: message.into(),
        }
    }

    pub fn from_error(context: AlertContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::NotAuthenticated | ClientError::Forbidden(_) => AlertCategory::Auth,
            ClientError::Transport(_) => AlertCategory::Transport,
            ClientError::Validation(_) | ClientError::Decode(_) => AlertCategory::Validation,
            ClientError::Api { code, .. } => match code {
                ErrorCode::Unauthorized | ErrorCode::Forbidden => AlertCategory::Auth,
                ErrorCode::Validation | ErrorCode::Conflict => AlertCategory::Validation,
                ErrorCode::NotFound => AlertCategory::NotFound,
                ErrorCode::Internal => AlertCategory::Unknown,
            },
            ClientError::NoRuntime => AlertCategory::Unknown,
        };

        let message = match err {
            // Validation messages are already phrased for the user.
            ClientError::Validation(message) => message.clone(),
            ClientError::Api { message, .. } => format!("{}: {message}", context.failure_prefix()),
            ClientError::Transport(_) => format!(
                "{}: server unreachable; check your connection and retry",
                context.failure_prefix()
            ),
            other => format!("{}: {other}", context.failure_prefix()),
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// True when the backend rejected the session itself rather than the action.
    pub fn requires_reauth(&self, err: &ClientError) -> bool {
        self.category == AlertCategory::Auth && err.is_unauthorized()
    }

    pub fn category(&self) -> AlertCategory {
        self.category
    }

    pub fn context(&self) -> AlertContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.category != AlertCategory::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_api_errors() {
        let err = ClientError::api(401, r#"{"error":"Not logged in"}"#);
        let alert = Alert::from_error(AlertContext::LoadView, &err);
        assert_eq!(alert.category(), AlertCategory::Auth);
        assert!(alert.requires_reauth(&err));
        assert_eq!(alert.message(), "Failed to load data: Not logged in");

        let err = ClientError::api(403, r#"{"error":"Teacher only"}"#);
        let alert = Alert::from_error(AlertContext::GradeSubmission, &err);
        assert_eq!(alert.category(), AlertCategory::Auth);
        assert!(!alert.requires_reauth(&err));

        let err = ClientError::api(409, r#"{"error":"email already exists"}"#);
        let alert = Alert::from_error(AlertContext::Register, &err);
        assert_eq!(alert.category(), AlertCategory::Validation);
        assert_eq!(alert.message(), "Registration failed: email already exists");
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = ClientError::validation("Title required");
        let alert = Alert::from_error(AlertContext::CreateAssignment, &err);
        assert_eq!(alert.message(), "Title required");
        assert!(alert.is_error());
        assert!(!Alert::info(AlertContext::Submit, "Submitted!").is_error());
    }
}
