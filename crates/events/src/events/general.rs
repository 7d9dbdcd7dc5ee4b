use serde::{Deserialize, Serialize};

/// Messages that are not tied to one pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Warning {
        message: String,
        context: Option<String>,
    },

    Error {
        message: String,
        details: Option<String>,
    },

    Debug {
        message: String,
    },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>, context: Option<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            message: message.into(),
            details,
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            Self::Warning {
                message,
                context: Some(context),
            } => format!("Warning: {message} ({context})"),
            Self::Warning { message, .. } => format!("Warning: {message}"),
            Self::Error {
                message,
                details: Some(details),
            } => format!("Error: {message}\n{details}"),
            Self::Error { message, .. } => format!("Error: {message}"),
            Self::Debug { message } => message.clone(),
        }
    }
}
