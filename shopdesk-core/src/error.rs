//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

pub type ShopdeskResult<T> = Result<T, ShopdeskError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the admin gateway
#[derive(Error, Debug)]
pub enum ShopdeskError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Backend request failed: {message}")]
    Network {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Malformed backend response: {message}")]
    MalformedResponse {
        message: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

}

impl ShopdeskError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            ShopdeskError::Config { context, .. }
            | ShopdeskError::Network { context, .. }
            | ShopdeskError::MalformedResponse { context, .. }
            | ShopdeskError::Authentication { context, .. }
            | ShopdeskError::Validation { context, .. }
            | ShopdeskError::Timeout { context, .. } => context,
        }
    }

    /// Check if error is recoverable by a later attempt
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ShopdeskError::Network { .. } | ShopdeskError::Timeout { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        if self.is_recoverable() {
            warn!(
                error_id = %context.error_id,
                component = %context.component,
                error = %self,
                "Backend error, next request retries"
            );
            return;
        }
        match self {
            ShopdeskError::Config { .. } | ShopdeskError::Validation { .. } => {
                error!(
                    error_id = %context.error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            ShopdeskError::Authentication { .. } => {
                info!(
                    error_id = %context.error_id,
                    error = %self,
                    "Authentication rejected"
                );
            }
            _ => {
                warn!(
                    error_id = %context.error_id,
                    component = %context.component,
                    error = %self,
                    "Backend error"
                );
            }
        }
    }
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ShopdeskError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your shopdesk.toml or SHOPDESK_* variables"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::ShopdeskError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
