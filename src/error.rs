//! Error types for the PV/EBS inventory
//!
//! Provides structured error types for configuration, the Kubernetes and AWS
//! volume sources, and report rendering.

use thiserror::Error;

/// Unified error type for the inventory
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes client configuration error: {0}")]
    KubeConfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    // =========================================================================
    // AWS Errors
    // =========================================================================
    #[error("AWS API error: {operation}: {reason}")]
    Aws { operation: String, reason: String },

    // =========================================================================
    // Output Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JSON serialization error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an AWS error from an SDK error, keeping the full error chain
    pub fn aws<E>(operation: &str, err: E) -> Self
    where
        E: std::error::Error,
    {
        Error::Aws {
            operation: operation.to_string(),
            reason: aws_sdk_ec2::error::DisplayErrorContext(err).to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(_) => 2,
            _ => 1,
        }
    }

    /// Check if this error is transient
    ///
    /// Nothing is retried; this only shapes the message printed to operators.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Kube(kube::Error::Api(resp)) => resp.code >= 500 || resp.code == 429,
            Error::Kube(kube::Error::HyperError(_)) | Error::Kube(kube::Error::Service(_)) => true,
            Error::Aws { reason, .. } => {
                reason.contains("dispatch failure") || reason.contains("timeout")
            }
            _ => false,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias for the inventory
pub type Result<T> = std::result::Result<T, Error>;
