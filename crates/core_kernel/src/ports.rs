//! Ports and adapters infrastructure
//!
//! Domain crates describe the collaborators they need (voucher source,
//! account ledger, payment gateway) as async port traits that extend the
//! marker traits here. Adapters implement them: the in-memory store used by
//! the console today, or a remote billing backend later.
//!
//! ```text
//!   PaymentService ──► VoucherPort / AccountPort / PaymentPort / OrderPort
//!                              ▲                         ▲
//!                     in-memory store            remote adapter
//! ```

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Failure reported by a port adapter
///
/// The in-memory store and a remote billing backend fail through the same
/// type, so callers never branch on which adapter is wired in.
#[derive(Debug, Error)]
pub enum PortError {
    /// No record with this id exists
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The backing service refused to serve the request
    #[error("{service} is unavailable")]
    Unavailable { service: &'static str },

    /// The request may or may not have reached the backing service
    #[error("transport failure talking to {service}: {message}")]
    Transport {
        service: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unavailable(service: &'static str) -> Self {
        PortError::Unavailable { service }
    }

    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        PortError::Transport {
            service,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a lower-level I/O or client error
    pub fn transport_with_source(
        service: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Transport {
            service,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Worth retrying unchanged: the failure says nothing about the request
    pub fn is_transient(&self) -> bool {
        !self.is_not_found()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared behind `Arc<dyn …>` across request handlers, so they
/// must be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Metadata about a port operation for auditing and tracing
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    /// Correlation ID for tracing across systems
    pub correlation_id: Option<String>,
    /// Operator or system that initiated the operation
    pub initiated_by: Option<String>,
    /// Additional context as key-value pairs
    pub context: std::collections::HashMap<String, String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn initiated_by(mut self, operator: impl Into<String>) -> Self {
        self.initiated_by = Some(operator.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity() {
        let error = PortError::not_found("Voucher", "VCH-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "Voucher VCH-123 not found");
    }

    #[test]
    fn test_transport_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let error = PortError::transport_with_source("payment service", io);
        assert!(error.is_transient());
        assert!(error.source().is_some());
        assert!(error.to_string().contains("reset by peer"));

        assert!(PortError::unavailable("voucher service").is_transient());
    }

    #[test]
    fn test_operation_metadata() {
        let metadata = OperationMetadata::with_correlation_id("req-123")
            .initiated_by("ops-admin")
            .with_context("order_id", "ORD-1");

        assert_eq!(metadata.correlation_id, Some("req-123".to_string()));
        assert_eq!(metadata.initiated_by, Some("ops-admin".to_string()));
        assert_eq!(metadata.context.get("order_id"), Some(&"ORD-1".to_string()));
    }
}
