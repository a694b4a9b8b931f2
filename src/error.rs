//! Error taxonomy for the detection core

use crate::types::alert::FraudAlert;
use thiserror::Error;

/// Errors surfaced by ingestion, detection and alert delivery.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input rejected before it reaches any detector.
    #[error("Malformed transaction {transaction_id}: {reason}")]
    MalformedTransaction {
        transaction_id: String,
        reason: String,
    },

    /// A detector failed while evaluating one transaction.
    #[error("Detector {detector} faulted on transaction {transaction_id}: {message}")]
    DetectorFault {
        detector: String,
        transaction_id: String,
        message: String,
    },

    /// The sink refused an alert. The refused alert and every alert still
    /// queued behind it are handed back for retry.
    #[error(
        "Alert sink unavailable for alert {}: {reason} ({} more undelivered)",
        .alert.alert_id,
        .undelivered.len()
    )]
    SinkUnavailable {
        alert: Box<FraudAlert>,
        undelivered: Vec<FraudAlert>,
        reason: String,
    },
}

impl PipelineError {
    pub(crate) fn malformed(transaction_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTransaction {
            transaction_id: transaction_id.into(),
            reason: reason.into(),
        }
    }

    /// The alert a failed sink refused, if any.
    pub fn undelivered_alert(&self) -> Option<&FraudAlert> {
        match self {
            Self::SinkUnavailable { alert, .. } => Some(alert),
            _ => None,
        }
    }

    /// Every alert a failed sink left undelivered, refused alert first.
    pub fn undelivered_alerts(&self) -> Vec<&FraudAlert> {
        match self {
            Self::SinkUnavailable {
                alert, undelivered, ..
            } => std::iter::once(&**alert).chain(undelivered).collect(),
            _ => Vec::new(),
        }
    }
}
