//! Transaction data structures for rule-based fraud detection

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A single financial event to be evaluated for fraud.
///
/// Immutable once ingested: detectors and the alert factory only ever see a
/// shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (`txn_<epoch_millis>_<suffix>`)
    pub transaction_id: String,

    /// Stable per-user identifier (`user_<index>`)
    pub user_id: String,

    /// Amount in USD, always positive
    pub amount: f64,

    /// Merchant name
    pub merchant: String,

    /// Merchant category (groceries, electronics, travel, ...)
    pub category: String,

    /// Event time in epoch milliseconds. Arrival order is not guaranteed.
    pub timestamp: i64,

    /// City or country token
    pub location: String,
}

impl Transaction {
    /// Create a new transaction. No validation happens here; see [`Transaction::validate`].
    pub fn new(
        transaction_id: impl Into<String>,
        user_id: impl Into<String>,
        amount: f64,
        merchant: impl Into<String>,
        category: impl Into<String>,
        timestamp: i64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            user_id: user_id.into(),
            amount,
            merchant: merchant.into(),
            category: category.into(),
            timestamp,
            location: location.into(),
        }
    }

    /// Check the ingestion invariants: non-empty strings and a positive, finite amount.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let id = if self.transaction_id.trim().is_empty() {
            "<missing>"
        } else {
            self.transaction_id.as_str()
        };

        let text_fields = [
            ("transaction_id", &self.transaction_id),
            ("user_id", &self.user_id),
            ("merchant", &self.merchant),
            ("category", &self.category),
            ("location", &self.location),
        ];
        for (name, value) in text_fields {
            if value.trim().is_empty() {
                return Err(PipelineError::malformed(id, format!("{} is empty", name)));
            }
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(PipelineError::malformed(
                id,
                format!("amount must be positive, got {}", self.amount),
            ));
        }

        Ok(())
    }

    /// Deserialize a JSON payload and validate it.
    pub fn from_json(payload: &[u8]) -> Result<Self, PipelineError> {
        let transaction: Transaction = serde_json::from_slice(payload)
            .map_err(|e| PipelineError::malformed("<undecodable>", e.to_string()))?;
        transaction.validate()?;
        Ok(transaction)
    }
}
