//! Turns detector matches into fraud alerts

use crate::detectors::DetectorMatch;
use crate::types::alert::FraudAlert;
use crate::types::id::{IdGenerator, RandomIds};
use crate::types::transaction::Transaction;
use std::sync::Arc;

/// Builds one [`FraudAlert`] per (transaction, match) pair.
///
/// The only side effect is drawing an id from the configured [`IdGenerator`].
#[derive(Clone)]
pub struct AlertFactory {
    ids: Arc<dyn IdGenerator>,
}

impl AlertFactory {
    /// Factory with clock-and-uuid alert ids
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(RandomIds))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Build an alert. The transaction is copied into the alert by value.
    pub fn build(&self, transaction: &Transaction, detection: DetectorMatch) -> FraudAlert {
        FraudAlert {
            alert_id: self.ids.next_id("alert"),
            transaction_id: transaction.transaction_id.clone(),
            user_id: transaction.user_id.clone(),
            fraud_type: detection.fraud_type,
            risk_score: detection.risk_score,
            reason: detection.reason,
            timestamp: transaction.timestamp,
            original_transaction: transaction.clone(),
        }
    }
}

impl Default for AlertFactory {
    fn default() -> Self {
        Self::new()
    }
}
