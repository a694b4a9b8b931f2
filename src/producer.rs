//! NATS message producer for fraud alerts

use crate::sink::{AlertSink, SinkError};
use crate::types::alert::FraudAlert;
use anyhow::Result;
use async_nats::Client;
use async_trait::async_trait;
use tracing::debug;

/// Producer for publishing fraud alerts to NATS
#[derive(Clone)]
pub struct AlertProducer {
    client: Client,
    subject: String,
}

impl AlertProducer {
    /// Create a new alert producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a fraud alert as JSON
    pub async fn publish(&self, alert: &FraudAlert) -> Result<()> {
        let payload = serde_json::to_vec(alert)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            alert_id = %alert.alert_id,
            transaction_id = %alert.transaction_id,
            fraud_type = %alert.fraud_type,
            risk_score = alert.risk_score,
            "Published fraud alert"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl AlertSink for AlertProducer {
    async fn deliver(&self, alert: FraudAlert) -> Result<(), SinkError> {
        match self.publish(&alert).await {
            Ok(()) => Ok(()),
            Err(e) => Err(SinkError::new(alert, format!("{} ({})", e, self.subject))),
        }
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
