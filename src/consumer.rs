//! NATS message consumer for incoming transactions

use crate::error::PipelineError;
use crate::types::transaction::Transaction;
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use futures::{Stream, StreamExt};
use tracing::info;

/// Consumer for receiving transactions from NATS
pub struct TransactionConsumer {
    client: Client,
    subject: String,
}

impl TransactionConsumer {
    /// Create a new transaction consumer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the transaction subject
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self
            .client
            .subscribe(self.subject.clone())
            .await
            .with_context(|| format!("Failed to subscribe to {}", self.subject))?;
        info!(subject = %self.subject, "Subscribed to transaction subject");
        Ok(subscriber)
    }

    /// Subscribe and decode each message into a validated transaction.
    ///
    /// The stream ends when the subscription is closed.
    pub async fn transactions(
        &self,
    ) -> Result<impl Stream<Item = Result<Transaction, PipelineError>> + Send + 'static> {
        let subscriber = self.subscribe().await?;
        Ok(subscriber.map(|message| Transaction::from_json(&message.payload)))
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
