//! Alert sinks: where the pipeline delivers fraud alerts

use crate::error::PipelineError;
use crate::types::alert::{FraudAlert, RiskLevelThresholds};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::{mpsc, Mutex};

/// Delivery failure. Carries the alert that was not consumed.
#[derive(Debug)]
pub struct SinkError {
    pub alert: FraudAlert,
    pub reason: String,
}

impl SinkError {
    pub fn new(alert: FraudAlert, reason: impl Into<String>) -> Self {
        Self {
            alert,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to deliver alert {}: {}", self.alert.alert_id, self.reason)
    }
}

impl std::error::Error for SinkError {}

impl From<SinkError> for PipelineError {
    fn from(err: SinkError) -> Self {
        PipelineError::SinkUnavailable {
            alert: Box::new(err.alert),
            undelivered: Vec::new(),
            reason: err.reason,
        }
    }
}

/// Consumer of fraud alerts. May be slow; callers await each delivery.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: FraudAlert) -> Result<(), SinkError>;
}

/// Console rendering for [`ConsoleSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One JSON document per line
    Json,
    /// Human readable block per alert
    #[default]
    Pretty,
}

/// Writes alerts to stdout
pub struct ConsoleSink {
    format: ConsoleFormat,
    thresholds: RiskLevelThresholds,
    stdout: Mutex<Stdout>,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat, thresholds: RiskLevelThresholds) -> Self {
        Self {
            format,
            thresholds,
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }

    /// Render an alert in this sink's format
    pub fn render(&self, alert: &FraudAlert) -> Result<String, serde_json::Error> {
        match self.format {
            ConsoleFormat::Json => {
                let mut line = serde_json::to_string(alert)?;
                line.push('\n');
                Ok(line)
            }
            ConsoleFormat::Pretty => Ok(render_pretty(alert, &self.thresholds)),
        }
    }
}

fn render_pretty(alert: &FraudAlert, thresholds: &RiskLevelThresholds) -> String {
    let tx = &alert.original_transaction;
    let when = Utc
        .timestamp_millis_opt(alert.timestamp)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| alert.timestamp.to_string());
    let rule = "=".repeat(50);

    format!(
        "FRAUD ALERT\n{rule}\n\
         Alert ID:       {}\n\
         Fraud Type:     {}\n\
         Risk Score:     {:.1}/100 ({})\n\
         User ID:        {}\n\
         Transaction ID: {}\n\
         Amount:         ${:.2}\n\
         Merchant:       {}\n\
         Location:       {}\n\
         Reason:         {}\n\
         Timestamp:      {}\n{rule}\n\n",
        alert.alert_id,
        alert.fraud_type,
        alert.risk_score,
        alert.risk_level(thresholds).as_str(),
        alert.user_id,
        alert.transaction_id,
        tx.amount,
        tx.merchant,
        tx.location,
        alert.reason,
        when,
    )
}

#[async_trait]
impl AlertSink for ConsoleSink {
    async fn deliver(&self, alert: FraudAlert) -> Result<(), SinkError> {
        let text = match self.render(&alert) {
            Ok(text) => text,
            Err(e) => return Err(SinkError::new(alert, e.to_string())),
        };

        let mut stdout = self.stdout.lock().await;
        let written = match stdout.write_all(text.as_bytes()).await {
            Ok(()) => stdout.flush().await,
            Err(e) => Err(e),
        };
        written.map_err(|e| SinkError::new(alert, e.to_string()))
    }
}

/// Forwards alerts into a bounded tokio channel.
///
/// A full channel makes `deliver` wait; a closed receiver fails the delivery.
#[derive(Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<FraudAlert>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<FraudAlert>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving half
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FraudAlert>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl AlertSink for ChannelSink {
    async fn deliver(&self, alert: FraudAlert) -> Result<(), SinkError> {
        self.sender
            .send(alert)
            .await
            .map_err(|e| SinkError::new(e.0, "alert receiver closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::alert::FraudType;
    use crate::types::transaction::Transaction;

    fn alert() -> FraudAlert {
        let tx = Transaction::new(
            "txn_1700000000000_0009",
            "user_0009",
            50.0,
            "Suspicious_Store",
            "other",
            1_700_000_000_000,
            "Houston",
        );
        FraudAlert {
            alert_id: "alert_1700000000000_0001".to_string(),
            transaction_id: tx.transaction_id.clone(),
            user_id: tx.user_id.clone(),
            fraud_type: FraudType::SuspiciousMerchant,
            risk_score: 85.0,
            reason: "Transaction from suspicious merchant: Suspicious_Store".to_string(),
            timestamp: tx.timestamp,
            original_transaction: tx,
        }
    }

    #[test]
    fn test_pretty_render() {
        let sink = ConsoleSink::new(ConsoleFormat::Pretty, RiskLevelThresholds::default());
        let text = sink.render(&alert()).unwrap();

        assert!(text.contains("Fraud Type:     SUSPICIOUS_MERCHANT"));
        assert!(text.contains("Risk Score:     85.0/100 (high)"));
        assert!(text.contains("Amount:         $50.00"));
        assert!(text.contains("2023-11-14T22:13:20"));
    }

    #[test]
    fn test_json_render_is_one_line() {
        let sink = ConsoleSink::new(ConsoleFormat::Json, RiskLevelThresholds::default());
        let text = sink.render(&alert()).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.trim_end().lines().count(), 1);
        let parsed: FraudAlert = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed, alert());
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut receiver) = ChannelSink::channel(4);

        sink.deliver(alert()).await.unwrap();
        assert_eq!(receiver.recv().await.unwrap().alert_id, "alert_1700000000000_0001");
    }

    #[tokio::test]
    async fn test_channel_sink_returns_alert_when_closed() {
        let (sink, receiver) = ChannelSink::channel(1);
        drop(receiver);

        let err = sink.deliver(alert()).await.unwrap_err();
        assert_eq!(err.alert, alert());

        let pipeline_err: PipelineError = err.into();
        assert_eq!(
            pipeline_err.undelivered_alert().map(|a| a.alert_id.as_str()),
            Some("alert_1700000000000_0001")
        );
    }
}
