//! Fraud alert data structures

use crate::types::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of fraud a detector flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudType {
    HighAmountFraud,
    SuspiciousMerchant,
    InternationalLocationFraud,
}

impl FraudType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudType::HighAmountFraud => "HIGH_AMOUNT_FRAUD",
            FraudType::SuspiciousMerchant => "SUSPICIOUS_MERCHANT",
            FraudType::InternationalLocationFraud => "INTERNATIONAL_LOCATION_FRAUD",
        }
    }
}

impl fmt::Display for FraudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from a 0-100 score and thresholds
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Configurable risk level thresholds on the 0-100 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            low: 30.0,
            medium: 50.0,
            high: 70.0,
            critical: 90.0,
        }
    }
}

/// Fraud alert emitted once per (transaction, matching detector) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique alert identifier (`alert_<epoch_millis>_<suffix>`)
    pub alert_id: String,

    /// Originating transaction ID
    pub transaction_id: String,

    /// User the transaction belongs to
    pub user_id: String,

    /// Which rule fired
    pub fraud_type: FraudType,

    /// Detector-specific risk score (0 - 100)
    pub risk_score: f64,

    /// Human-readable explanation referencing the transaction values
    pub reason: String,

    /// Transaction event time, epoch milliseconds
    pub timestamp: i64,

    /// Full copy of the transaction for audit
    pub original_transaction: Transaction,
}

impl FraudAlert {
    /// Classify this alert's score
    pub fn risk_level(&self, thresholds: &RiskLevelThresholds) -> RiskLevel {
        RiskLevel::from_score(self.risk_score, thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(10.0, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(50.0, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(80.0, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100.0, &thresholds), RiskLevel::Critical);
    }

    #[test]
    fn test_fraud_type_tags() {
        assert_eq!(
            serde_json::to_string(&FraudType::HighAmountFraud).unwrap(),
            "\"HIGH_AMOUNT_FRAUD\""
        );
        assert_eq!(
            serde_json::to_string(&FraudType::SuspiciousMerchant).unwrap(),
            "\"SUSPICIOUS_MERCHANT\""
        );
        assert_eq!(
            serde_json::to_string(&FraudType::InternationalLocationFraud).unwrap(),
            "\"INTERNATIONAL_LOCATION_FRAUD\""
        );
        assert_eq!(
            FraudType::InternationalLocationFraud.to_string(),
            "INTERNATIONAL_LOCATION_FRAUD"
        );
    }

    #[test]
    fn test_fraud_alert_serialization() {
        let tx = Transaction::new(
            "txn_1_1",
            "user_0001",
            80.0,
            "Shell",
            "gas",
            1_700_000_000_000,
            "International",
        );
        let alert = FraudAlert {
            alert_id: "alert_1_1".to_string(),
            transaction_id: tx.transaction_id.clone(),
            user_id: tx.user_id.clone(),
            fraud_type: FraudType::InternationalLocationFraud,
            risk_score: 80.0,
            reason: "International transaction from: International".to_string(),
            timestamp: tx.timestamp,
            original_transaction: tx,
        };

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["fraud_type"], "INTERNATIONAL_LOCATION_FRAUD");
        assert_eq!(json["original_transaction"]["merchant"], "Shell");

        let deserialized: FraudAlert = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, alert);
        assert_eq!(alert.risk_level(&RiskLevelThresholds::default()), RiskLevel::High);
    }
}
