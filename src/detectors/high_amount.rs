//! Flags transactions above a fixed amount threshold

use super::{Detector, DetectorMatch};
use crate::types::alert::FraudType;
use crate::types::transaction::Transaction;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: f64 = 3000.0;

/// Maps the excess over the threshold to a risk score.
///
/// `score = base_score + (amount - threshold) / dollars_per_point`, clamped to
/// `[base_score, max_score]` and never above 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCurve {
    pub base_score: f64,
    pub dollars_per_point: f64,
    pub max_score: f64,
}

impl RiskCurve {
    pub fn score(&self, amount: f64, threshold: f64) -> f64 {
        let raw = self.base_score + (amount - threshold) / self.dollars_per_point;
        raw.min(self.max_score).max(self.base_score).clamp(0.0, 100.0)
    }
}

impl Default for RiskCurve {
    fn default() -> Self {
        Self {
            base_score: 70.0,
            dollars_per_point: 100.0,
            max_score: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighAmountDetector {
    threshold: f64,
    curve: RiskCurve,
}

impl HighAmountDetector {
    pub fn new(threshold: f64) -> Self {
        Self::with_curve(threshold, RiskCurve::default())
    }

    pub fn with_curve(threshold: f64, curve: RiskCurve) -> Self {
        Self { threshold, curve }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for HighAmountDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Detector for HighAmountDetector {
    fn name(&self) -> &'static str {
        "high_amount"
    }

    fn evaluate(&self, transaction: &Transaction) -> Option<DetectorMatch> {
        if transaction.amount <= self.threshold {
            return None;
        }

        Some(DetectorMatch {
            fraud_type: FraudType::HighAmountFraud,
            risk_score: self.curve.score(transaction.amount, self.threshold),
            reason: format!(
                "Transaction amount ${:.2} exceeds normal limits",
                transaction.amount
            ),
        })
    }
}
