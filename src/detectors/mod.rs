//! Rule-based fraud detectors
//!
//! Every detector is a pure function of a single transaction. Detectors share
//! no state, so they can run in any order or in parallel and always produce
//! the same set of matches.

pub mod high_amount;
pub mod international_location;
pub mod suspicious_merchant;

pub use high_amount::{HighAmountDetector, RiskCurve};
pub use international_location::InternationalLocationDetector;
pub use suspicious_merchant::SuspiciousMerchantDetector;

use crate::config::DetectionConfig;
use crate::types::alert::FraudType;
use crate::types::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Outcome of a detector that flagged a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorMatch {
    pub fraud_type: FraudType,
    /// 0 - 100
    pub risk_score: f64,
    pub reason: String,
}

/// A fraud rule evaluated against one transaction at a time.
///
/// Implementations must be side-effect free and must not block.
pub trait Detector: Send + Sync {
    /// Stable name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Return a match when the transaction violates the rule.
    fn evaluate(&self, transaction: &Transaction) -> Option<DetectorMatch>;
}

/// The built-in detector variants, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    HighAmount,
    SuspiciousMerchant,
    InternationalLocation,
}

impl DetectorKind {
    /// Build the detector for this kind from detection settings.
    pub fn build(&self, config: &DetectionConfig) -> Box<dyn Detector> {
        match self {
            DetectorKind::HighAmount => Box::new(HighAmountDetector::with_curve(
                config.high_amount_threshold,
                config.risk_curve.clone(),
            )),
            DetectorKind::SuspiciousMerchant => Box::new(SuspiciousMerchantDetector::new(
                config.suspicious_merchants.iter().cloned(),
            )),
            DetectorKind::InternationalLocation => Box::new(InternationalLocationDetector::new(
                config.domestic_locations.iter().cloned(),
            )),
        }
    }

    /// The fraud type this kind of detector reports
    pub fn fraud_type(&self) -> FraudType {
        match self {
            DetectorKind::HighAmount => FraudType::HighAmountFraud,
            DetectorKind::SuspiciousMerchant => FraudType::SuspiciousMerchant,
            DetectorKind::InternationalLocation => FraudType::InternationalLocationFraud,
        }
    }
}

/// Build the configured detectors in their configured order.
pub fn build_detectors(config: &DetectionConfig) -> Vec<Box<dyn Detector>> {
    config.detectors.iter().map(|kind| kind.build(config)).collect()
}
