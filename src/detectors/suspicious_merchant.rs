use super::{Detector, DetectorMatch};
use crate::types::alert::FraudType;
use crate::types::transaction::Transaction;
use std::collections::HashSet;

pub const DEFAULT_SUSPICIOUS_MERCHANTS: &[&str] = &["Unknown_Merchant", "Suspicious_Store"];

const RISK_SCORE: f64 = 85.0;

/// Flags transactions from merchants on a deny list. Names match exactly.
#[derive(Debug, Clone)]
pub struct SuspiciousMerchantDetector {
    merchants: HashSet<String>,
}

impl SuspiciousMerchantDetector {
    pub fn new<I, S>(merchants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            merchants: merchants.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for SuspiciousMerchantDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPICIOUS_MERCHANTS.iter().copied())
    }
}

impl Detector for SuspiciousMerchantDetector {
    fn name(&self) -> &'static str {
        "suspicious_merchant"
    }

    fn evaluate(&self, transaction: &Transaction) -> Option<DetectorMatch> {
        if !self.merchants.contains(&transaction.merchant) {
            return None;
        }

        Some(DetectorMatch {
            fraud_type: FraudType::SuspiciousMerchant,
            risk_score: RISK_SCORE,
            reason: format!("Transaction from suspicious merchant: {}", transaction.merchant),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(merchant: &str) -> Transaction {
        Transaction::new(
            "txn_1700000000000_0002",
            "user_0002",
            50.0,
            merchant,
            "other",
            1_700_000_000_000,
            "Houston",
        )
    }

    #[test]
    fn test_matches_listed_merchants() {
        let detector = SuspiciousMerchantDetector::default();

        let m = detector.evaluate(&tx("Suspicious_Store")).unwrap();
        assert_eq!(m.fraud_type, FraudType::SuspiciousMerchant);
        assert_eq!(m.risk_score, 85.0);
        assert_eq!(m.reason, "Transaction from suspicious merchant: Suspicious_Store");

        assert!(detector.evaluate(&tx("Unknown_Merchant")).is_some());
    }

    #[test]
    fn test_ignores_other_merchants() {
        let detector = SuspiciousMerchantDetector::default();

        for merchant in ["Walmart", "Amazon", "unknown_merchant", "Unknown_Merchant "] {
            assert!(detector.evaluate(&tx(merchant)).is_none(), "{}", merchant);
        }
    }

    #[test]
    fn test_custom_list() {
        let detector = SuspiciousMerchantDetector::new(["Shady Pawn"]);

        assert!(detector.evaluate(&tx("Shady Pawn")).is_some());
        assert!(detector.evaluate(&tx("Unknown_Merchant")).is_none());
    }
}
