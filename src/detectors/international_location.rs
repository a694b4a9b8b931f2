use super::{Detector, DetectorMatch};
use crate::types::alert::FraudType;
use crate::types::transaction::Transaction;
use std::collections::HashSet;

pub const DEFAULT_DOMESTIC_LOCATIONS: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
];

const RISK_SCORE: f64 = 80.0;

/// Flags any transaction whose location is not a known domestic token.
#[derive(Debug, Clone)]
pub struct InternationalLocationDetector {
    domestic: HashSet<String>,
}

impl InternationalLocationDetector {
    pub fn new<I, S>(domestic: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domestic: domestic.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for InternationalLocationDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOMESTIC_LOCATIONS.iter().copied())
    }
}

impl Detector for InternationalLocationDetector {
    fn name(&self) -> &'static str {
        "international_location"
    }

    fn evaluate(&self, transaction: &Transaction) -> Option<DetectorMatch> {
        if self.domestic.contains(&transaction.location) {
            return None;
        }

        Some(DetectorMatch {
            fraud_type: FraudType::InternationalLocationFraud,
            risk_score: RISK_SCORE,
            reason: format!("International transaction from: {}", transaction.location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(location: &str) -> Transaction {
        Transaction::new(
            "txn_1700000000000_0003",
            "user_0003",
            120.0,
            "Hilton",
            "travel",
            1_700_000_000_000,
            location,
        )
    }

    #[test]
    fn test_domestic_locations_pass() {
        let detector = InternationalLocationDetector::default();

        for city in DEFAULT_DOMESTIC_LOCATIONS {
            assert!(detector.evaluate(&tx(city)).is_none(), "{}", city);
        }
    }

    #[test]
    fn test_foreign_locations_match() {
        let detector = InternationalLocationDetector::default();

        for location in ["International", "London", "Lagos"] {
            let m = detector.evaluate(&tx(location)).unwrap();
            assert_eq!(m.fraud_type, FraudType::InternationalLocationFraud);
            assert_eq!(m.risk_score, 80.0);
            assert_eq!(m.reason, format!("International transaction from: {}", location));
        }
    }

    #[test]
    fn test_empty_domestic_set_flags_everything() {
        let detector = InternationalLocationDetector::new(Vec::<String>::new());
        assert!(detector.evaluate(&tx("New York")).is_some());
    }
}
