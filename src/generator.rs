//! Synthetic transaction generator
//!
//! Simulates a population of users with stable spending habits and injects
//! three shapes of fraud at a configurable rate: very large amounts, foreign
//! locations and a known bad merchant.

use crate::config::GeneratorConfig;
use crate::detectors::international_location::DEFAULT_DOMESTIC_LOCATIONS;
use crate::error::PipelineError;
use crate::types::id::{IdGenerator, RandomIds};
use crate::types::transaction::Transaction;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

const INTERNATIONAL: &str = "International";
const UNKNOWN_MERCHANT: &str = "Unknown_Merchant";

const CATEGORIES: &[(&str, &[&str])] = &[
    ("groceries", &["Walmart", "Target", "Kroger", "Safeway"]),
    ("electronics", &["BestBuy", "Apple Store", "Microsoft Store"]),
    ("gas", &["Shell", "Exxon", "Chevron", "BP"]),
    ("food", &["McDonalds", "Starbucks", "Subway", "Chipotle"]),
    ("travel", &["United Airlines", "Hilton", "Uber", "Airbnb"]),
    ("other", &["Amazon", UNKNOWN_MERCHANT]),
];

/// Fraud shape injected by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudPattern {
    HighAmount,
    UnusualLocation,
    UnusualMerchant,
}

#[derive(Debug, Clone)]
struct UserProfile {
    user_id: String,
    avg_amount: f64,
    primary_location: &'static str,
    favorite_categories: Vec<usize>,
}

/// Produces an endless sequence of plausible transactions
pub struct TransactionGenerator {
    rng: StdRng,
    users: Vec<UserProfile>,
    fraud_probability: f64,
    ids: Arc<dyn IdGenerator>,
}

impl TransactionGenerator {
    /// `num_users` must be at least 1. A seed makes the sequence reproducible
    /// apart from ids and timestamps.
    pub fn new(num_users: usize, fraud_probability: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let category_indices: Vec<usize> = (0..CATEGORIES.len()).collect();
        let users = (1..=num_users.max(1))
            .map(|i| UserProfile {
                user_id: format!("user_{:04}", i),
                avg_amount: rng.gen_range(20.0..200.0),
                primary_location: *pick(&mut rng, DEFAULT_DOMESTIC_LOCATIONS),
                favorite_categories: category_indices
                    .choose_multiple(&mut rng, 3)
                    .copied()
                    .collect(),
            })
            .collect();

        Self {
            rng,
            users,
            fraud_probability: if fraud_probability.is_finite() {
                fraud_probability.clamp(0.0, 1.0)
            } else {
                0.0
            },
            ids: Arc::new(RandomIds),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.num_users, config.fraud_probability, config.seed)
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Generate a single transaction
    pub fn generate(&mut self) -> Transaction {
        if self.rng.gen_bool(self.fraud_probability) {
            let pattern = *pick(
                &mut self.rng,
                &[
                    FraudPattern::HighAmount,
                    FraudPattern::UnusualLocation,
                    FraudPattern::UnusualMerchant,
                ],
            );
            self.generate_fraud(pattern)
        } else {
            self.generate_legitimate()
        }
    }

    /// Generate `count` transactions stamped one second apart, starting now
    pub fn generate_batch(&mut self, count: usize) -> Vec<Transaction> {
        let start = Utc::now().timestamp_millis();
        (0..count)
            .map(|i| {
                let mut transaction = self.generate();
                transaction.timestamp = start + i as i64 * 1000;
                transaction
            })
            .collect()
    }

    /// Generate a transaction from a random user with its usual habits
    pub fn generate_legitimate(&mut self) -> Transaction {
        let user = self.random_user();
        let category = *pick(&mut self.rng, &user.favorite_categories);
        let (category_name, merchants) = CATEGORIES[category];
        let amount = cents(self.rng.gen_range(10.0..(user.avg_amount * 1.5).max(10.01)));
        let location = if self.rng.gen_bool(0.9) {
            user.primary_location
        } else {
            *pick(&mut self.rng, DEFAULT_DOMESTIC_LOCATIONS)
        };
        let merchant = pick(&mut self.rng, merchants);

        self.build(&user.user_id, amount, merchant, category_name, location)
    }

    /// Generate a transaction with the given fraud shape
    pub fn generate_fraud(&mut self, pattern: FraudPattern) -> Transaction {
        let user = self.random_user();

        match pattern {
            FraudPattern::HighAmount => {
                let (category, merchants) = *pick(&mut self.rng, CATEGORIES);
                let merchant = pick(&mut self.rng, merchants);
                let amount = cents(self.rng.gen_range(5000.0..15000.0));
                self.build(&user.user_id, amount, merchant, category, user.primary_location)
            }
            FraudPattern::UnusualLocation => {
                let category = *pick(&mut self.rng, &user.favorite_categories);
                let (category_name, merchants) = CATEGORIES[category];
                let merchant = pick(&mut self.rng, merchants);
                let amount = cents(self.rng.gen_range(100.0..500.0));
                self.build(&user.user_id, amount, merchant, category_name, INTERNATIONAL)
            }
            FraudPattern::UnusualMerchant => {
                let amount = cents(self.rng.gen_range(200.0..1000.0));
                self.build(
                    &user.user_id,
                    amount,
                    UNKNOWN_MERCHANT,
                    "other",
                    user.primary_location,
                )
            }
        }
    }

    /// Turn the generator into a transaction source.
    ///
    /// `limit = None` never ends. `pace` inserts a delay before each transaction.
    pub fn into_stream(
        self,
        limit: Option<u64>,
        pace: Option<Duration>,
    ) -> BoxStream<'static, Result<Transaction, PipelineError>> {
        let transactions = stream::unfold(self, move |mut generator| async move {
            if let Some(delay) = pace {
                tokio::time::sleep(delay).await;
            }
            let transaction = generator.generate();
            Some((Ok(transaction), generator))
        });

        match limit {
            Some(n) => transactions.take(n as usize).boxed(),
            None => transactions.boxed(),
        }
    }

    fn random_user(&mut self) -> UserProfile {
        pick(&mut self.rng, &self.users).clone()
    }

    fn build(
        &self,
        user_id: &str,
        amount: f64,
        merchant: &str,
        category: &str,
        location: &str,
    ) -> Transaction {
        Transaction::new(
            self.ids.next_id("txn"),
            user_id,
            amount,
            merchant,
            category,
            Utc::now().timestamp_millis(),
            location,
        )
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::detectors::build_detectors;
    use crate::types::alert::FraudType;

    fn matched_types(transaction: &Transaction) -> Vec<FraudType> {
        build_detectors(&DetectionConfig::default())
            .iter()
            .filter_map(|d| d.evaluate(transaction))
            .map(|m| m.fraud_type)
            .collect()
    }

    #[test]
    fn test_users_are_zero_padded() {
        let mut generator = TransactionGenerator::new(12, 0.0, Some(7));
        assert_eq!(generator.user_count(), 12);

        for _ in 0..50 {
            let tx = generator.generate();
            assert!(tx.user_id.starts_with("user_00"));
            assert_eq!(tx.user_id.len(), "user_0001".len());
        }
    }

    #[test]
    fn test_legitimate_transactions_are_valid_and_clean() {
        let mut generator = TransactionGenerator::new(20, 0.0, Some(1));

        for _ in 0..500 {
            let tx = generator.generate();
            assert!(tx.validate().is_ok());
            assert!(tx.transaction_id.starts_with("txn_"));
            assert!(tx.amount < 3000.0);
            assert_ne!(tx.location, INTERNATIONAL);
            assert_ne!(tx.merchant, "Suspicious_Store");
            assert_eq!(tx.amount, cents(tx.amount));
        }
    }

    #[test]
    fn test_fraud_patterns_trigger_matching_detectors() {
        let mut generator = TransactionGenerator::new(10, 0.0, Some(3));

        let high = generator.generate_fraud(FraudPattern::HighAmount);
        assert!(high.amount >= 5000.0);
        assert!(matched_types(&high).contains(&FraudType::HighAmountFraud));

        let foreign = generator.generate_fraud(FraudPattern::UnusualLocation);
        assert_eq!(foreign.location, INTERNATIONAL);
        assert!(matched_types(&foreign).contains(&FraudType::InternationalLocationFraud));

        let merchant = generator.generate_fraud(FraudPattern::UnusualMerchant);
        assert_eq!(merchant.category, "other");
        assert_eq!(matched_types(&merchant), vec![FraudType::SuspiciousMerchant]);
    }

    #[test]
    fn test_seed_reproduces_sequence() {
        let mut a = TransactionGenerator::new(50, 0.3, Some(99));
        let mut b = TransactionGenerator::new(50, 0.3, Some(99));

        for _ in 0..100 {
            let (x, y) = (a.generate(), b.generate());
            assert_eq!(
                (x.user_id, x.amount, x.merchant, x.location),
                (y.user_id, y.amount, y.merchant, y.location)
            );
        }
    }

    #[test]
    fn test_batch_is_spaced_one_second_apart() {
        let mut generator = TransactionGenerator::new(10, 0.2, Some(5));
        let batch = generator.generate_batch(5);

        assert_eq!(batch.len(), 5);
        for pair in batch.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, 1000);
        }
    }

    #[test]
    fn test_non_finite_fraud_probability_is_ignored() {
        let mut generator = TransactionGenerator::new(10, f64::NAN, Some(8));
        for _ in 0..200 {
            let tx = generator.generate();
            assert_ne!(tx.location, INTERNATIONAL);
            assert!(tx.amount < 3000.0);
        }

        let mut generator = TransactionGenerator::new(10, f64::INFINITY, Some(8));
        assert!(generator.generate().validate().is_ok());
    }

    #[tokio::test]
    async fn test_stream_respects_limit() {
        let generator = TransactionGenerator::new(5, 0.5, Some(11));
        let items: Vec<_> = generator.into_stream(Some(25), None).collect().await;

        assert_eq!(items.len(), 25);
        assert!(items.iter().all(|item| item.is_ok()));
    }

    #[tokio::test]
    async fn test_unbounded_stream_keeps_producing() {
        let generator = TransactionGenerator::new(5, 0.5, Some(12));
        let items: Vec<_> = generator.into_stream(None, None).take(1000).collect().await;
        assert_eq!(items.len(), 1000);
    }
}
