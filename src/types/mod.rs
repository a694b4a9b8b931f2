//! Type definitions for the fraud rules pipeline

pub mod alert;
pub mod id;
pub mod transaction;

pub use alert::{FraudAlert, FraudType, RiskLevel, RiskLevelThresholds};
pub use id::{IdGenerator, RandomIds, SequentialIds};
pub use transaction::Transaction;
