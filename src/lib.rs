//! Fraud Rules Pipeline Library
//!
//! A streaming, rule-based payment fraud detection pipeline: transactions
//! flow from a source through a set of independent detectors, and every
//! match becomes a fraud alert delivered to a sink.

pub mod alert_factory;
pub mod config;
pub mod consumer;
pub mod detectors;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod pipeline;
pub mod producer;
pub mod sink;
pub mod types;

pub use alert_factory::AlertFactory;
pub use config::AppConfig;
pub use consumer::TransactionConsumer;
pub use detectors::{Detector, DetectorKind, DetectorMatch};
pub use error::PipelineError;
pub use generator::TransactionGenerator;
pub use pipeline::{Evaluation, Pipeline, RunSummary};
pub use producer::AlertProducer;
pub use sink::{AlertSink, ChannelSink, ConsoleSink, SinkError};
pub use types::{alert::FraudAlert, alert::FraudType, transaction::Transaction};
