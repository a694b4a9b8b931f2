//! Configuration management for the fraud rules pipeline

use crate::detectors::high_amount::{RiskCurve, DEFAULT_THRESHOLD};
use crate::detectors::international_location::DEFAULT_DOMESTIC_LOCATIONS;
use crate::detectors::suspicious_merchant::DEFAULT_SUSPICIOUS_MERCHANTS;
use crate::detectors::DetectorKind;
use crate::sink::ConsoleFormat;
use crate::types::alert::RiskLevelThresholds;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "FRAUD_PIPELINE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub generator: GeneratorConfig,
    pub nats: NatsConfig,
    pub logging: LoggingConfig,
}

/// Detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Amounts strictly above this raise a high-amount alert
    pub high_amount_threshold: f64,
    /// Score policy for the high-amount detector
    #[serde(default)]
    pub risk_curve: RiskCurve,
    pub suspicious_merchants: Vec<String>,
    pub domestic_locations: Vec<String>,
    /// Enabled detectors, in evaluation order
    pub detectors: Vec<DetectorKind>,
    /// Risk level classification thresholds
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: DEFAULT_THRESHOLD,
            risk_curve: RiskCurve::default(),
            suspicious_merchants: to_strings(DEFAULT_SUSPICIOUS_MERCHANTS),
            domestic_locations: to_strings(DEFAULT_DOMESTIC_LOCATIONS),
            detectors: vec![
                DetectorKind::HighAmount,
                DetectorKind::SuspiciousMerchant,
                DetectorKind::InternationalLocation,
            ],
            risk_levels: RiskLevelThresholds::default(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Transactions evaluated concurrently. 1 keeps source order.
    pub workers: usize,
    /// Alert batches buffered between workers and the sink
    pub alert_buffer: usize,
    /// Seconds between metric summaries
    pub metrics_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Generator,
    Nats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Console,
    Nats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    #[serde(default)]
    pub console_format: ConsoleFormat,
}

/// Synthetic transaction generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub num_users: usize,
    pub fraud_probability: f64,
    /// Number of transactions to emit. Unset means run forever.
    #[serde(default)]
    pub transactions: Option<u64>,
    /// Delay between transactions in milliseconds
    #[serde(default)]
    pub interval_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// NATS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming transactions
    pub transaction_subject: String,
    /// Subject for outgoing fraud alerts
    pub alert_subject: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file (or `FRAUD_PIPELINE_CONFIG`)
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Layer defaults, an optional file, and `FRAUD__SECTION__KEY` environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("FRAUD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("detection.suspicious_merchants")
                    .with_list_parse_key("detection.domestic_locations")
                    .with_list_parse_key("detection.detectors"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !detection.high_amount_threshold.is_finite() || detection.high_amount_threshold < 0.0 {
            bail!(
                "detection.high_amount_threshold must be a non-negative number, got {}",
                detection.high_amount_threshold
            );
        }
        if detection.detectors.is_empty() {
            bail!("detection.detectors must enable at least one detector");
        }

        let curve = &detection.risk_curve;
        if !(curve.dollars_per_point > 0.0) {
            bail!("detection.risk_curve.dollars_per_point must be positive");
        }
        if curve.base_score < 0.0 || curve.base_score > curve.max_score || curve.max_score > 100.0 {
            bail!(
                "detection.risk_curve needs 0 <= base_score <= max_score <= 100, got {} and {}",
                curve.base_score,
                curve.max_score
            );
        }

        if self.pipeline.workers == 0 {
            bail!("pipeline.workers must be at least 1");
        }
        if self.pipeline.alert_buffer == 0 {
            bail!("pipeline.alert_buffer must be at least 1");
        }

        if self.generator.num_users == 0 {
            bail!("generator.num_users must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.generator.fraud_probability) {
            bail!(
                "generator.fraud_probability must be within [0, 1], got {}",
                self.generator.fraud_probability
            );
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            pipeline: PipelineConfig {
                workers: 4,
                alert_buffer: 256,
                metrics_interval_secs: 30,
            },
            source: SourceConfig {
                kind: SourceKind::Generator,
            },
            sink: SinkConfig {
                kind: SinkKind::Console,
                console_format: ConsoleFormat::Pretty,
            },
            generator: GeneratorConfig {
                num_users: 100,
                fraud_probability: 0.15,
                transactions: None,
                interval_ms: 0,
                seed: None,
            },
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                transaction_subject: "transactions".to_string(),
                alert_subject: "fraud.alerts".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
