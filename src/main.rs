//! Fraud Rules Pipeline - Main Entry Point
//!
//! Pulls transactions from the synthetic generator or NATS, evaluates every
//! configured detector, and delivers fraud alerts to the console or NATS.

use anyhow::{Context, Result};
use fraud_rules_pipeline::{
    config::{AppConfig, LoggingConfig, SinkKind, SourceKind},
    consumer::TransactionConsumer,
    generator::TransactionGenerator,
    metrics::MetricsReporter,
    pipeline::Pipeline,
    producer::AlertProducer,
    sink::{AlertSink, ConsoleSink},
    PipelineError, Transaction,
};
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Fraud Rules Pipeline");
    info!(
        "High amount threshold: {:.2}, detectors: {:?}",
        config.detection.high_amount_threshold, config.detection.detectors
    );

    let pipeline = Pipeline::from_config(&config);
    let metrics = pipeline.metrics();

    // NATS is only needed when either end of the pipeline uses it
    let nats = if config.source.kind == SourceKind::Nats || config.sink.kind == SinkKind::Nats {
        let client = async_nats::connect(&config.nats.url)
            .await
            .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
        info!("Connected to NATS at {}", config.nats.url);
        Some(client)
    } else {
        None
    };

    let source: BoxStream<'static, Result<Transaction, PipelineError>> = match (config.source.kind, &nats) {
        (SourceKind::Nats, Some(client)) => {
            let consumer = TransactionConsumer::new(client.clone(), &config.nats.transaction_subject);
            consumer.transactions().await?.boxed()
        }
        _ => {
            let generator = TransactionGenerator::from_config(&config.generator);
            info!(
                users = generator.user_count(),
                fraud_probability = config.generator.fraud_probability,
                transactions = ?config.generator.transactions,
                "Generating synthetic transactions"
            );
            let pace = (config.generator.interval_ms > 0)
                .then(|| Duration::from_millis(config.generator.interval_ms));
            generator.into_stream(config.generator.transactions, pace)
        }
    };

    let sink: Box<dyn AlertSink> = match (config.sink.kind, &nats) {
        (SinkKind::Nats, Some(client)) => {
            info!("Publishing alerts to: {}", config.nats.alert_subject);
            Box::new(AlertProducer::new(client.clone(), &config.nats.alert_subject))
        }
        _ => Box::new(ConsoleSink::new(
            config.sink.console_format,
            config.detection.risk_levels.clone(),
        )),
    };

    let reporter = MetricsReporter::new(metrics.clone(), config.pipeline.metrics_interval_secs);
    let reporter = tokio::spawn(reporter.start());

    let outcome = tokio::select! {
        result = pipeline.run(source, sink.as_ref()) => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            None
        }
    };
    reporter.abort();

    info!("Pipeline shutting down...");
    metrics.print_summary();

    match outcome {
        Some(Ok(summary)) => {
            info!(
                received = summary.transactions_received,
                rejected = summary.transactions_rejected,
                alerts = summary.alerts_delivered,
                detector_faults = summary.detector_faults,
                "Pipeline completed"
            );
            Ok(())
        }
        Some(Err(e)) => {
            for alert in e.undelivered_alerts() {
                error!(
                    alert_id = %alert.alert_id,
                    transaction_id = %alert.transaction_id,
                    "Alert left undelivered"
                );
            }
            Err(e.into())
        }
        None => Ok(()),
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("fraud_rules_pipeline={}", logging.level))
            .context("Invalid logging.level")?,
    };

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
