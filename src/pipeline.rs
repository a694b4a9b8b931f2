//! Streaming evaluation: source -> detectors -> alert factory -> sink
//!
//! Each transaction is fanned out to every registered detector on a worker
//! task. A worker hands its alerts to a single delivery loop as one batch, so
//! one transaction's alerts reach the sink together and in detector
//! registration order. With one worker, transactions also keep source order.

use crate::alert_factory::AlertFactory;
use crate::config::AppConfig;
use crate::detectors::{build_detectors, Detector};
use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use crate::sink::{AlertSink, SinkError};
use crate::types::alert::{FraudAlert, RiskLevelThresholds};
use crate::types::transaction::Transaction;
use futures::{Stream, StreamExt};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_ALERT_BUFFER: usize = 256;

/// Result of running every detector against one transaction
#[derive(Debug, Default)]
pub struct Evaluation {
    /// One alert per matching detector, in registration order
    pub alerts: Vec<FraudAlert>,
    /// Contained detector failures (always `PipelineError::DetectorFault`)
    pub faults: Vec<PipelineError>,
}

/// Totals for one [`Pipeline::run`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub transactions_received: u64,
    pub transactions_evaluated: u64,
    pub transactions_rejected: u64,
    pub alerts_delivered: u64,
    pub detector_faults: u64,
}

#[derive(Clone)]
struct Evaluator {
    detectors: Vec<Arc<dyn Detector>>,
    factory: AlertFactory,
    metrics: Arc<PipelineMetrics>,
    risk_levels: RiskLevelThresholds,
}

impl Evaluator {
    fn evaluate(&self, transaction: &Transaction) -> Evaluation {
        let start = Instant::now();
        let mut evaluation = Evaluation::default();

        for detector in &self.detectors {
            match panic::catch_unwind(AssertUnwindSafe(|| detector.evaluate(transaction))) {
                Ok(Some(detection)) => {
                    let alert = self.factory.build(transaction, detection);
                    self.metrics.record_alert(
                        alert.fraud_type.as_str(),
                        alert.risk_level(&self.risk_levels).as_str(),
                        alert.risk_score,
                    );
                    evaluation.alerts.push(alert);
                }
                Ok(None) => {}
                Err(payload) => {
                    let fault = PipelineError::DetectorFault {
                        detector: detector.name().to_string(),
                        transaction_id: transaction.transaction_id.clone(),
                        message: panic_message(payload.as_ref()),
                    };
                    error!(
                        transaction_id = %transaction.transaction_id,
                        detector = detector.name(),
                        error = %fault,
                        "Detector fault, treating as no match"
                    );
                    self.metrics.record_detector_fault(detector.name());
                    evaluation.faults.push(fault);
                }
            }
        }

        self.metrics.record_transaction(start.elapsed());
        evaluation
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fraud detection pipeline over an ordered, open set of detectors
pub struct Pipeline {
    evaluator: Evaluator,
    workers: usize,
    alert_buffer: usize,
}

impl Pipeline {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self {
            evaluator: Evaluator {
                detectors: detectors.into_iter().map(Arc::from).collect(),
                factory: AlertFactory::new(),
                metrics: Arc::new(PipelineMetrics::new()),
                risk_levels: RiskLevelThresholds::default(),
            },
            workers: DEFAULT_WORKERS,
            alert_buffer: DEFAULT_ALERT_BUFFER,
        }
    }

    /// Build detectors, worker count and buffers from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(build_detectors(&config.detection))
            .with_risk_levels(config.detection.risk_levels.clone())
            .with_workers(config.pipeline.workers)
            .with_alert_buffer(config.pipeline.alert_buffer)
    }

    /// Concurrent transactions. 1 keeps strict source order.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Alert batches allowed to wait for the sink before workers block
    pub fn with_alert_buffer(mut self, alert_buffer: usize) -> Self {
        self.alert_buffer = alert_buffer.max(1);
        self
    }

    pub fn with_alert_factory(mut self, factory: AlertFactory) -> Self {
        self.evaluator.factory = factory;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.evaluator.metrics = metrics;
        self
    }

    pub fn with_risk_levels(mut self, risk_levels: RiskLevelThresholds) -> Self {
        self.evaluator.risk_levels = risk_levels;
        self
    }

    /// Register another detector after the existing ones
    pub fn add_detector<D: Detector + 'static>(mut self, detector: D) -> Self {
        self.evaluator.detectors.push(Arc::new(detector));
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.evaluator.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.evaluator.metrics.clone()
    }

    /// Run every detector against one transaction. Detector panics are
    /// contained and reported in [`Evaluation::faults`].
    pub fn evaluate(&self, transaction: &Transaction) -> Evaluation {
        self.evaluator.evaluate(transaction)
    }

    /// Consume `source` until it ends, delivering every alert to `sink`.
    ///
    /// Malformed input is logged and skipped. The first sink failure stops the
    /// run and is returned as [`PipelineError::SinkUnavailable`] with the
    /// refused alert and every alert already queued behind it. Workers still
    /// evaluating when the sink fails log the alerts they drop.
    pub async fn run<S, K>(&self, source: S, sink: &K) -> Result<RunSummary, PipelineError>
    where
        S: Stream<Item = Result<Transaction, PipelineError>> + Send,
        K: AlertSink + ?Sized,
    {
        let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<FraudAlert>>(self.alert_buffer);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let evaluated = Arc::new(AtomicU64::new(0));
        let faults = Arc::new(AtomicU64::new(0));
        let evaluator = Arc::new(self.evaluator.clone());
        let metrics = self.evaluator.metrics.clone();

        info!(
            workers = self.workers,
            detectors = ?self.detector_names(),
            "Starting transaction processing loop"
        );

        let dispatch = {
            let evaluated = evaluated.clone();
            let faults = faults.clone();
            async move {
                let mut received = 0u64;
                let mut rejected = 0u64;
                futures::pin_mut!(source);

                while let Some(item) = source.next().await {
                    received += 1;

                    let transaction = match item.and_then(|tx| tx.validate().map(|_| tx)) {
                        Ok(transaction) => transaction,
                        Err(e) => {
                            rejected += 1;
                            metrics.record_rejected();
                            warn!(error = %e, "Rejected transaction at ingestion");
                            continue;
                        }
                    };

                    // The semaphore is never closed
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };

                    let worker_evaluator = evaluator.clone();
                    let worker_tx = batch_tx.clone();
                    let worker_evaluated = evaluated.clone();
                    let worker_faults = faults.clone();

                    tokio::spawn(async move {
                        let evaluation = worker_evaluator.evaluate(&transaction);
                        worker_evaluated.fetch_add(1, Ordering::Relaxed);
                        worker_faults.fetch_add(evaluation.faults.len() as u64, Ordering::Relaxed);

                        if evaluation.alerts.is_empty() {
                            debug!(
                                transaction_id = %transaction.transaction_id,
                                "Transaction processed (no match)"
                            );
                        } else if let Err(mpsc::error::SendError(alerts)) =
                            worker_tx.send(evaluation.alerts).await
                        {
                            for alert in &alerts {
                                error!(
                                    alert_id = %alert.alert_id,
                                    transaction_id = %alert.transaction_id,
                                    "Alert delivery stopped, alert left undelivered"
                                );
                            }
                        }

                        drop(permit);
                    });

                    if received % 100 == 0 {
                        info!(
                            received,
                            throughput = format!("{:.1} tx/s", metrics.get_throughput()),
                            avg_latency_us = metrics.get_processing_stats().mean_us,
                            "Processing milestone"
                        );
                    }
                }

                // Workers hold their own senders; the delivery loop ends after the last one finishes.
                drop(batch_tx);
                Ok::<_, PipelineError>((received, rejected))
            }
        };

        let deliver = async move {
            let mut delivered = 0u64;
            while let Some(batch) = batch_rx.recv().await {
                let mut pending = batch.into_iter();
                while let Some(alert) = pending.next() {
                    let alert_id = alert.alert_id.clone();
                    let transaction_id = alert.transaction_id.clone();

                    if let Err(SinkError { alert, reason }) = sink.deliver(alert).await {
                        error!(
                            alert_id = %alert.alert_id,
                            transaction_id = %alert.transaction_id,
                            error = %reason,
                            "Failed to deliver fraud alert"
                        );

                        // Stop workers from queueing more, then collect what is already buffered
                        batch_rx.close();
                        let mut undelivered: Vec<FraudAlert> = pending.collect();
                        while let Some(batch) = batch_rx.recv().await {
                            undelivered.extend(batch);
                        }
                        for stranded in &undelivered {
                            error!(
                                alert_id = %stranded.alert_id,
                                transaction_id = %stranded.transaction_id,
                                "Alert left undelivered after sink failure"
                            );
                        }

                        return Err(PipelineError::SinkUnavailable {
                            alert: Box::new(alert),
                            undelivered,
                            reason,
                        });
                    }

                    delivered += 1;
                    debug!(alert_id = %alert_id, transaction_id = %transaction_id, "Fraud alert delivered");
                }
            }
            Ok(delivered)
        };

        let ((received, rejected), delivered) = tokio::try_join!(dispatch, deliver)?;

        let summary = RunSummary {
            transactions_received: received,
            transactions_evaluated: evaluated.load(Ordering::Relaxed),
            transactions_rejected: rejected,
            alerts_delivered: delivered,
            detector_faults: faults.load(Ordering::Relaxed),
        };
        info!(?summary, "Transaction source exhausted");
        Ok(summary)
    }
}
