//! Performance metrics and statistics tracking for the fraud rules pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

const PROCESSING_WINDOW: usize = 10_000;

/// Metrics collector for pipeline performance
pub struct PipelineMetrics {
    /// Transactions that went through the detectors
    pub transactions_processed: AtomicU64,
    /// Transactions rejected at ingestion
    pub transactions_rejected: AtomicU64,
    /// Alerts built
    pub alerts_generated: AtomicU64,
    /// Detector faults contained
    pub detector_faults: AtomicU64,
    alerts_by_type: RwLock<HashMap<String, u64>>,
    alerts_by_level: RwLock<HashMap<String, u64>>,
    faults_by_detector: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Alert risk scores, ten buckets of ten points
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            transactions_processed: AtomicU64::new(0),
            transactions_rejected: AtomicU64::new(0),
            alerts_generated: AtomicU64::new(0),
            detector_faults: AtomicU64::new(0),
            alerts_by_type: RwLock::new(HashMap::new()),
            alerts_by_level: RwLock::new(HashMap::new()),
            faults_by_detector: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record an evaluated transaction
    pub fn record_transaction(&self, processing_time: Duration) {
        self.transactions_processed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > PROCESSING_WINDOW {
                times.drain(0..PROCESSING_WINDOW / 2);
            }
        }
    }

    pub fn record_rejected(&self) {
        self.transactions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an alert by fraud type and risk level
    pub fn record_alert(&self, fraud_type: &str, risk_level: &str, risk_score: f64) {
        self.alerts_generated.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_type) = self.alerts_by_type.write() {
            *by_type.entry(fraud_type.to_string()).or_insert(0) += 1;
        }
        if let Ok(mut by_level) = self.alerts_by_level.write() {
            *by_level.entry(risk_level.to_string()).or_insert(0) += 1;
        }

        let bucket = (risk_score / 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    pub fn record_detector_fault(&self, detector: &str) {
        self.detector_faults.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut faults) = self.faults_by_detector.write() {
            *faults.entry(detector.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted: Vec<u64> = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Transactions per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or_default()
    }

    pub fn get_alerts_by_type(&self) -> HashMap<String, u64> {
        read_map(&self.alerts_by_type)
    }

    pub fn get_alerts_by_level(&self) -> HashMap<String, u64> {
        read_map(&self.alerts_by_level)
    }

    pub fn get_faults_by_detector(&self) -> HashMap<String, u64> {
        read_map(&self.faults_by_detector)
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let tx_count = self.transactions_processed.load(Ordering::Relaxed);
        let rejected = self.transactions_rejected.load(Ordering::Relaxed);
        let alert_count = self.alerts_generated.load(Ordering::Relaxed);
        let faults = self.detector_faults.load(Ordering::Relaxed);
        let alert_rate = if tx_count > 0 {
            (alert_count as f64 / tx_count as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             FRAUD RULES PIPELINE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Processed: {:>8}  │  Throughput: {:>6.1} tx/s ║",
            tx_count, throughput
        );
        info!(
            "║ Alerts Generated:       {:>8}  │  Alert Rate: {:>6.1}%     ║",
            alert_count, alert_rate
        );
        info!(
            "║ Rejected Transactions:  {:>8}  │  Detector Faults: {:>6} ║",
            rejected, faults
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Alerts by Fraud Type:                                        ║");
        for (fraud_type, count) in &self.get_alerts_by_type() {
            info!("║   {:30}: {:>6}", fraud_type, count);
        }
        info!("║ Alerts by Risk Level:                                        ║");
        for (level, count) in &self.get_alerts_by_level() {
            let pct = if alert_count > 0 {
                (*count as f64 / alert_count as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)", level, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Alert Risk Score Distribution:                               ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:>3}-{:<3}: {:>6} ({:>5.1}%) {}",
                i * 10,
                (i + 1) * 10,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        let faults_by_detector = self.get_faults_by_detector();
        if !faults_by_detector.is_empty() {
            info!("Detector faults:");
            for (detector, count) in &faults_by_detector {
                info!("  {}: {}", detector, count);
            }
        }
    }
}

fn read_map(map: &RwLock<HashMap<String, u64>>) -> HashMap<String, u64> {
    map.read().map(|m| m.clone()).unwrap_or_default()
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodically logs a metrics summary
pub struct MetricsReporter {
    metrics: Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
