//! Identifier generation strategies for transactions and alerts

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces `<prefix>_<epoch_millis>_<suffix>` identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Wall clock plus a random uuid fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self, prefix: &str) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..12])
    }
}

/// Fixed epoch and a counter. Reproducible ids for tests and replays.
#[derive(Debug)]
pub struct SequentialIds {
    epoch_millis: i64,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(epoch_millis: i64) -> Self {
        Self {
            epoch_millis,
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{:04}", prefix, self.epoch_millis, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_format() {
        let id = RandomIds.next_id("alert");
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "alert");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 12);
        assert_ne!(id, RandomIds.next_id("alert"));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new(1_700_000_000_000);
        assert_eq!(ids.next_id("txn"), "txn_1700000000000_0001");
        assert_eq!(ids.next_id("alert"), "alert_1700000000000_0002");
    }
}
