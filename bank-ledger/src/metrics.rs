//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_transfers_total` - Committed transfers
//! - `ledger_transfers_rejected_total{reason}` - Rejected transfers by error kind
//! - `ledger_accounts` - Registered accounts
//! - `ledger_transfer_amount` - Histogram of transferred principal
//!
//! Each collector owns its registry, so several ledgers can live in one process.

use crate::Result;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Committed transfers
    pub transfers_total: IntCounter,

    /// Rejected transfers, labelled by error kind
    pub transfers_rejected: IntCounterVec,

    /// Registered accounts
    pub accounts: IntGauge,

    /// Principal histogram
    pub transfer_amount: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl LedgerMetrics {
    /// Create new metrics collector
    ///
    /// Registry failures surface as `Error::Metrics`.
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let transfers_total =
            IntCounter::new("ledger_transfers_total", "Total number of committed transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let transfers_rejected = IntCounterVec::new(
            Opts::new(
                "ledger_transfers_rejected_total",
                "Total number of rejected transfers",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(transfers_rejected.clone()))?;

        let accounts = IntGauge::new("ledger_accounts", "Number of registered accounts")?;
        registry.register(Box::new(accounts.clone()))?;

        let transfer_amount = Histogram::with_opts(
            HistogramOpts::new("ledger_transfer_amount", "Histogram of transferred principal")
                .buckets(vec![10.0, 50.0, 100.0, 500.0, 1_000.0, 5_000.0, 10_000.0, 100_000.0]),
        )?;
        registry.register(Box::new(transfer_amount.clone()))?;

        Ok(Self {
            transfers_total,
            transfers_rejected,
            accounts,
            transfer_amount,
            registry,
        })
    }

    /// Record committed transfer
    pub fn record_transfer(&self, amount: Decimal) {
        self.transfers_total.inc();
        self.transfer_amount.observe(amount.to_f64().unwrap_or(0.0));
    }

    /// Record rejected transfer
    pub fn record_rejection(&self, reason: &str) {
        self.transfers_rejected.with_label_values(&[reason]).inc();
    }

    /// Update registered account count
    pub fn set_accounts(&self, count: usize) {
        self.accounts.set(count as i64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for LedgerMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerMetrics")
            .field("transfers_total", &self.transfers_total.get())
            .field("accounts", &self.accounts.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = LedgerMetrics::new().unwrap();
        assert_eq!(metrics.transfers_total.get(), 0);
        assert_eq!(metrics.accounts.get(), 0);

        // Independent registries do not clash
        assert!(LedgerMetrics::new().is_ok());
    }

    #[test]
    fn test_record_transfer() {
        let metrics = LedgerMetrics::new().unwrap();
        metrics.record_transfer(Decimal::from(100));
        metrics.record_transfer(Decimal::from(50));
        assert_eq!(metrics.transfers_total.get(), 2);
        assert_eq!(metrics.transfer_amount.get_sample_count(), 2);
    }

    #[test]
    fn test_record_rejection() {
        let metrics = LedgerMetrics::new().unwrap();
        metrics.record_rejection("insufficient_funds");
        metrics.record_rejection("insufficient_funds");
        metrics.record_rejection("account_not_found");

        assert_eq!(
            metrics
                .transfers_rejected
                .with_label_values(&["insufficient_funds"])
                .get(),
            2
        );
        assert_eq!(metrics.registry().gather().len(), 4);
    }

    #[test]
    fn test_registry_failure_maps_to_metrics_error() {
        let metrics = LedgerMetrics::new().unwrap();
        let result: Result<()> = metrics
            .registry()
            .register(Box::new(metrics.accounts.clone()))
            .map_err(Into::into);
        assert!(matches!(result, Err(crate::Error::Metrics(_))));
    }
}
