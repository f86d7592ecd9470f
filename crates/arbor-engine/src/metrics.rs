//! Prometheus metrics for the ecosystem
//!
//! A plain registry plus named counters; embedders gather and expose it
//! however they serve metrics. Amounts are reported in whole tokens.

use arbor_core::Amount;
use prometheus::{Counter, Gauge, IntCounter, Registry};

/// One token in base units, as f64 for metric scaling
const ONE: f64 = 1e18;

/// Ecosystem metrics bundle
pub struct EcosystemMetrics {
    registry: Registry,

    transfers_total: IntCounter,
    tax_collected_total: Counter,
    licenses_activated_total: IntCounter,
    rewards_claimed_total: Counter,
    swaps_total: IntCounter,
    total_staked: Gauge,
}

impl EcosystemMetrics {
    /// Create and register all metrics
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let transfers_total =
            IntCounter::new("arbor_transfers_total", "Total token transfers")?;
        let tax_collected_total = Counter::new(
            "arbor_tax_collected_total",
            "Transfer tax collected, in whole tokens",
        )?;
        let licenses_activated_total =
            IntCounter::new("arbor_licenses_activated_total", "Licenses activated")?;
        let rewards_claimed_total = Counter::new(
            "arbor_rewards_claimed_total",
            "Farm rewards claimed, in whole tokens",
        )?;
        let swaps_total = IntCounter::new("arbor_swaps_total", "Bridge swaps executed")?;
        let total_staked =
            Gauge::new("arbor_total_staked", "ARBR staked in the farm, in whole tokens")?;

        registry.register(Box::new(transfers_total.clone()))?;
        registry.register(Box::new(tax_collected_total.clone()))?;
        registry.register(Box::new(licenses_activated_total.clone()))?;
        registry.register(Box::new(rewards_claimed_total.clone()))?;
        registry.register(Box::new(swaps_total.clone()))?;
        registry.register(Box::new(total_staked.clone()))?;

        Ok(Self {
            registry,
            transfers_total,
            tax_collected_total,
            licenses_activated_total,
            rewards_claimed_total,
            swaps_total,
            total_staked,
        })
    }

    /// The underlying registry, for embedders that scrape
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transfer(&self, taxed: Amount) {
        self.transfers_total.inc();
        self.tax_collected_total.inc_by(taxed as f64 / ONE);
    }

    pub fn record_activation(&self) {
        self.licenses_activated_total.inc();
    }

    pub fn record_claim(&self, reward: Amount) {
        self.rewards_claimed_total.inc_by(reward as f64 / ONE);
    }

    pub fn record_swap(&self) {
        self.swaps_total.inc();
    }

    pub fn set_total_staked(&self, staked: Amount) {
        self.total_staked.set(staked as f64 / ONE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_and_gather() {
        let metrics = EcosystemMetrics::new().unwrap();
        metrics.record_transfer(5 * 10u128.pow(18));
        metrics.record_activation();
        metrics.set_total_staked(100 * 10u128.pow(18));

        let families = metrics.registry().gather();
        assert!(families.iter().any(|f| f.get_name() == "arbor_transfers_total"));
        assert!(families.iter().any(|f| f.get_name() == "arbor_total_staked"));
    }
}
