use anyhow::Result;
use prometheus::{IntCounter, Registry};

/// Counters for state generation activity.
///
/// The core holds these as `Option<Arc<Metrics>>`; `None` disables
/// telemetry entirely.
#[derive(Debug)]
pub struct Metrics {
    pub hot_state_saved: IntCounter,
    pub hot_summary_saved: IntCounter,
    pub cold_state_saved: IntCounter,
    pub epoch_boundary_violations: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            hot_state_saved: IntCounter::new(
                "stategen_hot_state_saved_total",
                "Number of full states persisted on epoch boundaries",
            )?,

            hot_summary_saved: IntCounter::new(
                "stategen_hot_summary_saved_total",
                "Number of hot state summaries persisted",
            )?,

            cold_state_saved: IntCounter::new(
                "stategen_cold_state_saved_total",
                "Number of full states persisted on archival points",
            )?,

            epoch_boundary_violations: IntCounter::new(
                "stategen_epoch_boundary_violations_total",
                "Number of epoch boundary slots found holding more than one block root",
            )?,
        })
    }

    pub fn register_in(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.hot_state_saved.clone()))?;
        registry.register(Box::new(self.hot_summary_saved.clone()))?;
        registry.register(Box::new(self.cold_state_saved.clone()))?;
        registry.register(Box::new(self.epoch_boundary_violations.clone()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_in() -> Result<()> {
        let metrics = Metrics::new()?;
        let registry = Registry::new();

        metrics.register_in(&registry)?;
        metrics.hot_state_saved.inc();

        let families = registry.gather();

        assert_eq!(families.len(), 4);
        assert!(families
            .iter()
            .any(|family| family.get_name() == "stategen_hot_state_saved_total"));

        Ok(())
    }
}
