//! Cluster-aware VM operations for Hyper-V hosts in a failover cluster
//!
//! Provides:
//! - Live migration that picks between a clustered move, a classic
//!   migration out of the cluster, or nothing when failover already moved
//!   the VM
//! - Cluster registration hooks around VM creation, teardown and arrival
//!   after migration
//! - TOML configuration and tracing initialization

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod ops;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use clus::{ClusterService, Membership};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::Config;
pub use driver::{InstanceLifecycle, LiveMigrationDriver};
pub use engine::{DecisionEngine, Strategy};
pub use error::{Error, Result};
pub use executor::MigrationExecutor;
pub use hooks::ClusterHooks;
pub use ops::*;

// =============================================================================
// Tracing Initialization
// =============================================================================

/// Initialize tracing/logging with the given filter level
pub fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Wiring
// =============================================================================

/// Membership manager for `service` with the configured failback policy, or
/// `None` when cluster support is disabled.
pub fn cluster_membership(service: Arc<dyn ClusterService>, config: &Config) -> Option<Membership> {
    if !config.cluster.enabled {
        tracing::info!("Cluster support disabled, running as a standalone host");
        return None;
    }
    Some(Membership::with_failback(service, config.failback.policy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clus::MemoryCluster;

    #[test]
    fn test_cluster_membership_enabled() {
        let service = Arc::new(MemoryCluster::new("h1", &["h1"]));
        let config = Config::parse("[failback]\nwindow_start = 4").unwrap();

        let membership = cluster_membership(service, &config).expect("cluster enabled");
        assert_eq!(membership.failback_policy().window_start, 4);
        assert_eq!(membership.failback_policy().window_end, 23);
    }

    #[test]
    fn test_cluster_membership_disabled() {
        let service = Arc::new(MemoryCluster::new("h1", &["h1"]));
        let config = Config::parse("[cluster]\nenabled = false").unwrap();

        assert!(cluster_membership(service, &config).is_none());
    }
}
