//! Cluster registration hooks around the VM lifecycle

use clus::Membership;

use crate::ops::Instance;

/// Keeps a VM's cluster registration in step with its lifecycle.
#[derive(Clone)]
pub struct ClusterHooks {
    membership: Membership,
}

impl ClusterHooks {
    pub fn new(membership: Membership) -> Self {
        ClusterHooks { membership }
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// Runs once the VM has been provisioned.
    pub fn instance_created(&self, instance: &Instance) -> clus::Result<()> {
        tracing::info!("Clustering instance {}", instance.name);
        self.membership.add_to_cluster(&instance.name)
    }

    /// Runs before the VM and its disks are torn down.
    pub fn instance_destroying(&self, instance: &Instance) -> clus::Result<()> {
        tracing::info!("Unclustering instance {}", instance.name);
        self.membership.remove_from_cluster(&instance.name)
    }

    /// Runs after destination-side setup of a live migration. VMs that
    /// arrived through a clustered move are already registered.
    pub fn arrived_at_destination(&self, instance: &Instance) -> clus::Result<()> {
        if self.membership.is_clustered(&instance.name)? {
            return Ok(());
        }
        tracing::info!("Clustering migrated instance {}", instance.name);
        self.membership.add_to_cluster(&instance.name)
    }
}
