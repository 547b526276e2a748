//! Cluster membership of Hyper-V VMs
//!
//! A VM is clustered when its VM resource exists. Registration creates the
//! VM's resource group and stamps the failback policy on it; removal tears
//! the group down.

use std::sync::Arc;

use crate::directory::ResourceDirectory;
use crate::error::Result;
use crate::group::FailbackPolicy;
use crate::service::{ClusterService, DestroyFlags};

#[derive(Clone)]
pub struct Membership {
    directory: ResourceDirectory,
    failback: FailbackPolicy,
}

impl Membership {
    /// Membership manager applying the durable failback policy.
    pub fn new(service: Arc<dyn ClusterService>) -> Self {
        Self::with_failback(service, FailbackPolicy::durable())
    }

    pub fn with_failback(service: Arc<dyn ClusterService>, failback: FailbackPolicy) -> Self {
        Membership {
            directory: ResourceDirectory::new(service),
            failback,
        }
    }

    pub fn directory(&self) -> &ResourceDirectory {
        &self.directory
    }

    pub fn failback_policy(&self) -> &FailbackPolicy {
        &self.failback
    }

    /// Name of the node this client is attached to.
    pub fn local_node_name(&self) -> Result<String> {
        self.directory.service().local_node()
    }

    pub fn node_names(&self) -> Result<Vec<String>> {
        let nodes = self.directory.list_cluster_nodes()?;
        Ok(nodes.iter().map(|n| n.name().to_string()).collect())
    }

    pub fn is_clustered(&self, vm_name: &str) -> Result<bool> {
        Ok(self.directory.lookup_vm(vm_name)?.is_some())
    }

    /// Node currently owning the VM's group.
    pub fn current_host(&self, vm_name: &str) -> Result<String> {
        let group = self.directory.lookup_vm_group_check(vm_name)?;
        Ok(group.owner_node)
    }

    /// Registers the VM with the cluster and applies the failback policy.
    ///
    /// Fails with `NotFound` when registration did not produce a group.
    pub fn add_to_cluster(&self, vm_name: &str) -> Result<()> {
        self.directory.service().add_virtual_machine(vm_name)?;

        let mut group = self.directory.lookup_vm_group_check(vm_name)?;
        group.apply_failback(&self.failback);
        self.directory.service().commit_group(&group)?;

        tracing::debug!(
            "VM {} clustered on {} with failback window {}-{}",
            vm_name,
            group.owner_node,
            self.failback.window_start,
            self.failback.window_end
        );
        Ok(())
    }

    /// Destroys the VM's group. A VM without a group is left alone.
    pub fn remove_from_cluster(&self, vm_name: &str) -> Result<()> {
        let Some(group) = self.directory.lookup_vm_group(vm_name)? else {
            tracing::debug!("VM {} is not clustered, nothing to remove", vm_name);
            return Ok(());
        };

        self.directory
            .service()
            .destroy_group(group.name(), DestroyFlags { force: true })?;
        tracing::debug!("Destroyed cluster group {}", group.name());
        Ok(())
    }
}
