//! Cluster resource model

/// Name of the clustered resource that represents a running VM.
pub fn vm_resource_name(vm_name: &str) -> String {
    format!("Virtual Machine {}", vm_name)
}

/// Resource state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Online,
    Offline,
    Failed,
    OnlinePending,
    OfflinePending,
    Unknown(u32),
}

/// Snapshot of a resource in a failover cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    /// Group owning the resource
    pub group: String,
    pub owner_node: String,
    pub state: ResourceState,
}

impl Resource {
    /// The VM resource created alongside the group of `vm_name`.
    pub fn new_vm(vm_name: &str, owner_node: impl Into<String>) -> Self {
        Resource {
            name: vm_resource_name(vm_name),
            group: crate::group::vm_group_name(vm_name),
            owner_node: owner_node.into(),
            state: ResourceState::Online,
        }
    }

    /// Returns the resource name
    pub fn name(&self) -> &str {
        &self.name
    }
}
