//! Failover cluster library for clustered Hyper-V VMs
//!
//! Resolves cluster nodes, VM resource groups and VM resources by name, and
//! manages a VM's membership in the cluster (registration, failback policy,
//! removal). All queries go to a [`ClusterService`] handle built by the
//! caller; nothing is cached between calls.

mod directory;
mod error;
mod group;
pub mod memory;
mod membership;
mod node;
mod resource;
mod service;

pub use directory::ResourceDirectory;
pub use error::{ClusError, Result};
pub use group::{vm_group_name, FailbackPolicy, FailbackType, Group, GroupState, VM_GROUP_TYPE};
pub use membership::Membership;
pub use memory::MemoryCluster;
pub use node::{Node, NodeState};
pub use resource::{vm_resource_name, Resource, ResourceState};
pub use service::{
    ClusterService, DestroyFlags, MigrationType, MoveFlags, ObjectClass, ResourceClass,
    ResourceGroupClass,
};
