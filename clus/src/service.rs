//! Cluster service contract
//!
//! Everything this crate knows about the cluster goes through
//! [`ClusterService`]: association queries, exact-name queries by object
//! class and imperative commands on resource groups. A client is built once
//! and shared as `Arc<dyn ClusterService>`; implementations must accept
//! concurrent calls.

use crate::error::Result;
use crate::group::Group;
use crate::node::Node;
use crate::resource::Resource;

/// Options for moving a group to another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveFlags {
    /// Move even when resources of the group are locked.
    pub ignore_locked: bool,
}

/// Options for destroying a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DestroyFlags {
    /// Tear the group down even when its resources are locked or in use.
    pub force: bool,
}

/// Kind of VM migration requested with a group move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationType {
    Live,
    Other(u32),
}

impl MigrationType {
    const LIVE: u32 = 4;

    /// Parameter code passed to the move command.
    pub fn code(self) -> u32 {
        match self {
            MigrationType::Live => Self::LIVE,
            MigrationType::Other(code) => code,
        }
    }
}

impl From<u32> for MigrationType {
    fn from(code: u32) -> Self {
        match code {
            Self::LIVE => MigrationType::Live,
            code => MigrationType::Other(code),
        }
    }
}

/// Query and command interface of a failover cluster.
pub trait ClusterService: Send + Sync {
    /// Name of the node this client is attached to.
    fn local_node(&self) -> Result<String>;

    /// All member nodes of the cluster, in no particular order.
    fn nodes(&self) -> Result<Vec<Node>>;

    /// All resource groups of the cluster, whatever their type.
    fn groups(&self) -> Result<Vec<Group>>;

    /// Resource groups whose name is exactly `name`.
    fn query_groups(&self, name: &str) -> Result<Vec<Group>>;

    /// Resources whose name is exactly `name`.
    fn query_resources(&self, name: &str) -> Result<Vec<Resource>>;

    /// Registers an existing Hyper-V VM as a clustered role.
    fn add_virtual_machine(&self, vm_name: &str) -> Result<()>;

    /// Moves a group to `node`.
    fn move_group(
        &self,
        group: &str,
        node: &str,
        flags: MoveFlags,
        migration_type: MigrationType,
    ) -> Result<()>;

    /// Destroys a group together with its resources.
    fn destroy_group(&self, group: &str, flags: DestroyFlags) -> Result<()>;

    /// Writes all properties of `group` back in a single update.
    fn commit_group(&self, group: &Group) -> Result<()>;
}

/// A category of named cluster objects that can be queried by exact name.
pub trait ObjectClass {
    type Object;

    /// Class name as exposed by the cluster service.
    const CLASS: &'static str;

    fn query(service: &dyn ClusterService, name: &str) -> Result<Vec<Self::Object>>;
}

/// `MSCluster_ResourceGroup` objects.
pub struct ResourceGroupClass;

impl ObjectClass for ResourceGroupClass {
    type Object = Group;

    const CLASS: &'static str = "MSCluster_ResourceGroup";

    fn query(service: &dyn ClusterService, name: &str) -> Result<Vec<Group>> {
        service.query_groups(name)
    }
}

/// `MSCluster_Resource` objects.
pub struct ResourceClass;

impl ObjectClass for ResourceClass {
    type Object = Resource;

    const CLASS: &'static str = "MSCluster_Resource";

    fn query(service: &dyn ClusterService, name: &str) -> Result<Vec<Resource>> {
        service.query_resources(name)
    }
}
