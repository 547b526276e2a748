//! Name resolution of cluster objects
//!
//! [`ResourceDirectory`] answers "which node/group/resource is called X"
//! against the live cluster. Nothing is cached: failover can change the
//! answer between two calls.

use std::sync::Arc;

use crate::error::{ClusError, Result};
use crate::group::{vm_group_name, Group};
use crate::node::Node;
use crate::resource::{vm_resource_name, Resource};
use crate::service::{ClusterService, ObjectClass, ResourceClass, ResourceGroupClass};

#[derive(Clone)]
pub struct ResourceDirectory {
    service: Arc<dyn ClusterService>,
}

impl ResourceDirectory {
    pub fn new(service: Arc<dyn ClusterService>) -> Self {
        ResourceDirectory { service }
    }

    /// Returns the cluster service this directory queries
    pub fn service(&self) -> &dyn ClusterService {
        self.service.as_ref()
    }

    /// All member nodes of the cluster.
    pub fn list_cluster_nodes(&self) -> Result<Vec<Node>> {
        self.service.nodes()
    }

    /// Resource groups holding a virtual machine. Groups of another type, or
    /// without a type, are skipped.
    pub fn list_vm_groups(&self) -> Result<Vec<Group>> {
        let groups = self.service.groups()?;
        Ok(groups.into_iter().filter(Group::is_vm_group).collect())
    }

    /// Exact-name lookup within an object class.
    ///
    /// Returns `Ok(None)` when nothing matches and
    /// [`ClusError::DuplicateResource`] when more than one object matches.
    pub fn lookup_by_name<C: ObjectClass>(&self, name: &str) -> Result<Option<C::Object>> {
        let mut found = C::query(self.service.as_ref(), name)?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => {
                tracing::error!("{} objects of class {} are named {}", n, C::CLASS, name);
                Err(ClusError::DuplicateResource(name.to_string()))
            }
        }
    }

    pub fn lookup_vm_group(&self, vm_name: &str) -> Result<Option<Group>> {
        self.lookup_by_name::<ResourceGroupClass>(&vm_group_name(vm_name))
    }

    /// Like [`lookup_vm_group`](Self::lookup_vm_group), failing with
    /// [`ClusError::NotFound`] when the VM has no group.
    pub fn lookup_vm_group_check(&self, vm_name: &str) -> Result<Group> {
        self.lookup_vm_group(vm_name)?
            .ok_or_else(|| ClusError::NotFound(format!("VM not found: {}", vm_name)))
    }

    pub fn lookup_vm(&self, vm_name: &str) -> Result<Option<Resource>> {
        self.lookup_by_name::<ResourceClass>(&vm_resource_name(vm_name))
    }

    pub fn lookup_vm_check(&self, vm_name: &str) -> Result<Resource> {
        self.lookup_vm(vm_name)?
            .ok_or_else(|| ClusError::NotFound(format!("VM not found: {}", vm_name)))
    }
}
