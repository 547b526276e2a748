//! In-process cluster service
//!
//! [`MemoryCluster`] keeps nodes, groups and resources in memory and records
//! every command it receives. It backs the unit tests, the integration tests
//! and the examples. Failures of any operation can be scripted with
//! [`MemoryCluster::fail_next`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ClusError, Result};
use crate::group::{vm_group_name, Group, GroupState};
use crate::node::{Node, NodeState};
use crate::resource::Resource;
use crate::service::{ClusterService, DestroyFlags, MigrationType, MoveFlags};

/// A command received by the cluster, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddVirtualMachine {
        vm: String,
    },
    MoveGroup {
        group: String,
        node: String,
        ignore_locked: bool,
        migration_type: MigrationType,
    },
    DestroyGroup {
        group: String,
        force: bool,
    },
    CommitGroup {
        group: String,
    },
}

/// Operations whose next call can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    AddVirtualMachine,
    MoveGroup,
    DestroyGroup,
    CommitGroup,
}

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    groups: Vec<Group>,
    resources: Vec<Resource>,
    commands: Vec<Command>,
    faults: HashMap<Operation, ClusError>,
    ignore_registrations: bool,
}

impl State {
    fn take_fault(&mut self, op: Operation) -> Result<()> {
        match self.faults.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name() == name)
    }
}

pub struct MemoryCluster {
    local_node: String,
    state: Mutex<State>,
}

impl MemoryCluster {
    /// A cluster of `nodes`, all up, seen from `local_node`.
    pub fn new(local_node: &str, nodes: &[&str]) -> Self {
        let state = State {
            nodes: nodes.iter().map(|n| Node::new(*n, NodeState::Up)).collect(),
            ..State::default()
        };
        MemoryCluster {
            local_node: local_node.to_string(),
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_node_state(&self, name: &str, state: NodeState) {
        let mut st = self.state();
        if let Some(node) = st.nodes.iter_mut().find(|n| n.name() == name) {
            *node = Node::new(name, state);
        }
    }

    /// Adds a clustered VM (group and VM resource) owned by `owner`.
    pub fn insert_vm(&self, vm_name: &str, owner: &str) {
        let mut st = self.state();
        st.groups.push(Group::new_vm(vm_group_name(vm_name), owner));
        st.resources.push(Resource::new_vm(vm_name, owner));
    }

    /// Adds a group as-is, even when another group has the same name.
    pub fn insert_group(&self, group: Group) {
        self.state().groups.push(group);
    }

    pub fn insert_resource(&self, resource: Resource) {
        self.state().resources.push(resource);
    }

    pub fn remove_resource(&self, name: &str) {
        self.state().resources.retain(|r| r.name() != name);
    }

    /// Drops a group and its resources without recording a command, as an
    /// operator acting outside this client would.
    pub fn remove_group(&self, name: &str) {
        let mut st = self.state();
        st.groups.retain(|g| g.name() != name);
        st.resources.retain(|r| r.group != name);
    }

    /// Changes the owner of a group and its resources without recording a
    /// command, as an automatic failover would.
    pub fn fail_over(&self, group: &str, node: &str) {
        let mut st = self.state();
        for g in st.groups.iter_mut().filter(|g| g.name() == group) {
            g.owner_node = node.to_string();
        }
        for r in st.resources.iter_mut().filter(|r| r.group == group) {
            r.owner_node = node.to_string();
        }
    }

    /// Makes the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: Operation, err: ClusError) {
        self.state().faults.insert(op, err);
    }

    /// Accepts VM registrations without creating anything.
    pub fn ignore_registrations(&self) {
        self.state().ignore_registrations = true;
    }

    /// First group named `name`.
    pub fn group(&self, name: &str) -> Option<Group> {
        self.state().groups.iter().find(|g| g.name() == name).cloned()
    }

    /// Commands received so far.
    pub fn commands(&self) -> Vec<Command> {
        self.state().commands.clone()
    }

    pub fn commit_count(&self) -> usize {
        self.state()
            .commands
            .iter()
            .filter(|c| matches!(c, Command::CommitGroup { .. }))
            .count()
    }

    pub fn move_count(&self) -> usize {
        self.state()
            .commands
            .iter()
            .filter(|c| matches!(c, Command::MoveGroup { .. }))
            .count()
    }
}

impl ClusterService for MemoryCluster {
    fn local_node(&self) -> Result<String> {
        Ok(self.local_node.clone())
    }

    fn nodes(&self) -> Result<Vec<Node>> {
        let mut st = self.state();
        st.take_fault(Operation::Query)?;
        Ok(st.nodes.clone())
    }

    fn groups(&self) -> Result<Vec<Group>> {
        let mut st = self.state();
        st.take_fault(Operation::Query)?;
        Ok(st.groups.clone())
    }

    fn query_groups(&self, name: &str) -> Result<Vec<Group>> {
        let mut st = self.state();
        st.take_fault(Operation::Query)?;
        Ok(st.groups.iter().filter(|g| g.name() == name).cloned().collect())
    }

    fn query_resources(&self, name: &str) -> Result<Vec<Resource>> {
        let mut st = self.state();
        st.take_fault(Operation::Query)?;
        Ok(st
            .resources
            .iter()
            .filter(|r| r.name() == name)
            .cloned()
            .collect())
    }

    fn add_virtual_machine(&self, vm_name: &str) -> Result<()> {
        let mut st = self.state();
        st.commands.push(Command::AddVirtualMachine {
            vm: vm_name.to_string(),
        });
        st.take_fault(Operation::AddVirtualMachine)?;

        let group = vm_group_name(vm_name);
        if st.ignore_registrations || st.groups.iter().any(|g| g.name() == group) {
            return Ok(());
        }
        st.groups.push(Group::new_vm(group, self.local_node.as_str()));
        st.resources
            .push(Resource::new_vm(vm_name, self.local_node.as_str()));
        Ok(())
    }

    fn move_group(
        &self,
        group: &str,
        node: &str,
        flags: MoveFlags,
        migration_type: MigrationType,
    ) -> Result<()> {
        let mut st = self.state();
        st.commands.push(Command::MoveGroup {
            group: group.to_string(),
            node: node.to_string(),
            ignore_locked: flags.ignore_locked,
            migration_type,
        });
        st.take_fault(Operation::MoveGroup)?;

        if !st.has_node(node) {
            return Err(ClusError::OperationFailed(format!(
                "{} is not a member of the cluster",
                node
            )));
        }
        let mut moved = false;
        for g in st.groups.iter_mut().filter(|g| g.name() == group) {
            g.owner_node = node.to_string();
            g.state = GroupState::Online;
            moved = true;
        }
        if !moved {
            return Err(ClusError::NotFound(group.to_string()));
        }
        for r in st.resources.iter_mut().filter(|r| r.group == group) {
            r.owner_node = node.to_string();
        }
        Ok(())
    }

    fn destroy_group(&self, group: &str, flags: DestroyFlags) -> Result<()> {
        let mut st = self.state();
        st.commands.push(Command::DestroyGroup {
            group: group.to_string(),
            force: flags.force,
        });
        st.take_fault(Operation::DestroyGroup)?;

        if !st.groups.iter().any(|g| g.name() == group) {
            return Err(ClusError::NotFound(group.to_string()));
        }
        st.groups.retain(|g| g.name() != group);
        st.resources.retain(|r| r.group != group);
        Ok(())
    }

    fn commit_group(&self, group: &Group) -> Result<()> {
        let mut st = self.state();
        st.commands.push(Command::CommitGroup {
            group: group.name().to_string(),
        });
        st.take_fault(Operation::CommitGroup)?;

        match st.groups.iter_mut().find(|g| g.name() == group.name()) {
            Some(stored) => {
                *stored = group.clone();
                Ok(())
            }
            None => Err(ClusError::NotFound(group.name().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_creates_group_on_local_node() {
        let cluster = MemoryCluster::new("h2", &["h1", "h2"]);
        cluster.add_virtual_machine("vm1").unwrap();

        let group = cluster.group("vm1").unwrap();
        assert!(group.is_vm_group());
        assert_eq!(group.owner_node(), "h2");
        assert_eq!(cluster.query_resources("Virtual Machine vm1").unwrap().len(), 1);
    }

    #[test]
    fn test_move_to_non_member_fails() {
        let cluster = MemoryCluster::new("h1", &["h1", "h2"]);
        cluster.insert_vm("vm1", "h1");

        let err = cluster
            .move_group("vm1", "h9", MoveFlags::default(), MigrationType::Live)
            .unwrap_err();
        assert!(matches!(err, ClusError::OperationFailed(_)));
        assert_eq!(cluster.group("vm1").unwrap().owner_node(), "h1");
    }

    #[test]
    fn test_move_updates_group_and_resource_owner() {
        let cluster = MemoryCluster::new("h1", &["h1", "h2"]);
        cluster.insert_vm("vm1", "h1");

        cluster
            .move_group("vm1", "h2", MoveFlags { ignore_locked: true }, MigrationType::Live)
            .unwrap();

        assert_eq!(cluster.group("vm1").unwrap().owner_node(), "h2");
        let res = cluster.query_resources("Virtual Machine vm1").unwrap();
        assert_eq!(res[0].owner_node, "h2");
        assert_eq!(cluster.move_count(), 1);
    }

    #[test]
    fn test_fault_is_consumed_once() {
        let cluster = MemoryCluster::new("h1", &["h1"]);
        cluster.fail_next(Operation::Query, ClusError::ConnectionFailed("rpc".into()));

        assert!(cluster.nodes().is_err());
        assert!(cluster.nodes().is_ok());
    }

    #[test]
    fn test_fail_over_is_not_recorded() {
        let cluster = MemoryCluster::new("h1", &["h1", "h2"]);
        cluster.insert_vm("vm1", "h1");
        cluster.set_node_state("h1", NodeState::Down);

        cluster.fail_over("vm1", "h2");

        assert_eq!(cluster.group("vm1").unwrap().owner_node(), "h2");
        assert!(cluster.commands().is_empty());
        let h1 = cluster.nodes().unwrap().into_iter().find(|n| n.name() == "h1");
        assert_eq!(h1.unwrap().state(), NodeState::Down);
    }
}
