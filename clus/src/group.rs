//! Cluster group (role) model
//!
//! A clustered Hyper-V VM is owned by a resource group of the VM type. The
//! group carries the owning node and the failback policy applied when the VM
//! is registered.

/// `GroupType` value of resource groups that hold a virtual machine.
pub const VM_GROUP_TYPE: u32 = 111;

/// Name of the resource group that owns `vm_name`.
///
/// Registering a VM with the cluster creates a group named after the VM.
pub fn vm_group_name(vm_name: &str) -> String {
    vm_name.to_string()
}

/// Group state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Online,
    Offline,
    Failed,
    PartialOnline,
    Pending,
    Unknown(u32),
}

/// Automatic failback setting of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailbackType {
    #[default]
    Disabled,
    Enabled,
}

/// Failback settings written to a VM group when it joins the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailbackPolicy {
    pub persistent_state: bool,
    pub auto_failback: FailbackType,
    /// First hour of the day (0-23) in which failback may happen.
    pub window_start: u8,
    /// Last hour of the day (0-23) in which failback may happen.
    pub window_end: u8,
}

impl FailbackPolicy {
    pub const WINDOW_MIN: u8 = 0;
    pub const WINDOW_MAX: u8 = 23;

    /// Persistent state, failback enabled, allowed during the whole day.
    pub fn durable() -> Self {
        FailbackPolicy {
            persistent_state: true,
            auto_failback: FailbackType::Enabled,
            window_start: Self::WINDOW_MIN,
            window_end: Self::WINDOW_MAX,
        }
    }
}

impl Default for FailbackPolicy {
    fn default() -> Self {
        Self::durable()
    }
}

/// Snapshot of a resource group (role) in a failover cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub owner_node: String,
    /// `None` when the cluster service did not report a group type.
    pub group_type: Option<u32>,
    pub state: GroupState,
    pub persistent_state: bool,
    pub auto_failback: FailbackType,
    pub failback_window_start: Option<u8>,
    pub failback_window_end: Option<u8>,
}

impl Group {
    /// A freshly registered VM group owned by `owner_node`, with no failback
    /// settings.
    pub fn new_vm(name: impl Into<String>, owner_node: impl Into<String>) -> Self {
        Group {
            name: name.into(),
            owner_node: owner_node.into(),
            group_type: Some(VM_GROUP_TYPE),
            state: GroupState::Online,
            persistent_state: false,
            auto_failback: FailbackType::Disabled,
            failback_window_start: None,
            failback_window_end: None,
        }
    }

    /// Returns the group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node currently owning the group
    pub fn owner_node(&self) -> &str {
        &self.owner_node
    }

    pub fn is_vm_group(&self) -> bool {
        self.group_type == Some(VM_GROUP_TYPE)
    }

    /// Overwrites the failback fields with `policy`. The change is local
    /// until committed through the cluster service.
    pub fn apply_failback(&mut self, policy: &FailbackPolicy) {
        self.persistent_state = policy.persistent_state;
        self.auto_failback = policy.auto_failback;
        self.failback_window_start = Some(policy.window_start);
        self.failback_window_end = Some(policy.window_end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_group_type_filter() {
        let mut group = Group::new_vm("vm1", "h1");
        assert!(group.is_vm_group());

        group.group_type = Some(2);
        assert!(!group.is_vm_group());

        group.group_type = None;
        assert!(!group.is_vm_group());
    }

    #[test]
    fn test_apply_durable_failback() {
        let mut group = Group::new_vm("vm1", "h1");
        group.apply_failback(&FailbackPolicy::durable());

        assert!(group.persistent_state);
        assert_eq!(group.auto_failback, FailbackType::Enabled);
        assert_eq!(group.failback_window_start, Some(0));
        assert_eq!(group.failback_window_end, Some(23));
    }

    #[test]
    fn test_group_name_matches_vm_name() {
        assert_eq!(vm_group_name("instance-0001"), "instance-0001");
    }
}
