//! Collaborators of the cluster layer
//!
//! The Hyper-V driver provides the non-clustered half of every operation:
//! VM provisioning and teardown, classic live migration, and the file copies
//! that precede a migration. This crate only calls them through the traits
//! below.

use std::path::PathBuf;

use crate::error::Result;

/// Request context handed back to the migration callbacks untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        RequestContext {
            request_id: request_id.into(),
        }
    }
}

/// The VM instance an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Hyper-V VM name, also the key of the VM's cluster objects.
    pub name: String,
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Instance { name: name.into() }
    }
}

/// Virtual NICs plugged into the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub vif_ids: Vec<String>,
}

/// Opaque migration data produced by the pre-migration checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrateData {
    pub shared_storage: bool,
}

/// Parameters of VM provisioning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSpec {
    pub network_info: NetworkInfo,
    pub root_vhd_path: Option<PathBuf>,
    pub ephemeral_vhd_path: Option<PathBuf>,
    pub generation: u8,
}

/// Parameters of VM teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroySpec {
    pub network_info: NetworkInfo,
    pub destroy_disks: bool,
}

/// Callback invoked after a migration attempt, with
/// `(context, instance, destination, block_migration)`.
pub type MigrationCallback<'a> = &'a dyn Fn(&RequestContext, &Instance, &str, bool);

/// Provisioning and teardown of a VM on this host.
pub trait VmOps: Send + Sync {
    fn create_instance(&self, instance: &Instance, spec: &CreateSpec) -> Result<()>;

    fn destroy(&self, instance: &Instance, spec: &DestroySpec) -> Result<()>;
}

/// Live migration without cluster coordination.
pub trait LiveMigrationOps: Send + Sync {
    /// Moves the VM to `dest`. Owns its own failure handling, including the
    /// calls to `post` and `recover`.
    #[allow(clippy::too_many_arguments)]
    fn live_migration(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        post: MigrationCallback<'_>,
        recover: MigrationCallback<'_>,
        block_migration: bool,
        migrate_data: Option<&MigrateData>,
    ) -> Result<()>;

    /// Destination-side setup once the VM has arrived.
    fn post_live_migration_at_destination(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        network_info: &NetworkInfo,
        block_migration: bool,
    ) -> Result<()>;
}

/// File copies that must succeed before a clustered move is issued.
pub trait MigrationPrerequisites: Send + Sync {
    fn copy_vm_dvd_disks(&self, vm_name: &str, dest: &str) -> Result<()>;

    fn copy_vm_console_logs(&self, vm_name: &str, dest: &str) -> Result<()>;
}
