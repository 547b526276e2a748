//! Recording doubles for the driver collaborators, shared by the unit tests.

use std::sync::{Arc, Mutex};

use clus::MemoryCluster;

use crate::error::{Error, Result};
use crate::ops::{
    CreateSpec, DestroySpec, Instance, LiveMigrationOps, MigrateData, MigrationCallback,
    MigrationPrerequisites, NetworkInfo, RequestContext, VmOps,
};

type CallbackCall = (String, String, bool);

/// Records post and recover callback invocations.
#[derive(Default)]
pub struct CallbackLog {
    posts: Mutex<Vec<CallbackCall>>,
    recovers: Mutex<Vec<CallbackCall>>,
}

impl CallbackLog {
    pub fn post(&self) -> impl Fn(&RequestContext, &Instance, &str, bool) + '_ {
        move |_ctx, instance, dest, block| {
            self.posts
                .lock()
                .unwrap()
                .push((instance.name.clone(), dest.to_string(), block));
        }
    }

    pub fn recover(&self) -> impl Fn(&RequestContext, &Instance, &str, bool) + '_ {
        move |_ctx, instance, dest, block| {
            self.recovers
                .lock()
                .unwrap()
                .push((instance.name.clone(), dest.to_string(), block));
        }
    }

    pub fn posts(&self) -> Vec<CallbackCall> {
        self.posts.lock().unwrap().clone()
    }

    pub fn recovers(&self) -> Vec<CallbackCall> {
        self.recovers.lock().unwrap().clone()
    }
}

/// A classic live migration call, with whether the VM was still clustered
/// when the call arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicCall {
    pub instance: String,
    pub dest: String,
    pub block_migration: bool,
    pub migrate_data: Option<MigrateData>,
    pub still_clustered: bool,
}

/// Classic live migration that only records its calls.
pub struct FakeLiveMigration {
    cluster: Arc<MemoryCluster>,
    pub calls: Mutex<Vec<ClassicCall>>,
    pub arrivals: Mutex<Vec<String>>,
    pub fail_arrival: bool,
}

impl FakeLiveMigration {
    pub fn new(cluster: Arc<MemoryCluster>) -> Self {
        FakeLiveMigration {
            cluster,
            calls: Mutex::new(Vec::new()),
            arrivals: Mutex::new(Vec::new()),
            fail_arrival: false,
        }
    }

    pub fn calls(&self) -> Vec<ClassicCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn arrivals(&self) -> Vec<String> {
        self.arrivals.lock().unwrap().clone()
    }
}

impl LiveMigrationOps for FakeLiveMigration {
    fn live_migration(
        &self,
        _ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        _post: MigrationCallback<'_>,
        _recover: MigrationCallback<'_>,
        block_migration: bool,
        migrate_data: Option<&MigrateData>,
    ) -> Result<()> {
        let still_clustered = self.cluster.group(&instance.name).is_some();
        self.calls.lock().unwrap().push(ClassicCall {
            instance: instance.name.clone(),
            dest: dest.to_string(),
            block_migration,
            migrate_data: migrate_data.cloned(),
            still_clustered,
        });
        Ok(())
    }

    fn post_live_migration_at_destination(
        &self,
        _ctx: &RequestContext,
        instance: &Instance,
        _network_info: &NetworkInfo,
        _block_migration: bool,
    ) -> Result<()> {
        if self.fail_arrival {
            return Err(Error::collaborator(
                "post_live_migration_at_destination",
                instance.name.as_str(),
                "vswitch missing",
            ));
        }
        self.arrivals.lock().unwrap().push(instance.name.clone());
        Ok(())
    }
}

/// VM provisioning that records calls and whether the VM was clustered at
/// the time.
pub struct FakeVmOps {
    cluster: Arc<MemoryCluster>,
    pub events: Mutex<Vec<(&'static str, String, bool)>>,
    pub fail_create: bool,
}

impl FakeVmOps {
    pub fn new(cluster: Arc<MemoryCluster>) -> Self {
        FakeVmOps {
            cluster,
            events: Mutex::new(Vec::new()),
            fail_create: false,
        }
    }

    pub fn events(&self) -> Vec<(&'static str, String, bool)> {
        self.events.lock().unwrap().clone()
    }
}

impl VmOps for FakeVmOps {
    fn create_instance(&self, instance: &Instance, _spec: &CreateSpec) -> Result<()> {
        if self.fail_create {
            return Err(Error::collaborator(
                "create_instance",
                instance.name.as_str(),
                "VHD missing",
            ));
        }
        let clustered = self.cluster.group(&instance.name).is_some();
        self.events
            .lock()
            .unwrap()
            .push(("create", instance.name.clone(), clustered));
        Ok(())
    }

    fn destroy(&self, instance: &Instance, _spec: &DestroySpec) -> Result<()> {
        let clustered = self.cluster.group(&instance.name).is_some();
        self.events
            .lock()
            .unwrap()
            .push(("destroy", instance.name.clone(), clustered));
        Ok(())
    }
}

/// Disk and console log copies that can be made to fail.
#[derive(Default)]
pub struct FakePrerequisites {
    pub copies: Mutex<Vec<(&'static str, String, String)>>,
    pub fail_logs: bool,
}

impl FakePrerequisites {
    pub fn copies(&self) -> Vec<(&'static str, String, String)> {
        self.copies.lock().unwrap().clone()
    }
}

impl MigrationPrerequisites for FakePrerequisites {
    fn copy_vm_dvd_disks(&self, vm_name: &str, dest: &str) -> Result<()> {
        self.copies
            .lock()
            .unwrap()
            .push(("dvd", vm_name.to_string(), dest.to_string()));
        Ok(())
    }

    fn copy_vm_console_logs(&self, vm_name: &str, dest: &str) -> Result<()> {
        if self.fail_logs {
            return Err(Error::collaborator(
                "copy_vm_console_logs",
                vm_name,
                "access denied",
            ));
        }
        self.copies
            .lock()
            .unwrap()
            .push(("logs", vm_name.to_string(), dest.to_string()));
        Ok(())
    }
}
