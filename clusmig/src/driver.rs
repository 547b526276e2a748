//! Driver operations with optional cluster awareness
//!
//! The base Hyper-V operations run as they would on a standalone host. When
//! the host is a cluster node, the cluster policy is injected at
//! construction and applied around them.

use clus::Membership;

use crate::engine::DecisionEngine;
use crate::error::Result;
use crate::hooks::ClusterHooks;
use crate::ops::{
    CreateSpec, DestroySpec, Instance, LiveMigrationOps, MigrateData, MigrationCallback,
    NetworkInfo, RequestContext, VmOps,
};

/// VM provisioning and teardown.
pub struct InstanceLifecycle<V> {
    base: V,
    cluster: Option<ClusterHooks>,
}

impl<V: VmOps> InstanceLifecycle<V> {
    pub fn new(base: V) -> Self {
        InstanceLifecycle {
            base,
            cluster: None,
        }
    }

    pub fn with_cluster(base: V, hooks: ClusterHooks) -> Self {
        InstanceLifecycle {
            base,
            cluster: Some(hooks),
        }
    }

    pub fn base(&self) -> &V {
        &self.base
    }

    pub fn create_instance(&self, instance: &Instance, spec: &CreateSpec) -> Result<()> {
        self.base.create_instance(instance, spec)?;
        if let Some(hooks) = &self.cluster {
            hooks.instance_created(instance)?;
        }
        Ok(())
    }

    /// Unclusters the VM first so the cluster holds no reference to disks
    /// being deleted.
    pub fn destroy(&self, instance: &Instance, spec: &DestroySpec) -> Result<()> {
        if let Some(hooks) = &self.cluster {
            hooks.instance_destroying(instance)?;
        }
        self.base.destroy(instance, spec)
    }
}

struct ClusterMigration {
    engine: DecisionEngine,
    hooks: ClusterHooks,
}

/// Live migration, clustered when possible.
pub struct LiveMigrationDriver<L> {
    base: L,
    cluster: Option<ClusterMigration>,
}

impl<L: LiveMigrationOps> LiveMigrationDriver<L> {
    pub fn new(base: L) -> Self {
        LiveMigrationDriver {
            base,
            cluster: None,
        }
    }

    pub fn with_cluster(base: L, engine: DecisionEngine) -> Self {
        let hooks = ClusterHooks::new(engine.membership().clone());
        LiveMigrationDriver {
            base,
            cluster: Some(ClusterMigration { engine, hooks }),
        }
    }

    pub fn base(&self) -> &L {
        &self.base
    }

    /// Membership manager of the injected cluster policy, if any.
    pub fn membership(&self) -> Option<&Membership> {
        self.cluster.as_ref().map(|c| c.hooks.membership())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn live_migration(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        post: MigrationCallback<'_>,
        recover: MigrationCallback<'_>,
        block_migration: bool,
        migrate_data: Option<&MigrateData>,
    ) -> Result<()> {
        match &self.cluster {
            Some(cluster) => cluster.engine.live_migration(
                &self.base,
                ctx,
                instance,
                dest,
                post,
                recover,
                block_migration,
                migrate_data,
            ),
            None => self.base.live_migration(
                ctx,
                instance,
                dest,
                post,
                recover,
                block_migration,
                migrate_data,
            ),
        }
    }

    pub fn post_live_migration_at_destination(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        network_info: &NetworkInfo,
        block_migration: bool,
    ) -> Result<()> {
        self.base
            .post_live_migration_at_destination(ctx, instance, network_info, block_migration)?;
        if let Some(cluster) = &self.cluster {
            cluster.hooks.arrived_at_destination(instance)?;
        }
        Ok(())
    }

    /// Whether a cold migration or resize to `host` can reuse the instance's
    /// disks in place. Always false without a cluster.
    pub fn shares_storage_with(&self, host: &str) -> Result<bool> {
        match &self.cluster {
            Some(cluster) => Ok(cluster.engine.shares_storage_with(host)?),
            None => Ok(false),
        }
    }
}
