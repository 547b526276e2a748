//! Migration decision engine
//!
//! A live migration request `(instance, destination)` is classified against
//! the current cluster topology and ownership:
//!
//! - destination outside the cluster, or VM not clustered: classic live
//!   migration, after unclustering the VM if it was clustered;
//! - VM already owned by the destination (usually after a failover that
//!   raced with the request): no move, the post callback runs directly;
//! - otherwise: clustered migration through [`MigrationExecutor`].

use std::sync::Arc;

use clus::Membership;

use crate::error::Result;
use crate::executor::MigrationExecutor;
use crate::ops::{
    Instance, LiveMigrationOps, MigrateData, MigrationCallback, MigrationPrerequisites,
    RequestContext,
};

/// How a live migration request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Live migration without the cluster. `uncluster` is set when the VM
    /// must leave the cluster first.
    Classic { uncluster: bool },
    /// The destination already owns the VM.
    AlreadyThere,
    /// Move of the VM's group within the cluster.
    Clustered,
}

#[derive(Clone)]
pub struct DecisionEngine {
    membership: Membership,
    executor: MigrationExecutor,
    prerequisites: Option<Arc<dyn MigrationPrerequisites>>,
}

impl DecisionEngine {
    pub fn new(membership: Membership) -> Self {
        let executor = MigrationExecutor::new(membership.directory().clone());
        DecisionEngine {
            membership,
            executor,
            prerequisites: None,
        }
    }

    /// Copies to run before a clustered move is issued.
    pub fn with_prerequisites(mut self, prerequisites: Arc<dyn MigrationPrerequisites>) -> Self {
        self.prerequisites = Some(prerequisites);
        self
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn classify(&self, instance_name: &str, dest: &str) -> clus::Result<Strategy> {
        let clustered = self.membership.is_clustered(instance_name)?;
        let members = self.membership.node_names()?;

        if !clustered || !members.iter().any(|n| n == dest) {
            return Ok(Strategy::Classic {
                uncluster: clustered,
            });
        }
        if self.membership.current_host(instance_name)? == dest {
            return Ok(Strategy::AlreadyThere);
        }
        Ok(Strategy::Clustered)
    }

    /// Whether `host` belongs to this cluster, and so sits on the same
    /// shared storage.
    pub fn shares_storage_with(&self, host: &str) -> clus::Result<bool> {
        Ok(self.membership.node_names()?.iter().any(|n| n == host))
    }

    /// Runs a live migration request, falling back to `classic` when the
    /// cluster cannot carry it.
    #[allow(clippy::too_many_arguments)]
    pub fn live_migration(
        &self,
        classic: &dyn LiveMigrationOps,
        ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        post: MigrationCallback<'_>,
        recover: MigrationCallback<'_>,
        block_migration: bool,
        migrate_data: Option<&MigrateData>,
    ) -> Result<()> {
        let strategy = self.classify(&instance.name, dest)?;
        tracing::debug!(
            "Live migration of {} to {}: {:?}",
            instance.name,
            dest,
            strategy
        );

        match strategy {
            Strategy::Classic { uncluster } => {
                if uncluster {
                    tracing::info!(
                        "Unclustering {} before migrating it out of the cluster",
                        instance.name
                    );
                    self.membership.remove_from_cluster(&instance.name)?;
                }
                classic.live_migration(
                    ctx,
                    instance,
                    dest,
                    post,
                    recover,
                    block_migration,
                    migrate_data,
                )
            }
            Strategy::AlreadyThere => {
                tracing::info!(
                    "{} is already running on {}, skipping migration",
                    instance.name,
                    dest
                );
                post(ctx, instance, dest, false);
                Ok(())
            }
            Strategy::Clustered => {
                if let Err(e) = self.prepare(&instance.name, dest) {
                    recover(ctx, instance, dest, false);
                    return Err(e);
                }
                tracing::debug!("Performing clustered live_migration of {}", instance.name);
                self.executor.execute(ctx, instance, dest, post, recover)
            }
        }
    }

    fn prepare(&self, vm_name: &str, dest: &str) -> Result<()> {
        if let Some(prep) = &self.prerequisites {
            prep.copy_vm_dvd_disks(vm_name, dest)?;
            prep.copy_vm_console_logs(vm_name, dest)?;
        }
        Ok(())
    }
}
