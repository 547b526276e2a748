//! Clustered migration command
//!
//! Moves a VM's resource group to another node of the same cluster and runs
//! the caller's post or recover callback depending on the outcome.

use clus::{MigrationType, MoveFlags, ResourceDirectory};

use crate::error::Result;
use crate::ops::{Instance, MigrationCallback, RequestContext};

#[derive(Clone)]
pub struct MigrationExecutor {
    directory: ResourceDirectory,
}

impl MigrationExecutor {
    pub fn new(directory: ResourceDirectory) -> Self {
        MigrationExecutor { directory }
    }

    pub fn migrate_live(&self, vm_name: &str, dest: &str) -> clus::Result<()> {
        self.migrate(vm_name, dest, MigrationType::Live)
    }

    /// Moves the VM's group to `dest`, ignoring locked resources.
    ///
    /// Fails with `NotFound` when the VM has no group. Failures of the move
    /// command itself are logged and returned unchanged.
    pub fn migrate(
        &self,
        vm_name: &str,
        dest: &str,
        migration_type: MigrationType,
    ) -> clus::Result<()> {
        let group = self.directory.lookup_vm_group_check(vm_name)?;

        let flags = MoveFlags {
            ignore_locked: true,
        };
        self.directory
            .service()
            .move_group(group.name(), dest, flags, migration_type)
            .inspect_err(|e| {
                tracing::error!(
                    "Exception during cluster live migration of {} to {}: {}",
                    vm_name,
                    dest,
                    e
                );
            })
    }

    /// Live migrates `instance` to `dest`.
    ///
    /// On failure `recover` runs exactly once before the error is returned;
    /// on success `post` runs. Nothing is retried.
    pub fn execute(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        post: MigrationCallback<'_>,
        recover: MigrationCallback<'_>,
    ) -> Result<()> {
        if let Err(e) = self.migrate_live(&instance.name, dest) {
            tracing::debug!(
                "Calling live migration recover_method for instance: {}",
                instance.name
            );
            recover(ctx, instance, dest, false);
            return Err(e.into());
        }

        tracing::debug!(
            "Calling live migration post_method for instance: {}",
            instance.name
        );
        post(ctx, instance, dest, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clus::memory::{Command, Operation};
    use clus::{ClusError, MemoryCluster};

    use super::*;
    use crate::error::Error;
    use crate::testing::CallbackLog;

    fn setup() -> (Arc<MemoryCluster>, MigrationExecutor) {
        let cluster = Arc::new(MemoryCluster::new("h1", &["h1", "h2"]));
        cluster.insert_vm("vmA", "h1");
        let executor = MigrationExecutor::new(ResourceDirectory::new(cluster.clone()));
        (cluster, executor)
    }

    #[test]
    fn test_migrate_live_issues_move_command() {
        let (cluster, executor) = setup();

        executor.migrate_live("vmA", "h2").unwrap();

        assert_eq!(
            cluster.commands(),
            vec![Command::MoveGroup {
                group: "vmA".to_string(),
                node: "h2".to_string(),
                ignore_locked: true,
                migration_type: MigrationType::Live,
            }]
        );
        assert_eq!(cluster.group("vmA").unwrap().owner_node(), "h2");
    }

    #[test]
    fn test_migrate_passes_requested_type() {
        let (cluster, executor) = setup();

        executor.migrate("vmA", "h2", MigrationType::Other(1)).unwrap();

        assert!(matches!(
            cluster.commands().as_slice(),
            [Command::MoveGroup {
                migration_type: MigrationType::Other(1),
                ..
            }]
        ));
    }

    #[test]
    fn test_migrate_missing_group() {
        let (cluster, executor) = setup();
        cluster.remove_group("vmA");

        let err = executor.migrate_live("vmA", "h2").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(cluster.move_count(), 0);
    }

    #[test]
    fn test_migrate_propagates_command_failure() {
        let (cluster, executor) = setup();
        let failure = ClusError::OperationFailed("0x80071398".into());
        cluster.fail_next(Operation::MoveGroup, failure.clone());

        assert_eq!(executor.migrate_live("vmA", "h2"), Err(failure));
    }

    #[test]
    fn test_execute_success_calls_post() {
        let (_, executor) = setup();
        let log = CallbackLog::default();
        let ctx = RequestContext::new("req-1");
        let instance = Instance::new("vmA");

        executor
            .execute(&ctx, &instance, "h2", &log.post(), &log.recover())
            .unwrap();

        assert_eq!(log.posts(), vec![("vmA".to_string(), "h2".to_string(), false)]);
        assert!(log.recovers().is_empty());
    }

    #[test]
    fn test_execute_failure_recovers_once() {
        let (cluster, executor) = setup();
        cluster.fail_next(
            Operation::MoveGroup,
            ClusError::OperationFailed("move failed".into()),
        );
        let log = CallbackLog::default();
        let ctx = RequestContext::new("req-1");
        let instance = Instance::new("vmA");

        let err = executor
            .execute(&ctx, &instance, "h2", &log.post(), &log.recover())
            .unwrap_err();

        assert_eq!(
            err,
            Error::Cluster(ClusError::OperationFailed("move failed".into()))
        );
        assert_eq!(
            log.recovers(),
            vec![("vmA".to_string(), "h2".to_string(), false)]
        );
        assert!(log.posts().is_empty());
        assert_eq!(cluster.move_count(), 1);
    }

    #[test]
    fn test_execute_vanished_group_recovers() {
        let (cluster, executor) = setup();
        cluster.remove_group("vmA");
        let log = CallbackLog::default();

        let err = executor
            .execute(
                &RequestContext::default(),
                &Instance::new("vmA"),
                "h2",
                &log.post(),
                &log.recover(),
            )
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(log.recovers().len(), 1);
        assert!(log.posts().is_empty());
    }
}
