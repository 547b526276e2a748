//! Example: Cluster-aware live migration of Hyper-V VMs
//!
//! Runs against an in-process three-node cluster. Two VMs are created and
//! clustered, then:
//! - web01 is moved inside the cluster (clustered migration)
//! - db01 is failed over by the cluster, then "migrated" to where it already is
//! - app01 is migrated to a host outside the cluster (classic migration)
//!
//! Configuration is read from config.toml in the working directory when
//! present.

use std::sync::Arc;

use clus::MemoryCluster;
use clusmig::{
    cluster_membership, init_tracing, ClusterHooks, Config, CreateSpec, DecisionEngine,
    Instance, InstanceLifecycle, LiveMigrationDriver, LiveMigrationOps, MigrateData,
    MigrationCallback, NetworkInfo, RequestContext, VmOps,
};

struct LocalVmOps;

impl VmOps for LocalVmOps {
    fn create_instance(&self, instance: &Instance, _spec: &CreateSpec) -> clusmig::Result<()> {
        println!("  [hyper-v] created {}", instance.name);
        Ok(())
    }

    fn destroy(&self, instance: &Instance, _spec: &clusmig::DestroySpec) -> clusmig::Result<()> {
        println!("  [hyper-v] destroyed {}", instance.name);
        Ok(())
    }
}

struct ClassicMigration;

impl LiveMigrationOps for ClassicMigration {
    fn live_migration(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        dest: &str,
        post: MigrationCallback<'_>,
        _recover: MigrationCallback<'_>,
        block_migration: bool,
        _migrate_data: Option<&MigrateData>,
    ) -> clusmig::Result<()> {
        println!("  [hyper-v] classic live migration of {} to {}", instance.name, dest);
        post(ctx, instance, dest, block_migration);
        Ok(())
    }

    fn post_live_migration_at_destination(
        &self,
        _ctx: &RequestContext,
        instance: &Instance,
        _network_info: &NetworkInfo,
        _block_migration: bool,
    ) -> clusmig::Result<()> {
        println!("  [hyper-v] plugged vifs of {}", instance.name);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load("config.toml")?;
    init_tracing(&config.logging.level);

    let cluster = Arc::new(MemoryCluster::new("node1", &["node1", "node2", "node3"]));
    let membership = cluster_membership(cluster.clone(), &config)
        .ok_or("this example needs cluster support enabled")?;

    let lifecycle = InstanceLifecycle::with_cluster(LocalVmOps, ClusterHooks::new(membership.clone()));
    let driver = LiveMigrationDriver::with_cluster(ClassicMigration, DecisionEngine::new(membership.clone()));

    let post = |_: &RequestContext, i: &Instance, d: &str, block: bool| {
        println!("  [callback] post_method {} -> {} (block migration: {})", i.name, d, block);
    };
    let recover = |_: &RequestContext, i: &Instance, d: &str, _: bool| {
        println!("  [callback] recover_method {} -> {}", i.name, d);
    };
    let ctx = RequestContext::new("req-example");

    for name in ["web01", "db01", "app01"] {
        lifecycle.create_instance(&Instance::new(name), &CreateSpec::default())?;
    }

    println!("Moving web01 to node2...");
    driver.live_migration(&ctx, &Instance::new("web01"), "node2", &post, &recover, false, None)?;
    println!("web01 is now on {}", membership.current_host("web01")?);

    println!("Failing db01 over to node3, then migrating it to node3...");
    cluster.fail_over("db01", "node3");
    driver.live_migration(&ctx, &Instance::new("db01"), "node3", &post, &recover, false, None)?;

    println!("Moving app01 to standalone host hv-edge...");
    driver.live_migration(&ctx, &Instance::new("app01"), "hv-edge", &post, &recover, false, None)?;
    println!("app01 clustered: {}", membership.is_clustered("app01")?);

    println!();
    println!("=== Clustered VMs ===");
    for group in membership.directory().list_vm_groups()? {
        println!("  {} on {}", group.name(), group.owner_node());
    }

    Ok(())
}
