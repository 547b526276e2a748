//! Example: List cluster nodes and clustered VMs
//!
//! Builds a small in-process cluster, clusters two VMs and prints what the
//! resource directory reports.

use std::sync::Arc;

use clus::{GroupState, MemoryCluster, Membership, NodeState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cluster = Arc::new(MemoryCluster::new("node1", &["node1", "node2", "node3"]));
    cluster.set_node_state("node3", NodeState::Paused);

    let membership = Membership::new(cluster.clone());
    membership.add_to_cluster("web01")?;
    membership.add_to_cluster("db01")?;
    cluster.fail_over("db01", "node2");

    println!("Connected to cluster from: {}", membership.local_node_name()?);
    println!();

    println!("=== Nodes ===");
    for node in membership.directory().list_cluster_nodes()? {
        let status = match node.state() {
            NodeState::Up => "✓ Up".to_string(),
            NodeState::Down => "✗ Down".to_string(),
            NodeState::Paused => "⏸ Paused".to_string(),
            NodeState::Joining => "… Joining".to_string(),
            NodeState::Unknown(n) => format!("? Unknown({})", n),
        };
        println!("  {} - {}", node.name(), status);
    }
    println!();

    println!("=== VM Groups ===");
    for group in membership.directory().list_vm_groups()? {
        let status = match group.state {
            GroupState::Online => "Online",
            GroupState::Offline => "Offline",
            GroupState::Failed => "FAILED",
            GroupState::PartialOnline => "Partial",
            GroupState::Pending => "Pending",
            GroupState::Unknown(_) => "Unknown",
        };
        println!(
            "  {} - {} on {} (failback {:?}, window {:?}-{:?})",
            group.name(),
            status,
            group.owner_node(),
            group.auto_failback,
            group.failback_window_start,
            group.failback_window_end
        );
    }

    Ok(())
}
