//! `list` - render policy groups and endpoint nodes

use crate::api::ApiClient;
use crate::proxy::{Group, Node};
use crate::Result;

/// Render the proxy map. With neither flag set, both sections are shown;
/// the groups block always precedes the nodes block.
pub async fn run(client: &ApiClient, groups: bool, nodes: bool) -> Result<()> {
    let (show_groups, show_nodes) = sections(groups, nodes);
    let snapshot = client.proxies().await?;

    if show_groups {
        println!("=== Policy Groups ===");
        for group in snapshot.groups() {
            println!("{}", format_group(group));
        }
    }
    if show_nodes {
        println!("=== Endpoint Nodes ===");
        for node in snapshot.nodes() {
            println!("{}", format_node(node));
        }
    }
    Ok(())
}

/// Which sections to print; asking for neither means both.
fn sections(groups: bool, nodes: bool) -> (bool, bool) {
    (groups || !nodes, nodes || !groups)
}

fn format_group(group: &Group) -> String {
    format!(
        "{} [{}]: now={}; members={}",
        group.name,
        group.kind,
        group.now,
        group.members.join(", ")
    )
}

fn format_node(node: &Node) -> String {
    format!("{} [{}], udp={}", node.name, node.protocol, node.udp)
}
