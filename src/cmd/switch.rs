//! `switch` - change a group's active member

use crate::api::ApiClient;
use crate::proxy;
use crate::{Error, Result};
use serde_json::Value;

/// Optionally validate membership, switch, and echo the daemon's raw
/// response (the one machine-parseable output this tool produces).
pub async fn run(client: &ApiClient, group: &str, node: &str, validate: bool) -> Result<()> {
    let response = switch_group(client, group, node, validate).await?;
    println!("{:#}", response);
    Ok(())
}

/// Check-then-act selection change.
///
/// The membership check races against concurrent external mutation of the
/// daemon's state; the daemon re-validates on PUT, so the race is
/// accepted rather than mitigated.
pub async fn switch_group(
    client: &ApiClient,
    group: &str,
    node: &str,
    validate: bool,
) -> Result<Value> {
    if validate {
        let members = proxy::members_of(client, group).await?;
        if !members.iter().any(|m| m == node) {
            return Err(Error::validation(group, node, &members));
        }
    }
    client.select(group, node).await
}
