//! `ping` - per-node delay probes with partial-failure tolerance

use crate::api::ApiClient;
use crate::proxy::{self, DelayResult};
use crate::Result;

/// Default probe URL
pub const DEFAULT_TEST_URL: &str = "https://www.gstatic.com/generate_204";

/// Default probe timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Resolve targets and probe them. A group resolves to its fresh member
/// list and overrides any explicit node names.
pub async fn run(
    client: &ApiClient,
    group: Option<&str>,
    nodes: Vec<String>,
    url: &str,
    timeout_ms: u64,
) -> Result<()> {
    let targets = match group {
        Some(group) => {
            let members = proxy::members_of(client, group).await?;
            println!("Testing group '{}' ({} nodes)", group, members.len());
            members
        }
        None => nodes,
    };

    for (name, outcome) in probe_targets(client, &targets, url, timeout_ms).await {
        match outcome {
            Ok(result) => println!("{}", format_delay(&result)),
            // One bad node never aborts the batch.
            Err(e) => eprintln!("{}: {}", name, e),
        }
    }
    Ok(())
}

/// Probe every target concurrently and join the results back in input
/// order, so output stays correlated to the requesting target and one
/// failing probe cannot disturb the others.
pub async fn probe_targets(
    client: &ApiClient,
    targets: &[String],
    url: &str,
    timeout_ms: u64,
) -> Vec<(String, Result<DelayResult>)> {
    let probes = targets.iter().map(|name| async move {
        (name.clone(), client.delay(name, url, timeout_ms).await)
    });
    futures::future::join_all(probes).await
}

fn format_delay(result: &DelayResult) -> String {
    match result.delay_ms {
        Some(ms) => format!("{}: {} ms", result.name, ms),
        None => format!("{}: timeout/no response", result.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_delay_valid() {
        let result = DelayResult::from_wire("JP-01", Some(42));
        assert_eq!(format_delay(&result), "JP-01: 42 ms");
    }

    #[test]
    fn test_format_delay_zero_is_valid() {
        let result = DelayResult::from_wire("JP-01", Some(0));
        assert_eq!(format_delay(&result), "JP-01: 0 ms");
    }

    #[test]
    fn test_format_delay_no_response() {
        for wire in [None, Some(-1)] {
            let result = DelayResult::from_wire("US-02", wire);
            assert_eq!(format_delay(&result), "US-02: timeout/no response");
        }
    }
}
