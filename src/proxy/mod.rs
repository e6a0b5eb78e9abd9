//! Client-side model of the daemon's proxy topology
//!
//! The daemon reports policy groups and leaf nodes together in one flat
//! map. Entries are classified here into an explicit tagged union, so the
//! group predicate is a single exhaustive match instead of ad-hoc key
//! probing on raw JSON.

use crate::api::ApiClient;
use crate::{Error, Result};
use serde::Deserialize;

/// Kind of policy group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    Selector,
    URLTest,
    Fallback,
    LoadBalance,
}

impl GroupType {
    /// Parse the wire `type` tag; leaf-node types yield `None`.
    pub fn parse(tag: &str) -> Option<GroupType> {
        match tag {
            "Selector" => Some(GroupType::Selector),
            "URLTest" => Some(GroupType::URLTest),
            "Fallback" => Some(GroupType::Fallback),
            "LoadBalance" => Some(GroupType::LoadBalance),
            _ => None,
        }
    }
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupType::Selector => write!(f, "Selector"),
            GroupType::URLTest => write!(f, "URLTest"),
            GroupType::Fallback => write!(f, "Fallback"),
            GroupType::LoadBalance => write!(f, "LoadBalance"),
        }
    }
}

/// Raw proxy entry as the daemon reports it
///
/// Decoded at the transport boundary; a missing `type` tag fails fast
/// there, everything else defaults so leaf entries and groups share one
/// shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProxy {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub proxy_type: String,

    /// Currently selected member (groups only)
    #[serde(default)]
    pub now: Option<String>,

    /// Ordered member list (groups only)
    #[serde(default)]
    pub all: Option<Vec<String>>,

    #[serde(default)]
    pub udp: Option<bool>,
}

/// A policy group: ordered members plus the currently selected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub kind: GroupType,
    pub now: String,
    /// Member order is display order and is preserved as received.
    pub members: Vec<String>,
}

/// A leaf node carrying the server's transport-protocol tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub protocol: String,
    pub udp: bool,
}

/// A proxy entry, classified by its wire `type` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEntry {
    Group(Group),
    Node(Node),
}

impl ProxyEntry {
    /// Classify a raw entry: the four group kinds become `Group`,
    /// everything else is a leaf `Node`.
    pub fn classify(raw: RawProxy) -> ProxyEntry {
        match GroupType::parse(&raw.proxy_type) {
            Some(kind) => ProxyEntry::Group(Group {
                name: raw.name,
                kind,
                now: raw.now.unwrap_or_default(),
                members: raw.all.unwrap_or_default(),
            }),
            None => ProxyEntry::Node(Node {
                name: raw.name,
                protocol: raw.proxy_type,
                udp: raw.udp.unwrap_or(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProxyEntry::Group(g) => &g.name,
            ProxyEntry::Node(n) => &n.name,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ProxyEntry::Group(_))
    }
}

/// One snapshot of the daemon's proxy map, in server iteration order
///
/// Snapshots are fetched fresh per command and never cached.
#[derive(Debug, Clone, Default)]
pub struct ProxySnapshot {
    entries: Vec<ProxyEntry>,
}

impl ProxySnapshot {
    pub fn new(entries: Vec<ProxyEntry>) -> Self {
        ProxySnapshot { entries }
    }

    pub fn entries(&self) -> &[ProxyEntry] {
        &self.entries
    }

    /// Policy groups, preserving server order within the partition
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.entries.iter().filter_map(|e| match e {
            ProxyEntry::Group(g) => Some(g),
            ProxyEntry::Node(_) => None,
        })
    }

    /// Leaf nodes, preserving server order within the partition
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().filter_map(|e| match e {
            ProxyEntry::Node(n) => Some(n),
            ProxyEntry::Group(_) => None,
        })
    }
}

/// Probe outcome for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayResult {
    pub name: String,
    /// `None` means timeout/no response.
    pub delay_ms: Option<u64>,
}

impl DelayResult {
    /// Normalize a wire delay: absent or negative is "no response", never
    /// surfaced as a numeric result. Zero is a valid measurement.
    pub fn from_wire(name: impl Into<String>, delay: Option<i64>) -> Self {
        DelayResult {
            name: name.into(),
            delay_ms: delay.and_then(|d| u64::try_from(d).ok()),
        }
    }
}

/// Fetch a group's member list fresh from the daemon.
///
/// The group's selection can change between calls, so this never reuses a
/// prior snapshot. Fails with `NotAGroup` when the entry is a leaf and
/// `NotFound` when no entry has that name.
pub async fn members_of(client: &ApiClient, name: &str) -> Result<Vec<String>> {
    match client.proxy(name).await? {
        ProxyEntry::Group(group) => Ok(group.members),
        ProxyEntry::Node(_) => Err(Error::not_a_group(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, tag: &str) -> RawProxy {
        RawProxy {
            name: name.to_string(),
            proxy_type: tag.to_string(),
            now: None,
            all: None,
            udp: None,
        }
    }

    #[test]
    fn test_group_type_parse() {
        assert_eq!(GroupType::parse("Selector"), Some(GroupType::Selector));
        assert_eq!(GroupType::parse("URLTest"), Some(GroupType::URLTest));
        assert_eq!(GroupType::parse("Fallback"), Some(GroupType::Fallback));
        assert_eq!(GroupType::parse("LoadBalance"), Some(GroupType::LoadBalance));
        assert_eq!(GroupType::parse("Shadowsocks"), None);
        assert_eq!(GroupType::parse("Direct"), None);
        // Tag match is exact, not case-insensitive
        assert_eq!(GroupType::parse("selector"), None);
    }

    #[test]
    fn test_group_type_display() {
        assert_eq!(GroupType::Selector.to_string(), "Selector");
        assert_eq!(GroupType::LoadBalance.to_string(), "LoadBalance");
    }

    #[test]
    fn test_classify_group() {
        let mut entry = raw("Proxy", "Selector");
        entry.now = Some("JP-01".to_string());
        entry.all = Some(vec!["JP-01".to_string(), "US-02".to_string()]);

        match ProxyEntry::classify(entry) {
            ProxyEntry::Group(g) => {
                assert_eq!(g.kind, GroupType::Selector);
                assert_eq!(g.now, "JP-01");
                assert_eq!(g.members, vec!["JP-01", "US-02"]);
            }
            ProxyEntry::Node(_) => panic!("Selector classified as node"),
        }
    }

    #[test]
    fn test_classify_node() {
        let mut entry = raw("JP-01", "Shadowsocks");
        entry.udp = Some(true);

        match ProxyEntry::classify(entry) {
            ProxyEntry::Node(n) => {
                assert_eq!(n.protocol, "Shadowsocks");
                assert!(n.udp);
            }
            ProxyEntry::Group(_) => panic!("Shadowsocks classified as group"),
        }
    }

    #[test]
    fn test_partition_is_exhaustive() {
        let tags = ["Selector", "URLTest", "Fallback", "LoadBalance", "Vmess", "Direct", "Reject"];
        let snapshot = ProxySnapshot::new(
            tags.iter().map(|t| ProxyEntry::classify(raw(t, t))).collect(),
        );

        let groups: Vec<_> = snapshot.groups().collect();
        let nodes: Vec<_> = snapshot.nodes().collect();
        assert_eq!(groups.len(), 4);
        assert_eq!(nodes.len(), 3);
        assert_eq!(groups.len() + nodes.len(), snapshot.entries().len());
        // Partitions keep server order
        assert_eq!(groups[0].name, "Selector");
        assert_eq!(groups[3].name, "LoadBalance");
        assert_eq!(nodes[0].name, "Vmess");
        assert_eq!(nodes[2].name, "Reject");
    }

    #[test]
    fn test_delay_normalization() {
        assert_eq!(DelayResult::from_wire("n", Some(42)).delay_ms, Some(42));
        assert_eq!(DelayResult::from_wire("n", Some(0)).delay_ms, Some(0));
        assert_eq!(DelayResult::from_wire("n", Some(-1)).delay_ms, None);
        assert_eq!(DelayResult::from_wire("n", Some(-5000)).delay_ms, None);
        assert_eq!(DelayResult::from_wire("n", None).delay_ms, None);
    }
}
