//! The address trie: a 256-ary trie over the bytes of IP addresses.
//!
//! Both address families are stored in one trie. IPv6 addresses take a path
//! of 16 bytes from the root. IPv4 addresses are stored in their
//! IPv4-mapped IPv6 form, the node at the end of the 12 byte mapped prefix
//! is created when the trie is created, and all IPv4 walks start there
//! (the "fast entry"), so that they only consume the 4 IPv4 bytes.
//!
//! A node that carries a payload covers every address whose path runs
//! through it. Payloads are written at most once: an insertion never
//! changes a node that was marked by an earlier insertion. This makes the
//! order of insertion the priority policy. Insert the narrowest ranges
//! first to have the most specific range win, or use the
//! [AddressIndexBuilder](builder::AddressIndexBuilder) to do that for you.
//!
//! ```
//! use iprange_store::AddressTrie;
//!
//! let mut trie = AddressTrie::new();
//! trie.insert(&"192.168.100.1-192.168.100.100".parse()?, "range");
//! trie.insert(&"192.168.100.0/24".parse()?, "prefix");
//!
//! assert!(trie.contains("192.168.100.200".parse()?));
//! assert_eq!(trie.lookup_most_specific("192.168.100.50".parse()?), Some(&"range"));
//! assert_eq!(trie.lookup_most_specific("192.168.100.150".parse()?), Some(&"prefix"));
//! assert_eq!(trie.lookup_most_specific("192.168.101.1".parse()?), None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod builder;
pub mod config;
mod node;


use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use log::{debug, log_enabled, trace};
use zerocopy::IntoBytes;

use crate::stats::{InsertReport, TrieStats};
use crate::types::af::{IPv4, IPv6};
use crate::types::stats::Counters;
use crate::types::{
    AddressFamily, AddressSpec, SpecKind, TrieEntry, IPV4_MAPPED_PREFIX,
};

pub(crate) use node::{NodeId, TrieNode};

//------------ AddressTrie ---------------------------------------------------

/// An index of IPv4 and IPv6 address ranges, each carrying a payload of type
/// `T`.
///
/// Insertion takes `&mut self`, queries take `&self`, so a trie that is
/// built first can be shared between threads for querying, e.g. behind an
/// `Arc`.
pub struct AddressTrie<T> {
    // The arena holding all nodes, the root is the first node. Nodes are
    // never removed.
    nodes: Vec<TrieNode<T>>,
    // The node right below the IPv4-mapped prefix.
    fast_entry: NodeId,
    counters: Counters,
}

impl<T> AddressTrie<T> {
    /// Create an empty trie, with the path for the IPv4-mapped prefix
    /// already in place.
    pub fn new() -> Self {
        let mut trie = AddressTrie {
            nodes: vec![TrieNode::new(0)],
            fast_entry: NodeId::ROOT,
            counters: Counters::default(),
        };
        trie.counters.inc_nodes_count(0);

        let mut report = InsertReport::default();
        let mut cur = NodeId::ROOT;
        for b in IPV4_MAPPED_PREFIX {
            cur = trie.child_or_insert(cur, b, &mut report);
        }
        trie.fast_entry = cur;

        debug!(
            "created address trie, fast entry {:?} at depth {}",
            cur,
            trie.node(cur).depth()
        );
        trie
    }

    //-------- Insertion ----------------------------------------------------

    /// Insert all addresses covered by `spec` with `payload`.
    ///
    /// Addresses that are already covered by an earlier insertion keep the
    /// payload they have. Inserting a region that is completely covered
    /// already is a no-op, the returned report then has zero marks set.
    pub fn insert(&mut self, spec: &AddressSpec, payload: T) -> InsertReport
    where
        T: Clone,
    {
        trace!("insert {}", spec);
        let mut report = InsertReport::default();

        match *spec.kind() {
            SpecKind::Cidr { prefix, .. } => match prefix.addr() {
                IpAddr::V4(net) => self.insert_cidr(
                    IPv4::from_ipaddr(net),
                    prefix.len(),
                    &payload,
                    &mut report,
                ),
                IpAddr::V6(net) => self.insert_cidr(
                    IPv6::from_ipaddr(net),
                    prefix.len(),
                    &payload,
                    &mut report,
                ),
            },
            SpecKind::Range { low, high } => match (low, high) {
                (IpAddr::V4(low), IpAddr::V4(high)) => self.insert_range(
                    IPv4::from_ipaddr(low),
                    IPv4::from_ipaddr(high),
                    &payload,
                    &mut report,
                ),
                (IpAddr::V6(low), IpAddr::V6(high)) => self.insert_range(
                    IPv6::from_ipaddr(low),
                    IPv6::from_ipaddr(high),
                    &payload,
                    &mut report,
                ),
                // The parser refuses to create these.
                _ => debug!("ignoring range with mixed families {}", spec),
            },
        }

        if log_enabled!(log::Level::Trace) {
            trace!("inserted {}: {:?}", spec, report);
        }
        report
    }

    fn insert_cidr<AF: AddressFamily>(
        &mut self,
        net: AF,
        len: u8,
        payload: &T,
        report: &mut InsertReport,
    ) where
        T: Clone,
    {
        let mask = AF::prefix_mask(len);
        let mut cur = self.entry(AF::ENTRY);

        for (&b, &m) in net.as_bytes().iter().zip(mask.as_bytes()) {
            if self.node(cur).is_marked() {
                trace!("cidr already covered at {:?}", cur);
                return;
            }

            match m {
                u8::MAX => {
                    cur = self.child_or_insert(cur, b, report);
                }
                0 => {
                    self.mark(cur, payload, report);
                    return;
                }
                // The host bits of a prefix mask all live in this byte, so
                // marking every value they can take covers the rest of
                // the prefix.
                m => {
                    trace!("cidr fan out {}..={}", b & m, b | !m);
                    self.fan_out(cur, (b & m)..=(b | !m), payload, report);
                    return;
                }
            }
        }

        self.mark(cur, payload, report);
    }

    // A range is decomposed in three parts below the first byte where the
    // endpoints diverge: every value strictly between the two endpoint
    // bytes covers its whole subtree, and the two boundary paths are
    // walked separately, marking everything above `low` and everything
    // below `high` on their way down.
    fn insert_range<AF: AddressFamily>(
        &mut self,
        low: AF,
        high: AF,
        payload: &T,
        report: &mut InsertReport,
    ) where
        T: Clone,
    {
        let (low, high) = (low.as_bytes(), high.as_bytes());
        let mut cur = self.entry(AF::ENTRY);
        if self.node(cur).is_marked() {
            return;
        }

        for (i, (&l, &h)) in low.iter().zip(high).enumerate() {
            if l == h {
                cur = self.child_or_insert(cur, l, report);
                if self.node(cur).is_marked() {
                    trace!("range already covered at {:?}", cur);
                    return;
                }
                continue;
            }

            trace!("range diverges at byte {}: {} < {}", i, l, h);
            self.fan_out(cur, (l..h).skip(1), payload, report);

            let low_branch = self.child_or_insert(cur, l, report);
            let high_branch = self.child_or_insert(cur, h, report);
            let rest = i + 1;

            self.walk_low_boundary(
                low_branch,
                low.get(rest..).unwrap_or_default(),
                payload,
                report,
            );
            self.walk_high_boundary(
                high_branch,
                high.get(rest..).unwrap_or_default(),
                payload,
                report,
            );
            return;
        }
    }

    fn walk_low_boundary(
        &mut self,
        start: NodeId,
        rest: &[u8],
        payload: &T,
        report: &mut InsertReport,
    ) where
        T: Clone,
    {
        let mut cur = start;
        for &b in rest {
            if self.node(cur).is_marked() {
                return;
            }
            self.fan_out(cur, (b..=u8::MAX).skip(1), payload, report);
            cur = self.child_or_insert(cur, b, report);
        }
        self.mark(cur, payload, report);
    }

    fn walk_high_boundary(
        &mut self,
        start: NodeId,
        rest: &[u8],
        payload: &T,
        report: &mut InsertReport,
    ) where
        T: Clone,
    {
        let mut cur = start;
        for &b in rest {
            if self.node(cur).is_marked() {
                return;
            }
            self.fan_out(cur, 0..b, payload, report);
            cur = self.child_or_insert(cur, b, report);
        }
        self.mark(cur, payload, report);
    }

    // Create (if needed) and mark the children of `parent` for all `values`.
    fn fan_out(
        &mut self,
        parent: NodeId,
        values: impl IntoIterator<Item = u8>,
        payload: &T,
        report: &mut InsertReport,
    ) where
        T: Clone,
    {
        for v in values {
            let child = self.child_or_insert(parent, v, report);
            self.mark(child, payload, report);
        }
    }

    fn mark(&mut self, id: NodeId, payload: &T, report: &mut InsertReport)
    where
        T: Clone,
    {
        let node = self.node_mut(id);
        if node.is_marked() {
            return;
        }
        node.mark(payload.clone());
        self.counters.inc_marked_count();
        report.marks_set += 1;
    }

    fn child_or_insert(
        &mut self,
        parent: NodeId,
        byte: u8,
        report: &mut InsertReport,
    ) -> NodeId {
        if let Some(child) = self.node(parent).child(byte) {
            return child;
        }

        let depth = self.node(parent).depth() + 1;
        let child = self.push_node(depth);
        self.node_mut(parent).set_child(byte, child);
        self.counters.inc_nodes_count(depth);
        report.nodes_created += 1;
        child
    }

    // A node takes 1 KiB, memory runs out long before the number of nodes
    // outgrows a u32 handle.
    #[allow(clippy::expect_used)]
    fn push_node(&mut self, depth: u8) -> NodeId {
        let id = NodeId::from_index(self.nodes.len())
            .expect("number of trie nodes exceeds u32::MAX");
        self.nodes.push(TrieNode::new(depth));
        id
    }

    //-------- Queries ------------------------------------------------------

    /// Whether `addr` is covered by any inserted specification.
    /// IPv4-mapped IPv6 addresses are looked up as IPv4 addresses.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match addr.to_canonical() {
            IpAddr::V4(addr) => self.find(IPv4::from_ipaddr(addr)),
            IpAddr::V6(addr) => self.find(IPv6::from_ipaddr(addr)),
        }
    }

    /// Like [contains](Self::contains), for an address in raw network
    /// byte order. Slices that are not 4 or 16 bytes long are never found.
    pub fn contains_bytes(&self, addr: &[u8]) -> bool {
        addr_from_bytes(addr).is_some_and(|addr| self.contains(addr))
    }

    /// The payload of the most specific specification covering `addr`, or
    /// `None` if no inserted specification covers it.
    ///
    /// The most specific payload is the one of the deepest marked node on
    /// the path of `addr`. Since payloads are written once, this is only
    /// the payload of the narrowest range if the narrower ranges were
    /// inserted before the wider ones.
    pub fn lookup_most_specific(&self, addr: IpAddr) -> Option<&T> {
        match addr.to_canonical() {
            IpAddr::V4(addr) => self.find_lowest(IPv4::from_ipaddr(addr)),
            IpAddr::V6(addr) => self.find_lowest(IPv6::from_ipaddr(addr)),
        }
    }

    /// Like [lookup_most_specific](Self::lookup_most_specific), for an
    /// address in raw network byte order.
    pub fn lookup_most_specific_bytes(&self, addr: &[u8]) -> Option<&T> {
        addr_from_bytes(addr).and_then(|addr| self.lookup_most_specific(addr))
    }

    fn find<AF: AddressFamily>(&self, addr: AF) -> bool {
        let mut cur = self.entry(AF::ENTRY);
        if self.node(cur).is_marked() {
            return true;
        }
        for &b in addr.as_bytes() {
            match self.node(cur).child(b) {
                None => return false,
                Some(child) => cur = child,
            }
            if self.node(cur).is_marked() {
                return true;
            }
        }
        false
    }

    // No short cut on the first mark here: a deeper node may have been
    // marked earlier with a different payload.
    fn find_lowest<AF: AddressFamily>(&self, addr: AF) -> Option<&T> {
        let mut cur = self.entry(AF::ENTRY);
        let mut found = self.node(cur).payload();
        for &b in addr.as_bytes() {
            match self.node(cur).child(b) {
                None => break,
                Some(child) => cur = child,
            }
            if let Some(payload) = self.node(cur).payload() {
                found = Some(payload);
            }
        }
        found
    }

    //-------- Nodes --------------------------------------------------------

    fn entry(&self, entry: TrieEntry) -> NodeId {
        match entry {
            TrieEntry::Root => NodeId::ROOT,
            TrieEntry::Ipv4Mapped => self.fast_entry,
        }
    }

    // Node ids are only created by `push_node` and nodes are never removed,
    // so every id indexes into the arena.
    #[allow(clippy::indexing_slicing)]
    fn node(&self, id: NodeId) -> &TrieNode<T> {
        &self.nodes[id.index()]
    }

    #[allow(clippy::indexing_slicing)]
    fn node_mut(&mut self, id: NodeId) -> &mut TrieNode<T> {
        &mut self.nodes[id.index()]
    }

    //-------- Statistics ---------------------------------------------------

    /// The total number of nodes in the trie, including the root and the
    /// IPv4-mapped prefix path.
    pub fn nodes_len(&self) -> usize {
        self.counters.nodes_count()
    }

    /// The number of nodes that carry a payload.
    pub fn marked_len(&self) -> usize {
        self.counters.marked_count()
    }

    /// Whether nothing has been inserted into the trie yet.
    pub fn is_empty(&self) -> bool {
        self.counters.marked_count() == 0
    }

    pub fn stats(&self) -> TrieStats {
        TrieStats {
            created_nodes: self.counters.node_stats(),
            marked_nodes: self.counters.marked_count(),
        }
    }
}

impl<T> Default for AddressTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for AddressTrie<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressTrie")
            .field("fast_entry", &self.fast_entry)
            .field("stats", &self.stats())
            .finish()
    }
}

fn addr_from_bytes(addr: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(addr) {
        return Some(Ipv4Addr::from(v4).into());
    }
    <[u8; 16]>::try_from(addr)
        .ok()
        .map(|v6| Ipv6Addr::from(v6).into())
}
