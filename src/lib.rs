#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

//! A library that provides an index of IP address ranges, for IPv4 and IPv6
//! in one data structure.
//!
//! Ranges are specified as CIDR prefixes (`192.168.0.0/16`), single
//! addresses (`2001:db8::68`), or as two explicit endpoints
//! (`192.168.10.10-192.168.20.9`). These specifications are parsed into an
//! [AddressSpec], which knows the exact number of addresses it covers.
//!
//! The index itself is an [AddressTrie]: a 256-ary trie with one level per
//! address byte, that answers whether an address is covered by any of the
//! inserted specifications, and what the payload of the most specific
//! covering specification is. An arbitrary range is decomposed into the
//! minimal set of trie nodes that covers it exactly, so a range costs at
//! most a few nodes per address byte.
//!
//! Payloads are written once per node. The order of insertion thus decides
//! which of a set of overlapping specifications wins; the
//! [AddressIndexBuilder](trie::builder::AddressIndexBuilder) takes care of
//! inserting the narrowest specifications first.
mod types;

// Public Interfaces on the root of the crate

/// The address trie, and the builder and configuration for it
pub mod trie;

pub use trie::AddressTrie;

/// Parsed address specifications: CIDR prefixes and explicit ranges
pub use types::{AddressSpec, SpecKind};

/// Error types returned while parsing address specifications
pub use types::errors;

/// Trait that defines the byte representation of IPv4 and IPv6 addresses in
/// the trie.
pub use types::AddressFamily;

/// The underlying value (network endian u32) for IPv4 addresses.
pub use types::af::IPv4;
/// The underlying value (network endian u128) for IPv6 addresses.
pub use types::af::IPv6;

pub use types::{TrieEntry, IPV4_MAPPED_PREFIX};

/// Statistics types returned by methods on the trie
pub use types::stats;

// re-exports
pub use num_bigint::BigUint;
