//------------ Config --------------------------------------------------------

//! Configuration options for building an address index.
//!
//! A configuration is created by instantiating [IndexConfig], setting the
//! priority on it, and passing it in as an argument to
//! [AddressIndexBuilder::new](super::builder::AddressIndexBuilder::new).
//!
//! ```
//! use iprange_store::trie::builder::AddressIndexBuilder;
//! use iprange_store::trie::config::{IndexConfig, Priority};
//!
//! let config = IndexConfig { priority: Priority::InsertionOrder };
//! let builder = AddressIndexBuilder::<u32>::new(config);
//! ```

use serde_derive::{Deserialize, Serialize};

//------------ Priority ------------------------------------------------------

/// Defines which of a number of overlapping specifications provides the
/// payload for the addresses they have in common.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// The specification covering the fewest addresses wins. Specifications
    /// are inserted in ascending order of their cardinality, specifications
    /// with equal cardinality keep the order in which they were pushed.
    MostSpecific,
    /// The specification that was pushed first wins, regardless of its
    /// size.
    InsertionOrder,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Priority::MostSpecific => write!(f, "most-specific"),
            Priority::InsertionOrder => write!(f, "insertion-order"),
        }
    }
}

//------------ IndexConfig ---------------------------------------------------

/// The configuration of an
/// [AddressIndexBuilder](super::builder::AddressIndexBuilder). The default
/// configuration uses [Priority::MostSpecific].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    Priority::MostSpecific
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
        }
    }
}
