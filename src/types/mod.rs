pub(crate) mod address_spec;
pub(crate) mod af;

pub use address_spec::{AddressSpec, SpecKind};
pub use af::{AddressFamily, TrieEntry, IPV4_MAPPED_PREFIX};

pub mod errors;
pub mod stats;

#[cfg(test)]
mod tests;
