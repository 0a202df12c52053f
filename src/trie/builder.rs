use log::{debug, trace};

use crate::errors::AddressSpecError;
use crate::stats::InsertReport;
use crate::types::AddressSpec;

use super::config::{IndexConfig, Priority};
use super::AddressTrie;

//------------ AddressIndexBuilder -------------------------------------------

/// Collects address specifications with their payloads, and inserts them
/// into a new [AddressTrie] in the order that the configured [Priority]
/// requires.
///
/// ```
/// use iprange_store::trie::builder::AddressIndexBuilder;
/// use iprange_store::trie::config::IndexConfig;
///
/// let mut builder = AddressIndexBuilder::new(IndexConfig::default());
/// builder.push_str("192.168.100.0/24", 1)?;
/// builder.push_str("192.168.100.1-192.168.100.100", 2)?;
/// let trie = builder.build();
///
/// assert_eq!(trie.lookup_most_specific("192.168.100.1".parse()?), Some(&2));
/// assert_eq!(trie.lookup_most_specific("192.168.100.101".parse()?), Some(&1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AddressIndexBuilder<T> {
    config: IndexConfig,
    specs: Vec<(AddressSpec, T)>,
}

impl<T: Clone> AddressIndexBuilder<T> {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            specs: vec![],
        }
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    pub fn push(&mut self, spec: AddressSpec, payload: T) {
        self.specs.push((spec, payload));
    }

    /// Parse `spec` and push it. Nothing is pushed if `spec` is invalid.
    pub fn push_str(
        &mut self,
        spec: &str,
        payload: T,
    ) -> Result<(), AddressSpecError> {
        let spec = AddressSpec::parse(spec)?;
        self.push(spec, payload);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Create the trie, and return it together with the sum of all the
    /// insert reports.
    pub fn build_with_report(self) -> (AddressTrie<T>, InsertReport) {
        let mut specs = self.specs;
        if self.config.priority == Priority::MostSpecific {
            // sort_by is stable, equally sized specs keep their order.
            specs.sort_by(|(a, _), (b, _)| a.cmp_cardinality(b));
        }

        let mut trie = AddressTrie::new();
        let mut report = InsertReport::default();
        for (spec, payload) in specs {
            let r = trie.insert(&spec, payload);
            if r.is_noop() {
                trace!("{} is completely covered already", spec);
            }
            report += r;
        }

        debug!(
            "built address index ({}): {} nodes, {} marked",
            self.config.priority,
            trie.nodes_len(),
            trie.marked_len()
        );
        (trie, report)
    }

    pub fn build(self) -> AddressTrie<T> {
        self.build_with_report().0
    }
}

impl<T: Clone> Default for AddressIndexBuilder<T> {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl<T: Clone> Extend<(AddressSpec, T)> for AddressIndexBuilder<T> {
    fn extend<I: IntoIterator<Item = (AddressSpec, T)>>(&mut self, iter: I) {
        self.specs.extend(iter);
    }
}
