//------------ Types for Statistics -----------------------------------------

use std::fmt::{Debug, Display};

use serde_derive::Serialize;

/// The depth of the trie: one level per byte of the canonical 16 byte
/// address, plus the root.
pub(crate) const DEPTH_LEVELS: usize = 17;

//------------ CreatedNodes --------------------------------------------------

#[derive(Copy, Clone, Serialize)]
pub struct CreatedNodes {
    pub depth_level: u8,
    pub count: usize,
}

impl Debug for CreatedNodes {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_fmt(format_args!("/{}: {}", &self.depth_level, &self.count))
    }
}

//------------ Counters -----------------------------------------------------
//
// This is the struct that's part of the trie itself, it is updated on every
// node creation and every mark.

#[derive(Debug)]
pub(crate) struct Counters {
    // number of created nodes per depth level, the root is level 0.
    nodes: [usize; DEPTH_LEVELS],
    // number of nodes that carry a payload.
    marked: usize,
}

impl Counters {
    pub fn nodes_count(&self) -> usize {
        self.nodes.iter().sum()
    }

    pub fn inc_nodes_count(&mut self, depth_level: u8) {
        if let Some(n) = self.nodes.get_mut(depth_level as usize) {
            *n += 1;
        }
    }

    pub fn marked_count(&self) -> usize {
        self.marked
    }

    pub fn inc_marked_count(&mut self) {
        self.marked += 1;
    }

    pub fn node_stats(&self) -> Vec<CreatedNodes> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(depth, count)| -> Option<CreatedNodes> {
                if *count != 0 {
                    Some(CreatedNodes {
                        depth_level: depth as u8,
                        count: *count,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            nodes: [0; DEPTH_LEVELS],
            marked: 0,
        }
    }
}

//------------ TrieStats -----------------------------------------------------

/// A snapshot of the size of an
/// [AddressTrie](crate::trie::AddressTrie).
#[derive(Clone, Serialize)]
pub struct TrieStats {
    /// Number of nodes per depth level, levels without nodes are left out.
    pub created_nodes: Vec<CreatedNodes>,
    /// Number of nodes that carry a payload.
    pub marked_nodes: usize,
}

impl TrieStats {
    pub fn nodes(&self) -> usize {
        self.created_nodes.iter().map(|n| n.count).sum()
    }

    /// Rough memory usage of the nodes in bytes: every node holds 256
    /// child handles of 4 bytes.
    pub fn mem_usage(&self) -> usize {
        self.nodes() * 256 * 4
    }
}

impl Debug for TrieStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nodes:{:>8?} marked:{:>8?} {:?} ({}k)",
            self.nodes(),
            self.marked_nodes,
            &self.created_nodes,
            self.mem_usage() / 1024
        )
    }
}

impl Display for TrieStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "nodes :\t{}", self.nodes())?;
        writeln!(f, "marked nodes :\t{}", self.marked_nodes)?;
        for n in &self.created_nodes {
            writeln!(f, "depth {:>2} :\t{}", n.depth_level, n.count)?;
        }
        Ok(())
    }
}

//------------ InsertReport --------------------------------------------------

/// What an insertion changed in the trie. An insertion of a region that is
/// already completely covered reports zeros for both fields.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct InsertReport {
    /// The number of nodes that were created.
    pub nodes_created: usize,
    /// The number of nodes that received the payload.
    pub marks_set: usize,
}

impl InsertReport {
    pub fn is_noop(&self) -> bool {
        self.marks_set == 0
    }
}

impl std::ops::AddAssign for InsertReport {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_created += rhs.nodes_created;
        self.marks_set += rhs.marks_set;
    }
}

impl std::ops::Add for InsertReport {
    type Output = InsertReport;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            nodes_created: self.nodes_created + rhs.nodes_created,
            marks_set: self.marks_set + rhs.marks_set,
        }
    }
}
