use std::fmt::Debug;
use std::num::NonZeroU32;

//------------ NodeId --------------------------------------------------------

// A handle to a node in the arena of an `AddressTrie`. The handle stores the
// index in the arena plus one, so that an `Option<NodeId>` takes no more
// space than the handle itself. A child array of 256 of them is 1 KiB.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(NonZeroU32::MIN);

    // Returns `None` if the arena has outgrown the handle.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(NodeId)
    }

    pub(crate) fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index())
    }
}

//------------ TrieNode ------------------------------------------------------

// A node in the byte trie. Every node has room for 256 children, one for
// each value of the address byte at its depth, and an optional payload. A
// node that carries a payload is "marked": every address whose path runs
// through this node is covered. The payload is written at most once.
pub(crate) struct TrieNode<T> {
    children: [Option<NodeId>; 256],
    payload: Option<T>,
    depth: u8,
}

impl<T> TrieNode<T> {
    pub(crate) fn new(depth: u8) -> Self {
        TrieNode {
            children: [None; 256],
            payload: None,
            depth,
        }
    }

    pub(crate) fn child(&self, byte: u8) -> Option<NodeId> {
        self.children.get(byte as usize).copied().flatten()
    }

    pub(crate) fn set_child(&mut self, byte: u8, id: NodeId) {
        if let Some(slot) = self.children.get_mut(byte as usize) {
            *slot = Some(id);
        }
    }

    pub(crate) fn is_marked(&self) -> bool {
        self.payload.is_some()
    }

    pub(crate) fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub(crate) fn depth(&self) -> u8 {
        self.depth
    }

    // First write wins: returns false, and leaves the node alone, if it was
    // already marked.
    pub(crate) fn mark(&mut self, payload: T) -> bool {
        if self.payload.is_some() {
            return false;
        }
        self.payload = Some(payload);
        true
    }

    pub(crate) fn children_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }
}

impl<T: Debug> Debug for TrieNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrieNode")
            .field("depth", &self.depth)
            .field("children", &self.children_count())
            .field("payload", &self.payload)
            .finish()
    }
}
