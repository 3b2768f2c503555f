//! Node chain and cursor protocol.
//!
//! Nodes live in a vector-backed arena with a free list; links between
//! nodes and the three cursors are slot indices, so advancing or
//! unlinking can never leave a dangling reference. The cursors always
//! lie on one chain in the order `oldest` -> `next_read` -> `newest`:
//! everything strictly before `next_read` has been read, everything
//! from `next_read` onward has not, and only a read node at `oldest`
//! may be released.

use std::mem;

type NodeIndex = usize;

struct Node<T> {
    element: T,
    read_complete: bool,
    next: Option<NodeIndex>,
}

enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<NodeIndex> },
}

pub(crate) struct NodeChain<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<NodeIndex>,
    /// First node not yet removed; `None` when the chain is empty.
    oldest: Option<NodeIndex>,
    /// First node not yet read; `None` when every node has been read.
    next_read: Option<NodeIndex>,
    /// Last inserted node, the append point.
    newest: Option<NodeIndex>,
    len: usize,
}

impl<T> NodeChain<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            oldest: None,
            next_read: None,
            newest: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the read cursor has a node to deliver.
    pub(crate) fn has_unread(&self) -> bool {
        self.next_read.is_some()
    }

    /// True when the oldest node exists and has been read, i.e. the
    /// remove role can reclaim it.
    pub(crate) fn front_removable(&self) -> bool {
        match self.oldest {
            Some(idx) => self.node(idx).read_complete,
            None => false,
        }
    }

    /// Appends an element after `newest`. A fresh node is never
    /// read-complete; if everything previously inserted had been read
    /// (or the chain was empty), the read cursor lands on it.
    pub(crate) fn append(&mut self, element: T) {
        let idx = self.alloc(Node {
            element,
            read_complete: false,
            next: None,
        });
        match self.newest {
            Some(tail) => self.node_mut(tail).next = Some(idx),
            None => self.oldest = Some(idx),
        }
        self.newest = Some(idx);
        if self.next_read.is_none() {
            self.next_read = Some(idx);
        }
        self.len += 1;
    }

    /// Delivers the element at the read cursor, marks its node
    /// read-complete, and advances the cursor. Each node is delivered
    /// exactly once because the cursor only moves forward.
    pub(crate) fn read_advance(&mut self) -> Option<T>
    where
        T: Clone,
    {
        let idx = self.next_read?;
        let node = self.node_mut(idx);
        node.read_complete = true;
        let element = node.element.clone();
        let next = node.next;
        self.next_read = next;
        Some(element)
    }

    /// Unlinks and releases the oldest node, but only once the read
    /// cursor has passed it. This is the sole point where a node leaves
    /// the arena.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let idx = self.oldest?;
        if !self.node(idx).read_complete {
            return None;
        }
        let node = self.release(idx);
        self.oldest = node.next;
        if self.oldest.is_none() {
            // Popped node was read-complete, so the read cursor had
            // already left the chain.
            debug_assert!(self.next_read.is_none());
            self.newest = None;
        }
        self.len -= 1;
        Some(node.element)
    }

    fn alloc(&mut self, node: Node<T>) -> NodeIndex {
        match self.free_head {
            Some(idx) => {
                self.free_head = match self.slots[idx] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.slots[idx] = Slot::Occupied(node);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: NodeIndex) -> Node<T> {
        let slot = mem::replace(
            &mut self.slots[idx],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(idx);
        match slot {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("released a vacant slot"),
        }
    }

    fn node(&self, idx: NodeIndex) -> &Node<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("cursor points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut Node<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("cursor points at a vacant slot"),
        }
    }

    /// Walks the chain and checks the cursor invariants.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut reached_read_cursor = false;
        let mut count = 0;
        let mut last = None;
        let mut cursor = self.oldest;
        while let Some(idx) = cursor {
            if self.next_read == Some(idx) {
                reached_read_cursor = true;
            }
            let node = self.node(idx);
            // read_complete holds exactly for nodes before the read cursor.
            assert_eq!(node.read_complete, !reached_read_cursor);
            last = Some(idx);
            count += 1;
            cursor = node.next;
        }
        assert_eq!(count, self.len);
        assert_eq!(last, self.newest);
        if self.next_read.is_some() {
            assert!(reached_read_cursor, "read cursor is off the chain");
        }
        if let Some(tail) = self.newest {
            assert!(self.node(tail).next.is_none());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_is_empty() {
        let chain: NodeChain<u32> = NodeChain::new();
        assert!(chain.is_empty());
        assert!(!chain.has_unread());
        assert!(!chain.front_removable());
        chain.assert_invariants();
    }

    #[test]
    fn test_append_makes_data_readable_not_removable() {
        let mut chain = NodeChain::new();
        chain.append(7u32);
        chain.assert_invariants();
        assert_eq!(chain.len(), 1);
        assert!(chain.has_unread());
        assert!(!chain.front_removable());
    }

    #[test]
    fn test_read_then_pop_round_trips_element() {
        let mut chain = NodeChain::new();
        chain.append(42u32);
        assert_eq!(chain.read_advance(), Some(42));
        chain.assert_invariants();
        assert!(chain.front_removable());
        assert_eq!(chain.pop_front(), Some(42));
        chain.assert_invariants();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_pop_refused_until_read_passes() {
        let mut chain = NodeChain::new();
        chain.append(1u32);
        chain.append(2u32);
        assert_eq!(chain.pop_front(), None);
        assert_eq!(chain.read_advance(), Some(1));
        chain.assert_invariants();
        assert_eq!(chain.pop_front(), Some(1));
        // Second node still unread, so it stays put.
        assert_eq!(chain.pop_front(), None);
        chain.assert_invariants();
    }

    #[test]
    fn test_read_cursor_lands_on_late_append() {
        let mut chain = NodeChain::new();
        chain.append(1u32);
        assert_eq!(chain.read_advance(), Some(1));
        assert!(!chain.has_unread());
        // Everything read; a new node must become the read cursor.
        chain.append(2u32);
        chain.assert_invariants();
        assert!(chain.has_unread());
        assert_eq!(chain.read_advance(), Some(2));
    }

    #[test]
    fn test_fifo_order_preserved_across_cursors() {
        let mut chain = NodeChain::new();
        for i in 0..10u32 {
            chain.append(i);
            chain.assert_invariants();
        }
        for i in 0..10 {
            assert_eq!(chain.read_advance(), Some(i));
            chain.assert_invariants();
        }
        for i in 0..10 {
            assert_eq!(chain.pop_front(), Some(i));
            chain.assert_invariants();
        }
        assert!(chain.is_empty());
        assert_eq!(chain.pop_front(), None);
        assert_eq!(chain.read_advance(), None);
    }

    #[test]
    fn test_free_list_reuses_slots() {
        let mut chain = NodeChain::new();
        for i in 0..4u32 {
            chain.append(i);
            chain.read_advance();
            chain.pop_front();
        }
        // Every node was released before the next was allocated, so the
        // arena never grew past one slot.
        assert_eq!(chain.slots.len(), 1);
        chain.assert_invariants();
    }

    #[test]
    fn test_interleaved_read_pop_append() {
        let mut chain = NodeChain::new();
        chain.append(1u32);
        chain.append(2u32);
        assert_eq!(chain.read_advance(), Some(1));
        chain.append(3u32);
        assert_eq!(chain.pop_front(), Some(1));
        assert_eq!(chain.read_advance(), Some(2));
        assert_eq!(chain.read_advance(), Some(3));
        chain.assert_invariants();
        assert_eq!(chain.pop_front(), Some(2));
        assert_eq!(chain.pop_front(), Some(3));
        assert_eq!(chain.pop_front(), None);
        chain.assert_invariants();
    }
}
