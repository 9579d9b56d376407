//! A linked list that flattens all its nodes onto a Vec for storage, gaining
//! data locality and O(1) random access to any node whose handle you kept.

use std::collections::TryReserveError;

/// Alias for the index of a node in the list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in the list.
#[derive(Clone)]
struct Node<T> {
    /// The value being stored.
    value: T,

    /// The node before this one, if this isn't the head.
    prev: Option<NodeHandle>,

    /// The node after this one, if this isn't the tail.
    next: Option<NodeHandle>,
}

/// Keeps entries in the order they were appended. Every node sits in one
/// contiguous Vec and is addressed by its position in it. Removed slots are
/// freelisted and reused by later appends, so a handle is only meaningful
/// while the node it names is still linked.
///
/// Handing out a NodeHandle on append is the whole point: the map keeps the
/// handle in its lookup table and can unlink the node later without walking
/// the list.
#[derive(Clone)]
pub(crate) struct OrderList<T> {
    /// The nodes in the list. `None` marks a slot that's on the freelist.
    store: Vec<Option<Node<T>>>,

    /// Slots in the store which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The oldest node in the list.
    head: Option<NodeHandle>,

    /// The youngest node in the list.
    tail: Option<NodeHandle>,
}

impl<T> OrderList<T> {
    /// Creates a new list with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// The number of linked nodes.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.node(node).map(|n| &n.value)
    }

    pub(crate) fn get_mut(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.store
            .get_mut(node.0)
            .and_then(Option::as_mut)
            .map(|n| &mut n.value)
    }

    pub(crate) fn head(&self) -> Option<NodeHandle> {
        self.head
    }

    /// The node that follows `node`, if any.
    pub(crate) fn next(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).and_then(|n| n.next)
    }

    /// Appends t to the back of the list and returns a handle to its node.
    pub(crate) fn push_back(&mut self, t: T) -> NodeHandle {
        let n = Node {
            value: t,
            prev: self.tail,
            next: None,
        };

        // reuse a freelisted slot if there is one, otherwise grow the store
        let idx = match self.free.pop() {
            Some(idx) => {
                self.store[idx.0] = Some(n);
                idx
            }
            None => {
                self.store.push(Some(n));
                NodeHandle(self.store.len() - 1)
            }
        };

        match self.tail.and_then(|tail| self.node_mut(tail)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);

        idx
    }

    /// Unlinks an arbitrary node and hands back its value. Returns None if
    /// the handle doesn't name a linked node.
    pub(crate) fn remove(&mut self, node: NodeHandle) -> Option<T> {
        let removed = self.store.get_mut(node.0)?.take()?;

        // stitch the neighbours together so the node no longer exists in the
        // chain, then freelist its slot
        match removed.prev.and_then(|prev| self.node_mut(prev)) {
            Some(prev) => prev.next = removed.next,
            None => self.head = removed.next,
        }
        match removed.next.and_then(|next| self.node_mut(next)) {
            Some(next) => next.prev = removed.prev,
            None => self.tail = removed.prev,
        }

        self.free.push(node);

        Some(removed.value)
    }

    /// Clears the list. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.store.reserve(additional.saturating_sub(self.free.len()));
    }

    pub(crate) fn try_reserve(
        &mut self,
        additional: usize,
    ) -> Result<(), TryReserveError> {
        self.store
            .try_reserve(additional.saturating_sub(self.free.len()))
    }

    /// Walks the values from head to tail.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            idx: self.head,
            list: self,
        }
    }

    #[cfg(test)]
    fn reverse_iter(&self) -> ReverseIter<'_, T> {
        ReverseIter {
            idx: self.tail,
            list: self,
        }
    }

    fn node(&self, node: NodeHandle) -> Option<&Node<T>> {
        self.store.get(node.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, node: NodeHandle) -> Option<&mut Node<T>> {
        self.store.get_mut(node.0).and_then(Option::as_mut)
    }

    /// Walks the chain in both directions and makes sure each agrees with
    /// the node count.
    #[cfg(test)]
    pub(crate) fn continuity_test(&self) {
        let mut count = 0;
        for _item in self.iter() {
            count += 1;
            assert!(count <= self.len());
        }
        assert_eq!(self.len(), count);

        count = 0;
        for _item in self.reverse_iter() {
            count += 1;
            assert!(count <= self.len());
        }
        assert_eq!(self.len(), count);

        assert_eq!(self.head.is_none(), self.tail.is_none());
        assert_eq!(self.len() == 0, self.head.is_none());
    }
}

pub(crate) struct Iter<'a, T> {
    idx: Option<NodeHandle>,
    list: &'a OrderList<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.idx?)?;
        self.idx = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
struct ReverseIter<'z, T> {
    idx: Option<NodeHandle>,
    list: &'z OrderList<T>,
}

#[cfg(test)]
impl<'z, T> Iterator for ReverseIter<'z, T> {
    type Item = &'z T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.idx?)?;
        self.idx = node.prev;
        Some(&node.value)
    }
}
