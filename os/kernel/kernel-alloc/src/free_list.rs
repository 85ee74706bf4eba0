use alloc::vec::Vec;

/// Link value terminating the list.
const END: u32 = u32::MAX;

/// Link value of an entry that is not on the list.
const IN_USE: u32 = u32::MAX - 1;

/// A LIFO free list of indices, linked through an explicit `next` array.
///
/// Every index in `0..capacity` has one link slot:
///
/// ```text
///  head ─► 3 ─► 7 ─► 1 ─► END        next[i] for free i
///                                     IN_USE   for allocated i
/// ```
///
/// The list is built in ascending order, so a fresh list hands out its lowest
/// index first; released indices are pushed on the head.
///
/// # Invariants
/// - The chain from `head` reaches `END` without revisiting an index.
/// - An index is on the chain iff its link is not `IN_USE`.
/// - `free` equals the length of the chain.
pub(crate) struct IndexFreeList {
    next: Vec<u32>,
    head: u32,
    free: u32,
    capacity: u32,
}

impl IndexFreeList {
    /// Build a list over `0..capacity` where indices below `first` start out
    /// in use (reserved) and the rest are free.
    pub(crate) fn new(first: u32, capacity: u32) -> Self {
        debug_assert!(capacity < IN_USE);
        let first = first.min(capacity);
        let mut next = Vec::with_capacity(capacity as usize);
        next.extend((0..first).map(|_| IN_USE));
        next.extend((first..capacity).map(|i| if i + 1 == capacity { END } else { i + 1 }));
        Self {
            next,
            head: if first == capacity { END } else { first },
            free: capacity - first,
            capacity,
        }
    }

    /// Number of indices managed (free or not).
    pub(crate) const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of free indices.
    pub(crate) const fn free(&self) -> u32 {
        self.free
    }

    /// Take the head of the list.
    pub(crate) fn pop(&mut self) -> Option<u32> {
        if self.head == END {
            return None;
        }
        let index = self.head;
        self.head = self.next[index as usize];
        self.next[index as usize] = IN_USE;
        self.free -= 1;
        Some(index)
    }

    /// Return `index` to the head of the list.
    ///
    /// # Panics
    /// If `index` is out of range or already free.
    pub(crate) fn push(&mut self, index: u32) {
        assert!(
            index < self.capacity(),
            "index {index} out of range (capacity {})",
            self.capacity()
        );
        assert_eq!(
            self.next[index as usize], IN_USE,
            "index {index} released while not in use"
        );
        self.next[index as usize] = self.head;
        self.head = index;
        self.free += 1;
    }

    /// `true` if `index` is currently on the list.
    pub(crate) fn is_free(&self, index: u32) -> bool {
        self.next
            .get(index as usize)
            .is_some_and(|&link| link != IN_USE)
    }

    /// Walk the list from its head.
    pub(crate) fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            if cursor == END {
                return None;
            }
            let current = cursor;
            cursor = self.next[current as usize];
            Some(current)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_list_is_ascending_above_reserved() {
        let list = IndexFreeList::new(1, 5);
        assert_eq!(list.capacity(), 5);
        assert_eq!(list.free(), 4);
        assert_eq!(list.iter().collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert!(!list.is_free(0));
        assert!(list.is_free(4));
        assert!(!list.is_free(5));
    }

    #[test]
    fn pop_then_push_is_lifo() {
        let mut list = IndexFreeList::new(0, 3);
        assert_eq!(list.pop(), Some(0));
        assert_eq!(list.pop(), Some(1));
        list.push(0);
        assert_eq!(list.iter().collect::<Vec<_>>(), [0, 2]);
        assert_eq!(list.pop(), Some(0));
        assert_eq!(list.pop(), Some(2));
        assert_eq!(list.pop(), None);
        assert_eq!(list.free(), 0);
    }

    #[test]
    fn empty_lists() {
        let mut none = IndexFreeList::new(0, 0);
        assert_eq!(none.pop(), None);
        let mut reserved = IndexFreeList::new(4, 4);
        assert_eq!(reserved.free(), 0);
        assert_eq!(reserved.pop(), None);
    }

    #[test]
    #[should_panic(expected = "released while not in use")]
    fn double_release_panics() {
        let mut list = IndexFreeList::new(0, 2);
        let i = list.pop().unwrap();
        list.push(i);
        list.push(i);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_release_panics() {
        let mut list = IndexFreeList::new(0, 2);
        list.push(2);
    }

    #[test]
    #[should_panic(expected = "released while not in use")]
    fn releasing_reserved_index_panics() {
        let mut list = IndexFreeList::new(1, 2);
        list.push(0);
    }
}
