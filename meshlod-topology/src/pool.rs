//! Slot arena with free-list reuse

use std::ops::{Index, IndexMut};

/// Growable arena of `T` addressed by dense indices.
///
/// Removing an element frees its slot; the most recently freed slot is reused
/// by the next insertion.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Store `item` and return its index
    pub fn insert(&mut self, item: T) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(item);
                index
            }
            None => {
                self.slots.push(Some(item));
                self.slots.len() - 1
            }
        }
    }

    /// Remove the element at `index`, returning it if the slot was live
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(item)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live elements in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (i, item)))
    }

    /// Indices of live elements in increasing order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(i, _)| i)
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!("stale pool index {}", index),
        }
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("stale pool index {}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_reuse() {
        let mut pool = Pool::new();
        let a = pool.insert('a');
        let b = pool.insert('b');
        let c = pool.insert('c');
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(pool.len(), 3);

        assert_eq!(pool.remove(b), Some('b'));
        assert_eq!(pool.remove(b), None);
        assert!(!pool.contains(b));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.capacity(), 3);

        // freed slot is handed out again
        assert_eq!(pool.insert('d'), b);
        assert_eq!(pool[b], 'd');
        assert_eq!(pool.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_lifo_reuse() {
        let mut pool: Pool<u8> = (0..4).fold(Pool::new(), |mut p, i| {
            p.insert(i);
            p
        });
        pool.remove(0);
        pool.remove(2);
        assert_eq!(pool.insert(9), 2);
        assert_eq!(pool.insert(9), 0);
        assert_eq!(pool.insert(9), 4);
    }

    #[test]
    #[should_panic(expected = "stale pool index")]
    fn test_stale_index_panics() {
        let mut pool = Pool::new();
        let a = pool.insert(1u32);
        pool.remove(a);
        let _ = pool[a];
    }
}
