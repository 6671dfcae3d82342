//! Specialized collection types

use crate::error::PhysicsError;

/// Stable reference into an [`IndexedList`]
///
/// The generation guards against a freed slot being reused by a later
/// insertion while an old handle is still held somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle {
    index: usize,
    generation: u32,
}

impl ListHandle {
    /// Slot index inside the list
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug)]
struct Slot<T> {
    item: Option<T>,
    generation: u32,
}

/// Fixed-capacity list with free-slot reuse
///
/// Adding to a full list, or touching an index outside the list's
/// capacity, is logged and skipped rather than treated as fatal.
#[derive(Debug)]
pub struct IndexedList<T> {
    slots: Vec<Slot<T>>,
    openings: Vec<usize>,
    capacity: usize,
}

impl<T> IndexedList<T> {
    /// Create an empty list that holds at most `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            openings: Vec::new(),
            capacity,
        }
    }
    
    /// Maximum number of live items
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    
    /// Number of live items
    pub fn len(&self) -> usize {
        self.slots.len() - self.openings.len()
    }
    
    /// Whether no item is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    
    /// Whether every slot is occupied
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity && self.openings.is_empty()
    }
    
    /// Store an item, reusing the most recently freed slot first
    pub fn add(&mut self, item: T) -> Result<ListHandle, PhysicsError> {
        if let Some(index) = self.openings.pop() {
            let slot = &mut self.slots[index];
            slot.item = Some(item);
            return Ok(ListHandle { index, generation: slot.generation });
        }
        
        if self.slots.len() >= self.capacity {
            log::warn!("IndexedList is full ({} items)", self.capacity);
            return Err(PhysicsError::CapacityExceeded { capacity: self.capacity });
        }
        
        let index = self.slots.len();
        self.slots.push(Slot { item: Some(item), generation: 0 });
        Ok(ListHandle { index, generation: 0 })
    }
    
    /// Remove and return the item behind `handle`
    pub fn remove(&mut self, handle: ListHandle) -> Option<T> {
        if !self.in_range(handle) {
            return None;
        }
        
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.openings.push(handle.index);
        Some(item)
    }
    
    /// Whether `handle` refers to a live item
    pub fn is_valid(&self, handle: ListHandle) -> bool {
        self.get(handle).is_some()
    }
    
    /// Get an item by handle
    pub fn get(&self, handle: ListHandle) -> Option<&T> {
        if !self.in_range(handle) {
            return None;
        }
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.item.as_ref()
    }
    
    /// Get a mutable reference to an item by handle
    pub fn get_mut(&mut self, handle: ListHandle) -> Option<&mut T> {
        if !self.in_range(handle) {
            return None;
        }
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.item.as_mut()
    }
    
    /// Handles of every live item in slot order
    pub fn handles(&self) -> Vec<ListHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }
    
    /// Logs indices outside the list's capacity
    fn in_range(&self, handle: ListHandle) -> bool {
        if handle.index >= self.capacity {
            log::warn!("Invalid IndexedList index {}", handle.index);
            return false;
        }
        true
    }
    
    /// Iterate over live items in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ListHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item
                .as_ref()
                .map(|item| (ListHandle { index, generation: slot.generation }, item))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_add_remove_reuses_slot() {
        let mut list = IndexedList::with_capacity(4);
        let a = list.add("a").unwrap();
        let b = list.add("b").unwrap();
        assert_eq!(list.len(), 2);
        
        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.len(), 1);
        
        let c = list.add("c").unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(list.get(c), Some(&"c"));
        assert_eq!(list.get(b), Some(&"b"));
    }
    
    #[test]
    fn test_stale_handle_is_rejected() {
        let mut list = IndexedList::with_capacity(2);
        let old = list.add(1).unwrap();
        list.remove(old);
        let _new = list.add(2).unwrap();
        
        assert!(!list.is_valid(old));
        assert_eq!(list.get(old), None);
        assert_eq!(list.remove(old), None);
    }
    
    #[test]
    fn test_full_list_reports_capacity() {
        let mut list = IndexedList::with_capacity(1);
        list.add(1).unwrap();
        assert!(list.is_full());
        assert_eq!(list.add(2), Err(PhysicsError::CapacityExceeded { capacity: 1 }));
    }
    
    #[test]
    fn test_out_of_range_index_is_skipped() {
        let mut list: IndexedList<u8> = IndexedList::with_capacity(2);
        let bogus = ListHandle { index: 10, generation: 0 };
        assert_eq!(list.remove(bogus), None);
        assert_eq!(list.get(bogus), None);
        assert_eq!(list.get_mut(bogus), None);
        assert!(!list.is_valid(bogus));
        assert!(list.is_empty());
    }
    
    #[test]
    fn test_iter_skips_holes() {
        let mut list = IndexedList::with_capacity(3);
        let a = list.add('a').unwrap();
        list.add('b').unwrap();
        list.add('c').unwrap();
        list.remove(a);
        
        let items: Vec<char> = list.iter().map(|(_, item)| *item).collect();
        assert_eq!(items, vec!['b', 'c']);
        assert_eq!(list.handles().len(), 2);
    }
}
