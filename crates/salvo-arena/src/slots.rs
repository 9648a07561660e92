//! First-free-slot arena.

use crate::error::ArenaError;
use crate::handle::SlotId;

/// A fixed number of slots, each empty or holding one `T`.
///
/// # Examples
///
/// ```
/// use salvo_arena::{ArenaError, SlotArena};
///
/// let mut pool = SlotArena::new(2).unwrap();
/// let a = pool.allocate("a").unwrap();
/// let _b = pool.allocate("b").unwrap();
/// assert_eq!(pool.allocate("c"), Err(ArenaError::Full { capacity: 2 }));
///
/// pool.release(a);
/// let c = pool.allocate("c").unwrap();
/// assert_eq!(c.index(), 0); // first free slot is reused
/// ```
#[derive(Clone, Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotArena<T> {
    /// Create an arena with `capacity` empty slots.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        if capacity == 0 {
            return Err(ArenaError::ZeroCapacity);
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self { slots })
    }

    /// Place `value` in the lowest-indexed free slot.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Full`] when no slot is free; `value` is dropped.
    pub fn allocate(&mut self, value: T) -> Result<SlotId, ArenaError> {
        let capacity = self.slots.len();
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.is_none())
            .ok_or(ArenaError::Full { capacity })?;
        *slot = Some(value);
        Ok(SlotId(index as u32))
    }

    /// Empty a slot, returning its occupant.
    pub fn release(&mut self, id: SlotId) -> Option<T> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    /// The occupant of a slot.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable access to the occupant of a slot.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (SlotId(i as u32), v)))
    }

    /// Handles of occupied slots in index order.
    ///
    /// Collected eagerly so the caller may mutate or release slots while
    /// walking the list.
    pub fn occupied_ids(&self) -> Vec<SlotId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            SlotArena::<u8>::new(0).unwrap_err(),
            ArenaError::ZeroCapacity
        );
    }

    #[test]
    fn allocates_in_index_order() {
        let mut a = SlotArena::new(3).unwrap();
        assert_eq!(a.allocate(10).unwrap().index(), 0);
        assert_eq!(a.allocate(11).unwrap().index(), 1);
        assert_eq!(a.allocate(12).unwrap().index(), 2);
        assert_eq!(a.occupied(), a.capacity());
        assert_eq!(a.allocate(13), Err(ArenaError::Full { capacity: 3 }));
    }

    #[test]
    fn release_frees_slot_for_reuse() {
        let mut a = SlotArena::new(3).unwrap();
        let _x = a.allocate('x').unwrap();
        let y = a.allocate('y').unwrap();
        let _z = a.allocate('z').unwrap();
        assert_eq!(a.release(y), Some('y'));
        assert_eq!(a.release(y), None);
        let w = a.allocate('w').unwrap();
        assert_eq!(w, y);
        assert_eq!(a.get(w), Some(&'w'));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut a = SlotArena::new(1).unwrap();
        let id = a.allocate(5).unwrap();
        *a.get_mut(id).unwrap() -= 1;
        assert_eq!(a.get(id), Some(&4));
    }

    #[test]
    fn iter_skips_empty_slots() {
        let mut a = SlotArena::new(4).unwrap();
        let ids: Vec<SlotId> = (0..4).map(|v| a.allocate(v).unwrap()).collect();
        a.release(ids[1]);
        a.release(ids[3]);
        let live: Vec<i32> = a.iter().map(|(_, v)| *v).collect();
        assert_eq!(live, vec![0, 2]);
        assert_eq!(a.occupied(), 2);
        assert_eq!(a.occupied_ids(), vec![ids[0], ids[2]]);
    }

    proptest! {
        #[test]
        fn occupancy_never_exceeds_capacity(
            cap in 1usize..16,
            ops in proptest::collection::vec(any::<Option<u8>>(), 0..64),
        ) {
            let mut a = SlotArena::new(cap).unwrap();
            let mut held: Vec<SlotId> = Vec::new();
            for op in ops {
                match op {
                    Some(v) => match a.allocate(v) {
                        Ok(id) => held.push(id),
                        Err(e) => {
                            prop_assert_eq!(e, ArenaError::Full { capacity: cap });
                            prop_assert_eq!(held.len(), cap);
                        }
                    },
                    None => {
                        if let Some(id) = held.pop() {
                            prop_assert!(a.release(id).is_some());
                        }
                    }
                }
                prop_assert_eq!(a.occupied(), held.len());
                prop_assert!(a.occupied() <= a.capacity());
            }
        }
    }
}
