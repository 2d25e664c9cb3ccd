//! Bounded attribute set.
//!
//! Holds the attributes seen since the last operator tag. Storage is a
//! fixed arena of [`MAX_ATTRIBUTES`] slots plus a bitmask free list; the
//! member index is an Ullman set: `position[id]` points into `members`, and
//! membership is re-derived on every lookup (`position[id] < size` and the
//! member at that position carries `id`). `position` is therefore never
//! cleared, and `empty()` costs O(slots) instead of O(ID space).

use super::attribute::{ArrayPayload, Attribute, Number};
use crate::model::attributes::MAX_ATTRIBUTE_ID;
use crate::model::{AttributeId, Shape};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// No operator takes more than this many distinct attributes.
pub const MAX_ATTRIBUTES: usize = 8;

const ALL_FREE: u8 = ((1u16 << MAX_ATTRIBUTES) - 1) as u8;

static NEXT_SET_IDENT: AtomicU32 = AtomicU32::new(1);

/// A slot checked out by [`AttributeSet::get_new`], to be filled and passed
/// back to [`AttributeSet::add`] on the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeHandle {
    set: u32,
    slot: u8,
}

impl AttributeHandle {
    pub const fn slot(self) -> u8 {
        self.slot
    }
}

/// The working set of attributes for the next operator.
pub struct AttributeSet {
    ident: u32,
    slots: [Attribute; MAX_ATTRIBUTES],
    position: [u8; MAX_ATTRIBUTE_ID as usize + 1],
    members: [u8; MAX_ATTRIBUTES],
    size: usize,
    free: u8,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self {
            ident: NEXT_SET_IDENT.fetch_add(1, Ordering::Relaxed),
            slots: std::array::from_fn(|i| Attribute::vacant(i as u8)),
            position: [0; MAX_ATTRIBUTE_ID as usize + 1],
            members: [0; MAX_ATTRIBUTES],
            size: 0,
            free: ALL_FREE,
        }
    }

    /// Check out the lowest free slot, or `None` when all slots are in use.
    pub fn get_new(&mut self) -> Option<AttributeHandle> {
        if self.free == 0 {
            return None;
        }
        let slot = self.free.trailing_zeros() as u8;
        self.free &= !(1 << slot);
        Some(AttributeHandle {
            set: self.ident,
            slot,
        })
    }

    /// The attribute behind a checked-out handle, for filling in.
    ///
    /// # Panics
    /// If the handle belongs to another set.
    pub fn slot_mut(&mut self, handle: AttributeHandle) -> &mut Attribute {
        self.check_handle(handle);
        &mut self.slots[handle.slot as usize]
    }

    /// Add a filled attribute to the set.
    ///
    /// If an attribute with the same ID is present it is replaced: the last
    /// value wins, the old value is released and its slot freed.
    ///
    /// # Panics
    /// If the handle did not come from this set's `get_new`, or was already
    /// added. Neither can be caused by stream content.
    pub fn add(&mut self, handle: AttributeHandle) -> &Attribute {
        self.check_handle(handle);
        let slot = handle.slot as usize;
        assert!(
            self.free & (1 << slot) == 0,
            "attribute slot {slot} was not checked out"
        );
        assert!(
            !self.members[..self.size].contains(&handle.slot),
            "attribute slot {slot} added twice"
        );

        let id = self.slots[slot].id;
        match self.position_of(id) {
            Some(pos) => {
                let old = self.members[pos] as usize;
                self.members[pos] = handle.slot;
                self.slots[old].release();
                self.free |= 1 << old;
            }
            None => {
                if id.is_indexable() {
                    self.position[id.0 as usize] = self.size as u8;
                }
                self.members[self.size] = handle.slot;
                self.size += 1;
            }
        }
        &self.slots[slot]
    }

    /// Add a scalar attribute in one step.
    pub fn insert_scalar(&mut self, id: AttributeId, n: Number) -> Option<&Attribute> {
        let handle = self.get_new()?;
        self.slot_mut(handle).set_scalar(id, n);
        Some(self.add(handle))
    }

    /// Add an array, xy or box attribute in one step.
    pub fn insert_array(
        &mut self,
        id: AttributeId,
        shape: Shape,
        payload: ArrayPayload,
    ) -> Option<&Attribute> {
        let handle = self.get_new()?;
        self.slot_mut(handle).set_array(id, shape, payload);
        Some(self.add(handle))
    }

    /// Release every value and make all slots available again.
    ///
    /// Safe to call any number of times.
    pub fn empty(&mut self) {
        for slot in &mut self.slots {
            slot.release();
        }
        self.size = 0;
        self.free = ALL_FREE;
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots not referenced by a member or a pending handle.
    pub const fn free_slots(&self) -> u32 {
        self.free.count_ones()
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn get(&self, id: AttributeId) -> Option<&Attribute> {
        self.position_of(id)
            .map(|pos| &self.slots[self.members[pos] as usize])
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.members[..self.size]
            .iter()
            .map(|&slot| &self.slots[slot as usize])
    }

    fn position_of(&self, id: AttributeId) -> Option<usize> {
        if id.is_indexable() {
            let pos = self.position[id.0 as usize] as usize;
            (pos < self.size && self.slots[self.members[pos] as usize].id == id).then_some(pos)
        } else {
            self.members[..self.size]
                .iter()
                .position(|&slot| self.slots[slot as usize].id == id)
        }
    }

    fn check_handle(&self, handle: AttributeHandle) {
        assert_eq!(
            handle.set, self.ident,
            "attribute handle does not belong to this set"
        );
        assert_eq!(
            self.slots[handle.slot as usize].slot_index(),
            handle.slot,
            "attribute slot index mismatch"
        );
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSet")
            .field("members", &self.iter().collect::<Vec<_>>())
            .field("free", &format_args!("{:#010b}", self.free))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_new_takes_lowest_free_slot() {
        let mut set = AttributeSet::new();
        let a = set.get_new().unwrap();
        let b = set.get_new().unwrap();
        assert_eq!((a.slot(), b.slot()), (0, 1));
        set.slot_mut(a).set_scalar(AttributeId::NULL_PEN, Number::UByte(0));
        set.add(a);
        set.empty();
        assert_eq!(set.get_new().unwrap().slot(), 0);
    }

    #[test]
    fn test_position_garbage_is_ignored() {
        let mut set = AttributeSet::new();
        set.insert_scalar(AttributeId::NULL_PEN, Number::UByte(0));
        set.insert_scalar(AttributeId::NULL_BRUSH, Number::UByte(0));
        set.empty();
        // position[NULL_BRUSH] still says 1, but size is 0
        assert!(!set.contains(AttributeId::NULL_BRUSH));
        set.insert_scalar(AttributeId::GRAY_LEVEL, Number::UByte(9));
        set.insert_scalar(AttributeId::PEN_WIDTH, Number::UByte(2));
        // position[NULL_BRUSH] == 1 < size, but member 1 is PenWidth
        assert!(!set.contains(AttributeId::NULL_BRUSH));
        assert!(set.contains(AttributeId::PEN_WIDTH));
    }

    #[test]
    #[should_panic(expected = "does not belong to this set")]
    fn test_foreign_handle_panics() {
        let mut a = AttributeSet::new();
        let mut b = AttributeSet::new();
        let handle = a.get_new().unwrap();
        b.add(handle);
    }

    #[test]
    #[should_panic(expected = "added twice")]
    fn test_double_add_panics() {
        let mut set = AttributeSet::new();
        let handle = set.get_new().unwrap();
        set.slot_mut(handle)
            .set_scalar(AttributeId::NULL_PEN, Number::UByte(0));
        set.add(handle);
        set.add(handle);
    }
}
