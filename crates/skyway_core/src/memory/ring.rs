//! # Ring Deque
//!
//! Fixed-capacity double-ended queue holding the live window of tiles and addons.

use super::CapacityError;

/// A double-ended queue with a capacity fixed at construction.
///
/// Index 0 is always the oldest element. Pushing and popping at either end
/// and indexed access are all **O(1)**; the backing storage never grows.
///
/// # Thread Safety
///
/// This deque is NOT thread-safe. The generator owns it exclusively.
///
/// # Example
///
/// ```rust,ignore
/// let mut window: RingDeque<Tile> = RingDeque::new(max_segments + 1);
///
/// window.push_back(tile)?;       // generation end
/// let old = window.pop_front();  // trim end
/// ```
pub struct RingDeque<T> {
    /// The storage array.
    slots: Box<[Option<T>]>,
    /// Physical index of the oldest element.
    head: usize,
    /// Number of live elements.
    len: usize,
}

impl<T> RingDeque<T> {
    /// Creates a new deque with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();

        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the deque holds nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if another push would fail.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.head + index) % self.capacity()
    }

    /// Appends an element at the back (newest end).
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the deque is full.
    pub fn push_back(&mut self, value: T) -> Result<(), CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                capacity: self.capacity(),
            });
        }
        let slot = self.physical(self.len);
        self.slots[slot] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Prepends an element at the front (oldest end).
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the deque is full.
    pub fn push_front(&mut self, value: T) -> Result<(), CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                capacity: self.capacity(),
            });
        }
        self.head = (self.head + self.capacity() - 1) % self.capacity();
        self.slots[self.head] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        value
    }

    /// Removes and returns the newest element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let slot = self.physical(self.len - 1);
        self.len -= 1;
        self.slots[slot].take()
    }

    /// Gets an element by logical index (0 = oldest).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Gets a mutable element by logical index (0 = oldest).
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    /// The oldest element.
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// The newest element.
    #[inline]
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// The newest element, mutably.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        match self.len.checked_sub(1) {
            Some(i) => self.get_mut(i),
            None => None,
        }
    }

    /// Drops every element, keeping the storage.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Iterates mutably from oldest to newest.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        let head = self.head;
        let len = self.len;
        let capacity = self.capacity();
        let (wrapped, tail) = self.slots.split_at_mut(head);
        let first = tail.len().min(len);
        let second = len - first;
        tail[..first]
            .iter_mut()
            .chain(wrapped[..second.min(capacity)].iter_mut())
            .filter_map(Option::as_mut)
    }
}

impl<T> std::fmt::Debug for RingDeque<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingDeque")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
