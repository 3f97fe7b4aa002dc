//! # Overflow Buffer
//!
//! Bounded FIFO that overwrites its oldest entry instead of failing.
//!
//! Used for the edge-point streams, per-row metadata and rollback history.
//! Entries are addressed by an absolute sequence number, so several buffers
//! that are pushed and popped in lock-step keep agreeing on what index `n`
//! means long after their oldest entries were recycled.

/// A fixed-size FIFO with pooled slots.
///
/// Slots are allocated once and recycled in place: when full, a push
/// overwrites the oldest entry. [`OverflowBuffer::push_slot`] hands out the
/// recycled slot directly so callers can fill it without building a
/// temporary value.
///
/// # Thread Safety
///
/// This buffer is NOT thread-safe.
///
/// # Example
///
/// ```rust,ignore
/// let mut rows: OverflowBuffer<RowInfo> = OverflowBuffer::new(4096);
///
/// let seq = rows.total();
/// rows.push(row);
/// assert_eq!(rows.get(seq), Some(&row));
/// ```
pub struct OverflowBuffer<T> {
    /// The pooled slots.
    slots: Box<[T]>,
    /// Physical index of the oldest entry.
    start: usize,
    /// Number of resident entries.
    len: usize,
    /// Sequence number the next push will receive.
    total: u64,
    /// Number of entries lost to overwriting.
    overwritten: u64,
}

impl<T: Default> OverflowBuffer<T> {
    /// Creates a new buffer with the specified capacity.
    ///
    /// All slots are initialized to `T::default()` upfront.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots: Vec<T> = (0..capacity).map(|_| T::default()).collect();

        Self {
            slots: slots.into_boxed_slice(),
            start: 0,
            len: 0,
            total: 0,
            overwritten: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of resident entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is resident.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sequence number of the next push (= number of live pushes ever made).
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Sequence number of the oldest resident entry.
    #[inline]
    #[must_use]
    pub const fn oldest(&self) -> u64 {
        self.total - self.len as u64
    }

    /// Number of entries recycled by overflow so far.
    #[inline]
    #[must_use]
    pub const fn overwritten(&self) -> u64 {
        self.overwritten
    }

    #[inline]
    fn physical(&self, offset: usize) -> usize {
        (self.start + offset) % self.capacity()
    }

    /// Reserves the next sequence number and returns its slot for in-place
    /// writing. The slot still holds whatever entry last used it.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    pub fn push_slot(&mut self) -> &mut T {
        let index = if self.len == self.capacity() {
            let recycled = self.start;
            self.start = (self.start + 1) % self.capacity();
            self.overwritten += 1;
            recycled
        } else {
            let index = self.physical(self.len);
            self.len += 1;
            index
        };
        self.total += 1;
        &mut self.slots[index]
    }

    /// Appends an entry, overwriting the oldest one when full.
    ///
    /// Returns the sequence number assigned to the entry.
    pub fn push(&mut self, value: T) -> u64 {
        let seq = self.total;
        *self.push_slot() = value;
        seq
    }

    /// Removes and returns the newest entry.
    ///
    /// The slot is reset to `T::default()` and stays pooled.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let index = self.physical(self.len - 1);
        self.len -= 1;
        self.total -= 1;
        Some(std::mem::take(&mut self.slots[index]))
    }

    /// Gets an entry by absolute sequence number.
    ///
    /// Returns `None` if the entry was overwritten or never pushed.
    #[inline]
    #[must_use]
    pub fn get(&self, seq: u64) -> Option<&T> {
        if seq < self.oldest() || seq >= self.total {
            return None;
        }
        let offset = usize::try_from(seq - self.oldest()).ok()?;
        self.slots.get(self.physical(offset))
    }

    /// The newest entry.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.total.checked_sub(1).and_then(|seq| self.get(seq))
    }

    /// Forgets every entry and restarts numbering at zero.
    ///
    /// This is a **zero-heap-allocation** operation.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = T::default();
        }
        self.start = 0;
        self.len = 0;
        self.total = 0;
        self.overwritten = 0;
    }

    /// Iterates resident entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |offset| &self.slots[self.physical(offset)])
    }
}

impl<T> std::fmt::Debug for OverflowBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverflowBuffer")
            .field("len", &self.len)
            .field("total", &self.total)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
