//! Byte-granular bump arena.
//!
//! A [`ByteArena`] reserves its whole capacity at creation and advances a
//! cursor on every allocation. The backing `Vec` never reallocates, so
//! the base address is stable for the arena's lifetime.

use kiln_core::BlobRange;

use crate::error::ArenaError;

/// A fixed-capacity bump allocator over bytes.
///
/// Used for converted asset data and for dependency path strings. There
/// is no per-allocation free; the only way to reclaim space is
/// [`reset`](ByteArena::reset), which invalidates every range handed out.
pub struct ByteArena {
    name: &'static str,
    /// Backing storage. `data.len()` is the bump cursor; the reserved
    /// `Vec` capacity is at least `capacity`.
    data: Vec<u8>,
    capacity: usize,
}

impl ByteArena {
    /// Reserve a new arena of `capacity` bytes.
    ///
    /// Capacities above `u32::MAX` are clamped, since ranges use `u32`
    /// offsets.
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        Self {
            name,
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore an arena from persisted contents.
    ///
    /// The restored bytes become the used region. The capacity is the
    /// larger of `capacity` and `bytes.len()`, so a session that restores
    /// a full arena can still fail cleanly on its next allocation.
    pub fn from_bytes(name: &'static str, bytes: &[u8], capacity: usize) -> Self {
        let mut arena = Self::with_capacity(name, capacity.max(bytes.len()));
        arena.data.extend_from_slice(bytes);
        arena
    }

    /// Bump-allocate `size` zeroed bytes.
    ///
    /// Fails without side effects if `used + size` exceeds the capacity.
    pub fn allocate(&mut self, size: usize) -> Result<BlobRange, ArenaError> {
        let range = self.reserve(size)?;
        self.data.resize(self.data.len() + size, 0);
        Ok(range)
    }

    /// Bump-allocate a copy of `bytes`.
    pub fn alloc_copy(&mut self, bytes: &[u8]) -> Result<BlobRange, ArenaError> {
        let range = self.reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(range)
    }

    /// Bump-allocate a copy of `s` followed by a NUL terminator.
    ///
    /// The returned range covers the string bytes only.
    pub fn alloc_c_str(&mut self, s: &str) -> Result<BlobRange, ArenaError> {
        let range = self.reserve(s.len() + 1)?;
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        Ok(BlobRange::new(range.offset, s.len() as u32))
    }

    /// Check that `size` more bytes fit and return the range they will occupy.
    fn reserve(&self, size: usize) -> Result<BlobRange, ArenaError> {
        let used = self.data.len();
        match used.checked_add(size) {
            Some(end) if end <= self.capacity => Ok(BlobRange::new(used as u32, size as u32)),
            _ => Err(ArenaError::CapacityExceeded {
                arena: self.name,
                requested: size,
                used,
                capacity: self.capacity,
            }),
        }
    }

    /// Shared view of a previously allocated range.
    ///
    /// Returns `None` if the range lies outside the used region.
    pub fn get(&self, range: BlobRange) -> Option<&[u8]> {
        if range.end() > self.data.len() as u64 {
            return None;
        }
        Some(&self.data[range.as_range()])
    }

    /// Mutable view of a previously allocated range.
    pub fn get_mut(&mut self, range: BlobRange) -> Option<&mut [u8]> {
        if range.end() > self.data.len() as u64 {
            return None;
        }
        Some(&mut self.data[range.as_range()])
    }

    /// Everything allocated so far, in allocation order.
    pub fn used_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reset the bump cursor to zero.
    ///
    /// Reserved storage is kept. Previously returned ranges become invalid.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Name given at creation, used in error reports.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bytes allocated so far.
    pub fn used(&self) -> usize {
        self.data.len()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }
}

impl std::fmt::Debug for ByteArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteArena")
            .field("name", &self.name)
            .field("used", &self.used())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn allocate_returns_zeroed_range() {
        let mut arena = ByteArena::with_capacity("test", 64);
        let r = arena.allocate(10).unwrap();
        assert_eq!(r, BlobRange::new(0, 10));
        assert!(arena.get(r).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn sequential_allocations_dont_overlap() {
        let mut arena = ByteArena::with_capacity("test", 64);
        let a = arena.alloc_copy(b"hello").unwrap();
        let b = arena.alloc_copy(b"world").unwrap();
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 5);
        assert_eq!(arena.get(a).unwrap(), b"hello");
        assert_eq!(arena.get(b).unwrap(), b"world");
        assert_eq!(arena.used(), 10);
    }

    #[test]
    fn exact_fit_succeeds_then_next_byte_fails() {
        let mut arena = ByteArena::with_capacity("asset", 8);
        arena.allocate(8).unwrap();
        let err = arena.allocate(1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::CapacityExceeded {
                arena: "asset",
                requested: 1,
                used: 8,
                capacity: 8,
            }
        );
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn failed_allocation_has_no_side_effects() {
        let mut arena = ByteArena::with_capacity("test", 4);
        arena.alloc_copy(b"ab").unwrap();
        assert!(arena.alloc_copy(b"cde").is_err());
        assert_eq!(arena.used_bytes(), b"ab");
    }

    #[test]
    fn c_str_is_nul_terminated() {
        let mut arena = ByteArena::with_capacity("dependency", 16);
        let r = arena.alloc_c_str("b.png").unwrap();
        assert_eq!(r, BlobRange::new(0, 5));
        assert_eq!(arena.used_bytes(), b"b.png\0");
    }

    #[test]
    fn c_str_counts_terminator_against_capacity() {
        let mut arena = ByteArena::with_capacity("dependency", 5);
        assert!(arena.alloc_c_str("b.png").is_err());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut arena = ByteArena::with_capacity("test", 32);
        let r = arena.alloc_copy(b"data").unwrap();
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.capacity(), 32);
        assert!(arena.get(r).is_none());
    }

    #[test]
    fn from_bytes_restores_contents() {
        let arena = ByteArena::from_bytes("asset", b"abcdef", 4);
        assert_eq!(arena.used_bytes(), b"abcdef");
        assert_eq!(arena.capacity(), 6);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn get_rejects_out_of_bounds() {
        let mut arena = ByteArena::with_capacity("test", 32);
        arena.alloc_copy(b"abc").unwrap();
        assert!(arena.get(BlobRange::new(2, 2)).is_none());
        assert!(arena.get(BlobRange::new(u32::MAX, 1)).is_none());
    }

    #[test]
    fn zero_alloc_is_valid() {
        let mut arena = ByteArena::with_capacity("test", 0);
        let r = arena.allocate(0).unwrap();
        assert!(r.is_empty());
        assert_eq!(arena.get(r).unwrap(), b"");
    }

    proptest! {
        #[test]
        fn used_is_monotonic_and_bounded(
            capacity in 0usize..512,
            sizes in proptest::collection::vec(0usize..64, 0..32),
        ) {
            let mut arena = ByteArena::with_capacity("prop", capacity);
            let mut last = 0;
            for size in sizes {
                let before = arena.used();
                match arena.allocate(size) {
                    Ok(r) => {
                        prop_assert_eq!(r.offset as usize, before);
                        prop_assert_eq!(arena.used(), before + size);
                    }
                    Err(_) => {
                        prop_assert!(before + size > capacity);
                        prop_assert_eq!(arena.used(), before);
                    }
                }
                prop_assert!(arena.used() >= last);
                prop_assert!(arena.used() <= arena.capacity());
                last = arena.used();
            }
        }
    }
}
