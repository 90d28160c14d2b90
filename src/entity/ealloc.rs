//! Manages entity ID allocation.

use super::EntityId;

/// Allocates entity IDs for a world.
///
/// IDs start at 1 and are never reused,
/// even after the entity holding them is destroyed or reset.
#[derive(Debug)]
pub struct Ealloc {
    next: u64,
}

impl Default for Ealloc {
    fn default() -> Self { Self { next: 1 } }
}

impl Ealloc {
    /// Creates an allocator whose first ID is 1.
    pub fn new() -> Self { Self::default() }

    /// Allocates a new ID.
    ///
    /// # Panics
    /// Panics if the ID space is exhausted.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.checked_add(1).expect("entity ID space exhausted");
        id
    }

    /// The number of IDs allocated so far.
    pub fn allocated(&self) -> u64 { self.next - 1 }
}

#[cfg(test)]
mod tests {
    use super::Ealloc;

    #[test]
    fn test_monotonic() {
        let mut ealloc = Ealloc::new();
        assert_eq!(ealloc.allocate().get(), 1);
        assert_eq!(ealloc.allocate().get(), 2);
        assert_eq!(ealloc.allocated(), 2);
    }
}
