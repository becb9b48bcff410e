//! Chunked slab that stores the nodes of a tree and hands out copyable handles to them.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A copyable reference to an object stored in a `TypedArena<T>`.
///
/// Handles stay valid until the object they refer to is freed. A freed slot is recycled by the
/// next allocation, so a stale handle may alias a newer object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

enum Block<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object.
///
/// Objects are laid out in fixed-size chunks so growing the arena never moves existing objects.
/// Freed blocks are threaded onto a free list and reused before a new chunk is requested.
///
/// # Examples
///
/// ```
/// use ordered_tree::arena::TypedArena;
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(&x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct TypedArena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_handle(&self, handle: &Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.block_index < self.chunks[handle.chunk_index].len()
    }

    /// Constructs a new, empty `TypedArena<T>` holding `chunk_size` objects per chunk. A chunk
    /// size of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// assert_eq!(arena.chunk_size(), 1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            capacity: 0,
        }
    }

    /// Returns the number of objects per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores an object in the arena and returns its handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(&x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.len == self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        self.len += 1;

        match self.head.take() {
            None => {
                let chunk_count = self.chunks.len();
                let last_chunk = &mut self.chunks[chunk_count - 1];
                last_chunk.push(Block::Occupied(value));
                Handle {
                    chunk_index: chunk_count - 1,
                    block_index: last_chunk.len() - 1,
                }
            },
            Some(handle) => {
                let vacant_block = mem::replace(
                    &mut self.chunks[handle.chunk_index][handle.block_index],
                    Block::Occupied(value),
                );

                match vacant_block {
                    Block::Vacant(next_handle) => {
                        self.head = next_handle;
                        handle
                    },
                    Block::Occupied(_) => panic!("Expected a vacant block on the free list."),
                }
            },
        }
    }

    /// Removes an object from the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the handle refers to an invalid or vacant block.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(&x), 0);
    /// ```
    pub fn free(&mut self, handle: &Handle) -> T {
        if !self.is_valid_handle(handle) {
            panic!("Error: attempting to free invalid block.");
        }
        let old_block = mem::replace(
            &mut self.chunks[handle.chunk_index][handle.block_index],
            Block::Vacant(self.head),
        );
        match old_block {
            Block::Vacant(next_handle) => {
                self.chunks[handle.chunk_index][handle.block_index] = Block::Vacant(next_handle);
                panic!("Error: attempting to free vacant block.");
            },
            Block::Occupied(value) => {
                self.len -= 1;
                self.head = Some(*handle);
                value
            },
        }
    }

    /// Returns an immutable reference to an object in the arena, or `None` if the handle does
    /// not refer to a live object.
    pub fn get(&self, handle: &Handle) -> Option<&T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to an object in the arena, or `None` if the handle does not
    /// refer to a live object.
    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref mut value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Drops every object and releases all chunks.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(&handle).expect("Error: handle out of bounds.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(&handle).expect("Error: handle out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, TypedArena};

    fn handle(chunk_index: usize, block_index: usize) -> Handle {
        Handle {
            chunk_index,
            block_index,
        }
    }

    #[test]
    #[should_panic]
    fn test_free_invalid_block() {
        let mut arena: TypedArena<u32> = TypedArena::new(1024);
        arena.free(&handle(0, 0));
    }

    #[test]
    #[should_panic]
    fn test_free_twice() {
        let mut arena = TypedArena::new(1024);
        let x = arena.allocate(0);
        arena.free(&x);
        arena.free(&x);
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut arena = TypedArena::new(0);
        assert_eq!(arena.chunk_size(), 1);
        assert_eq!(arena.allocate(0), handle(0, 0));
        assert_eq!(arena.allocate(0), handle(1, 0));
    }

    #[test]
    fn test_allocate_across_chunks() {
        let mut arena = TypedArena::new(2);
        assert_eq!(arena.allocate('a'), handle(0, 0));
        assert_eq!(arena.allocate('b'), handle(0, 1));
        assert_eq!(arena.allocate('c'), handle(1, 0));
        assert_eq!(arena.len(), 3);
        assert_eq!(arena[handle(1, 0)], 'c');
    }

    #[test]
    fn test_free_reuses_block() {
        let mut arena = TypedArena::new(1024);
        let x = arena.allocate(0);
        let y = arena.allocate(1);
        assert_eq!(arena.free(&x), 0);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.allocate(2), x);
        assert_eq!(arena[x], 2);
        assert_eq!(arena[y], 1);
    }

    #[test]
    fn test_free_does_not_grow_capacity() {
        let mut arena = TypedArena::new(1);
        let x = arena.allocate(0);
        arena.free(&x);
        assert_eq!(arena.allocate(1), handle(0, 0));
    }

    #[test]
    fn test_get_vacant_block() {
        let mut arena = TypedArena::new(1024);
        let x = arena.allocate(0);
        arena.free(&x);
        assert_eq!(arena.get(&x), None);
        assert_eq!(arena.get(&handle(3, 0)), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = TypedArena::new(1024);
        let x = arena.allocate(0);
        *arena.get_mut(&x).unwrap() = 1;
        assert_eq!(arena.get(&x), Some(&1));
        assert_eq!(arena.get_mut(&handle(0, 1)), None);
    }

    #[test]
    fn test_clear() {
        let mut arena = TypedArena::new(2);
        for i in 0..5 {
            arena.allocate(i);
        }
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(7), handle(0, 0));
    }
}
