// Append-only arena with generation-tagged handles

use std::collections::TryReserveError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// Every arena gets its own generation so a handle from one grammar is
/// never silently resolved against another.
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Typed index into an [`Arena`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.generation, self.index).cmp(&(other.generation, other.index))
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Items are allocated once during compilation and never removed.
pub struct Arena<T> {
    items: Vec<T>,
    generation: u32,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("generation", &self.generation)
            .field("len", &self.items.len())
            .finish()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Allocate an item that needs to know its own handle.
    ///
    /// Fails only when the backing storage cannot grow.
    pub fn try_alloc_with(&mut self, make: impl FnOnce(Handle<T>) -> T) -> Result<Handle<T>, TryReserveError> {
        self.items.try_reserve(1)?;
        let handle = Handle {
            index: self.items.len() as u32,
            generation: self.generation,
            _marker: PhantomData,
        };
        self.items.push(make(handle));
        Ok(handle)
    }

    pub fn try_alloc(&mut self, item: T) -> Result<Handle<T>, TryReserveError> {
        self.try_alloc_with(|_| item)
    }

    #[inline]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.generation != self.generation {
            return None;
        }
        self.items.get(handle.index())
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.generation != self.generation {
            return None;
        }
        self.items.get_mut(handle.index())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        let generation = self.generation;
        self.items.iter().enumerate().map(move |(i, item)| {
            (
                Handle {
                    index: i as u32,
                    generation,
                    _marker: PhantomData,
                },
                item,
            )
        })
    }
}

impl<T> std::ops::Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        assert_eq!(handle.generation, self.generation, "handle from another arena");
        &self.items[handle.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_resolve_in_their_arena() {
        let mut arena = Arena::new();
        let a = arena.try_alloc("a").unwrap();
        let b = arena.try_alloc("b").unwrap();
        assert_eq!(arena[a], "a");
        assert_eq!(arena.get(b), Some(&"b"));
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut first = Arena::new();
        let mut second = Arena::new();
        let a = first.try_alloc(1).unwrap();
        second.try_alloc(2).unwrap();
        assert!(second.get(a).is_none());
    }

    #[test]
    fn alloc_with_sees_own_handle() {
        let mut arena: Arena<(usize, &str)> = Arena::new();
        let h = arena.try_alloc_with(|h| (h.index(), "x")).unwrap();
        assert_eq!(arena[h].0, h.index());
        let collected: Vec<_> = arena.iter().map(|(h2, _)| h2).collect();
        assert_eq!(collected, vec![h]);
    }
}
