use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type-safe handle to a resource stored in a [`crate::ResourceRegistry`].
pub struct Handle<T> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// A fresh handle that refers to nothing yet.
    #[cfg(test)]
    pub(crate) fn next() -> Self {
        Self::new(next_handle_id())
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls so handles stay `Copy` even when `T` is not.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", std::any::type_name::<T>(), self.id)
    }
}

static HANDLE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_handle_id() -> u64 {
    HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NotCopy;

    #[test]
    fn test_handles_are_unique_and_copy() {
        let a = Handle::<NotCopy>::next();
        let b = a;
        let c = Handle::<NotCopy>::next();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c.id() > a.id());
    }
}
