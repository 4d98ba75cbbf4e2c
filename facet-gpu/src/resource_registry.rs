use crate::resource::{Handle, next_handle_id};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Registry mapping handles to owned GPU resources of any type.
#[derive(Default)]
pub struct ResourceRegistry {
    inner: HashMap<TypeId, HashMap<u64, Box<dyn Any>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `resource` and return its handle.
    pub fn insert<T: 'static>(&mut self, resource: T) -> Handle<T> {
        let id = next_handle_id();
        self.inner
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(id, Box::new(resource));
        Handle::new(id)
    }

    pub fn get<T: 'static>(&self, handle: Handle<T>) -> Option<&T> {
        self.inner
            .get(&TypeId::of::<T>())?
            .get(&handle.id())
            .and_then(|b| b.downcast_ref())
    }

    /// Number of resources held, across all types.
    pub fn len(&self) -> usize {
        self.inner.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut registry = ResourceRegistry::new();
        let a = registry.insert(String::from("camera"));
        let b = registry.insert(7u32);
        assert_eq!(registry.get(a).map(String::as_str), Some("camera"));
        assert_eq!(registry.get(b), Some(&7));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_handle() {
        let registry = ResourceRegistry::new();
        assert!(registry.get(Handle::<u32>::next()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_len_counts_every_type() {
        let mut registry = ResourceRegistry::new();
        registry.insert(1.5f32);
        registry.insert(1.5f32);
        registry.insert("layout");
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }
}
