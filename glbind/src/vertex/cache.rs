use std::any::TypeId;
use std::sync::{Arc, Mutex, PoisonError};

use fnv::FnvHashMap;

use super::{resolve_layout, LayoutError, Vertex, VertexLayout};

/// Memoizes [VertexLayout]s per [Vertex] type.
///
/// A layout is resolved at most once per type, even when several threads ask for the same type
/// concurrently: the cache stays locked while a missing layout is resolved. Failed resolutions are
/// not cached.
#[derive(Default)]
pub struct LayoutCache {
    layouts: Mutex<FnvHashMap<TypeId, Arc<VertexLayout>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        LayoutCache::default()
    }

    /// Returns the layout for `T`, resolving it on first use.
    pub fn get_or_resolve<T>(&self) -> Result<Arc<VertexLayout>, LayoutError>
    where
        T: Vertex + 'static,
    {
        let mut layouts = self.layouts.lock().unwrap_or_else(PoisonError::into_inner);
        let key = TypeId::of::<T>();

        if let Some(layout) = layouts.get(&key) {
            return Ok(layout.clone());
        }

        let layout = Arc::new(resolve_layout::<T>()?);

        layouts.insert(key, layout.clone());

        Ok(layout)
    }

    /// The number of layouts currently cached.
    pub fn len(&self) -> usize {
        self.layouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
