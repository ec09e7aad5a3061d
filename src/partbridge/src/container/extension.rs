use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::container::Container;
use crate::part::AsAny;

/// A piece of behavior attached to one container, looked up by type.
///
/// At most one extension of each type can be attached to a container;
/// attaching is irreversible for the container's lifetime.
pub trait ContainerExtension: AsAny + Send + Sync + 'static {
    /// Called once, when the extension is attached to `container`.
    fn initialize(&self, container: &Container);
}

pub(crate) struct ExtensionMap {
    entries: HashMap<TypeId, Arc<dyn ContainerExtension>>,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get<E: ContainerExtension>(&self) -> Option<Arc<E>> {
        let entry = Arc::clone(self.entries.get(&TypeId::of::<E>())?);
        let entry: Arc<dyn Any + Send + Sync> = entry;
        entry.downcast::<E>().ok()
    }

    pub fn insert<E: ContainerExtension>(&mut self, extension: Arc<E>) {
        self.entries.insert(TypeId::of::<E>(), extension);
    }
}
