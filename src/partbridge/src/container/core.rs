use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::container::extension::ExtensionMap;
use crate::container::provider::Provider;
use crate::container::strategy::BuildStrategy;
use crate::contract::Contract;

pub(super) struct ContainerCore {
    parent: Option<Arc<ContainerCore>>,
    providers: RwLock<HashMap<Box<dyn Contract>, Arc<dyn Provider>>>,
    strategies: RwLock<Vec<Arc<dyn BuildStrategy>>>,
    extensions: Mutex<ExtensionMap>,
}

impl ContainerCore {
    pub fn new_root() -> Self {
        Self::new_impl(None)
    }

    pub fn new_child(parent: Arc<ContainerCore>) -> Self {
        Self::new_impl(Some(parent))
    }

    fn new_impl(parent: Option<Arc<ContainerCore>>) -> Self {
        Self {
            parent,
            providers: RwLock::new(HashMap::new()),
            strategies: RwLock::new(Vec::new()),
            extensions: Mutex::new(ExtensionMap::new()),
        }
    }

    pub fn parent(&self) -> Option<&Arc<ContainerCore>> {
        self.parent.as_ref()
    }

    pub fn insert_provider(&self, contract: Box<dyn Contract>, provider: Arc<dyn Provider>) {
        self.providers.write().insert(contract, provider);
    }

    /// Finds a provider for `contract`, preferring the closest registration
    /// in the ancestor chain.
    pub fn find_provider(&self, contract: &dyn Contract) -> Option<Arc<dyn Provider>> {
        let mut core = self;
        loop {
            if let Some(provider) = core.providers.read().get(contract) {
                return Some(Arc::clone(provider));
            }
            core = core.parent()?.as_ref();
        }
    }

    pub fn push_strategy(&self, strategy: Arc<dyn BuildStrategy>) {
        self.strategies.write().push(strategy);
    }

    /// Collects the build strategies of this container and all ancestors,
    /// closest container first.
    pub fn collect_strategies(&self) -> Vec<Arc<dyn BuildStrategy>> {
        let mut collected = Vec::new();
        let mut core = Some(self);
        while let Some(current) = core {
            collected.extend(current.strategies.read().iter().cloned());
            core = current.parent().map(|parent| parent.as_ref());
        }
        collected
    }

    pub fn extensions(&self) -> &Mutex<ExtensionMap> {
        &self.extensions
    }
}
