use std::sync::Arc;

use crate::container::{Container, ContainerExtension};
use crate::contract::Contract;
use crate::engine::CompositionEngine;
use crate::integration::adapter::ContainerExportProvider;
use crate::integration::strategy::ComposeStrategy;

/// The composition state attached to one container.
///
/// Once attached the integration never leaves the container; the only state
/// transition is absent to present. The thread-safety flag is fixed by the
/// first enable call and silently kept on later ones.
pub struct CompositionIntegration {
    engine: Arc<dyn CompositionEngine>,
    container_provider: Arc<ContainerExportProvider>,
    is_thread_safe: bool,
}

impl CompositionIntegration {
    pub(crate) fn new(
        engine: Arc<dyn CompositionEngine>,
        container_provider: Arc<ContainerExportProvider>,
        is_thread_safe: bool,
    ) -> Self {
        Self {
            engine,
            container_provider,
            is_thread_safe,
        }
    }

    /// The composition engine shared through this container's scope.
    pub fn engine(&self) -> &Arc<dyn CompositionEngine> {
        &self.engine
    }

    /// The provider through which the engine asks this container for
    /// instances.
    pub fn container_provider(&self) -> &Arc<ContainerExportProvider> {
        &self.container_provider
    }

    pub fn is_thread_safe(&self) -> bool {
        self.is_thread_safe
    }

    /// Declares that the owning container supplies `contract` to
    /// composition.
    pub fn register_export(&self, contract: Box<dyn Contract>) {
        self.container_provider.factory().register(contract);
    }
}

impl ContainerExtension for CompositionIntegration {
    fn initialize(&self, container: &Container) {
        container.add_strategy(Arc::new(ComposeStrategy::new()));
    }
}
