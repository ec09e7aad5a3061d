use std::sync::Arc;

use crate::container::Container;
use crate::contract::Contract;
use crate::engine::{CompositionError, ExportProvider, ExportResolver, FactoryExportProvider};
use crate::part::Managed;

/// Lets the composition engine construct instances it does not know how to
/// build by delegating to a container.
pub struct ContainerAdapter {
    container: Container,
}

impl ContainerAdapter {
    pub fn new(container: Container) -> Self {
        Self { container }
    }
}

impl ExportResolver for ContainerAdapter {
    fn resolve_export(
        &self,
        contract: &dyn Contract,
    ) -> Result<Box<dyn Managed>, CompositionError> {
        match self.container.build(contract) {
            Ok(part) => Ok(part),
            Err(err) => Err(CompositionError::ExportConstruction {
                contract: contract.dyn_clone(),
                source: Arc::new(err),
            }),
        }
    }
}

/// The container-backed export provider attached to every composition scope.
///
/// Wraps a [`FactoryExportProvider`] whose resolver is a [`ContainerAdapter`];
/// the factory's definition list says which contracts the owning container
/// supplies to composition.
pub struct ContainerExportProvider {
    factory: FactoryExportProvider,
}

impl ContainerExportProvider {
    pub fn new(adapter: ContainerAdapter) -> Self {
        Self {
            factory: FactoryExportProvider::new(Arc::new(adapter)),
        }
    }

    pub fn factory(&self) -> &FactoryExportProvider {
        &self.factory
    }
}

impl ExportProvider for ContainerExportProvider {
    fn try_export(
        &self,
        contract: &dyn Contract,
    ) -> Result<Option<Box<dyn Managed>>, CompositionError> {
        self.factory.try_export(contract)
    }
}
