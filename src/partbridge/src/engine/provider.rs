use std::sync::Arc;

use parking_lot::RwLock;

use crate::contract::Contract;
use crate::engine::CompositionError;
use crate::part::{AsAny, Managed};

/// A source of injectable contracts, consulted after all catalogs.
///
/// Unlike a [`Catalog`], a provider may fail while producing an export, and
/// its answer distinguishes "not mine" (`Ok(None)`) from a failed
/// construction.
///
/// [`Catalog`]: crate::engine::Catalog
pub trait ExportProvider: AsAny + Send + Sync + 'static {
    /// Produces an export for `contract` if this provider covers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider covers the contract but fails to
    /// construct the export.
    fn try_export(&self, contract: &dyn Contract)
        -> Result<Option<Box<dyn Managed>>, CompositionError>;
}

/// Constructs export instances for registered contracts on demand.
pub trait ExportResolver: Send + Sync + 'static {
    /// Constructs an instance satisfying `contract`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance cannot be constructed.
    fn resolve_export(&self, contract: &dyn Contract) -> Result<Box<dyn Managed>, CompositionError>;
}

/// An [`ExportProvider`] over an explicit list of contract definitions,
/// delegating actual construction to an [`ExportResolver`].
///
/// The definition list is enumerable so that a child scope can copy the
/// parent's registrations when it is created.
pub struct FactoryExportProvider {
    resolver: Arc<dyn ExportResolver>,
    definitions: RwLock<Vec<Box<dyn Contract>>>,
}

impl FactoryExportProvider {
    pub fn new(resolver: Arc<dyn ExportResolver>) -> Self {
        Self {
            resolver,
            definitions: RwLock::new(Vec::new()),
        }
    }

    /// Declares that this provider can supply `contract`. Registering the
    /// same contract twice is a no-op.
    pub fn register(&self, contract: Box<dyn Contract>) {
        let mut definitions = self.definitions.write();
        if !definitions.iter().any(|known| known.as_ref() == contract.as_ref()) {
            definitions.push(contract);
        }
    }

    /// Snapshots the registered contract definitions.
    pub fn definitions(&self) -> Vec<Box<dyn Contract>> {
        self.definitions
            .read()
            .iter()
            .map(|contract| contract.dyn_clone())
            .collect()
    }

    fn covers(&self, contract: &dyn Contract) -> bool {
        self.definitions
            .read()
            .iter()
            .any(|known| known.as_ref() == contract)
    }
}

impl ExportProvider for FactoryExportProvider {
    fn try_export(
        &self,
        contract: &dyn Contract,
    ) -> Result<Option<Box<dyn Managed>>, CompositionError> {
        if self.covers(contract) {
            self.resolver.resolve_export(contract).map(Some)
        } else {
            Ok(None)
        }
    }
}
