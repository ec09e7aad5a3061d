use std::sync::Arc;

use parking_lot::RwLock;

use crate::contract::{Contract, TypedContract};
use crate::part::Managed;

/// An ordered source of exports.
///
/// Catalogs are consulted before export providers when a scope resolves an
/// import, in the order they were registered.
pub trait Catalog: Send + Sync + 'static {
    /// Produces an export for `contract`, or `None` if this catalog does not
    /// carry a matching export.
    fn resolve(&self, contract: &dyn Contract) -> Option<Box<dyn Managed>>;
}

type ExportFactory = Box<dyn Fn() -> Box<dyn Managed> + Send + Sync>;

/// A catalog backed by registered export factories.
pub struct ExportCatalog {
    exports: RwLock<Vec<(Box<dyn Contract>, ExportFactory)>>,
}

impl ExportCatalog {
    pub fn new() -> Self {
        Self {
            exports: RwLock::new(Vec::new()),
        }
    }

    /// Registers a factory producing an export for `contract`.
    pub fn add<C, F>(&self, contract: C, factory: F)
    where
        C: TypedContract,
        F: Fn() -> C::Target + Send + Sync + 'static,
    {
        self.exports.write().push((
            Box::new(contract),
            Box::new(move || Box::new(factory()) as Box<dyn Managed>),
        ));
    }

    /// Registers a fixed export value, cloned on each resolution.
    pub fn add_instance<C>(&self, contract: C, value: C::Target)
    where
        C: TypedContract,
        C::Target: Clone,
    {
        self.add(contract, move || value.clone());
    }
}

impl Catalog for ExportCatalog {
    fn resolve(&self, contract: &dyn Contract) -> Option<Box<dyn Managed>> {
        self.exports
            .read()
            .iter()
            .find(|(candidate, _)| candidate.as_ref() == contract)
            .map(|(_, factory)| factory())
    }
}

/// A read-only combination of catalogs, resolved in order.
///
/// Used to snapshot a parent scope's catalog list when a child scope is
/// created: the aggregate is fixed at construction, so catalogs added to the
/// parent afterwards stay invisible to the child.
pub struct AggregateCatalog {
    catalogs: Vec<Arc<dyn Catalog>>,
}

impl AggregateCatalog {
    pub fn new(catalogs: Vec<Arc<dyn Catalog>>) -> Self {
        Self { catalogs }
    }

    pub fn catalogs(&self) -> &[Arc<dyn Catalog>] {
        &self.catalogs
    }
}

impl Catalog for AggregateCatalog {
    fn resolve(&self, contract: &dyn Contract) -> Option<Box<dyn Managed>> {
        self.catalogs
            .iter()
            .find_map(|catalog| catalog.resolve(contract))
    }
}
