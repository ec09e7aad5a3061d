mod catalog;
mod provider;
mod scope;

use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::contract::Contract;
use crate::part::Part;

pub use catalog::{AggregateCatalog, Catalog, ExportCatalog};
pub use provider::{ExportProvider, ExportResolver, FactoryExportProvider};
pub use scope::CompositionScope;

/// The composition side of the bridge: resolves declared import points of a
/// [`Part`] from a set of catalogs and export providers.
///
/// The two satisfaction operations differ only in their attitude towards
/// concurrent recomposition: `satisfy_imports_once` performs a plain one-shot
/// pass, while `compose` participates in recomposition and may report a
/// transient [`CompositionError::RecompositionConflict`] when another pass is
/// already in flight.
#[cfg_attr(test, mockall::automock)]
pub trait CompositionEngine: Send + Sync + 'static {
    /// Satisfies all imports of `part` once; no recomposition is involved.
    fn satisfy_imports_once(&self, part: &mut dyn Part) -> Result<(), CompositionError>;

    /// Satisfies all imports of `part` with recomposition allowed.
    fn compose(&self, part: &mut dyn Part) -> Result<(), CompositionError>;

    /// Appends a catalog to the engine's ordered catalog list.
    fn add_catalog(&self, catalog: Arc<dyn Catalog>);

    /// Snapshots the configured catalogs, in resolution order.
    fn catalogs(&self) -> Vec<Arc<dyn Catalog>>;

    /// Snapshots the configured export providers, in resolution order.
    fn providers(&self) -> Vec<Arc<dyn ExportProvider>>;
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum CompositionError {
    #[snafu(display("no export satisfies the import contract {contract}"))]
    #[non_exhaustive]
    ExportNotFound { contract: Box<dyn Contract> },
    // `UnknownMember` and `ImportTypeMismatch` are constructed by
    // `#[derive(Part)]` output in downstream crates and must stay
    // externally constructible.
    #[snafu(display("part {part} has no import member named {member:?}"))]
    UnknownMember { part: &'static str, member: String },
    #[snafu(display("the export resolved for member {member:?} is not a {expected}"))]
    ImportTypeMismatch {
        member: String,
        expected: &'static str,
    },
    #[snafu(display("another recomposition pass is already in flight"))]
    #[non_exhaustive]
    RecompositionConflict,
    #[snafu(display("a recomposition pass re-entered its own scope"))]
    #[non_exhaustive]
    RecompositionReentrancy,
    #[snafu(display("recomposition still conflicting after {attempts} attempts"))]
    #[non_exhaustive]
    RecompositionLivelock { attempts: u32 },
    #[snafu(display("the container failed to construct an export for {contract}"))]
    #[non_exhaustive]
    ExportConstruction {
        contract: Box<dyn Contract>,
        source: Arc<dyn Error + Send + Sync>,
    },
}
