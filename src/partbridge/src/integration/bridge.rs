use std::sync::Arc;

use tracing::debug;

use crate::container::{Container, ContainerExtension, ExtensionMap};
use crate::engine::{
    AggregateCatalog, Catalog, CompositionEngine, CompositionScope, ExportProvider,
};
use crate::integration::adapter::{ContainerAdapter, ContainerExportProvider};
use crate::integration::extension::CompositionIntegration;

/// The composition operations a [`Container`] gains from this crate.
pub trait ComposeContainerExt {
    /// Attaches a composition scope to this container, or returns the one
    /// already attached.
    ///
    /// The first call decides `is_thread_safe` for the container's lifetime;
    /// the flag on later calls is ignored. When a container up the ancestor
    /// chain already carries a scope, the new scope is built over a snapshot
    /// of its state: the ancestor's catalogs, its export providers with the
    /// ancestor's container-backed provider swapped for this container's own,
    /// and a copy of the contracts the ancestor container supplies. Catalogs
    /// the ancestor registers afterwards stay invisible here.
    fn enable_composition_integration(&self, is_thread_safe: bool) -> Arc<CompositionIntegration>;

    /// Appends `catalog` to this container's composition scope, attaching a
    /// scope first if none exists yet.
    fn register_catalog(&self, catalog: Arc<dyn Catalog>) -> Arc<CompositionIntegration>;

    /// Creates a child container, optionally attaching a composition scope
    /// inheriting this container's thread-safety flag.
    ///
    /// # Panics
    ///
    /// Panics if `enable_composition` is set but neither this container nor
    /// any ancestor has composition enabled.
    fn create_composable_child(&self, enable_composition: bool) -> Container;
}

impl ComposeContainerExt for Container {
    fn enable_composition_integration(&self, is_thread_safe: bool) -> Arc<CompositionIntegration> {
        self.with_extensions(|extensions| enable_locked(self, extensions, is_thread_safe))
    }

    fn register_catalog(&self, catalog: Arc<dyn Catalog>) -> Arc<CompositionIntegration> {
        self.with_extensions(|extensions| {
            let integration = enable_locked(self, extensions, false);
            integration.engine().add_catalog(catalog);
            integration
        })
    }

    fn create_composable_child(&self, enable_composition: bool) -> Container {
        let child = self.create_child();
        if enable_composition {
            let Some(parent) = self.extension::<CompositionIntegration>() else {
                panic!(
                    "composition integration must be enabled on the parent \
                     container before creating a composable child"
                );
            };
            child.enable_composition_integration(parent.is_thread_safe());
        }
        child
    }
}

/// Attaches a scope to `container` unless one is present; runs with the
/// container's extension map locked, so concurrent enables and catalog
/// registrations on the same container are serialized.
///
/// Only ancestor extension maps are locked from here, never this container's
/// own (already held) one.
fn enable_locked(
    container: &Container,
    extensions: &mut ExtensionMap,
    is_thread_safe: bool,
) -> Arc<CompositionIntegration> {
    if let Some(existing) = extensions.get::<CompositionIntegration>() {
        return existing;
    }

    let provider = Arc::new(ContainerExportProvider::new(ContainerAdapter::new(
        container.clone(),
    )));

    let ancestor = container
        .parent()
        .and_then(|parent| parent.extension::<CompositionIntegration>());
    let engine: Arc<dyn CompositionEngine> = match ancestor {
        Some(ancestor) => {
            for contract in ancestor.container_provider().factory().definitions() {
                provider.factory().register(contract);
            }

            let parent_engine = ancestor.engine();
            let mut providers: Vec<Arc<dyn ExportProvider>> = parent_engine
                .providers()
                .into_iter()
                .filter(|inherited| !(**inherited).as_any().is::<ContainerExportProvider>())
                .collect();
            providers.push(Arc::clone(&provider) as Arc<dyn ExportProvider>);

            let snapshot = AggregateCatalog::new(parent_engine.catalogs());
            debug!(
                catalogs = snapshot.catalogs().len(),
                providers = providers.len(),
                "composition scope created over parent snapshot"
            );
            CompositionScope::inheriting(
                vec![Arc::new(snapshot) as Arc<dyn Catalog>],
                providers,
                is_thread_safe,
                Arc::downgrade(parent_engine),
            )
        }
        None => {
            debug!(is_thread_safe, "root composition scope created");
            CompositionScope::new(
                vec![Arc::clone(&provider) as Arc<dyn ExportProvider>],
                is_thread_safe,
            )
        }
    };

    let integration = Arc::new(CompositionIntegration::new(engine, provider, is_thread_safe));
    extensions.insert(Arc::clone(&integration));
    integration.initialize(container);
    integration
}
