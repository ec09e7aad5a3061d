use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::contract::Contract;
use crate::engine::{Catalog, CompositionEngine, CompositionError, ExportProvider};
use crate::part::{Managed, Part};

/// The unit over which catalogs and export providers are shared: one scope
/// per container in a parent/child hierarchy.
///
/// A child scope is constructed over a snapshot of its parent's composition
/// state; the parent back-reference is kept for lookup only and never owned.
/// The catalog list is append-only, the provider set is fixed at creation.
pub struct CompositionScope {
    catalogs: RwLock<Vec<Arc<dyn Catalog>>>,
    providers: Vec<Arc<dyn ExportProvider>>,
    is_thread_safe: bool,
    parent: Weak<dyn CompositionEngine>,
    recomposing: Mutex<()>,
    // The thread currently inside `compose`, if any. Satisfying an import
    // may build an export through a container whose strategies call back
    // into this scope on the same thread; that re-entry must fail instead
    // of waiting on the non-reentrant lock it already holds.
    recomposing_owner: Mutex<Option<ThreadId>>,
}

impl CompositionScope {
    /// A root scope with no inherited composition state.
    pub fn new(providers: Vec<Arc<dyn ExportProvider>>, is_thread_safe: bool) -> Arc<Self> {
        Arc::new(Self {
            catalogs: RwLock::new(Vec::new()),
            providers,
            is_thread_safe,
            parent: Weak::<Self>::new(),
            recomposing: Mutex::new(()),
            recomposing_owner: Mutex::new(None),
        })
    }

    /// A scope constructed over a parent snapshot. `catalogs` and `providers`
    /// already contain the inherited state.
    pub(crate) fn inheriting(
        catalogs: Vec<Arc<dyn Catalog>>,
        providers: Vec<Arc<dyn ExportProvider>>,
        is_thread_safe: bool,
        parent: Weak<dyn CompositionEngine>,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalogs: RwLock::new(catalogs),
            providers,
            is_thread_safe,
            parent,
            recomposing: Mutex::new(()),
            recomposing_owner: Mutex::new(None),
        })
    }

    pub fn is_thread_safe(&self) -> bool {
        self.is_thread_safe
    }

    /// The scope this one inherited from, if it still exists.
    pub fn parent(&self) -> Option<Arc<dyn CompositionEngine>> {
        self.parent.upgrade()
    }

    fn resolve(&self, contract: &dyn Contract) -> Result<Box<dyn Managed>, CompositionError> {
        for catalog in self.catalogs.read().iter() {
            if let Some(export) = catalog.resolve(contract) {
                return Ok(export);
            }
        }
        for provider in &self.providers {
            if let Some(export) = provider.try_export(contract)? {
                return Ok(export);
            }
        }
        Err(CompositionError::ExportNotFound {
            contract: contract.dyn_clone(),
        })
    }

    fn satisfy_all(&self, part: &mut dyn Part) -> Result<(), CompositionError> {
        for point in part.imports() {
            let export = self.resolve(point.contract())?;
            part.assign(point.member(), export)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn begin_recomposition(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.recomposing.lock()
    }
}

impl CompositionEngine for CompositionScope {
    fn satisfy_imports_once(&self, part: &mut dyn Part) -> Result<(), CompositionError> {
        self.satisfy_all(part)
    }

    fn compose(&self, part: &mut dyn Part) -> Result<(), CompositionError> {
        let current = thread::current().id();
        if *self.recomposing_owner.lock() == Some(current) {
            return Err(CompositionError::RecompositionReentrancy);
        }

        let guard = if self.is_thread_safe {
            self.recomposing.lock()
        } else {
            match self.recomposing.try_lock() {
                Some(guard) => guard,
                None => return Err(CompositionError::RecompositionConflict),
            }
        };

        *self.recomposing_owner.lock() = Some(current);
        let result = self.satisfy_all(part);
        *self.recomposing_owner.lock() = None;
        drop(guard);
        result
    }

    fn add_catalog(&self, catalog: Arc<dyn Catalog>) {
        let mut catalogs = self.catalogs.write();
        catalogs.push(catalog);
        debug!(total = catalogs.len(), "catalog registered on scope");
    }

    fn catalogs(&self) -> Vec<Arc<dyn Catalog>> {
        self.catalogs.read().clone()
    }

    fn providers(&self) -> Vec<Arc<dyn ExportProvider>> {
        self.providers.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::contract;
    use crate::engine::ExportCatalog;
    use crate::part::{DowncastRef, ImportPoint};

    use super::*;

    #[derive(Default)]
    struct Pair {
        first: Option<i32>,
        second: Option<u64>,
    }

    impl Part for Pair {
        fn imports(&self) -> Vec<ImportPoint> {
            vec![
                ImportPoint::new("first", contract::of::<i32>()),
                ImportPoint::recomposable("second", contract::of::<u64>()),
            ]
        }

        fn assign(
            &mut self,
            member: &str,
            value: Box<dyn Managed>,
        ) -> Result<(), CompositionError> {
            match member {
                "first" => {
                    self.first = value.downcast_ref::<i32>().copied();
                    Ok(())
                }
                "second" => {
                    self.second = value.downcast_ref::<u64>().copied();
                    Ok(())
                }
                other => Err(CompositionError::UnknownMember {
                    part: "Pair",
                    member: other.to_owned(),
                }),
            }
        }
    }

    fn scope_with_exports(is_thread_safe: bool) -> Arc<CompositionScope> {
        let scope = CompositionScope::new(Vec::new(), is_thread_safe);
        let catalog = ExportCatalog::new();
        catalog.add_instance(contract::of::<i32>(), 1);
        catalog.add_instance(contract::of::<u64>(), 2);
        scope.add_catalog(Arc::new(catalog));
        scope
    }

    #[test]
    fn satisfy_imports_once_fills_every_member() {
        let scope = scope_with_exports(false);
        let mut pair = Pair::default();

        scope.satisfy_imports_once(&mut pair).unwrap();
        assert_eq!(pair.first, Some(1));
        assert_eq!(pair.second, Some(2));
    }

    #[test]
    fn satisfy_fails_when_no_export_matches() {
        let scope = CompositionScope::new(Vec::new(), false);
        let mut pair = Pair::default();

        assert!(matches!(
            scope.satisfy_imports_once(&mut pair),
            Err(CompositionError::ExportNotFound { .. })
        ));
    }

    #[test]
    fn catalogs_resolve_before_providers_and_in_order() {
        let scope = scope_with_exports(false);
        let shadowing = ExportCatalog::new();
        shadowing.add_instance(contract::of::<i32>(), 10);
        scope.add_catalog(Arc::new(shadowing));

        let mut pair = Pair::default();
        scope.satisfy_imports_once(&mut pair).unwrap();
        // The first registered catalog wins.
        assert_eq!(pair.first, Some(1));
    }

    #[test]
    fn compose_fails_with_conflict_when_pass_in_flight() {
        let scope = scope_with_exports(false);
        let _in_flight = scope.begin_recomposition();

        let mut pair = Pair::default();
        assert!(matches!(
            scope.compose(&mut pair),
            Err(CompositionError::RecompositionConflict)
        ));
    }

    struct Reentrant {
        scope: Arc<CompositionScope>,
        nested: Option<CompositionError>,
    }

    impl Part for Reentrant {
        fn imports(&self) -> Vec<ImportPoint> {
            vec![ImportPoint::recomposable("value", contract::of::<i32>())]
        }

        fn assign(
            &mut self,
            _member: &str,
            _value: Box<dyn Managed>,
        ) -> Result<(), CompositionError> {
            let mut pair = Pair::default();
            self.nested = self.scope.compose(&mut pair).err();
            Ok(())
        }
    }

    #[test]
    fn compose_fails_fast_when_reentered_from_its_own_pass() {
        let scope = scope_with_exports(true);
        let mut part = Reentrant {
            scope: Arc::clone(&scope),
            nested: None,
        };

        scope.compose(&mut part).unwrap();
        assert!(matches!(
            part.nested,
            Some(CompositionError::RecompositionReentrancy)
        ));
    }

    #[test]
    fn compose_blocks_instead_of_conflicting_when_thread_safe() {
        let scope = scope_with_exports(true);
        let in_flight = scope.begin_recomposition();

        let handle = thread::spawn({
            let scope = Arc::clone(&scope);
            move || {
                let mut pair = Pair::default();
                scope.compose(&mut pair).unwrap();
                pair.second
            }
        });

        drop(in_flight);
        assert_eq!(handle.join().unwrap(), Some(2));
    }
}
