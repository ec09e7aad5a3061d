use std::sync::Arc;

use crate::container::core::ContainerCore;
use crate::container::extension::{ContainerExtension, ExtensionMap};
use crate::container::provider::{InstanceProvider, TypedProvider};
use crate::container::strategy::{BuildContext, BuildStrategy};
use crate::container::BuildError;
use crate::contract::{Contract, TypedContract};
use crate::part::{Downcast, Part};

/// A cheap-to-clone handle to one container in a parent/child hierarchy.
///
/// A child container resolves registrations it does not carry itself through
/// its ancestors, and runs the build strategies of the whole chain on every
/// object it constructs.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            core: Arc::new(ContainerCore::new_root()),
        }
    }

    /// Creates a child container on top of this one.
    pub fn create_child(&self) -> Self {
        Self {
            core: Arc::new(ContainerCore::new_child(Arc::clone(&self.core))),
        }
    }

    pub fn parent(&self) -> Option<Container> {
        self.core.parent().map(|core| Self {
            core: Arc::clone(core),
        })
    }

    /// Registers a provider for `contract`, replacing any previous
    /// registration on this container.
    pub fn register<C, P>(&self, contract: C, provider: P)
    where
        C: TypedContract,
        P: TypedProvider<Output = C::Target>,
    {
        self.core
            .insert_provider(Box::new(contract), Arc::new(provider));
    }

    /// Registers a fixed value for `contract`, cloned on each build.
    pub fn register_instance<C>(&self, contract: C, value: C::Target)
    where
        C: TypedContract,
        C::Target: Part + Clone,
    {
        self.register(contract, InstanceProvider::new(value));
    }

    /// Builds a new object for `contract` and runs the post-construction
    /// strategy chain on it.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is registered for `contract`, or if
    /// construction or any strategy fails.
    pub fn build(&self, contract: &dyn Contract) -> Result<Box<dyn Part>, BuildError> {
        let Some(provider) = self.core.find_provider(contract) else {
            return Err(BuildError::NotRegistered {
                contract: contract.dyn_clone(),
            });
        };

        let mut object = provider.dyn_provide(self)?;
        let context = BuildContext::new(self, contract);
        for strategy in self.core.collect_strategies() {
            strategy.post_build_up(&context, object.as_mut())?;
        }
        Ok(object)
    }

    /// A typed variant of [`Container::build`].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Container::build`].
    pub fn resolve<C>(&self, contract: C) -> Result<C::Target, BuildError>
    where
        C: TypedContract,
        C::Target: Part,
    {
        match self.build(&contract)?.downcast::<C::Target>() {
            Ok(object) => Ok(*object),
            Err(_) => unreachable!("the provider's output should be `C::Target`"),
        }
    }

    /// Looks up an extension by type on this container or the closest
    /// ancestor carrying one.
    pub fn extension<E: ContainerExtension>(&self) -> Option<Arc<E>> {
        let mut core = Some(&self.core);
        while let Some(current) = core {
            if let Some(extension) = current.extensions().lock().get::<E>() {
                return Some(extension);
            }
            core = current.parent();
        }
        None
    }

    /// Appends a post-construction strategy to this container's build
    /// pipeline. Strategies also run for builds requested on child
    /// containers.
    pub fn add_strategy(&self, strategy: Arc<dyn BuildStrategy>) {
        self.core.push_strategy(strategy);
    }

    /// Runs `f` with this container's extension map locked. The lock is the
    /// per-container mutual exclusion used by enable/register operations.
    pub(crate) fn with_extensions<R>(&self, f: impl FnOnce(&mut ExtensionMap) -> R) -> R {
        f(&mut self.core.extensions().lock())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::container::provider::ClosureProvider;
    use crate::contract;
    use crate::part::DowncastRef;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Settings {
        name: &'static str,
    }

    impl Part for Settings {}

    struct Service {
        settings: Settings,
    }

    impl Part for Service {}

    struct CountingStrategy {
        calls: Arc<AtomicUsize>,
    }

    impl BuildStrategy for CountingStrategy {
        fn post_build_up(
            &self,
            _context: &BuildContext<'_>,
            _existing: &mut dyn Part,
        ) -> Result<(), BuildError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct MarkerExtension;

    impl ContainerExtension for MarkerExtension {
        fn initialize(&self, _container: &Container) {}
    }

    #[test]
    fn build_succeeds_when_contract_registered() {
        let container = Container::new();
        container.register_instance(contract::of::<Settings>(), Settings { name: "app" });

        let settings = container.resolve(contract::of::<Settings>()).unwrap();
        assert_eq!(settings, Settings { name: "app" });
    }

    #[test]
    fn build_fails_when_contract_unknown() {
        let container = Container::new();
        assert!(matches!(
            container.build(&contract::of::<Settings>()),
            Err(BuildError::NotRegistered { .. })
        ));
    }

    #[test]
    fn build_resolves_dependencies_through_closure_providers() {
        let container = Container::new();
        container.register_instance(contract::of::<Settings>(), Settings { name: "app" });
        container.register(
            contract::of::<Service>(),
            ClosureProvider::new(|container: &Container| {
                Ok(Service {
                    settings: container.resolve(contract::of::<Settings>())?,
                })
            }),
        );

        let service = container.resolve(contract::of::<Service>()).unwrap();
        assert_eq!(service.settings.name, "app");
    }

    #[test]
    fn child_build_falls_back_to_parent_registrations() {
        let parent = Container::new();
        parent.register_instance(contract::of::<Settings>(), Settings { name: "parent" });
        let child = parent.create_child();

        let settings = child.resolve(contract::of::<Settings>()).unwrap();
        assert_eq!(settings.name, "parent");

        child.register_instance(contract::of::<Settings>(), Settings { name: "child" });
        let settings = child.resolve(contract::of::<Settings>()).unwrap();
        assert_eq!(settings.name, "child");
    }

    #[test]
    fn child_build_runs_inherited_strategies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let parent = Container::new();
        parent.add_strategy(Arc::new(CountingStrategy {
            calls: Arc::clone(&calls),
        }));
        parent.register_instance(contract::of::<Settings>(), Settings { name: "app" });

        let child = parent.create_child();
        child.build(&contract::of::<Settings>()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn extension_lookup_walks_ancestor_chain() {
        let parent = Container::new();
        let extension = Arc::new(MarkerExtension);
        parent.with_extensions(|extensions| extensions.insert(Arc::clone(&extension)));

        let child = parent.create_child();
        let found = child.extension::<MarkerExtension>().unwrap();
        assert!(found.is::<MarkerExtension>());
        assert!(child.parent().is_some());
    }
}
