use crate::container::{BuildError, Container};
use crate::contract::Contract;
use crate::part::Part;

/// Everything a build strategy may need about the build in progress.
pub struct BuildContext<'a> {
    container: &'a Container,
    contract: &'a dyn Contract,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(container: &'a Container, contract: &'a dyn Contract) -> Self {
        Self {
            container,
            contract,
        }
    }

    /// The container the build was requested on.
    pub fn container(&self) -> &Container {
        self.container
    }

    /// The contract the object was built for.
    pub fn contract(&self) -> &dyn Contract {
        self.contract
    }
}

/// A hook invoked by the container's build pipeline after an object has been
/// fully constructed, before it is handed back to the caller.
pub trait BuildStrategy: Send + Sync + 'static {
    /// Post-processes a freshly constructed object.
    ///
    /// # Errors
    ///
    /// Returns an error to fail the whole build; the object is discarded.
    fn post_build_up(
        &self,
        context: &BuildContext<'_>,
        existing: &mut dyn Part,
    ) -> Result<(), BuildError>;
}
