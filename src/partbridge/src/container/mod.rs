mod core;
mod extension;
mod handle;
mod provider;
mod strategy;

use std::error::Error;

use snafu::prelude::*;

use crate::contract::Contract;
use crate::engine::CompositionError;

pub use extension::ContainerExtension;
pub use handle::Container;
pub use provider::{ClosureProvider, InstanceProvider, Provider, TypedProvider};
pub use strategy::{BuildContext, BuildStrategy};

pub(crate) use extension::ExtensionMap;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum BuildError {
    #[snafu(display("no provider is registered for the contract {contract}"))]
    #[non_exhaustive]
    NotRegistered { contract: Box<dyn Contract> },
    #[snafu(display("the provider for {contract} failed to construct the object"))]
    #[non_exhaustive]
    Construction {
        contract: Box<dyn Contract>,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("post-construction composition failed for {contract}"))]
    #[non_exhaustive]
    Composition {
        contract: Box<dyn Contract>,
        source: CompositionError,
    },
}
