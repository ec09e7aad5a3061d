#![allow(clippy::new_without_default)]

pub mod container;
pub mod contract;
pub mod engine;
pub mod integration;
pub mod part;
mod util;

pub use partbridge_derive::Part;

pub mod prelude {
    pub use crate::container::{BuildError, Container};
    pub use crate::contract;
    pub use crate::engine::{CompositionEngine, CompositionError, ExportCatalog};
    pub use crate::integration::{ComposeContainerExt, CompositionIntegration};
    pub use crate::part::{ImportPoint, Managed, Part};
    pub use crate::Part;
}
