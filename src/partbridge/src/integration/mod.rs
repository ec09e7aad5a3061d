mod adapter;
mod bridge;
mod extension;
mod strategy;

pub use adapter::{ContainerAdapter, ContainerExportProvider};
pub use bridge::ComposeContainerExt;
pub use extension::CompositionIntegration;
pub use strategy::{ComposeStrategy, RetryPolicy};
