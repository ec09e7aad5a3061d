use crate::container::{BuildError, Container};
use crate::part::Part;

/// A factory which constructs one registered object per request.
///
/// Providers are stateless and may be called from multiple threads. Each
/// request receives a freshly constructed object; the container applies its
/// post-construction strategies to the result before handing it back.
pub trait Provider: Send + Sync + 'static {
    /// Constructs a new type-erased object. The container is passed in so
    /// the provider can build its own dependencies through it.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency cannot be built or the construction
    /// itself fails.
    fn dyn_provide(&self, container: &Container) -> Result<Box<dyn Part>, BuildError>;
}

/// A static variant of [`Provider`], preserving the output type.
pub trait TypedProvider: Provider {
    type Output: Part;

    /// Constructs a new object of type [`TypedProvider::Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency cannot be built or the construction
    /// itself fails.
    fn provide(&self, container: &Container) -> Result<Self::Output, BuildError>;
}

impl<T: TypedProvider> Provider for T {
    fn dyn_provide(&self, container: &Container) -> Result<Box<dyn Part>, BuildError> {
        self.provide(container)
            .map(|object| -> Box<dyn Part> { Box::new(object) })
    }
}

/// Provides clones of a fixed value.
pub struct InstanceProvider<T> {
    value: T,
}

impl<T> InstanceProvider<T>
where
    T: Part + Clone,
{
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> TypedProvider for InstanceProvider<T>
where
    T: Part + Clone,
{
    type Output = T;

    fn provide(&self, _container: &Container) -> Result<Self::Output, BuildError> {
        Ok(self.value.clone())
    }
}

/// Provides objects constructed by a closure, which may pull its own
/// dependencies from the container.
pub struct ClosureProvider<F> {
    closure: F,
}

impl<F, T> ClosureProvider<F>
where
    F: Fn(&Container) -> Result<T, BuildError> + Send + Sync + 'static,
    T: Part,
{
    pub fn new(closure: F) -> Self {
        Self { closure }
    }
}

impl<F, T> TypedProvider for ClosureProvider<F>
where
    F: Fn(&Container) -> Result<T, BuildError> + Send + Sync + 'static,
    T: Part,
{
    type Output = T;

    fn provide(&self, container: &Container) -> Result<Self::Output, BuildError> {
        (self.closure)(container)
    }
}
