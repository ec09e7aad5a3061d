use std::borrow::Cow;

use crate::contract::Contract;
use crate::engine::CompositionError;

pub use crate::util::any::{AsAny, Downcast, DowncastMut, DowncastRef};

/// A type that can be handled by the container or supplied as an export.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// One declared dependency of a [`Part`]: the member it is written to, the
/// contract it is matched by, and whether the member tolerates being written
/// again after initial construction.
pub struct ImportPoint {
    member: Cow<'static, str>,
    contract: Box<dyn Contract>,
    allow_recomposition: bool,
}

impl ImportPoint {
    /// An import point that is satisfied once, at construction time.
    pub fn new<C: Contract>(member: &'static str, contract: C) -> Self {
        Self {
            member: Cow::Borrowed(member),
            contract: Box::new(contract),
            allow_recomposition: false,
        }
    }

    /// An import point whose member may be rewritten by a later
    /// recomposition pass.
    pub fn recomposable<C: Contract>(member: &'static str, contract: C) -> Self {
        Self {
            allow_recomposition: true,
            ..Self::new(member, contract)
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn contract(&self) -> &dyn Contract {
        self.contract.as_ref()
    }

    pub fn allow_recomposition(&self) -> bool {
        self.allow_recomposition
    }

    /// Qualifies the member name with the field an embedded part lives in,
    /// so that `assign` can route the value back through that field.
    pub fn prefixed(self, field: &'static str) -> Self {
        Self {
            member: Cow::Owned(format!("{field}.{}", self.member)),
            ..self
        }
    }
}

/// An object whose declared imports can be satisfied by a composition
/// engine after the container has constructed it.
///
/// `imports` must enumerate every import point of the concrete type,
/// including points contributed by embedded parts (the statically typed
/// stand-in for inherited members). Plain objects without imports get the
/// default implementations and can opt in with an empty `impl` block:
///
/// ```rust
/// # use partbridge::part::Part;
/// struct Plain(i32);
///
/// impl Part for Plain {}
/// ```
///
/// The `#[derive(Part)]` macro generates the whole implementation from
/// `#[import]` field attributes; deriving is the recommended way.
pub trait Part: Managed {
    /// Enumerates all import points of this part.
    fn imports(&self) -> Vec<ImportPoint> {
        Vec::new()
    }

    /// Writes one resolved export into the named member.
    ///
    /// # Errors
    ///
    /// Returns an error if `member` is unknown or `value` is not of the
    /// member's declared type.
    fn assign(&mut self, member: &str, value: Box<dyn Managed>) -> Result<(), CompositionError> {
        let _ = value;
        Err(CompositionError::UnknownMember {
            part: std::any::type_name::<Self>(),
            member: member.to_owned(),
        })
    }

    /// Type-level opt-out marker: a part returning true is never touched by
    /// post-construction composition.
    fn not_composable(&self) -> bool {
        false
    }
}
