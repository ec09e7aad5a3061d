mod implementation;

use std::any::TypeId;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

use crate::part::Managed;

pub(crate) use implementation::ContractImpl;

/// The identity of an export or an import point.
///
/// Exports and imports are matched by the target type plus an optional
/// registration name. Two contracts are equal iff both components are equal,
/// which makes boxed contracts usable as map keys.
pub trait Contract
where
    Self: Debug + Display + Send + Sync + 'static,
{
    /// The [`TypeId`] of the type this contract supplies or requests.
    fn target(&self) -> TypeId;

    /// The optional registration name distinguishing contracts that share
    /// one target type.
    fn name(&self) -> Option<&'static str>;

    fn dyn_clone(&self) -> Box<dyn Contract>;
}

impl PartialEq for dyn Contract {
    fn eq(&self, other: &Self) -> bool {
        self.target() == other.target() && self.name() == other.name()
    }
}

impl Eq for dyn Contract {}

impl Hash for dyn Contract {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target().hash(state);
        self.name().hash(state);
    }
}

/// A statically typed [`Contract`], preserving the target type for typed
/// registration and resolution APIs.
pub trait TypedContract: Contract + Copy {
    type Target: Managed;
}

/// Creates a contract identified by the target type alone.
pub fn of<T>() -> impl TypedContract<Target = T>
where
    T: Managed,
{
    ContractImpl::new(None)
}

/// Creates a contract identified by the target type and a registration name.
pub fn named<T>(name: &'static str) -> impl TypedContract<Target = T>
where
    T: Managed,
{
    ContractImpl::new(Some(name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn contract_eq_succeeds_when_target_and_name_match() {
        let a: Box<dyn Contract> = Box::new(of::<i32>());
        let b: Box<dyn Contract> = Box::new(of::<i32>());
        let c: Box<dyn Contract> = Box::new(named::<i32>("other"));
        let d: Box<dyn Contract> = Box::new(of::<u32>());
        assert_eq!(a.as_ref(), b.as_ref());
        assert_ne!(a.as_ref(), c.as_ref());
        assert_ne!(a.as_ref(), d.as_ref());
    }

    #[test]
    fn contract_usable_as_map_key() {
        let mut map: HashMap<Box<dyn Contract>, i32> = HashMap::new();
        map.insert(Box::new(of::<Arc<String>>()), 1);
        map.insert(Box::new(named::<Arc<String>>("aux")), 2);

        let key = of::<Arc<String>>();
        assert_eq!(map.get(&key as &dyn Contract), Some(&1));
        let key = named::<Arc<String>>("aux");
        assert_eq!(map.get(&key as &dyn Contract), Some(&2));
    }

    #[test]
    fn contract_display_includes_name() {
        assert!(format!("{}", of::<i32>()).contains("i32"));
        let named = named::<i32>("aux");
        assert!(format!("{named}").contains("aux"));
    }
}
