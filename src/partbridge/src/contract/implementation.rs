use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::contract::{Contract, TypedContract};
use crate::part::Managed;

pub(crate) struct ContractImpl<T> {
    name: Option<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Managed> ContractImpl<T> {
    pub fn new(name: Option<&'static str>) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for ContractImpl<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContractImpl<T> {}

impl<T> Debug for ContractImpl<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Contract<{}>({:?})", any::type_name::<T>(), self.name)
    }
}

impl<T> Display for ContractImpl<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.name {
            Some(name) => write!(f, "{} (named {name:?})", any::type_name::<T>()),
            None => write!(f, "{}", any::type_name::<T>()),
        }
    }
}

impl<T: Managed> Contract for ContractImpl<T> {
    fn target(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn name(&self) -> Option<&'static str> {
        self.name
    }

    fn dyn_clone(&self) -> Box<dyn Contract> {
        Box::new(*self)
    }
}

impl<T: Managed> TypedContract for ContractImpl<T> {
    type Target = T;
}
