//! Structural deep copy of cyclic, heterogeneous value graphs.
//!
//! [`deep_copy`] returns a clone that shares no container with its input,
//! maps every shared or cyclic reference in the input to a single clone, and
//! shares atomic leaves (numbers, strings, symbols, callables) by identity.

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod cloner;
pub mod error;
pub mod options;
pub mod registry;
pub mod value;

#[cfg(test)]
pub mod testing;

pub use cloner::{Cloner, deep_copy, deep_copy_all, deep_copy_with};
pub use error::CloneError;
pub use options::{CloneOptions, KeyPolicy, OpaquePolicy};
pub use registry::{Identity, Registry};
pub use value::{
  Array, Category, Date, Function, Map, MapKey, Object, Opaque, Property,
  PropertyKey, Set, Symbol, Value,
};
