//! Dynamic value graph.
//!
//! A [`Value`] is either an atomic leaf or a handle to a shared, mutable
//! referent. Cloning a `Value` with [`Clone::clone`] copies the handle, so
//! both copies observe the same referent; structural copies are produced by
//! [`crate::cloner`].

pub mod atom;
pub mod collection;
pub mod date;
pub mod object;

use std::fmt;
use std::rc::Rc;

pub use atom::{Function, Opaque, Symbol};
pub use collection::{Array, Map, MapKey, Set};
pub use date::Date;
pub use object::{Object, Property, PropertyKey};

use crate::registry::Identity;

#[derive(Clone)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(Rc<str>),
  Symbol(Symbol),
  Function(Function),
  Opaque(Opaque),
  Date(Date),
  Array(Array),
  Map(Map),
  Set(Set),
  Object(Object),
}

/// Shape category used by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  Atomic,
  Temporal,
  Sequence,
  KeyedMap,
  UniqueSet,
  Composite,
  Opaque,
}

impl Category {
  pub fn name(self) -> &'static str {
    match self {
      Category::Atomic => "atomic",
      Category::Temporal => "temporal",
      Category::Sequence => "sequence",
      Category::KeyedMap => "keyed map",
      Category::UniqueSet => "unique set",
      Category::Composite => "composite",
      Category::Opaque => "opaque",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl Value {
  pub fn str(s: &str) -> Self {
    Value::String(Rc::from(s))
  }

  pub fn category(&self) -> Category {
    match self {
      Value::Undefined
      | Value::Null
      | Value::Bool(_)
      | Value::Number(_)
      | Value::String(_)
      | Value::Symbol(_)
      | Value::Function(_) => Category::Atomic,
      Value::Opaque(_) => Category::Opaque,
      Value::Date(_) => Category::Temporal,
      Value::Array(_) => Category::Sequence,
      Value::Map(_) => Category::KeyedMap,
      Value::Set(_) => Category::UniqueSet,
      Value::Object(_) => Category::Composite,
    }
  }

  /// Address of the shared referent for tracked categories.
  pub fn identity(&self) -> Option<Identity> {
    match self {
      Value::Date(d) => Some(d.identity()),
      Value::Array(a) => Some(a.identity()),
      Value::Map(m) => Some(m.identity()),
      Value::Set(s) => Some(s.identity()),
      Value::Object(o) => Some(o.identity()),
      Value::Undefined
      | Value::Null
      | Value::Bool(_)
      | Value::Number(_)
      | Value::String(_)
      | Value::Symbol(_)
      | Value::Function(_)
      | Value::Opaque(_) => None,
    }
  }

  /// Strict identity: primitives by value, references by address.
  /// `NaN` is never the same as itself.
  pub fn same(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => {
        true
      },
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Symbol(a), Value::Symbol(b)) => a.ptr_eq(b),
      (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
      (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
      _ => match (self.identity(), other.identity()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
      },
    }
  }

  pub fn is_nullish(&self) -> bool {
    matches!(self, Value::Undefined | Value::Null)
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&Array> {
    match self {
      Value::Array(a) => Some(a),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&Map> {
    match self {
      Value::Map(m) => Some(m),
      _ => None,
    }
  }

  pub fn as_set(&self) -> Option<&Set> {
    match self {
      Value::Set(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(o) => Some(o),
      _ => None,
    }
  }

  pub fn as_date(&self) -> Option<&Date> {
    match self {
      Value::Date(d) => Some(d),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Value::Number(n)
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self {
    Value::Number(f64::from(n))
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::str(s)
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(Rc::from(s))
  }
}

impl From<Symbol> for Value {
  fn from(s: Symbol) -> Self {
    Value::Symbol(s)
  }
}

impl From<Function> for Value {
  fn from(f: Function) -> Self {
    Value::Function(f)
  }
}

impl From<Opaque> for Value {
  fn from(o: Opaque) -> Self {
    Value::Opaque(o)
  }
}

impl From<Date> for Value {
  fn from(d: Date) -> Self {
    Value::Date(d)
  }
}

impl From<Array> for Value {
  fn from(a: Array) -> Self {
    Value::Array(a)
  }
}

impl From<Map> for Value {
  fn from(m: Map) -> Self {
    Value::Map(m)
  }
}

impl From<Set> for Value {
  fn from(s: Set) -> Self {
    Value::Set(s)
  }
}

impl From<Object> for Value {
  fn from(o: Object) -> Self {
    Value::Object(o)
  }
}

// Shallow on purpose: graphs may contain cycles.
impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => write!(f, "undefined"),
      Value::Null => write!(f, "null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Number(n) => write!(f, "{n}"),
      Value::String(s) => write!(f, "{s:?}"),
      Value::Symbol(s) => write!(f, "{s:?}"),
      Value::Function(func) => write!(f, "{func:?}"),
      Value::Opaque(o) => write!(f, "{o:?}"),
      Value::Date(d) => write!(f, "{d:?}"),
      Value::Array(a) => write!(f, "{a:?}"),
      Value::Map(m) => write!(f, "{m:?}"),
      Value::Set(s) => write!(f, "{s:?}"),
      Value::Object(o) => write!(f, "{o:?}"),
    }
  }
}
