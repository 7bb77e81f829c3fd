//! Generic composite: a prototype reference plus an own-property table.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{Symbol, Value};
use crate::registry::Identity;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
  Name(Rc<str>),
  Symbol(Symbol),
}

impl PropertyKey {
  pub fn as_name(&self) -> Option<&str> {
    match self {
      PropertyKey::Name(n) => Some(n),
      PropertyKey::Symbol(_) => None,
    }
  }

  /// Canonical array index (`"0"`, `"17"`, but not `"01"` or `"4294967295"`).
  fn array_index(&self) -> Option<u32> {
    let name = self.as_name()?;
    let idx: u32 = name.parse().ok()?;
    (idx != u32::MAX && idx.to_string() == name).then_some(idx)
  }
}

impl From<&str> for PropertyKey {
  fn from(s: &str) -> Self {
    PropertyKey::Name(Rc::from(s))
  }
}

impl From<String> for PropertyKey {
  fn from(s: String) -> Self {
    PropertyKey::Name(Rc::from(s))
  }
}

impl From<Symbol> for PropertyKey {
  fn from(s: Symbol) -> Self {
    PropertyKey::Symbol(s)
  }
}

impl From<&Symbol> for PropertyKey {
  fn from(s: &Symbol) -> Self {
    PropertyKey::Symbol(s.clone())
  }
}

impl fmt::Debug for PropertyKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PropertyKey::Name(n) => write!(f, "{n:?}"),
      PropertyKey::Symbol(s) => write!(f, "[{s:?}]"),
    }
  }
}

#[derive(Clone, Debug)]
pub struct Property {
  pub value: Value,
  pub enumerable: bool,
}

struct ObjectData {
  prototype: Option<Object>,
  properties: IndexMap<PropertyKey, Property>,
}

#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
  pub fn new() -> Self {
    Self::with_prototype(None)
  }

  /// New empty object whose behavioral template is `prototype`.
  pub fn with_prototype(prototype: Option<Object>) -> Self {
    Object(Rc::new(RefCell::new(ObjectData {
      prototype,
      properties: IndexMap::new(),
    })))
  }

  pub fn from_entries<K, I>(entries: I) -> Self
  where
    K: Into<PropertyKey>,
    I: IntoIterator<Item = (K, Value)>,
  {
    let obj = Self::new();
    for (k, v) in entries {
      obj.set(k, v);
    }
    obj
  }

  pub fn prototype(&self) -> Option<Object> {
    self.0.borrow().prototype.clone()
  }

  /// Returns `false` and leaves the object untouched if `prototype` would
  /// make the chain cyclic.
  pub fn set_prototype(&self, prototype: Option<Object>) -> bool {
    let mut cursor = prototype.clone();
    while let Some(p) = cursor {
      if p.ptr_eq(self) {
        return false;
      }
      cursor = p.prototype();
    }
    self.0.borrow_mut().prototype = prototype;
    true
  }

  /// Assigns an own property. New properties are enumerable; existing ones
  /// keep their flags.
  pub fn set(&self, key: impl Into<PropertyKey>, value: Value) {
    let mut data = self.0.borrow_mut();
    match data.properties.entry(key.into()) {
      indexmap::map::Entry::Occupied(mut e) => e.get_mut().value = value,
      indexmap::map::Entry::Vacant(e) => {
        e.insert(Property { value, enumerable: true });
      },
    }
  }

  pub fn define(
    &self,
    key: impl Into<PropertyKey>,
    value: Value,
    enumerable: bool,
  ) {
    self
      .0
      .borrow_mut()
      .properties
      .insert(key.into(), Property { value, enumerable });
  }

  pub fn property(&self, key: impl Into<PropertyKey>) -> Option<Property> {
    self.0.borrow().properties.get(&key.into()).cloned()
  }

  pub fn get_own(&self, key: impl Into<PropertyKey>) -> Option<Value> {
    self.property(key).map(|p| p.value)
  }

  /// Looks the key up along the prototype chain.
  pub fn get(&self, key: impl Into<PropertyKey>) -> Option<Value> {
    let key = key.into();
    let mut cursor = Some(self.clone());
    while let Some(obj) = cursor {
      if let Some(p) = obj.0.borrow().properties.get(&key) {
        return Some(p.value.clone());
      }
      cursor = obj.prototype();
    }
    None
  }

  pub fn has_own(&self, key: impl Into<PropertyKey>) -> bool {
    self.0.borrow().properties.contains_key(&key.into())
  }

  pub fn delete(&self, key: impl Into<PropertyKey>) -> Option<Value> {
    self.0.borrow_mut().properties.shift_remove(&key.into()).map(|p| p.value)
  }

  pub fn clear(&self) {
    self.0.borrow_mut().properties.clear();
  }

  pub fn len(&self) -> usize {
    self.0.borrow().properties.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.borrow().properties.is_empty()
  }

  /// Every own key, enumerable or not: array indices ascending, then the
  /// other names in insertion order, then symbols in insertion order.
  pub fn own_keys(&self) -> Vec<PropertyKey> {
    let data = self.0.borrow();
    let mut indices: Vec<(u32, &PropertyKey)> = Vec::new();
    let mut names = Vec::new();
    let mut symbols = Vec::new();
    for key in data.properties.keys() {
      match key {
        PropertyKey::Symbol(_) => symbols.push(key.clone()),
        PropertyKey::Name(_) => match key.array_index() {
          Some(idx) => indices.push((idx, key)),
          None => names.push(key.clone()),
        },
      }
    }
    indices.sort_by_key(|(idx, _)| *idx);
    let mut keys: Vec<PropertyKey> =
      indices.into_iter().map(|(_, k)| k.clone()).collect();
    keys.extend(names);
    keys.extend(symbols);
    keys
  }

  /// Own properties in [`Object::own_keys`] order.
  pub fn own_properties(&self) -> Vec<(PropertyKey, Property)> {
    let keys = self.own_keys();
    let data = self.0.borrow();
    keys
      .into_iter()
      .filter_map(|k| data.properties.get(&k).cloned().map(|p| (k, p)))
      .collect()
  }

  /// Enumerable own string keys.
  pub fn keys(&self) -> Vec<Rc<str>> {
    let data = self.0.borrow();
    self
      .own_keys()
      .into_iter()
      .filter_map(|k| match (&k, data.properties.get(&k)) {
        (PropertyKey::Name(n), Some(p)) if p.enumerable => Some(n.clone()),
        _ => None,
      })
      .collect()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Object) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub fn identity(&self) -> Identity {
    Identity::of(Rc::as_ptr(&self.0))
  }
}

impl Default for Object {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Object(len={} @{:?})", self.len(), self.identity())
  }
}
