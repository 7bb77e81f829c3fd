//! Sequences, keyed maps and unique sets.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use super::Value;
use crate::registry::Identity;

// ============================================================================
// Keys
// ============================================================================

/// Map key and set member with SameValueZero semantics: `NaN` equals `NaN`,
/// `-0` equals `+0`, strings compare by content and reference values by
/// identity.
#[derive(Clone)]
pub struct MapKey(Value);

impl MapKey {
  pub fn new(value: Value) -> Self {
    match value {
      Value::Number(n) if n == 0.0 => MapKey(Value::Number(0.0)),
      v => MapKey(v),
    }
  }

  pub fn value(&self) -> &Value {
    &self.0
  }

  pub fn into_value(self) -> Value {
    self.0
  }
}

impl PartialEq for MapKey {
  fn eq(&self, other: &Self) -> bool {
    match (&self.0, &other.0) {
      (Value::Number(a), Value::Number(b)) => {
        (a.is_nan() && b.is_nan()) || a == b
      },
      (a, b) => a.same(b),
    }
  }
}
impl Eq for MapKey {}

impl Hash for MapKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    match &self.0 {
      Value::Undefined => 0u8.hash(state),
      Value::Null => 1u8.hash(state),
      Value::Bool(b) => {
        2u8.hash(state);
        b.hash(state);
      },
      Value::Number(n) => {
        3u8.hash(state);
        let bits = if n.is_nan() {
          f64::NAN.to_bits()
        } else if *n == 0.0 {
          0
        } else {
          n.to_bits()
        };
        bits.hash(state);
      },
      Value::String(s) => {
        4u8.hash(state);
        s.hash(state);
      },
      Value::Symbol(s) => {
        5u8.hash(state);
        s.addr().hash(state);
      },
      Value::Function(f) => {
        6u8.hash(state);
        f.addr().hash(state);
      },
      Value::Opaque(o) => {
        7u8.hash(state);
        o.addr().hash(state);
      },
      v => {
        8u8.hash(state);
        v.identity().hash(state);
      },
    }
  }
}

impl fmt::Debug for MapKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

// ============================================================================
// Array
// ============================================================================

#[derive(Clone)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
  pub fn new() -> Self {
    Array(Rc::new(RefCell::new(Vec::new())))
  }

  pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
    Array(Rc::new(RefCell::new(values.into_iter().collect())))
  }

  pub fn len(&self) -> usize {
    self.0.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.borrow().is_empty()
  }

  pub fn get(&self, idx: usize) -> Option<Value> {
    self.0.borrow().get(idx).cloned()
  }

  /// Stores at `idx`, padding with `undefined` past the current end.
  pub fn set(&self, idx: usize, value: Value) {
    let mut items = self.0.borrow_mut();
    if idx >= items.len() {
      items.resize(idx + 1, Value::Undefined);
    }
    items[idx] = value;
  }

  pub fn push(&self, value: Value) {
    self.0.borrow_mut().push(value);
  }

  pub fn pop(&self) -> Option<Value> {
    self.0.borrow_mut().pop()
  }

  pub fn clear(&self) {
    self.0.borrow_mut().clear();
  }

  /// Snapshot of the element handles.
  pub fn to_vec(&self) -> Vec<Value> {
    self.0.borrow().clone()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Array) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub fn identity(&self) -> Identity {
    Identity::of(Rc::as_ptr(&self.0))
  }
}

impl Default for Array {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Array {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Array(len={} @{:?})", self.len(), self.identity())
  }
}

// ============================================================================
// Map
// ============================================================================

/// Insertion-ordered association from arbitrary keys to values.
#[derive(Clone)]
pub struct Map(Rc<RefCell<IndexMap<MapKey, Value>>>);

impl Map {
  pub fn new() -> Self {
    Map(Rc::new(RefCell::new(IndexMap::new())))
  }

  pub fn from_entries<I: IntoIterator<Item = (Value, Value)>>(
    entries: I,
  ) -> Self {
    let map = Self::new();
    for (k, v) in entries {
      map.insert(k, v);
    }
    map
  }

  pub fn len(&self) -> usize {
    self.0.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.borrow().is_empty()
  }

  pub fn get(&self, key: &Value) -> Option<Value> {
    self.0.borrow().get(&MapKey::new(key.clone())).cloned()
  }

  pub fn contains_key(&self, key: &Value) -> bool {
    self.0.borrow().contains_key(&MapKey::new(key.clone()))
  }

  /// Overwriting an existing key keeps its position.
  pub fn insert(&self, key: Value, value: Value) -> Option<Value> {
    self.0.borrow_mut().insert(MapKey::new(key), value)
  }

  pub fn remove(&self, key: &Value) -> Option<Value> {
    self.0.borrow_mut().shift_remove(&MapKey::new(key.clone()))
  }

  pub fn clear(&self) {
    self.0.borrow_mut().clear();
  }

  /// Snapshot of the entries in iteration order.
  pub fn entries(&self) -> Vec<(Value, Value)> {
    self
      .0
      .borrow()
      .iter()
      .map(|(k, v)| (k.value().clone(), v.clone()))
      .collect()
  }

  pub fn keys(&self) -> Vec<Value> {
    self.0.borrow().keys().map(|k| k.value().clone()).collect()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Map) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub fn identity(&self) -> Identity {
    Identity::of(Rc::as_ptr(&self.0))
  }
}

impl Default for Map {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Map {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Map(len={} @{:?})", self.len(), self.identity())
  }
}

// ============================================================================
// Set
// ============================================================================

/// Insertion-ordered collection of distinct values.
#[derive(Clone)]
pub struct Set(Rc<RefCell<IndexSet<MapKey>>>);

impl Set {
  pub fn new() -> Self {
    Set(Rc::new(RefCell::new(IndexSet::new())))
  }

  pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
    let set = Self::new();
    for v in values {
      set.insert(v);
    }
    set
  }

  pub fn len(&self) -> usize {
    self.0.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.borrow().is_empty()
  }

  /// Returns `false` if an equal member was already present.
  pub fn insert(&self, value: Value) -> bool {
    self.0.borrow_mut().insert(MapKey::new(value))
  }

  pub fn contains(&self, value: &Value) -> bool {
    self.0.borrow().contains(&MapKey::new(value.clone()))
  }

  pub fn remove(&self, value: &Value) -> bool {
    self.0.borrow_mut().shift_remove(&MapKey::new(value.clone()))
  }

  pub fn clear(&self) {
    self.0.borrow_mut().clear();
  }

  /// Snapshot of the members in iteration order.
  pub fn values(&self) -> Vec<Value> {
    self.0.borrow().iter().map(|k| k.value().clone()).collect()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Set) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub fn identity(&self) -> Identity {
    Identity::of(Rc::as_ptr(&self.0))
  }
}

impl Default for Set {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Set {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Set(len={} @{:?})", self.len(), self.identity())
  }
}
