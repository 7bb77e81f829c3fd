//! Visited registry: originals already seen during a traversal, mapped to
//! their clones.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Address of a shared referent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
  #[inline]
  pub fn of<T: ?Sized>(ptr: *const T) -> Self {
    Identity(ptr.cast::<()>() as usize)
  }

  #[inline]
  pub fn addr(self) -> usize {
    self.0
  }
}

impl fmt::Debug for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#x}", self.0)
  }
}

/// Each entry keeps a handle to its original so the address stays reserved
/// for as long as the registry lives.
#[derive(Default)]
pub struct Registry {
  entries: FxHashMap<Identity, (Value, Value)>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, original: &Value) -> bool {
    original.identity().is_some_and(|id| self.entries.contains_key(&id))
  }

  /// Clone registered for `original`; always `None` for atomic values.
  pub fn get(&self, original: &Value) -> Option<Value> {
    let id = original.identity()?;
    self.entries.get(&id).map(|(_, clone)| clone.clone())
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub(crate) fn lookup(&self, id: Identity) -> Option<&Value> {
    self.entries.get(&id).map(|(_, clone)| clone)
  }

  pub(crate) fn register(&mut self, id: Identity, original: Value, clone: Value) {
    self.entries.insert(id, (original, clone));
  }

  pub(crate) fn forget(&mut self, id: Identity) {
    self.entries.remove(&id);
  }
}

impl fmt::Debug for Registry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registry").field("len", &self.entries.len()).finish()
  }
}
