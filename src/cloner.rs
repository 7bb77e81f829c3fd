//! Deep copy engine.
//!
//! Composites are cloned in two steps: `visit` allocates an empty clone with
//! the original's shape, registers it and schedules a fill task; the fill task
//! later visits every child in order and appends the results. Registration
//! therefore always precedes the cloning of children, so a cycle back to a
//! composite under construction resolves to its (still filling) clone.
//!
//! Fill tasks live on a heap-allocated stack, so arbitrarily deep graphs do not
//! grow the native stack.

use tracing::{debug, trace, warn};

use crate::error::CloneError;
use crate::options::{CloneOptions, KeyPolicy, OpaquePolicy};
use crate::registry::{Identity, Registry};
use crate::value::{Array, Category, Map, Object, Set, Value};

enum Task {
  Array { src: Array, dst: Array },
  Map { src: Map, dst: Map },
  Set { src: Set, dst: Set },
  Object { src: Object, dst: Object },
}

/// A copy session. The registry persists across [`Cloner::clone_value`]
/// calls, so roots cloned through one session share the clones of whatever
/// substructure they have in common.
#[derive(Default)]
pub struct Cloner {
  options: CloneOptions,
  registry: Registry,
  stack: Vec<Task>,
  // Identities registered by the call in progress, for rollback on error.
  journal: Vec<Identity>,
}

impl Cloner {
  pub fn new(options: CloneOptions) -> Self {
    Self::with_registry(options, Registry::new())
  }

  pub fn with_registry(options: CloneOptions, registry: Registry) -> Self {
    Cloner { options, registry, stack: Vec::new(), journal: Vec::new() }
  }

  pub fn options(&self) -> &CloneOptions {
    &self.options
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn into_registry(self) -> Registry {
    self.registry
  }

  /// Clones `value`. On error nothing registered by this call is kept.
  pub fn clone_value(&mut self, value: &Value) -> Result<Value, CloneError> {
    self.journal.clear();
    match self.visit(value).and_then(|root| self.drain().map(|()| root)) {
      Ok(root) => {
        debug!(
          category = %value.category(),
          registered = self.journal.len(),
          "deep copy complete"
        );
        self.journal.clear();
        Ok(root)
      },
      Err(err) => {
        self.stack.clear();
        for id in self.journal.drain(..) {
          self.registry.forget(id);
        }
        Err(err)
      },
    }
  }

  fn drain(&mut self) -> Result<(), CloneError> {
    while let Some(task) = self.stack.pop() {
      self.fill(task)?;
    }
    Ok(())
  }

  fn register(&mut self, id: Identity, original: &Value, clone: Value) {
    trace!(category = %original.category(), id = ?id, "registered");
    self.registry.register(id, original.clone(), clone);
    self.journal.push(id);
  }

  fn visit(&mut self, value: &Value) -> Result<Value, CloneError> {
    let id = match value.identity() {
      Some(id) => {
        if let Some(done) = self.registry.lookup(id) {
          return Ok(done.clone());
        }
        id
      },
      None => return self.visit_atomic(value),
    };
    let clone = match value {
      Value::Date(d) => Value::Date(d.copy_instant()),
      Value::Array(src) => {
        let dst = Array::new();
        self.stack.push(Task::Array { src: src.clone(), dst: dst.clone() });
        Value::Array(dst)
      },
      Value::Map(src) => {
        let dst = Map::new();
        self.stack.push(Task::Map { src: src.clone(), dst: dst.clone() });
        Value::Map(dst)
      },
      Value::Set(src) => {
        let dst = Set::new();
        self.stack.push(Task::Set { src: src.clone(), dst: dst.clone() });
        Value::Set(dst)
      },
      Value::Object(src) => {
        let dst = Object::with_prototype(src.prototype());
        self.stack.push(Task::Object { src: src.clone(), dst: dst.clone() });
        Value::Object(dst)
      },
      Value::Undefined
      | Value::Null
      | Value::Bool(_)
      | Value::Number(_)
      | Value::String(_)
      | Value::Symbol(_)
      | Value::Function(_)
      | Value::Opaque(_) => return self.visit_atomic(value),
    };
    self.register(id, value, clone.clone());
    Ok(clone)
  }

  fn visit_atomic(&self, value: &Value) -> Result<Value, CloneError> {
    match (value, self.options.opaque_policy) {
      (Value::Opaque(o), OpaquePolicy::Reject) => {
        warn!(label = o.label(), "refusing to copy opaque value");
        Err(CloneError::UnsupportedValue {
          category: Category::Opaque,
          label: o.label().to_owned(),
        })
      },
      _ => Ok(value.clone()),
    }
  }

  fn fill(&mut self, task: Task) -> Result<(), CloneError> {
    match task {
      Task::Array { src, dst } => {
        for item in src.to_vec() {
          let item = self.visit(&item)?;
          dst.push(item);
        }
      },
      Task::Map { src, dst } => {
        for (key, val) in src.entries() {
          let key = match self.options.key_policy {
            KeyPolicy::ByReference => key,
            KeyPolicy::Deep => self.visit(&key)?,
          };
          let val = self.visit(&val)?;
          dst.insert(key, val);
        }
      },
      Task::Set { src, dst } => {
        for member in src.values() {
          let member = self.visit(&member)?;
          dst.insert(member);
        }
      },
      Task::Object { src, dst } => {
        for (key, prop) in src.own_properties() {
          let val = self.visit(&prop.value)?;
          dst.define(key, val, prop.enumerable);
        }
      },
    }
    Ok(())
  }
}

/// Deep-copies `value` with a fresh registry and default options. Never
/// fails under the defaults.
pub fn deep_copy(value: &Value) -> Result<Value, CloneError> {
  Cloner::default().clone_value(value)
}

/// Deep-copies `value` through a caller-owned registry. Entries already in
/// `registry` are reused, and entries added by a successful copy stay.
pub fn deep_copy_with(
  value: &Value,
  registry: &mut Registry,
  options: &CloneOptions,
) -> Result<Value, CloneError> {
  let mut cloner = Cloner::with_registry(*options, std::mem::take(registry));
  let result = cloner.clone_value(value);
  *registry = cloner.into_registry();
  result
}

/// Deep-copies several roots through one session, preserving sharing between
/// them.
pub fn deep_copy_all(roots: &[Value]) -> Result<Vec<Value>, CloneError> {
  let mut cloner = Cloner::default();
  roots.iter().map(|root| cloner.clone_value(root)).collect()
}
