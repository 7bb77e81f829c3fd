//! Reference values that are never duplicated: symbols, callables and
//! opaque resources.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::Value;

struct SymbolData {
  description: Option<String>,
}

/// Unique symbolic token. Two symbols are equal only if they are the same
/// allocation, whatever their descriptions.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
  pub fn new(description: &str) -> Self {
    Symbol(Rc::new(SymbolData { description: Some(description.to_owned()) }))
  }

  pub fn anonymous() -> Self {
    Symbol(Rc::new(SymbolData { description: None }))
  }

  pub fn description(&self) -> Option<&str> {
    self.0.description.as_deref()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Symbol) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub(crate) fn addr(&self) -> usize {
    Rc::as_ptr(&self.0).cast::<()>() as usize
  }
}

impl PartialEq for Symbol {
  fn eq(&self, other: &Self) -> bool {
    self.ptr_eq(other)
  }
}
impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.addr().hash(state);
  }
}

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.description() {
      Some(d) => write!(f, "Symbol({d})"),
      None => write!(f, "Symbol()"),
    }
  }
}

type NativeFn = dyn Fn(&[Value]) -> Value;

struct FunctionData {
  name: String,
  body: Box<NativeFn>,
}

/// Callable value. Closed-over state lives inside the closure and is shared
/// by every handle.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
  pub fn new(
    name: impl Into<String>,
    body: impl Fn(&[Value]) -> Value + 'static,
  ) -> Self {
    Function(Rc::new(FunctionData { name: name.into(), body: Box::new(body) }))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  pub fn call(&self, args: &[Value]) -> Value {
    (self.0.body)(args)
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Function) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub(crate) fn addr(&self) -> usize {
    Rc::as_ptr(&self.0).cast::<()>() as usize
  }
}

impl fmt::Debug for Function {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Function({})", self.0.name)
  }
}

struct OpaqueData {
  label: String,
  resource: Box<dyn Any>,
}

/// A resource that cannot be duplicated (file handle, socket, thread).
#[derive(Clone)]
pub struct Opaque(Rc<OpaqueData>);

impl Opaque {
  pub fn new<T: Any>(label: impl Into<String>, resource: T) -> Self {
    Opaque(Rc::new(OpaqueData {
      label: label.into(),
      resource: Box::new(resource),
    }))
  }

  pub fn label(&self) -> &str {
    &self.0.label
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.0.resource.downcast_ref::<T>()
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Opaque) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub(crate) fn addr(&self) -> usize {
    Rc::as_ptr(&self.0).cast::<()>() as usize
  }
}

impl fmt::Debug for Opaque {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Opaque({})", self.0.label)
  }
}
