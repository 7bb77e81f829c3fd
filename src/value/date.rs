use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::registry::Identity;

/// Mutable point in time. `None` is an invalid date.
#[derive(Clone)]
pub struct Date(Rc<Cell<Option<DateTime<Utc>>>>);

impl Date {
  pub fn new(instant: DateTime<Utc>) -> Self {
    Date(Rc::new(Cell::new(Some(instant))))
  }

  pub fn now() -> Self {
    Self::new(Utc::now())
  }

  pub fn invalid() -> Self {
    Date(Rc::new(Cell::new(None)))
  }

  pub fn from_timestamp_millis(millis: i64) -> Self {
    Date(Rc::new(Cell::new(DateTime::from_timestamp_millis(millis))))
  }

  pub fn instant(&self) -> Option<DateTime<Utc>> {
    self.0.get()
  }

  pub fn set_instant(&self, instant: Option<DateTime<Utc>>) {
    self.0.set(instant);
  }

  pub fn timestamp_millis(&self) -> Option<i64> {
    self.instant().map(|t| t.timestamp_millis())
  }

  /// New, unshared date holding the same instant.
  pub fn copy_instant(&self) -> Self {
    Date(Rc::new(Cell::new(self.instant())))
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Date) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[inline]
  pub fn identity(&self) -> Identity {
    Identity::of(Rc::as_ptr(&self.0))
  }
}

impl fmt::Debug for Date {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.instant() {
      Some(t) => write!(f, "Date({})", t.to_rfc3339()),
      None => write!(f, "Date(invalid)"),
    }
  }
}
