/// How keys of keyed maps are carried into the clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
  /// Keys are shared with the original; only values are deep-copied.
  #[default]
  ByReference,
  /// Keys go through the same registry as values.
  Deep,
}

/// What to do with resources that cannot be duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpaquePolicy {
  /// Share the handle, like any other atomic value.
  #[default]
  Share,
  /// Abort the copy with [`crate::CloneError::UnsupportedValue`].
  Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloneOptions {
  pub key_policy: KeyPolicy,
  pub opaque_policy: OpaquePolicy,
}

impl CloneOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
    self.key_policy = key_policy;
    self
  }

  pub fn with_opaque_policy(mut self, opaque_policy: OpaquePolicy) -> Self {
    self.opaque_policy = opaque_policy;
    self
  }
}
