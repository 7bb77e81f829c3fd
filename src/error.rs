use crate::value::Category;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneError {
  /// A value that cannot be duplicated, met under a rejecting policy.
  UnsupportedValue { category: Category, label: String },
}

impl std::fmt::Display for CloneError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::UnsupportedValue { category, label } => {
        write!(f, "unsupported {category} value: {label}")
      },
    }
  }
}

impl std::error::Error for CloneError {}
