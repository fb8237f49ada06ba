use thiserror::Error;

use crate::{
  config::ConfigError,
  document::DocumentId,
};

/// Everything that can go wrong while resolving a target.
///
/// The first group are scope lookups that came up empty. `cascading`
/// modifiers treat those as "try the next option"; see
/// [`TargetError::is_recoverable`]. Everything else aborts the command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetError {
  #[error("couldn't find containing {scope_type}")]
  NoContainingScope { scope_type: String },
  #[error("{scope_type} index out of range")]
  OutOfRange { scope_type: String },
  #[error("expected at most {requested} {scope_type} scopes but found {found}")]
  TooFewScopes {
    scope_type: String,
    requested:  usize,
    found:      usize,
  },
  #[error("no syntax tree available for language '{language_id}'")]
  UnsupportedLanguage { language_id: String },

  #[error("couldn't find mark {style} '{character}'")]
  MissingMark { style: String, character: String },
  #[error("couldn't find token in selection")]
  NoTokenInSelection,
  #[error("no available {key} marks")]
  NoStoredTargets { key: &'static str },
  #[error("no visible line ends in {row:02}")]
  NoVisibleLine { row: usize },
  #[error("visible line number {row:02} is ambiguous")]
  AmbiguousVisibleLine { row: usize },
  #[error("anchor and active target lengths don't match ({anchor} vs {active})")]
  RangeLengthMismatch { anchor: usize, active: usize },
  #[error("anchor and active must be in same document ({anchor} vs {active})")]
  CrossDocumentRange {
    anchor: DocumentId,
    active: DocumentId,
  },
  #[error("expected exactly one target from range modifier, got {count}")]
  ExpectedSingleTarget { count: usize },
  #[error("subtoken exclusions are not supported")]
  SubtokenExclusionUnsupported,
  #[error("no available interior")]
  NoInterior,
  #[error("no available boundary")]
  NoBoundary,
  #[error("target has no {0} delimiter")]
  NoDelimiter(&'static str),
  #[error("scope type {scope_type} is not supported for language '{language_id}'")]
  UnsupportedScopeType {
    scope_type:  String,
    language_id: String,
  },
  #[error("invalid pattern '{pattern}': {reason}")]
  InvalidPattern { pattern: String, reason: String },
  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl TargetError {
  #[inline]
  pub fn no_containing_scope(scope_type: impl ToString) -> Self {
    Self::NoContainingScope {
      scope_type: scope_type.to_string(),
    }
  }

  #[inline]
  pub fn out_of_range(scope_type: impl ToString) -> Self {
    Self::OutOfRange {
      scope_type: scope_type.to_string(),
    }
  }

  /// Whether a `cascading` modifier may swallow this error and move on to
  /// its next option.
  #[must_use]
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      Self::NoContainingScope { .. }
        | Self::OutOfRange { .. }
        | Self::TooFewScopes { .. }
        | Self::UnsupportedLanguage { .. }
    )
  }
}

pub type Result<T> = std::result::Result<T, TargetError>;
