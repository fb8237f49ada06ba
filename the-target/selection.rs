use crate::position::{
  Position,
  Range,
};

/// A selection as the host editor reports it: the anchor stays put while
/// the active end moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  #[inline]
  #[must_use]
  pub const fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  #[inline]
  #[must_use]
  pub const fn point(position: Position) -> Self {
    Self::new(position, position)
  }

  /// A selection over `range`, reversed when `is_reversed` is set.
  #[must_use]
  pub fn from_range(range: Range, is_reversed: bool) -> Self {
    if is_reversed {
      Self::new(range.end, range.start)
    } else {
      Self::new(range.start, range.end)
    }
  }

  #[inline]
  #[must_use]
  pub fn range(&self) -> Range {
    Range::new(self.anchor, self.active)
  }

  #[inline]
  #[must_use]
  pub fn is_reversed(&self) -> bool {
    self.active < self.anchor
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }
}

impl From<Range> for Selection {
  fn from(range: Range) -> Self {
    Selection::from_range(range, false)
  }
}
