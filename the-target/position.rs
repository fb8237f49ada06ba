//! Line/character positions and the ranges built from them.
//!
//! A [`Position`] is a zero-based `(line, character)` pair where `character`
//! counts `char`s from the start of the line. Positions order first by line
//! and then by character, so a [`Range`] is simply an ordered pair of them.
//!
//! ```
//! use the_target::position::{Position, Range};
//!
//! let a = Range::new(Position::new(0, 4), Position::new(0, 1));
//! assert_eq!(a.start, Position::new(0, 1));
//! assert!(a.contains(Position::new(0, 4)));
//! assert!(!a.strictly_contains(Position::new(0, 4)));
//! ```

use std::fmt;

/// A single point in a document. 0-indexed as all things should be.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl Position {
  #[inline]
  #[must_use]
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  #[inline]
  #[must_use]
  pub const fn zero() -> Self {
    Self::new(0, 0)
  }

  #[inline]
  #[must_use]
  pub fn is_before(self, other: Self) -> bool {
    self < other
  }

  #[inline]
  #[must_use]
  pub const fn with_character(self, character: usize) -> Self {
    Self::new(self.line, character)
  }
}

impl From<(usize, usize)> for Position {
  fn from((line, character): (usize, usize)) -> Self {
    Position::new(line, character)
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.character)
  }
}

/// An ordered pair of positions, `start <= end`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
  pub start: Position,
  pub end:   Position,
}

impl Range {
  /// Builds a range from two positions in either order.
  #[must_use]
  pub fn new(a: Position, b: Position) -> Self {
    if a <= b {
      Self { start: a, end: b }
    } else {
      Self { start: b, end: a }
    }
  }

  #[inline]
  #[must_use]
  pub fn point(position: Position) -> Self {
    Self {
      start: position,
      end:   position,
    }
  }

  #[must_use]
  pub fn from_coords(
    start_line: usize,
    start_character: usize,
    end_line: usize,
    end_character: usize,
  ) -> Self {
    Self::new(
      Position::new(start_line, start_character),
      Position::new(end_line, end_character),
    )
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  #[inline]
  #[must_use]
  pub fn is_single_line(&self) -> bool {
    self.start.line == self.end.line
  }

  /// Non-strict containment: a position on either edge is contained.
  #[inline]
  #[must_use]
  pub fn contains(&self, position: Position) -> bool {
    self.start <= position && position <= self.end
  }

  /// Containment that excludes both edges.
  #[inline]
  #[must_use]
  pub fn strictly_contains(&self, position: Position) -> bool {
    self.start < position && position < self.end
  }

  #[inline]
  #[must_use]
  pub fn contains_range(&self, other: &Range) -> bool {
    self.start <= other.start && other.end <= self.end
  }

  /// `self` contains `other` and is larger than it.
  #[inline]
  #[must_use]
  pub fn strictly_contains_range(&self, other: &Range) -> bool {
    self.contains_range(other) && self != other
  }

  /// The overlap of the two ranges, which is empty when they only touch and
  /// `None` when they are disjoint.
  #[must_use]
  pub fn intersection(&self, other: &Range) -> Option<Range> {
    let start = self.start.max(other.start);
    let end = self.end.min(other.end);
    (start <= end).then_some(Range { start, end })
  }

  /// Whether the ranges share at least one character.
  #[must_use]
  pub fn overlaps(&self, other: &Range) -> bool {
    self
      .intersection(other)
      .is_some_and(|intersection| !intersection.is_empty())
  }

  #[must_use]
  pub fn union(&self, other: &Range) -> Range {
    Range {
      start: self.start.min(other.start),
      end:   self.end.max(other.end),
    }
  }
}

impl fmt::Display for Range {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.start, self.end)
  }
}

#[cfg(test)]
mod test {
  use quickcheck::{
    Arbitrary,
    Gen,
  };

  use super::*;

  impl Arbitrary for Position {
    fn arbitrary(g: &mut Gen) -> Self {
      Position::new(usize::arbitrary(g) % 8, usize::arbitrary(g) % 16)
    }
  }

  impl Arbitrary for Range {
    fn arbitrary(g: &mut Gen) -> Self {
      Range::new(Position::arbitrary(g), Position::arbitrary(g))
    }
  }

  #[test]
  fn new_orders_positions() {
    let range = Range::from_coords(3, 1, 1, 7);
    assert_eq!(range.start, Position::new(1, 7));
    assert_eq!(range.end, Position::new(3, 1));
  }

  #[test]
  fn touching_ranges_intersect_empty() {
    let a = Range::from_coords(0, 0, 0, 3);
    let b = Range::from_coords(0, 3, 0, 5);
    assert_eq!(a.intersection(&b), Some(Range::point(Position::new(0, 3))));
    assert!(!a.overlaps(&b));
    assert_eq!(a.intersection(&Range::from_coords(1, 0, 1, 1)), None);
  }

  #[test]
  fn containment_edges() {
    let range = Range::from_coords(0, 2, 0, 4);
    assert!(range.contains(Position::new(0, 2)));
    assert!(!range.strictly_contains(Position::new(0, 2)));
    assert!(range.strictly_contains(Position::new(0, 3)));
    assert!(range.contains_range(&range));
    assert!(!range.strictly_contains_range(&range));
  }

  quickcheck::quickcheck! {
    fn union_contains_both(a: Range, b: Range) -> bool {
      let union = a.union(&b);
      union.contains_range(&a) && union.contains_range(&b)
    }

    fn intersection_is_contained_by_both(a: Range, b: Range) -> bool {
      match a.intersection(&b) {
        Some(i) => a.contains_range(&i) && b.contains_range(&i),
        None => a.end < b.start || b.end < a.start,
      }
    }
  }
}
