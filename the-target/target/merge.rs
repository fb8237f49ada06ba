//! Building one continuous target out of two.
//!
//! Two targets of the same kind merge into a target of that kind, keeping
//! the kind's delimiter metadata. Anything else degrades to an untyped
//! target over the merged range. Excluding an end trims to the inner edge of
//! that end's target; line targets trim by whole lines.

use super::{
  Target,
  TargetFlags,
  TargetKind,
  calc_is_reversed,
  full_lines,
};
use crate::position::{
  Position,
  Range,
};

/// The range from `start` to `end`, dropping either end's own content when
/// it is excluded.
pub fn continuous_range(start: &Target, end: &Target, include_start: bool, include_end: bool) -> Range {
  let document = start.document();

  let from = if include_start {
    start.content_range().start
  } else if start.is_line() && start.content_range().end.line + 1 < document.line_count() {
    Position::new(start.content_range().end.line + 1, 0)
  } else {
    start.content_range().end
  };

  let to = if include_end {
    end.content_range().end
  } else if end.is_line() && end.content_range().start.line > 0 {
    let previous = end.content_range().start.line - 1;
    Position::new(previous, document.line_len(previous))
  } else {
    end.content_range().start
  };

  Range::new(from, to)
}

/// Merges `start` and `end` into a single target running from the start of
/// one to the end of the other.
pub fn continuous_target(
  start: &Target,
  end: &Target,
  include_start: bool,
  include_end: bool,
  is_reversed: bool,
) -> Target {
  let range = continuous_range(start, end, include_start, include_end);
  let editor = start.editor().clone();

  if start.kind() == &TargetKind::Line && end.kind() == &TargetKind::Line {
    return Target::line(editor, range, is_reversed);
  }

  if !(include_start && include_end) || start.kind() != end.kind() {
    return Target::untyped(editor, range, is_reversed, true);
  }

  let merged = match start.kind() {
    TargetKind::Untyped => Target::untyped(editor, range, is_reversed, true),
    TargetKind::Plain => Target::plain(editor, range, is_reversed),
    TargetKind::Raw => Target::raw(editor, range, is_reversed),
    TargetKind::Token => Target::token(editor, range, is_reversed),
    TargetKind::Paragraph => {
      let lines = full_lines(start.document(), range.start.line, range.end.line);
      Target::paragraph(editor, lines, is_reversed)
    },
    TargetKind::Document => Target::whole_document(editor).with_is_reversed(is_reversed),
    TargetKind::Scope(scope_type) => Target::scope(editor, scope_type.clone(), range, is_reversed),
    TargetKind::Line | TargetKind::Position(_) => Target::untyped(editor, range, is_reversed, true),
    TargetKind::SurroundingPair
    | TargetKind::Interior
    | TargetKind::CollectionItem
    | TargetKind::SubTokenWord => {
      let mut merged = Target::delimited(
        editor,
        start.kind().clone(),
        range,
        (start.leading_delimiter(), end.trailing_delimiter()),
        start.delimiter().unwrap_or(""),
        is_reversed,
      );
      merged.removal_range = start
        .removal_range()
        .union(&end.removal_range())
        .union(&range);
      merged
    },
  };
  merged.with_flags(TargetFlags::EXPLICIT_RANGE)
}

/// The continuous target between `anchor` and `active`, reversed when
/// `active` comes first.
pub fn range_target(anchor: &Target, active: &Target, exclude_anchor: bool, exclude_active: bool) -> Target {
  let is_reversed = calc_is_reversed(anchor.content_range(), active.content_range());
  if is_reversed {
    continuous_target(active, anchor, !exclude_active, !exclude_anchor, true)
  } else {
    continuous_target(anchor, active, !exclude_anchor, !exclude_active, false)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    descriptor::ScopeType,
    target::test::editor,
  };

  #[test]
  fn same_kind_keeps_metadata() {
    let editor = editor("foo, bar, baz");
    let item = |start, end, leading, trailing| {
      Target::delimited(
        editor.clone(),
        TargetKind::CollectionItem,
        Range::from_coords(0, start, 0, end),
        (leading, trailing),
        ", ",
        false,
      )
    };
    let foo = item(0, 3, None, Some(Range::from_coords(0, 3, 0, 5)));
    let bar = item(5, 8, Some(Range::from_coords(0, 3, 0, 5)), Some(Range::from_coords(0, 8, 0, 10)));

    let merged = continuous_target(&foo, &bar, true, true, false);
    assert_eq!(merged.kind(), &TargetKind::CollectionItem);
    assert_eq!(merged.content_range(), Range::from_coords(0, 0, 0, 8));
    assert_eq!(merged.delimiter(), Some(", "));
    assert_eq!(merged.leading_delimiter(), None);
    assert_eq!(merged.trailing_delimiter(), Some(Range::from_coords(0, 8, 0, 10)));
    assert_eq!(merged.removal_range(), Range::from_coords(0, 0, 0, 10));
  }

  #[test]
  fn different_kinds_degrade_to_untyped() {
    let editor = editor("foo bar");
    let foo = Target::token(editor.clone(), Range::from_coords(0, 0, 0, 3), false);
    let bar = Target::scope(editor, ScopeType::Name, Range::from_coords(0, 4, 0, 7), false);

    let merged = continuous_target(&foo, &bar, true, true, true);
    assert_eq!(merged.kind(), &TargetKind::Untyped);
    assert_eq!(merged.content_range(), Range::from_coords(0, 0, 0, 7));
    assert!(merged.is_reversed());
    assert!(merged.has_explicit_range());
    assert!(!merged.has_explicit_scope_type());
  }

  #[test]
  fn exclusion_trims_to_inner_edges() {
    let editor = editor("a b c");
    let a = Target::token(editor.clone(), Range::from_coords(0, 0, 0, 1), false);
    let c = Target::token(editor, Range::from_coords(0, 4, 0, 5), false);

    assert_eq!(continuous_range(&a, &c, false, true), Range::from_coords(0, 1, 0, 5));
    assert_eq!(continuous_range(&a, &c, true, false), Range::from_coords(0, 0, 0, 4));
    let merged = continuous_target(&a, &c, false, false, false);
    assert_eq!(merged.kind(), &TargetKind::Untyped);
    assert_eq!(merged.content_range(), Range::from_coords(0, 1, 0, 4));
  }

  #[test]
  fn range_target_orients_by_position() {
    let editor = editor("alpha beta gamma");
    let alpha = Target::token(editor.clone(), Range::from_coords(0, 0, 0, 5), false);
    let gamma = Target::token(editor, Range::from_coords(0, 11, 0, 16), false);

    let merged = range_target(&gamma, &alpha, true, false);
    assert!(merged.is_reversed());
    assert_eq!(merged.content_range(), Range::from_coords(0, 0, 0, 11));
    assert_eq!(merged.kind(), &TargetKind::Untyped);
  }

  #[test]
  fn excluded_lines_skip_whole_lines() {
    let editor = editor("one\ntwo\nthree\nfour");
    let one = Target::line(editor.clone(), Range::from_coords(0, 0, 0, 0), false);
    let four = Target::line(editor, Range::from_coords(3, 0, 3, 0), false);

    let merged = continuous_target(&one, &four, false, false, false);
    assert_eq!(merged.kind(), &TargetKind::Line);
    assert_eq!(merged.content_range(), Range::from_coords(1, 0, 2, 5));
  }
}
