use super::{
  ContainingScopeStage,
  ContainingTokenIfUntypedEmptyStage,
  ModifierStage,
};
use crate::{
  context::ResolveContext,
  descriptor::{
    Direction,
    ScopeType,
  },
  error::{
    Result,
    TargetError,
  },
  hats::StoredTargetKey,
  position::Range,
  target::{
    Target,
    TargetArena,
    TargetKind,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
  Every,
  Ordinal {
    start:  isize,
    length: usize,
  },
  Relative {
    offset:    usize,
    length:    usize,
    direction: Direction,
  },
}

/// Other occurrences of the target's text. The search covers the targets
/// stored under `instanceReference`, or the whole document when there are
/// none.
///
/// Lines, tokens and words only match occurrences that are themselves a
/// whole line, token or word.
#[derive(Debug, Clone, Copy)]
pub struct InstanceStage {
  query: Query,
}

impl InstanceStage {
  pub fn every() -> Self {
    Self { query: Query::Every }
  }

  /// Negative `start` counts from the end of each search range.
  pub fn ordinal(start: isize, length: usize) -> Self {
    Self {
      query: Query::Ordinal { start, length },
    }
  }

  pub fn relative(offset: usize, length: usize, direction: Direction) -> Self {
    Self {
      query: Query::Relative {
        offset,
        length,
        direction,
      },
    }
  }
}

impl ModifierStage for InstanceStage {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let target = ContainingTokenIfUntypedEmptyStage
      .run(cx, arena, target)?
      .into_iter()
      .next()
      .unwrap_or_else(|| target.clone());
    let text = target.content_text();
    if text.is_empty() {
      return Err(TargetError::no_containing_scope(ScopeType::Instance));
    }

    let references = cx.stored_targets().get(StoredTargetKey::InstanceReference);
    let search = Search {
      cx,
      target: &target,
      text: &text,
      filter: filter_scope_type(&target),
    };

    let mut found = Vec::new();
    match self.query {
      Query::Every => {
        for range in search_ranges(&target, references.as_deref()) {
          found.extend(search.matches(arena, range, Direction::Forward));
        }
      },
      Query::Ordinal { start, length } => {
        for range in search_ranges(&target, references.as_deref()) {
          if start >= 0 {
            found.extend(take_from_offset(
              search.matches(arena, range, Direction::Forward),
              start.unsigned_abs(),
              length,
            )?);
          } else {
            let skip = isize::try_from(length)
              .ok()
              .and_then(|length| start.checked_add(length))
              .and_then(|end| usize::try_from(end.checked_neg()?).ok())
              .ok_or_else(|| TargetError::out_of_range(ScopeType::Instance))?;
            let mut last = take_from_offset(search.matches(arena, range, Direction::Backward), skip, length)?;
            last.reverse();
            found.extend(last);
          }
        }
      },
      Query::Relative {
        offset,
        length,
        direction,
      } => {
        let references = references.unwrap_or_else(|| vec![target.clone()]);
        let document_range = target.document().range();
        for reference in &references {
          let from = reference.content_range();
          let range = match (direction, offset) {
            (Direction::Forward, 0) => Range::new(from.start, document_range.end),
            (Direction::Forward, _) => Range::new(from.end, document_range.end),
            (Direction::Backward, 0) => Range::new(document_range.start, from.end),
            (Direction::Backward, _) => Range::new(document_range.start, from.start),
          };
          found.extend(take_from_offset(
            search.matches(arena, range, direction),
            offset.saturating_sub(1),
            length,
          )?);
        }
      },
    }

    tracing::trace!(text = %text, found = found.len(), "instances");
    Ok(found)
  }
}

fn filter_scope_type(target: &Target) -> Option<ScopeType> {
  if target.is_line() {
    return Some(ScopeType::Line);
  }
  match target.kind() {
    TargetKind::Token => Some(ScopeType::Token),
    TargetKind::SubTokenWord => Some(ScopeType::Word),
    _ => None,
  }
}

fn search_ranges(target: &Target, references: Option<&[Target]>) -> Vec<Range> {
  match references {
    Some(references) => references.iter().map(Target::content_range).collect(),
    None => vec![target.document().range()],
  }
}

fn take_from_offset(targets: Vec<Target>, offset: usize, count: usize) -> Result<Vec<Target>> {
  let taken: Vec<Target> = targets.into_iter().skip(offset).take(count).collect();
  if taken.len() < count {
    return Err(TargetError::out_of_range(ScopeType::Instance));
  }
  Ok(taken)
}

struct Search<'a> {
  cx:     &'a ResolveContext,
  target: &'a Target,
  text:   &'a str,
  filter: Option<ScopeType>,
}

impl Search<'_> {
  /// Non-overlapping occurrences inside `range`, nearest to the start of the
  /// walk first.
  fn matches(&self, arena: &mut TargetArena, range: Range, direction: Direction) -> Vec<Target> {
    let document = self.target.document();
    let editor = self.target.editor();
    let haystack = document.text_in(range);
    let base = document.offset_at(range.start);
    let needle_chars = self.text.chars().count();

    let mut chars_before = 0;
    let mut bytes_seen = 0;
    let mut found: Vec<Target> = haystack
      .match_indices(self.text)
      .filter_map(|(byte, _)| {
        chars_before += haystack[bytes_seen..byte].chars().count();
        bytes_seen = byte;
        let start = base + chars_before;
        let occurrence = Range::new(
          document.position_at(start),
          document.position_at(start + needle_chars),
        );
        self.accept(arena, Target::plain(editor.clone(), occurrence, self.target.is_reversed()))
      })
      .collect();

    if direction == Direction::Backward {
      found.reverse();
    }
    found
  }

  /// The occurrence itself, or the line, token or word it exactly covers.
  fn accept(&self, arena: &mut TargetArena, occurrence: Target) -> Option<Target> {
    let Some(scope_type) = &self.filter else {
      return Some(occurrence);
    };
    let mut scopes = ContainingScopeStage::new(scope_type)
      .run(self.cx, arena, &occurrence)
      .ok()?;
    let exact = scopes.len() == 1 && scopes[0].content_range() == occurrence.content_range();
    exact
      .then(|| scopes.pop())
      .flatten()
      .map(|scope| scope.with_is_reversed(self.target.is_reversed()))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    hats::StoredTargetMap,
    target::test::editor,
  };

  fn cx() -> ResolveContext {
    ResolveContext::new(TargetConfig::default()).unwrap()
  }

  fn ranges(targets: &[Target]) -> Vec<Range> {
    targets.iter().map(Target::content_range).collect()
  }

  #[test]
  fn every_instance_of_the_token_under_the_cursor() {
    let editor = editor("foo foobar foo");
    let cursor = Target::from_selection(editor, Range::from_coords(0, 0, 0, 0).into());
    let found = InstanceStage::every()
      .run(&cx(), &mut TargetArena::default(), &cursor)
      .unwrap();
    assert_eq!(ranges(&found), [
      Range::from_coords(0, 0, 0, 3),
      Range::from_coords(0, 11, 0, 14)
    ]);
    assert!(found.iter().all(|target| target.kind() == &TargetKind::Token));
  }

  #[test]
  fn plain_text_matches_inside_tokens() {
    let editor = editor("foo foobar foo");
    let foo = Target::plain(editor, Range::from_coords(0, 0, 0, 3), false);
    let found = InstanceStage::every()
      .run(&cx(), &mut TargetArena::default(), &foo)
      .unwrap();
    assert_eq!(found.len(), 3);

    let last = InstanceStage::ordinal(-1, 1)
      .run(&cx(), &mut TargetArena::default(), &foo)
      .unwrap();
    assert_eq!(ranges(&last), [Range::from_coords(0, 11, 0, 14)]);

    assert!(
      InstanceStage::ordinal(3, 1)
        .run(&cx(), &mut TargetArena::default(), &foo)
        .unwrap_err()
        .is_recoverable()
    );
  }

  #[test]
  fn next_and_previous_instances() {
    let editor = editor("foo foobar foo");
    let first = Target::token(editor.clone(), Range::from_coords(0, 0, 0, 3), false);
    let next = InstanceStage::relative(1, 1, Direction::Forward)
      .run(&cx(), &mut TargetArena::default(), &first)
      .unwrap();
    assert_eq!(ranges(&next), [Range::from_coords(0, 11, 0, 14)]);

    let last = Target::token(editor, Range::from_coords(0, 11, 0, 14), false);
    let previous = InstanceStage::relative(1, 1, Direction::Backward)
      .run(&cx(), &mut TargetArena::default(), &last)
      .unwrap();
    assert_eq!(ranges(&previous), [Range::from_coords(0, 0, 0, 3)]);

    let this_and_next = InstanceStage::relative(0, 2, Direction::Forward)
      .run(&cx(), &mut TargetArena::default(), &first)
      .unwrap();
    assert_eq!(this_and_next.len(), 2);
  }

  #[test]
  fn stored_references_limit_the_search() {
    let editor = editor("foo foobar foo");
    let mut stored = StoredTargetMap::default();
    stored.set(StoredTargetKey::InstanceReference, vec![Target::plain(
      editor.clone(),
      Range::from_coords(0, 4, 0, 14),
      false,
    )]);
    let cx = cx().with_stored_targets(stored);

    let foo = Target::plain(editor, Range::from_coords(0, 0, 0, 3), false);
    let found = InstanceStage::every()
      .run(&cx, &mut TargetArena::default(), &foo)
      .unwrap();
    assert_eq!(ranges(&found), [
      Range::from_coords(0, 4, 0, 7),
      Range::from_coords(0, 11, 0, 14)
    ]);
  }

  #[test]
  fn blank_targets_have_no_instances() {
    let cursor = Target::from_selection(editor("   "), Range::from_coords(0, 1, 0, 1).into());
    assert_eq!(
      InstanceStage::every()
        .run(&cx(), &mut TargetArena::default(), &cursor)
        .unwrap_err(),
      TargetError::no_containing_scope(ScopeType::Instance)
    );
  }
}
