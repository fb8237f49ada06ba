use super::ModifierStage;
use crate::{
  context::ResolveContext,
  descriptor::{
    Direction,
    ScopeType,
  },
  document::Document,
  error::{
    Result,
    TargetError,
  },
  position::{
    Position,
    Range,
  },
  scope::{
    Containment,
    ScopeHandler,
    ScopeRequirements,
    TargetScope,
    generate_scopes,
    preferred_scope,
    scope_handler,
    top_level,
  },
  target::{
    Target,
    TargetArena,
    TargetKind,
    merge::continuous_target,
  },
};

fn handler_for(cx: &ResolveContext, scope_type: &ScopeType, target: &Target) -> Result<Box<dyn ScopeHandler>> {
  scope_handler(cx, scope_type, target.document().language_id())
}

/// One target from the first to the last of `scopes`.
fn scope_range_target(first: &TargetScope, last: &TargetScope, is_reversed: bool) -> Target {
  if first == last {
    return first.target(is_reversed);
  }
  continuous_target(
    &first.target(false),
    &last.target(false),
    true,
    true,
    is_reversed,
  )
}

/// Scopes overlapping `range`. Of nested scopes only the innermost one
/// enclosing `range` and the outermost ones inside it are kept.
fn scopes_intersecting(
  handler: &dyn ScopeHandler,
  cx: &ResolveContext,
  target: &Target,
  range: Range,
) -> Result<Vec<TargetScope>> {
  let overlapping = handler.scopes_overlapping_range(cx, target.editor(), range)?;
  if !handler.is_hierarchical() {
    return Ok(overlapping);
  }

  let innermost = overlapping
    .iter()
    .map(|scope| scope.domain)
    .filter(|domain| domain.contains_range(&range))
    .reduce(|outer, inner| {
      if outer.contains_range(&inner) {
        inner
      } else {
        outer
      }
    });
  let scopes = overlapping
    .into_iter()
    .filter(|scope| innermost.is_none_or(|inner| scope.domain == inner || !scope.domain.contains_range(&inner)))
    .collect();
  Ok(top_level(scopes))
}

/// Scopes overlapping `range`, without the ones that merely enclose it.
fn scopes_within(
  handler: &dyn ScopeHandler,
  cx: &ResolveContext,
  target: &Target,
  range: Range,
) -> Result<Vec<TargetScope>> {
  let scopes = handler
    .scopes_overlapping_range(cx, target.editor(), range)?
    .into_iter()
    .filter(|scope| !scope.domain.strictly_contains_range(&range))
    .collect();
  Ok(top_level(scopes))
}

pub struct ContainingScopeStage<'a> {
  scope_type: &'a ScopeType,
}

impl<'a> ContainingScopeStage<'a> {
  pub fn new(scope_type: &'a ScopeType) -> Self {
    Self { scope_type }
  }
}

impl ModifierStage for ContainingScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let handler = handler_for(cx, self.scope_type, target)?;
    let found = handler.containing_scope(
      cx,
      target.editor(),
      target.content_range(),
      target.is_reversed(),
    )?;
    match found {
      Some(found) => Ok(vec![found]),
      None => Err(TargetError::no_containing_scope(self.scope_type)),
    }
  }
}

/// The containing scope, or else whichever scope lies nearest the target.
/// Ties go to the scope after it.
pub struct PreferredScopeStage<'a> {
  scope_type: &'a ScopeType,
}

impl<'a> PreferredScopeStage<'a> {
  pub fn new(scope_type: &'a ScopeType) -> Self {
    Self { scope_type }
  }
}

impl ModifierStage for PreferredScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    match ContainingScopeStage::new(self.scope_type).run(cx, arena, target) {
      Err(TargetError::NoContainingScope { .. }) => {},
      found => return found,
    }

    let handler = handler_for(cx, self.scope_type, target)?;
    let editor = target.editor();
    let range = target.content_range();
    let nearest = |position, direction| -> Result<Option<TargetScope>> {
      let scopes = generate_scopes(
        handler.as_ref(),
        cx,
        editor,
        position,
        direction,
        ScopeRequirements::default(),
      )?;
      Ok(scopes.into_iter().next())
    };

    let document = target.document();
    let previous = nearest(range.start, Direction::Backward)?.map(|scope| {
      let distance = document
        .offset_at(range.start)
        .saturating_sub(document.offset_at(scope.domain.end));
      (distance, scope)
    });
    let next = nearest(range.end, Direction::Forward)?.map(|scope| {
      let distance = document
        .offset_at(scope.domain.start)
        .saturating_sub(document.offset_at(range.end));
      (distance, scope)
    });

    let closest = match (previous, next) {
      (Some((before, previous)), Some((after, _))) if before < after => Some(previous),
      (_, Some((_, next))) => Some(next),
      (previous, None) => previous.map(|(_, previous)| previous),
    };
    tracing::trace!(scope_type = %self.scope_type, found = closest.is_some(), "preferred scope");
    closest
      .map(|scope| vec![scope.target(target.is_reversed())])
      .ok_or_else(|| TargetError::no_containing_scope(self.scope_type))
  }
}

/// The run of scopes around the target that follow each other with only
/// whitespace and at most one line break in between.
pub struct ContiguousScopeStage<'a> {
  scope_type: &'a ScopeType,
}

impl<'a> ContiguousScopeStage<'a> {
  pub fn new(scope_type: &'a ScopeType) -> Self {
    Self { scope_type }
  }

  /// The last scope reached from the one touching `position` by walking in
  /// `direction` while scopes stay adjacent.
  fn distal_scope(
    &self,
    cx: &ResolveContext,
    handler: &dyn ScopeHandler,
    target: &Target,
    position: Position,
    direction: Direction,
  ) -> Result<Option<TargetScope>> {
    let editor = target.editor();
    let proximal = match direction {
      Direction::Forward => Direction::Backward,
      Direction::Backward => Direction::Forward,
    };
    let touching = handler.scopes_touching_position(cx, editor, position)?;
    let Some(mut distal) = preferred_scope(handler, cx, touching, proximal) else {
      return Ok(None);
    };

    let edge = match direction {
      Direction::Forward => distal.domain.end,
      Direction::Backward => distal.domain.start,
    };
    for scope in generate_scopes(handler, cx, editor, edge, direction, ScopeRequirements::default())? {
      let (before, after) = match direction {
        Direction::Forward => (distal.domain, scope.domain),
        Direction::Backward => (scope.domain, distal.domain),
      };
      if !is_adjacent(target.document(), before, after) {
        break;
      }
      distal = scope;
    }
    Ok(Some(distal))
  }
}

fn is_adjacent(document: &Document, before: Range, after: Range) -> bool {
  before.end <= after.start
    && after.start.line <= before.end.line + 1
    && document
      .text_in(Range::new(before.end, after.start))
      .trim()
      .is_empty()
}

impl ModifierStage for ContiguousScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let handler = handler_for(cx, self.scope_type, target)?;
    let range = target.content_range();
    let first = self.distal_scope(cx, handler.as_ref(), target, range.start, Direction::Backward)?;
    let last = self.distal_scope(cx, handler.as_ref(), target, range.end, Direction::Forward)?;
    match (first, last) {
      (Some(first), Some(last)) => Ok(vec![scope_range_target(&first, &last, target.is_reversed())]),
      _ => Err(TargetError::no_containing_scope(self.scope_type)),
    }
  }
}

/// Every instance inside the target when it has an explicit range, else
/// every instance in the nearest iteration scope that has any.
pub struct EveryScopeStage<'a> {
  scope_type: &'a ScopeType,
}

impl<'a> EveryScopeStage<'a> {
  pub fn new(scope_type: &'a ScopeType) -> Self {
    Self { scope_type }
  }
}

impl ModifierStage for EveryScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let scopes = every_scope(cx, self.scope_type, target)?;
    Ok(
      scopes
        .iter()
        .map(|scope| scope.target(target.is_reversed()))
        .collect(),
    )
  }
}

fn every_scope(cx: &ResolveContext, scope_type: &ScopeType, target: &Target) -> Result<Vec<TargetScope>> {
  let handler = handler_for(cx, scope_type, target)?;
  let range = target.content_range();

  if target.has_explicit_range() {
    let overlapping = handler.scopes_overlapping_range(cx, target.editor(), range)?;
    let is_single_container = matches!(
      overlapping.as_slice(),
      [scope] if scope.domain.contains_range(&range)
    );
    if !is_single_container {
      let scopes: Vec<TargetScope> = scopes_within(handler.as_ref(), cx, target, range)?
        .into_iter()
        .filter(|scope| handler.include_in_every(scope))
        .collect();
      if !scopes.is_empty() {
        return Ok(scopes);
      }
    }
  }

  let scopes = handler
    .iteration_scopes(cx, target.editor(), range)?
    .into_iter()
    .map(|iteration| {
      iteration
        .scopes
        .into_iter()
        .filter(|scope| handler.include_in_every(scope))
        .collect::<Vec<_>>()
    })
    .find(|scopes| !scopes.is_empty());

  tracing::trace!(%scope_type, found = scopes.as_ref().map_or(0, Vec::len), "every scope");
  scopes.ok_or_else(|| TargetError::no_containing_scope(scope_type))
}

/// Picks scopes by index out of the every-scope list.
pub struct OrdinalScopeStage<'a> {
  scope_type: &'a ScopeType,
  start:      isize,
  length:     usize,
  is_every:   bool,
}

impl<'a> OrdinalScopeStage<'a> {
  pub fn new(scope_type: &'a ScopeType, start: isize, length: usize, is_every: bool) -> Self {
    Self {
      scope_type,
      start,
      length,
      is_every,
    }
  }
}

impl ModifierStage for OrdinalScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let scopes = every_scope(cx, self.scope_type, target)?;
    let start = if self.start < 0 {
      scopes.len() as isize + self.start
    } else {
      self.start
    };
    let out_of_range = || TargetError::out_of_range(self.scope_type);

    let start = usize::try_from(start).map_err(|_| out_of_range())?;
    let end = start.checked_add(self.length).ok_or_else(out_of_range)?;
    let picked = scopes
      .get(start..end)
      .filter(|picked| !picked.is_empty())
      .ok_or_else(out_of_range)?;

    Ok(pick(picked, self.is_every, target.is_reversed()))
  }
}

fn pick(scopes: &[TargetScope], is_every: bool, is_reversed: bool) -> Vec<Target> {
  match scopes {
    [] => Vec::new(),
    _ if is_every => scopes.iter().map(|scope| scope.target(is_reversed)).collect(),
    [first, .., last] => vec![scope_range_target(first, last, is_reversed)],
    [only] => vec![only.target(is_reversed)],
  }
}

/// `offset` scopes away from the target in `direction`, `length` of them.
/// Offset zero counts the scopes the target already touches.
pub struct RelativeScopeStage<'a> {
  scope_type: &'a ScopeType,
  offset:     usize,
  length:     usize,
  direction:  Direction,
  is_every:   bool,
}

impl<'a> RelativeScopeStage<'a> {
  pub fn new(
    scope_type: &'a ScopeType,
    offset: usize,
    length: usize,
    direction: Direction,
    is_every: bool,
  ) -> Self {
    Self {
      scope_type,
      offset,
      length,
      direction,
      is_every,
    }
  }

  /// Scopes intersecting the target, then enough further ones to make
  /// `length`. An empty target counts the scope around it, looking in
  /// `direction` first.
  fn inclusive(
    &self,
    cx: &ResolveContext,
    handler: &dyn ScopeHandler,
    target: &Target,
  ) -> Result<Vec<TargetScope>> {
    let editor = target.editor();
    let range = target.content_range();

    let mut scopes = if range.is_empty() {
      let containing = |direction| -> Result<Option<TargetScope>> {
        let scopes = generate_scopes(handler, cx, editor, range.start, direction, ScopeRequirements {
          containment: Some(Containment::Required),
        })?;
        Ok(scopes.into_iter().next())
      };
      let opposite = match self.direction {
        Direction::Forward => Direction::Backward,
        Direction::Backward => Direction::Forward,
      };
      match containing(self.direction)? {
        Some(scope) => vec![scope],
        None => containing(opposite)?.into_iter().collect(),
      }
    } else {
      scopes_intersecting(handler, cx, target, range)?
    };

    if scopes.is_empty() {
      return Err(TargetError::no_containing_scope(self.scope_type));
    }
    if scopes.len() > self.length {
      return Err(TargetError::TooFewScopes {
        scope_type: self.scope_type.to_string(),
        requested:  self.length,
        found:      scopes.len(),
      });
    }

    let missing = self.length - scopes.len();
    if missing > 0 {
      let position = match self.direction {
        Direction::Forward => scopes[scopes.len() - 1].domain.end,
        Direction::Backward => scopes[0].domain.start,
      };
      let further = generate_scopes(handler, cx, editor, position, self.direction, ScopeRequirements {
        containment: Some(Containment::DisallowedIfStrict),
      })?;
      if further.len() < missing {
        return Err(TargetError::out_of_range(self.scope_type));
      }
      let further = further.into_iter().take(missing);
      match self.direction {
        Direction::Forward => scopes.extend(further),
        Direction::Backward => {
          let mut before: Vec<TargetScope> = further.collect();
          before.reverse();
          before.append(&mut scopes);
          scopes = before;
        },
      }
    }

    Ok(scopes)
  }

  /// Scopes strictly past the target, skipping `offset - 1`.
  fn exclusive(
    &self,
    cx: &ResolveContext,
    handler: &dyn ScopeHandler,
    target: &Target,
  ) -> Result<Vec<TargetScope>> {
    let range = target.content_range();
    let position = match self.direction {
      Direction::Forward => range.end,
      Direction::Backward => range.start,
    };
    let containment = if range.is_empty() {
      Containment::Disallowed
    } else {
      Containment::DisallowedIfStrict
    };

    let mut scopes: Vec<TargetScope> = generate_scopes(
      handler,
      cx,
      target.editor(),
      position,
      self.direction,
      ScopeRequirements {
        containment: Some(containment),
      },
    )?
    .into_iter()
    .skip(self.offset - 1)
    .take(self.length)
    .collect();

    if scopes.len() < self.length || scopes.is_empty() {
      return Err(TargetError::out_of_range(self.scope_type));
    }
    if self.direction == Direction::Backward {
      scopes.reverse();
    }
    Ok(scopes)
  }
}

impl ModifierStage for RelativeScopeStage<'_> {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    let handler = handler_for(cx, self.scope_type, target)?;
    let scopes = if self.offset == 0 {
      self.inclusive(cx, handler.as_ref(), target)?
    } else {
      self.exclusive(cx, handler.as_ref(), target)?
    };

    tracing::trace!(
      scope_type = %self.scope_type,
      offset = self.offset,
      found = scopes.len(),
      "relative scope"
    );
    Ok(pick(&scopes, self.is_every, target.is_reversed()))
  }
}

/// Expands an empty untyped target to the token it touches. Targets with no
/// token nearby pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainingTokenIfUntypedEmptyStage;

impl ModifierStage for ContainingTokenIfUntypedEmptyStage {
  fn run(&self, cx: &ResolveContext, arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    if target.kind() != &TargetKind::Untyped
      || target.has_explicit_scope_type()
      || !target.content_range().is_empty()
    {
      return Ok(vec![target.clone()]);
    }

    let handler = handler_for(cx, &ScopeType::Token, target)?;
    let found = handler.containing_scope(
      cx,
      target.editor(),
      target.content_range(),
      target.is_reversed(),
    )?;
    Ok(vec![match found {
      Some(token) => token.with_that_target(arena.alloc(target.clone())),
      None => target.clone(),
    }])
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::TargetConfig,
    descriptor::SurroundingPairName,
    target::test::editor,
  };

  fn cx() -> ResolveContext {
    ResolveContext::new(TargetConfig::default()).unwrap()
  }

  fn run(stage: &dyn ModifierStage, target: &Target) -> Result<Vec<String>> {
    let mut arena = TargetArena::default();
    Ok(
      stage
        .run(&cx(), &mut arena, target)?
        .iter()
        .map(Target::content_text)
        .collect(),
    )
  }

  fn cursor(text: &str, line: usize, character: usize) -> Target {
    Target::from_selection(editor(text), Range::from_coords(line, character, line, character).into())
  }

  #[test]
  fn every_token_in_the_line() {
    let target = cursor("a b c\nd e", 0, 2);
    assert_eq!(run(&EveryScopeStage::new(&ScopeType::Token), &target).unwrap(), [
      "a", "b", "c"
    ]);
  }

  #[test]
  fn every_token_in_an_explicit_range() {
    let editor = editor("a b c d");
    let target = Target::plain(editor, Range::from_coords(0, 1, 0, 5), false);
    assert_eq!(run(&EveryScopeStage::new(&ScopeType::Token), &target).unwrap(), [
      "b", "c"
    ]);
  }

  #[test]
  fn ordinal_counts_from_either_end() {
    let target = cursor("a b c d", 0, 0);
    let last = OrdinalScopeStage::new(&ScopeType::Token, -1, 1, false);
    assert_eq!(run(&last, &target).unwrap(), ["d"]);

    let middle = OrdinalScopeStage::new(&ScopeType::Token, 1, 2, false);
    assert_eq!(run(&middle, &target).unwrap(), ["b c"]);

    let each = OrdinalScopeStage::new(&ScopeType::Token, 1, 2, true);
    assert_eq!(run(&each, &target).unwrap(), ["b", "c"]);

    let past_end = OrdinalScopeStage::new(&ScopeType::Token, 3, 2, false);
    assert_eq!(
      run(&past_end, &target).unwrap_err(),
      TargetError::out_of_range(&ScopeType::Token)
    );
  }

  #[test]
  fn next_and_previous_tokens() {
    let target = cursor("a b c d", 0, 3);
    let next = RelativeScopeStage::new(&ScopeType::Token, 1, 1, Direction::Forward, false);
    assert_eq!(run(&next, &target).unwrap(), ["c"]);

    let previous_two = RelativeScopeStage::new(&ScopeType::Token, 1, 2, Direction::Backward, false);
    assert_eq!(run(&previous_two, &cursor("a b c d", 0, 4)).unwrap(), ["a b"]);

    let far = RelativeScopeStage::new(&ScopeType::Token, 3, 1, Direction::Forward, false);
    assert!(run(&far, &target).unwrap_err().is_recoverable());
  }

  #[test]
  fn inclusive_counts_touching_scopes() {
    let target = cursor("a b c d", 0, 2);
    let two = RelativeScopeStage::new(&ScopeType::Token, 0, 2, Direction::Forward, false);
    assert_eq!(run(&two, &target).unwrap(), ["b c"]);

    let back = RelativeScopeStage::new(&ScopeType::Token, 0, 2, Direction::Backward, true);
    assert_eq!(run(&back, &target).unwrap(), ["a", "b"]);

    let backward = RelativeScopeStage::new(&ScopeType::Token, 0, 1, Direction::Backward, false);
    assert_eq!(run(&backward, &cursor("a b c d", 0, 3)).unwrap(), ["b"]);

    let wide = Target::plain(editor("a b c d"), Range::from_coords(0, 0, 0, 5), false);
    let one = RelativeScopeStage::new(&ScopeType::Token, 0, 1, Direction::Forward, false);
    assert_eq!(run(&one, &wide).unwrap_err(), TargetError::TooFewScopes {
      scope_type: "token".into(),
      requested:  1,
      found:      3,
    });
  }

  #[test]
  fn inclusive_counts_the_token_around_a_selection() {
    let inside = Target::plain(editor("foo bar"), Range::from_coords(0, 1, 0, 2), false);
    let one = RelativeScopeStage::new(&ScopeType::Token, 0, 1, Direction::Forward, false);
    assert_eq!(run(&one, &inside).unwrap(), ["foo"]);

    let two = RelativeScopeStage::new(&ScopeType::Token, 0, 2, Direction::Forward, false);
    assert_eq!(run(&two, &inside).unwrap(), ["foo bar"]);
  }

  #[test]
  fn inclusive_pairs_keep_the_innermost_container() {
    let parens = ScopeType::surrounding_pair(SurroundingPairName::Parentheses);
    let inside = Target::plain(editor("(a (bc) d)"), Range::from_coords(0, 4, 0, 5), false);
    let one = RelativeScopeStage::new(&parens, 0, 1, Direction::Forward, false);
    assert_eq!(run(&one, &inside).unwrap(), ["(bc)"]);
  }

  #[test]
  fn huge_ordinal_lengths_are_out_of_range() {
    let target = cursor("a b c", 0, 0);
    let huge = OrdinalScopeStage::new(&ScopeType::Token, 1, usize::MAX, false);
    assert_eq!(
      run(&huge, &target).unwrap_err(),
      TargetError::out_of_range(&ScopeType::Token)
    );
  }

  #[test]
  fn preferred_falls_back_to_the_nearest_scope() {
    let stage = PreferredScopeStage::new(&ScopeType::Token);
    assert_eq!(run(&stage, &cursor("foo   bar", 0, 4)).unwrap(), ["foo"]);
    assert_eq!(run(&stage, &cursor("foo   bar", 0, 5)).unwrap(), ["bar"]);
    assert_eq!(run(&stage, &cursor("foo   bar", 0, 7)).unwrap(), ["bar"]);
    assert!(run(&stage, &cursor("   ", 0, 1)).unwrap_err().is_recoverable());
  }

  #[test]
  fn contiguous_tokens_stop_at_blank_lines() {
    let stage = ContiguousScopeStage::new(&ScopeType::Token);
    let text = "a b\nc\n\nd";
    assert_eq!(run(&stage, &cursor(text, 0, 2)).unwrap(), ["a b\nc"]);
    assert_eq!(run(&stage, &cursor(text, 3, 0)).unwrap(), ["d"]);
    assert_eq!(
      run(&stage, &cursor(text, 2, 0)).unwrap_err(),
      TargetError::no_containing_scope(&ScopeType::Token)
    );
  }

  #[test]
  fn containing_line_is_idempotent() {
    let target = cursor("one\ntwo", 1, 1);
    let stage = ContainingScopeStage::new(&ScopeType::Line);
    let mut arena = TargetArena::default();
    let line = stage.run(&cx(), &mut arena, &target).unwrap().remove(0);
    let again = stage.run(&cx(), &mut arena, &line).unwrap().remove(0);
    assert_eq!(line, again);
  }

  #[test]
  fn empty_untyped_targets_become_tokens() {
    let target = cursor("foo bar", 0, 5);
    let mut arena = TargetArena::default();
    let token = ContainingTokenIfUntypedEmptyStage
      .run(&cx(), &mut arena, &target)
      .unwrap()
      .remove(0);
    assert_eq!(token.content_text(), "bar");
    assert_eq!(arena.that_root(&token), &target);

    let blank = cursor("   ", 0, 1);
    assert_eq!(
      ContainingTokenIfUntypedEmptyStage
        .run(&cx(), &mut arena, &blank)
        .unwrap(),
      [blank]
    );
  }
}
