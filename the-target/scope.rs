//! Locating instances of a scope type.
//!
//! Every scope type is answered by a [`ScopeHandler`]. A handler only has to
//! list the scopes near a range ([`ScopeHandler::candidates`]); containment,
//! overlap, iteration and directional walks are derived from that list by the
//! free functions in this module, and handlers override the pieces where
//! their scope type needs something smarter.
//!
//! A [`TargetScope`] pairs the target for one instance with its domain, the
//! range within which the instance is the answer to "which one contains
//! this position". An [`IterationScope`] is a domain plus the sibling scopes
//! inside it, used by every, ordinal and relative modifiers.

use std::{
  cmp::Ordering,
  sync::Arc,
};

use smallvec::SmallVec;

use crate::{
  context::ResolveContext,
  descriptor::{
    Direction,
    ScopeType,
  },
  editor::Editor,
  error::{
    Result,
    TargetError,
  },
  position::{
    Position,
    Range,
  },
  target::Target,
};

mod character;
mod item;
mod line;
mod one_of;
mod pair;
mod regex;
mod syntax;
mod token;

pub(crate) use character::word_target;
pub(crate) use token::line_tokens;
pub use character::{
  CharacterScopeHandler,
  WordScopeHandler,
};
pub use item::CollectionItemScopeHandler;
pub use line::{
  DocumentScopeHandler,
  LineScopeHandler,
  ParagraphScopeHandler,
};
pub use one_of::OneOfScopeHandler;
pub use pair::SurroundingPairScopeHandler;
pub use regex::RegexScopeHandler;
pub use syntax::SyntaxScopeHandler;
pub use token::TokenScopeHandler;

/// One instance of a scope type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetScope {
  pub domain: Range,
  target:     Target,
}

impl TargetScope {
  pub fn new(domain: Range, target: Target) -> Self {
    Self { domain, target }
  }

  /// A scope whose domain is its target's content.
  pub fn from_target(target: Target) -> Self {
    Self {
      domain: target.content_range(),
      target,
    }
  }

  pub fn target(&self, is_reversed: bool) -> Target {
    self.target.clone().with_is_reversed(is_reversed)
  }

  #[inline]
  pub fn editor(&self) -> &Arc<Editor> {
    self.target.editor()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationScope {
  pub domain: Range,
  pub scopes: Vec<TargetScope>,
}

/// Whether a directional walk may return scopes containing its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
  /// Only scopes containing the position.
  Required,
  /// No scope containing the position, even at its edge.
  Disallowed,
  /// No scope strictly containing the position.
  DisallowedIfStrict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeRequirements {
  pub containment: Option<Containment>,
}

pub trait ScopeHandler {
  fn scope_type(&self) -> &ScopeType;

  /// The scope type whose instances group this one's siblings.
  fn iteration_scope_type(&self) -> ScopeType;

  /// Whether instances can nest.
  fn is_hierarchical(&self) -> bool {
    false
  }

  /// Every scope whose domain touches `range`, ordered by domain start.
  fn candidates(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>>;

  /// Tie-break between two scopes touching the same position. `None` leaves
  /// the decision to the caller's direction.
  fn is_preferred_over(&self, cx: &ResolveContext, a: &TargetScope, b: &TargetScope) -> Option<bool> {
    let _ = (cx, a, b);
    None
  }

  /// Whether `scope` is listed by every and ordinal modifiers.
  fn include_in_every(&self, scope: &TargetScope) -> bool {
    let _ = scope;
    true
  }

  fn scopes_touching_position(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    position: Position,
  ) -> Result<Vec<TargetScope>> {
    Ok(
      self
        .candidates(cx, editor, Range::point(position))?
        .into_iter()
        .filter(|scope| scope.domain.contains(position))
        .collect(),
    )
  }

  fn scopes_overlapping_range(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<TargetScope>> {
    Ok(
      self
        .candidates(cx, editor, range)?
        .into_iter()
        .filter(|scope| overlaps(scope.domain, range))
        .collect(),
    )
  }

  /// Iteration scopes around `range`, innermost first. The last one spans
  /// the whole document.
  fn iteration_scopes(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
  ) -> Result<Vec<IterationScope>> {
    let iteration_handler = scope_handler(cx, &self.iteration_scope_type(), editor.document.language_id())?;
    let mut domains: Vec<Range> = iteration_handler
      .scopes_touching_position(cx, editor, range.start)?
      .into_iter()
      .map(|scope| scope.domain)
      .filter(|domain| domain.contains_range(&range))
      .collect();
    domains.sort_by(|a, b| compare_size(*a, *b));
    domains.push(editor.document.range());
    domains.dedup();

    domains
      .into_iter()
      .map(|domain| {
        Ok(IterationScope {
          domain,
          scopes: scopes_in_domain(self, cx, editor, domain)?,
        })
      })
      .collect()
  }

  /// The single scope containing `range`. At zero-width positions between
  /// two scopes the handler's preference, then the right one, wins. Ranges
  /// that span several scopes give the continuous range from the first to
  /// the last.
  fn containing_scope(
    &self,
    cx: &ResolveContext,
    editor: &Arc<Editor>,
    range: Range,
    is_reversed: bool,
  ) -> Result<Option<Target>> {
    default_containing_scope(self, cx, editor, range, is_reversed)
  }
}

/// Non-empty overlap, or an empty domain strictly inside `range`.
fn overlaps(domain: Range, range: Range) -> bool {
  match domain.intersection(&range) {
    Some(intersection) if !intersection.is_empty() => true,
    Some(_) => domain.is_empty() && range.strictly_contains(domain.start),
    None => false,
  }
}

fn compare_size(a: Range, b: Range) -> Ordering {
  if a == b {
    Ordering::Equal
  } else if b.contains_range(&a) {
    Ordering::Less
  } else if a.contains_range(&b) {
    Ordering::Greater
  } else {
    a.start.cmp(&b.start)
  }
}

/// Drops scopes nested inside another scope of the list.
pub fn top_level(scopes: Vec<TargetScope>) -> Vec<TargetScope> {
  let domains: Vec<Range> = scopes.iter().map(|scope| scope.domain).collect();
  scopes
    .into_iter()
    .filter(|scope| {
      !domains
        .iter()
        .any(|domain| *domain != scope.domain && domain.contains_range(&scope.domain))
    })
    .collect()
}

/// The scopes of `handler` directly inside `domain`.
pub fn scopes_in_domain<H: ScopeHandler + ?Sized>(
  handler: &H,
  cx: &ResolveContext,
  editor: &Arc<Editor>,
  domain: Range,
) -> Result<Vec<TargetScope>> {
  let scopes: Vec<TargetScope> = handler
    .scopes_overlapping_range(cx, editor, domain)?
    .into_iter()
    .filter(|scope| domain.contains_range(&scope.domain))
    .filter(|scope| !handler.is_hierarchical() || scope.domain != domain)
    .collect();

  Ok(if handler.is_hierarchical() {
    top_level(scopes)
  } else {
    scopes
  })
}

/// Picks one of several scopes touching a position: nested scopes yield to
/// the innermost, then the handler decides, then `direction` does.
pub fn preferred_scope<H: ScopeHandler + ?Sized>(
  handler: &H,
  cx: &ResolveContext,
  scopes: impl IntoIterator<Item = TargetScope>,
  direction: Direction,
) -> Option<TargetScope> {
  scopes.into_iter().reduce(|current, candidate| {
    if prefers(handler, cx, &candidate, &current, direction) {
      candidate
    } else {
      current
    }
  })
}

fn prefers<H: ScopeHandler + ?Sized>(
  handler: &H,
  cx: &ResolveContext,
  candidate: &TargetScope,
  current: &TargetScope,
  direction: Direction,
) -> bool {
  if candidate.domain == current.domain {
    return false;
  }
  if current.domain.contains_range(&candidate.domain) {
    return true;
  }
  if candidate.domain.contains_range(&current.domain) {
    return false;
  }
  if let Some(preferred) = handler.is_preferred_over(cx, candidate, current) {
    return preferred;
  }
  match direction {
    Direction::Forward => candidate.domain.start > current.domain.start,
    Direction::Backward => candidate.domain.end < current.domain.end,
  }
}

pub fn default_containing_scope<H: ScopeHandler + ?Sized>(
  handler: &H,
  cx: &ResolveContext,
  editor: &Arc<Editor>,
  range: Range,
  is_reversed: bool,
) -> Result<Option<Target>> {
  let start_scopes = handler.scopes_touching_position(cx, editor, range.start)?;

  if range.is_empty() {
    return Ok(preferred_scope(handler, cx, start_scopes, Direction::Forward).map(|scope| scope.target(is_reversed)));
  }

  let covering = start_scopes
    .iter()
    .filter(|scope| scope.domain.contains_range(&range))
    .cloned();
  if let Some(scope) = preferred_scope(handler, cx, covering, Direction::Forward) {
    return Ok(Some(scope.target(is_reversed)));
  }

  let Some(start) = preferred_scope(handler, cx, start_scopes, Direction::Forward) else {
    return Ok(None);
  };
  let end_scopes = handler.scopes_touching_position(cx, editor, range.end)?;
  let Some(end) = preferred_scope(handler, cx, end_scopes, Direction::Backward) else {
    return Ok(None);
  };

  Ok(Some(crate::target::merge::continuous_target(
    &start.target,
    &end.target,
    true,
    true,
    is_reversed,
  )))
}

/// Scopes met walking from `position` in `direction`, nearest first. Once a
/// scope is returned, scopes nested inside it are not. With
/// [`Containment::Required`] the result is the chain of scopes around
/// `position`, innermost first.
pub fn generate_scopes<H: ScopeHandler + ?Sized>(
  handler: &H,
  cx: &ResolveContext,
  editor: &Arc<Editor>,
  position: Position,
  direction: Direction,
  requirements: ScopeRequirements,
) -> Result<Vec<TargetScope>> {
  let document_range = editor.document.range();
  let search = match direction {
    Direction::Forward => Range::new(position, document_range.end),
    Direction::Backward => Range::new(document_range.start, position),
  };

  let mut scopes: Vec<TargetScope> = handler
    .candidates(cx, editor, search)?
    .into_iter()
    .filter(|scope| {
      let domain = scope.domain;
      let ahead = match direction {
        Direction::Forward => domain.end > position,
        Direction::Backward => domain.start < position,
      };
      ahead || (domain.is_empty() && domain.start == position)
    })
    .filter(|scope| {
      match requirements.containment {
        Some(Containment::Required) => scope.domain.contains(position),
        Some(Containment::Disallowed) => !scope.domain.contains(position),
        Some(Containment::DisallowedIfStrict) => !scope.domain.strictly_contains(position),
        None => true,
      }
    })
    .collect();

  if requirements.containment == Some(Containment::Required) {
    scopes.sort_by(|a, b| compare_size(a.domain, b.domain));
    return Ok(scopes);
  }

  let hierarchical = handler.is_hierarchical();
  scopes.sort_by(|a, b| {
    let (a, b) = (a.domain, b.domain);
    match (direction, hierarchical) {
      (Direction::Forward, false) => a.end.cmp(&b.end).then(a.start.cmp(&b.start)),
      (Direction::Forward, true) => a.start.cmp(&b.start).then(b.end.cmp(&a.end)),
      (Direction::Backward, false) => b.start.cmp(&a.start).then(b.end.cmp(&a.end)),
      (Direction::Backward, true) => b.end.cmp(&a.end).then(a.start.cmp(&b.start)),
    }
  });

  if !hierarchical {
    return Ok(scopes);
  }

  let mut yielded: SmallVec<[Range; 8]> = SmallVec::new();
  scopes.retain(|scope| {
    if yielded.iter().any(|domain| domain.contains_range(&scope.domain)) {
      return false;
    }
    yielded.push(scope.domain);
    true
  });
  Ok(scopes)
}

/// The handler for `scope_type` in a document of `language_id`.
pub fn scope_handler(
  cx: &ResolveContext,
  scope_type: &ScopeType,
  language_id: &str,
) -> Result<Box<dyn ScopeHandler>> {
  let handler: Box<dyn ScopeHandler> = match scope_type {
    ScopeType::Token => Box::new(TokenScopeHandler::tokens()),
    ScopeType::Identifier => Box::new(TokenScopeHandler::identifiers()),
    ScopeType::Line => Box::new(LineScopeHandler),
    ScopeType::Paragraph => Box::new(ParagraphScopeHandler),
    ScopeType::Document => Box::new(DocumentScopeHandler),
    ScopeType::Character => Box::new(CharacterScopeHandler),
    ScopeType::Word => Box::new(WordScopeHandler),
    ScopeType::Url | ScopeType::NonWhitespaceSequence | ScopeType::CustomRegex { .. } => {
      Box::new(RegexScopeHandler::new(scope_type.clone())?)
    },
    ScopeType::SurroundingPair { .. } => Box::new(SurroundingPairScopeHandler::new(scope_type.clone())),
    ScopeType::CollectionItem => Box::new(CollectionItemScopeHandler::new(language_id)),
    ScopeType::OneOf { scope_types } => {
      let handlers = scope_types
        .iter()
        .map(|scope_type| scope_handler(cx, scope_type, language_id))
        .collect::<Result<Vec<_>>>()?;
      Box::new(OneOfScopeHandler::new(scope_type.clone(), handlers))
    },
    _ => {
      Box::new(SyntaxScopeHandler::new(scope_type.clone(), language_id).ok_or_else(|| {
        TargetError::UnsupportedScopeType {
          scope_type:  scope_type.to_string(),
          language_id: language_id.to_string(),
        }
      })?)
    },
  };
  Ok(handler)
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

  fn domains(scopes: &[TargetScope]) -> Vec<Range> {
    scopes.iter().map(|scope| scope.domain).collect()
  }

  #[test]
  fn containing_token_at_boundaries() {
    let cx = cx();
    let editor = editor("foo.bar");
    let handler = scope_handler(&cx, &ScopeType::Token, "plaintext").unwrap();

    // `foo|.bar`: `foo` is an identifier, `.` is not.
    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 3, 0, 3), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(0, 0, 0, 3));

    // `foo bar|`: nothing to the right.
    let editor = crate::target::test::editor("foo bar");
    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 7, 0, 7), false)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(0, 4, 0, 7));
  }

  #[test]
  fn containing_scope_spans_partial_selections() {
    let cx = cx();
    let editor = editor("one two three");
    let handler = scope_handler(&cx, &ScopeType::Token, "plaintext").unwrap();
    let target = handler
      .containing_scope(&cx, &editor, Range::from_coords(0, 1, 0, 5), true)
      .unwrap()
      .unwrap();
    assert_eq!(target.content_range(), Range::from_coords(0, 0, 0, 7));
    assert!(target.is_reversed());
  }

  #[test]
  fn walks_forward_and_backward() {
    let cx = cx();
    let editor = editor("a b c d");
    let handler = scope_handler(&cx, &ScopeType::Token, "plaintext").unwrap();

    let forward = generate_scopes(
      handler.as_ref(),
      &cx,
      &editor,
      Position::new(0, 2),
      Direction::Forward,
      ScopeRequirements {
        containment: Some(Containment::Disallowed),
      },
    )
    .unwrap();
    assert_eq!(domains(&forward), [
      Range::from_coords(0, 4, 0, 5),
      Range::from_coords(0, 6, 0, 7)
    ]);

    let backward = generate_scopes(
      handler.as_ref(),
      &cx,
      &editor,
      Position::new(0, 3),
      Direction::Backward,
      ScopeRequirements::default(),
    )
    .unwrap();
    assert_eq!(domains(&backward), [
      Range::from_coords(0, 2, 0, 3),
      Range::from_coords(0, 0, 0, 1)
    ]);
  }

  #[test]
  fn required_containment_lists_enclosing_scopes() {
    let cx = cx();
    let editor = editor("(a (b) c)");
    let handler = scope_handler(
      &cx,
      &ScopeType::surrounding_pair(SurroundingPairName::Parentheses),
      "plaintext",
    )
    .unwrap();
    let enclosing = |position, direction| {
      let scopes = generate_scopes(
        handler.as_ref(),
        &cx,
        &editor,
        position,
        direction,
        ScopeRequirements {
          containment: Some(Containment::Required),
        },
      )
      .unwrap();
      scopes
        .iter()
        .map(|scope| scope.target(false).content_text())
        .collect::<Vec<_>>()
    };

    assert_eq!(enclosing(Position::new(0, 4), Direction::Forward), [
      "(b)",
      "(a (b) c)"
    ]);
    // `(b)|`: the inner pair only counts looking back.
    assert_eq!(enclosing(Position::new(0, 6), Direction::Forward), ["(a (b) c)"]);
    assert_eq!(enclosing(Position::new(0, 6), Direction::Backward), [
      "(b)",
      "(a (b) c)"
    ]);
  }

  #[test]
  fn iteration_scopes_end_with_the_document() {
    let cx = cx();
    let editor = editor("a b\nc");
    let handler = scope_handler(&cx, &ScopeType::Token, "plaintext").unwrap();
    let scopes = handler
      .iteration_scopes(&cx, &editor, Range::from_coords(0, 1, 0, 1))
      .unwrap();
    assert_eq!(scopes.len(), 2);
    assert_eq!(scopes[0].domain, Range::from_coords(0, 0, 0, 3));
    assert_eq!(scopes[0].scopes.len(), 2);
    assert_eq!(scopes[1].scopes.len(), 3);
  }

  #[test]
  fn unknown_syntactic_scope_is_unsupported() {
    let cx = cx();
    assert!(matches!(
      scope_handler(&cx, &ScopeType::NamedFunction, "plaintext").err(),
      Some(TargetError::UnsupportedScopeType { .. })
    ));
    assert!(scope_handler(&cx, &ScopeType::NamedFunction, "typescript").is_ok());
  }

  #[test]
  fn top_level_drops_nested() {
    let editor = editor("(a (b))");
    let scope = |range| TargetScope::from_target(Target::plain(editor.clone(), range, false));
    let scopes = top_level(vec![
      scope(Range::from_coords(0, 0, 0, 7)),
      scope(Range::from_coords(0, 3, 0, 6)),
      scope(Range::from_coords(0, 8, 0, 8)),
    ]);
    assert_eq!(domains(&scopes), [
      Range::from_coords(0, 0, 0, 7),
      Range::from_coords(0, 8, 0, 8)
    ]);
  }
}
